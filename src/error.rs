/// Errors returned by device handles and drivers.
///
/// `E` is the error type of the underlying I2C bus.  Argument errors (`InvalidChannel`,
/// `InvalidArgument`) are always detected before any bus transaction is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus could not be claimed for this device, or the handle was already closed.
    BusUnavailable,
    /// The bus reported a fault or a NACK during a transaction.
    Transport(E),
    /// A channel index outside of the device's range.
    InvalidChannel(u8),
    /// Any other caller-supplied value outside of the device's valid range.
    InvalidArgument,
    /// The device did not finish an operation within the polling budget.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Transport(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BusUnavailable => f.write_str("bus unavailable"),
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::InvalidChannel(c) => write!(f, "invalid channel {}", c),
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::Timeout => f.write_str("timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}
