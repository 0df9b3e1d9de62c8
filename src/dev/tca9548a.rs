//! Support for the TCA9548A "Low-Voltage 8-Channel I2C Switch with Reset"
//!
//! Datasheet: https://www.ti.com/lit/ds/symlink/tca9548a.pdf
//!
//! The switch has a single control register, written with a plain one-byte transaction.  Each
//! bit connects one downstream sub-bus to the upstream bus.  Which sub-bus is connected is global
//! state of the physical bus: any transaction to a device behind the switch goes to whatever
//! channel was selected last.  [`Tca9548a::with_channel`] scopes a selection so it is always
//! undone, even if the work done on the channel fails.
use crate::{Device, Error};

/// Default bus address (A0..A2 low).
pub const ADDRESS: u8 = 0x70;

/// Number of downstream channels.
pub const CHANNELS: u8 = 8;

/// Selection state of the switch, as last acknowledged by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxState {
    /// No channel connected, control register is 0.
    Idle,
    /// The channels in the (non-zero) mask are connected.
    Selected(u8),
}

impl MuxState {
    pub fn mask(self) -> u8 {
        match self {
            MuxState::Idle => 0x00,
            MuxState::Selected(mask) => mask,
        }
    }
}

/// TCA9548A I2C multiplexer
pub struct Tca9548a<I2C> {
    dev: Device<I2C>,
    state: MuxState,
}

impl<I2C: crate::I2cBus> Tca9548a<I2C> {
    pub fn new(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Result<Self, Error<I2C::Error>> {
        let address = ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Ok(Self::from_device(Device::open(i2c, address)?))
    }

    /// The switch behind `dev` is assumed to be idle, as it is after power-up or reset.
    pub fn from_device(dev: Device<I2C>) -> Self {
        Self {
            dev,
            state: MuxState::Idle,
        }
    }

    pub fn state(&self) -> MuxState {
        self.state
    }

    pub fn mask(&self) -> u8 {
        self.state.mask()
    }

    /// Connect exactly `channel` (0 to 7).
    pub fn select_channel(&mut self, channel: u8) -> Result<(), Error<I2C::Error>> {
        if channel >= CHANNELS {
            return Err(Error::InvalidChannel(channel));
        }
        self.select_mask(1 << channel)
    }

    /// Connect all channels in `mask`.  A zero mask is the same as [`disable_all`][Self::disable_all].
    pub fn select_mask(&mut self, mask: u8) -> Result<(), Error<I2C::Error>> {
        self.dev.write_byte(mask)?;
        self.state = match mask {
            0 => MuxState::Idle,
            mask => MuxState::Selected(mask),
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("mux {=u8:#x}: {}", self.dev.address(), self.state);
        Ok(())
    }

    /// Disconnect every channel.
    pub fn disable_all(&mut self) -> Result<(), Error<I2C::Error>> {
        self.select_mask(0x00)
    }

    /// Read back the control register.
    pub fn read_mask(&mut self) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0x00];
        self.dev.read(&mut buf)?;
        Ok(buf[0])
    }

    /// Run `body` with `channel` connected, then disconnect all channels.
    ///
    /// The switch is disabled on every exit path of `body`.  If `body` fails, its error is
    /// returned even when disabling fails as well; otherwise a failure to disable is returned.
    /// If selecting the channel fails, `body` does not run.
    pub fn with_channel<R, E, F>(&mut self, channel: u8, body: F) -> Result<R, E>
    where
        F: FnOnce() -> Result<R, E>,
        E: From<Error<I2C::Error>>,
    {
        if let Err(e) = self.select_channel(channel) {
            if !matches!(e, Error::InvalidChannel(_)) {
                // the switch may have latched the new mask anyway
                let _ = self.disable_all();
            }
            return Err(e.into());
        }

        let result = body();
        let disabled = self.disable_all();

        match (result, disabled) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e.into()),
            (Ok(r), Ok(())) => Ok(r),
        }
    }

    pub fn close(&mut self) {
        self.dev.close();
    }

    pub fn release(self) -> Device<I2C> {
        self.dev
    }
}
