use crate::codec::Endianness;
use crate::{Error, I2cExt};

/// Highest valid 7-bit bus address.
pub const MAX_ADDRESS: u8 = 0x7f;

/// A bus bound to a single device address.
///
/// All drivers in this crate own one `Device`.  Transactions on a closed handle fail with
/// [`Error::BusUnavailable`], closing is idempotent and never fails.
pub struct Device<I2C> {
    i2c: Option<I2C>,
    address: u8,
    claims: Option<Claims<I2C>>,
}

/// Address bookkeeping of the bus a handle was opened from.
///
/// Only handles from a [`SharedBus`][crate::SharedBus] carry claims; a bus owned by a single
/// handle has nothing to track.
pub(crate) struct Claims<I2C> {
    /// Claim an additional address, `false` if another handle holds it.
    pub(crate) reserve: fn(&mut I2C, u8) -> bool,
    /// Give up an address claimed with `reserve`.
    pub(crate) release: fn(&mut I2C, u8),
    /// Release the bound address and take over one claimed with `reserve`.
    pub(crate) rebind: fn(&mut I2C, u8),
}

impl<I2C> Clone for Claims<I2C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I2C> Copy for Claims<I2C> {}

impl<I2C: crate::I2cBus> Device<I2C> {
    /// Bind `i2c` to the 7-bit `address`.
    pub fn open(i2c: I2C, address: u8) -> Result<Self, Error<I2C::Error>> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            i2c: Some(i2c),
            address,
            claims: None,
        })
    }

    pub(crate) fn with_claims(mut self, claims: Claims<I2C>) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_open(&self) -> bool {
        self.i2c.is_some()
    }

    /// Release the bus.  Calling this on an already closed handle does nothing.
    pub fn close(&mut self) {
        self.i2c = None;
    }

    /// Close the handle and give back the bus, if it was still open.
    pub fn release(mut self) -> Option<I2C> {
        self.i2c.take()
    }

    /// Single-byte write transaction.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error<I2C::Error>> {
        self.write(&[byte])
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.bus()?
            .write(address, bytes)
            .map_err(Error::Transport)
    }

    /// Read exactly `buf.len()` bytes.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.bus()?
            .read(address, buf)
            .map_err(Error::Transport)
    }

    /// Write `bytes` and read `buf.len()` bytes in one transaction, without releasing the bus in
    /// between.
    pub fn write_read(&mut self, bytes: &[u8], buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        self.bus()?
            .write_read(address, bytes, buf)
            .map_err(Error::Transport)
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.read_reg(address, reg)?)
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.write_reg(address, reg, value)?)
    }

    /// Read-modify-write: replace the bits of `reg` selected by `mask` with `bits`.
    ///
    /// Returns the full register value that was written back.
    pub fn update_reg(&mut self, reg: u8, bits: u8, mask: u8) -> Result<u8, Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.update_reg(address, reg, bits, mask)?)
    }

    pub fn read_block(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.read_block(address, reg, buf)?)
    }

    pub fn read_word(
        &mut self,
        reg: u8,
        endianness: Endianness,
    ) -> Result<u16, Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.read_word(address, reg, endianness)?)
    }

    pub fn write_word(
        &mut self,
        reg: u8,
        value: u16,
        endianness: Endianness,
    ) -> Result<(), Error<I2C::Error>> {
        let address = self.address;
        Ok(self.bus()?.write_word(address, reg, value, endianness)?)
    }

    /// Move this handle to `address` after `command` told the device to switch over.
    ///
    /// `address` is claimed on the bus before `command` runs and fails with
    /// [`Error::BusUnavailable`] if another handle holds it.  The handle is rebound only when
    /// `command` succeeded; otherwise the new claim is dropped again.
    pub(crate) fn readdress<F>(
        &mut self,
        address: u8,
        command: F,
    ) -> Result<(), Error<I2C::Error>>
    where
        F: FnOnce(&mut Self) -> Result<(), Error<I2C::Error>>,
    {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidArgument);
        }
        if address == self.address {
            return command(self);
        }

        let claims = self.claims;
        if let (Some(claims), Some(i2c)) = (claims, self.i2c.as_mut()) {
            if !(claims.reserve)(i2c, address) {
                return Err(Error::BusUnavailable);
            }
        }

        let result = command(self);
        if let (Some(claims), Some(i2c)) = (claims, self.i2c.as_mut()) {
            match result {
                Ok(()) => (claims.rebind)(i2c, address),
                Err(_) => (claims.release)(i2c, address),
            }
        }
        if result.is_ok() {
            self.address = address;
        }
        result
    }

    fn bus(&mut self) -> Result<&mut I2C, Error<I2C::Error>> {
        self.i2c.as_mut().ok_or(Error::BusUnavailable)
    }
}
