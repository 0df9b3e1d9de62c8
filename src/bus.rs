use crate::codec::{self, Endianness};
use embedded_hal::i2c as hal_i2c;

/// Blanket trait for types implementing `i2c::I2c` with 7-bit addressing
pub trait I2cBus: hal_i2c::I2c<hal_i2c::SevenBitAddress> {}

impl<T> I2cBus for T where T: hal_i2c::I2c<hal_i2c::SevenBitAddress> {}

pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        bits: u8,
        mask: u8,
    ) -> Result<u8, Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
    fn read_block<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        buf: &mut [u8],
    ) -> Result<(), Self::Error>;
    fn read_word<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        endianness: Endianness,
    ) -> Result<u16, Self::Error>;
    fn write_word<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u16,
        endianness: Endianness,
    ) -> Result<(), Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = I2C::Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[reg.into(), value])?;
        Ok(())
    }

    /// Read-modify-write of the bits in `mask`.  Returns the value that was written.
    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        bits: u8,
        mask: u8,
    ) -> Result<u8, Self::Error> {
        let reg = reg.into();
        let mut buf = [0x00];
        self.write_read(addr, &[reg], &mut buf)?;
        let value = codec::pack_bitfield(buf[0], bits, mask);
        self.write(addr, &[reg, value])?;
        Ok(value)
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }

    fn read_block<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(addr, &[reg.into()], buf)?;
        Ok(())
    }

    fn read_word<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        endianness: Endianness,
    ) -> Result<u16, Self::Error> {
        let mut buf = [0x00; 2];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(codec::decode_u16(buf, endianness))
    }

    fn write_word<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u16,
        endianness: Endianness,
    ) -> Result<(), Self::Error> {
        let [b0, b1] = codec::encode_u16(value, endianness);
        self.write(addr, &[reg.into(), b0, b1])?;
        Ok(())
    }
}
