//! Support for the ADC of the Grove Base Hat for Raspberry Pi (and Pi Zero)
//!
//! The hat carries a small microcontroller sampling eight analog inputs with 12 bits.  Every
//! value is exposed as a 16-bit register; the register pointer is written first and two bytes
//! are read back in the same transaction.
use crate::codec::{self, Endianness};
use crate::{Device, Error};

/// Default bus address of the hat.
pub const ADDRESS: u8 = 0x08;

/// Number of analog channels.
pub const CHANNELS: u8 = 8;

/// Largest raw count of the 12-bit converter.
pub const FULL_SCALE: u16 = 4095;

/// Product id reported by the Grove Base Hat for Raspberry Pi.
pub const PID_BASE_HAT: u16 = 0x0004;
/// Product id reported by the Grove Base Hat for Raspberry Pi Zero.
pub const PID_BASE_HAT_ZERO: u16 = 0x0005;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    ProductId = 0x00,
    Version = 0x02,
    /// `0x10 + channel`: raw 12-bit count
    Raw = 0x10,
    /// `0x20 + channel`: input voltage in mV
    Voltage = 0x20,
    /// `0x30 + channel`: input / output ratio in 0.1 %
    Ratio = 0x30,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

/// Name of the hat, derived from its product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceName {
    BaseHat,
    BaseHatZero,
    /// The product id did not match a known hat.
    Unknown(u16),
}

impl DeviceName {
    pub fn from_pid(pid: u16) -> Self {
        match pid {
            PID_BASE_HAT => DeviceName::BaseHat,
            PID_BASE_HAT_ZERO => DeviceName::BaseHatZero,
            other => DeviceName::Unknown(other),
        }
    }
}

impl core::fmt::Display for DeviceName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeviceName::BaseHat => f.write_str("Grove Base Hat"),
            DeviceName::BaseHatZero => f.write_str("Grove Base Hat Zero"),
            DeviceName::Unknown(pid) => write!(f, "Unknown (PID=0x{:04X})", pid),
        }
    }
}

/// Grove Base Hat ADC
pub struct BaseHatAdc<I2C> {
    dev: Device<I2C>,
    endianness: Endianness,
    reference_voltage: f32,
}

impl<I2C: crate::I2cBus> BaseHatAdc<I2C> {
    /// Driver for a hat at the default address.
    pub fn new(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        Ok(Self::from_device(Device::open(i2c, ADDRESS)?))
    }

    /// Driver for an already opened handle.
    ///
    /// Words are decoded little-endian with a 3.3 V reference unless configured otherwise.
    pub fn from_device(dev: Device<I2C>) -> Self {
        Self {
            dev,
            endianness: Endianness::Little,
            reference_voltage: 3.3,
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_reference_voltage(mut self, volts: f32) -> Self {
        self.reference_voltage = volts;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Raw 12-bit count of `channel`.
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, Error<I2C::Error>> {
        let reg = Self::channel_reg(Regs::Raw, channel)?;
        Ok(self.read_register(reg)? & FULL_SCALE)
    }

    /// Input voltage of `channel` computed from the raw count and the reference voltage.
    pub fn read_voltage(&mut self, channel: u8) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_raw(channel)?;
        Ok(raw as f32 * self.reference_voltage / FULL_SCALE as f32)
    }

    /// Input voltage of `channel` in mV as measured by the hat itself.
    pub fn read_millivolts(&mut self, channel: u8) -> Result<u16, Error<I2C::Error>> {
        let reg = Self::channel_reg(Regs::Voltage, channel)?;
        self.read_register(reg)
    }

    /// Ratio of input to output voltage of `channel` in units of 0.1 %.
    pub fn read_ratio(&mut self, channel: u8) -> Result<u16, Error<I2C::Error>> {
        let reg = Self::channel_reg(Regs::Ratio, channel)?;
        self.read_register(reg)
    }

    /// Raw counts of all channels, lowest channel first.
    pub fn read_all_raw(&mut self) -> Result<[u16; CHANNELS as usize], Error<I2C::Error>> {
        let mut values = [0; CHANNELS as usize];
        for (channel, value) in (0..CHANNELS).zip(values.iter_mut()) {
            *value = self.read_raw(channel)?;
        }
        Ok(values)
    }

    /// Identify the hat.  An unrecognized product id is not an error.
    pub fn read_identity(&mut self) -> Result<DeviceName, Error<I2C::Error>> {
        let pid = self.read_register(Regs::ProductId.into())?;
        let name = DeviceName::from_pid(pid);
        #[cfg(feature = "defmt")]
        {
            if let DeviceName::Unknown(pid) = name {
                defmt::warn!("base hat: unknown product id {=u16:#06x}", pid);
            }
        }
        Ok(name)
    }

    pub fn read_version(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_register(Regs::Version.into())
    }

    /// Read any 16-bit register of the hat.
    pub fn read_register(&mut self, reg: u8) -> Result<u16, Error<I2C::Error>> {
        self.dev.read_word(reg, self.endianness)
    }

    pub fn close(&mut self) {
        self.dev.close();
    }

    pub fn release(self) -> Device<I2C> {
        self.dev
    }

    fn channel_reg(base: Regs, channel: u8) -> Result<u8, Error<I2C::Error>> {
        if channel >= CHANNELS {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(u8::from(base) + channel)
    }
}

/// Fraction of full scale of a raw count, in `[0.0, 1.0]`.
pub fn raw_to_unit(raw: u16) -> f32 {
    codec::normalize_unipolar(raw, FULL_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn raw_and_voltage() {
        let expectations = [
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x10], vec![0xff, 0x0f]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x13], vec![0xff, 0xff]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x12], vec![0x00, 0x00]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x25], vec![0xe4, 0x0c]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x37], vec![0xe8, 0x03]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut adc = BaseHatAdc::new(bus.clone()).unwrap();
        assert_eq!(adc.read_raw(0).unwrap(), 4095);
        // only the lower 12 bits carry data
        assert_eq!(adc.read_raw(3).unwrap(), 4095);
        assert_eq!(adc.read_voltage(2).unwrap(), 0.0);
        assert_eq!(adc.read_millivolts(5).unwrap(), 3300);
        assert_eq!(adc.read_ratio(7).unwrap(), 1000);

        bus.done();
    }

    #[test]
    fn full_scale_voltage() {
        let expectations = [mock_i2c::Transaction::write_read(
            ADDRESS,
            vec![0x11],
            vec![0xff, 0x0f],
        )];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut adc = BaseHatAdc::new(bus.clone())
            .unwrap()
            .with_reference_voltage(5.0);
        assert_eq!(adc.read_voltage(1).unwrap(), 5.0);

        bus.done();
    }

    #[test]
    fn big_endian_instance() {
        let expectations = [mock_i2c::Transaction::write_read(
            ADDRESS,
            vec![0x10],
            vec![0x08, 0x00],
        )];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut adc = BaseHatAdc::new(bus.clone())
            .unwrap()
            .with_endianness(Endianness::Big);
        assert_eq!(adc.read_raw(0).unwrap(), 2048);

        bus.done();
    }

    #[test]
    fn invalid_channel_never_reaches_bus() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let mut adc = BaseHatAdc::new(bus.clone()).unwrap();
        assert_eq!(adc.read_raw(8), Err(Error::InvalidChannel(8)));
        assert_eq!(adc.read_voltage(200), Err(Error::InvalidChannel(200)));
        assert_eq!(adc.read_millivolts(8), Err(Error::InvalidChannel(8)));

        bus.done();
    }

    #[test]
    fn identity() {
        let expectations = [
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x00], vec![0x04, 0x00]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x00], vec![0x05, 0x00]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x00], vec![0x34, 0x12]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x02], vec![0x01, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut adc = BaseHatAdc::new(bus.clone()).unwrap();
        let hat = adc.read_identity().unwrap();
        assert_eq!(hat, DeviceName::BaseHat);
        assert_eq!(hat.to_string(), "Grove Base Hat");
        let zero = adc.read_identity().unwrap();
        assert_eq!(zero, DeviceName::BaseHatZero);
        assert_eq!(zero.to_string(), "Grove Base Hat Zero");
        let unknown = adc.read_identity().unwrap();
        assert_eq!(unknown, DeviceName::Unknown(0x1234));
        assert_eq!(unknown.to_string(), "Unknown (PID=0x1234)");
        assert_eq!(adc.read_version().unwrap(), 1);

        bus.done();
    }

    #[test]
    fn closed_driver() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let mut adc = BaseHatAdc::new(bus.clone()).unwrap();
        adc.close();
        adc.close();
        assert_eq!(adc.read_raw(0), Err(Error::BusUnavailable));

        bus.done();
    }

    #[test]
    fn unit_fraction() {
        assert_eq!(raw_to_unit(0), 0.0);
        assert_eq!(raw_to_unit(FULL_SCALE), 1.0);
    }
}
