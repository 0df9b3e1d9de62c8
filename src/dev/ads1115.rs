//! Support for the ADS1115 "16-Bit, 860-SPS, 4-Channel ADC with PGA"
//!
//! Datasheet: https://www.ti.com/lit/ds/symlink/ads1115.pdf
//!
//! Only single-shot conversions are supported.  A conversion is started by writing the config
//! register with the OS bit set, the OS bit then reads back as 1 once the result is available in
//! the conversion register.  Both registers are big-endian 16 bit, conversion results are two's
//! complement.
use crate::codec::{self, Endianness};
use crate::{Device, Error};
use embedded_hal::delay::DelayNs;

/// Default bus address (ADDR pin to GND).
pub const ADDRESS: u8 = 0x48;

/// How often the OS bit is polled after the nominal conversion time before giving up.
const READY_POLLS: u32 = 10;
const READY_POLL_INTERVAL_US: u32 = 100;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    Conversion = 0x00,
    Config = 0x01,
    LowThreshold = 0x02,
    HighThreshold = 0x03,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

const CONFIG_OS: u16 = 1 << 15;
const CONFIG_MUX_SHIFT: u16 = 12;
const CONFIG_PGA_SHIFT: u16 = 9;
const CONFIG_MODE_SINGLE: u16 = 1 << 8;
const CONFIG_DR_SHIFT: u16 = 5;
const CONFIG_COMP_DISABLE: u16 = 0b11;

/// Input multiplexer setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    Ain0Ain1 = 0,
    Ain0Ain3 = 1,
    Ain1Ain3 = 2,
    Ain2Ain3 = 3,
    Ain0 = 4,
    Ain1 = 5,
    Ain2 = 6,
    Ain3 = 7,
}

/// Programmable gain, named by its full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    Fs6_144 = 0,
    Fs4_096 = 1,
    Fs2_048 = 2,
    Fs1_024 = 3,
    Fs0_512 = 4,
    Fs0_256 = 5,
}

impl Gain {
    /// Full-scale range in volts.
    pub fn full_scale(self) -> f32 {
        match self {
            Gain::Fs6_144 => 6.144,
            Gain::Fs4_096 => 4.096,
            Gain::Fs2_048 => 2.048,
            Gain::Fs1_024 => 1.024,
            Gain::Fs0_512 => 0.512,
            Gain::Fs0_256 => 0.256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Sps8 = 0,
    Sps16 = 1,
    Sps32 = 2,
    Sps64 = 3,
    Sps128 = 4,
    Sps250 = 5,
    Sps475 = 6,
    Sps860 = 7,
}

impl DataRate {
    fn samples_per_second(self) -> u32 {
        match self {
            DataRate::Sps8 => 8,
            DataRate::Sps16 => 16,
            DataRate::Sps32 => 32,
            DataRate::Sps64 => 64,
            DataRate::Sps128 => 128,
            DataRate::Sps250 => 250,
            DataRate::Sps475 => 475,
            DataRate::Sps860 => 860,
        }
    }

    /// Nominal duration of one conversion.
    pub fn conversion_time_us(self) -> u32 {
        1_000_000u32.div_ceil(self.samples_per_second())
    }
}

/// ADS1115 16-bit ADC
pub struct Ads1115<I2C, D> {
    dev: Device<I2C>,
    delay: D,
    gain: Gain,
    rate: DataRate,
}

impl<I2C: crate::I2cBus, D: DelayNs> Ads1115<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Ok(Self::from_device(Device::open(i2c, ADDRESS)?, delay))
    }

    /// Defaults to the power-on settings: ±2.048 V, 128 samples per second.
    pub fn from_device(dev: Device<I2C>, delay: D) -> Self {
        Self {
            dev,
            delay,
            gain: Gain::Fs2_048,
            rate: DataRate::Sps128,
        }
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_data_rate(mut self, rate: DataRate) -> Self {
        self.rate = rate;
        self
    }

    /// Config word that starts a single-shot conversion of `input`.
    pub fn config_word(&self, input: Input) -> u16 {
        CONFIG_OS
            | (input as u16) << CONFIG_MUX_SHIFT
            | (self.gain as u16) << CONFIG_PGA_SHIFT
            | CONFIG_MODE_SINGLE
            | (self.rate as u16) << CONFIG_DR_SHIFT
            | CONFIG_COMP_DISABLE
    }

    /// Run a single-shot conversion and return the signed result.
    pub fn read_raw(&mut self, input: Input) -> Result<i16, Error<I2C::Error>> {
        let config = self.config_word(input);
        self.dev
            .write_word(Regs::Config.into(), config, Endianness::Big)?;
        self.delay.delay_us(self.rate.conversion_time_us());

        let mut polls = 0;
        while self.read_config()? & CONFIG_OS == 0 {
            polls += 1;
            if polls >= READY_POLLS {
                return Err(Error::Timeout);
            }
            self.delay.delay_us(READY_POLL_INTERVAL_US);
        }

        let mut buf = [0x00; 2];
        self.dev.read_block(Regs::Conversion.into(), &mut buf)?;
        Ok(codec::decode_i16(buf, Endianness::Big))
    }

    /// Run a single-shot conversion and scale it by the configured full-scale range.
    pub fn read_voltage(&mut self, input: Input) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_raw(input)?;
        Ok(raw as f32 * self.gain.full_scale() / 32768.0)
    }

    pub fn read_config(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.dev.read_word(Regs::Config.into(), Endianness::Big)
    }

    pub fn close(&mut self) {
        self.dev.close();
    }

    pub fn release(self) -> (Device<I2C>, D) {
        (self.dev, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn single_shot() {
        let expectations = [
            mock_i2c::Transaction::write(ADDRESS, vec![0x01, 0xc5, 0x83]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x01], vec![0x05, 0x83]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x01], vec![0x85, 0x83]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x00], vec![0x40, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut ads = Ads1115::new(bus.clone(), NoopDelay::new()).unwrap();
        assert_eq!(ads.read_voltage(Input::Ain0).unwrap(), 1.024);

        bus.done();
    }

    #[test]
    fn negative_differential() {
        let expectations = [
            // Ain0Ain1, ±4.096 V, 475 SPS
            mock_i2c::Transaction::write(ADDRESS, vec![0x01, 0x83, 0xc3]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x01], vec![0x83, 0xc3]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x00], vec![0xff, 0xfe]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut ads = Ads1115::new(bus.clone(), NoopDelay::new())
            .unwrap()
            .with_gain(Gain::Fs4_096)
            .with_data_rate(DataRate::Sps475);
        assert_eq!(ads.read_raw(Input::Ain0Ain1).unwrap(), -2);

        bus.done();
    }

    #[test]
    fn conversion_never_finishes() {
        let mut expectations = vec![mock_i2c::Transaction::write(
            ADDRESS,
            vec![0x01, 0xd5, 0x83],
        )];
        for _ in 0..READY_POLLS {
            expectations.push(mock_i2c::Transaction::write_read(
                ADDRESS,
                vec![0x01],
                vec![0x55, 0x83],
            ));
        }
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut ads = Ads1115::new(bus.clone(), NoopDelay::new()).unwrap();
        assert_eq!(ads.read_raw(Input::Ain1), Err(Error::Timeout));

        bus.done();
    }

    #[test]
    fn conversion_times() {
        assert_eq!(DataRate::Sps8.conversion_time_us(), 125_000);
        assert_eq!(DataRate::Sps860.conversion_time_us(), 1163);
    }
}
