//! Support for the MCP9600 "Thermocouple EMF to Temperature Converter" (Grove Thermocouple
//! Amplifier)
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/DeviceDoc/20005602C.pdf
//!
//! Temperature registers are big-endian two's complement with 0.0625 °C per LSB.  The two
//! configuration registers pack several unrelated settings each; every setter below only
//! touches its own bits:
//!
//! | Register | Bits | Setting |
//! | --- | --- | --- |
//! | Sensor configuration (0x05) | 6..4 | thermocouple type |
//! | Sensor configuration (0x05) | 2..0 | filter coefficient |
//! | Device configuration (0x06) | 7 | cold-junction resolution |
//! | Device configuration (0x06) | 6..5 | ADC resolution |
//! | Device configuration (0x06) | 4..2 | burst mode samples |
//! | Device configuration (0x06) | 1..0 | shutdown mode |
use crate::codec::{self, Endianness};
use crate::{Device, Error};

/// Default bus address of the Grove module.
pub const ADDRESS: u8 = 0x60;

/// Temperature per LSB of the hot, delta and cold junction registers.
pub const TEMPERATURE_LSB: f32 = 0.0625;

/// Largest filter coefficient.
pub const FILTER_MAX: u8 = 7;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    HotJunction = 0x00,
    JunctionDelta = 0x01,
    ColdJunction = 0x02,
    RawAdc = 0x03,
    Status = 0x04,
    SensorConfig = 0x05,
    DeviceConfig = 0x06,
    DeviceId = 0x20,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

const FILTER_MASK: u8 = 0b0000_0111;
const TYPE_MASK: u8 = 0b0111_0000;
const TYPE_SHIFT: u8 = 4;
const SHUTDOWN_MASK: u8 = 0b0000_0011;
const BURST_MASK: u8 = 0b0001_1100;
const BURST_SHIFT: u8 = 2;
const ADC_RES_MASK: u8 = 0b0110_0000;
const ADC_RES_SHIFT: u8 = 5;
const COLD_RES_MASK: u8 = 0b1000_0000;
const COLD_RES_SHIFT: u8 = 7;

/// Which temperature register to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Junction {
    /// Thermocouple (measurement) junction, cold-junction compensated.
    Hot,
    /// Difference between hot and cold junction.
    Delta,
    /// Ambient (reference) junction.
    Cold,
}

impl Junction {
    fn reg(self) -> Regs {
        match self {
            Junction::Hot => Regs::HotJunction,
            Junction::Delta => Regs::JunctionDelta,
            Junction::Cold => Regs::ColdJunction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThermocoupleType {
    K = 0,
    J = 1,
    T = 2,
    N = 3,
    S = 4,
    E = 5,
    B = 6,
    R = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColdJunctionResolution {
    /// 0.0625 °C
    Sixteenth = 0,
    /// 0.25 °C
    Quarter = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcResolution {
    Bits18 = 0,
    Bits16 = 1,
    Bits14 = 2,
    Bits12 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstSamples {
    S1 = 0,
    S2 = 1,
    S4 = 2,
    S8 = 3,
    S16 = 4,
    S32 = 5,
    S64 = 6,
    S128 = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutdownMode {
    Normal = 0,
    Shutdown = 1,
    Burst = 2,
}

/// Grove Thermocouple Amplifier (MCP9600)
pub struct Mcp9600<I2C> {
    dev: Device<I2C>,
    endianness: Endianness,
}

impl<I2C: crate::I2cBus> Mcp9600<I2C> {
    pub fn new(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        Ok(Self::from_device(Device::open(i2c, ADDRESS)?))
    }

    pub fn from_device(dev: Device<I2C>) -> Self {
        Self {
            dev,
            endianness: Endianness::Big,
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Temperature of `junction` in °C.
    pub fn read_temperature(&mut self, junction: Junction) -> Result<f32, Error<I2C::Error>> {
        let mut buf = [0x00; 2];
        self.dev.read_block(junction.reg().into(), &mut buf)?;
        let raw = codec::decode_i16(buf, self.endianness);
        Ok(codec::scale_temperature(raw, TEMPERATURE_LSB))
    }

    pub fn set_filter_coefficient(&mut self, coefficient: u8) -> Result<(), Error<I2C::Error>> {
        if coefficient > FILTER_MAX {
            return Err(Error::InvalidArgument);
        }
        self.dev
            .update_reg(Regs::SensorConfig.into(), coefficient, FILTER_MASK)?;
        Ok(())
    }

    pub fn set_thermocouple_type(&mut self, ty: ThermocoupleType) -> Result<(), Error<I2C::Error>> {
        self.dev
            .update_reg(Regs::SensorConfig.into(), (ty as u8) << TYPE_SHIFT, TYPE_MASK)?;
        Ok(())
    }

    pub fn set_cold_junction_resolution(
        &mut self,
        res: ColdJunctionResolution,
    ) -> Result<(), Error<I2C::Error>> {
        self.dev.update_reg(
            Regs::DeviceConfig.into(),
            (res as u8) << COLD_RES_SHIFT,
            COLD_RES_MASK,
        )?;
        Ok(())
    }

    pub fn set_adc_resolution(&mut self, res: AdcResolution) -> Result<(), Error<I2C::Error>> {
        self.dev.update_reg(
            Regs::DeviceConfig.into(),
            (res as u8) << ADC_RES_SHIFT,
            ADC_RES_MASK,
        )?;
        Ok(())
    }

    pub fn set_burst_samples(&mut self, samples: BurstSamples) -> Result<(), Error<I2C::Error>> {
        self.dev.update_reg(
            Regs::DeviceConfig.into(),
            (samples as u8) << BURST_SHIFT,
            BURST_MASK,
        )?;
        Ok(())
    }

    pub fn set_shutdown_mode(&mut self, mode: ShutdownMode) -> Result<(), Error<I2C::Error>> {
        self.dev
            .update_reg(Regs::DeviceConfig.into(), mode as u8, SHUTDOWN_MASK)?;
        Ok(())
    }

    /// Raw `(device configuration, sensor configuration)` registers.
    pub fn get_config(&mut self) -> Result<(u8, u8), Error<I2C::Error>> {
        let device = self.dev.read_reg(Regs::DeviceConfig.into())?;
        let sensor = self.dev.read_reg(Regs::SensorConfig.into())?;
        Ok((device, sensor))
    }

    /// `(device id, revision)`; the MCP9600 reports id 0x40.
    pub fn read_version(&mut self) -> Result<(u8, u8), Error<I2C::Error>> {
        let mut buf = [0x00; 2];
        self.dev.read_block(Regs::DeviceId.into(), &mut buf)?;
        Ok((buf[0], buf[1]))
    }

    /// Raw status register (burst complete, update flag, input range, alerts).
    pub fn read_status(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.dev.read_reg(Regs::Status.into())
    }

    pub fn close(&mut self) {
        self.dev.close();
    }

    pub fn release(self) -> Device<I2C> {
        self.dev
    }
}
