//! Identify Bosch environmental sensors by their chip-id register
//!
//! BMP180, BMP280 and BME680 all expose their chip id at register 0xD0, which makes it possible
//! to tell them apart without knowing which one is fitted.
use crate::{Device, Error};

/// Chip-id register shared by the sensors below.
pub const CHIP_ID_REG: u8 = 0xd0;

/// The two addresses these sensors can be strapped to.
pub const ADDRESSES: [u8; 2] = [0x76, 0x77];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipId {
    Bmp180,
    Bmp280,
    Bme680,
    Unknown(u8),
}

impl ChipId {
    pub fn from_id(id: u8) -> Self {
        match id {
            0x55 => ChipId::Bmp180,
            0x58 | 0x60 => ChipId::Bmp280,
            0x61 => ChipId::Bme680,
            other => ChipId::Unknown(other),
        }
    }
}

impl core::fmt::Display for ChipId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChipId::Bmp180 => f.write_str("BMP180"),
            ChipId::Bmp280 => f.write_str("BMP280"),
            ChipId::Bme680 => f.write_str("BME680"),
            ChipId::Unknown(id) => write!(f, "Unknown (ID=0x{:02X})", id),
        }
    }
}

/// Read the chip id of the device behind `dev`.
pub fn identify<I2C: crate::I2cBus>(dev: &mut Device<I2C>) -> Result<ChipId, Error<I2C::Error>> {
    let id = dev.read_reg(CHIP_ID_REG)?;
    Ok(ChipId::from_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn identifies_sensors() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x76, vec![0xd0], vec![0x60]),
            mock_i2c::Transaction::write_read(0x76, vec![0xd0], vec![0x61]),
            mock_i2c::Transaction::write_read(0x76, vec![0xd0], vec![0x42]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut dev = Device::open(bus.clone(), ADDRESSES[0]).unwrap();
        assert_eq!(identify(&mut dev).unwrap(), ChipId::Bmp280);
        assert_eq!(identify(&mut dev).unwrap(), ChipId::Bme680);
        let unknown = identify(&mut dev).unwrap();
        assert_eq!(unknown.to_string(), "Unknown (ID=0x42)");

        bus.done();
    }

    #[test]
    fn absent_sensor() {
        let expectations = [mock_i2c::Transaction::write_read(0x77, vec![0xd0], vec![0x00])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut dev = Device::open(bus.clone(), ADDRESSES[1]).unwrap();
        assert!(matches!(identify(&mut dev), Err(Error::Transport(_))));

        bus.done();
    }
}
