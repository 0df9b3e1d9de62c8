//! Support for the Grove multi-channel I2C relay boards (2-, 4- and 8-channel)
//!
//! The board firmware exposes a handful of command registers.  Channel state is a bitmask,
//! bit `n` switching relay `n`.  The board's own bus address can be changed and is stored
//! persistently by the firmware.
use crate::{Device, Error};

/// Default bus address.
pub const ADDRESS: u8 = 0x12;

/// Channels of the 4-channel board.
pub const DEFAULT_CHANNELS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    ChannelControl = 0x10,
    SaveAddress = 0x11,
    ReadAddress = 0x12,
    FirmwareVersion = 0x13,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

/// Grove Multi Channel Relay
pub struct MultiRelay<I2C> {
    dev: Device<I2C>,
    channels: u8,
    status: u8,
}

impl<I2C: crate::I2cBus> MultiRelay<I2C> {
    /// 4-channel board at the default address.
    pub fn new(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        Self::from_device(Device::open(i2c, ADDRESS)?, DEFAULT_CHANNELS)
    }

    /// Board with `channels` relays (1 to 8) behind an already opened handle.
    pub fn from_device(dev: Device<I2C>, channels: u8) -> Result<Self, Error<I2C::Error>> {
        if channels == 0 || channels > 8 {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            dev,
            channels,
            status: 0,
        })
    }

    pub fn address(&self) -> u8 {
        self.dev.address()
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Last channel mask written to or read from the board.
    pub fn channel_status(&self) -> u8 {
        self.status
    }

    /// Switch all relays at once.  Bit `n` of `mask` turns relay `n` on.
    pub fn write_channel_status(&mut self, mask: u8) -> Result<(), Error<I2C::Error>> {
        if u16::from(mask) >= 1 << self.channels {
            return Err(Error::InvalidArgument);
        }
        self.dev.write_reg(Regs::ChannelControl.into(), mask)?;
        self.status = mask;
        #[cfg(feature = "defmt")]
        defmt::debug!("relay {=u8:#x}: channels {=u8:#b}", self.dev.address(), mask);
        Ok(())
    }

    pub fn read_channel_status(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.status = self.dev.read_reg(Regs::ChannelControl.into())?;
        Ok(self.status)
    }

    /// Turn relay `channel` on, leaving the others as last written.
    pub fn turn_on(&mut self, channel: u8) -> Result<(), Error<I2C::Error>> {
        let bit = self.channel_bit(channel)?;
        self.write_channel_status(self.status | bit)
    }

    /// Turn relay `channel` off, leaving the others as last written.
    pub fn turn_off(&mut self, channel: u8) -> Result<(), Error<I2C::Error>> {
        let bit = self.channel_bit(channel)?;
        self.write_channel_status(self.status & !bit)
    }

    /// Reprogram the board's bus address.
    ///
    /// The handle keeps using the old address until the board acknowledged the command; after
    /// that, all further transactions go to `address`.  On a [`SharedBus`][crate::SharedBus]
    /// the new address must be free and the old one is released once the board moved.
    pub fn set_device_address(&mut self, address: u8) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        let old = self.dev.address();
        self.dev.readdress(address, |dev| {
            dev.write_reg(Regs::SaveAddress.into(), address)
        })?;
        #[cfg(feature = "defmt")]
        defmt::debug!("relay {=u8:#x}: moved to {=u8:#x}", old, address);
        Ok(())
    }

    /// Address the board reports for itself.
    pub fn read_device_address(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.dev.read_reg(Regs::ReadAddress.into())
    }

    pub fn firmware_version(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.dev.read_reg(Regs::FirmwareVersion.into())
    }

    pub fn close(&mut self) {
        self.dev.close();
    }

    pub fn release(self) -> Device<I2C> {
        self.dev
    }

    fn channel_bit(&self, channel: u8) -> Result<u8, Error<I2C::Error>> {
        if channel >= self.channels {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(1 << channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SharedBus;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn channel_status() {
        let expectations = [
            mock_i2c::Transaction::write(ADDRESS, vec![0x10, 0x09]),
            mock_i2c::Transaction::write_read(ADDRESS, vec![0x10], vec![0x09]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut relay = MultiRelay::new(bus.clone()).unwrap();
        relay.write_channel_status(9).unwrap();
        assert_eq!(relay.read_channel_status().unwrap(), 9);

        bus.done();
    }

    #[test]
    fn mask_wider_than_board() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let mut relay = MultiRelay::new(bus.clone()).unwrap();
        assert_eq!(relay.write_channel_status(16), Err(Error::InvalidArgument));
        assert_eq!(relay.turn_on(4), Err(Error::InvalidChannel(4)));

        bus.done();
    }

    #[test]
    fn eight_channel_board() {
        let expectations = [mock_i2c::Transaction::write(ADDRESS, vec![0x10, 0xff])];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let dev = Device::open(bus.clone(), ADDRESS).unwrap();
        let mut relay = MultiRelay::from_device(dev, 8).unwrap();
        relay.write_channel_status(0xff).unwrap();

        bus.done();
    }

    #[test]
    fn single_channels() {
        let expectations = [
            mock_i2c::Transaction::write(ADDRESS, vec![0x10, 0b0001]),
            mock_i2c::Transaction::write(ADDRESS, vec![0x10, 0b1001]),
            mock_i2c::Transaction::write(ADDRESS, vec![0x10, 0b1000]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut relay = MultiRelay::new(bus.clone()).unwrap();
        relay.turn_on(0).unwrap();
        relay.turn_on(3).unwrap();
        relay.turn_off(0).unwrap();
        assert_eq!(relay.channel_status(), 0b1000);

        bus.done();
    }

    #[test]
    fn readdressing() {
        let expectations = [
            mock_i2c::Transaction::write(ADDRESS, vec![0x11, 0x21]),
            mock_i2c::Transaction::write_read(0x21, vec![0x12], vec![0x21]),
            mock_i2c::Transaction::write_read(0x21, vec![0x13], vec![0x02]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut relay = MultiRelay::new(bus.clone()).unwrap();
        relay.set_device_address(0x21).unwrap();
        assert_eq!(relay.address(), 0x21);
        assert_eq!(relay.read_device_address().unwrap(), 0x21);
        assert_eq!(relay.firmware_version().unwrap(), 0x02);

        bus.done();
    }

    #[test]
    fn readdressing_nack_keeps_old_address() {
        let expectations = [mock_i2c::Transaction::write(ADDRESS, vec![0x11, 0x21])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data))];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut relay = MultiRelay::new(bus.clone()).unwrap();
        assert!(relay.set_device_address(0x21).is_err());
        assert_eq!(relay.address(), ADDRESS);
        assert_eq!(relay.set_device_address(0x80), Err(Error::InvalidArgument));

        bus.done();
    }

    #[test]
    fn readdressing_moves_bus_claim() {
        let expectations = [
            mock_i2c::Transaction::write(ADDRESS, vec![0x11, 0x21]),
            mock_i2c::Transaction::write(0x21, vec![0x10, 0x01]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let shared = SharedBus::new(1, bus.clone());
        let mut relay = MultiRelay::from_device(shared.open(ADDRESS).unwrap(), 4).unwrap();
        relay.set_device_address(0x21).unwrap();
        assert_eq!(relay.address(), 0x21);
        assert!(shared.is_claimed(0x21));
        assert!(!shared.is_claimed(ADDRESS));
        assert!(matches!(shared.open(0x21), Err(Error::BusUnavailable)));

        let vacated = shared.open(ADDRESS).unwrap();
        drop(vacated);

        relay.write_channel_status(0x01).unwrap();
        drop(relay);
        assert!(!shared.is_claimed(0x21));

        bus.done();
    }

    #[test]
    fn readdressing_to_claimed_address() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let shared = SharedBus::new(1, bus.clone());
        let mut relay = MultiRelay::from_device(shared.open(ADDRESS).unwrap(), 4).unwrap();
        let _other = shared.open(0x30).unwrap();
        assert_eq!(relay.set_device_address(0x30), Err(Error::BusUnavailable));
        assert_eq!(relay.address(), ADDRESS);
        assert!(shared.is_claimed(ADDRESS));

        bus.done();
    }

    #[test]
    fn readdressing_nack_drops_new_claim() {
        let expectations = [mock_i2c::Transaction::write(ADDRESS, vec![0x11, 0x21])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data))];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let shared = SharedBus::new(1, bus.clone());
        let mut relay = MultiRelay::from_device(shared.open(ADDRESS).unwrap(), 4).unwrap();
        assert!(relay.set_device_address(0x21).is_err());
        assert_eq!(relay.address(), ADDRESS);
        assert!(shared.is_claimed(ADDRESS));
        assert!(!shared.is_claimed(0x21));

        bus.done();
    }
}
