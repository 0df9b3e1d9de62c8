//! Grove Thumb Joystick, read through two channels of the Base Hat ADC
use crate::codec;
use crate::dev::base_hat::{BaseHatAdc, FULL_SCALE};
use crate::Error;

/// Raw count of a centered axis.
pub const CENTER: u16 = 2048;

/// Default dead zone used by [`Joystick::direction`] callers.
pub const DEFAULT_DEADZONE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Center,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Dominant direction of a normalized position.
    ///
    /// Both axes within `deadzone` of the center count as [`Direction::Center`].
    pub fn from_position(x: f32, y: f32, deadzone: f32) -> Self {
        if x.abs() < deadzone && y.abs() < deadzone {
            Direction::Center
        } else if x.abs() > y.abs() {
            if x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Joystick on two channels of a shared [`BaseHatAdc`].
///
/// The joystick only borrows the ADC, closing it is up to the owner.
pub struct Joystick<'a, I2C> {
    adc: &'a mut BaseHatAdc<I2C>,
    channel_x: u8,
    channel_y: u8,
}

impl<'a, I2C: crate::I2cBus> Joystick<'a, I2C> {
    pub fn new(adc: &'a mut BaseHatAdc<I2C>, channel_x: u8, channel_y: u8) -> Self {
        Self {
            adc,
            channel_x,
            channel_y,
        }
    }

    pub fn read_raw(&mut self) -> Result<(u16, u16), Error<I2C::Error>> {
        let x = self.adc.read_raw(self.channel_x)?;
        let y = self.adc.read_raw(self.channel_y)?;
        Ok((x, y))
    }

    /// Both axes in volts, as measured by the hat.
    pub fn read_voltage(&mut self) -> Result<(f32, f32), Error<I2C::Error>> {
        let x = self.adc.read_millivolts(self.channel_x)?;
        let y = self.adc.read_millivolts(self.channel_y)?;
        Ok((f32::from(x) / 1000.0, f32::from(y) / 1000.0))
    }

    /// Both axes in `[-1.0, 1.0]`, `0.0` being the rest position.
    pub fn read_normalized(&mut self) -> Result<(f32, f32), Error<I2C::Error>> {
        let (x, y) = self.read_raw()?;
        Ok((
            codec::normalize(x, CENTER, FULL_SCALE),
            codec::normalize(y, CENTER, FULL_SCALE),
        ))
    }

    pub fn direction(&mut self, deadzone: f32) -> Result<Direction, Error<I2C::Error>> {
        let (x, y) = self.read_normalized()?;
        Ok(Direction::from_position(x, y, deadzone))
    }
}
