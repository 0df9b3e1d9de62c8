//! Register-level drivers for Grove I2C modules.
//!
//! Every driver owns a [`Device`], a bus bound to one 7-bit address.  The bus is anything
//! implementing [`embedded_hal::i2c::I2c`]; to put several drivers on one physical bus (e.g.
//! behind a [`Tca9548a`] multiplexer) open their handles from a [`SharedBus`].
//!
//! ## Features
//!
//! - **`async`** (default): [`poll::Poller::run_async`] using `embedded-hal-async` delays.
//! - **`std`**: [`BusMutex`] for `std::sync::Mutex` and `std::error::Error` for [`Error`].
//! - **`critical-section`**: [`BusMutex`] for `critical_section::Mutex<RefCell<_>>`.
//! - **`defmt`**: `defmt::Format` for public types and debug logging of state changes.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bus;
pub mod codec;
pub mod dev;
mod device;
mod error;
mod mutex;
pub mod poll;
mod shared;

pub use bus::I2cBus;
pub use codec::Endianness;
pub use device::{Device, MAX_ADDRESS};
pub use error::Error;
pub use mutex::BusMutex;
pub use shared::{BusRef, BusState, ClaimTable, SharedBus};

pub(crate) use bus::I2cExt;

pub use dev::ads1115::Ads1115;
pub use dev::base_hat::BaseHatAdc;
pub use dev::joystick::Joystick;
pub use dev::mcp9600::Mcp9600;
pub use dev::multi_relay::MultiRelay;
pub use dev::tca9548a::Tca9548a;
