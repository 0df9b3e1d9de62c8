//! The device module contains the drivers for each of the supported Grove modules.
//!
//! The driver types themselves are re-exported at the root of the crate; the per-device
//! modules additionally hold register constants and the setting enums.

pub mod ads1115;
pub mod base_hat;
pub mod joystick;
pub mod mcp9600;
pub mod multi_relay;
pub mod probe;
pub mod tca9548a;
