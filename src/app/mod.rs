//! Application core. Pure decision logic, zero I/O.
//!
//! The ventilation cascade and the tick orchestration live here. Clock,
//! weather, air quality, the RS-485 bus and the watchdog are all reached
//! through the **port traits** in [`ports`], so this layer runs unchanged
//! under host tests.

pub mod cascade;
pub mod events;
pub mod ports;
pub mod service;
