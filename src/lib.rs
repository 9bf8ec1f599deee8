//! ERV controller firmware library.
//!
//! Exposes the protocol driver and the decision core for the firmware
//! binary, the host CLI and integration tests. ESP-IDF-specific code is
//! guarded by the `espidf` feature within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod erv;
pub mod pins;
pub mod ticker;

pub use error::{Error, Result};
