//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against the
//! mock adapters. All tests run on the host with no real bus attached.

mod driver_tests;
mod mock_hw;
mod scenario_tests;
