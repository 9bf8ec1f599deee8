//! ERV wall-panel protocol: modes, wire frames, and the retrying driver.

pub mod driver;
pub mod frames;
pub mod mode;

pub use driver::{ErvDriver, SendOutcome, SendStatus};
pub use mode::{Mode, ParseModeError};
