//! EMxxLX protocol implementation
//!
//! This module implements the device command set and the two composite
//! sequences (bring-up and factory re-provisioning) on top of the
//! controller traits.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async

mod init;
mod ops;
mod provision;
mod reset;

pub use ops::{Emxxlx, Timeout};
pub use provision::ArrayCheck;
pub use reset::line_reset;
