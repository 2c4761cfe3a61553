//! Controller traits and abstractions
//!
//! This module defines the traits the driver uses to reach the physical
//! bus: the transaction executor and the raw line-control capability used
//! by the recovery reset.

mod traits;

pub use traits::*;
