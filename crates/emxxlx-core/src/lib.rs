//! emxxlx-core - Protocol driver for Everspin EMxxLX xSPI MRAM devices
//!
//! This crate implements the EMxxLX command set, configuration register
//! management and interface-mode bring-up over a controller-agnostic
//! transaction trait. It is designed to be `no_std` compatible for use in
//! embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (error trait, test helpers)
//! - `is_sync` - Compile the protocol layer as blocking/synchronous
//!
//! # Example
//!
//! ```ignore
//! use emxxlx_core::protocol::Emxxlx;
//! use emxxlx_core::regs::DeviceConfig;
//!
//! fn bring_up<B, L>(bus: B, lines: &mut L) -> emxxlx_core::Result<Emxxlx<B>>
//! where
//!     B: emxxlx_core::controller::XspiBus,
//!     L: emxxlx_core::controller::BusLines,
//! {
//!     let config = DeviceConfig::default();
//!     Emxxlx::init(bus, lines, config, 4)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "std")]
extern crate std;

pub mod controller;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod regs;
pub mod xspi;

pub use error::{Error, Result};
