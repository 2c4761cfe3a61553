//! Controller trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for executor-driven hosts)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use crate::xspi::{MemoryMap, XspiCommand};
use bitflags::bitflags;
use maybe_async::maybe_async;

bitflags! {
    /// Bus controller feature flags
    ///
    /// These flags indicate what line configurations and transfer modes a
    /// controller supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BusFeatures: u32 {
        /// Can drive two data lines
        const DUAL          = 1 << 0;
        /// Can drive four data lines
        const QUAD          = 1 << 1;
        /// Can drive eight data lines
        const OCTAL         = 1 << 2;
        /// Can clock data on both edges
        const DTR           = 1 << 3;
        /// Can map the device into the address space
        const MEMORY_MAPPED = 1 << 4;
    }
}

impl Default for BusFeatures {
    fn default() -> Self {
        BusFeatures::empty()
    }
}

/// Bus transaction executor (sync or async depending on `is_sync` feature)
///
/// One implementation drives one physical device. The driver builds an
/// [`XspiCommand`] with the full framing for each operation; the controller
/// clocks it out and moves the data phase in or out. Implementations must
/// not reorder or merge commands - the device protocol pairs write-enable
/// with the transaction that follows it.
#[maybe_async(AFIT)]
pub trait XspiBus {
    /// Get the features supported by this controller
    fn features(&self) -> BusFeatures;

    /// Get the maximum number of bytes that can be read in a single transaction
    fn max_read_len(&self) -> usize;

    /// Get the maximum number of bytes that can be written in a single transaction
    fn max_write_len(&self) -> usize;

    /// Execute a single xSPI command
    ///
    /// The command carries the instruction, per-phase line modes, optional
    /// address, dummy-cycle count, the DTR flag, and at most one of a write
    /// or read data phase. Returns [`crate::Error::Transport`] on any bus
    /// failure and [`crate::Error::LinesNotSupported`] when the requested
    /// phases exceed the controller's capabilities.
    async fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()>;

    /// Switch the controller into memory-mapped mode
    ///
    /// After this call ordinary memory accesses in the mapped window are
    /// issued as bus transactions with the given framing. On failure the
    /// controller may be left in an undefined transaction mode; callers
    /// treat any error as fatal to the driver.
    async fn map_memory(&mut self, map: &MemoryMap) -> Result<()>;

    /// Delay for the specified number of microseconds
    async fn delay_us(&mut self, us: u32);

    /// Monotonic millisecond tick counter used for timeout measurement
    fn ticks(&self) -> u32;
}

/// Raw control of the bus signal lines
///
/// The mode-agnostic device reset cannot go through [`XspiBus`]: it has to
/// toggle chip select and IO0 directly while the device may be stuck in an
/// arbitrary multi-line mode. Implementations hand the pins over to manual
/// control in [`acquire`](BusLines::acquire) and must give them back to the
/// controller in [`release`](BusLines::release).
pub trait BusLines {
    /// Detach the pins from the controller and take manual control
    fn acquire(&mut self);

    /// Set chip select (active low; `high = true` deselects the device)
    fn set_cs(&mut self, high: bool);

    /// Set the clock line
    fn set_clk(&mut self, high: bool);

    /// Set the IO0 (serial data in) line
    fn set_io0(&mut self, high: bool);

    /// Put IO1 (serial data out) into a pulled-up high-impedance state
    fn float_io1(&mut self);

    /// Return pin ownership to the controller
    fn release(&mut self);
}
