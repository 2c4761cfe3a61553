//! xSPI framing types and the EMxxLX instruction set
//!
//! This module provides types for representing xSPI transactions,
//! per-phase line modes, and the device opcode table.

mod address;
mod command;
mod line_mode;
pub mod opcodes;

pub use address::AddressWidth;
pub use command::{CommandTemplate, MemoryMap, XspiCommand};
pub use line_mode::{check_lines_supported, LineMode, Phases};
