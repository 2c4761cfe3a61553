//! xSPI command structure

use super::{AddressWidth, LineMode, Phases};

/// A single xSPI transaction
///
/// Designed to avoid allocation - uses slices for data.
/// The lifetime parameter `'a` ties the command to the buffers it references.
pub struct XspiCommand<'a> {
    /// The instruction byte
    pub instruction: u8,

    /// Line modes for the instruction, address and data phases
    pub phases: Phases,

    /// Address (if any)
    pub address: Option<u32>,

    /// Address width
    pub address_width: AddressWidth,

    /// Number of dummy clock cycles between address and data
    pub dummy_cycles: u8,

    /// Double transfer rate (data clocked on both edges)
    pub ddr: bool,

    /// Data to write after instruction/address/dummy
    pub write_data: &'a [u8],

    /// Buffer to read into (mutable)
    pub read_buf: &'a mut [u8],
}

impl<'a> XspiCommand<'a> {
    /// Create an instruction-only command (e.g. WRITE_ENABLE, CLEAR_FLAGS)
    pub fn simple(instruction: u8, phases: Phases) -> Self {
        Self {
            instruction,
            phases,
            address: None,
            address_width: AddressWidth::None,
            dummy_cycles: 0,
            ddr: false,
            write_data: &[],
            read_buf: &mut [],
        }
    }

    /// Create a register-read command with no address (e.g. READ_STATUS)
    pub fn read_reg(instruction: u8, phases: Phases, buf: &'a mut [u8]) -> Self {
        Self {
            instruction,
            phases,
            address: None,
            address_width: AddressWidth::None,
            dummy_cycles: 0,
            ddr: false,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create a register-write command with no address (e.g. WRITE_STATUS)
    pub fn write_reg(instruction: u8, phases: Phases, data: &'a [u8]) -> Self {
        Self {
            instruction,
            phases,
            address: None,
            address_width: AddressWidth::None,
            dummy_cycles: 0,
            ddr: false,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Create an addressed read command
    pub fn read(
        instruction: u8,
        phases: Phases,
        addr: u32,
        width: AddressWidth,
        buf: &'a mut [u8],
    ) -> Self {
        Self {
            instruction,
            phases,
            address: Some(addr),
            address_width: width,
            dummy_cycles: 0,
            ddr: false,
            write_data: &[],
            read_buf: buf,
        }
    }

    /// Create an addressed write command
    pub fn write(
        instruction: u8,
        phases: Phases,
        addr: u32,
        width: AddressWidth,
        data: &'a [u8],
    ) -> Self {
        Self {
            instruction,
            phases,
            address: Some(addr),
            address_width: width,
            dummy_cycles: 0,
            ddr: false,
            write_data: data,
            read_buf: &mut [],
        }
    }

    /// Set the number of dummy cycles
    pub fn with_dummy_cycles(mut self, cycles: u8) -> Self {
        self.dummy_cycles = cycles;
        self
    }

    /// Mark the transaction as double transfer rate
    pub fn with_ddr(mut self, ddr: bool) -> Self {
        self.ddr = ddr;
        self
    }

    /// Returns true if this command has a read phase
    pub fn has_read(&self) -> bool {
        !self.read_buf.is_empty()
    }

    /// Returns true if this command has a write phase
    pub fn has_write(&self) -> bool {
        !self.write_data.is_empty()
    }

    /// Returns true if this command has an address phase
    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Lines used for the data phase, or `None` when there is no data phase
    pub fn data_lines(&self) -> Option<LineMode> {
        if self.has_read() || self.has_write() {
            Some(self.phases.data)
        } else {
            None
        }
    }
}

/// Framing template for one direction of memory-mapped access
///
/// Carries everything the controller needs to issue the transaction on its
/// own when the mapped region is accessed, minus address and data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandTemplate {
    /// The instruction byte
    pub instruction: u8,
    /// Line modes for all phases
    pub phases: Phases,
    /// Address width (memory-mapped transactions always carry an address)
    pub address_width: AddressWidth,
    /// Dummy cycles between address and data
    pub dummy_cycles: u8,
    /// Double transfer rate
    pub ddr: bool,
    /// Sample data with the device's data strobe output
    pub dqs: bool,
}

/// Memory-mapped (execute-in-place) access configuration
///
/// Handed to the controller once; afterwards ordinary loads and stores in
/// the mapped window become bus transactions with this framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryMap {
    /// Framing for mapped reads
    pub read: CommandTemplate,
    /// Framing for mapped writes
    pub write: CommandTemplate,
    /// Release the chip select after this many idle clock cycles
    pub timeout_cycles: u16,
}
