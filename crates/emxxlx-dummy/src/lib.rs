//! emxxlx-dummy - In-memory EMxxLX emulator for testing
//!
//! This crate provides a dummy bus implementation that emulates an EMxxLX
//! MRAM device in memory. It's useful for testing and development without
//! real hardware.
//!
//! The model tracks its own interface mode: a write to volatile register 0
//! switches the number of lines the "device" decodes, and any transaction
//! framed at a different width is rejected, exactly like a real part that
//! stopped understanding single-line instructions. This is what lets the
//! bring-up ordering (program registers first, switch framing, then verify)
//! be tested meaningfully.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use emxxlx_core::controller::{BusFeatures, BusLines, XspiBus};
use emxxlx_core::error::{Error, Result};
use emxxlx_core::regs::{self, values, CFG_LEN, MAINTENANCE_KEY_ADDR};
use emxxlx_core::xspi::{check_lines_supported, opcodes, LineMode, MemoryMap, XspiCommand};

/// Size of the modeled volatile register space (covers the maintenance key)
const VOL_SPACE: usize = 0x20;

/// Configuration for the dummy device
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Bytes returned by the ID read
    pub id: [u8; 3],
    /// Array size in bytes
    pub size: usize,
    /// Flag reads that report busy after a chip erase
    pub erase_busy_reads: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            id: [0x6B, 0xBB, 0x18],
            size: 16 * 1024 * 1024,
            erase_busy_reads: 2,
        }
    }
}

#[derive(Debug)]
struct DeviceState {
    config: DummyConfig,
    data: Vec<u8>,
    vol: [u8; VOL_SPACE],
    nonvol: [u8; CFG_LEN],
    status: u8,
    write_enabled: bool,
    /// Remaining flag reads that report busy
    busy_reads: u32,
    /// Number of lines the device currently decodes instructions on
    decode_lines: LineMode,
    tick: u32,
    mapped: Option<MemoryMap>,
    pins_manual: bool,
    cs_rising_edges: u32,
    cs_level: bool,
    resets: u32,
}

fn lines_for_mode(code: u8) -> LineMode {
    match code {
        values::MODE_DUAL | values::MODE_DUAL_NO_DS => LineMode::Dual,
        values::MODE_QUAD
        | values::MODE_QUAD_NO_DS
        | values::MODE_QUAD_DTR
        | values::MODE_QUAD_DTR_NO_DS => LineMode::Quad,
        values::MODE_OCTAL
        | values::MODE_OCTAL_NO_DS
        | values::MODE_OCTAL_DTR
        | values::MODE_OCTAL_DTR_NO_DS => LineMode::Octal,
        _ => LineMode::Single,
    }
}

impl DeviceState {
    fn new(config: DummyConfig) -> Self {
        let nonvol = emxxlx_core::regs::DeviceConfig::default().encode();
        let mut vol = [0u8; VOL_SPACE];
        vol[..CFG_LEN].copy_from_slice(&nonvol);
        Self {
            data: vec![0u8; config.size],
            config,
            vol,
            nonvol,
            status: 0,
            write_enabled: false,
            busy_reads: 0,
            decode_lines: LineMode::Single,
            tick: 0,
            mapped: None,
            pins_manual: false,
            cs_rising_edges: 0,
            cs_level: true,
            resets: 0,
        }
    }

    /// Erased byte value, from bit 7 of the packed volatile config byte
    fn erase_value(&self) -> u8 {
        if self.vol[8] & 0x80 != 0 {
            0xFF
        } else {
            0x00
        }
    }

    fn device_reset(&mut self) {
        // Volatile registers reload from the non-volatile bank; the pulse
        // train leaves the part decoding single-line instructions until it
        // is reconfigured.
        self.vol = [0u8; VOL_SPACE];
        self.vol[..CFG_LEN].copy_from_slice(&self.nonvol);
        self.decode_lines = LineMode::Single;
        self.write_enabled = false;
        self.busy_reads = 0;
        self.resets += 1;
    }

    fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()> {
        if self.pins_manual {
            // The controller does not own the pins right now.
            return Err(Error::Transport);
        }
        if cmd.phases.instruction != self.decode_lines {
            log::debug!(
                "instruction 0x{:02X} framed {:?}, device decodes {:?}",
                cmd.instruction,
                cmd.phases.instruction,
                self.decode_lines
            );
            return Err(Error::Transport);
        }

        let addr = cmd.address.unwrap_or(0) as usize;
        match cmd.instruction {
            opcodes::WRITE_ENABLE => self.write_enabled = true,
            opcodes::WRITE_DISABLE => self.write_enabled = false,
            opcodes::CLEAR_FLAGS => {}
            opcodes::RESET_MEMORY => self.device_reset(),

            opcodes::READ_STATUS => {
                let wel = if self.write_enabled { regs::STATUS_WEL } else { 0 };
                cmd.read_buf[0] = (self.status & !regs::STATUS_WEL) | wel;
            }
            opcodes::WRITE_STATUS => {
                if self.write_enabled {
                    self.status = cmd.write_data[0];
                }
            }
            opcodes::READ_FLAGS => {
                cmd.read_buf[0] = if self.busy_reads > 0 {
                    self.busy_reads -= 1;
                    0
                } else {
                    regs::FLAGS_READY
                };
            }
            opcodes::READ_ID_MULTI_IO => cmd.read_buf.copy_from_slice(&self.config.id),

            opcodes::WRITE_VOL_CFG => {
                if self.write_enabled {
                    let end = addr + cmd.write_data.len();
                    let slot = self.vol.get_mut(addr..end).ok_or(Error::Transport)?;
                    slot.copy_from_slice(cmd.write_data);
                    if addr == 0 {
                        self.decode_lines = lines_for_mode(self.vol[0]);
                    }
                }
            }
            opcodes::READ_VOL_CFG => {
                let end = addr + cmd.read_buf.len();
                let slot = self.vol.get(addr..end).ok_or(Error::Transport)?;
                cmd.read_buf.copy_from_slice(slot);
            }
            opcodes::WRITE_NONVOL_CFG => {
                if self.write_enabled {
                    let end = addr + cmd.write_data.len();
                    let slot = self.nonvol.get_mut(addr..end).ok_or(Error::Transport)?;
                    slot.copy_from_slice(cmd.write_data);
                }
            }
            opcodes::READ_NONVOL_CFG => {
                let end = addr + cmd.read_buf.len();
                let slot = self.nonvol.get(addr..end).ok_or(Error::Transport)?;
                cmd.read_buf.copy_from_slice(slot);
            }

            opcodes::ERASE_CHIP => {
                if self.write_enabled {
                    let value = self.erase_value();
                    self.data.fill(value);
                    self.busy_reads = self.config.erase_busy_reads;
                }
            }

            opcodes::READ
            | opcodes::READ_FAST
            | opcodes::READ_DUAL_OUT
            | opcodes::READ_QUAD_OUT
            | opcodes::READ_OCTAL_OUT
            | opcodes::READ_DTR_OCTAL_OUT => {
                let end = addr + cmd.read_buf.len();
                let slot = self.data.get(addr..end).ok_or(Error::Transport)?;
                cmd.read_buf.copy_from_slice(slot);
            }
            opcodes::WRITE
            | opcodes::WRITE_DUAL
            | opcodes::WRITE_QUAD
            | opcodes::WRITE_OCTAL
            | opcodes::WRITE_OCTAL_EXT => {
                let end = addr + cmd.write_data.len();
                let slot = self.data.get_mut(addr..end).ok_or(Error::Transport)?;
                slot.copy_from_slice(cmd.write_data);
            }

            _ => {}
        }

        Ok(())
    }
}

/// Dummy bus driving an emulated EMxxLX device
///
/// Implements [`XspiBus`]; [`DummyMram::lines`] hands out the matching
/// [`BusLines`] endpoint so the line-level reset acts on the same device
/// state.
#[derive(Debug)]
pub struct DummyMram {
    state: Rc<RefCell<DeviceState>>,
}

/// Raw line-control endpoint of a [`DummyMram`]
pub struct DummyLines {
    state: Rc<RefCell<DeviceState>>,
}

impl DummyMram {
    /// Create a new emulated device
    pub fn new(config: DummyConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeviceState::new(config))),
        }
    }

    /// Create a new emulated device with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// The line-control endpoint for this device
    pub fn lines(&self) -> DummyLines {
        DummyLines {
            state: Rc::clone(&self.state),
        }
    }

    /// Pre-fill part of the array
    pub fn load(&self, addr: u32, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let addr = addr as usize;
        state.data[addr..addr + data.len()].copy_from_slice(data);
    }

    /// Snapshot of the array contents
    pub fn memory(&self) -> Vec<u8> {
        self.state.borrow().data.clone()
    }

    /// Current volatile register block
    pub fn volatile_regs(&self) -> [u8; CFG_LEN] {
        let state = self.state.borrow();
        let mut out = [0u8; CFG_LEN];
        out.copy_from_slice(&state.vol[..CFG_LEN]);
        out
    }

    /// Current non-volatile register block
    pub fn nonvolatile_regs(&self) -> [u8; CFG_LEN] {
        self.state.borrow().nonvol
    }

    /// Current maintenance-window key byte
    pub fn maintenance_key(&self) -> u8 {
        self.state.borrow().vol[MAINTENANCE_KEY_ADDR as usize]
    }

    /// Number of lines the device currently decodes instructions on
    pub fn decode_lines(&self) -> LineMode {
        self.state.borrow().decode_lines
    }

    /// How many times the device has been reset through the pulse train
    pub fn resets(&self) -> u32 {
        self.state.borrow().resets
    }

    /// The memory-map configuration last handed to the controller
    pub fn mapped(&self) -> Option<MemoryMap> {
        self.state.borrow().mapped
    }

    /// Whether the pins are currently under manual control
    pub fn pins_manual(&self) -> bool {
        self.state.borrow().pins_manual
    }
}

impl XspiBus for DummyMram {
    fn features(&self) -> BusFeatures {
        BusFeatures::all()
    }

    fn max_read_len(&self) -> usize {
        4096
    }

    fn max_write_len(&self) -> usize {
        256
    }

    fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()> {
        check_lines_supported(cmd.phases, cmd.ddr, self.features())?;
        self.state.borrow_mut().execute(cmd)
    }

    fn map_memory(&mut self, map: &MemoryMap) -> Result<()> {
        self.state.borrow_mut().mapped = Some(*map);
        Ok(())
    }

    fn delay_us(&mut self, _us: u32) {}

    fn ticks(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.tick += 1;
        state.tick
    }
}

impl BusLines for DummyLines {
    fn acquire(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pins_manual = true;
        state.cs_rising_edges = 0;
    }

    fn set_cs(&mut self, high: bool) {
        let mut state = self.state.borrow_mut();
        if high && !state.cs_level {
            state.cs_rising_edges += 1;
        }
        state.cs_level = high;
    }

    fn set_clk(&mut self, _high: bool) {}

    fn set_io0(&mut self, _high: bool) {}

    fn float_io1(&mut self) {}

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        // Four select pulses with the documented IO0 pattern reset the part.
        if state.cs_rising_edges >= 4 {
            state.device_reset();
        }
        state.pins_manual = false;
    }
}
