//! Interface-mode framing state
//!
//! [`FrameContext`] is the single source of truth for how every transaction
//! is framed: line modes, address width, the read/write opcode pair and the
//! two dummy-cycle counts. It is derived once from the requested interface
//! width and owned by the driver instance; operations borrow it, they never
//! mutate it piecemeal.

use crate::error::{Error, Result};
use crate::regs::{values, DeviceConfig};
use crate::xspi::{opcodes, AddressWidth, Phases};

/// Dummy cycles the device requires for register reads in octal mode
pub const DUMMY_CYCLES_OCTAL: u8 = 8;

/// Per-transaction framing parameters for the currently selected mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    /// Line modes for the instruction/address/data phases
    pub phases: Phases,
    /// Transactions are double transfer rate
    pub ddr: bool,
    /// Address width for array and register accesses
    pub address_width: AddressWidth,
    /// Opcode for array reads in this mode
    pub read_instruction: u8,
    /// Opcode for array writes in this mode
    pub write_instruction: u8,
    /// Dummy cycles for array reads
    pub data_dummy_cycles: u8,
    /// Dummy cycles for register reads (ID, status, flags, configuration)
    pub config_dummy_cycles: u8,
}

impl FrameContext {
    /// Framing in effect right after a line-level reset: single-line SPI,
    /// 24-bit addressing, no dummy cycles anywhere.
    pub fn reset_default() -> Self {
        Self {
            phases: Phases::single(),
            ddr: false,
            address_width: AddressWidth::ThreeByte,
            read_instruction: opcodes::READ_FAST,
            write_instruction: opcodes::WRITE,
            data_dummy_cycles: 0,
            config_dummy_cycles: 0,
        }
    }

    /// Derive the framing for a requested interface width.
    ///
    /// `width` is the number of data lines (1, 2, 4 or 8); anything else is
    /// a configuration error reported before any bus traffic. `ddr` selects
    /// the double-transfer-rate read opcode and is only meaningful for the
    /// octal pair. A non-default address-mode byte in `config` forces 32-bit
    /// addressing regardless of width.
    pub fn derive(width: u8, ddr: bool, config: &DeviceConfig) -> Result<Self> {
        let (read_instruction, write_instruction, config_dummy_cycles, ddr) = match width {
            1 => (opcodes::READ_FAST, opcodes::WRITE, 0, false),
            2 => (opcodes::READ_DUAL_OUT, opcodes::WRITE_DUAL, 0, false),
            4 => (opcodes::READ_QUAD_OUT, opcodes::WRITE_QUAD, 0, false),
            8 => {
                let read = if ddr {
                    opcodes::READ_DTR_OCTAL_OUT
                } else {
                    opcodes::READ_OCTAL_OUT
                };
                (read, opcodes::WRITE_OCTAL_EXT, DUMMY_CYCLES_OCTAL, ddr)
            }
            other => return Err(Error::UnsupportedWidth(other)),
        };

        let address_width = if config.address_mode != values::ADDRESS_BYTES_3 {
            AddressWidth::FourByte
        } else {
            AddressWidth::ThreeByte
        };

        Ok(Self {
            // width was validated above, the triple always exists
            phases: Phases::for_width(width).ok_or(Error::UnsupportedWidth(width))?,
            ddr,
            address_width,
            read_instruction,
            write_instruction,
            data_dummy_cycles: config.dummy_cycles,
            config_dummy_cycles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xspi::LineMode;

    #[test]
    fn test_derive_is_deterministic() {
        let config = DeviceConfig::default();
        for width in [1u8, 2, 4, 8] {
            let a = FrameContext::derive(width, false, &config).unwrap();
            let b = FrameContext::derive(width, false, &config).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_single_line_framing() {
        let frame = FrameContext::derive(1, false, &DeviceConfig::default()).unwrap();
        assert_eq!(frame.read_instruction, opcodes::READ_FAST);
        assert_eq!(frame.write_instruction, opcodes::WRITE);
        assert_eq!(frame.phases, Phases::single());
        assert_eq!(frame.address_width, AddressWidth::ThreeByte);
    }

    #[test]
    fn test_dual_framing() {
        let frame = FrameContext::derive(2, false, &DeviceConfig::default()).unwrap();
        assert_eq!(frame.read_instruction, opcodes::READ_DUAL_OUT);
        assert_eq!(frame.write_instruction, opcodes::WRITE_DUAL);
        assert_eq!(frame.phases.address, LineMode::Dual);
        assert_eq!(frame.phases.data, LineMode::Dual);
    }

    #[test]
    fn test_quad_scenario() {
        // width 4, 16 dummy cycles, default address mode: quad opcode pair,
        // 24-bit addressing, data dummies from the record
        let mut config = DeviceConfig::default();
        config.dummy_cycles = 16;
        let frame = FrameContext::derive(4, false, &config).unwrap();
        assert_eq!(frame.read_instruction, opcodes::READ_QUAD_OUT);
        assert_eq!(frame.write_instruction, opcodes::WRITE_QUAD);
        assert_eq!(frame.address_width, AddressWidth::ThreeByte);
        assert_eq!(frame.data_dummy_cycles, 16);
        assert_eq!(frame.config_dummy_cycles, 0);
    }

    #[test]
    fn test_octal_forces_config_dummies() {
        let mut config = DeviceConfig::default();
        config.dummy_cycles = 20;
        let frame = FrameContext::derive(8, false, &config).unwrap();
        assert_eq!(frame.config_dummy_cycles, DUMMY_CYCLES_OCTAL);
        assert_eq!(frame.data_dummy_cycles, 20);
        assert_eq!(frame.read_instruction, opcodes::READ_OCTAL_OUT);
        assert_eq!(frame.write_instruction, opcodes::WRITE_OCTAL_EXT);
    }

    #[test]
    fn test_octal_dtr_read_opcode() {
        let frame = FrameContext::derive(8, true, &DeviceConfig::default()).unwrap();
        assert_eq!(frame.read_instruction, opcodes::READ_DTR_OCTAL_OUT);
        assert!(frame.ddr);
        // ddr is only defined for the octal pair
        let quad = FrameContext::derive(4, true, &DeviceConfig::default()).unwrap();
        assert!(!quad.ddr);
        assert_eq!(quad.read_instruction, opcodes::READ_QUAD_OUT);
    }

    #[test]
    fn test_address_mode_override() {
        let mut config = DeviceConfig::default();
        config.address_mode = values::ADDRESS_BYTES_4;
        for width in [1u8, 2, 4, 8] {
            let frame = FrameContext::derive(width, false, &config).unwrap();
            assert_eq!(frame.address_width, AddressWidth::FourByte);
        }
    }

    #[test]
    fn test_invalid_width_is_configuration_error() {
        let config = DeviceConfig::default();
        for width in [0u8, 3, 5, 16, 255] {
            assert_eq!(
                FrameContext::derive(width, false, &config),
                Err(Error::UnsupportedWidth(width))
            );
        }
    }
}
