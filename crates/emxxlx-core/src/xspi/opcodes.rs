//! EMxxLX instruction set
//!
//! This module defines the device command opcodes. The values are part of
//! the on-wire contract and must match the part byte-for-byte.

// ============================================================================
// Software reset
// ============================================================================

/// Reset Enable
pub const RESET_ENABLE: u8 = 0x66;
/// Reset Memory
pub const RESET_MEMORY: u8 = 0x99;

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - sets the write enable latch bit, WEL
pub const WRITE_ENABLE: u8 = 0x06;
/// Write Disable - clears the write enable latch bit, WEL
pub const WRITE_DISABLE: u8 = 0x04;

// ============================================================================
// Status and flag registers
// ============================================================================

/// Read Status Register
pub const READ_STATUS: u8 = 0x05;
/// Write Status Register
pub const WRITE_STATUS: u8 = 0x01;
/// Read Flag Status Register
pub const READ_FLAGS: u8 = 0x70;
/// Clear Flag Status Register
pub const CLEAR_FLAGS: u8 = 0x50;

// ============================================================================
// Configuration registers
// ============================================================================

/// Read Non-volatile Configuration Register
pub const READ_NONVOL_CFG: u8 = 0xB5;
/// Write Non-volatile Configuration Register
pub const WRITE_NONVOL_CFG: u8 = 0xB1;
/// Read Volatile Configuration Register
pub const READ_VOL_CFG: u8 = 0x85;
/// Write Volatile Configuration Register
pub const WRITE_VOL_CFG: u8 = 0x81;
/// Read General Purpose Register
pub const READ_GPR: u8 = 0x96;

// ============================================================================
// Identification
// ============================================================================

/// Read ID (single-line only)
pub const READ_ID: u8 = 0x9F;
/// Read ID on the currently selected number of lines
pub const READ_ID_MULTI_IO: u8 = 0xAF;

// ============================================================================
// Read commands - 3-byte address
// ============================================================================

/// Read Data (low frequency)
pub const READ: u8 = 0x03;
/// Fast Read (dummy cycles, full frequency)
pub const READ_FAST: u8 = 0x0B;
/// Dual Output Fast Read (1-1-2)
pub const READ_DUAL_OUT: u8 = 0x3B;
/// Dual I/O Fast Read (1-2-2)
pub const READ_DUAL_IO: u8 = 0xBB;
/// Quad Output Fast Read (1-1-4)
pub const READ_QUAD_OUT: u8 = 0x6B;
/// Quad I/O Fast Read (1-4-4)
pub const READ_QUAD_IO: u8 = 0xEB;
/// Quad I/O Word Read (lowest address bit must be 0)
pub const READ_QUAD_IO_WORD: u8 = 0xE7;
/// Octal Output Fast Read (1-1-8)
pub const READ_OCTAL_OUT: u8 = 0x8B;
/// Octal I/O Fast Read (1-8-8)
pub const READ_OCTAL_IO: u8 = 0xCB;
/// DTR Fast Read
pub const READ_DTR: u8 = 0x0D;
/// DTR Dual Output Fast Read
pub const READ_DTR_DUAL_OUT: u8 = 0x3D;
/// DTR Dual I/O Fast Read
pub const READ_DTR_DUAL_IO: u8 = 0xBD;
/// DTR Quad Output Fast Read
pub const READ_DTR_QUAD_OUT: u8 = 0x6D;
/// DTR Quad I/O Fast Read
pub const READ_DTR_QUAD_IO: u8 = 0xED;
/// DTR Octal Output Fast Read
pub const READ_DTR_OCTAL_OUT: u8 = 0x9D;
/// DTR Octal I/O Fast Read
pub const READ_DTR_OCTAL_IO: u8 = 0xFD;

// ============================================================================
// Write commands - 3-byte address
// ============================================================================

/// Write (page program)
pub const WRITE: u8 = 0x02;
/// Dual Input Write
pub const WRITE_DUAL: u8 = 0xA2;
/// Dual Input Extended Write
pub const WRITE_DUAL_EXT: u8 = 0xD2;
/// Quad Input Write
pub const WRITE_QUAD: u8 = 0x32;
/// Quad Input Extended Write
pub const WRITE_QUAD_EXT: u8 = 0x38;
/// Octal Input Write
pub const WRITE_OCTAL: u8 = 0x82;
/// Octal Input Extended Write
pub const WRITE_OCTAL_EXT: u8 = 0xC2;

// ============================================================================
// Erase commands
// ============================================================================

/// Erase 4 KiB subsector
pub const ERASE_4K: u8 = 0x20;
/// Erase 32 KiB subsector
pub const ERASE_32K: u8 = 0x52;
/// Erase 64 KiB sector
pub const ERASE_SECTOR: u8 = 0xD8;
/// Erase selected address range
pub const ERASE_BULK: u8 = 0xC7;
/// Erase the entire chip
pub const ERASE_CHIP: u8 = 0x60;

// ============================================================================
// OTP
// ============================================================================

/// Read OTP array
pub const OTP_READ: u8 = 0x4B;
/// Program OTP array
pub const OTP_WRITE: u8 = 0x42;

// ============================================================================
// 4-byte address mode control
// ============================================================================

/// Enter 4-Byte Address Mode
pub const ENTER_4BYTE_ADDR: u8 = 0xB7;
/// Exit 4-Byte Address Mode
pub const EXIT_4BYTE_ADDR: u8 = 0xE9;

// ============================================================================
// Read commands - dedicated 4-byte address opcodes
// ============================================================================

/// Read Data with 4-byte address
pub const READ_4B: u8 = 0x13;
/// Fast Read with 4-byte address
pub const READ_FAST_4B: u8 = 0x0C;
/// Dual Output Fast Read with 4-byte address
pub const READ_DUAL_OUT_4B: u8 = 0x3C;
/// Dual I/O Fast Read with 4-byte address
pub const READ_DUAL_IO_4B: u8 = 0xBC;
/// Quad Output Fast Read with 4-byte address
pub const READ_QUAD_OUT_4B: u8 = 0x6C;
/// Quad I/O Fast Read with 4-byte address
pub const READ_QUAD_IO_4B: u8 = 0xEC;
/// Octal Output Fast Read with 4-byte address
pub const READ_OCTAL_OUT_4B: u8 = 0x7C;
/// Octal I/O Fast Read with 4-byte address
pub const READ_OCTAL_IO_4B: u8 = 0xCC;
/// DTR Fast Read with 4-byte address
pub const READ_DTR_4B: u8 = 0x0E;
/// DTR Dual I/O Fast Read with 4-byte address
pub const READ_DTR_DUAL_IO_4B: u8 = 0xBE;
/// DTR Quad I/O Fast Read with 4-byte address
pub const READ_DTR_QUAD_IO_4B: u8 = 0xEE;

// ============================================================================
// Write commands - dedicated 4-byte address opcodes
// ============================================================================

/// Write with 4-byte address
pub const WRITE_4B: u8 = 0x12;
/// Quad Input Write with 4-byte address
pub const WRITE_QUAD_4B: u8 = 0x34;
/// Quad Input Extended Write with 4-byte address
pub const WRITE_QUAD_EXT_4B: u8 = 0x3E;
/// Octal Input Write with 4-byte address
pub const WRITE_OCTAL_4B: u8 = 0x84;
/// Octal Input Extended Write with 4-byte address
pub const WRITE_OCTAL_EXT_4B: u8 = 0x8E;

// ============================================================================
// Erase commands - dedicated 4-byte address opcodes
// ============================================================================

/// Erase 4 KiB subsector with 4-byte address
pub const ERASE_4K_4B: u8 = 0x21;
/// Erase 32 KiB subsector with 4-byte address
pub const ERASE_32K_4B: u8 = 0x5C;
/// Erase 64 KiB sector with 4-byte address
pub const ERASE_SECTOR_4B: u8 = 0xDC;

// ============================================================================
// Power management
// ============================================================================

/// Enter Deep Power-Down
pub const DEEP_POWER_DOWN: u8 = 0xB9;
/// Release from Deep Power-Down
pub const RELEASE_POWER_DOWN: u8 = 0xAB;
