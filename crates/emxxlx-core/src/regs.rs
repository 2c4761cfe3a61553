//! Configuration register codec
//!
//! The EMxxLX exposes the same 9-byte configuration block in two address
//! spaces: non-volatile (persists across power cycles) and volatile (the
//! active copy, reloaded from non-volatile at reset). [`DeviceConfig`]
//! holds the semantic fields and converts to/from the on-wire image.
//! The encoding is part of the hardware contract and must be bit-exact.

/// Number of bytes in a configuration register block
pub const CFG_LEN: usize = 9;

/// Volatile sub-register holding the maintenance-mode key
pub const MAINTENANCE_KEY_ADDR: u32 = 0x1E;

/// Key byte that opens the privileged configuration window
pub const MAINTENANCE_KEY: u8 = 0x6B;

// ============================================================================
// Status and flag register bits
// ============================================================================

/// Status register: write enable latch
pub const STATUS_WEL: u8 = 0x02;
/// Status register: block protect bits (BP0-BP3 and TB)
pub const STATUS_BLOCK_PROTECT_MASK: u8 = 0x7C;
/// Flag status register: operation complete / ready
pub const FLAGS_READY: u8 = 0x80;

/// Named byte values for the configuration register fields
///
/// Only the values listed in the datasheet are meaningful; everything else
/// is reserved. The dummy-cycle byte is the plain cycle count (1..=31).
pub mod values {
    /// SPI, data strobe enabled (power-on default)
    pub const MODE_SPI: u8 = 0xFF;
    /// SPI, data strobe disabled
    pub const MODE_SPI_NO_DS: u8 = 0xDF;
    /// Dual SPI, data strobe enabled
    pub const MODE_DUAL: u8 = 0xFD;
    /// Dual SPI, data strobe disabled
    pub const MODE_DUAL_NO_DS: u8 = 0xDD;
    /// Quad SPI, data strobe enabled
    pub const MODE_QUAD: u8 = 0xFB;
    /// Quad SPI, data strobe disabled
    pub const MODE_QUAD_NO_DS: u8 = 0xDB;
    /// Quad DTR, data strobe enabled
    pub const MODE_QUAD_DTR: u8 = 0xEB;
    /// Quad DTR, data strobe disabled
    pub const MODE_QUAD_DTR_NO_DS: u8 = 0xCB;
    /// Octal DTR, data strobe enabled
    pub const MODE_OCTAL_DTR: u8 = 0xE7;
    /// Octal DTR, data strobe disabled
    pub const MODE_OCTAL_DTR_NO_DS: u8 = 0xC7;
    /// Octal SPI, data strobe enabled
    pub const MODE_OCTAL: u8 = 0xB7;
    /// Octal SPI, data strobe disabled
    pub const MODE_OCTAL_NO_DS: u8 = 0x97;

    /// Factory default dummy-cycle count (16)
    pub const DUMMY_CYCLES_DEFAULT: u8 = 0x10;

    /// Driver strength 50 Ohm (default)
    pub const DRIVE_50_OHM: u8 = 0xFF;
    /// Driver strength 35 Ohm
    pub const DRIVE_35_OHM: u8 = 0xFE;
    /// Driver strength 25 Ohm
    pub const DRIVE_25_OHM: u8 = 0xFD;
    /// Driver strength 18 Ohm
    pub const DRIVE_18_OHM: u8 = 0xFC;

    /// No added data-strobe delay (default)
    pub const DS_DELAY_NONE: u8 = 0x0F;
    /// 500 ps added data-strobe delay
    pub const DS_DELAY_500PS: u8 = 0x0A;
    /// 1000 ps added data-strobe delay
    pub const DS_DELAY_1000PS: u8 = 0x05;
    /// 1500 ps added data-strobe delay
    pub const DS_DELAY_1500PS: u8 = 0x00;

    /// 3-byte address mode (default)
    pub const ADDRESS_BYTES_3: u8 = 0xFF;
    /// 4-byte address mode
    pub const ADDRESS_BYTES_4: u8 = 0xFE;

    /// Execute-in-place disabled (default)
    pub const XIP_DISABLE: u8 = 0xFF;
    /// Execute-in-place enabled
    pub const XIP_ENABLE: u8 = 0xFE;
    /// Execute-in-place active at boot
    pub const XIP_BOOT: u8 = 0xFC;

    /// Continuous read, no wrap (default)
    pub const WRAP_CONTINUOUS: u8 = 0xFF;
    /// 64-byte wrap
    pub const WRAP_64: u8 = 0xFE;
    /// 32-byte wrap
    pub const WRAP_32: u8 = 0xFD;
    /// 16-byte wrap
    pub const WRAP_16: u8 = 0xFC;
}

// Bit positions within the packed configuration byte (image byte 8).
const PACKED_ERASE_VALUE_BIT: u8 = 7;
const PACKED_OTP_LOCK_BIT: u8 = 2;
const PACKED_RESET_ENABLE_BIT: u8 = 1;
const PACKED_WRITE_MODE_BIT: u8 = 0;

/// Semantic view of one configuration register block
///
/// The same record programs both banks; the OTP-lock bit is volatile-only
/// and is carried exclusively by [`DeviceConfig::encode_volatile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Interface mode code, one of the `values::MODE_*` bytes
    pub spi_interface_mode: u8,
    /// Dummy cycles for data reads (1..=31, `values::DUMMY_CYCLES_DEFAULT`)
    pub dummy_cycles: u8,
    /// Output driver strength, one of the `values::DRIVE_*` bytes
    pub driver_strength: u8,
    /// Added data-strobe delay, one of the `values::DS_DELAY_*` bytes
    pub added_ds_delay: u8,
    /// Address mode, `values::ADDRESS_BYTES_3` or `values::ADDRESS_BYTES_4`
    pub address_mode: u8,
    /// Execute-in-place configuration, one of the `values::XIP_*` bytes
    pub xip: u8,
    /// Wrap configuration, one of the `values::WRAP_*` bytes
    pub wrap: u8,
    /// Erased cells read as 1 (true) or 0 (false)
    pub erase_value_one: bool,
    /// Dedicated reset pin enabled
    pub reset_pin_enable: bool,
    /// Register writes target the non-volatile bank (true) or volatile only
    pub nonvolatile_write_mode: bool,
    /// Lock the OTP array (volatile image only)
    pub otp_lock: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            spi_interface_mode: values::MODE_SPI,
            dummy_cycles: values::DUMMY_CYCLES_DEFAULT,
            driver_strength: values::DRIVE_50_OHM,
            added_ds_delay: values::DS_DELAY_NONE,
            address_mode: values::ADDRESS_BYTES_3,
            xip: values::XIP_DISABLE,
            wrap: values::WRAP_CONTINUOUS,
            erase_value_one: true,
            reset_pin_enable: true,
            nonvolatile_write_mode: true,
            otp_lock: false,
        }
    }
}

impl DeviceConfig {
    /// Encode the non-volatile register image.
    ///
    /// The OTP-lock bit is deliberately excluded; locking is applied to the
    /// volatile bank only so it does not survive a power cycle.
    pub fn encode(&self) -> [u8; CFG_LEN] {
        let mut image = [0u8; CFG_LEN];
        image[0] = self.spi_interface_mode;
        image[1] = self.dummy_cycles;
        image[2] = 0xFF; // reserved
        image[3] = self.driver_strength;
        image[4] = self.added_ds_delay;
        image[5] = self.address_mode;
        image[6] = self.xip;
        image[7] = self.wrap;
        image[8] = (self.erase_value_one as u8) << PACKED_ERASE_VALUE_BIT
            | (self.reset_pin_enable as u8) << PACKED_RESET_ENABLE_BIT
            | (self.nonvolatile_write_mode as u8) << PACKED_WRITE_MODE_BIT;
        image
    }

    /// Encode the volatile register image (non-volatile image plus OTP lock)
    pub fn encode_volatile(&self) -> [u8; CFG_LEN] {
        let mut image = self.encode();
        image[8] |= (self.otp_lock as u8) << PACKED_OTP_LOCK_BIT;
        image
    }

    /// Decode a register image back into semantic fields
    pub fn decode(image: &[u8; CFG_LEN]) -> Self {
        Self {
            spi_interface_mode: image[0],
            dummy_cycles: image[1],
            driver_strength: image[3],
            added_ds_delay: image[4],
            address_mode: image[5],
            xip: image[6],
            wrap: image[7],
            erase_value_one: image[8] & (1 << PACKED_ERASE_VALUE_BIT) != 0,
            reset_pin_enable: image[8] & (1 << PACKED_RESET_ENABLE_BIT) != 0,
            nonvolatile_write_mode: image[8] & (1 << PACKED_WRITE_MODE_BIT) != 0,
            otp_lock: image[8] & (1 << PACKED_OTP_LOCK_BIT) != 0,
        }
    }

    /// The factory image programmed by re-provisioning: octal SPI with data
    /// strobe, default dummy cycles, 4-byte addressing, OTP locked.
    pub fn factory() -> Self {
        Self {
            spi_interface_mode: values::MODE_OCTAL,
            address_mode: values::ADDRESS_BYTES_4,
            otp_lock: true,
            ..Self::default()
        }
    }
}
