//! Error types for emxxlx-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Register bank on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterBank {
    /// Volatile configuration registers (active, lost on power cycle)
    Volatile,
    /// Non-volatile configuration registers (persist across power cycles)
    NonVolatile,
}

/// Details about a read-back verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// A configuration register byte did not read back as written
    Register {
        /// Which register bank mismatched
        bank: RegisterBank,
        /// Byte offset within the register block
        offset: u8,
        /// The byte that was written
        expected: u8,
        /// The byte that was read back
        found: u8,
    },
    /// The status register did not reach the expected state
    Status {
        /// Expected status bits
        expected: u8,
        /// Observed status value
        found: u8,
    },
    /// A memory array byte did not read back as written
    Array {
        /// Address of the first mismatching byte
        addr: u32,
        /// The byte that was written
        expected: u8,
        /// The byte that was read back
        found: u8,
    },
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bus transaction executor reported failure.
    ///
    /// Never retried automatically: replaying a failed write-enable/write
    /// pair could corrupt device state.
    Transport,
    /// A read-back did not match what was written.
    ///
    /// Fatal to the calling sequence; it implies the device did not honor
    /// the requested configuration.
    Verify(VerifyFailure),
    /// Busy-poll exceeded its bound, or was given a zero bound
    Timeout,
    /// The requested interface width is not one of 1, 2, 4 or 8.
    ///
    /// Detected before any bus traffic is issued.
    UnsupportedWidth(u8),
    /// The controller cannot drive the requested line configuration
    LinesNotSupported,
}

/// Result type alias using the core error
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register {
                bank,
                offset,
                expected,
                found,
            } => {
                let bank = match bank {
                    RegisterBank::Volatile => "volatile",
                    RegisterBank::NonVolatile => "non-volatile",
                };
                write!(
                    f,
                    "{} register +{} read back 0x{:02X}, wrote 0x{:02X}",
                    bank, offset, found, expected
                )
            }
            Self::Status { expected, found } => {
                write!(
                    f,
                    "status register is 0x{:02X}, expected bits 0x{:02X}",
                    found, expected
                )
            }
            Self::Array {
                addr,
                expected,
                found,
            } => {
                write!(
                    f,
                    "array verify failed at 0x{:08X}: expected 0x{:02X}, found 0x{:02X}",
                    addr, expected, found
                )
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "bus transaction failed"),
            Self::Verify(failure) => write!(f, "verification failed: {}", failure),
            Self::Timeout => write!(f, "operation timed out"),
            Self::UnsupportedWidth(w) => {
                write!(f, "unsupported interface width {} (expected 1, 2, 4 or 8)", w)
            }
            Self::LinesNotSupported => {
                write!(f, "line configuration not supported by the controller")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
