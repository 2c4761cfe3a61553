//! xSPI line modes

/// Number of data lines used by one transaction phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineMode {
    /// Single line (classic SPI)
    #[default]
    Single,
    /// Two lines
    Dual,
    /// Four lines
    Quad,
    /// Eight lines
    Octal,
}

impl LineMode {
    /// Returns the number of physical data lines
    pub const fn lines(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Dual => 2,
            Self::Quad => 4,
            Self::Octal => 8,
        }
    }
}

/// Line modes for the instruction, address and data phases of a transaction
///
/// The EMxxLX switches all three phases together, so `Phases` is only
/// constructed through the per-width associated functions; a mixed triple
/// cannot be observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Phases {
    /// Lines driven during the instruction phase
    pub instruction: LineMode,
    /// Lines driven during the address phase
    pub address: LineMode,
    /// Lines driven during the data phase
    pub data: LineMode,
}

impl Phases {
    /// All phases on a single line (1-1-1)
    pub const fn single() -> Self {
        Self {
            instruction: LineMode::Single,
            address: LineMode::Single,
            data: LineMode::Single,
        }
    }

    /// All phases on two lines (2-2-2)
    pub const fn dual() -> Self {
        Self {
            instruction: LineMode::Dual,
            address: LineMode::Dual,
            data: LineMode::Dual,
        }
    }

    /// All phases on four lines (4-4-4)
    pub const fn quad() -> Self {
        Self {
            instruction: LineMode::Quad,
            address: LineMode::Quad,
            data: LineMode::Quad,
        }
    }

    /// All phases on eight lines (8-8-8)
    pub const fn octal() -> Self {
        Self {
            instruction: LineMode::Octal,
            address: LineMode::Octal,
            data: LineMode::Octal,
        }
    }

    /// The triple for a numeric interface width, if it is a supported one
    pub const fn for_width(width: u8) -> Option<Self> {
        match width {
            1 => Some(Self::single()),
            2 => Some(Self::dual()),
            4 => Some(Self::quad()),
            8 => Some(Self::octal()),
            _ => None,
        }
    }

    /// Returns true if any phase uses more than one line
    pub const fn is_multi_io(&self) -> bool {
        !matches!(self.data, LineMode::Single)
    }
}

use crate::controller::BusFeatures;
use crate::error::{Error, Result};

/// Check if a controller supports the requested line configuration
///
/// Returns `Ok(())` if the configuration can be driven, or
/// `Err(LinesNotSupported)` if not.
///
/// # Example
///
/// ```ignore
/// fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()> {
///     check_lines_supported(cmd.phases, cmd.ddr, self.features())?;
///     // ... execute the command
/// }
/// ```
pub fn check_lines_supported(phases: Phases, ddr: bool, features: BusFeatures) -> Result<()> {
    if ddr && !features.contains(BusFeatures::DTR) {
        return Err(Error::LinesNotSupported);
    }
    let required = match phases.data {
        LineMode::Single => return Ok(()),
        LineMode::Dual => BusFeatures::DUAL,
        LineMode::Quad => BusFeatures::QUAD,
        LineMode::Octal => BusFeatures::OCTAL,
    };
    if features.contains(required) {
        Ok(())
    } else {
        Err(Error::LinesNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_always_supported() {
        assert!(check_lines_supported(Phases::single(), false, BusFeatures::empty()).is_ok());
    }

    #[test]
    fn test_missing_capability_rejected() {
        let features = BusFeatures::DUAL;
        assert!(check_lines_supported(Phases::dual(), false, features).is_ok());
        assert_eq!(
            check_lines_supported(Phases::quad(), false, features),
            Err(Error::LinesNotSupported)
        );
        assert_eq!(
            check_lines_supported(Phases::octal(), false, features),
            Err(Error::LinesNotSupported)
        );
    }

    #[test]
    fn test_ddr_needs_dtr_capability() {
        assert_eq!(
            check_lines_supported(Phases::octal(), true, BusFeatures::OCTAL),
            Err(Error::LinesNotSupported)
        );
        assert!(check_lines_supported(
            Phases::octal(),
            true,
            BusFeatures::OCTAL | BusFeatures::DTR
        )
        .is_ok());
    }
}
