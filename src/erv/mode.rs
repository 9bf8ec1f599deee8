//! Operating modes of the VTTOUCHW wall panel.
//!
//! The lowercase names are the stable public identifiers: they are what
//! the host CLI accepts and what shows up in logs.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Stops the ventilation motor and closes the dampers to outside ducts.
    Standby,
    /// Runs automatically from outdoor temperature and indoor humidity.
    Smart,
    /// 10 minutes outside ventilation, 50 minutes off, every hour.
    Away,
    /// Continuous exchange at minimum speed.
    Min,
    /// Continuous exchange at medium speed.
    Med,
    /// Continuous exchange at maximum speed.
    Max,
    /// Dampers closed, indoor recirculation at minimum speed.
    RecircMin,
    /// Dampers closed, indoor recirculation at medium speed.
    RecircMed,
    /// Dampers closed, indoor recirculation at maximum speed.
    RecircMax,
}

impl Mode {
    /// Every mode, in the order the panel menu lists them.
    pub const ALL: [Mode; 9] = [
        Mode::Standby,
        Mode::Smart,
        Mode::Away,
        Mode::Min,
        Mode::Med,
        Mode::Max,
        Mode::RecircMin,
        Mode::RecircMed,
        Mode::RecircMax,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Mode::Standby => "standby",
            Mode::Smart => "smart",
            Mode::Away => "away",
            Mode::Min => "min",
            Mode::Med => "med",
            Mode::Max => "max",
            Mode::RecircMin => "recircmin",
            Mode::RecircMed => "recircmed",
            Mode::RecircMax => "recircmax",
        }
    }

    /// One-line description for help output.
    pub const fn describe(self) -> &'static str {
        match self {
            Mode::Standby => "Standby (STB): ventilation motor off, outside dampers closed",
            Mode::Smart => "Smart (SMT): automatic from outdoor temperature and indoor humidity",
            Mode::Away => "Away: 10 min outside ventilation / 50 min off every hour",
            Mode::Min => "Continuous minimum exchange ventilation",
            Mode::Med => "Continuous medium exchange ventilation",
            Mode::Max => "Continuous maximum exchange ventilation",
            Mode::RecircMin => "Recirculate indoor air at MIN speed, outside dampers closed",
            Mode::RecircMed => "Recirculate indoor air at MED speed, outside dampers closed",
            Mode::RecircMax => "Recirculate indoor air at MAX speed, outside dampers closed",
        }
    }

    /// Whether the mode brings outside air into the house.
    pub const fn ventilates(self) -> bool {
        matches!(
            self,
            Mode::Smart | Mode::Away | Mode::Min | Mode::Med | Mode::Max
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} command not found (expected one of: ", self.0)?;
        for (i, mode) in Mode::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(mode.name())?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for Mode {
    type Err = ParseModeError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseModeError(wanted.to_owned()))
    }
}
