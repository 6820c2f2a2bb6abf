// crates/upgrade-suite-core/src/core/knobs.rs
// ============================================================================
// Module: Upgrade Knobs
// Description: Typed upgrade-test knobs set through suite options.
// Purpose: Parse abort-point and reboot-disruption values into closed enums.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Suite options carry string values. The knobs in this module are the typed
//! targets those values are parsed into before they reach the runner. An empty
//! value leaves a knob at its default.
//!
//! ## Invariants
//! - `AbortAt::Percent` always holds a value in `1..=100`.
//! - Parsing is exact and case-sensitive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Literal selecting a random abort point.
const ABORT_AT_RANDOM: &str = "random";
/// Upper bound for an abort-point percentage.
const ABORT_AT_MAX_PERCENT: u8 = 100;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a knob value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnobError {
    /// Abort-point value is not empty, `random`, or an integer in `[0,100]`.
    #[error("abort-at must be empty, set to 'random', or an integer in [0,100], inclusive (got {0:?})")]
    InvalidAbortAt(String),
    /// Reboot-disruption value is not empty, `graceful`, or `force`.
    #[error("disrupt-reboot must be empty, set to 'graceful', or set to 'force' (got {0:?})")]
    InvalidDisruptReboot(String),
}

// ============================================================================
// SECTION: Abort Point
// ============================================================================

/// Point during the upgrade at which the test aborts and rolls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortAt {
    /// Never abort the upgrade.
    #[default]
    Never,
    /// Abort once the given percentage of the upgrade has completed.
    Percent(u8),
    /// Abort at a point chosen by the runner.
    Random,
}

impl FromStr for AbortAt {
    type Err = KnobError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Ok(Self::Never);
        }
        if value == ABORT_AT_RANDOM {
            return Ok(Self::Random);
        }
        // Integers may carry a sign; `-0` and `+50` are in range.
        let invalid = || KnobError::InvalidAbortAt(value.to_string());
        let signed: i64 = value.parse().map_err(|_| invalid())?;
        let percent = u8::try_from(signed)
            .ok()
            .filter(|percent| *percent <= ABORT_AT_MAX_PERCENT)
            .ok_or_else(invalid)?;
        // Zero means "as early as possible", which the runner observes as 1%.
        Ok(Self::Percent(percent.max(1)))
    }
}

impl fmt::Display for AbortAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("never"),
            Self::Percent(percent) => write!(f, "{percent}%"),
            Self::Random => f.write_str(ABORT_AT_RANDOM),
        }
    }
}

// ============================================================================
// SECTION: Reboot Disruption
// ============================================================================

/// Node reboot disruption applied while the upgrade is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptReboot {
    /// No reboot disruption.
    #[default]
    None,
    /// Reboot nodes through a graceful drain.
    Graceful,
    /// Reboot nodes without draining.
    Force,
}

impl FromStr for DisruptReboot {
    type Err = KnobError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" => Ok(Self::None),
            "graceful" => Ok(Self::Graceful),
            "force" => Ok(Self::Force),
            other => Err(KnobError::InvalidDisruptReboot(other.to_string())),
        }
    }
}

impl fmt::Display for DisruptReboot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Graceful => f.write_str("graceful"),
            Self::Force => f.write_str("force"),
        }
    }
}

// ============================================================================
// SECTION: Knob Set
// ============================================================================

/// Knobs collected while dispatching suite options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeKnobs {
    /// Abort-point policy.
    pub abort_at: AbortAt,
    /// Reboot-disruption policy.
    pub disrupt_reboot: DisruptReboot,
}

impl UpgradeKnobs {
    /// Parses and stores the abort-point policy.
    ///
    /// # Errors
    ///
    /// Returns [`KnobError::InvalidAbortAt`] when the value is not recognized.
    pub fn set_abort_at(&mut self, value: &str) -> Result<(), KnobError> {
        self.abort_at = value.parse()?;
        Ok(())
    }

    /// Parses and stores the reboot-disruption policy.
    ///
    /// # Errors
    ///
    /// Returns [`KnobError::InvalidDisruptReboot`] when the value is not recognized.
    pub fn set_disrupt_reboot(&mut self, value: &str) -> Result<(), KnobError> {
        self.disrupt_reboot = value.parse()?;
        Ok(())
    }
}
