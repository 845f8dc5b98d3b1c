//! Reputation bands
//!
//! `reputation` is the per NPC-learner relationship score in [-1.0, 1.0]. The
//! band is both the human-readable descriptor shown to the UI and the input
//! the behavior resolver uses, so the two can never disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the reputation scale.
pub const REPUTATION_MIN: f64 = -1.0;
/// Upper bound of the reputation scale.
pub const REPUTATION_MAX: f64 = 1.0;

/// Clamp a raw score onto the reputation scale. NaN collapses to 0.
pub fn clamp_reputation(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(REPUTATION_MIN, REPUTATION_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationBand {
    /// Below -0.5: keeps engagement minimal
    Cold,
    /// [-0.5, 0.0)
    Neutral,
    /// [0.0, 0.5)
    Friendly,
    /// 0.5 and above
    Warm,
}

impl ReputationBand {
    /// Convert a reputation score to its band
    pub fn from_score(score: f64) -> Self {
        match clamp_reputation(score) {
            s if s >= 0.5 => ReputationBand::Warm,
            s if s >= 0.0 => ReputationBand::Friendly,
            s if s >= -0.5 => ReputationBand::Neutral,
            _ => ReputationBand::Cold,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReputationBand::Cold => "Cold",
            ReputationBand::Neutral => "Neutral",
            ReputationBand::Friendly => "Friendly",
            ReputationBand::Warm => "Warm",
        }
    }

    /// Human-readable descriptor for snapshots and prompt context
    pub fn descriptor(&self) -> &'static str {
        match self {
            ReputationBand::Cold => "cool and minimal; answers only what is asked",
            ReputationBand::Neutral => "neutral; polite but reserved",
            ReputationBand::Friendly => "friendly; willing to help",
            ReputationBand::Warm => "warm; treats the learner as a valued acquaintance",
        }
    }
}

impl fmt::Display for ReputationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(ReputationBand::from_score(-0.51), ReputationBand::Cold);
        assert_eq!(ReputationBand::from_score(-0.5), ReputationBand::Neutral);
        assert_eq!(ReputationBand::from_score(-0.01), ReputationBand::Neutral);
        assert_eq!(ReputationBand::from_score(0.0), ReputationBand::Friendly);
        assert_eq!(ReputationBand::from_score(0.49), ReputationBand::Friendly);
        assert_eq!(ReputationBand::from_score(0.5), ReputationBand::Warm);
    }

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_reputation(3.0), 1.0);
        assert_eq!(clamp_reputation(-7.5), -1.0);
        assert_eq!(clamp_reputation(f64::NAN), 0.0);
    }
}
