//! # Parlance Domain Types
//!
//! Shared vocabulary types: pure data, no I/O, all serializable.

// Mood types
mod mood;
pub use mood::{Mood, MoodTriggerEvent};

// Reputation types
mod reputation;
pub use reputation::{clamp_reputation, ReputationBand, REPUTATION_MAX, REPUTATION_MIN};

// Learner signal types
mod friction;
pub use friction::{FrictionEvent, FrictionType, Register, RegisterAnalysis};

/// Clamp into [0, 1]; NaN becomes `nan_as`.
pub(crate) fn clamp_unit(value: f64, nan_as: f64) -> f64 {
    if value.is_nan() {
        nan_as
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// [`clamp_unit`] reading NaN as the scale midpoint (traits, overlays).
pub(crate) fn unit(value: f64) -> f64 {
    clamp_unit(value, 0.5)
}
