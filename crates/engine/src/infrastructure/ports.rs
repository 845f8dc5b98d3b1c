//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine besides the observer seams
//! (hooks and event subscribers). Ports exist for:
//! - Clock (for testing)
//! - Random source (ambient event firing; seedable for replay)

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Uniform draws in [0, 1). The only source of nondeterminism in a session.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}
