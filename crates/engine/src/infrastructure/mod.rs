//! Infrastructure implementations.
//!
//! Port traits and their implementations, plus settings and telemetry setup.

pub mod clock;
pub mod correlation;
pub mod ports;
pub mod settings;
pub mod telemetry;
