//! Friction events and register analysis
//!
//! Both arrive already classified by an upstream analyser; the runtime only
//! aggregates them. A friction event is append-only once it is recorded on a
//! turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::clamp_unit;
use crate::ids::FrictionEventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionType {
    Vocabulary,
    Register,
    Pragmatic,
    Cultural,
    Phonetic,
}

impl FrictionType {
    /// Reputation penalty per unit of severity.
    pub fn reputation_weight(&self) -> f64 {
        match self {
            FrictionType::Cultural => 0.15,
            FrictionType::Register => 0.10,
            FrictionType::Pragmatic => 0.08,
            FrictionType::Vocabulary => 0.05,
            FrictionType::Phonetic => 0.03,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrictionType::Vocabulary => "vocabulary",
            FrictionType::Register => "register",
            FrictionType::Pragmatic => "pragmatic",
            FrictionType::Cultural => "cultural",
            FrictionType::Phonetic => "phonetic",
        }
    }
}

impl fmt::Display for FrictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learner utterance deviating from the expected form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionEvent {
    pub id: FrictionEventId,
    #[serde(rename = "type")]
    pub friction_type: FrictionType,
    /// Always within [0, 1]
    pub severity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_production: Option<String>,
}

impl FrictionEvent {
    pub fn new(friction_type: FrictionType, severity: f64) -> Self {
        Self {
            id: FrictionEventId::new(),
            friction_type,
            severity: clamp_unit(severity, 0.0),
            target_form: None,
            actual_production: None,
        }
    }

    pub fn with_forms(mut self, target: impl Into<String>, actual: impl Into<String>) -> Self {
        self.target_form = Some(target.into());
        self.actual_production = Some(actual.into());
        self
    }

    /// Signed reputation contribution of this event (always <= 0).
    pub fn reputation_penalty(&self) -> f64 {
        -self.friction_type.reputation_weight() * clamp_unit(self.severity, 0.0)
    }
}

/// Speech register, from most to least distant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    Formal,
    #[default]
    Polite,
    Casual,
    Intimate,
}

impl Register {
    pub fn as_str(&self) -> &'static str {
        match self {
            Register::Formal => "formal",
            Register::Polite => "polite",
            Register::Casual => "casual",
            Register::Intimate => "intimate",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier verdict on the register of one learner turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAnalysis {
    pub expected: Register,
    pub detected: Register,
    pub aligned: bool,
}

impl RegisterAnalysis {
    /// Build an analysis whose alignment is derived from the two registers.
    pub fn compare(expected: Register, detected: Register) -> Self {
        Self {
            expected,
            detected,
            aligned: expected == detected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_clamped_on_construction() {
        assert_eq!(FrictionEvent::new(FrictionType::Cultural, 1.7).severity, 1.0);
        assert_eq!(FrictionEvent::new(FrictionType::Cultural, -0.2).severity, 0.0);
        assert_eq!(FrictionEvent::new(FrictionType::Cultural, f64::NAN).severity, 0.0);
    }

    #[test]
    fn cultural_penalty_scales_with_severity() {
        let event = FrictionEvent::new(FrictionType::Cultural, 0.8);
        assert!((event.reputation_penalty() - (-0.12)).abs() < 1e-12);
    }

    #[test]
    fn friction_event_uses_type_key_on_the_wire() {
        let event = FrictionEvent::new(FrictionType::Phonetic, 0.5).with_forms("über", "uber");
        let json = serde_json::to_value(&event).expect("json");
        assert_eq!(json["type"], "phonetic");
        assert_eq!(json["targetForm"], "über");
    }

    #[test]
    fn compare_derives_alignment() {
        assert!(RegisterAnalysis::compare(Register::Formal, Register::Formal).aligned);
        assert!(!RegisterAnalysis::compare(Register::Formal, Register::Casual).aligned);
    }
}
