//! NPC mood and the events that move it
//!
//! Mood is per NPC (not per learner), semi-persistent across dialogues, and
//! decays back to `Neutral` when nothing reinforces it for a while. It sits on
//! a valence ladder so that transitions can be expressed as signed steps:
//!
//! `Hostile < Irritated < Neutral < Pleased < Warm`

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NPC's current emotional state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Actively unwilling to engage
    Hostile,
    /// Annoyed, short with the learner
    Irritated,
    /// Baseline (decay target)
    #[default]
    Neutral,
    /// Content with how things are going
    Pleased,
    /// Openly friendly and generous
    Warm,
}

impl Mood {
    /// Ladder order, most negative first.
    const LADDER: [Mood; 5] = [
        Mood::Hostile,
        Mood::Irritated,
        Mood::Neutral,
        Mood::Pleased,
        Mood::Warm,
    ];

    pub fn all() -> &'static [Mood] {
        &Self::LADDER
    }

    /// Signed position on the ladder, `Neutral` is 0.
    pub fn valence(&self) -> i8 {
        match self {
            Mood::Hostile => -2,
            Mood::Irritated => -1,
            Mood::Neutral => 0,
            Mood::Pleased => 1,
            Mood::Warm => 2,
        }
    }

    /// Move `steps` rungs along the ladder, saturating at both ends.
    pub fn shifted(&self, steps: i8) -> Mood {
        let index = (self.valence() + 2).saturating_add(steps).clamp(0, 4) as usize;
        Self::LADDER[index]
    }

    pub fn is_negative(&self) -> bool {
        self.valence() < 0
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mood::Hostile => "Hostile",
            Mood::Irritated => "Irritated",
            Mood::Neutral => "Neutral",
            Mood::Pleased => "Pleased",
            Mood::Warm => "Warm",
        }
    }

    /// Get a brief description for prompt context
    pub fn description(&self) -> &'static str {
        match self {
            Mood::Hostile => "openly hostile and unwilling to cooperate",
            Mood::Irritated => "annoyed and impatient",
            Mood::Neutral => "calm and even-tempered",
            Mood::Pleased => "pleased with the conversation",
            Mood::Warm => "warm, friendly, and generous",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

impl FromStr for Mood {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hostile" => Ok(Mood::Hostile),
            "irritated" => Ok(Mood::Irritated),
            "neutral" => Ok(Mood::Neutral),
            "pleased" => Ok(Mood::Pleased),
            "warm" => Ok(Mood::Warm),
            _ => Err(DomainError::parse("Mood", s)),
        }
    }
}

/// The dominant signal of a learner turn, fed into the mood transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTriggerEvent {
    SuccessfulCommunication,
    CommunicationFailure,
    RegisterViolation,
    CulturalInsensitivity,
}

impl MoodTriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTriggerEvent::SuccessfulCommunication => "successful_communication",
            MoodTriggerEvent::CommunicationFailure => "communication_failure",
            MoodTriggerEvent::RegisterViolation => "register_violation",
            MoodTriggerEvent::CulturalInsensitivity => "cultural_insensitivity",
        }
    }
}

impl fmt::Display for MoodTriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
