//! Personality traits and cultural overlay for NPC definitions

use serde::{Deserialize, Serialize};

use crate::types::unit;

/// Five-factor personality, each trait in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityTraits {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
}

impl PersonalityTraits {
    pub fn new(
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
    ) -> Self {
        Self {
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
        }
        .clamped()
    }

    /// Copy with every trait forced into [0, 1].
    pub fn clamped(&self) -> Self {
        Self {
            openness: unit(self.openness),
            conscientiousness: unit(self.conscientiousness),
            extraversion: unit(self.extraversion),
            agreeableness: unit(self.agreeableness),
            neuroticism: unit(self.neuroticism),
        }
    }

    /// Short prose summary of the dominant traits, for prompt context.
    pub fn summary(&self) -> String {
        let p = self.clamped();
        let describe = |value: f64, high: &str, low: &str| -> Option<String> {
            if value >= 0.7 {
                Some(high.to_string())
            } else if value <= 0.3 {
                Some(low.to_string())
            } else {
                None
            }
        };

        let parts: Vec<String> = [
            describe(p.openness, "curious", "conventional"),
            describe(p.conscientiousness, "meticulous", "easygoing"),
            describe(p.extraversion, "talkative", "reserved"),
            describe(p.agreeableness, "kind", "blunt"),
            describe(p.neuroticism, "touchy", "unflappable"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            "even-tempered".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5, 0.5)
    }
}

/// Cultural norms layered over an NPC's personality, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalOverlay {
    /// How much the culture expects formal register
    pub formality: f64,
    /// Comfort with raising topics and stating things plainly
    pub directness: f64,
    /// Norm of holding emotion back in conversation
    pub emotional_restraint: f64,
    /// Comfort with pauses in conversation
    pub silence_comfort: f64,
}

impl CulturalOverlay {
    pub fn clamped(&self) -> Self {
        Self {
            formality: unit(self.formality),
            directness: unit(self.directness),
            emotional_restraint: unit(self.emotional_restraint),
            silence_comfort: unit(self.silence_comfort),
        }
    }
}

impl Default for CulturalOverlay {
    fn default() -> Self {
        Self {
            formality: 0.5,
            directness: 0.5,
            emotional_restraint: 0.5,
            silence_comfort: 0.5,
        }
    }
}
