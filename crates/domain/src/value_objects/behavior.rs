//! NPC behavior resolution
//!
//! Maps {personality, mood, reputation, cultural overlay, base patience} onto
//! a normalized modifier vector. The function is pure and uses a fixed order
//! of floating point operations, so identical inputs always produce identical
//! bits; a dialogue can re-derive the vector it froze at start from its log.

use serde::{Deserialize, Serialize};

use super::personality::{CulturalOverlay, PersonalityTraits};
use crate::types::{unit, Mood, ReputationBand};

/// Shortest pause an NPC will ever tolerate.
const MIN_SILENCE_SECONDS: f64 = 2.0;
/// Additional pause granted by full patience and silence comfort.
const SILENCE_RANGE_SECONDS: f64 = 8.0;

/// How an NPC behaves in conversation. Every field except
/// `silence_tolerance_seconds` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorModifiers {
    pub response_length: f64,
    pub patience: f64,
    pub helpfulness: f64,
    pub register_strictness: f64,
    pub topic_initiative: f64,
    pub expressiveness: f64,
    pub silence_tolerance_seconds: f64,
    pub escalation_tendency: f64,
}

impl BehaviorModifiers {
    /// Named fields as whole percentages, for prompt context.
    pub fn as_percentages(&self) -> Vec<(&'static str, u32)> {
        let pct = |v: f64| (unit(v) * 100.0).round() as u32;
        vec![
            ("response_length", pct(self.response_length)),
            ("patience", pct(self.patience)),
            ("helpfulness", pct(self.helpfulness)),
            ("register_strictness", pct(self.register_strictness)),
            ("topic_initiative", pct(self.topic_initiative)),
            ("expressiveness", pct(self.expressiveness)),
            ("escalation_tendency", pct(self.escalation_tendency)),
        ]
    }
}

/// Additive shifts applied on top of personality.
#[derive(Debug, Clone, Copy)]
struct MoodAdjustment {
    response_length: f64,
    patience: f64,
    helpfulness: f64,
    strictness: f64,
    initiative: f64,
    expressiveness: f64,
    escalation: f64,
}

fn mood_adjustment(mood: Mood) -> MoodAdjustment {
    match mood {
        Mood::Neutral => MoodAdjustment {
            response_length: 0.0,
            patience: 0.0,
            helpfulness: 0.0,
            strictness: 0.0,
            initiative: 0.0,
            expressiveness: 0.0,
            escalation: 0.0,
        },
        Mood::Pleased => MoodAdjustment {
            response_length: 0.05,
            patience: 0.1,
            helpfulness: 0.1,
            strictness: -0.05,
            initiative: 0.05,
            expressiveness: 0.05,
            escalation: -0.05,
        },
        Mood::Warm => MoodAdjustment {
            response_length: 0.1,
            patience: 0.2,
            helpfulness: 0.2,
            strictness: -0.1,
            initiative: 0.15,
            expressiveness: 0.15,
            escalation: -0.15,
        },
        Mood::Irritated => MoodAdjustment {
            response_length: -0.1,
            patience: -0.2,
            helpfulness: -0.15,
            strictness: 0.1,
            initiative: -0.1,
            expressiveness: 0.1,
            escalation: 0.2,
        },
        Mood::Hostile => MoodAdjustment {
            response_length: -0.2,
            patience: -0.35,
            helpfulness: -0.3,
            strictness: 0.2,
            initiative: -0.2,
            expressiveness: 0.15,
            escalation: 0.35,
        },
    }
}

/// Additive shifts a reputation band applies; same shape as [`MoodAdjustment`].
fn band_adjustment(band: ReputationBand) -> MoodAdjustment {
    match band {
        ReputationBand::Cold => MoodAdjustment {
            response_length: -0.15,
            patience: -0.1,
            helpfulness: -0.2,
            strictness: 0.1,
            initiative: -0.1,
            expressiveness: -0.1,
            escalation: 0.1,
        },
        ReputationBand::Neutral => mood_adjustment(Mood::Neutral),
        ReputationBand::Friendly => MoodAdjustment {
            response_length: 0.05,
            patience: 0.05,
            helpfulness: 0.1,
            strictness: -0.05,
            initiative: 0.05,
            expressiveness: 0.05,
            escalation: -0.05,
        },
        ReputationBand::Warm => MoodAdjustment {
            response_length: 0.1,
            patience: 0.1,
            helpfulness: 0.2,
            strictness: -0.1,
            initiative: 0.1,
            expressiveness: 0.1,
            escalation: -0.1,
        },
    }
}

/// Resolve the behavior vector for one NPC.
///
/// Every field is `unit(raw trait + mood shift + band shift)` scaled by one
/// cultural-overlay factor in [0.5, 1]. Out-of-range inputs are clamped:
/// traits, overlay and `base_patience` into [0, 1], `reputation` into [-1, 1].
pub fn resolve_behavior(
    personality: &PersonalityTraits,
    mood: Mood,
    reputation: f64,
    overlay: &CulturalOverlay,
    base_patience: f64,
) -> BehaviorModifiers {
    let p = personality.clamped();
    let c = overlay.clamped();
    let base_patience = unit(base_patience);
    let m = mood_adjustment(mood);
    let b = band_adjustment(ReputationBand::from_score(reputation));

    // Direct cultures keep answers short.
    let response_length = unit(
        0.6 * p.extraversion + 0.4 * p.openness + m.response_length + b.response_length,
    ) * (1.0 - 0.4 * c.directness);

    let patience = unit(
        0.5 * base_patience
            + 0.3 * p.agreeableness
            + 0.2 * (1.0 - p.neuroticism)
            + m.patience
            + b.patience,
    ) * (0.6 + 0.4 * c.silence_comfort);

    // Formal service cultures go further out of their way.
    let helpfulness = unit(
        0.6 * p.agreeableness + 0.4 * p.conscientiousness + m.helpfulness + b.helpfulness,
    ) * (0.7 + 0.3 * c.formality);

    let register_strictness = unit(
        0.5 * p.conscientiousness + m.strictness + b.strictness,
    ) * (0.5 + 0.5 * c.formality);

    let topic_initiative = unit(
        0.7 * p.extraversion + 0.3 * p.openness + m.initiative + b.initiative,
    ) * (0.5 + 0.5 * c.directness);

    let expressiveness = unit(
        0.5 * p.extraversion
            + 0.3 * p.neuroticism
            + 0.2 * p.openness
            + m.expressiveness
            + b.expressiveness,
    ) * (1.0 - 0.5 * c.emotional_restraint);

    let silence_tolerance_seconds =
        MIN_SILENCE_SECONDS + SILENCE_RANGE_SECONDS * patience * (0.5 + 0.5 * c.silence_comfort);

    let escalation_tendency = unit(
        0.6 * p.neuroticism + 0.4 * (1.0 - p.agreeableness) + m.escalation + b.escalation,
    ) * (1.0 - 0.5 * c.emotional_restraint);

    BehaviorModifiers {
        response_length,
        patience,
        helpfulness,
        register_strictness,
        topic_initiative,
        expressiveness,
        silence_tolerance_seconds,
        escalation_tendency,
    }
}
