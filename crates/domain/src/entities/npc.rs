//! NPC definition - the authored, immutable half of an NPC
//!
//! Runtime state (location, mood, reputation) lives in
//! [`crate::aggregates::NpcWorldState`].

use serde::{Deserialize, Serialize};

use crate::ids::NpcId;
use crate::types::{Mood, Register};
use crate::value_objects::{CulturalOverlay, PersonalityTraits};

fn default_base_patience() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcDefinition {
    pub id: NpcId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub personality: PersonalityTraits,
    #[serde(default)]
    pub cultural_overlay: CulturalOverlay,
    /// Baseline patience in [0, 1] before mood and reputation
    #[serde(default = "default_base_patience")]
    pub base_patience: f64,
    /// Register the NPC expects the learner to use
    #[serde(default)]
    pub register: Register,
    /// Words and forms this NPC tends to use
    #[serde(default)]
    pub vocabulary_focus: Vec<String>,
    #[serde(default)]
    pub initial_mood: Mood,
    #[serde(default)]
    pub initial_reputation: f64,
}

impl NpcDefinition {
    pub fn new(id: impl Into<NpcId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            personality: PersonalityTraits::default(),
            cultural_overlay: CulturalOverlay::default(),
            base_patience: default_base_patience(),
            register: Register::default(),
            vocabulary_focus: Vec::new(),
            initial_mood: Mood::default(),
            initial_reputation: 0.0,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_personality(mut self, personality: PersonalityTraits) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_cultural_overlay(mut self, overlay: CulturalOverlay) -> Self {
        self.cultural_overlay = overlay;
        self
    }

    pub fn with_base_patience(mut self, base_patience: f64) -> Self {
        self.base_patience = base_patience;
        self
    }

    pub fn with_register(mut self, register: Register) -> Self {
        self.register = register;
        self
    }

    pub fn with_vocabulary_focus(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.vocabulary_focus.extend(words);
        self
    }

    pub fn with_initial_reputation(mut self, reputation: f64) -> Self {
        self.initial_reputation = reputation;
        self
    }

    pub fn with_initial_mood(mut self, mood: Mood) -> Self {
        self.initial_mood = mood;
        self
    }
}
