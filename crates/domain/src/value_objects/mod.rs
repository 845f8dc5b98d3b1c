//! Value objects and pure functions over them.

mod behavior;
mod mood_transition;
mod personality;

pub use behavior::{resolve_behavior, BehaviorModifiers};
pub use mood_transition::{should_decay_mood, transition_mood};
pub use personality::{CulturalOverlay, PersonalityTraits};
