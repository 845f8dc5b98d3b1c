//! Mood transition table
//!
//! Deterministic and personality-weighted. Each trigger moves the mood a number
//! of rungs along the valence ladder (see [`Mood::shifted`]):
//!
//! | trigger                  | base | weighting                                  |
//! |--------------------------|------|--------------------------------------------|
//! | successful communication | +1   | agreeableness < 0.3 caps the result at pleased |
//! | communication failure    | -1   | neuroticism < 0.3 absorbs it (0)           |
//! | register violation       | -1   | neuroticism >= 0.7 makes it -2             |
//! | cultural insensitivity   | -2   | neuroticism >= 0.7 makes it -3             |
//!
//! Tick-time decay is the only time-based transition, see [`should_decay_mood`].

use super::personality::PersonalityTraits;
use crate::types::{Mood, MoodTriggerEvent};

const HIGH_NEUROTICISM: f64 = 0.7;
const LOW_NEUROTICISM: f64 = 0.3;
const LOW_AGREEABLENESS: f64 = 0.3;

/// Apply one trigger to the current mood.
pub fn transition_mood(
    current: Mood,
    trigger: MoodTriggerEvent,
    personality: &PersonalityTraits,
) -> Mood {
    let p = personality.clamped();
    let volatile = p.neuroticism >= HIGH_NEUROTICISM;

    match trigger {
        MoodTriggerEvent::SuccessfulCommunication => {
            let next = current.shifted(1);
            if p.agreeableness < LOW_AGREEABLENESS && next == Mood::Warm && current != Mood::Warm {
                Mood::Pleased
            } else {
                next
            }
        }
        MoodTriggerEvent::CommunicationFailure => {
            if p.neuroticism < LOW_NEUROTICISM {
                current
            } else {
                current.shifted(-1)
            }
        }
        MoodTriggerEvent::RegisterViolation => current.shifted(if volatile { -2 } else { -1 }),
        MoodTriggerEvent::CulturalInsensitivity => {
            current.shifted(if volatile { -3 } else { -2 })
        }
    }
}

/// True once a non-neutral mood has gone `threshold` turns without being
/// reinforced. The decay target is always [`Mood::Neutral`].
pub fn should_decay_mood(mood: Mood, turns_since_last_change: u32, threshold: u32) -> bool {
    mood != Mood::Neutral && turns_since_last_change >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(agreeableness: f64, neuroticism: f64) -> PersonalityTraits {
        PersonalityTraits::new(0.5, 0.5, 0.5, agreeableness, neuroticism)
    }

    #[test]
    fn success_climbs_one_rung() {
        let p = with(0.6, 0.5);
        let m = transition_mood(
            Mood::Irritated,
            MoodTriggerEvent::SuccessfulCommunication,
            &p,
        );
        assert_eq!(m, Mood::Neutral);
        let m = transition_mood(Mood::Pleased, MoodTriggerEvent::SuccessfulCommunication, &p);
        assert_eq!(m, Mood::Warm);
    }

    #[test]
    fn disagreeable_npc_never_warms_past_pleased() {
        let p = with(0.1, 0.5);
        let m = transition_mood(Mood::Pleased, MoodTriggerEvent::SuccessfulCommunication, &p);
        assert_eq!(m, Mood::Pleased);
    }

    #[test]
    fn calm_npc_absorbs_communication_failure() {
        let calm = with(0.5, 0.1);
        let touchy = with(0.5, 0.5);
        assert_eq!(
            transition_mood(Mood::Neutral, MoodTriggerEvent::CommunicationFailure, &calm),
            Mood::Neutral
        );
        assert_eq!(
            transition_mood(Mood::Neutral, MoodTriggerEvent::CommunicationFailure, &touchy),
            Mood::Irritated
        );
    }

    #[test]
    fn neuroticism_amplifies_negative_transitions() {
        let steady = with(0.5, 0.4);
        let volatile = with(0.5, 0.9);
        assert_eq!(
            transition_mood(Mood::Neutral, MoodTriggerEvent::RegisterViolation, &steady),
            Mood::Irritated
        );
        assert_eq!(
            transition_mood(Mood::Neutral, MoodTriggerEvent::RegisterViolation, &volatile),
            Mood::Hostile
        );
        assert_eq!(
            transition_mood(Mood::Warm, MoodTriggerEvent::CulturalInsensitivity, &steady),
            Mood::Neutral
        );
        assert_eq!(
            transition_mood(Mood::Warm, MoodTriggerEvent::CulturalInsensitivity, &volatile),
            Mood::Irritated
        );
    }

    #[test]
    fn decay_only_applies_to_non_neutral_moods_past_threshold() {
        assert!(!should_decay_mood(Mood::Neutral, 100, 5));
        assert!(!should_decay_mood(Mood::Irritated, 4, 5));
        assert!(should_decay_mood(Mood::Irritated, 5, 5));
        assert!(should_decay_mood(Mood::Warm, 6, 5));
    }
}
