//! Property-based tests for the pure parts of parlance-domain.
//!
//! Behavior resolution must stay in range and be bit-reproducible for any
//! input, mood transitions must stay on the ladder, and reputation must never
//! leave [-1, 1] however many outcomes are applied.

use parlance_domain::{
    clamp_reputation, resolve_behavior, transition_mood, CulturalOverlay, Mood, MoodTriggerEvent,
    PersonalityTraits,
};
use proptest::prelude::*;

fn any_mood() -> impl Strategy<Value = Mood> {
    prop::sample::select(Mood::all().to_vec())
}

fn any_trigger() -> impl Strategy<Value = MoodTriggerEvent> {
    prop::sample::select(vec![
        MoodTriggerEvent::SuccessfulCommunication,
        MoodTriggerEvent::CommunicationFailure,
        MoodTriggerEvent::RegisterViolation,
        MoodTriggerEvent::CulturalInsensitivity,
    ])
}

fn any_personality() -> impl Strategy<Value = PersonalityTraits> {
    (-1.0f64..2.0, -1.0f64..2.0, -1.0f64..2.0, -1.0f64..2.0, -1.0f64..2.0)
        .prop_map(|(o, c, e, a, n)| PersonalityTraits {
            openness: o,
            conscientiousness: c,
            extraversion: e,
            agreeableness: a,
            neuroticism: n,
        })
}

fn any_overlay() -> impl Strategy<Value = CulturalOverlay> {
    (-1.0f64..2.0, -1.0f64..2.0, -1.0f64..2.0, -1.0f64..2.0).prop_map(|(f, d, r, s)| {
        CulturalOverlay {
            formality: f,
            directness: d,
            emotional_restraint: r,
            silence_comfort: s,
        }
    })
}

// ============================================================================
// Behavior Resolution
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Every normalized field lands in [0, 1] even for out-of-range inputs.
    #[test]
    fn resolved_behavior_is_bounded(
        p in any_personality(),
        mood in any_mood(),
        reputation in -3.0f64..3.0,
        overlay in any_overlay(),
        base_patience in -1.0f64..2.0,
    ) {
        let b = resolve_behavior(&p, mood, reputation, &overlay, base_patience);
        for v in [
            b.response_length,
            b.patience,
            b.helpfulness,
            b.register_strictness,
            b.topic_initiative,
            b.expressiveness,
            b.escalation_tendency,
        ] {
            prop_assert!((0.0..=1.0).contains(&v), "field out of range: {}", v);
        }
        prop_assert!(b.silence_tolerance_seconds > 0.0);
    }

    /// Same inputs, same bits.
    #[test]
    fn resolved_behavior_is_deterministic(
        p in any_personality(),
        mood in any_mood(),
        reputation in -1.0f64..1.0,
        overlay in any_overlay(),
        base_patience in 0.0f64..1.0,
    ) {
        let a = resolve_behavior(&p, mood, reputation, &overlay, base_patience);
        let b = resolve_behavior(&p, mood, reputation, &overlay, base_patience);
        prop_assert_eq!(a.patience.to_bits(), b.patience.to_bits());
        prop_assert_eq!(a.helpfulness.to_bits(), b.helpfulness.to_bits());
        prop_assert_eq!(
            a.silence_tolerance_seconds.to_bits(),
            b.silence_tolerance_seconds.to_bits()
        );
        prop_assert_eq!(a, b);
    }
}

// ============================================================================
// Mood Transition
// ============================================================================

proptest! {
    /// Success never lowers the mood; every other trigger never raises it.
    #[test]
    fn transitions_move_in_the_trigger_direction(
        mood in any_mood(),
        trigger in any_trigger(),
        p in any_personality(),
    ) {
        let next = transition_mood(mood, trigger, &p);
        match trigger {
            MoodTriggerEvent::SuccessfulCommunication => prop_assert!(next.valence() >= mood.valence()),
            _ => prop_assert!(next.valence() <= mood.valence()),
        }
        prop_assert!(next.valence().abs() <= 2);
    }
}

// ============================================================================
// Reputation
// ============================================================================

proptest! {
    /// Any sequence of clamped additions stays inside [-1, 1].
    #[test]
    fn reputation_stays_bounded(deltas in prop::collection::vec(-0.5f64..0.5, 0..50)) {
        let mut reputation = 0.0;
        for delta in deltas {
            reputation = clamp_reputation(reputation + delta);
            prop_assert!((-1.0..=1.0).contains(&reputation));
        }
    }
}
