//! Dialogue session aggregate - one conversation with one NPC
//!
//! Phases only move forward: `Opening -> Active -> Closing -> Ended`.
//! Every operation returns a new session; the receiver stays valid.
//!
//! # Reputation accounting
//!
//! Each learner turn contributes
//! - +0.05 when it carries no friction
//! - +0.05 when its register analysis is aligned
//! - `-weight * severity` per friction event (summed, not capped)
//!
//! A flat +0.10 is added on `end` when the goal was achieved. The running
//! delta is only committed to the world by
//! [`WorldState::apply_dialogue_outcome`](super::WorldState::apply_dialogue_outcome).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::world_state::NpcWorldState;
use crate::entities::NpcDefinition;
use crate::error::DomainError;
use crate::ids::{DialogueId, LocationId, NpcId};
use crate::types::{FrictionEvent, FrictionType, Mood, MoodTriggerEvent, RegisterAnalysis};
use crate::value_objects::{resolve_behavior, transition_mood, BehaviorModifiers, PersonalityTraits};

const FRICTION_FREE_BONUS: f64 = 0.05;
const REGISTER_ALIGNED_BONUS: f64 = 0.05;
const GOAL_BONUS: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    Opening,
    Active,
    Closing,
    Ended,
}

impl DialoguePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialoguePhase::Opening => "opening",
            DialoguePhase::Active => "active",
            DialoguePhase::Closing => "closing",
            DialoguePhase::Ended => "ended",
        }
    }
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Learner,
    Npc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub content: String,
    #[serde(default)]
    pub friction_events: Vec<FrictionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_analysis: Option<RegisterAnalysis>,
    /// Reputation contribution of this turn (0 for NPC turns)
    pub reputation_delta: f64,
    pub recorded_at: DateTime<Utc>,
}

/// What one learner turn did to the dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAssessment {
    pub reputation_delta: f64,
    pub trigger: MoodTriggerEvent,
    pub mood_before: Mood,
    pub mood_after: Mood,
    /// Targets first hit by this turn
    pub new_target_hits: Vec<String>,
}

/// Immutable summary produced when a dialogue ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueOutcome {
    pub dialogue_id: DialogueId,
    pub npc_id: NpcId,
    pub reputation_delta: f64,
    pub friction_events: Vec<FrictionEvent>,
    pub goal_achieved: bool,
    pub injection_targets_hit: Vec<String>,
    pub total_turns: usize,
    /// Learner turns only; any of them counts as a mood-reinforcing event
    #[serde(default)]
    pub learner_turns: usize,
    pub final_mood: Mood,
    /// Share of analysed learner turns with aligned register; 1.0 without evidence
    pub register_accuracy: f64,
}

#[cfg(test)]
impl DialogueOutcome {
    pub(crate) fn for_test(npc_id: NpcId, reputation_delta: f64, final_mood: Mood) -> Self {
        Self {
            dialogue_id: DialogueId::new(),
            npc_id,
            reputation_delta,
            friction_events: Vec::new(),
            goal_achieved: false,
            injection_targets_hit: Vec::new(),
            total_turns: 1,
            learner_turns: 1,
            final_mood,
            register_accuracy: 1.0,
        }
    }
}

/// Pick the one trigger a learner turn feeds into the mood transition.
///
/// Priority: cultural, register, vocabulary/pragmatic, misaligned register
/// analysis, then success. Phonetic friction alone counts as success.
pub fn dominant_trigger(
    friction_events: &[FrictionEvent],
    register_analysis: Option<&RegisterAnalysis>,
) -> MoodTriggerEvent {
    let has = |kind: FrictionType| friction_events.iter().any(|e| e.friction_type == kind);

    if has(FrictionType::Cultural) {
        MoodTriggerEvent::CulturalInsensitivity
    } else if has(FrictionType::Register) {
        MoodTriggerEvent::RegisterViolation
    } else if has(FrictionType::Vocabulary) || has(FrictionType::Pragmatic) {
        MoodTriggerEvent::CommunicationFailure
    } else if register_analysis.is_some_and(|a| !a.aligned) {
        MoodTriggerEvent::RegisterViolation
    } else {
        MoodTriggerEvent::SuccessfulCommunication
    }
}

/// Reputation contribution of one learner turn.
pub fn turn_reputation_delta(
    friction_events: &[FrictionEvent],
    register_analysis: Option<&RegisterAnalysis>,
) -> f64 {
    let mut delta = 0.0;
    if friction_events.is_empty() {
        delta += FRICTION_FREE_BONUS;
    }
    if register_analysis.is_some_and(|a| a.aligned) {
        delta += REGISTER_ALIGNED_BONUS;
    }
    for event in friction_events {
        delta += event.reputation_penalty();
    }
    delta
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueSession {
    id: DialogueId,
    npc_id: NpcId,
    location_id: LocationId,
    goal: Option<String>,
    phase: DialoguePhase,
    turns: Vec<DialogueTurn>,
    reputation_delta: f64,
    friction_events: Vec<FrictionEvent>,
    injection_targets: Vec<String>,
    injection_targets_hit: Vec<String>,
    /// Resolved once at start and never recomputed
    behavior: BehaviorModifiers,
    personality: PersonalityTraits,
    opening_mood: Mood,
    current_mood: Mood,
    last_trigger: Option<MoodTriggerEvent>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl DialogueSession {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Open a dialogue. Targets come from `injection_targets`, or from the
    /// NPC's pending directives when that is empty. Blank targets are dropped.
    pub fn start(
        npc: &NpcDefinition,
        state: &NpcWorldState,
        location_id: LocationId,
        goal: Option<String>,
        injection_targets: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let behavior = resolve_behavior(
            &npc.personality,
            state.mood,
            state.reputation,
            &npc.cultural_overlay,
            npc.base_patience,
        );
        let source = if injection_targets.is_empty() {
            state.pending_injections.clone()
        } else {
            injection_targets
        };
        let mut targets: Vec<String> = Vec::new();
        for target in source {
            let trimmed = target.trim();
            let lowered = trimmed.to_lowercase();
            if !trimmed.is_empty() && !targets.iter().any(|t| t.to_lowercase() == lowered) {
                targets.push(trimmed.to_string());
            }
        }

        Self {
            id: DialogueId::new(),
            npc_id: npc.id.clone(),
            location_id,
            goal: goal.filter(|g| !g.trim().is_empty()),
            phase: DialoguePhase::Opening,
            turns: Vec::new(),
            reputation_delta: 0.0,
            friction_events: Vec::new(),
            injection_targets: targets,
            injection_targets_hit: Vec::new(),
            behavior,
            personality: npc.personality,
            opening_mood: state.mood,
            current_mood: state.mood,
            last_trigger: None,
            started_at: now,
            ended_at: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> DialogueId {
        self.id
    }

    pub fn npc_id(&self) -> &NpcId {
        &self.npc_id
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    pub fn reputation_delta(&self) -> f64 {
        self.reputation_delta
    }

    pub fn friction_events(&self) -> &[FrictionEvent] {
        &self.friction_events
    }

    pub fn injection_targets(&self) -> &[String] {
        &self.injection_targets
    }

    pub fn injection_targets_hit(&self) -> &[String] {
        &self.injection_targets_hit
    }

    /// Targets not yet produced by the learner.
    pub fn open_injection_targets(&self) -> Vec<&str> {
        self.injection_targets
            .iter()
            .filter(|t| !self.injection_targets_hit.contains(t))
            .map(String::as_str)
            .collect()
    }

    pub fn behavior(&self) -> &BehaviorModifiers {
        &self.behavior
    }

    pub fn opening_mood(&self) -> Mood {
        self.opening_mood
    }

    pub fn current_mood(&self) -> Mood {
        self.current_mood
    }

    pub fn last_trigger(&self) -> Option<MoodTriggerEvent> {
        self.last_trigger
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_ended(&self) -> bool {
        self.phase == DialoguePhase::Ended
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Record a learner utterance with its pre-classified signals.
    ///
    /// # Errors
    /// `InvalidStateTransition` once the dialogue has ended.
    pub fn record_learner_turn(
        &self,
        content: impl Into<String>,
        friction_events: Vec<FrictionEvent>,
        register_analysis: Option<RegisterAnalysis>,
        now: DateTime<Utc>,
    ) -> Result<(Self, TurnAssessment), DomainError> {
        self.ensure_open("record a learner turn")?;
        let content = content.into();
        let mut next = self.clone();

        let delta = turn_reputation_delta(&friction_events, register_analysis.as_ref());
        let trigger = dominant_trigger(&friction_events, register_analysis.as_ref());
        let mood_before = next.current_mood;
        let mood_after = transition_mood(mood_before, trigger, &next.personality);

        let lowered = content.to_lowercase();
        let new_target_hits: Vec<String> = next
            .injection_targets
            .iter()
            .filter(|t| !next.injection_targets_hit.contains(t))
            .filter(|t| lowered.contains(&t.to_lowercase()))
            .cloned()
            .collect();
        next.injection_targets_hit
            .extend(new_target_hits.iter().cloned());

        next.reputation_delta += delta;
        next.friction_events.extend(friction_events.iter().cloned());
        next.current_mood = mood_after;
        next.last_trigger = Some(trigger);
        if next.phase == DialoguePhase::Opening {
            next.phase = DialoguePhase::Active;
        }
        next.turns.push(DialogueTurn {
            speaker: Speaker::Learner,
            content,
            friction_events,
            register_analysis,
            reputation_delta: delta,
            recorded_at: now,
        });

        let assessment = TurnAssessment {
            reputation_delta: delta,
            trigger,
            mood_before,
            mood_after,
            new_target_hits,
        };
        Ok((next, assessment))
    }

    /// Record an NPC utterance. No reputation or mood effect.
    ///
    /// # Errors
    /// `InvalidStateTransition` once the dialogue has ended.
    pub fn record_npc_turn(
        &self,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.ensure_open("record an npc turn")?;
        let mut next = self.clone();
        next.turns.push(DialogueTurn {
            speaker: Speaker::Npc,
            content: content.into(),
            friction_events: Vec::new(),
            register_analysis: None,
            reputation_delta: 0.0,
            recorded_at: now,
        });
        Ok(next)
    }

    /// Move to `Closing`.
    ///
    /// # Errors
    /// `InvalidStateTransition` unless the dialogue is opening or active.
    pub fn begin_closing(&self) -> Result<Self, DomainError> {
        match self.phase {
            DialoguePhase::Opening | DialoguePhase::Active => {
                let mut next = self.clone();
                next.phase = DialoguePhase::Closing;
                Ok(next)
            }
            phase => Err(DomainError::invalid_state_transition(format!(
                "cannot begin closing dialogue {} in phase {}",
                self.id, phase
            ))),
        }
    }

    /// End the dialogue and produce its outcome.
    ///
    /// # Errors
    /// `InvalidStateTransition` if it already ended, so the goal bonus can
    /// never be applied twice.
    pub fn end(
        &self,
        goal_achieved: bool,
        now: DateTime<Utc>,
    ) -> Result<(Self, DialogueOutcome), DomainError> {
        self.ensure_open("end")?;
        let mut next = self.clone();
        if goal_achieved {
            next.reputation_delta += GOAL_BONUS;
        }
        next.phase = DialoguePhase::Ended;
        next.ended_at = Some(now);

        let outcome = DialogueOutcome {
            dialogue_id: next.id,
            npc_id: next.npc_id.clone(),
            reputation_delta: next.reputation_delta,
            friction_events: next.friction_events.clone(),
            goal_achieved,
            injection_targets_hit: next.injection_targets_hit.clone(),
            total_turns: next.turns.len(),
            learner_turns: next
                .turns
                .iter()
                .filter(|t| t.speaker == Speaker::Learner)
                .count(),
            final_mood: next.current_mood,
            register_accuracy: next.register_accuracy(),
        };
        Ok((next, outcome))
    }

    /// Mean alignment over learner turns that carried an analysis.
    pub fn register_accuracy(&self) -> f64 {
        let analysed: Vec<bool> = self
            .turns
            .iter()
            .filter(|t| t.speaker == Speaker::Learner)
            .filter_map(|t| t.register_analysis.map(|a| a.aligned))
            .collect();
        if analysed.is_empty() {
            return 1.0;
        }
        let aligned = analysed.iter().filter(|a| **a).count();
        aligned as f64 / analysed.len() as f64
    }

    fn ensure_open(&self, action: &str) -> Result<(), DomainError> {
        if self.is_ended() {
            return Err(DomainError::invalid_state_transition(format!(
                "cannot {} dialogue {}: already ended",
                action, self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Register;

    const EPS: f64 = 1e-12;

    fn npc() -> NpcDefinition {
        NpcDefinition::new("baker", "Baker")
            .with_personality(PersonalityTraits::new(0.5, 0.5, 0.5, 0.6, 0.5))
    }

    fn state() -> NpcWorldState {
        NpcWorldState {
            npc_id: NpcId::new("baker"),
            location: LocationId::new("bakery"),
            available: true,
            mood: Mood::Neutral,
            turns_since_mood_change: 0,
            reputation: 0.0,
            pending_injections: vec!["Brötchen".to_string()],
        }
    }

    fn open(targets: Vec<String>) -> DialogueSession {
        DialogueSession::start(
            &npc(),
            &state(),
            LocationId::new("bakery"),
            Some("buy bread".to_string()),
            targets,
            Utc::now(),
        )
    }

    fn aligned() -> Option<RegisterAnalysis> {
        Some(RegisterAnalysis::compare(Register::Polite, Register::Polite))
    }

    #[test]
    fn clean_aligned_turn_is_worth_exactly_a_tenth() {
        let (d, assessment) = open(vec![])
            .record_learner_turn("Guten Tag", vec![], aligned(), Utc::now())
            .expect("open dialogue");
        assert!((assessment.reputation_delta - 0.10).abs() < EPS);
        assert_eq!(assessment.trigger, MoodTriggerEvent::SuccessfulCommunication);
        assert_eq!(d.phase(), DialoguePhase::Active);
        assert_eq!(d.current_mood(), Mood::Pleased);
    }

    #[test]
    fn cultural_friction_penalty_is_weighted_by_severity() {
        let friction = vec![FrictionEvent::new(FrictionType::Cultural, 0.8)];
        let (_, assessment) = open(vec![])
            .record_learner_turn("...", friction, None, Utc::now())
            .expect("open dialogue");
        assert!((assessment.reputation_delta - (-0.12)).abs() < EPS);
        assert_eq!(assessment.trigger, MoodTriggerEvent::CulturalInsensitivity);
    }

    #[test]
    fn trigger_priority_prefers_cultural_then_register() {
        let mixed = vec![
            FrictionEvent::new(FrictionType::Vocabulary, 0.5),
            FrictionEvent::new(FrictionType::Register, 0.5),
        ];
        assert_eq!(dominant_trigger(&mixed, None), MoodTriggerEvent::RegisterViolation);

        let misaligned = RegisterAnalysis::compare(Register::Formal, Register::Casual);
        assert_eq!(
            dominant_trigger(&[], Some(&misaligned)),
            MoodTriggerEvent::RegisterViolation
        );
        let phonetic = vec![FrictionEvent::new(FrictionType::Phonetic, 0.9)];
        assert_eq!(
            dominant_trigger(&phonetic, None),
            MoodTriggerEvent::SuccessfulCommunication
        );
    }

    #[test]
    fn three_turn_dialogue_accumulates_delta_and_goal_bonus() {
        let d = open(vec![]);
        let (d, _) = d
            .record_learner_turn("Hallo", vec![], aligned(), Utc::now())
            .expect("turn 1");
        let d = d.record_npc_turn("Hallo! Was darf es sein?", Utc::now()).expect("npc");
        let (d, _) = d
            .record_learner_turn(
                "Ein Brot, bitte",
                vec![FrictionEvent::new(FrictionType::Vocabulary, 0.3)],
                aligned(),
                Utc::now(),
            )
            .expect("turn 3");
        let (d, outcome) = d.end(true, Utc::now()).expect("end");
        assert_eq!(outcome.total_turns, 3);
        assert_eq!(outcome.learner_turns, 2);
        assert_eq!(outcome.friction_events.len(), 1);
        let expected = 0.10 + 0.0 + (0.05 - 0.05 * 0.3) + 0.10;
        assert!((outcome.reputation_delta - expected).abs() < EPS);
        assert!(d.is_ended());
    }

    #[test]
    fn three_turn_dialogue_without_final_analysis() {
        let d = open(vec![]);
        let (d, _) = d
            .record_learner_turn("Hallo", vec![], aligned(), Utc::now())
            .expect("turn 1");
        let d = d.record_npc_turn("Hallo! Was darf es sein?", Utc::now()).expect("npc");
        let (d, last) = d
            .record_learner_turn(
                "Ein Brot, bitte",
                vec![FrictionEvent::new(FrictionType::Vocabulary, 0.3)],
                None,
                Utc::now(),
            )
            .expect("turn 3");
        assert!((last.reputation_delta + 0.015).abs() < EPS);
        let (_, outcome) = d.end(true, Utc::now()).expect("end");
        // 0.10 aligned + 0 npc - 0.015 friction + 0.10 goal
        assert!((outcome.reputation_delta - 0.185).abs() < EPS);
    }

    #[test]
    fn ending_twice_is_rejected() {
        let (ended, first) = open(vec![]).end(true, Utc::now()).expect("first end");
        assert!((first.reputation_delta - 0.10).abs() < EPS);
        let err = ended.end(true, Utc::now()).expect_err("second end");
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert!((ended.reputation_delta() - 0.10).abs() < EPS);
    }

    #[test]
    fn turns_after_end_are_rejected() {
        let (ended, _) = open(vec![]).end(false, Utc::now()).expect("end");
        assert!(ended.record_npc_turn("bye", Utc::now()).is_err());
        assert!(ended
            .record_learner_turn("bye", vec![], None, Utc::now())
            .is_err());
        assert!(ended.begin_closing().is_err());
    }

    #[test]
    fn closing_still_accepts_turns() {
        let d = open(vec![]).begin_closing().expect("closing");
        assert_eq!(d.phase(), DialoguePhase::Closing);
        let (d, _) = d
            .record_learner_turn("Tschüss", vec![], None, Utc::now())
            .expect("closing turn");
        assert_eq!(d.phase(), DialoguePhase::Closing);
        assert!(d.begin_closing().is_err());
    }

    #[test]
    fn targets_are_hit_case_insensitively_and_stay_hit() {
        let d = open(vec!["Bitte".to_string(), "danke".to_string()]);
        let (d, a) = d
            .record_learner_turn("Ein Brot, BITTE", vec![], None, Utc::now())
            .expect("turn");
        assert_eq!(a.new_target_hits, vec!["Bitte".to_string()]);
        let (d, a) = d
            .record_learner_turn("nochmal bitte", vec![], None, Utc::now())
            .expect("turn");
        assert!(a.new_target_hits.is_empty());
        assert_eq!(d.injection_targets_hit(), ["Bitte".to_string()]);
        assert_eq!(d.open_injection_targets(), vec!["danke"]);
    }

    #[test]
    fn targets_fall_back_to_pending_directives() {
        let d = open(vec![]);
        assert_eq!(d.injection_targets(), ["Brötchen".to_string()]);
    }

    #[test]
    fn register_accuracy_ignores_unanalysed_turns() {
        let d = open(vec![]);
        assert_eq!(d.register_accuracy(), 1.0);
        let (d, _) = d
            .record_learner_turn("a", vec![], aligned(), Utc::now())
            .expect("turn");
        let misaligned = Some(RegisterAnalysis::compare(Register::Formal, Register::Casual));
        let (d, _) = d
            .record_learner_turn("b", vec![], misaligned, Utc::now())
            .expect("turn");
        let (d, _) = d
            .record_learner_turn("c", vec![], None, Utc::now())
            .expect("turn");
        assert!((d.register_accuracy() - 0.5).abs() < EPS);
    }

    #[test]
    fn final_mood_follows_last_transition() {
        let friction = vec![FrictionEvent::new(FrictionType::Cultural, 0.5)];
        let (d, _) = open(vec![])
            .record_learner_turn("oops", friction, None, Utc::now())
            .expect("turn");
        let (_, outcome) = d.end(false, Utc::now()).expect("end");
        assert_eq!(outcome.final_mood, Mood::Hostile);
    }
}
