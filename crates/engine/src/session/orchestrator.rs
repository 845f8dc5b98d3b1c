//! Session orchestrator
//!
//! Sequences navigation, time, and dialogue operations over a [`Session`]
//! value. Each operation:
//! 1. checks its guards (failure is `None`, never an error),
//! 2. computes the new session with pure domain transitions,
//! 3. emits events and dispatches hooks against the committed post-state.
//!
//! Observers run only after step 2, so none of them can see or influence an
//! intermediate state.

use std::sync::Arc;

use parlance_domain::{
    DialogueOutcome, DialogueSession, DomainError, EnvironmentDescription, FrictionEvent,
    LearnerId, LocationId, NpcId, RegisterAnalysis, TurnAssessment, WorldState,
};
use serde_json::json;

use super::Session;
use crate::events::{EventEmitter, EventEnvelope, SessionEventType};
use crate::hooks::{dispatch, HookEvent, HookRegistry};
use crate::infrastructure::ports::{ClockPort, RandomSource};
use crate::infrastructure::settings::SessionSettings;

pub struct SessionOrchestrator {
    hooks: Arc<HookRegistry>,
    emitter: Arc<dyn EventEmitter>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomSource>,
    settings: SessionSettings,
}

impl SessionOrchestrator {
    pub fn new(
        hooks: Arc<HookRegistry>,
        emitter: Arc<dyn EventEmitter>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomSource>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            hooks,
            emitter,
            clock,
            random,
            settings,
        }
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Build a world from `environment` and open a session on it.
    ///
    /// # Errors
    /// Any structural violation in the environment; nothing is emitted then.
    pub async fn start_session(
        &self,
        environment: &EnvironmentDescription,
        learner_id: LearnerId,
    ) -> Result<Session, DomainError> {
        let world = WorldState::from_environment(environment)?;
        let session = Session::new(learner_id, world, self.clock.now());

        tracing::info!(
            session_id = %session.id(),
            learner_id = %session.learner_id(),
            correlation_id = %session.correlation_id().short(),
            location = %session.learner_location(),
            "Session started"
        );

        self.emit(
            &session,
            SessionEventType::SessionStarted,
            json!({
                "startLocation": session.learner_location(),
                "timeOfDay": session.world().time_of_day(),
            }),
        )
        .await;
        self.dispatch(HookEvent::SessionStart(&session)).await;
        Ok(session)
    }

    /// Close the session. Further operations on the returned value are no-ops.
    pub async fn end_session(&self, session: &Session) -> Option<Session> {
        if !self.guard_active(session, "end_session") {
            return None;
        }
        let ended = session.ended(self.clock.now());

        tracing::info!(
            session_id = %ended.id(),
            ticks = ended.world().tick_count(),
            dialogue_open = ended.active_dialogue().is_some(),
            "Session ended"
        );

        self.emit(
            &ended,
            SessionEventType::SessionEnded,
            json!({
                "ticks": ended.world().tick_count(),
                "finalLocation": ended.learner_location(),
            }),
        )
        .await;
        self.dispatch(HookEvent::SessionEnd(&ended)).await;
        Some(ended)
    }

    // =========================================================================
    // World operations
    // =========================================================================

    /// Move the learner. `None` while a dialogue is active or when the target
    /// is unknown, unconnected, or inaccessible this slot.
    pub async fn navigate(&self, session: &Session, target: &LocationId) -> Option<Session> {
        if !self.guard_active(session, "navigate") {
            return None;
        }
        if session.active_dialogue().is_some() {
            tracing::debug!(session_id = %session.id(), target = %target, "Navigation blocked by active dialogue");
            return None;
        }
        let Some(world) = session.world().navigate(target) else {
            tracing::debug!(
                session_id = %session.id(),
                from = %session.learner_location(),
                target = %target,
                "Navigation rejected"
            );
            return None;
        };

        let from = session.learner_location().clone();
        let moved = session.with_world(world);
        tracing::info!(session_id = %moved.id(), from = %from, to = %target, "Learner moved");

        self.emit(
            &moved,
            SessionEventType::LocationExited,
            json!({ "locationId": from, "to": target }),
        )
        .await;
        self.emit(
            &moved,
            SessionEventType::LocationEntered,
            json!({ "locationId": target, "from": from }),
        )
        .await;
        self.dispatch(HookEvent::LocationExit(session, &from)).await;
        self.dispatch(HookEvent::LocationEnter(&moved, target)).await;
        Some(moved)
    }

    /// Advance world time by one unit.
    pub async fn tick(&self, session: &Session) -> Option<Session> {
        if !self.guard_active(session, "tick") {
            return None;
        }
        let random = self.random.clone();
        let mut draw = move || random.next_f64();
        let (world, report) = session
            .world()
            .tick(self.settings.mood_decay_turns, &mut draw);
        let next = session.with_world(world);

        tracing::debug!(
            session_id = %next.id(),
            tick = report.tick,
            slot = %report.current_slot,
            triggered = report.triggered_events.len(),
            ended = report.ended_events.len(),
            "World ticked"
        );

        for change in &report.mood_changes {
            self.emit(
                &next,
                SessionEventType::NpcMoodChanged,
                json!({
                    "npcId": change.npc_id,
                    "from": change.from,
                    "to": change.to,
                    "reason": "decay",
                }),
            )
            .await;
        }
        for event_id in &report.ended_events {
            self.emit(
                &next,
                SessionEventType::AmbientEventEnded,
                json!({ "eventId": event_id }),
            )
            .await;
        }
        for event_id in &report.triggered_events {
            let location = next
                .world()
                .ambient_event(event_id)
                .and_then(|d| d.location.clone());
            self.emit(
                &next,
                SessionEventType::AmbientEventTriggered,
                json!({ "eventId": event_id, "locationId": location }),
            )
            .await;
        }
        for relocation in &report.relocations {
            self.emit(
                &next,
                SessionEventType::NpcRelocated,
                json!({
                    "npcId": relocation.npc_id,
                    "from": relocation.from,
                    "to": relocation.to,
                }),
            )
            .await;
        }
        for change in &report.availability_changes {
            self.emit(
                &next,
                SessionEventType::NpcAvailabilityChanged,
                json!({ "npcId": change.npc_id, "available": change.available }),
            )
            .await;
        }
        self.emit(
            &next,
            SessionEventType::TimeAdvanced,
            json!({
                "tick": report.tick,
                "previousSlot": report.previous_slot,
                "timeOfDay": report.current_slot,
                "slotChanged": report.slot_changed(),
            }),
        )
        .await;
        self.dispatch(HookEvent::Tick(&next, &report)).await;
        Some(next)
    }

    /// Queue forms for future dialogues with `npc_id`.
    pub async fn queue_injection_directives(
        &self,
        session: &Session,
        npc_id: &NpcId,
        targets: &[String],
    ) -> Option<Session> {
        if !self.guard_active(session, "queue_injection_directives") {
            return None;
        }
        let world = session.world().with_injection_directives(npc_id, targets)?;
        let next = session.with_world(world);
        let pending = next
            .world()
            .npc(npc_id)
            .map(|n| n.pending_injections.clone())
            .unwrap_or_default();
        self.emit(
            &next,
            SessionEventType::DirectivesQueued,
            json!({ "npcId": npc_id, "pending": pending }),
        )
        .await;
        Some(next)
    }

    // =========================================================================
    // Dialogue operations
    // =========================================================================

    /// Open a dialogue. `None` if one is already active or the NPC is unknown,
    /// unavailable this slot, or not at the learner's location.
    pub async fn start_npc_dialogue(
        &self,
        session: &Session,
        npc_id: &NpcId,
        goal: Option<String>,
        injection_targets: Vec<String>,
    ) -> Option<Session> {
        if !self.guard_active(session, "start_npc_dialogue") {
            return None;
        }
        if session.active_dialogue().is_some() {
            tracing::debug!(session_id = %session.id(), npc_id = %npc_id, "Dialogue already active");
            return None;
        }
        let world = session.world();
        let (Some(definition), Some(state)) = (world.npc_definition(npc_id), world.npc(npc_id))
        else {
            tracing::debug!(session_id = %session.id(), npc_id = %npc_id, "Unknown npc");
            return None;
        };
        if !state.available || &state.location != session.learner_location() {
            tracing::debug!(
                session_id = %session.id(),
                npc_id = %npc_id,
                available = state.available,
                npc_location = %state.location,
                "Npc not reachable for dialogue"
            );
            return None;
        }

        let dialogue = DialogueSession::start(
            definition,
            state,
            session.learner_location().clone(),
            goal,
            injection_targets,
            self.clock.now(),
        );
        let next = session.with_dialogue(Some(dialogue.clone()));

        tracing::info!(
            session_id = %next.id(),
            dialogue_id = %dialogue.id(),
            npc_id = %npc_id,
            mood = %dialogue.opening_mood(),
            "Dialogue started"
        );

        self.emit(
            &next,
            SessionEventType::DialogueStarted,
            json!({
                "dialogueId": dialogue.id(),
                "npcId": npc_id,
                "locationId": dialogue.location_id(),
                "goal": dialogue.goal(),
                "injectionTargets": dialogue.injection_targets(),
                "behavior": dialogue.behavior(),
            }),
        )
        .await;
        self.dispatch(HookEvent::DialogueStart(&next, &dialogue)).await;
        Some(next)
    }

    /// Record a learner utterance with its pre-classified signals.
    pub async fn record_learner_turn(
        &self,
        session: &Session,
        content: &str,
        friction_events: Vec<FrictionEvent>,
        register_analysis: Option<RegisterAnalysis>,
    ) -> Option<(Session, TurnAssessment)> {
        let dialogue = self.active_dialogue(session, "record_learner_turn")?;
        let (dialogue, assessment) = match dialogue.record_learner_turn(
            content,
            friction_events,
            register_analysis,
            self.clock.now(),
        ) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Learner turn rejected");
                return None;
            }
        };
        let next = session.with_dialogue(Some(dialogue.clone()));

        let turn = dialogue.turns().last()?;
        self.emit(
            &next,
            SessionEventType::DialogueTurnRecorded,
            json!({
                "dialogueId": dialogue.id(),
                "npcId": dialogue.npc_id(),
                "speaker": turn.speaker,
                "turnIndex": dialogue.turns().len() - 1,
                "frictionCount": turn.friction_events.len(),
                "reputationDelta": assessment.reputation_delta,
                "trigger": assessment.trigger,
                "mood": assessment.mood_after,
            }),
        )
        .await;
        for target in &assessment.new_target_hits {
            self.emit(
                &next,
                SessionEventType::InjectionTargetHit,
                json!({
                    "dialogueId": dialogue.id(),
                    "npcId": dialogue.npc_id(),
                    "target": target,
                }),
            )
            .await;
        }
        self.dispatch(HookEvent::TurnComplete(&next, turn)).await;
        Some((next, assessment))
    }

    /// Record an NPC utterance produced by the text generator.
    pub async fn record_npc_turn(&self, session: &Session, content: &str) -> Option<Session> {
        let dialogue = self.active_dialogue(session, "record_npc_turn")?;
        let dialogue = match dialogue.record_npc_turn(content, self.clock.now()) {
            Ok(dialogue) => dialogue,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Npc turn rejected");
                return None;
            }
        };
        let next = session.with_dialogue(Some(dialogue.clone()));

        let turn = dialogue.turns().last()?;
        self.emit(
            &next,
            SessionEventType::DialogueTurnRecorded,
            json!({
                "dialogueId": dialogue.id(),
                "npcId": dialogue.npc_id(),
                "speaker": turn.speaker,
                "turnIndex": dialogue.turns().len() - 1,
            }),
        )
        .await;
        self.dispatch(HookEvent::TurnComplete(&next, turn)).await;
        Some(next)
    }

    /// Move the active dialogue into its closing phase.
    pub async fn begin_closing(&self, session: &Session) -> Option<Session> {
        let dialogue = self.active_dialogue(session, "begin_closing")?;
        let dialogue = match dialogue.begin_closing() {
            Ok(dialogue) => dialogue,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Closing rejected");
                return None;
            }
        };
        let next = session.with_dialogue(Some(dialogue.clone()));
        self.emit(
            &next,
            SessionEventType::DialogueClosing,
            json!({ "dialogueId": dialogue.id(), "npcId": dialogue.npc_id() }),
        )
        .await;
        Some(next)
    }

    /// End the active dialogue and commit its outcome to the world.
    ///
    /// The ended dialogue, the reputation change, and the cleared active slot
    /// are all part of one new session; observers only ever see that value.
    pub async fn finish_dialogue(
        &self,
        session: &Session,
        goal_achieved: bool,
    ) -> Option<(Session, DialogueOutcome)> {
        let dialogue = self.active_dialogue(session, "finish_dialogue")?;
        let npc_id = dialogue.npc_id().clone();

        let (_, outcome) = match dialogue.end(goal_achieved, self.clock.now()) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Dialogue end rejected");
                return None;
            }
        };
        let applied = match session.world().apply_dialogue_outcome(&npc_id, &outcome) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Dialogue outcome not applicable");
                return None;
            }
        };
        let next = session.with_world_and_dialogue(applied.world, None);

        tracing::info!(
            session_id = %next.id(),
            dialogue_id = %outcome.dialogue_id,
            npc_id = %npc_id,
            delta = outcome.reputation_delta,
            reputation = applied.reputation.current,
            goal_achieved,
            "Dialogue finished"
        );

        self.emit(
            &next,
            SessionEventType::NpcReputationChanged,
            json!({
                "npcId": npc_id,
                "previous": applied.reputation.previous,
                "current": applied.reputation.current,
                "delta": applied.reputation.delta,
                "dialogueId": outcome.dialogue_id,
            }),
        )
        .await;
        if let Some(change) = &applied.mood {
            self.emit(
                &next,
                SessionEventType::NpcMoodChanged,
                json!({
                    "npcId": change.npc_id,
                    "from": change.from,
                    "to": change.to,
                    "reason": "dialogue",
                }),
            )
            .await;
        }
        self.emit(
            &next,
            SessionEventType::DialogueEnded,
            json!({
                "dialogueId": outcome.dialogue_id,
                "npcId": npc_id,
                "goalAchieved": outcome.goal_achieved,
                "totalTurns": outcome.total_turns,
                "reputationDelta": outcome.reputation_delta,
                "registerAccuracy": outcome.register_accuracy,
                "injectionTargetsHit": outcome.injection_targets_hit,
                "finalMood": outcome.final_mood,
            }),
        )
        .await;
        self.dispatch(HookEvent::DialogueEnd(&next, &outcome)).await;
        Some((next, outcome))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn guard_active(&self, session: &Session, operation: &'static str) -> bool {
        if !session.is_active() {
            tracing::debug!(session_id = %session.id(), operation, "Operation on ended session");
            return false;
        }
        true
    }

    fn active_dialogue<'s>(
        &self,
        session: &'s Session,
        operation: &'static str,
    ) -> Option<&'s DialogueSession> {
        if !self.guard_active(session, operation) {
            return None;
        }
        let dialogue = session.active_dialogue();
        if dialogue.is_none() {
            tracing::debug!(session_id = %session.id(), operation, "No active dialogue");
        }
        dialogue
    }

    async fn emit(&self, session: &Session, event_type: SessionEventType, payload: serde_json::Value) {
        let envelope = EventEnvelope::new(
            event_type,
            self.settings.event_source.clone(),
            session.learner_id(),
            session.id(),
            session.correlation_id(),
            payload,
            self.clock.now(),
        );
        if let Err(e) = self.emitter.emit(envelope).await {
            tracing::warn!(
                session_id = %session.id(),
                event_type = %event_type,
                error = %e,
                "Failed to emit session event"
            );
        }
    }

    async fn dispatch(&self, event: HookEvent<'_>) {
        dispatch(&self.hooks, event, self.settings.hook_timeout()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EmitError, MockEventEmitter};
    use crate::infrastructure::clock::{FixedClock, SequenceRandom};
    use crate::infrastructure::ports::MockClockPort;
    use chrono::Utc;
    use parlance_domain::{FrictionType, Location, NpcDefinition};

    fn environment() -> EnvironmentDescription {
        EnvironmentDescription::new("a")
            .with_location(Location::new("a", "A").with_connection("b").with_npc("clerk"))
            .with_location(Location::new("b", "B").with_connection("a"))
            .with_npc(NpcDefinition::new("clerk", "Clerk"))
    }

    fn orchestrator(emitter: MockEventEmitter) -> SessionOrchestrator {
        SessionOrchestrator::new(
            Arc::new(HookRegistry::new()),
            Arc::new(emitter),
            Arc::new(FixedClock(Utc::now())),
            Arc::new(SequenceRandom::new(vec![0.5])),
            SessionSettings::default(),
        )
    }

    fn quiet_emitter() -> MockEventEmitter {
        let mut emitter = MockEventEmitter::new();
        emitter.expect_emit().returning(|_| Ok(()));
        emitter
    }

    #[tokio::test]
    async fn start_session_emits_started_event() {
        let mut emitter = MockEventEmitter::new();
        emitter
            .expect_emit()
            .withf(|e| e.event_type == SessionEventType::SessionStarted && e.source == "session-orchestrator")
            .times(1)
            .returning(|_| Ok(()));
        let session = orchestrator(emitter)
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("valid environment");
        assert_eq!(session.learner_location(), &LocationId::new("a"));
    }

    #[tokio::test]
    async fn invalid_environment_emits_nothing() {
        let mut emitter = MockEventEmitter::new();
        emitter.expect_emit().times(0);
        let env = environment().with_location(Location::new("c", "C").with_connection("void"));
        let result = orchestrator(emitter).start_session(&env, LearnerId::new()).await;
        assert!(matches!(result, Err(DomainError::InvalidEnvironment(_))));
    }

    #[tokio::test]
    async fn emitter_failure_does_not_block_the_transition() {
        let mut emitter = MockEventEmitter::new();
        emitter
            .expect_emit()
            .returning(|_| Err(EmitError::Transport("bus offline".into())));
        let orch = orchestrator(emitter);
        let session = orch
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("start");
        let moved = orch.navigate(&session, &LocationId::new("b")).await;
        assert!(moved.is_some());
    }

    #[tokio::test]
    async fn navigation_is_blocked_during_dialogue() {
        let orch = orchestrator(quiet_emitter());
        let session = orch
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("start");
        let talking = orch
            .start_npc_dialogue(&session, &NpcId::new("clerk"), None, vec![])
            .await
            .expect("clerk is here");
        assert!(orch.navigate(&talking, &LocationId::new("b")).await.is_none());
        assert!(orch
            .start_npc_dialogue(&talking, &NpcId::new("clerk"), None, vec![])
            .await
            .is_none());
    }

    #[tokio::test]
    async fn absent_npc_cannot_be_engaged() {
        let orch = orchestrator(quiet_emitter());
        let session = orch
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("start");
        let at_b = orch
            .navigate(&session, &LocationId::new("b"))
            .await
            .expect("a connects to b");
        assert!(orch
            .start_npc_dialogue(&at_b, &NpcId::new("clerk"), None, vec![])
            .await
            .is_none());
        assert!(orch
            .start_npc_dialogue(&session, &NpcId::new("nobody"), None, vec![])
            .await
            .is_none());
    }

    #[tokio::test]
    async fn finish_dialogue_commits_reputation_once() {
        let orch = orchestrator(quiet_emitter());
        let session = orch
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("start");
        let clerk = NpcId::new("clerk");
        let session = orch
            .start_npc_dialogue(&session, &clerk, Some("ask the way".into()), vec![])
            .await
            .expect("dialogue");
        let (session, assessment) = orch
            .record_learner_turn(
                &session,
                "Entschuldigung",
                vec![FrictionEvent::new(FrictionType::Cultural, 0.8)],
                None,
            )
            .await
            .expect("turn");
        assert!((assessment.reputation_delta + 0.12).abs() < 1e-12);

        let (after, outcome) = orch.finish_dialogue(&session, true).await.expect("finish");
        assert!(after.active_dialogue().is_none());
        let reputation = after.world().npc(&clerk).map(|n| n.reputation);
        assert_eq!(reputation, Some(outcome.reputation_delta));
        assert!(orch.finish_dialogue(&after, true).await.is_none());
        // the pre-finish snapshot is still intact
        assert!(session.active_dialogue().is_some());
    }

    #[tokio::test]
    async fn ended_session_rejects_operations() {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(Utc::now);
        let orch = SessionOrchestrator::new(
            Arc::new(HookRegistry::new()),
            Arc::new(quiet_emitter()),
            Arc::new(clock),
            Arc::new(SequenceRandom::new(vec![0.5])),
            SessionSettings::default(),
        );
        let session = orch
            .start_session(&environment(), LearnerId::new())
            .await
            .expect("start");
        let ended = orch.end_session(&session).await.expect("end");
        assert!(!ended.is_active());
        assert!(ended.ended_at().is_some());
        assert!(orch.tick(&ended).await.is_none());
        assert!(orch.end_session(&ended).await.is_none());
    }
}
