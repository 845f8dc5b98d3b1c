//! Session value and its orchestrator
//!
//! A [`Session`] is a plain value: one world, at most one active dialogue.
//! Only [`SessionOrchestrator`] produces new sessions; every operation returns
//! a fresh value and leaves its input valid.

mod orchestrator;
mod views;

use chrono::{DateTime, Utc};
use parlance_domain::{DialogueSession, LearnerId, LocationId, SessionId, WorldState};
use serde::{Deserialize, Serialize};

use crate::infrastructure::correlation::CorrelationId;

pub use orchestrator::SessionOrchestrator;
pub use views::{AmbientEventView, DialogueSummary, LocationView, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    learner_id: LearnerId,
    status: SessionStatus,
    world: WorldState,
    active_dialogue: Option<DialogueSession>,
    correlation_id: CorrelationId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub(crate) fn new(learner_id: LearnerId, world: WorldState, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            learner_id,
            status: SessionStatus::Active,
            world,
            active_dialogue: None,
            correlation_id: CorrelationId::new(),
            started_at: now,
            ended_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn learner_location(&self) -> &LocationId {
        self.world.learner_location()
    }

    pub fn active_dialogue(&self) -> Option<&DialogueSession> {
        self.active_dialogue.as_ref()
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    // =========================================================================
    // Value transitions (orchestrator only)
    // =========================================================================

    pub(crate) fn with_world(&self, world: WorldState) -> Self {
        let mut next = self.clone();
        next.world = world;
        next
    }

    pub(crate) fn with_dialogue(&self, dialogue: Option<DialogueSession>) -> Self {
        Self {
            active_dialogue: dialogue,
            ..self.clone()
        }
    }

    pub(crate) fn with_world_and_dialogue(
        &self,
        world: WorldState,
        dialogue: Option<DialogueSession>,
    ) -> Self {
        let mut next = self.clone();
        next.world = world;
        next.active_dialogue = dialogue;
        next
    }

    pub(crate) fn ended(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: SessionStatus::Ended,
            ended_at: Some(now),
            ..self.clone()
        }
    }
}
