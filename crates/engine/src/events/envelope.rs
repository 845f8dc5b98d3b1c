//! Event envelope - the wire shape of every lifecycle event
//!
//! Consumers must tolerate event types they do not know: any unrecognised
//! `type` string deserializes to [`SessionEventType::Unknown`].

use chrono::{DateTime, Utc};
use parlance_domain::{LearnerId, SessionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::correlation::CorrelationId;

pub const SCHEMA_VERSION: &str = "1.0";

/// Canonical lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEventType {
    #[serde(rename = "session.started")]
    SessionStarted,
    #[serde(rename = "session.ended")]
    SessionEnded,
    #[serde(rename = "location.entered")]
    LocationEntered,
    #[serde(rename = "location.exited")]
    LocationExited,
    #[serde(rename = "time.advanced")]
    TimeAdvanced,
    #[serde(rename = "ambient_event.triggered")]
    AmbientEventTriggered,
    #[serde(rename = "ambient_event.ended")]
    AmbientEventEnded,
    #[serde(rename = "npc.mood_changed")]
    NpcMoodChanged,
    #[serde(rename = "npc.reputation_changed")]
    NpcReputationChanged,
    #[serde(rename = "npc.availability_changed")]
    NpcAvailabilityChanged,
    #[serde(rename = "npc.relocated")]
    NpcRelocated,
    #[serde(rename = "dialogue.started")]
    DialogueStarted,
    #[serde(rename = "dialogue.turn_recorded")]
    DialogueTurnRecorded,
    #[serde(rename = "dialogue.injection_target_hit")]
    InjectionTargetHit,
    #[serde(rename = "dialogue.closing")]
    DialogueClosing,
    #[serde(rename = "dialogue.ended")]
    DialogueEnded,
    #[serde(rename = "dialogue.directives_queued")]
    DirectivesQueued,
    /// Any type this build does not know about
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl SessionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "session.started",
            Self::SessionEnded => "session.ended",
            Self::LocationEntered => "location.entered",
            Self::LocationExited => "location.exited",
            Self::TimeAdvanced => "time.advanced",
            Self::AmbientEventTriggered => "ambient_event.triggered",
            Self::AmbientEventEnded => "ambient_event.ended",
            Self::NpcMoodChanged => "npc.mood_changed",
            Self::NpcReputationChanged => "npc.reputation_changed",
            Self::NpcAvailabilityChanged => "npc.availability_changed",
            Self::NpcRelocated => "npc.relocated",
            Self::DialogueStarted => "dialogue.started",
            Self::DialogueTurnRecorded => "dialogue.turn_recorded",
            Self::InjectionTargetHit => "dialogue.injection_target_hit",
            Self::DialogueClosing => "dialogue.closing",
            Self::DialogueEnded => "dialogue.ended",
            Self::DirectivesQueued => "dialogue.directives_queued",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SessionEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: SessionEventType,
    pub emitted_at: DateTime<Utc>,
    /// Module id of the emitter
    pub source: String,
    pub learner_id: LearnerId,
    pub session_id: SessionId,
    pub correlation_id: CorrelationId,
    pub payload: serde_json::Value,
    pub schema_version: String,
}

impl EventEnvelope {
    pub fn new(
        event_type: SessionEventType,
        source: impl Into<String>,
        learner_id: LearnerId,
        session_id: SessionId,
        correlation_id: CorrelationId,
        payload: serde_json::Value,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            emitted_at,
            source: source.into(),
            learner_id,
            session_id,
            correlation_id,
            payload,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}
