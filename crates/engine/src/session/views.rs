//! Read-only views over a session for the render/UI layer and text generation.

use parlance_domain::{
    AmbientEventId, DialogueId, DialoguePhase, LearnerId, LocationId, Mood, NavigableLocation,
    NpcId, PromptContext, SessionId, TimeOfDay, VisibleNpc,
};
use serde::{Deserialize, Serialize};

use super::{Session, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub id: LocationId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientEventView {
    pub id: AmbientEventId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueSummary {
    pub id: DialogueId,
    pub npc_id: NpcId,
    pub phase: DialoguePhase,
    pub turns: usize,
    pub reputation_delta: f64,
    pub current_mood: Mood,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub open_targets: Vec<String>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub learner_id: LearnerId,
    pub status: SessionStatus,
    pub tick: u64,
    pub time_of_day: TimeOfDay,
    pub current_location: Option<LocationView>,
    pub visible_npcs: Vec<VisibleNpc>,
    pub navigable_locations: Vec<NavigableLocation>,
    pub active_dialogue: Option<DialogueSummary>,
    pub active_ambient_events: Vec<AmbientEventView>,
}

impl Session {
    /// NPCs present and available at the learner's location.
    pub fn visible_npcs(&self) -> Vec<VisibleNpc> {
        self.world().visible_npcs()
    }

    pub fn navigable_locations(&self) -> Vec<NavigableLocation> {
        self.world().navigable_locations()
    }

    /// Prompt context for `npc_id`, using the active dialogue when it is with
    /// that NPC.
    pub fn prompt_context(&self, npc_id: &NpcId) -> Option<PromptContext> {
        PromptContext::build(self.world(), npc_id, self.active_dialogue())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let world = self.world();
        let current_location = world.current_location().map(|l| LocationView {
            id: l.id.clone(),
            name: l.name.clone(),
            description: l.description.clone(),
        });
        let active_dialogue = self.active_dialogue().map(|d| DialogueSummary {
            id: d.id(),
            npc_id: d.npc_id().clone(),
            phase: d.phase(),
            turns: d.turns().len(),
            reputation_delta: d.reputation_delta(),
            current_mood: d.current_mood(),
            goal: d.goal().map(str::to_string),
            open_targets: d
                .open_injection_targets()
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
        let active_ambient_events = world
            .active_events_at(self.learner_location())
            .into_iter()
            .map(|e| AmbientEventView {
                id: e.id.clone(),
                name: e.name.clone(),
                description: e.description.clone(),
            })
            .collect();

        SessionSnapshot {
            session_id: self.id(),
            learner_id: self.learner_id(),
            status: self.status(),
            tick: world.tick_count(),
            time_of_day: world.time_of_day(),
            current_location,
            visible_npcs: self.visible_npcs(),
            navigable_locations: self.navigable_locations(),
            active_dialogue,
            active_ambient_events,
        }
    }
}
