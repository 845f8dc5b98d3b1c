//! World state aggregate
//!
//! Every mutation is a transition `(&WorldState, input) -> WorldState`: the
//! receiver is never modified, so a caller (or an observer) holding the
//! previous snapshot keeps a valid view of it.
//!
//! # Invariants
//! - `learner_location` is always a key of `locations`
//! - every NPC has exactly one `NpcWorldState`, located at a known location
//! - `reputation` stays in [-1, 1] and only moves by signed deltas

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dialogue::DialogueOutcome;
use crate::entities::{
    ActiveAmbientEvent, AmbientEventDefinition, EnvironmentDescription, Location, NpcDefinition,
    TimeSchedule,
};
use crate::error::DomainError;
use crate::ids::{AmbientEventId, LocationId, NpcId};
use crate::time_of_day::TimeOfDay;
use crate::types::{clamp_reputation, Mood, ReputationBand};
use crate::value_objects::{resolve_behavior, should_decay_mood, BehaviorModifiers};

/// Runtime state of one NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcWorldState {
    pub npc_id: NpcId,
    pub location: LocationId,
    pub available: bool,
    pub mood: Mood,
    /// Ticks since the mood last changed; reset on every change
    pub turns_since_mood_change: u32,
    pub reputation: f64,
    /// Forms future dialogues with this NPC should elicit
    pub pending_injections: Vec<String>,
}

impl NpcWorldState {
    fn from_definition(definition: &NpcDefinition, location: LocationId, available: bool) -> Self {
        Self {
            npc_id: definition.id.clone(),
            location,
            available,
            mood: definition.initial_mood,
            turns_since_mood_change: 0,
            reputation: clamp_reputation(definition.initial_reputation),
            pending_injections: Vec::new(),
        }
    }

    pub fn reputation_band(&self) -> ReputationBand {
        ReputationBand::from_score(self.reputation)
    }

    fn set_mood(&mut self, mood: Mood) -> bool {
        if self.mood == mood {
            return false;
        }
        self.mood = mood;
        self.turns_since_mood_change = 0;
        true
    }
}

/// A mood change applied by the world (decay or dialogue outcome).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodChange {
    pub npc_id: NpcId,
    pub from: Mood,
    pub to: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationChange {
    pub npc_id: NpcId,
    pub previous: f64,
    pub current: f64,
    /// The delta requested by the outcome (before clamping)
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityChange {
    pub npc_id: NpcId,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relocation {
    pub npc_id: NpcId,
    pub from: LocationId,
    pub to: LocationId,
}

/// Everything one tick changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub tick: u64,
    pub previous_slot: TimeOfDay,
    pub current_slot: TimeOfDay,
    pub mood_changes: Vec<MoodChange>,
    pub triggered_events: Vec<AmbientEventId>,
    pub ended_events: Vec<AmbientEventId>,
    pub availability_changes: Vec<AvailabilityChange>,
    pub relocations: Vec<Relocation>,
}

impl TickReport {
    pub fn slot_changed(&self) -> bool {
        self.previous_slot != self.current_slot
    }
}

/// Result of applying a finished dialogue to the world.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeApplication {
    pub world: WorldState,
    pub reputation: ReputationChange,
    pub mood: Option<MoodChange>,
}

/// A connection out of the learner's location as the UI should show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigableLocation {
    pub id: LocationId,
    pub name: String,
    pub accessible: bool,
}

/// An NPC the learner can currently see, with its resolved behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleNpc {
    pub id: NpcId,
    pub name: String,
    pub role: String,
    pub mood: Mood,
    pub reputation: f64,
    pub reputation_band: ReputationBand,
    pub reputation_descriptor: String,
    pub behavior: BehaviorModifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    learner_location: LocationId,
    locations: BTreeMap<LocationId, Location>,
    npc_definitions: BTreeMap<NpcId, NpcDefinition>,
    npcs: BTreeMap<NpcId, NpcWorldState>,
    schedule: TimeSchedule,
    ambient_events: BTreeMap<AmbientEventId, AmbientEventDefinition>,
    active_events: Vec<ActiveAmbientEvent>,
    tick: u64,
}

impl WorldState {
    /// Build a world from an environment description.
    ///
    /// # Errors
    /// Any structural violation in `environment` aborts construction; no
    /// partially valid world is ever returned.
    pub fn from_environment(environment: &EnvironmentDescription) -> Result<Self, DomainError> {
        environment.validate()?;
        let homes = environment.npc_homes()?;
        let schedule = environment.schedule.clone();

        let mut npcs = BTreeMap::new();
        for definition in &environment.npcs {
            let home = homes
                .get(&definition.id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("NpcLocation", definition.id.as_str()))?;
            let location = schedule
                .enabled
                .then(|| schedule.npc_locations.get(&schedule.current))
                .flatten()
                .and_then(|slot| slot.get(&definition.id))
                .cloned()
                .unwrap_or(home);
            let available = schedule.is_npc_available(&definition.id);
            npcs.insert(
                definition.id.clone(),
                NpcWorldState::from_definition(definition, location, available),
            );
        }

        Ok(Self {
            learner_location: environment.start_location.clone(),
            locations: environment
                .locations
                .iter()
                .map(|l| (l.id.clone(), l.clone()))
                .collect(),
            npc_definitions: environment
                .npcs
                .iter()
                .map(|n| (n.id.clone(), n.clone()))
                .collect(),
            npcs,
            schedule,
            ambient_events: environment
                .ambient_events
                .iter()
                .map(|e| (e.id.clone(), e.clone()))
                .collect(),
            active_events: Vec::new(),
            tick: 0,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn learner_location(&self) -> &LocationId {
        &self.learner_location
    }

    pub fn current_location(&self) -> Option<&Location> {
        self.locations.get(&self.learner_location)
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn npc(&self, id: &NpcId) -> Option<&NpcWorldState> {
        self.npcs.get(id)
    }

    pub fn npc_definition(&self, id: &NpcId) -> Option<&NpcDefinition> {
        self.npc_definitions.get(id)
    }

    pub fn npcs(&self) -> impl Iterator<Item = &NpcWorldState> {
        self.npcs.values()
    }

    pub fn schedule(&self) -> &TimeSchedule {
        &self.schedule
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.schedule.current
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn active_events(&self) -> &[ActiveAmbientEvent] {
        &self.active_events
    }

    pub fn ambient_event(&self, id: &AmbientEventId) -> Option<&AmbientEventDefinition> {
        self.ambient_events.get(id)
    }

    /// Active events that apply at `location` (world-wide or bound to it).
    pub fn active_events_at(&self, location: &LocationId) -> Vec<&AmbientEventDefinition> {
        self.active_events
            .iter()
            .filter_map(|active| self.ambient_events.get(&active.event_id))
            .filter(|def| def.location.as_ref().map_or(true, |l| l == location))
            .collect()
    }

    pub fn is_npc_available(&self, id: &NpcId) -> bool {
        self.npcs.get(id).is_some_and(|npc| npc.available)
    }

    pub fn is_location_accessible(&self, id: &LocationId) -> bool {
        self.locations.contains_key(id) && self.schedule.is_location_accessible(id)
    }

    /// NPCs that are both present at `location` and available this slot.
    pub fn npcs_at(&self, location: &LocationId) -> Vec<&NpcWorldState> {
        self.npcs
            .values()
            .filter(|npc| &npc.location == location && npc.available)
            .collect()
    }

    /// Resolve the current behavior vector for an NPC.
    pub fn resolve_npc_behavior(&self, id: &NpcId) -> Option<BehaviorModifiers> {
        let definition = self.npc_definitions.get(id)?;
        let state = self.npcs.get(id)?;
        Some(resolve_behavior(
            &definition.personality,
            state.mood,
            state.reputation,
            &definition.cultural_overlay,
            definition.base_patience,
        ))
    }

    /// NPCs visible at the learner's location, with resolved behavior.
    pub fn visible_npcs(&self) -> Vec<VisibleNpc> {
        self.npcs_at(&self.learner_location)
            .into_iter()
            .filter_map(|state| {
                let definition = self.npc_definitions.get(&state.npc_id)?;
                let behavior = self.resolve_npc_behavior(&state.npc_id)?;
                let band = state.reputation_band();
                Some(VisibleNpc {
                    id: state.npc_id.clone(),
                    name: definition.name.clone(),
                    role: definition.role.clone(),
                    mood: state.mood,
                    reputation: state.reputation,
                    reputation_band: band,
                    reputation_descriptor: band.descriptor().to_string(),
                    behavior,
                })
            })
            .collect()
    }

    /// Connections out of the learner's location with their accessibility.
    pub fn navigable_locations(&self) -> Vec<NavigableLocation> {
        let Some(current) = self.current_location() else {
            return Vec::new();
        };
        current
            .connections
            .iter()
            .filter_map(|id| {
                self.locations.get(id).map(|location| NavigableLocation {
                    id: id.clone(),
                    name: location.name.clone(),
                    accessible: self.schedule.is_location_accessible(id),
                })
            })
            .collect()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Move the learner. `None` unless `target` is connected to the current
    /// location and accessible this slot.
    pub fn navigate(&self, target: &LocationId) -> Option<WorldState> {
        let current = self.current_location()?;
        if !current.is_connected_to(target) || !self.is_location_accessible(target) {
            return None;
        }
        let mut next = self.clone();
        next.learner_location = target.clone();
        Some(next)
    }

    /// Advance one unit of world time.
    ///
    /// `draw` must return a value in [0, 1). It is called exactly once per
    /// ambient event that is not active after expiry, in id order.
    pub fn tick(
        &self,
        mood_decay_turns: u32,
        draw: &mut dyn FnMut() -> f64,
    ) -> (WorldState, TickReport) {
        let mut next = self.clone();
        next.tick += 1;

        let previous_slot = self.schedule.current;
        let (schedule, rolled) = self.schedule.advanced();
        next.schedule = schedule;

        // Mood decay
        let mut mood_changes = Vec::new();
        for npc in next.npcs.values_mut() {
            npc.turns_since_mood_change = npc.turns_since_mood_change.saturating_add(1);
            if should_decay_mood(npc.mood, npc.turns_since_mood_change, mood_decay_turns) {
                let from = npc.mood;
                npc.set_mood(Mood::Neutral);
                mood_changes.push(MoodChange {
                    npc_id: npc.npc_id.clone(),
                    from,
                    to: Mood::Neutral,
                });
            }
        }

        // Expire finished ambient events
        let mut ended_events = Vec::new();
        next.active_events.retain_mut(|active| match active.remaining_ticks {
            Some(remaining) if remaining <= 1 => {
                ended_events.push(active.event_id.clone());
                false
            }
            Some(ref mut remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        });

        // Fire new ambient events: one draw per inactive definition
        let slot = next.schedule.current;
        let mut triggered_events = Vec::new();
        for (id, definition) in &self.ambient_events {
            if next.active_events.iter().any(|a| &a.event_id == id) {
                continue;
            }
            let roll = draw();
            if roll < definition.probability_for(slot) {
                next.active_events.push(ActiveAmbientEvent {
                    event_id: id.clone(),
                    started_at_tick: next.tick,
                    remaining_ticks: definition.duration_ticks,
                });
                triggered_events.push(id.clone());
            }
        }

        // Relocations at slot boundaries
        let mut relocations = Vec::new();
        if let Some(slot) = rolled {
            if let Some(moves) = next.schedule.npc_locations.get(&slot).cloned() {
                for (npc_id, target) in moves {
                    if let Some(npc) = next.npcs.get_mut(&npc_id) {
                        if npc.location != target {
                            relocations.push(Relocation {
                                npc_id: npc_id.clone(),
                                from: npc.location.clone(),
                                to: target.clone(),
                            });
                            npc.location = target;
                        }
                    }
                }
            }
        }

        // Availability for the (possibly new) slot
        let mut availability_changes = Vec::new();
        for npc in next.npcs.values_mut() {
            let available = next.schedule.is_npc_available(&npc.npc_id);
            if available != npc.available {
                npc.available = available;
                availability_changes.push(AvailabilityChange {
                    npc_id: npc.npc_id.clone(),
                    available,
                });
            }
        }

        let report = TickReport {
            tick: next.tick,
            previous_slot,
            current_slot: next.schedule.current,
            mood_changes,
            triggered_events,
            ended_events,
            availability_changes,
            relocations,
        };
        (next, report)
    }

    /// Apply a finished dialogue. This is the only place a dialogue changes
    /// persistent reputation: the delta is added and the result clamped.
    /// The outcome's final mood replaces the NPC's mood, any learner turn
    /// restarts the decay counter, and targets the learner hit are removed
    /// from the NPC's pending directives.
    ///
    /// # Errors
    /// `DomainError::NotFound` if the NPC is not part of this world.
    pub fn apply_dialogue_outcome(
        &self,
        npc_id: &NpcId,
        outcome: &DialogueOutcome,
    ) -> Result<OutcomeApplication, DomainError> {
        let mut next = self.clone();
        let npc = next
            .npcs
            .get_mut(npc_id)
            .ok_or_else(|| DomainError::not_found("Npc", npc_id.as_str()))?;

        let previous = npc.reputation;
        npc.reputation = clamp_reputation(previous + outcome.reputation_delta);
        let reputation = ReputationChange {
            npc_id: npc_id.clone(),
            previous,
            current: npc.reputation,
            delta: outcome.reputation_delta,
        };

        let from = npc.mood;
        let mood = npc.set_mood(outcome.final_mood).then(|| MoodChange {
            npc_id: npc_id.clone(),
            from,
            to: outcome.final_mood,
        });
        // A conversation reinforces the mood even when it leaves it unchanged.
        if outcome.learner_turns > 0 {
            npc.turns_since_mood_change = 0;
        }

        let hit: Vec<String> = outcome
            .injection_targets_hit
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        npc.pending_injections
            .retain(|pending| !hit.contains(&pending.to_lowercase()));

        Ok(OutcomeApplication {
            world: next,
            reputation,
            mood,
        })
    }

    /// Queue forms a future dialogue with `npc_id` should elicit.
    /// Duplicates (case-insensitive) and blank targets are ignored.
    pub fn with_injection_directives(
        &self,
        npc_id: &NpcId,
        targets: &[String],
    ) -> Option<WorldState> {
        let mut next = self.clone();
        let npc = next.npcs.get_mut(npc_id)?;
        for target in targets {
            let trimmed = target.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            if !npc
                .pending_injections
                .iter()
                .any(|p| p.to_lowercase() == lowered)
            {
                npc.pending_injections.push(trimmed.to_string());
            }
        }
        Some(next)
    }
}
