//! Environment description - the validated input a session is built from
//!
//! Produced by an external loader. `validate` enforces the structural
//! invariants a world needs; any violation aborts world construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{AmbientEventDefinition, Location, NpcDefinition, TimeSchedule};
use crate::error::DomainError;
use crate::ids::{LocationId, NpcId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDescription {
    pub start_location: LocationId,
    pub locations: Vec<Location>,
    #[serde(default)]
    pub npcs: Vec<NpcDefinition>,
    #[serde(default)]
    pub ambient_events: Vec<AmbientEventDefinition>,
    #[serde(default)]
    pub schedule: TimeSchedule,
}

impl EnvironmentDescription {
    pub fn new(start_location: impl Into<LocationId>) -> Self {
        Self {
            start_location: start_location.into(),
            locations: Vec::new(),
            npcs: Vec::new(),
            ambient_events: Vec::new(),
            schedule: TimeSchedule::default(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_npc(mut self, npc: NpcDefinition) -> Self {
        self.npcs.push(npc);
        self
    }

    pub fn with_ambient_event(mut self, event: AmbientEventDefinition) -> Self {
        self.ambient_events.push(event);
        self
    }

    pub fn with_schedule(mut self, schedule: TimeSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    /// `DomainError::InvalidEnvironment` naming the first violation found.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut location_ids = BTreeSet::new();
        for location in &self.locations {
            if !location_ids.insert(&location.id) {
                return Err(DomainError::invalid_environment(format!(
                    "duplicate location '{}'",
                    location.id
                )));
            }
        }

        if !location_ids.contains(&self.start_location) {
            return Err(DomainError::invalid_environment(format!(
                "start location '{}' is not defined",
                self.start_location
            )));
        }

        for location in &self.locations {
            if let Some(dangling) = location
                .connections
                .iter()
                .find(|target| !location_ids.contains(target))
            {
                return Err(DomainError::invalid_environment(format!(
                    "location '{}' connects to unknown location '{}'",
                    location.id, dangling
                )));
            }
        }

        let mut npc_ids = BTreeSet::new();
        for npc in &self.npcs {
            if !npc_ids.insert(&npc.id) {
                return Err(DomainError::invalid_environment(format!(
                    "duplicate npc '{}'",
                    npc.id
                )));
            }
        }

        let homes = self.npc_homes()?;
        for npc in &self.npcs {
            if !homes.contains_key(&npc.id) {
                return Err(DomainError::invalid_environment(format!(
                    "npc '{}' is not placed in any location",
                    npc.id
                )));
            }
        }

        if let Some(unknown) = self.schedule.referenced_npcs().find(|id| !npc_ids.contains(id)) {
            return Err(DomainError::invalid_environment(format!(
                "schedule references unknown npc '{}'",
                unknown
            )));
        }
        if let Some(unknown) = self
            .schedule
            .referenced_locations()
            .find(|id| !location_ids.contains(id))
        {
            return Err(DomainError::invalid_environment(format!(
                "schedule references unknown location '{}'",
                unknown
            )));
        }

        let mut event_ids = BTreeSet::new();
        for event in &self.ambient_events {
            if !event_ids.insert(&event.id) {
                return Err(DomainError::invalid_environment(format!(
                    "duplicate ambient event '{}'",
                    event.id
                )));
            }
            if let Some((slot, p)) = event
                .probability
                .iter()
                .find(|(_, p)| !(0.0..=1.0).contains(*p))
            {
                return Err(DomainError::invalid_environment(format!(
                    "ambient event '{}' has probability {} for {}, expected [0, 1]",
                    event.id, p, slot
                )));
            }
            if let Some(location) = &event.location {
                if !location_ids.contains(location) {
                    return Err(DomainError::invalid_environment(format!(
                        "ambient event '{}' is bound to unknown location '{}'",
                        event.id, location
                    )));
                }
            }
        }

        Ok(())
    }

    /// Map each rostered NPC to the location that lists it.
    ///
    /// # Errors
    /// Fails when a roster names an undefined NPC or one NPC appears in two
    /// rosters.
    pub fn npc_homes(&self) -> Result<BTreeMap<NpcId, LocationId>, DomainError> {
        let defined: BTreeSet<&NpcId> = self.npcs.iter().map(|npc| &npc.id).collect();
        let mut homes = BTreeMap::new();
        for location in &self.locations {
            for npc in &location.npcs {
                if !defined.contains(npc) {
                    return Err(DomainError::invalid_environment(format!(
                        "location '{}' lists undefined npc '{}'",
                        location.id, npc
                    )));
                }
                if let Some(previous) = homes.insert(npc.clone(), location.id.clone()) {
                    return Err(DomainError::invalid_environment(format!(
                        "npc '{}' is listed in both '{}' and '{}'",
                        npc, previous, location.id
                    )));
                }
            }
        }
        Ok(homes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_of_day::TimeOfDay;

    fn two_rooms() -> EnvironmentDescription {
        EnvironmentDescription::new("a")
            .with_location(Location::new("a", "A").with_connection("b").with_npc("clerk"))
            .with_location(Location::new("b", "B").with_connection("a"))
            .with_npc(NpcDefinition::new("clerk", "Clerk"))
    }

    #[test]
    fn valid_environment_passes() {
        assert_eq!(two_rooms().validate(), Ok(()));
    }

    #[test]
    fn dangling_connection_is_rejected() {
        let env = two_rooms().with_location(Location::new("c", "C").with_connection("nowhere"));
        let err = env.validate().expect_err("dangling connection");
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn unknown_start_location_is_rejected() {
        let mut env = two_rooms();
        env.start_location = LocationId::new("z");
        assert!(matches!(
            env.validate(),
            Err(DomainError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn npc_missing_from_every_roster_is_rejected() {
        let env = two_rooms().with_npc(NpcDefinition::new("ghost", "Ghost"));
        let err = env.validate().expect_err("unplaced npc");
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn roster_entry_without_definition_is_rejected() {
        let env = EnvironmentDescription::new("a")
            .with_location(Location::new("a", "A").with_npc("phantom"));
        assert!(env.validate().is_err());
    }

    #[test]
    fn npc_in_two_rosters_is_rejected() {
        let mut env = two_rooms();
        env.locations[1].npcs.push(NpcId::new("clerk"));
        let err = env.validate().expect_err("double placement");
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn schedule_must_reference_known_ids() {
        let env = two_rooms().with_schedule(
            TimeSchedule::enabled_at(TimeOfDay::Morning).with_npc_availability(
                TimeOfDay::Morning,
                "stranger",
                true,
            ),
        );
        assert!(env.validate().is_err());
    }

    #[test]
    fn ambient_probability_must_be_a_probability() {
        let env = two_rooms().with_ambient_event(
            AmbientEventDefinition::new("storm", "Storm").with_probability(TimeOfDay::Night, 1.5),
        );
        let err = env.validate().expect_err("bad probability");
        assert!(err.to_string().contains("storm"));
    }
}
