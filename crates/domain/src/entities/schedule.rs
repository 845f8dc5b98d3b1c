//! Time-of-day schedule
//!
//! When the schedule is enabled, each slot may carry an availability map for
//! NPCs, an accessibility map for locations, and relocations that move NPCs
//! when the slot begins.
//!
//! - NPC availability: if a slot has an availability map, only NPCs marked
//!   `true` in it are available. A slot without a map restricts nobody.
//! - Location access: locations are accessible unless the slot marks them
//!   `false`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{LocationId, NpcId};
use crate::time_of_day::TimeOfDay;

fn default_ticks_per_slot() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSchedule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub current: TimeOfDay,
    /// World ticks spent in each slot before rolling to the next
    #[serde(default = "default_ticks_per_slot")]
    pub ticks_per_slot: u32,
    /// Ticks already spent in `current`
    #[serde(default)]
    pub ticks_into_slot: u32,
    #[serde(default)]
    pub npc_availability: BTreeMap<TimeOfDay, BTreeMap<NpcId, bool>>,
    #[serde(default)]
    pub location_access: BTreeMap<TimeOfDay, BTreeMap<LocationId, bool>>,
    #[serde(default)]
    pub npc_locations: BTreeMap<TimeOfDay, BTreeMap<NpcId, LocationId>>,
}

impl Default for TimeSchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            current: TimeOfDay::default(),
            ticks_per_slot: default_ticks_per_slot(),
            ticks_into_slot: 0,
            npc_availability: BTreeMap::new(),
            location_access: BTreeMap::new(),
            npc_locations: BTreeMap::new(),
        }
    }
}

impl TimeSchedule {
    pub fn enabled_at(current: TimeOfDay) -> Self {
        Self {
            enabled: true,
            current,
            ..Self::default()
        }
    }

    pub fn with_npc_availability(
        mut self,
        slot: TimeOfDay,
        npc: impl Into<NpcId>,
        available: bool,
    ) -> Self {
        self.npc_availability
            .entry(slot)
            .or_default()
            .insert(npc.into(), available);
        self
    }

    pub fn with_location_access(
        mut self,
        slot: TimeOfDay,
        location: impl Into<LocationId>,
        accessible: bool,
    ) -> Self {
        self.location_access
            .entry(slot)
            .or_default()
            .insert(location.into(), accessible);
        self
    }

    pub fn with_npc_location(
        mut self,
        slot: TimeOfDay,
        npc: impl Into<NpcId>,
        location: impl Into<LocationId>,
    ) -> Self {
        self.npc_locations
            .entry(slot)
            .or_default()
            .insert(npc.into(), location.into());
        self
    }

    pub fn is_npc_available(&self, npc: &NpcId) -> bool {
        if !self.enabled {
            return true;
        }
        match self.npc_availability.get(&self.current) {
            Some(slot) => slot.get(npc).copied().unwrap_or(false),
            None => true,
        }
    }

    pub fn is_location_accessible(&self, location: &LocationId) -> bool {
        if !self.enabled {
            return true;
        }
        self.location_access
            .get(&self.current)
            .and_then(|slot| slot.get(location).copied())
            .unwrap_or(true)
    }

    /// Advance one tick. Returns the new slot when it rolled over.
    pub fn advanced(&self) -> (Self, Option<TimeOfDay>) {
        let mut next = self.clone();
        if !self.enabled {
            return (next, None);
        }
        next.ticks_into_slot += 1;
        if next.ticks_into_slot >= next.ticks_per_slot.max(1) {
            next.ticks_into_slot = 0;
            next.current = next.current.next();
            let slot = next.current;
            return (next, Some(slot));
        }
        (next, None)
    }

    /// Every NPC id the schedule mentions, for validation.
    pub fn referenced_npcs(&self) -> impl Iterator<Item = &NpcId> {
        self.npc_availability
            .values()
            .flat_map(|slot| slot.keys())
            .chain(self.npc_locations.values().flat_map(|slot| slot.keys()))
    }

    /// Every location id the schedule mentions, for validation.
    pub fn referenced_locations(&self) -> impl Iterator<Item = &LocationId> {
        self.location_access
            .values()
            .flat_map(|slot| slot.keys())
            .chain(self.npc_locations.values().flat_map(|slot| slot.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_schedule_restricts_nothing_and_never_advances() {
        let schedule = TimeSchedule::default().with_npc_availability(
            TimeOfDay::Morning,
            "baker",
            false,
        );
        assert!(schedule.is_npc_available(&NpcId::new("baker")));
        let (next, rolled) = schedule.advanced();
        assert_eq!(rolled, None);
        assert_eq!(next.current, TimeOfDay::Morning);
    }

    #[test]
    fn slot_with_map_only_admits_listed_npcs() {
        let schedule = TimeSchedule::enabled_at(TimeOfDay::Morning)
            .with_npc_availability(TimeOfDay::Morning, "baker", true);
        assert!(schedule.is_npc_available(&NpcId::new("baker")));
        assert!(!schedule.is_npc_available(&NpcId::new("guard")));
    }

    #[test]
    fn slot_without_map_admits_everyone() {
        let schedule = TimeSchedule::enabled_at(TimeOfDay::Night)
            .with_npc_availability(TimeOfDay::Morning, "baker", true);
        assert!(schedule.is_npc_available(&NpcId::new("guard")));
    }

    #[test]
    fn rolls_over_after_ticks_per_slot() {
        let mut schedule = TimeSchedule::enabled_at(TimeOfDay::Evening);
        schedule.ticks_per_slot = 2;
        let (schedule, rolled) = schedule.advanced();
        assert_eq!(rolled, None);
        let (schedule, rolled) = schedule.advanced();
        assert_eq!(rolled, Some(TimeOfDay::Night));
        assert_eq!(schedule.ticks_into_slot, 0);
    }

    #[test]
    fn locations_default_to_accessible() {
        let schedule = TimeSchedule::enabled_at(TimeOfDay::Night)
            .with_location_access(TimeOfDay::Night, "market", false);
        assert!(!schedule.is_location_accessible(&LocationId::new("market")));
        assert!(schedule.is_location_accessible(&LocationId::new("cafe")));
    }
}
