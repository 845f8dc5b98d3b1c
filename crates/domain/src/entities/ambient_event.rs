//! Ambient events - background happenings that fire stochastically on tick

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AmbientEventId, LocationId};
use crate::time_of_day::TimeOfDay;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientEventDefinition {
    pub id: AmbientEventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Firing probability per tick in each slot; missing slots never fire
    #[serde(default)]
    pub probability: BTreeMap<TimeOfDay, f64>,
    /// Ticks the event stays active; `None` keeps it active for the session
    #[serde(default)]
    pub duration_ticks: Option<u32>,
    /// Restricts the event to one location; `None` means world-wide
    #[serde(default)]
    pub location: Option<LocationId>,
}

impl AmbientEventDefinition {
    pub fn new(id: impl Into<AmbientEventId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            probability: BTreeMap::new(),
            duration_ticks: None,
            location: None,
        }
    }

    pub fn with_probability(mut self, slot: TimeOfDay, probability: f64) -> Self {
        self.probability.insert(slot, probability);
        self
    }

    pub fn with_duration(mut self, ticks: u32) -> Self {
        self.duration_ticks = Some(ticks);
        self
    }

    pub fn probability_for(&self, slot: TimeOfDay) -> f64 {
        self.probability.get(&slot).copied().unwrap_or(0.0)
    }
}

/// An ambient event currently in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAmbientEvent {
    pub event_id: AmbientEventId,
    pub started_at_tick: u64,
    pub remaining_ticks: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_slots_have_zero_probability() {
        let rain = AmbientEventDefinition::new("rain", "Rain shower")
            .with_probability(TimeOfDay::Afternoon, 0.25);
        assert_eq!(rain.probability_for(TimeOfDay::Afternoon), 0.25);
        assert_eq!(rain.probability_for(TimeOfDay::Night), 0.0);
    }

    #[test]
    fn probability_map_uses_slot_names_as_keys() {
        let json = r#"{"id":"bell","name":"Church bell","probability":{"morning":0.5}}"#;
        let def: AmbientEventDefinition = serde_json::from_str(json).expect("valid event");
        assert_eq!(def.probability_for(TimeOfDay::Morning), 0.5);
    }
}
