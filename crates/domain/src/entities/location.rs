//! Location entity - a place the learner can stand in
//!
//! Locations form an undirected-by-convention graph through `connections`.
//! Each location lists the NPCs that start there (its roster) and the
//! interactables a renderer may show.

use serde::{Deserialize, Serialize};

use crate::ids::{LocationId, NpcId};

/// The type of location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationType {
    /// Indoor location (cafe, station hall, etc.)
    Interior,
    /// Outdoor location (market square, street, etc.)
    #[default]
    Exterior,
    /// Unknown type for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Something in a location the learner can look at or use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location_type: LocationType,
    /// Locations directly reachable from here
    #[serde(default)]
    pub connections: Vec<LocationId>,
    /// NPCs that start the session here
    #[serde(default)]
    pub npcs: Vec<NpcId>,
    #[serde(default)]
    pub interactables: Vec<Interactable>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            location_type: LocationType::default(),
            connections: Vec::new(),
            npcs: Vec::new(),
            interactables: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_connection(mut self, target: impl Into<LocationId>) -> Self {
        self.connections.push(target.into());
        self
    }

    pub fn with_npc(mut self, npc: impl Into<NpcId>) -> Self {
        self.npcs.push(npc.into());
        self
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactables.push(interactable);
        self
    }

    pub fn is_connected_to(&self, target: &LocationId) -> bool {
        self.connections.contains(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_connections_and_roster() {
        let loc = Location::new("plaza", "Plaza")
            .with_connection("cafe")
            .with_npc("vendor");
        assert!(loc.is_connected_to(&LocationId::new("cafe")));
        assert!(!loc.is_connected_to(&LocationId::new("station")));
        assert_eq!(loc.npcs, vec![NpcId::new("vendor")]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let loc: Location =
            serde_json::from_str(r#"{"id":"plaza","name":"Plaza"}"#).expect("valid location");
        assert!(loc.connections.is_empty());
        assert_eq!(loc.location_type, LocationType::Exterior);
    }
}
