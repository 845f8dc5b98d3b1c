//! Authored entities: the static description of a world.

mod ambient_event;
mod environment;
mod location;
mod npc;
mod schedule;

pub use ambient_event::{ActiveAmbientEvent, AmbientEventDefinition};
pub use environment::EnvironmentDescription;
pub use location::{Interactable, Location, LocationType};
pub use npc::NpcDefinition;
pub use schedule::TimeSchedule;
