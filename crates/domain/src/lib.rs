//! Parlance domain layer
//!
//! Pure data types and pure transitions for the conversation runtime. No I/O,
//! no async, and no randomness source: callers inject random draws as a
//! closure (see [`WorldState::tick`]).

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod time_of_day;
pub mod types;
pub mod value_objects;

pub use aggregates::{
    AvailabilityChange, DialogueOutcome, DialoguePhase, DialogueSession, DialogueTurn, MoodChange,
    NavigableLocation, NpcWorldState, OutcomeApplication, PromptContext, Relocation,
    ReputationChange, Speaker, TickReport, TurnAssessment, VisibleNpc, WorldState,
};
pub use entities::{
    ActiveAmbientEvent, AmbientEventDefinition, EnvironmentDescription, Interactable, Location,
    LocationType, NpcDefinition, TimeSchedule,
};
pub use error::DomainError;
pub use ids::{AmbientEventId, DialogueId, FrictionEventId, LearnerId, LocationId, NpcId, SessionId};
pub use time_of_day::TimeOfDay;
pub use types::{
    clamp_reputation, FrictionEvent, FrictionType, Mood, MoodTriggerEvent, Register,
    RegisterAnalysis, ReputationBand, REPUTATION_MAX, REPUTATION_MIN,
};
pub use value_objects::{
    resolve_behavior, should_decay_mood, transition_mood, BehaviorModifiers, CulturalOverlay,
    PersonalityTraits,
};
