//! Aggregates - the runtime state of a session
//!
//! Both aggregates expose behavior through methods that take `&self` and
//! return a new value; an earlier snapshot is never invalidated.

pub mod dialogue;
pub mod prompt_context;
pub mod world_state;

pub use dialogue::{
    dominant_trigger, turn_reputation_delta, DialogueOutcome, DialoguePhase, DialogueSession,
    DialogueTurn, Speaker, TurnAssessment,
};
pub use prompt_context::PromptContext;
pub use world_state::{
    AvailabilityChange, MoodChange, NavigableLocation, NpcWorldState, OutcomeApplication,
    Relocation, ReputationChange, TickReport, VisibleNpc, WorldState,
};
