//! Parlance session engine.
//!
//! Runs one learner's session over a [`parlance_domain::WorldState`]:
//! navigation, time, NPC dialogue, reputation, and the observer surfaces
//! (hooks and events) other modules build on.
//!
//! ## Structure
//!
//! - `session/` - the session value, its orchestrator and read-only views
//! - `hooks/` - observer registry and isolated dispatch
//! - `events/` - event envelope and the in-process bus
//! - `infrastructure/` - clock/random ports and implementations, settings, telemetry

pub mod events;
pub mod hooks;
pub mod infrastructure;
pub mod session;

pub use events::{EventEmitter, EventEnvelope, InProcessEventBus, SessionEventType};
pub use hooks::{HookError, HookPoint, HookRegistry, SessionHook};
pub use infrastructure::settings::SessionSettings;
pub use session::{Session, SessionOrchestrator, SessionSnapshot, SessionStatus};
