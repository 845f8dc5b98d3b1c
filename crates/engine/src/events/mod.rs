//! Session events: the envelope wire shape and the in-process bus.

pub mod bus;
pub mod envelope;

pub use bus::{
    EmitError, EventEmitter, EventSubscriber, FnSubscriber, InProcessEventBus, PublishSummary,
    SubscriptionHandle,
};
pub use envelope::{EventEnvelope, SessionEventType, SCHEMA_VERSION};

#[cfg(test)]
pub use bus::MockEventEmitter;
