//! Unified error types for the domain layer
//!
//! Guard failures (navigating while in dialogue, talking to an absent NPC) are
//! not errors: they are reported by the engine as `None`. `DomainError` covers
//! the two remaining classes - a malformed environment description, which is
//! fatal before any session exists, and illegal dialogue state transitions.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The environment description violates a structural invariant
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// A textual value does not name any variant of `kind`
    #[error("Cannot parse {kind} from '{value}'")]
    Parse { kind: &'static str, value: String },
}

impl DomainError {
    /// Creates an environment invariant error.
    ///
    /// # Example
    /// ```ignore
    /// if !locations.contains_key(&target) {
    ///     return Err(DomainError::invalid_environment("dangling connection"));
    /// }
    /// ```
    pub fn invalid_environment(msg: impl Into<String>) -> Self {
        Self::InvalidEnvironment(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create a parse error
    pub fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            value: value.into(),
        }
    }
}
