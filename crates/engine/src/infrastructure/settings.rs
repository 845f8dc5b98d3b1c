//! Session settings.
//!
//! Every field has a default, so an empty JSON object or an empty environment
//! yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_MOOD_DECAY_TURNS: &str = "PARLANCE_MOOD_DECAY_TURNS";
pub const ENV_HOOK_TIMEOUT_MS: &str = "PARLANCE_HOOK_TIMEOUT_MS";
pub const ENV_EVENT_SOURCE: &str = "PARLANCE_EVENT_SOURCE";

fn default_mood_decay_turns() -> u32 {
    5
}

fn default_hook_timeout_ms() -> u64 {
    5_000
}

fn default_event_source() -> String {
    "session-orchestrator".to_string()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Ticks a non-neutral mood survives without reinforcement
    #[serde(default = "default_mood_decay_turns")]
    pub mood_decay_turns: u32,
    /// Upper bound on a single hook callback
    #[serde(default = "default_hook_timeout_ms")]
    pub hook_timeout_ms: u64,
    /// `source` field of every emitted envelope
    #[serde(default = "default_event_source")]
    pub event_source: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mood_decay_turns: default_mood_decay_turns(),
            hook_timeout_ms: default_hook_timeout_ms(),
            event_source: default_event_source(),
        }
    }
}

impl SessionSettings {
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_millis(self.hook_timeout_ms)
    }

    pub fn with_mood_decay_turns(mut self, turns: u32) -> Self {
        self.mood_decay_turns = turns;
        self
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_MOOD_DECAY_TURNS) {
            settings.mood_decay_turns = parse_positive(ENV_MOOD_DECAY_TURNS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HOOK_TIMEOUT_MS) {
            settings.hook_timeout_ms = parse_positive(ENV_HOOK_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EVENT_SOURCE) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(SettingsError::Invalid {
                    key: ENV_EVENT_SOURCE,
                    value: raw,
                    expected: "a non-empty module id",
                });
            }
            settings.event_source = trimmed.to_string();
        }

        Ok(settings)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(SettingsError::Invalid {
            key,
            value: raw.to_string(),
            expected: "a positive integer",
        }),
    }
}
