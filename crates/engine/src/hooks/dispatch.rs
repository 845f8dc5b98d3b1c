//! Isolated hook dispatch
//!
//! All subscribed modules run concurrently and are all awaited before the
//! orchestrator returns. An `Err`, a panic, or a timeout in one module is
//! logged and recorded in the [`DispatchReport`]; the others still run and the
//! committed session is untouched.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::FutureExt;
use parlance_domain::{DialogueOutcome, DialogueSession, DialogueTurn, LocationId, TickReport};

use super::registry::{HookRegistry, SessionHook};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    SessionStart,
    SessionEnd,
    DialogueStart,
    DialogueEnd,
    TurnComplete,
    Tick,
    LocationEnter,
    LocationExit,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::SessionStart => "on_session_start",
            HookPoint::SessionEnd => "on_session_end",
            HookPoint::DialogueStart => "on_dialogue_start",
            HookPoint::DialogueEnd => "on_dialogue_end",
            HookPoint::TurnComplete => "on_turn_complete",
            HookPoint::Tick => "on_tick",
            HookPoint::LocationEnter => "on_location_enter",
            HookPoint::LocationExit => "on_location_exit",
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("hook failed: {0}")]
    Failed(String),
    #[error("hook panicked: {0}")]
    Panicked(String),
    #[error("hook timed out after {0:?}")]
    TimedOut(Duration),
}

impl HookError {
    pub fn failed(message: impl ToString) -> Self {
        Self::Failed(message.to_string())
    }
}

/// A lifecycle point together with the data its callback receives.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    SessionStart(&'a Session),
    SessionEnd(&'a Session),
    DialogueStart(&'a Session, &'a DialogueSession),
    DialogueEnd(&'a Session, &'a DialogueOutcome),
    TurnComplete(&'a Session, &'a DialogueTurn),
    Tick(&'a Session, &'a TickReport),
    LocationEnter(&'a Session, &'a LocationId),
    LocationExit(&'a Session, &'a LocationId),
}

impl HookEvent<'_> {
    pub fn point(&self) -> HookPoint {
        match self {
            HookEvent::SessionStart(_) => HookPoint::SessionStart,
            HookEvent::SessionEnd(_) => HookPoint::SessionEnd,
            HookEvent::DialogueStart(..) => HookPoint::DialogueStart,
            HookEvent::DialogueEnd(..) => HookPoint::DialogueEnd,
            HookEvent::TurnComplete(..) => HookPoint::TurnComplete,
            HookEvent::Tick(..) => HookPoint::Tick,
            HookEvent::LocationEnter(..) => HookPoint::LocationEnter,
            HookEvent::LocationExit(..) => HookPoint::LocationExit,
        }
    }

    fn session(&self) -> &Session {
        match *self {
            HookEvent::SessionStart(s)
            | HookEvent::SessionEnd(s)
            | HookEvent::DialogueStart(s, _)
            | HookEvent::DialogueEnd(s, _)
            | HookEvent::TurnComplete(s, _)
            | HookEvent::Tick(s, _)
            | HookEvent::LocationEnter(s, _)
            | HookEvent::LocationExit(s, _) => s,
        }
    }

    async fn deliver(&self, hook: &dyn SessionHook) -> Result<(), HookError> {
        match *self {
            HookEvent::SessionStart(s) => hook.on_session_start(s).await,
            HookEvent::SessionEnd(s) => hook.on_session_end(s).await,
            HookEvent::DialogueStart(s, d) => hook.on_dialogue_start(s, d).await,
            HookEvent::DialogueEnd(s, o) => hook.on_dialogue_end(s, o).await,
            HookEvent::TurnComplete(s, t) => hook.on_turn_complete(s, t).await,
            HookEvent::Tick(s, r) => hook.on_tick(s, r).await,
            HookEvent::LocationEnter(s, l) => hook.on_location_enter(s, l).await,
            HookEvent::LocationExit(s, l) => hook.on_location_exit(s, l).await,
        }
    }
}

/// What happened during one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub point: HookPoint,
    pub invoked: usize,
    /// (module id, error) for each module that did not complete cleanly
    pub failures: Vec<(String, HookError)>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `event` against every subscribed module in `registry`.
pub async fn dispatch(
    registry: &HookRegistry,
    event: HookEvent<'_>,
    timeout: Duration,
) -> DispatchReport {
    let point = event.point();
    let hooks: Vec<_> = registry
        .get_all()
        .into_iter()
        .filter(|hook| hook.subscribes_to(point))
        .collect();

    let calls = hooks.iter().map(|hook| {
        let event = &event;
        async move {
            let call = AssertUnwindSafe(event.deliver(hook.as_ref())).catch_unwind();
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(Ok(result)) => result,
                Ok(Err(payload)) => Err(HookError::Panicked(panic_message(payload))),
                Err(_) => Err(HookError::TimedOut(timeout)),
            };
            (hook.module_id().to_string(), result)
        }
    });

    let mut failures = Vec::new();
    for (module_id, result) in join_all(calls).await {
        if let Err(error) = result {
            tracing::warn!(
                session_id = %event.session().id(),
                module_id = %module_id,
                hook = %point,
                error = %error,
                "Hook callback failed"
            );
            failures.push((module_id, error));
        }
    }

    DispatchReport {
        point,
        invoked: hooks.len(),
        failures,
    }
}
