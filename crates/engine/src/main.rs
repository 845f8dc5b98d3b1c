//! Parlance Engine - headless session runner.
//!
//! Loads an environment description, runs a short scripted session against
//! it, and logs every event and the final snapshot. Useful for checking an
//! authored environment before it reaches a renderer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use parlance_domain::{EnvironmentDescription, LearnerId, TickReport};
use parlance_engine::events::{EventEnvelope, FnSubscriber, InProcessEventBus};
use parlance_engine::hooks::{HookError, HookRegistry, SessionHook};
use parlance_engine::infrastructure::clock::{SeededRandom, SystemClock, SystemRandom};
use parlance_engine::infrastructure::ports::RandomSource;
use parlance_engine::infrastructure::telemetry::init_tracing;
use parlance_engine::{Session, SessionOrchestrator, SessionSettings};

const ENV_ENVIRONMENT: &str = "PARLANCE_ENVIRONMENT";
const ENV_TICKS: &str = "PARLANCE_TICKS";
const ENV_SEED: &str = "PARLANCE_SEED";
const DEFAULT_ENVIRONMENT: &str = "demos/market.json";
const DEFAULT_TICKS: u32 = 3;

/// Logs tick summaries; stands in for a real pedagogy module.
struct TraceHook;

#[async_trait]
impl SessionHook for TraceHook {
    fn module_id(&self) -> &str {
        "trace"
    }

    async fn on_tick(&self, session: &Session, report: &TickReport) -> Result<(), HookError> {
        tracing::info!(
            session_id = %session.id(),
            tick = report.tick,
            slot = %report.current_slot,
            triggered = report.triggered_events.len(),
            "Tick observed"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();
    init_tracing("parlance_engine=debug,parlance_domain=debug")?;

    tracing::info!("Starting Parlance headless runner");

    let environment_path = PathBuf::from(
        std::env::var(ENV_ENVIRONMENT).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.into()),
    );
    let ticks: u32 = match std::env::var(ENV_TICKS) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{ENV_TICKS} must be a non-negative integer, got '{raw}'"))?,
        Err(_) => DEFAULT_TICKS,
    };
    let random: Arc<dyn RandomSource> = match std::env::var(ENV_SEED) {
        Ok(raw) => {
            let seed: u64 = raw
                .parse()
                .with_context(|| format!("{ENV_SEED} must be a u64, got '{raw}'"))?;
            tracing::info!(seed, "Using seeded random source");
            Arc::new(SeededRandom::new(seed))
        }
        Err(_) => Arc::new(SystemRandom::new()),
    };
    let settings = SessionSettings::from_env()?;
    tracing::info!(
        mood_decay_turns = settings.mood_decay_turns,
        hook_timeout_ms = settings.hook_timeout_ms,
        "Session settings loaded"
    );

    let raw = std::fs::read_to_string(&environment_path)
        .with_context(|| format!("reading {}", environment_path.display()))?;
    let environment: EnvironmentDescription = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", environment_path.display()))?;

    let bus = Arc::new(InProcessEventBus::new());
    bus.subscribe_fn(|envelope: &EventEnvelope| {
        tracing::debug!(
            event_type = %envelope.event_type,
            correlation_id = %envelope.correlation_id.short(),
            payload = %envelope.payload,
            "Session event"
        );
        Ok(())
    });

    let hooks = Arc::new(HookRegistry::new());
    hooks.register(Arc::new(TraceHook));

    let orchestrator = SessionOrchestrator::new(
        hooks,
        bus,
        Arc::new(SystemClock::new()),
        random,
        settings,
    );

    let mut session = orchestrator
        .start_session(&environment, LearnerId::new())
        .await?;

    for _ in 0..ticks {
        if let Some(next) = orchestrator.tick(&session).await {
            session = next;
        }
    }

    if let Some(npc) = session.visible_npcs().into_iter().next() {
        if let Some(context) = session.prompt_context(&npc.id) {
            tracing::info!(npc_id = %npc.id, keys = context.len(), "Prompt context built");
        }
        if let Some(talking) = orchestrator
            .start_npc_dialogue(&session, &npc.id, Some("greet".into()), Vec::new())
            .await
        {
            session = talking;
            for line in ["Guten Tag!", "Ich hätte gern ein Brot, bitte."] {
                if let Some((next, assessment)) = orchestrator
                    .record_learner_turn(&session, line, Vec::new(), None)
                    .await
                {
                    tracing::info!(
                        delta = assessment.reputation_delta,
                        mood = %assessment.mood_after,
                        "Learner turn assessed"
                    );
                    session = next;
                }
            }
            if let Some((next, outcome)) = orchestrator.finish_dialogue(&session, true).await {
                tracing::info!(
                    npc_id = %outcome.npc_id,
                    delta = outcome.reputation_delta,
                    turns = outcome.total_turns,
                    "Dialogue outcome"
                );
                session = next;
            }
        }
    } else {
        tracing::info!(location = %session.learner_location(), "Nobody to talk to here");
    }

    if let Some(ended) = orchestrator.end_session(&session).await {
        session = ended;
    }

    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    tracing::info!("Final snapshot:\n{snapshot}");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
