//! In-process event bus with isolated fan-out.
//!
//! Every subscriber receives every published envelope. A subscriber that
//! errors or panics is logged and skipped; delivery to the rest continues and
//! the publisher never sees the failure.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::future::join_all;
use futures_util::FutureExt;

use super::envelope::EventEnvelope;

/// Errors that can occur when emitting or handling events
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Transport-level error (e.g. a downstream sink rejected the event)
    #[error("event transport error: {0}")]
    Transport(String),
    /// A subscriber rejected the event
    #[error("subscriber {handle} failed: {message}")]
    Subscriber {
        handle: SubscriptionHandle,
        message: String,
    },
}

/// Port for publishing session events.
///
/// Best-effort: failures are logged by the caller and never break the
/// operation that produced the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, envelope: EventEnvelope) -> Result<(), EmitError>;
}

/// A consumer of published envelopes.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EmitError>;
}

/// Adapter so plain closures can subscribe.
pub struct FnSubscriber<F>(pub F);

#[async_trait]
impl<F> EventSubscriber for FnSubscriber<F>
where
    F: Fn(&EventEnvelope) -> Result<(), EmitError> + Send + Sync,
{
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EmitError> {
        (self.0)(envelope)
    }
}

/// Revocation token returned by [`InProcessEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl std::fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Outcome of one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct InProcessEventBus {
    subscribers: DashMap<SubscriptionHandle, Arc<dyn EventSubscriber>>,
    next_handle: AtomicU64,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.subscribers.insert(handle, subscriber);
        tracing::debug!(handle = %handle, "Event subscriber added");
        handle
    }

    pub fn subscribe_fn<F>(&self, f: F) -> SubscriptionHandle
    where
        F: Fn(&EventEnvelope) -> Result<(), EmitError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnSubscriber(f)))
    }

    /// Revoke a subscription. `false` if the handle was not live.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let removed = self.subscribers.remove(&handle).is_some();
        if removed {
            tracing::debug!(handle = %handle, "Event subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `envelope` to every live subscriber concurrently.
    pub async fn publish(&self, envelope: &EventEnvelope) -> PublishSummary {
        // Snapshot first so no map guard is held across an await.
        let targets: Vec<(SubscriptionHandle, Arc<dyn EventSubscriber>)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let deliveries = targets.into_iter().map(|(handle, subscriber)| async move {
            let result = AssertUnwindSafe(subscriber.handle(envelope))
                .catch_unwind()
                .await;
            (handle, result)
        });

        let mut summary = PublishSummary::default();
        for (handle, result) in join_all(deliveries).await {
            match result {
                Ok(Ok(())) => summary.delivered += 1,
                Ok(Err(e)) => {
                    summary.failed += 1;
                    tracing::warn!(
                        handle = %handle,
                        event_type = %envelope.event_type,
                        error = %e,
                        "Event subscriber failed"
                    );
                }
                Err(_) => {
                    summary.failed += 1;
                    tracing::warn!(
                        handle = %handle,
                        event_type = %envelope.event_type,
                        "Event subscriber panicked"
                    );
                }
            }
        }
        summary
    }
}

#[async_trait]
impl EventEmitter for InProcessEventBus {
    async fn emit(&self, envelope: EventEnvelope) -> Result<(), EmitError> {
        self.publish(&envelope).await;
        Ok(())
    }
}
