//! Hook registry - observer modules keyed by stable id
//!
//! Modules (pedagogy, culture, retention, persistence...) implement
//! [`SessionHook`] and override only the callbacks they care about. The
//! registry holds one live entry per module id; registering the same id again
//! replaces the earlier module.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parlance_domain::{DialogueOutcome, DialogueSession, DialogueTurn, LocationId, TickReport};

use super::dispatch::{HookError, HookPoint};
use crate::session::Session;

/// An observer of session lifecycle points.
///
/// Every callback defaults to a no-op. Callbacks see committed state only and
/// cannot change it; an `Err` is logged by the dispatcher and goes no further.
#[async_trait]
pub trait SessionHook: Send + Sync {
    /// Stable id; the registry key.
    fn module_id(&self) -> &str;

    /// Whether the dispatcher should call this module at `point`.
    fn subscribes_to(&self, _point: HookPoint) -> bool {
        true
    }

    async fn on_session_start(&self, _session: &Session) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_session_end(&self, _session: &Session) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_dialogue_start(
        &self,
        _session: &Session,
        _dialogue: &DialogueSession,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_dialogue_end(
        &self,
        _session: &Session,
        _outcome: &DialogueOutcome,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_turn_complete(
        &self,
        _session: &Session,
        _turn: &DialogueTurn,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_tick(&self, _session: &Session, _report: &TickReport) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_location_enter(
        &self,
        _session: &Session,
        _location: &LocationId,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_location_exit(
        &self,
        _session: &Session,
        _location: &LocationId,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct HookRegistry {
    hooks: DashMap<String, Arc<dyn SessionHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, returning the one it replaced.
    pub fn register(&self, hook: Arc<dyn SessionHook>) -> Option<Arc<dyn SessionHook>> {
        let id = hook.module_id().to_string();
        let previous = self.hooks.insert(id.clone(), hook);
        if previous.is_some() {
            tracing::info!(module_id = %id, "Hook module replaced");
        } else {
            tracing::info!(module_id = %id, "Hook module registered");
        }
        previous
    }

    pub fn unregister(&self, module_id: &str) -> bool {
        self.hooks.remove(module_id).is_some()
    }

    pub fn get(&self, module_id: &str) -> Option<Arc<dyn SessionHook>> {
        self.hooks.get(module_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every module, ordered by id. Callers must not rely on the
    /// order for correctness.
    pub fn get_all(&self) -> Vec<Arc<dyn SessionHook>> {
        let mut entries: Vec<(String, Arc<dyn SessionHook>)> = self
            .hooks
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, hook)| hook).collect()
    }

    pub fn has(&self, module_id: &str) -> bool {
        self.hooks.contains_key(module_id)
    }

    pub fn clear(&self) {
        self.hooks.clear();
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl SessionHook for Named {
        fn module_id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn one_live_entry_per_module_id() {
        let registry = HookRegistry::new();
        assert!(registry.register(Arc::new(Named("culture"))).is_none());
        assert!(registry.register(Arc::new(Named("pedagogy"))).is_none());
        let replaced = registry.register(Arc::new(Named("culture")));
        assert_eq!(replaced.map(|h| h.module_id().to_string()), Some("culture".to_string()));
        assert_eq!(registry.len(), 2);
        assert!(registry.has("culture"));
    }

    #[test]
    fn get_all_is_ordered_by_id() {
        let registry = HookRegistry::new();
        registry.register(Arc::new(Named("retention")));
        registry.register(Arc::new(Named("culture")));
        let ids: Vec<String> = registry
            .get_all()
            .iter()
            .map(|h| h.module_id().to_string())
            .collect();
        assert_eq!(ids, vec!["culture", "retention"]);
    }

    #[test]
    fn unregister_and_clear() {
        let registry = HookRegistry::new();
        registry.register(Arc::new(Named("culture")));
        registry.register(Arc::new(Named("pedagogy")));
        assert!(registry.unregister("culture"));
        assert!(!registry.unregister("culture"));
        assert!(registry.get("culture").is_none());
        assert!(registry.get("pedagogy").is_some());
        registry.clear();
        assert!(registry.is_empty());
    }
}
