//! Prompt context - the flat key/value map handed to the text generator
//!
//! Keys are stable snake_case names. Absent data yields an absent key, never
//! an empty placeholder, except `injection_directives` which is always set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dialogue::DialogueSession;
use super::world_state::WorldState;
use crate::ids::NpcId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptContext(BTreeMap<String, String>);

impl PromptContext {
    /// Build the context for `npc_id` in `world`, enriched with the active
    /// dialogue when one is given. `None` when the NPC is unknown.
    pub fn build(
        world: &WorldState,
        npc_id: &NpcId,
        dialogue: Option<&DialogueSession>,
    ) -> Option<Self> {
        let definition = world.npc_definition(npc_id)?;
        let state = world.npc(npc_id)?;
        // A running dialogue speaks with the behavior frozen at its start.
        let behavior = match dialogue {
            Some(d) if d.npc_id() == npc_id => *d.behavior(),
            _ => world.resolve_npc_behavior(npc_id)?,
        };

        let mut ctx = Self::default();
        ctx.set("npc_name", &definition.name);
        if !definition.role.is_empty() {
            ctx.set("npc_role", &definition.role);
        }
        ctx.set("npc_register", definition.register.as_str());
        ctx.set("npc_personality", definition.personality.summary());
        for (name, pct) in behavior.as_percentages() {
            ctx.set(format!("behavior_{name}"), format!("{pct}%"));
        }
        ctx.set(
            "silence_tolerance_seconds",
            format!("{:.1}", behavior.silence_tolerance_seconds),
        );
        ctx.set("reputation_score", format!("{:.2}", state.reputation));
        ctx.set("reputation_descriptor", state.reputation_band().descriptor());
        if !definition.vocabulary_focus.is_empty() {
            ctx.set("vocabulary_focus", definition.vocabulary_focus.join(", "));
        }

        if let Some(location) = world.location(&state.location) {
            ctx.set("location_name", &location.name);
            if !location.description.is_empty() {
                ctx.set("location_description", &location.description);
            }
        }

        let mood = match dialogue {
            Some(d) if d.npc_id() == npc_id => d.current_mood(),
            _ => state.mood,
        };
        ctx.set("current_mood", mood.to_string());
        ctx.set("mood_description", mood.description());
        ctx.set("time_of_day", world.time_of_day().display_name());

        let events: Vec<&str> = world
            .active_events_at(&state.location)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        if !events.is_empty() {
            ctx.set("active_ambient_events", events.join(", "));
        }

        let directives: Vec<String> = match dialogue {
            Some(d) if d.npc_id() == npc_id => {
                d.open_injection_targets().into_iter().map(str::to_string).collect()
            }
            _ => state.pending_injections.clone(),
        };
        ctx.set("injection_directives", directives.join(", "));

        if let Some(goal) = dialogue.and_then(|d| d.goal()) {
            ctx.set("dialogue_goal", goal);
        }

        Some(ctx)
    }

    fn set(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.0.insert(key.into(), value.as_ref().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AmbientEventDefinition, EnvironmentDescription, Location, NpcDefinition,
    };
    use crate::ids::LocationId;
    use crate::time_of_day::TimeOfDay;
    use chrono::Utc;

    fn world() -> WorldState {
        let env = EnvironmentDescription::new("market")
            .with_location(
                Location::new("market", "Market")
                    .with_description("A busy square")
                    .with_npc("vendor"),
            )
            .with_npc(
                NpcDefinition::new("vendor", "Greta")
                    .with_role("fruit seller")
                    .with_vocabulary_focus(vec!["Apfel".to_string(), "Kilo".to_string()]),
            )
            .with_ambient_event(
                AmbientEventDefinition::new("bells", "Church bells")
                    .with_probability(TimeOfDay::Morning, 1.0),
            );
        WorldState::from_environment(&env).expect("valid environment")
    }

    #[test]
    fn context_describes_npc_and_location() {
        let ctx = PromptContext::build(&world(), &NpcId::new("vendor"), None).expect("npc");
        assert_eq!(ctx.get("npc_name"), Some("Greta"));
        assert_eq!(ctx.get("npc_role"), Some("fruit seller"));
        assert_eq!(ctx.get("location_name"), Some("Market"));
        assert_eq!(ctx.get("vocabulary_focus"), Some("Apfel, Kilo"));
        assert_eq!(ctx.get("current_mood"), Some("neutral"));
        assert_eq!(ctx.get("time_of_day"), Some("Morning"));
        assert!(ctx.get("behavior_patience").is_some_and(|v| v.ends_with('%')));
        assert_eq!(ctx.get("dialogue_goal"), None);
        assert_eq!(ctx.get("active_ambient_events"), None);
    }

    #[test]
    fn context_includes_dialogue_goal_targets_and_events() {
        let mut draw = || 0.0;
        let (w, _) = world().tick(5, &mut draw);
        let vendor = NpcId::new("vendor");
        let npc = w.npc(&vendor).expect("npc").clone();
        let def = w.npc_definition(&vendor).expect("def").clone();
        let dialogue = DialogueSession::start(
            &def,
            &npc,
            LocationId::new("market"),
            Some("buy apples".to_string()),
            vec!["ein Kilo".to_string()],
            Utc::now(),
        );
        let ctx = PromptContext::build(&w, &vendor, Some(&dialogue)).expect("npc");
        assert_eq!(ctx.get("dialogue_goal"), Some("buy apples"));
        assert_eq!(ctx.get("injection_directives"), Some("ein Kilo"));
        assert_eq!(ctx.get("active_ambient_events"), Some("Church bells"));
    }

    #[test]
    fn unknown_npc_has_no_context() {
        assert!(PromptContext::build(&world(), &NpcId::new("ghost"), None).is_none());
    }
}
