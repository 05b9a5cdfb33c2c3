//! Action registry: validate/execute definitions keyed by action id
//!
//! Per-action rules that the resolver consults — the ALL-eligibility
//! predicate, the ALL scope source, and implicit-second inference —
//! live here as strategy fields on the definition, so a new action
//! registers its own behavior without touching resolver code.

use crate::command::resolver::ResolvedCommand;
use crate::core::types::{ActionId, EntityId};
use crate::world::model::WorldModel;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated reason codes for validation and execution failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    UnknownAction,
    MissingTarget,
    NotCarried,
    AlreadyCarried,
    Scenery,
    NotPortable,
    RoomTarget,
    SelfTarget,
    CarryLimit,
    NotContainer,
    ContainerClosed,
    NotLockable,
    Locked,
    WrongKey,
    NotLightable,
    NoExit,
    NotActor,
    AlreadyDone,
    /// The action's execute step panicked
    ActionPanicked,
    /// Action-specific rejection with its own text
    Rejected(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::UnknownAction => "Nothing happens.",
            FailureReason::MissingTarget => "There is nothing there.",
            FailureReason::NotCarried => "You aren't carrying that.",
            FailureReason::AlreadyCarried => "You already have that.",
            FailureReason::Scenery => "That's fixed in place.",
            FailureReason::NotPortable => "You can't pick that up.",
            FailureReason::RoomTarget => "You can't do that to a whole room.",
            FailureReason::SelfTarget => "You can't do that to yourself.",
            FailureReason::CarryLimit => "Your hands are full.",
            FailureReason::NotContainer => "That can't hold things.",
            FailureReason::ContainerClosed => "It's closed.",
            FailureReason::NotLockable => "That has no lock.",
            FailureReason::Locked => "It's locked.",
            FailureReason::WrongKey => "That doesn't fit.",
            FailureReason::NotLightable => "That won't burn.",
            FailureReason::NoExit => "You can't go that way.",
            FailureReason::NotActor => "They wouldn't appreciate that.",
            FailureReason::AlreadyDone => "It already is.",
            FailureReason::ActionPanicked => "Something went wrong.",
            FailureReason::Rejected(text) => return f.write_str(text),
        };
        f.write_str(text)
    }
}

/// What a successful execute step reports back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub note: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
        }
    }
}

/// Where ALL-expansion enumerates candidates from when no container is
/// named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllScope {
    /// Contents of the actor's current location
    #[default]
    Location,
    /// The actor's held items ("drop all")
    Inventory,
}

pub type ValidateFn = Box<
    dyn Fn(
        &dyn WorldModel,
        &ResolvedCommand,
        Option<EntityId>,
    ) -> std::result::Result<(), FailureReason>,
>;

pub type ExecuteFn = Box<
    dyn Fn(
        &mut dyn WorldModel,
        &ResolvedCommand,
        Option<EntityId>,
    ) -> std::result::Result<ActionOutcome, FailureReason>,
>;

pub type EligibleFn =
    Box<dyn Fn(&dyn WorldModel, EntityId, EntityId) -> std::result::Result<(), FailureReason>>;

pub type InferSecondFn = Box<dyn Fn(&dyn WorldModel, EntityId, Option<EntityId>) -> Option<EntityId>>;

/// One registered action: dispatch targets plus resolver strategies
pub struct ActionDefinition {
    pub id: ActionId,
    /// Verbs indexed to this action for lookup by surface form
    pub verbs: Vec<String>,
    pub validate: Option<ValidateFn>,
    pub execute: ExecuteFn,
    /// Per-candidate eligibility for ALL-expansion
    pub all_eligible: Option<EligibleFn>,
    pub all_scope: AllScope,
    /// Inference for a second object the player didn't name
    pub infer_second: Option<InferSecondFn>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<ActionId>, execute: ExecuteFn) -> Self {
        Self {
            id: id.into(),
            verbs: Vec::new(),
            validate: None,
            execute,
            all_eligible: None,
            all_scope: AllScope::default(),
            infer_second: None,
        }
    }

    pub fn with_verbs(mut self, verbs: &[&str]) -> Self {
        self.verbs = verbs.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_validate(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn with_all_eligible(mut self, eligible: EligibleFn) -> Self {
        self.all_eligible = Some(eligible);
        self
    }

    pub fn with_all_scope(mut self, scope: AllScope) -> Self {
        self.all_scope = scope;
        self
    }

    pub fn with_infer_second(mut self, infer: InferSecondFn) -> Self {
        self.infer_second = Some(infer);
        self
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("id", &self.id)
            .field("verbs", &self.verbs)
            .field("has_validate", &self.validate.is_some())
            .field("all_scope", &self.all_scope)
            .field("has_infer_second", &self.infer_second.is_some())
            .finish()
    }
}

/// Action definitions plus a verb index, populated at startup and
/// read-mostly afterwards
#[derive(Default)]
pub struct ActionRegistry {
    actions: AHashMap<ActionId, ActionDefinition>,
    verb_index: AHashMap<String, ActionId>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, indexing its verbs; last registration
    /// for an id wins
    pub fn register(&mut self, definition: ActionDefinition) {
        for verb in &definition.verbs {
            self.verb_index
                .insert(verb.to_lowercase(), definition.id.clone());
        }
        self.actions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &ActionId) -> Option<&ActionDefinition> {
        self.actions.get(id)
    }

    pub fn action_for_verb(&self, verb: &str) -> Option<&ActionId> {
        self.verb_index.get(&verb.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.actions.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("ActionRegistry").field("actions", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_definition(id: &str, verbs: &[&str]) -> ActionDefinition {
        ActionDefinition::new(id, Box::new(|_, _, _| Ok(ActionOutcome::ok()))).with_verbs(verbs)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ActionRegistry::new();
        registry.register(noop_definition("take", &["take", "get", "grab"]));

        assert!(registry.get(&ActionId::from("take")).is_some());
        assert!(registry.get(&ActionId::from("drop")).is_none());
    }

    #[test]
    fn test_verb_index() {
        let mut registry = ActionRegistry::new();
        registry.register(noop_definition("take", &["take", "get", "grab"]));

        assert_eq!(registry.action_for_verb("grab"), Some(&ActionId::from("take")));
        assert_eq!(registry.action_for_verb("GET"), Some(&ActionId::from("take")));
        assert_eq!(registry.action_for_verb("steal"), None);
    }

    #[test]
    fn test_failure_reason_text() {
        assert_eq!(FailureReason::CarryLimit.to_string(), "Your hands are full.");
        assert_eq!(
            FailureReason::Rejected("No.".to_string()).to_string(),
            "No."
        );
    }
}
