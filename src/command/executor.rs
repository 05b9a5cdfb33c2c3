//! Action dispatch: validate and execute resolved commands
//!
//! Single targets run validate then a guarded execute. Batch targets
//! run strictly sequentially against the live world so later targets
//! see earlier side effects; one target's failure never aborts its
//! siblings, and exactly one terminal summary event closes the batch.

use crate::actions::registry::{ActionDefinition, ActionOutcome, ActionRegistry, FailureReason};
use crate::command::resolver::ResolvedCommand;
use crate::core::types::{ActionId, EntityId};
use crate::world::model::WorldModel;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// One failed batch member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub target: EntityId,
    pub reason: FailureReason,
}

/// Events emitted by execution; data for the narration layer, never
/// control flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionEvent {
    Performed {
        action: ActionId,
        actor: EntityId,
        target: Option<EntityId>,
        second: Option<EntityId>,
        note: Option<String>,
    },
    Failed {
        action: ActionId,
        target: Option<EntityId>,
        reason: FailureReason,
        detail: Option<String>,
    },
    /// Terminal batch summary: every target attempted, both lists
    /// complete
    BatchCompleted {
        action: ActionId,
        attempted: usize,
        succeeded: Vec<EntityId>,
        failed: Vec<BatchFailure>,
    },
}

/// Dispatches resolved commands through the action registry
pub struct ActionExecutor;

impl ActionExecutor {
    pub fn execute(
        registry: &ActionRegistry,
        world: &mut dyn WorldModel,
        command: &ResolvedCommand,
    ) -> Vec<ActionEvent> {
        let Some(definition) = registry.get(&command.action) else {
            tracing::warn!(action = %command.action, "no action registered for id");
            return vec![ActionEvent::Failed {
                action: command.action.clone(),
                target: None,
                reason: FailureReason::UnknownAction,
                detail: Some(format!("no action registered for '{}'", command.action)),
            }];
        };

        if command.all_targets.is_empty() {
            Self::execute_single(definition, world, command)
        } else {
            Self::execute_batch(definition, world, command)
        }
    }

    fn execute_single(
        definition: &ActionDefinition,
        world: &mut dyn WorldModel,
        command: &ResolvedCommand,
    ) -> Vec<ActionEvent> {
        let target = command.noun;

        if let Some(validate) = &definition.validate {
            if let Err(reason) = validate(world, command, target) {
                return vec![ActionEvent::Failed {
                    action: command.action.clone(),
                    target,
                    reason: reason.clone(),
                    detail: Some(reason.to_string()),
                }];
            }
        }

        match run_guarded(definition, world, command, target) {
            Ok(outcome) => vec![ActionEvent::Performed {
                action: command.action.clone(),
                actor: command.actor,
                target,
                second: command.second,
                note: outcome.note,
            }],
            Err(reason) => vec![ActionEvent::Failed {
                action: command.action.clone(),
                target,
                reason: reason.clone(),
                detail: Some(reason.to_string()),
            }],
        }
    }

    fn execute_batch(
        definition: &ActionDefinition,
        world: &mut dyn WorldModel,
        command: &ResolvedCommand,
    ) -> Vec<ActionEvent> {
        let mut events = Vec::new();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        // Strictly sequential: validation runs against the live world,
        // so earlier successes (capacity, containment) are visible here
        for &target in &command.all_targets {
            let result = match &definition.validate {
                Some(validate) => validate(world, command, Some(target))
                    .and_then(|()| run_guarded(definition, world, command, Some(target))),
                None => run_guarded(definition, world, command, Some(target)),
            };

            match result {
                Ok(outcome) => {
                    succeeded.push(target);
                    events.push(ActionEvent::Performed {
                        action: command.action.clone(),
                        actor: command.actor,
                        target: Some(target),
                        second: None,
                        note: outcome.note,
                    });
                }
                Err(reason) => {
                    events.push(ActionEvent::Failed {
                        action: command.action.clone(),
                        target: Some(target),
                        reason: reason.clone(),
                        detail: Some(reason.to_string()),
                    });
                    failed.push(BatchFailure { target, reason });
                }
            }
        }

        tracing::debug!(
            action = %command.action,
            attempted = command.all_targets.len(),
            succeeded = succeeded.len(),
            failed = failed.len(),
            "batch execution complete"
        );

        events.push(ActionEvent::BatchCompleted {
            action: command.action.clone(),
            attempted: command.all_targets.len(),
            succeeded,
            failed,
        });
        events
    }
}

/// Run an execute step, converting a panic into a structured failure
fn run_guarded(
    definition: &ActionDefinition,
    world: &mut dyn WorldModel,
    command: &ResolvedCommand,
    target: Option<EntityId>,
) -> std::result::Result<ActionOutcome, FailureReason> {
    match catch_unwind(AssertUnwindSafe(|| {
        (definition.execute)(world, command, target)
    })) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(action = %definition.id, ?target, "action execute step panicked");
            Err(FailureReason::ActionPanicked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::registry::ActionOutcome;
    use crate::core::types::PatternId;
    use crate::world::entity::EntityInfo;
    use crate::world::model::StaticWorld;

    fn command(action: &str, actor: EntityId, noun: Option<EntityId>) -> ResolvedCommand {
        ResolvedCommand {
            action: ActionId::from(action),
            actor,
            noun,
            all_targets: Vec::new(),
            exceptions: Vec::new(),
            second: None,
            preposition: None,
            spatial: None,
            implicit_second: false,
            direction: None,
            pattern: PatternId::from("test"),
            input: String::new(),
        }
    }

    fn world_with_thing() -> (StaticWorld, EntityId, EntityId) {
        let mut world = StaticWorld::new();
        let room = world.add(EntityInfo::room("room"));
        let player = world.add_in(EntityInfo::actor("player"), room);
        let rock = world.add_in(EntityInfo::thing("rock"), room);
        (world, player, rock)
    }

    #[test]
    fn test_unknown_action_yields_failure_event() {
        let (mut world, player, _) = world_with_thing();
        let registry = ActionRegistry::new();

        let events =
            ActionExecutor::execute(&registry, &mut world, &command("warble", player, None));
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ActionEvent::Failed {
                reason: FailureReason::UnknownAction,
                ..
            }
        ));
    }

    #[test]
    fn test_validation_rejection_carries_reason() {
        let (mut world, player, rock) = world_with_thing();
        let mut registry = ActionRegistry::new();
        registry.register(
            ActionDefinition::new("smash", Box::new(|_, _, _| Ok(ActionOutcome::ok())))
                .with_validate(Box::new(|_, _, _| {
                    Err(FailureReason::Rejected("Too sturdy.".to_string()))
                })),
        );

        let events =
            ActionExecutor::execute(&registry, &mut world, &command("smash", player, Some(rock)));
        let ActionEvent::Failed { reason, detail, .. } = &events[0] else {
            panic!("expected failure event");
        };
        assert_eq!(*reason, FailureReason::Rejected("Too sturdy.".to_string()));
        assert_eq!(detail.as_deref(), Some("Too sturdy."));
    }

    #[test]
    fn test_single_target_panic_becomes_failure() {
        let (mut world, player, rock) = world_with_thing();
        let mut registry = ActionRegistry::new();
        registry.register(ActionDefinition::new(
            "smash",
            Box::new(|_, _, _| panic!("boom")),
        ));

        let events =
            ActionExecutor::execute(&registry, &mut world, &command("smash", player, Some(rock)));
        assert!(matches!(
            events[0],
            ActionEvent::Failed {
                reason: FailureReason::ActionPanicked,
                ..
            }
        ));
    }
}
