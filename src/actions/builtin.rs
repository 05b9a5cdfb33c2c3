//! The builtin English action set
//!
//! Each action registers its validate/execute pair plus the resolver
//! strategies it needs: ALL eligibility, ALL scope source, and
//! implicit-second inference. Everything here goes through the
//! `WorldModel` seam; no entity behavior is hard-coded.

use crate::actions::registry::{
    ActionDefinition, ActionOutcome, ActionRegistry, AllScope, FailureReason,
};
use crate::core::types::EntityId;
use crate::world::entity::EntityKind;
use crate::world::model::WorldModel;

type Check = std::result::Result<(), FailureReason>;

/// Register the full builtin action set
pub fn register_builtin_actions(registry: &mut ActionRegistry) {
    registry.register(take_action());
    registry.register(drop_action());
    registry.register(look_action());
    registry.register(examine_action());
    registry.register(inventory_action());
    registry.register(go_action());
    registry.register(put_action());
    registry.register(open_action());
    registry.register(close_action());
    registry.register(unlock_action());
    registry.register(lock_action());
    registry.register(light_action());
    registry.register(give_action());
}

fn name_of(world: &dyn WorldModel, id: EntityId) -> String {
    world
        .entity(id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| "something".to_string())
}

/// Take eligibility, shared between single validation and
/// ALL-expansion
fn take_check(world: &dyn WorldModel, actor: EntityId, target: EntityId) -> Check {
    let Some(entity) = world.entity(target) else {
        return Err(FailureReason::MissingTarget);
    };
    if target == actor {
        return Err(FailureReason::SelfTarget);
    }
    match entity.kind {
        EntityKind::Room => return Err(FailureReason::RoomTarget),
        EntityKind::Actor => return Err(FailureReason::NotPortable),
        EntityKind::Thing => {}
    }
    if entity.fixed {
        return Err(FailureReason::Scenery);
    }
    if world.location_of(target) == Some(actor) {
        return Err(FailureReason::AlreadyCarried);
    }
    if let Some(limit) = world
        .entity(actor)
        .and_then(|e| e.actor)
        .and_then(|a| a.carry_limit)
    {
        if world.contents_of(actor).len() >= limit {
            return Err(FailureReason::CarryLimit);
        }
    }
    Ok(())
}

fn take_action() -> ActionDefinition {
    ActionDefinition::new(
        "take",
        Box::new(|world, command, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            world.move_entity(target, command.actor);
            Ok(ActionOutcome::with_note(format!(
                "You take the {}.",
                name_of(world, target)
            )))
        }),
    )
    .with_verbs(&["take", "get", "grab"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        take_check(world, command.actor, target)
    }))
    .with_all_eligible(Box::new(take_check))
}

fn drop_check(world: &dyn WorldModel, actor: EntityId, target: EntityId) -> Check {
    if world.location_of(target) != Some(actor) {
        return Err(FailureReason::NotCarried);
    }
    Ok(())
}

fn drop_action() -> ActionDefinition {
    ActionDefinition::new(
        "drop",
        Box::new(|world, command, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let location = world
                .location_of(command.actor)
                .ok_or_else(|| FailureReason::Rejected("You are nowhere.".to_string()))?;
            world.move_entity(target, location);
            Ok(ActionOutcome::with_note(format!(
                "You drop the {}.",
                name_of(world, target)
            )))
        }),
    )
    .with_verbs(&["drop", "discard"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        drop_check(world, command.actor, target)
    }))
    .with_all_eligible(Box::new(drop_check))
    .with_all_scope(AllScope::Inventory)
}

fn look_action() -> ActionDefinition {
    ActionDefinition::new(
        "look",
        Box::new(|world, command, _| {
            let location = world
                .location_of(command.actor)
                .ok_or_else(|| FailureReason::Rejected("Darkness, everywhere.".to_string()))?;
            Ok(ActionOutcome::with_note(name_of(world, location)))
        }),
    )
    .with_verbs(&["look", "l"])
}

fn examine_action() -> ActionDefinition {
    ActionDefinition::new(
        "examine",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
            let description = if entity.adjectives.is_empty() {
                format!("It's a {}.", entity.name)
            } else {
                format!("It's a {} {}.", entity.adjectives.join(" "), entity.name)
            };
            Ok(ActionOutcome::with_note(description))
        }),
    )
    .with_verbs(&["examine", "x", "inspect"])
}

fn inventory_action() -> ActionDefinition {
    ActionDefinition::new(
        "inventory",
        Box::new(|world, command, _| {
            let held: Vec<String> = world
                .contents_of(command.actor)
                .into_iter()
                .map(|id| name_of(world, id))
                .collect();
            let note = if held.is_empty() {
                "You are carrying nothing.".to_string()
            } else {
                format!("You are carrying: {}.", held.join(", "))
            };
            Ok(ActionOutcome::with_note(note))
        }),
    )
    .with_verbs(&["inventory", "inv", "i"])
}

fn go_action() -> ActionDefinition {
    ActionDefinition::new(
        "go",
        Box::new(|world, command, _| {
            let direction = command
                .direction
                .as_deref()
                .ok_or(FailureReason::NoExit)?
                .to_string();
            let location = world
                .location_of(command.actor)
                .ok_or_else(|| FailureReason::Rejected("You are nowhere.".to_string()))?;
            let destination = world
                .entity(location)
                .and_then(|room| room.exits.get(&direction).copied())
                .ok_or(FailureReason::NoExit)?;
            world.move_entity(command.actor, destination);
            Ok(ActionOutcome::with_note(format!(
                "You head {} to the {}.",
                direction,
                name_of(world, destination)
            )))
        }),
    )
    .with_verbs(&["go", "walk", "head"])
}

fn put_action() -> ActionDefinition {
    ActionDefinition::new(
        "put",
        Box::new(|world, command, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let second = command.second.ok_or(FailureReason::MissingTarget)?;
            if command.is_containing_preposition() {
                world.move_entity(target, second);
            } else {
                // Placed beside the reference entity; the spatial
                // relation on the command records how
                let destination = world.location_of(second).unwrap_or(second);
                world.move_entity(target, destination);
            }
            Ok(ActionOutcome::with_note(format!(
                "You put the {} {} the {}.",
                name_of(world, target),
                command.preposition.as_deref().unwrap_or("in"),
                name_of(world, second)
            )))
        }),
    )
    .with_verbs(&["put", "place", "insert"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let second = command.second.ok_or(FailureReason::MissingTarget)?;
        if world.location_of(target) != Some(command.actor) {
            return Err(FailureReason::NotCarried);
        }
        if command.is_containing_preposition() {
            let container = world
                .entity(second)
                .and_then(|e| e.container)
                .ok_or(FailureReason::NotContainer)?;
            if !container.open {
                return Err(FailureReason::ContainerClosed);
            }
        }
        Ok(())
    }))
}

fn open_action() -> ActionDefinition {
    ActionDefinition::new(
        "open",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity_mut(target).ok_or(FailureReason::MissingTarget)?;
            let container = entity.container.as_mut().ok_or(FailureReason::NotContainer)?;
            container.open = true;
            Ok(ActionOutcome::with_note("Opened.".to_string()))
        }),
    )
    .with_verbs(&["open"])
    .with_validate(Box::new(|world, _, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
        let container = entity.container.ok_or(FailureReason::NotContainer)?;
        if container.open {
            return Err(FailureReason::AlreadyDone);
        }
        if entity.lock.map(|l| l.locked).unwrap_or(false) {
            return Err(FailureReason::Locked);
        }
        Ok(())
    }))
}

fn close_action() -> ActionDefinition {
    ActionDefinition::new(
        "close",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity_mut(target).ok_or(FailureReason::MissingTarget)?;
            let container = entity.container.as_mut().ok_or(FailureReason::NotContainer)?;
            container.open = false;
            Ok(ActionOutcome::with_note("Closed.".to_string()))
        }),
    )
    .with_verbs(&["close", "shut"])
    .with_validate(Box::new(|world, _, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
        let container = entity.container.ok_or(FailureReason::NotContainer)?;
        if !container.open {
            return Err(FailureReason::AlreadyDone);
        }
        Ok(())
    }))
}

/// Key check shared by lock and unlock: the key must be carried and
/// must either declare this lock or declare nothing ("any lock")
fn key_check(
    world: &dyn WorldModel,
    actor: EntityId,
    noun: EntityId,
    key: EntityId,
) -> Check {
    if world.location_of(key) != Some(actor) {
        return Err(FailureReason::NotCarried);
    }
    let spec = world
        .entity(key)
        .and_then(|e| e.key)
        .ok_or(FailureReason::WrongKey)?;
    match spec.unlocks {
        None => Ok(()),
        Some(target) if target == noun => Ok(()),
        Some(_) => Err(FailureReason::WrongKey),
    }
}

/// Find a held key usable on the noun; default policy is that a key
/// with no declared target works on anything
fn infer_key(world: &dyn WorldModel, actor: EntityId, noun: Option<EntityId>) -> Option<EntityId> {
    world.contents_of(actor).into_iter().find(|&held| {
        world
            .entity(held)
            .and_then(|e| e.key)
            .map(|spec| match spec.unlocks {
                None => true,
                Some(target) => Some(target) == noun,
            })
            .unwrap_or(false)
    })
}

fn unlock_action() -> ActionDefinition {
    ActionDefinition::new(
        "unlock",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity_mut(target).ok_or(FailureReason::MissingTarget)?;
            let lock = entity.lock.as_mut().ok_or(FailureReason::NotLockable)?;
            lock.locked = false;
            Ok(ActionOutcome::with_note("Unlocked.".to_string()))
        }),
    )
    .with_verbs(&["unlock"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
        let lock = entity.lock.ok_or(FailureReason::NotLockable)?;
        if !lock.locked {
            return Err(FailureReason::AlreadyDone);
        }
        let key = command.second.ok_or(FailureReason::MissingTarget)?;
        key_check(world, command.actor, target, key)
    }))
    .with_infer_second(Box::new(infer_key))
}

fn lock_action() -> ActionDefinition {
    ActionDefinition::new(
        "lock",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity_mut(target).ok_or(FailureReason::MissingTarget)?;
            let lock = entity.lock.as_mut().ok_or(FailureReason::NotLockable)?;
            lock.locked = true;
            Ok(ActionOutcome::with_note("Locked.".to_string()))
        }),
    )
    .with_verbs(&["lock"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
        let lock = entity.lock.ok_or(FailureReason::NotLockable)?;
        if lock.locked {
            return Err(FailureReason::AlreadyDone);
        }
        let key = command.second.ok_or(FailureReason::MissingTarget)?;
        key_check(world, command.actor, target, key)
    }))
    .with_infer_second(Box::new(infer_key))
}

fn light_action() -> ActionDefinition {
    ActionDefinition::new(
        "light",
        Box::new(|world, _, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let entity = world.entity_mut(target).ok_or(FailureReason::MissingTarget)?;
            let light = entity.light.as_mut().ok_or(FailureReason::NotLightable)?;
            light.lit = true;
            Ok(ActionOutcome::with_note(format!(
                "The {} flares to life.",
                entity.name
            )))
        }),
    )
    .with_verbs(&["light", "ignite"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        let entity = world.entity(target).ok_or(FailureReason::MissingTarget)?;
        let light = entity.light.ok_or(FailureReason::NotLightable)?;
        if light.lit {
            return Err(FailureReason::AlreadyDone);
        }
        if let Some(igniter) = command.second {
            let burning = world
                .entity(igniter)
                .and_then(|e| e.light)
                .map(|l| l.lit)
                .unwrap_or(false);
            if !burning {
                return Err(FailureReason::Rejected(
                    "That isn't burning.".to_string(),
                ));
            }
        }
        Ok(())
    }))
    // A held burning light source can pass its flame along
    .with_infer_second(Box::new(|world, actor, _| {
        world.contents_of(actor).into_iter().find(|&held| {
            world
                .entity(held)
                .and_then(|e| e.light)
                .map(|l| l.lit)
                .unwrap_or(false)
        })
    }))
}

fn give_action() -> ActionDefinition {
    ActionDefinition::new(
        "give",
        Box::new(|world, command, target| {
            let target = target.ok_or(FailureReason::MissingTarget)?;
            let recipient = command.second.ok_or(FailureReason::MissingTarget)?;
            world.move_entity(target, recipient);
            Ok(ActionOutcome::with_note(format!(
                "You hand the {} to the {}.",
                name_of(world, target),
                name_of(world, recipient)
            )))
        }),
    )
    .with_verbs(&["give", "hand"])
    .with_validate(Box::new(|world, command, target| {
        let target = target.ok_or(FailureReason::MissingTarget)?;
        if world.location_of(target) != Some(command.actor) {
            return Err(FailureReason::NotCarried);
        }
        let recipient = command.second.ok_or(FailureReason::MissingTarget)?;
        let animate = world
            .entity(recipient)
            .map(|e| e.kind == EntityKind::Actor)
            .unwrap_or(false);
        if !animate {
            return Err(FailureReason::NotActor);
        }
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entity::EntityInfo;
    use crate::world::model::StaticWorld;

    fn setup() -> (StaticWorld, EntityId, EntityId) {
        let mut world = StaticWorld::new();
        let cellar = world.add(EntityInfo::room("cellar"));
        let player = world.add_in(EntityInfo::actor("player"), cellar);
        (world, cellar, player)
    }

    #[test]
    fn test_take_check_rejects_scenery_and_self() {
        let (mut world, cellar, player) = setup();
        let altar = world.add_in(EntityInfo::thing("altar").scenery(), cellar);
        let sword = world.add_in(EntityInfo::thing("sword"), cellar);

        assert_eq!(take_check(&world, player, altar), Err(FailureReason::Scenery));
        assert_eq!(take_check(&world, player, player), Err(FailureReason::SelfTarget));
        assert_eq!(take_check(&world, player, cellar), Err(FailureReason::RoomTarget));
        assert_eq!(take_check(&world, player, sword), Ok(()));
    }

    #[test]
    fn test_take_check_respects_carry_limit() {
        let (mut world, cellar, _) = setup();
        let porter = world.add_in(EntityInfo::actor("porter").carry_limit(1), cellar);
        let coin = world.add_in(EntityInfo::thing("coin"), cellar);
        let gem = world.add_in(EntityInfo::thing("gem"), cellar);

        assert_eq!(take_check(&world, porter, coin), Ok(()));
        world.move_entity(coin, porter);
        assert_eq!(take_check(&world, porter, gem), Err(FailureReason::CarryLimit));
    }

    #[test]
    fn test_infer_key_prefers_matching_declared_target() {
        let (mut world, cellar, player) = setup();
        let chest = world.add_in(EntityInfo::thing("chest").lockable(true), cellar);
        let other = world.add_in(EntityInfo::thing("door").lockable(true), cellar);
        let wrong = world.add_in(EntityInfo::thing("key").key_for(Some(other)), player);
        let right = world.add_in(EntityInfo::thing("key").key_for(Some(chest)), player);

        assert_eq!(infer_key(&world, player, Some(chest)), Some(right));
        assert_eq!(infer_key(&world, player, Some(other)), Some(wrong));
    }

    #[test]
    fn test_infer_key_accepts_undeclared_key() {
        let (mut world, cellar, player) = setup();
        let chest = world.add_in(EntityInfo::thing("chest").lockable(true), cellar);
        let skeleton = world.add_in(EntityInfo::thing("key").key_for(None), player);

        assert_eq!(infer_key(&world, player, Some(chest)), Some(skeleton));
    }

    #[test]
    fn test_infer_key_ignores_keys_on_the_floor() {
        let (mut world, cellar, player) = setup();
        let chest = world.add_in(EntityInfo::thing("chest").lockable(true), cellar);
        world.add_in(EntityInfo::thing("key").key_for(None), cellar);

        assert_eq!(infer_key(&world, player, Some(chest)), None);
    }

    #[test]
    fn test_key_check_wrong_lock() {
        let (mut world, cellar, player) = setup();
        let chest = world.add_in(EntityInfo::thing("chest").lockable(true), cellar);
        let other = world.add_in(EntityInfo::thing("door").lockable(true), cellar);
        let key = world.add_in(EntityInfo::thing("key").key_for(Some(other)), player);

        assert_eq!(
            key_check(&world, player, chest, key),
            Err(FailureReason::WrongKey)
        );
        assert_eq!(key_check(&world, player, other, key), Ok(()));
    }
}
