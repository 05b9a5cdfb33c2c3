//! Integration tests for parsing and disambiguation

use emberwood::command::parser::ParseOutcome;
use emberwood::command::resolver::ResolveOutcome;
use emberwood::core::config::PipelineConfig;
use emberwood::core::types::{ActionId, EntityId, Slot};
use emberwood::grammar::pattern::GrammarPattern;
use emberwood::pipeline::CommandPipeline;
use emberwood::world::entity::EntityInfo;
use emberwood::world::model::{StaticWorld, WorldModel};

/// Cellar with a player, two keys differing by adjective, and a lantern
fn cellar() -> (StaticWorld, EntityId, EntityId, EntityId, EntityId) {
    let mut world = StaticWorld::new();
    let room = world.add(EntityInfo::room("cellar"));
    let player = world.add_in(EntityInfo::actor("player"), room);
    let brass = world.add_in(EntityInfo::thing("key").with_adjectives(&["brass"]), room);
    let iron = world.add_in(EntityInfo::thing("key").with_adjectives(&["iron"]), room);
    let lantern = world.add_in(EntityInfo::thing("lantern"), room);
    (world, player, brass, iron, lantern)
}

fn pipeline() -> CommandPipeline {
    CommandPipeline::english(PipelineConfig::default()).unwrap()
}

#[test]
fn test_unique_noun_binds_to_its_entity() {
    let (world, player, _, _, lantern) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    let ParseOutcome::Success { commands } = pipeline.parse("take lantern", &scope, &world)
    else {
        panic!("expected parse success");
    };
    assert_eq!(commands.len(), 1);

    let ResolveOutcome::Resolved(resolved) = pipeline.resolve(&commands[0], &world).unwrap()
    else {
        panic!("expected resolution");
    };
    assert_eq!(resolved.noun, Some(lantern));
    assert!(resolved.all_targets.is_empty());
}

#[test]
fn test_bare_key_prompts_with_both_candidates() {
    let (world, player, brass, iron, _) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    let ParseOutcome::NeedsDisambiguation { request, .. } =
        pipeline.parse("take key", &scope, &world)
    else {
        panic!("expected disambiguation");
    };

    assert_eq!(request.slot, Slot::Noun);
    let offered: Vec<EntityId> = request.options.iter().map(|o| o.entity).collect();
    assert!(offered.contains(&brass));
    assert!(offered.contains(&iron));
    // Options come out in descending score order
    assert_eq!(request.options.len(), 2);
}

#[test]
fn test_adjective_resolves_without_prompt() {
    let (world, player, _, iron, _) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    let ParseOutcome::Success { commands } = pipeline.parse("take iron key", &scope, &world)
    else {
        panic!("expected parse success without disambiguation");
    };

    let ResolveOutcome::Resolved(resolved) = pipeline.resolve(&commands[0], &world).unwrap()
    else {
        panic!("expected resolution");
    };
    assert_eq!(resolved.noun, Some(iron));
}

#[test]
fn test_continuation_is_idempotent() {
    let (world, player, brass, _, _) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    let ParseOutcome::NeedsDisambiguation { request, pending } =
        pipeline.parse("take key", &scope, &world)
    else {
        panic!("expected disambiguation");
    };

    let once = pipeline.continue_with_disambiguation(pending.clone(), brass, request.slot);
    let twice =
        pipeline.continue_with_disambiguation(once.clone(), brass, request.slot);
    assert_eq!(once, twice);

    let ResolveOutcome::Resolved(first) = pipeline.resolve(&once, &world).unwrap() else {
        panic!("expected resolution");
    };
    let ResolveOutcome::Resolved(second) = pipeline.resolve(&twice, &world).unwrap() else {
        panic!("expected resolution");
    };
    assert_eq!(first, second);
    assert_eq!(first.noun, Some(brass));
}

#[test]
fn test_unmatched_pattern_is_typed_failure() {
    let (world, player, _, _, _) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    let ParseOutcome::Failure { error } = pipeline.parse("frobnicate widget", &scope, &world)
    else {
        panic!("expected a failure value, not a panic");
    };
    assert!(!error.is_empty());
}

#[test]
fn test_added_grammar_is_matchable_immediately() {
    let (world, player, _, _, lantern) = cellar();
    let mut pipeline = pipeline();
    let scope = world.scope_for(player);

    assert!(matches!(
        pipeline.parse("polish lantern", &scope, &world),
        ParseOutcome::Failure { .. }
    ));

    pipeline
        .add_grammar(GrammarPattern::new("polish", "polish|buff <noun>", "polish"))
        .unwrap();

    // No staleness window: the very next parse sees the new pattern
    let ParseOutcome::Success { commands } = pipeline.parse("polish lantern", &scope, &world)
    else {
        panic!("expected the fresh pattern to match");
    };
    assert_eq!(commands[0].action, ActionId::from("polish"));
    assert_eq!(commands[0].noun_candidates[0].entity, lantern);
}

#[test]
fn test_pronoun_follows_recent_mention() {
    let (mut world, player, brass, _, _) = cellar();
    let pipeline = pipeline();

    world.mention(brass);
    let scope = world.scope_for(player);

    let ParseOutcome::Success { commands } = pipeline.parse("take it", &scope, &world) else {
        panic!("expected pronoun to parse");
    };
    let ResolveOutcome::Resolved(resolved) = pipeline.resolve(&commands[0], &world).unwrap()
    else {
        panic!("expected resolution");
    };
    assert_eq!(resolved.noun, Some(brass));
}

#[test]
fn test_pronoun_without_referent_fails() {
    let (world, player, _, _, _) = cellar();
    let pipeline = pipeline();
    let scope = world.scope_for(player);

    assert!(matches!(
        pipeline.parse("take it", &scope, &world),
        ParseOutcome::Failure { .. }
    ));
}

#[test]
fn test_resolve_with_unknown_actor_raises() {
    let (world, _, _, _, _) = cellar();
    let pipeline = pipeline();

    // A scope naming an actor the world has never heard of is a
    // programmer error, not a player-facing failure
    let bogus = emberwood::world::scope::ScopeContext::new(EntityId::new());
    let ParseOutcome::Success { commands } = pipeline.parse("look", &bogus, &world) else {
        panic!("expected parse success");
    };
    assert!(pipeline.resolve(&commands[0], &world).is_err());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Arbitrary input must always come back as a typed outcome
        #[test]
        fn parse_never_panics(input in "[ -~]{0,60}") {
            let (world, player, _, _, _) = cellar();
            let pipeline = pipeline();
            let scope = world.scope_for(player);
            let _ = pipeline.parse(&input, &scope, &world);
        }
    }
}
