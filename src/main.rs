//! Emberwood - Entry Point
//!
//! A small interactive loop wiring the command pipeline to an
//! in-memory demo world: type commands, watch the resulting events.

use emberwood::command::executor::ActionEvent;
use emberwood::command::parser::{ParseOutcome, ParsedCommand};
use emberwood::command::resolver::ResolveOutcome;
use emberwood::command::DisambiguationRequest;
use emberwood::core::config::PipelineConfig;
use emberwood::core::error::Result;
use emberwood::core::types::EntityId;
use emberwood::pipeline::CommandPipeline;
use emberwood::world::entity::EntityInfo;
use emberwood::world::model::{StaticWorld, WorldModel};

use std::io::{self, Write};

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("emberwood=info")
        .init();

    tracing::info!("Emberwood starting...");

    let pipeline = CommandPipeline::english(PipelineConfig::default())?;
    let (mut world, player) = build_demo_world();

    println!("\n=== EMBERWOOD ===");
    println!("A command-pipeline demo for interactive fiction");
    println!();
    println!("Try: look, take all, take brass key, unlock chest, go north");
    println!("Meta commands:");
    println!("  scope           - Show what's currently in scope");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "quit" | "q" => break,
            "scope" => {
                display_scope(&world, player);
                continue;
            }
            _ => {}
        }

        let scope = world.scope_for(player);
        match pipeline.parse(input, &scope, &world) {
            ParseOutcome::Failure { error } => println!("{error}"),
            ParseOutcome::NeedsDisambiguation { request, pending } => {
                if let Some(chosen) = prompt_choice(&request)? {
                    let narrowed =
                        pipeline.continue_with_disambiguation(pending, chosen, request.slot);
                    run_command(&pipeline, &mut world, &narrowed)?;
                }
            }
            ParseOutcome::Success { commands } => {
                for command in &commands {
                    run_command(&pipeline, &mut world, command)?;
                }
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn run_command(
    pipeline: &CommandPipeline,
    world: &mut StaticWorld,
    command: &ParsedCommand,
) -> Result<()> {
    match pipeline.resolve(command, world)? {
        ResolveOutcome::Failed { reason } => println!("{reason}"),
        ResolveOutcome::NeedsDisambiguation { request, pending } => {
            if let Some(chosen) = prompt_choice(&request)? {
                let narrowed = pipeline.continue_with_disambiguation(pending, chosen, request.slot);
                run_command(pipeline, world, &narrowed)?;
            }
        }
        ResolveOutcome::Resolved(resolved) => {
            if let Some(noun) = resolved.noun {
                world.mention(noun);
            }
            for event in pipeline.execute(&resolved, world) {
                print_event(world, &event);
            }
        }
    }
    Ok(())
}

fn prompt_choice(request: &DisambiguationRequest) -> Result<Option<EntityId>> {
    println!("{}", request.prompt);
    for (i, option) in request.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.label);
    }
    print!("? ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let choice = answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| request.options.get(n.wrapping_sub(1)));

    match choice {
        Some(option) => Ok(Some(option.entity)),
        None => {
            println!("Never mind, then.");
            Ok(None)
        }
    }
}

fn print_event(world: &StaticWorld, event: &ActionEvent) {
    match event {
        ActionEvent::Performed { note, .. } => {
            if let Some(note) = note {
                println!("{note}");
            }
        }
        ActionEvent::Failed { target, reason, .. } => {
            let subject = target
                .and_then(|id| world.entity(id))
                .map(|e| format!("{}: ", e.name))
                .unwrap_or_default();
            println!("{subject}{reason}");
        }
        ActionEvent::BatchCompleted {
            attempted,
            succeeded,
            failed,
            ..
        } => {
            println!(
                "({} attempted, {} done, {} failed)",
                attempted,
                succeeded.len(),
                failed.len()
            );
        }
    }
}

fn display_scope(world: &StaticWorld, player: EntityId) {
    let scope = world.scope_for(player);
    println!("In scope:");
    for id in scope.candidate_pool() {
        if let Some(entity) = world.entity(id) {
            let adjectives = if entity.adjectives.is_empty() {
                String::new()
            } else {
                format!("{} ", entity.adjectives.join(" "))
            };
            println!("  {}{}", adjectives, entity.name);
        }
    }
}

/// Two rooms, two keys, a locked chest, scenery, and a lantern
fn build_demo_world() -> (StaticWorld, EntityId) {
    let mut world = StaticWorld::new();

    let cellar = world.add(EntityInfo::room("cellar"));
    let landing = world.add(EntityInfo::room("landing"));
    {
        let cellar_info = world.entity_mut(cellar).unwrap();
        cellar_info.exits.insert("up".to_string(), landing);
        cellar_info.exits.insert("north".to_string(), landing);
    }
    world
        .entity_mut(landing)
        .unwrap()
        .exits
        .insert("down".to_string(), cellar);

    let player = world.add_in(EntityInfo::actor("player"), cellar);

    let chest = world.add_in(
        EntityInfo::thing("chest")
            .with_adjectives(&["oak"])
            .scenery()
            .container(false)
            .lockable(true),
        cellar,
    );
    world.add_in(
        EntityInfo::thing("key")
            .with_adjectives(&["brass"])
            .key_for(Some(chest)),
        cellar,
    );
    world.add_in(EntityInfo::thing("key").with_adjectives(&["iron"]).key_for(None), cellar);
    world.add_in(
        EntityInfo::thing("lantern")
            .with_adjectives(&["dented"])
            .with_synonyms(&["lamp"])
            .light_source(false),
        cellar,
    );
    world.add_in(
        EntityInfo::thing("candle").with_synonyms(&["taper"]).light_source(true),
        cellar,
    );
    world.add_in(
        EntityInfo::thing("altar").with_adjectives(&["stone"]).scenery(),
        cellar,
    );
    world.add_in(EntityInfo::thing("coin").with_adjectives(&["copper"]), chest);
    world.add_in(
        EntityInfo::thing("sword").with_adjectives(&["rusty"]).with_synonyms(&["blade"]),
        landing,
    );

    (world, player)
}
