//! The assembled command pipeline
//!
//! Bundles the parser, the action registry, and the executor behind
//! the operations a runtime calls: parse, continue a disambiguation,
//! resolve, execute, and maintain the grammar registry. Registries are
//! populated at startup and read-mostly afterwards.

use crate::actions::builtin::register_builtin_actions;
use crate::actions::registry::{ActionDefinition, ActionRegistry};
use crate::command::disambiguation;
use crate::command::executor::{ActionEvent, ActionExecutor};
use crate::command::parser::{CommandParser, ParseOutcome, ParsedCommand};
use crate::command::resolver::{CommandResolver, ResolveOutcome, ResolvedCommand};
use crate::core::config::PipelineConfig;
use crate::core::error::{EmberError, Result};
use crate::core::types::{EntityId, Slot};
use crate::grammar::pattern::GrammarPattern;
use crate::grammar::vocabulary::{english_patterns, DirectionTable};
use crate::world::model::WorldModel;
use crate::world::scope::ScopeContext;

pub struct CommandPipeline {
    parser: CommandParser,
    registry: ActionRegistry,
    config: PipelineConfig,
}

impl CommandPipeline {
    /// An empty pipeline: no grammar, no actions
    pub fn new(config: PipelineConfig, directions: DirectionTable) -> Result<Self> {
        config.validate().map_err(EmberError::Config)?;
        Ok(Self {
            parser: CommandParser::new(config.clone(), directions),
            registry: ActionRegistry::new(),
            config,
        })
    }

    /// A pipeline loaded with the default English grammar and the
    /// builtin action set
    pub fn english(config: PipelineConfig) -> Result<Self> {
        config.validate().map_err(EmberError::Config)?;
        let parser = CommandParser::with_patterns(
            config.clone(),
            DirectionTable::english(),
            english_patterns(),
        )?;
        let mut registry = ActionRegistry::new();
        register_builtin_actions(&mut registry);
        tracing::info!(
            patterns = parser.grammar_patterns().len(),
            actions = registry.len(),
            "command pipeline ready"
        );
        Ok(Self {
            parser,
            registry,
            config,
        })
    }

    /// Register a grammar pattern, matchable on the very next parse
    pub fn add_grammar(&mut self, pattern: GrammarPattern) -> Result<()> {
        self.parser.add_grammar(pattern)
    }

    pub fn grammar_patterns(&self) -> &[GrammarPattern] {
        self.parser.grammar_patterns()
    }

    /// Register an action definition with its resolver strategies
    pub fn register_action(&mut self, definition: ActionDefinition) {
        self.registry.register(definition);
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse raw input against a scope
    pub fn parse(
        &self,
        text: &str,
        scope: &ScopeContext,
        world: &dyn WorldModel,
    ) -> ParseOutcome {
        self.parser.parse(text, scope, world)
    }

    /// Narrow a suspended command to the chosen entity; idempotent
    pub fn continue_with_disambiguation(
        &self,
        pending: ParsedCommand,
        chosen: EntityId,
        slot: Slot,
    ) -> ParsedCommand {
        disambiguation::continue_with_disambiguation(pending, chosen, slot)
    }

    /// Resolve a parsed command; raises only on a missing actor
    pub fn resolve(
        &self,
        parsed: &ParsedCommand,
        world: &dyn WorldModel,
    ) -> Result<ResolveOutcome> {
        CommandResolver::new(world, &self.registry, &self.config).resolve(parsed)
    }

    /// Dispatch a resolved command, returning the resulting events
    pub fn execute(
        &self,
        resolved: &ResolvedCommand,
        world: &mut dyn WorldModel,
    ) -> Vec<ActionEvent> {
        ActionExecutor::execute(&self.registry, world, resolved)
    }
}
