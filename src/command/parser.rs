//! Text to ParsedCommand via grammar pattern matching
//!
//! The parser owns the registered pattern set and its compiled form.
//! Patterns are tried in registration order against each normalized
//! input segment; the first match wins and its slot phrases are scored
//! against the supplied scope.

use crate::command::disambiguation::{
    DisambiguationRequest, Disambiguator, SlotAssessment,
};
use crate::core::config::PipelineConfig;
use crate::core::error::{EmberError, Result};
use crate::core::types::{ActionId, EntityId, PatternId, Slot};
use crate::grammar::compiler::{CompiledGrammar, CompiledPattern, PatternMatch};
use crate::grammar::pattern::GrammarPattern;
use crate::grammar::vocabulary::{is_pronoun, DirectionTable};
use crate::score::scorer::{normalize_phrase, EntityScorer, ScoredMatch};
use crate::world::model::WorldModel;
use crate::world::scope::ScopeContext;
use serde::{Deserialize, Serialize};

/// One grammatically matched command with scored slot candidates
///
/// A candidate list longer than one means the slot is still ambiguous.
/// Produced once per parse call and either terminal or consumed
/// immediately by the resolver; the only value persisted across turns
/// is the `pending` payload of a disambiguation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub action: ActionId,
    pub actor: EntityId,
    pub noun_phrase: Option<String>,
    pub second_phrase: Option<String>,
    pub noun_candidates: Vec<ScoredMatch>,
    pub second_candidates: Vec<ScoredMatch>,
    pub preposition: Option<String>,
    /// Canonical direction name, for movement patterns
    pub direction: Option<String>,
    pub pattern: PatternId,
    /// The input segment this command was parsed from
    pub input: String,
    pub confidence: f32,
    pub match_all: bool,
    pub allows_implicit_second: bool,
}

/// Result shape of a parse call
///
/// Zero-match failure and ambiguity are distinct: the caller branches
/// between "nothing matched" narration and a player prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Success {
        commands: Vec<ParsedCommand>,
    },
    NeedsDisambiguation {
        request: DisambiguationRequest,
        pending: ParsedCommand,
    },
    Failure {
        error: String,
    },
}

enum SegmentOutcome {
    Command(ParsedCommand),
    Ambiguous {
        request: DisambiguationRequest,
        pending: ParsedCommand,
    },
    Failed(String),
}

/// Grammar registry plus compiled cache; the parse entry point
pub struct CommandParser {
    patterns: Vec<GrammarPattern>,
    compiled: CompiledGrammar,
    directions: DirectionTable,
    config: PipelineConfig,
}

impl CommandParser {
    pub fn new(config: PipelineConfig, directions: DirectionTable) -> Self {
        Self {
            patterns: Vec::new(),
            compiled: CompiledGrammar::default(),
            directions,
            config,
        }
    }

    /// Build a parser with an initial pattern set, rejecting any
    /// malformed template up front
    pub fn with_patterns(
        config: PipelineConfig,
        directions: DirectionTable,
        patterns: Vec<GrammarPattern>,
    ) -> Result<Self> {
        let mut parser = Self::new(config, directions);
        for pattern in patterns {
            parser.add_grammar(pattern)?;
        }
        Ok(parser)
    }

    /// Register a pattern, effective for the very next parse call
    ///
    /// The template is compiled (and rejected) here, at registration
    /// time, and the entire compiled cache is rebuilt so it can never
    /// disagree with the pattern set.
    pub fn add_grammar(&mut self, pattern: GrammarPattern) -> Result<()> {
        if self.patterns.iter().any(|p| p.id == pattern.id) {
            return Err(EmberError::Grammar {
                id: pattern.id.as_str().to_string(),
                reason: "duplicate pattern id".to_string(),
            });
        }

        // Loud failure now, never at parse time
        crate::grammar::compiler::compile(&pattern, &self.directions)?;

        self.patterns.push(pattern);
        self.compiled = CompiledGrammar::build(&self.patterns, &self.directions)?;
        tracing::debug!(patterns = self.patterns.len(), "grammar cache rebuilt");
        Ok(())
    }

    /// The full current pattern set, in registration order
    pub fn grammar_patterns(&self) -> &[GrammarPattern] {
        &self.patterns
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse raw input into commands against the supplied scope
    pub fn parse(
        &self,
        text: &str,
        scope: &ScopeContext,
        world: &dyn WorldModel,
    ) -> ParseOutcome {
        let input = text.trim();
        if input.is_empty() {
            return ParseOutcome::Failure {
                error: "I beg your pardon?".to_string(),
            };
        }

        let mut commands = Vec::new();
        for segment in split_commands(input) {
            match self.match_segment(&segment, scope, world) {
                SegmentOutcome::Command(command) => commands.push(command),
                SegmentOutcome::Ambiguous { request, pending } => {
                    // Suspend on the first ambiguous segment; the
                    // caller resumes it via the continuation
                    return ParseOutcome::NeedsDisambiguation { request, pending };
                }
                SegmentOutcome::Failed(error) => return ParseOutcome::Failure { error },
            }
        }

        ParseOutcome::Success { commands }
    }

    fn match_segment(
        &self,
        segment: &str,
        scope: &ScopeContext,
        world: &dyn WorldModel,
    ) -> SegmentOutcome {
        let cleaned = segment
            .to_lowercase()
            .trim_end_matches(['.', '!', '?'])
            .trim()
            .to_string();

        for compiled in self.compiled.iter() {
            let Some(captures) = compiled.matches(&cleaned) else {
                continue;
            };
            tracing::debug!(
                pattern = %compiled.pattern.id,
                input = %cleaned,
                "grammar pattern matched"
            );
            return self.build_command(compiled, captures, &cleaned, scope, world);
        }

        SegmentOutcome::Failed(format!("I don't understand \"{segment}\"."))
    }

    fn build_command(
        &self,
        compiled: &CompiledPattern,
        captures: PatternMatch,
        input: &str,
        scope: &ScopeContext,
        world: &dyn WorldModel,
    ) -> SegmentOutcome {
        let pattern = &compiled.pattern;
        let scorer = EntityScorer::new(world, &self.config);

        let noun_candidates = match &captures.noun {
            Some(phrase) => {
                let candidates = scorer.score_phrase(&normalize_phrase(phrase), scope);
                if candidates.is_empty() {
                    return SegmentOutcome::Failed(missing_referent(phrase));
                }
                candidates
            }
            None => Vec::new(),
        };

        let second_candidates = match &captures.second {
            Some(phrase) => {
                let candidates = scorer.score_phrase(&normalize_phrase(phrase), scope);
                if candidates.is_empty() {
                    return SegmentOutcome::Failed(missing_referent(phrase));
                }
                candidates
            }
            None => Vec::new(),
        };

        let direction = captures
            .direction
            .as_deref()
            .and_then(|d| self.directions.canonicalize(d))
            .map(|d| d.to_string());

        let command = ParsedCommand {
            action: pattern.action.clone(),
            actor: scope.actor,
            noun_phrase: captures.noun,
            second_phrase: captures.second,
            noun_candidates,
            second_candidates,
            preposition: captures.preposition,
            direction,
            pattern: pattern.id.clone(),
            input: input.to_string(),
            confidence: compiled.literal_fraction(),
            match_all: pattern.flags.match_all,
            allows_implicit_second: pattern.flags.allows_implicit_second,
        };

        // Close-scored candidates suspend the command right here
        let disambiguator = Disambiguator::new(world, &self.config);
        if command.noun_candidates.len() > 1 {
            if let SlotAssessment::Ambiguous(request) =
                disambiguator.assess(Slot::Noun, &command.noun_candidates)
            {
                return SegmentOutcome::Ambiguous {
                    request,
                    pending: command,
                };
            }
        }
        // An ALL exception clause keeps every match it names, so only
        // single-target commands disambiguate the second slot
        if !command.match_all && command.second_candidates.len() > 1 {
            if let SlotAssessment::Ambiguous(request) =
                disambiguator.assess(Slot::Second, &command.second_candidates)
            {
                return SegmentOutcome::Ambiguous {
                    request,
                    pending: command,
                };
            }
        }

        SegmentOutcome::Command(command)
    }
}

fn missing_referent(phrase: &str) -> String {
    let words = normalize_phrase(phrase);
    if words.len() == 1 && is_pronoun(&words[0]) {
        format!("I'm not sure what \"{phrase}\" refers to.")
    } else {
        format!("I don't see any {phrase} here.")
    }
}

/// Split multi-command input on "then" and sentence breaks
fn split_commands(input: &str) -> Vec<String> {
    input
        .replace(" and then ", " then ")
        .split(" then ")
        .flat_map(|part| part.split(". "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::vocabulary::english_patterns;
    use crate::world::entity::EntityInfo;
    use crate::world::model::StaticWorld;

    fn english_parser() -> CommandParser {
        CommandParser::with_patterns(
            PipelineConfig::default(),
            DirectionTable::english(),
            english_patterns(),
        )
        .unwrap()
    }

    fn cellar_world() -> (StaticWorld, EntityId, EntityId, EntityId) {
        let mut world = StaticWorld::new();
        let cellar = world.add(EntityInfo::room("cellar"));
        let player = world.add_in(EntityInfo::actor("player"), cellar);
        let brass = world.add_in(EntityInfo::thing("key").with_adjectives(&["brass"]), cellar);
        let iron = world.add_in(EntityInfo::thing("key").with_adjectives(&["iron"]), cellar);
        (world, player, brass, iron)
    }

    #[test]
    fn test_parse_single_command() {
        let parser = english_parser();
        let (mut world, player, _, _) = cellar_world();
        let lantern = world.add_in(EntityInfo::thing("lantern"), world.location_of(player).unwrap());
        let scope = world.scope_for(player);

        let outcome = parser.parse("take the lantern", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].action, ActionId::from("take"));
        assert_eq!(commands[0].noun_candidates.len(), 1);
        assert_eq!(commands[0].noun_candidates[0].entity, lantern);
        assert_eq!(commands[0].actor, player);
    }

    #[test]
    fn test_unmatched_input_fails_typed() {
        let parser = english_parser();
        let (world, player, _, _) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("frobnicate widget", &scope, &world);
        let ParseOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert!(error.contains("frobnicate widget"));
    }

    #[test]
    fn test_two_keys_need_disambiguation() {
        let parser = english_parser();
        let (world, player, brass, iron) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("take key", &scope, &world);
        let ParseOutcome::NeedsDisambiguation { request, pending } = outcome else {
            panic!("expected disambiguation, got {outcome:?}");
        };
        assert_eq!(request.slot, Slot::Noun);
        let option_ids: Vec<EntityId> = request.options.iter().map(|o| o.entity).collect();
        assert!(option_ids.contains(&brass) && option_ids.contains(&iron));
        assert_eq!(pending.noun_candidates.len(), 2);
    }

    #[test]
    fn test_adjective_skips_disambiguation() {
        let parser = english_parser();
        let (world, player, _, iron) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("take iron key", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(commands[0].noun_candidates[0].entity, iron);
    }

    #[test]
    fn test_missing_referent_fails() {
        let parser = english_parser();
        let (world, player, _, _) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("take unicorn", &scope, &world);
        let ParseOutcome::Failure { error } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error, "I don't see any unicorn here.");
    }

    #[test]
    fn test_added_grammar_matches_next_parse() {
        let mut parser = english_parser();
        let (world, player, brass, _) = cellar_world();
        let scope = world.scope_for(player);

        assert!(matches!(
            parser.parse("polish brass key", &scope, &world),
            ParseOutcome::Failure { .. }
        ));

        parser
            .add_grammar(GrammarPattern::new("polish", "polish|shine <noun>", "polish"))
            .unwrap();

        let outcome = parser.parse("polish brass key", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success after registration, got {outcome:?}");
        };
        assert_eq!(commands[0].action, ActionId::from("polish"));
        assert_eq!(commands[0].noun_candidates[0].entity, brass);
    }

    #[test]
    fn test_duplicate_pattern_id_rejected() {
        let mut parser = english_parser();
        let result = parser.add_grammar(GrammarPattern::new("take", "steal <noun>", "take"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_template_rejected_at_registration() {
        let mut parser = english_parser();
        let result =
            parser.add_grammar(GrammarPattern::new("bad", "poke <thing>", "poke"));
        assert!(matches!(result, Err(EmberError::Grammar { .. })));
        // The bad pattern never entered the registry
        assert!(parser.grammar_patterns().iter().all(|p| p.id.as_str() != "bad"));
    }

    #[test]
    fn test_bare_direction_parses_as_go() {
        let parser = english_parser();
        let (world, player, _, _) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("n", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success");
        };
        assert_eq!(commands[0].action, ActionId::from("go"));
        assert_eq!(commands[0].direction.as_deref(), Some("north"));
    }

    #[test]
    fn test_multi_command_split() {
        let parser = english_parser();
        let (world, player, _, iron) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("take iron key then go north", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success");
        };
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].noun_candidates[0].entity, iron);
        assert_eq!(commands[1].direction.as_deref(), Some("north"));
    }

    #[test]
    fn test_take_all_sets_match_all() {
        let parser = english_parser();
        let (world, player, _, _) = cellar_world();
        let scope = world.scope_for(player);

        let outcome = parser.parse("take all", &scope, &world);
        let ParseOutcome::Success { commands } = outcome else {
            panic!("expected success");
        };
        assert!(commands[0].match_all);
        assert!(commands[0].noun_candidates.is_empty());
    }

    #[test]
    fn test_empty_input_fails_politely() {
        let parser = english_parser();
        let (world, player, _, _) = cellar_world();
        let scope = world.scope_for(player);
        assert!(matches!(
            parser.parse("   ", &scope, &world),
            ParseOutcome::Failure { .. }
        ));
    }
}
