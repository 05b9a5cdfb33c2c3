//! Disambiguation: deciding when a candidate list needs a follow-up
//! prompt, and narrowing an in-flight command once the player chooses
//!
//! Not an error path. A request is a suspended success: resolution
//! pauses until exactly one continuation call supplies the chosen
//! entity id and the slot it belongs to.

use crate::core::config::PipelineConfig;
use crate::core::types::{EntityId, Slot};
use crate::score::scorer::ScoredMatch;
use crate::command::parser::ParsedCommand;
use crate::world::model::WorldModel;
use serde::{Deserialize, Serialize};

/// One candidate offered to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationOption {
    pub entity: EntityId,
    /// Human-readable discriminator ("the brass one")
    pub label: String,
}

/// A prompt asking the player to choose between close candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationRequest {
    pub prompt: String,
    /// Ranked options, best first, capped by configuration
    pub options: Vec<DisambiguationOption>,
    /// Which slot of the in-flight command is ambiguous
    pub slot: Slot,
}

/// Outcome of assessing one slot's candidate list
#[derive(Debug, Clone, PartialEq)]
pub enum SlotAssessment {
    /// Nothing in scope matched
    Empty,
    /// A clear winner
    Single(ScoredMatch),
    /// Top candidates too close to pick automatically
    Ambiguous(DisambiguationRequest),
}

/// Applies the margin rule to scored candidate lists
pub struct Disambiguator<'a> {
    world: &'a dyn WorldModel,
    config: &'a PipelineConfig,
}

impl<'a> Disambiguator<'a> {
    pub fn new(world: &'a dyn WorldModel, config: &'a PipelineConfig) -> Self {
        Self { world, config }
    }

    /// Decide whether a sorted candidate list resolves, prompts, or
    /// comes up empty
    pub fn assess(&self, slot: Slot, matches: &[ScoredMatch]) -> SlotAssessment {
        match matches {
            [] => SlotAssessment::Empty,
            [only] => SlotAssessment::Single(only.clone()),
            [top, second, ..] => {
                if top.score - second.score >= self.config.disambiguation_margin {
                    SlotAssessment::Single(top.clone())
                } else {
                    SlotAssessment::Ambiguous(self.build_request(slot, matches))
                }
            }
        }
    }

    fn build_request(&self, slot: Slot, matches: &[ScoredMatch]) -> DisambiguationRequest {
        let options: Vec<DisambiguationOption> = matches
            .iter()
            .take(self.config.max_disambiguation_options)
            .map(|m| DisambiguationOption {
                entity: m.entity,
                label: self.discriminator(m),
            })
            .collect();

        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        let prompt = match labels.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("Which do you mean, {} or {}?", rest.join(", "), last)
            }
            _ => "Which do you mean?".to_string(),
        };

        DisambiguationRequest {
            prompt,
            options,
            slot,
        }
    }

    /// Short label built from the adjectives the phrase did not
    /// already use: "the brass one", falling back to the entity name
    fn discriminator(&self, candidate: &ScoredMatch) -> String {
        let Some(entity) = self.world.entity(candidate.entity) else {
            return "that".to_string();
        };

        let unused: Vec<&str> = entity
            .adjectives
            .iter()
            .map(|a| a.as_str())
            .filter(|a| !candidate.matched_words.iter().any(|w| w == a))
            .collect();

        if unused.is_empty() {
            format!("the {}", entity.name)
        } else {
            format!("the {} one", unused.join(" "))
        }
    }
}

/// Narrow the named slot of an in-flight command to the chosen entity
///
/// Every other field is untouched, and applying the same choice twice
/// is idempotent.
pub fn continue_with_disambiguation(
    mut parsed: ParsedCommand,
    chosen: EntityId,
    slot: Slot,
) -> ParsedCommand {
    let candidates = match slot {
        Slot::Noun => &mut parsed.noun_candidates,
        Slot::Second => &mut parsed.second_candidates,
    };
    candidates.retain(|m| m.entity == chosen);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::scorer::MatchKind;
    use crate::world::entity::EntityInfo;
    use crate::world::model::StaticWorld;

    fn scored(entity: EntityId, score: f32, matched: &[&str]) -> ScoredMatch {
        ScoredMatch {
            entity,
            score,
            matched_words: matched.iter().map(|w| w.to_string()).collect(),
            kind: MatchKind::Exact,
        }
    }

    fn keys_world() -> (StaticWorld, EntityId, EntityId) {
        let mut world = StaticWorld::new();
        let brass = world.add(EntityInfo::thing("key").with_adjectives(&["brass"]));
        let iron = world.add(EntityInfo::thing("key").with_adjectives(&["iron"]));
        (world, brass, iron)
    }

    #[test]
    fn test_single_candidate_never_prompts() {
        let (world, brass, _) = keys_world();
        let config = PipelineConfig::default();
        let disambiguator = Disambiguator::new(&world, &config);

        let assessment = disambiguator.assess(Slot::Noun, &[scored(brass, 70.0, &["key"])]);
        assert!(matches!(assessment, SlotAssessment::Single(m) if m.entity == brass));
    }

    #[test]
    fn test_wide_gap_resolves_to_leader() {
        let (world, brass, iron) = keys_world();
        let config = PipelineConfig::default();
        let disambiguator = Disambiguator::new(&world, &config);

        let assessment = disambiguator.assess(
            Slot::Noun,
            &[scored(iron, 95.0, &["iron", "key"]), scored(brass, 35.0, &["key"])],
        );
        assert!(matches!(assessment, SlotAssessment::Single(m) if m.entity == iron));
    }

    #[test]
    fn test_close_scores_prompt_with_discriminators() {
        let (world, brass, iron) = keys_world();
        let config = PipelineConfig::default();
        let disambiguator = Disambiguator::new(&world, &config);

        let assessment = disambiguator.assess(
            Slot::Noun,
            &[scored(brass, 70.0, &["key"]), scored(iron, 70.0, &["key"])],
        );
        let SlotAssessment::Ambiguous(request) = assessment else {
            panic!("expected a prompt");
        };
        assert_eq!(request.slot, Slot::Noun);
        assert_eq!(request.options.len(), 2);
        assert_eq!(request.options[0].label, "the brass one");
        assert_eq!(request.options[1].label, "the iron one");
        assert!(request.prompt.contains("the brass one"));
    }

    #[test]
    fn test_option_list_caps_at_configured_max() {
        let mut world = StaticWorld::new();
        let config = PipelineConfig::default();
        let candidates: Vec<ScoredMatch> = (0..8)
            .map(|i| {
                let id = world.add(EntityInfo::thing("coin"));
                scored(id, 70.0 - i as f32, &["coin"])
            })
            .collect();

        let disambiguator = Disambiguator::new(&world, &config);
        let SlotAssessment::Ambiguous(request) = disambiguator.assess(Slot::Noun, &candidates)
        else {
            panic!("expected a prompt");
        };
        assert_eq!(request.options.len(), config.max_disambiguation_options);
        // Ranked best first
        assert_eq!(request.options[0].entity, candidates[0].entity);
    }

    #[test]
    fn test_empty_list_is_empty_assessment() {
        let (world, _, _) = keys_world();
        let config = PipelineConfig::default();
        let disambiguator = Disambiguator::new(&world, &config);
        assert_eq!(disambiguator.assess(Slot::Noun, &[]), SlotAssessment::Empty);
    }
}
