//! Command resolution: ParsedCommand to concrete entities
//!
//! Runs the fixed sequence: actor lookup, ALL-expansion, noun
//! resolution, second-object resolution (with per-action inference),
//! spatial relation capture. Ambiguity suspends resolution; zero
//! matches is a typed hard failure; a missing actor is a programmer
//! contract violation and raises.

use crate::actions::registry::{ActionRegistry, AllScope, FailureReason};
use crate::command::disambiguation::{DisambiguationRequest, Disambiguator, SlotAssessment};
use crate::command::parser::ParsedCommand;
use crate::core::config::PipelineConfig;
use crate::core::error::{EmberError, Result};
use crate::core::types::{ActionId, EntityId, PatternId, Slot};
use crate::world::model::WorldModel;
use serde::{Deserialize, Serialize};

/// Prepositions that bind a spatial relation when a second entity
/// resolved
pub const SPATIAL_PREPOSITIONS: &[&str] =
    &["above", "below", "underneath", "behind", "under", "over"];

/// Prepositions marking an ALL-expansion exception clause
const EXCEPT_PREPOSITIONS: &[&str] = &["except", "but"];

/// A preposition bound to a reference entity ("under the bed")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialRef {
    pub preposition: String,
    pub reference: EntityId,
}

/// A command with every reference resolved to a concrete entity
///
/// Carries either a single noun or a non-empty `all_targets` list,
/// never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub action: ActionId,
    pub actor: EntityId,
    pub noun: Option<EntityId>,
    /// Collective targets in scope-enumeration order, capped at the
    /// configured batch size
    pub all_targets: Vec<EntityId>,
    /// Entities excluded from an ALL-expansion by an except clause
    pub exceptions: Vec<EntityId>,
    pub second: Option<EntityId>,
    pub preposition: Option<String>,
    pub spatial: Option<SpatialRef>,
    /// The second object was inferred, not named
    pub implicit_second: bool,
    pub direction: Option<String>,
    /// Originating pattern and raw input, kept for diagnostics
    pub pattern: PatternId,
    pub input: String,
}

impl ResolvedCommand {
    /// Whether the surface preposition denotes containment
    pub fn is_containing_preposition(&self) -> bool {
        matches!(
            self.preposition.as_deref(),
            Some("in" | "into" | "on" | "onto")
        )
    }
}

/// Result shape of a resolve call
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Resolved(ResolvedCommand),
    /// Resolution is suspended until a continuation supplies a choice
    NeedsDisambiguation {
        request: DisambiguationRequest,
        pending: ParsedCommand,
    },
    /// Nothing matched, or an action-specific precondition failed
    Failed { reason: String },
}

/// Resolves parsed commands against world state and action strategies
pub struct CommandResolver<'a> {
    world: &'a dyn WorldModel,
    registry: &'a ActionRegistry,
    config: &'a PipelineConfig,
}

impl<'a> CommandResolver<'a> {
    pub fn new(
        world: &'a dyn WorldModel,
        registry: &'a ActionRegistry,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            world,
            registry,
            config,
        }
    }

    /// Resolve a parsed command
    ///
    /// Returns `Err` only for contract violations (unknown actor id);
    /// every user-facing failure is a `ResolveOutcome` value.
    pub fn resolve(&self, parsed: &ParsedCommand) -> Result<ResolveOutcome> {
        // 1. Actor resolution: hard failure, not disambiguation
        if self.world.entity(parsed.actor).is_none() {
            return Err(EmberError::ActorNotFound(parsed.actor));
        }

        // 2. ALL-expansion short-circuits the remaining steps
        if parsed.match_all {
            return Ok(self.expand_all(parsed));
        }

        let disambiguator = Disambiguator::new(self.world, self.config);

        // 3. Noun resolution
        let noun = if parsed.noun_phrase.is_some() {
            match disambiguator.assess(Slot::Noun, &parsed.noun_candidates) {
                SlotAssessment::Empty => {
                    return Ok(ResolveOutcome::Failed {
                        reason: format!(
                            "I don't see any {} here.",
                            parsed.noun_phrase.as_deref().unwrap_or("such thing")
                        ),
                    });
                }
                SlotAssessment::Ambiguous(request) => {
                    return Ok(ResolveOutcome::NeedsDisambiguation {
                        request,
                        pending: parsed.clone(),
                    });
                }
                SlotAssessment::Single(m) => Some(m.entity),
            }
        } else {
            None
        };

        // 4. Second-object resolution, explicit or inferred
        let mut second = None;
        let mut implicit_second = false;
        if parsed.second_phrase.is_some() {
            match disambiguator.assess(Slot::Second, &parsed.second_candidates) {
                SlotAssessment::Empty => {
                    return Ok(ResolveOutcome::Failed {
                        reason: format!(
                            "I don't see any {} here.",
                            parsed.second_phrase.as_deref().unwrap_or("such thing")
                        ),
                    });
                }
                SlotAssessment::Ambiguous(request) => {
                    return Ok(ResolveOutcome::NeedsDisambiguation {
                        request,
                        pending: parsed.clone(),
                    });
                }
                SlotAssessment::Single(m) => second = Some(m.entity),
            }
        } else if parsed.allows_implicit_second {
            if let Some(infer) = self
                .registry
                .get(&parsed.action)
                .and_then(|def| def.infer_second.as_ref())
            {
                match infer(self.world, parsed.actor, noun) {
                    Some(inferred) => {
                        tracing::debug!(
                            action = %parsed.action,
                            second = ?inferred,
                            "implicit second object inferred"
                        );
                        second = Some(inferred);
                        implicit_second = true;
                    }
                    None => {
                        return Ok(ResolveOutcome::Failed {
                            reason: format!(
                                "You have nothing to {} that with.",
                                parsed.action
                            ),
                        });
                    }
                }
            }
        }

        // 5. Spatial relation capture
        let spatial = match (&parsed.preposition, second) {
            (Some(prep), Some(reference))
                if SPATIAL_PREPOSITIONS.contains(&prep.as_str()) =>
            {
                Some(SpatialRef {
                    preposition: prep.clone(),
                    reference,
                })
            }
            _ => None,
        };

        Ok(ResolveOutcome::Resolved(ResolvedCommand {
            action: parsed.action.clone(),
            actor: parsed.actor,
            noun,
            all_targets: Vec::new(),
            exceptions: Vec::new(),
            second,
            preposition: parsed.preposition.clone(),
            spatial,
            implicit_second,
            direction: parsed.direction.clone(),
            pattern: parsed.pattern.clone(),
            input: parsed.input.clone(),
        }))
    }

    /// Expand a collective target into a concrete, capped entity list
    fn expand_all(&self, parsed: &ParsedCommand) -> ResolveOutcome {
        let disambiguator = Disambiguator::new(self.world, self.config);
        let definition = self.registry.get(&parsed.action);

        // Candidate scope: an explicitly named container, or the
        // action's default enumeration source
        let mut candidates: Vec<EntityId> = if parsed.noun_phrase.is_some() {
            let container = match disambiguator.assess(Slot::Noun, &parsed.noun_candidates) {
                SlotAssessment::Empty => {
                    return ResolveOutcome::Failed {
                        reason: format!(
                            "I don't see any {} here.",
                            parsed.noun_phrase.as_deref().unwrap_or("such thing")
                        ),
                    };
                }
                SlotAssessment::Ambiguous(request) => {
                    return ResolveOutcome::NeedsDisambiguation {
                        request,
                        pending: parsed.clone(),
                    };
                }
                SlotAssessment::Single(m) => m.entity,
            };
            self.world.contents_of(container)
        } else {
            let scope_source = definition.map(|d| d.all_scope).unwrap_or_default();
            match scope_source {
                AllScope::Inventory => self.world.contents_of(parsed.actor),
                AllScope::Location => match self.world.location_of(parsed.actor) {
                    Some(location) => self.world.contents_of(location),
                    None => {
                        return ResolveOutcome::Failed {
                            reason: "There is nothing here.".to_string(),
                        };
                    }
                },
            }
        };

        // Except clause: every candidate the exception phrase matched
        let mut exceptions = Vec::new();
        if parsed
            .preposition
            .as_deref()
            .map(|p| EXCEPT_PREPOSITIONS.contains(&p))
            .unwrap_or(false)
        {
            for m in &parsed.second_candidates {
                if candidates.contains(&m.entity) {
                    exceptions.push(m.entity);
                }
            }
            candidates.retain(|id| !exceptions.contains(id));
        }

        // Eligibility: silently drop only categorical non-targets; the
        // rest stay in the batch so per-target failures get reported
        if let Some(eligible) = definition.and_then(|d| d.all_eligible.as_ref()) {
            candidates.retain(|&id| {
                !matches!(
                    eligible(self.world, parsed.actor, id),
                    Err(FailureReason::SelfTarget) | Err(FailureReason::RoomTarget)
                )
            });
        } else {
            candidates.retain(|&id| id != parsed.actor);
        }

        if candidates.len() > self.config.max_batch_targets {
            tracing::debug!(
                total = candidates.len(),
                cap = self.config.max_batch_targets,
                "ALL-expansion truncated to batch cap"
            );
            candidates.truncate(self.config.max_batch_targets);
        }

        if candidates.is_empty() {
            return ResolveOutcome::Failed {
                reason: format!("There is nothing here to {}.", parsed.action),
            };
        }

        ResolveOutcome::Resolved(ResolvedCommand {
            action: parsed.action.clone(),
            actor: parsed.actor,
            noun: None,
            all_targets: candidates,
            exceptions,
            second: None,
            preposition: parsed.preposition.clone(),
            spatial: None,
            implicit_second: false,
            direction: parsed.direction.clone(),
            pattern: parsed.pattern.clone(),
            input: parsed.input.clone(),
        })
    }
}
