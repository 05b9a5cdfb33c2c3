//! Fuzzy scoring of noun phrases against scope entities
//!
//! Each candidate accumulates name/synonym/adjective/partial bonuses
//! plus scope and recency bonuses, then pays a multiplicative penalty
//! for phrase words it failed to match. Pronouns bypass scoring and
//! bind to the most recent mention.

use crate::core::config::PipelineConfig;
use crate::core::types::EntityId;
use crate::grammar::vocabulary::{is_article, is_pronoun};
use crate::world::entity::EntityInfo;
use crate::world::model::WorldModel;
use crate::world::scope::ScopeContext;
use serde::{Deserialize, Serialize};

/// How a candidate matched the phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    Exact,
    Partial,
    Synonym,
    Pronoun,
    /// Bound by inference rather than by words the player typed
    Implied,
}

/// One scored candidate for a command slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub entity: EntityId,
    pub score: f32,
    pub matched_words: Vec<String>,
    pub kind: MatchKind,
}

/// Lowercase, strip punctuation and articles, fold naive plurals
pub fn normalize_phrase(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty() && !is_article(w))
        .map(|w| if is_pronoun(&w) { w } else { lemma(&w) })
        .collect()
}

/// Naive lemmatization: fold a trailing plural `s`, leaving `ss`
/// endings ("brass", "glass") alone
fn lemma(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Scores candidate entities against a normalized noun phrase
pub struct EntityScorer<'a> {
    world: &'a dyn WorldModel,
    config: &'a PipelineConfig,
}

impl<'a> EntityScorer<'a> {
    pub fn new(world: &'a dyn WorldModel, config: &'a PipelineConfig) -> Self {
        Self { world, config }
    }

    /// Score every scope candidate against the phrase, descending,
    /// floor-filtered, no duplicate entities
    pub fn score_phrase(&self, words: &[String], scope: &ScopeContext) -> Vec<ScoredMatch> {
        if words.is_empty() {
            return Vec::new();
        }

        // Pronouns bind to the most recent mention or nothing at all
        if words.len() == 1 && is_pronoun(&words[0]) {
            return match scope.recent.first() {
                Some(&referent) => vec![ScoredMatch {
                    entity: referent,
                    score: self.config.pronoun_score,
                    matched_words: words.to_vec(),
                    kind: MatchKind::Pronoun,
                }],
                None => Vec::new(),
            };
        }

        let mut matches: Vec<ScoredMatch> = scope
            .candidate_pool()
            .into_iter()
            .filter_map(|id| self.world.entity(id))
            .filter_map(|entity| self.score_entity(entity, words, scope))
            .filter(|m| m.score >= self.config.score_floor)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches
    }

    fn score_entity(
        &self,
        entity: &EntityInfo,
        words: &[String],
        scope: &ScopeContext,
    ) -> Option<ScoredMatch> {
        let config = self.config;
        let name_lemma = lemma(&entity.name.to_lowercase());
        let synonyms: Vec<String> = entity
            .synonyms
            .iter()
            .map(|s| lemma(&s.to_lowercase()))
            .collect();
        let adjectives: Vec<String> = entity.adjectives.iter().map(|a| a.to_lowercase()).collect();

        let mut score = 0.0;
        let mut matched_words = Vec::new();
        let mut kind: Option<MatchKind> = None;

        for word in words {
            if *word == name_lemma {
                score += config.exact_name_bonus;
                matched_words.push(word.clone());
                kind = Some(strongest(kind, MatchKind::Exact));
            } else if synonyms.iter().any(|s| s == word) {
                score += config.synonym_bonus;
                matched_words.push(word.clone());
                kind = Some(strongest(kind, MatchKind::Synonym));
            } else if adjectives.iter().any(|a| a == word) {
                score += config.adjective_bonus;
                matched_words.push(word.clone());
            } else if word.len() >= 3 && name_lemma.contains(word.as_str()) {
                score += config.partial_name_bonus;
                matched_words.push(word.clone());
                kind = Some(strongest(kind, MatchKind::Partial));
            }
        }

        // An entity matching zero words is not a candidate at all
        if matched_words.is_empty() {
            return None;
        }

        if scope.is_visible(entity.id) {
            score += config.visible_bonus;
        }
        if scope.is_reachable(entity.id) {
            score += config.reachable_bonus;
        }
        if let Some(position) = scope.recency_of(entity.id) {
            score += config.recency_bonus / (1.0 + position as f32);
        }

        // Unmatched phrase words drag the score down proportionally
        let matched_fraction = matched_words.len() as f32 / words.len() as f32;
        score *= matched_fraction;

        Some(ScoredMatch {
            entity: entity.id,
            score,
            matched_words,
            kind: kind.unwrap_or(MatchKind::Partial),
        })
    }
}

fn strongest(current: Option<MatchKind>, candidate: MatchKind) -> MatchKind {
    fn rank(kind: MatchKind) -> u8 {
        match kind {
            MatchKind::Exact => 3,
            MatchKind::Synonym => 2,
            MatchKind::Partial => 1,
            MatchKind::Pronoun | MatchKind::Implied => 0,
        }
    }
    match current {
        Some(current) if rank(current) >= rank(candidate) => current,
        _ => candidate,
    }
}
