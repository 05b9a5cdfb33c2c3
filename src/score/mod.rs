//! Fuzzy entity scoring against noun phrases

pub mod scorer;

pub use scorer::{normalize_phrase, EntityScorer, MatchKind, ScoredMatch};
