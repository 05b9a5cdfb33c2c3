//! Declarative grammar pattern records
//!
//! A pattern maps a surface template ("take|get all from <noun>") to a
//! canonical action id. Templates hold pipe-separated verb synonyms
//! and slot markers; the compiler in this module's sibling turns them
//! into anchored regular expressions.

use crate::core::types::{ActionId, PatternId};
use serde::{Deserialize, Serialize};

/// Behavioral flags carried by a grammar pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFlags {
    /// The pattern names a collective target ("take all")
    pub match_all: bool,
    /// The template must bind a second object to be well-formed
    pub requires_second: bool,
    /// A missing second object may be inferred from the actor's
    /// held items ("unlock door" finding a key)
    pub allows_implicit_second: bool,
    /// The surface order names the second object before the noun;
    /// captures are swapped after a match
    pub reversed: bool,
}

/// A declarative grammar template mapped to an action
///
/// Immutable once registered; registering any new pattern invalidates
/// every derived compiled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPattern {
    pub id: PatternId,
    pub template: String,
    pub action: ActionId,
    /// Words the `<prep>` marker may capture, in preference order
    #[serde(default)]
    pub prepositions: Vec<String>,
    #[serde(default)]
    pub flags: PatternFlags,
}

impl GrammarPattern {
    pub fn new(
        id: impl Into<PatternId>,
        template: impl Into<String>,
        action: impl Into<ActionId>,
    ) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
            action: action.into(),
            prepositions: Vec::new(),
            flags: PatternFlags::default(),
        }
    }

    pub fn with_prepositions(mut self, prepositions: &[&str]) -> Self {
        self.prepositions = prepositions.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn match_all(mut self) -> Self {
        self.flags.match_all = true;
        self
    }

    pub fn requires_second(mut self) -> Self {
        self.flags.requires_second = true;
        self
    }

    pub fn allows_implicit_second(mut self) -> Self {
        self.flags.allows_implicit_second = true;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.flags.reversed = true;
        self
    }
}
