//! Language data: direction tables, pronouns, articles, and the
//! default English grammar set
//!
//! Vocabulary is configuration, not code. The pipeline consumes these
//! tables; a different language supplies different ones.

use crate::grammar::pattern::GrammarPattern;
use ahash::AHashMap;

/// Direction names, canonical plus abbreviations
#[derive(Debug, Clone)]
pub struct DirectionTable {
    canonical: Vec<String>,
    abbreviations: AHashMap<String, String>,
}

impl DirectionTable {
    pub fn new(canonical: &[&str], abbreviations: &[(&str, &str)]) -> Self {
        Self {
            canonical: canonical.iter().map(|d| d.to_string()).collect(),
            abbreviations: abbreviations
                .iter()
                .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
                .collect(),
        }
    }

    /// Standard English compass and vertical directions
    pub fn english() -> Self {
        Self::new(
            &[
                "north",
                "south",
                "east",
                "west",
                "northeast",
                "northwest",
                "southeast",
                "southwest",
                "up",
                "down",
            ],
            &[
                ("n", "north"),
                ("s", "south"),
                ("e", "east"),
                ("w", "west"),
                ("ne", "northeast"),
                ("nw", "northwest"),
                ("se", "southeast"),
                ("sw", "southwest"),
                ("u", "up"),
                ("d", "down"),
            ],
        )
    }

    /// Resolve a direction word (canonical or abbreviation) to its
    /// canonical name
    pub fn canonicalize(&self, word: &str) -> Option<&str> {
        if let Some(full) = self.abbreviations.get(word) {
            return Some(full);
        }
        self.canonical
            .iter()
            .find(|d| d.as_str() == word)
            .map(|d| d.as_str())
    }

    /// Every recognized direction word, canonical names first
    pub fn all_names(&self) -> Vec<&str> {
        self.canonical
            .iter()
            .map(|d| d.as_str())
            .chain(self.abbreviations.keys().map(|a| a.as_str()))
            .collect()
    }
}

impl Default for DirectionTable {
    fn default() -> Self {
        Self::english()
    }
}

/// Words that resolve to the most recently mentioned entity
pub const PRONOUNS: &[&str] = &["it", "them", "him", "her", "this", "that"];

/// Articles stripped during phrase normalization
pub const ARTICLES: &[&str] = &["the", "a", "an", "some"];

pub fn is_pronoun(word: &str) -> bool {
    PRONOUNS.contains(&word)
}

pub fn is_article(word: &str) -> bool {
    ARTICLES.contains(&word)
}

/// The default English grammar set
///
/// Pattern order matters: the parser tries patterns in registration
/// order, so more specific surface forms ("take all from <noun>")
/// precede the general ones ("take <noun>").
pub fn english_patterns() -> Vec<GrammarPattern> {
    vec![
        // Collective targets first so "all" never scores as a noun
        GrammarPattern::new("take-all-from", "take|get all from <noun>", "take").match_all(),
        GrammarPattern::new("take-all-except", "take|get all <prep> <second>", "take")
            .with_prepositions(&["except", "but"])
            .match_all(),
        GrammarPattern::new("take-all", "take|get all", "take").match_all(),
        GrammarPattern::new("drop-all", "drop|discard all", "drop").match_all(),
        // Movement
        GrammarPattern::new("go", "go|walk|head <direction>", "go"),
        GrammarPattern::new("go-bare", "<direction>", "go"),
        // Single-object manipulation
        GrammarPattern::new("take", "take|get|grab <noun>", "take"),
        GrammarPattern::new("pick-up", "pick up <noun>", "take"),
        GrammarPattern::new("drop", "drop|discard <noun>", "drop"),
        GrammarPattern::new("put-down", "put down <noun>", "drop"),
        GrammarPattern::new("put", "put|place <noun> <prep> <second>", "put")
            .with_prepositions(&[
                "in", "into", "on", "onto", "under", "underneath", "behind", "above", "below",
                "over",
            ])
            .requires_second(),
        // Examination
        GrammarPattern::new("look", "look|l", "look"),
        GrammarPattern::new("examine", "examine|x|inspect <noun>", "examine"),
        GrammarPattern::new("look-at", "look at <noun>", "examine"),
        GrammarPattern::new("inventory", "inventory|inv|i", "inventory"),
        // Containers and locks
        GrammarPattern::new("open", "open <noun>", "open"),
        GrammarPattern::new("close", "close|shut <noun>", "close"),
        GrammarPattern::new("unlock-with", "unlock <noun> with <second>", "unlock")
            .requires_second(),
        GrammarPattern::new("unlock", "unlock <noun>", "unlock").allows_implicit_second(),
        GrammarPattern::new("lock-with", "lock <noun> with <second>", "lock").requires_second(),
        GrammarPattern::new("lock", "lock <noun>", "lock").allows_implicit_second(),
        // Fire
        GrammarPattern::new("light-with", "light|ignite <noun> with <second>", "light")
            .requires_second(),
        GrammarPattern::new("light", "light|ignite <noun>", "light").allows_implicit_second(),
        GrammarPattern::new("give-to", "give|hand <noun> to <second>", "give").requires_second(),
        // Bare form names the recipient first ("give guard the sword")
        GrammarPattern::new("give", "give|hand <noun> <second>", "give")
            .requires_second()
            .reversed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_abbreviation() {
        let table = DirectionTable::english();
        assert_eq!(table.canonicalize("n"), Some("north"));
        assert_eq!(table.canonicalize("southwest"), Some("southwest"));
        assert_eq!(table.canonicalize("q"), None);
    }

    #[test]
    fn test_pronoun_set() {
        assert!(is_pronoun("it"));
        assert!(!is_pronoun("key"));
    }

    #[test]
    fn test_english_patterns_have_unique_ids() {
        let patterns = english_patterns();
        let mut ids: Vec<&str> = patterns.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len());
    }
}
