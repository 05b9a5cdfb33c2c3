//! Load grammar patterns from TOML files
//!
//! Grammar is data: a language pack ships `[[pattern]]` records and the
//! runtime registers them at startup.

use crate::core::error::{EmberError, Result};
use crate::grammar::pattern::GrammarPattern;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PatternRecord {
    id: String,
    template: String,
    action: String,
    #[serde(default)]
    prepositions: Vec<String>,
    #[serde(default)]
    match_all: bool,
    #[serde(default)]
    requires_second: bool,
    #[serde(default)]
    allows_implicit_second: bool,
    #[serde(default)]
    reversed: bool,
}

#[derive(Debug, Deserialize)]
struct GrammarFile {
    #[serde(default)]
    pattern: Vec<PatternRecord>,
}

/// Parse `[[pattern]]` records from TOML content
pub fn parse_grammar_toml(content: &str) -> Result<Vec<GrammarPattern>> {
    let file: GrammarFile = toml::from_str(content)
        .map_err(|e| EmberError::GrammarFile(format!("invalid TOML: {e}")))?;

    Ok(file
        .pattern
        .into_iter()
        .map(|record| {
            let mut pattern =
                GrammarPattern::new(record.id.as_str(), record.template, record.action.as_str());
            pattern.prepositions = record.prepositions;
            pattern.flags.match_all = record.match_all;
            pattern.flags.requires_second = record.requires_second;
            pattern.flags.allows_implicit_second = record.allows_implicit_second;
            pattern.flags.reversed = record.reversed;
            pattern
        })
        .collect())
}

/// Load grammar patterns from a TOML file on disk
pub fn load_grammar_file(path: &Path) -> Result<Vec<GrammarPattern>> {
    let content = fs::read_to_string(path)
        .map_err(|e| EmberError::GrammarFile(format!("failed to read {}: {e}", path.display())))?;
    parse_grammar_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grammar_records() {
        let content = r#"
            [[pattern]]
            id = "take"
            template = "take|get <noun>"
            action = "take"

            [[pattern]]
            id = "put"
            template = "put <noun> <prep> <second>"
            action = "put"
            prepositions = ["in", "into"]
            requires_second = true
        "#;

        let patterns = parse_grammar_toml(content).unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].id.as_str(), "take");
        assert!(!patterns[0].flags.requires_second);
        assert_eq!(patterns[1].prepositions, vec!["in", "into"]);
        assert!(patterns[1].flags.requires_second);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_grammar_toml("[[pattern]\nid = broken");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_file_yields_no_patterns() {
        assert!(parse_grammar_toml("").unwrap().is_empty());
    }
}
