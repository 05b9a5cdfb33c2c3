//! Compiles grammar templates into anchored regular expressions
//!
//! Literal tokens are escaped before substitution, verb alternatives
//! become non-capturing alternations, and slot markers become named
//! capture groups. Bare-direction templates are special-cased to a
//! whole-string direction alternation. Every other pattern anchors to
//! the full input.

use crate::core::error::{EmberError, Result};
use crate::core::types::PatternId;
use crate::grammar::pattern::GrammarPattern;
use crate::grammar::vocabulary::DirectionTable;
use ahash::AHashMap;
use regex::Regex;

/// Slot markers recognized in templates
const NOUN_MARKER: &str = "<noun>";
const SECOND_MARKER: &str = "<second>";
const PREP_MARKER: &str = "<prep>";
const TEXT_MARKER: &str = "<text>";
const DIRECTION_MARKER: &str = "<direction>";

/// A grammar pattern compiled to a matchable form
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: GrammarPattern,
    regex: Regex,
}

/// Substrings extracted from a successful match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternMatch {
    pub noun: Option<String>,
    pub second: Option<String>,
    pub preposition: Option<String>,
    pub text: Option<String>,
    pub direction: Option<String>,
}

impl CompiledPattern {
    /// Test an input string, yielding the captured slot phrases on match
    pub fn matches(&self, input: &str) -> Option<PatternMatch> {
        let caps = self.regex.captures(input)?;
        let get = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut noun = get("noun");
        let mut second = get("second");
        if self.pattern.flags.reversed {
            std::mem::swap(&mut noun, &mut second);
        }

        Some(PatternMatch {
            noun,
            second,
            preposition: get("prep"),
            text: get("text"),
            direction: get("direction"),
        })
    }

    /// Fraction of template tokens that are literal words
    ///
    /// Used as the parse confidence: a fully literal match is certain,
    /// a template that is mostly open slots is a guess.
    pub fn literal_fraction(&self) -> f32 {
        let tokens: Vec<&str> = self.pattern.template.split_whitespace().collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let literal = tokens.iter().filter(|t| !t.starts_with('<')).count();
        (literal as f32 / tokens.len() as f32).max(0.3)
    }
}

/// Compile a single pattern, rejecting malformed templates loudly
pub fn compile(pattern: &GrammarPattern, directions: &DirectionTable) -> Result<CompiledPattern> {
    let template = pattern.template.trim();
    if template.is_empty() {
        return Err(grammar_error(&pattern.id, "empty template"));
    }

    // Bare direction: the whole input is one direction name
    if template == DIRECTION_MARKER {
        let source = format!("^(?P<direction>{})$", alternation(&direction_names(directions)));
        return build(pattern, &source);
    }

    let mut seen_markers: Vec<&str> = Vec::new();
    let mut parts: Vec<String> = Vec::new();

    for token in template.split_whitespace() {
        if token.starts_with('<') {
            if seen_markers.contains(&token) {
                return Err(grammar_error(
                    &pattern.id,
                    &format!("duplicate slot marker {token}"),
                ));
            }
        }

        let part = match token {
            NOUN_MARKER => {
                seen_markers.push(NOUN_MARKER);
                r"(?P<noun>.+?)".to_string()
            }
            SECOND_MARKER => {
                seen_markers.push(SECOND_MARKER);
                r"(?P<second>.+?)".to_string()
            }
            TEXT_MARKER => {
                seen_markers.push(TEXT_MARKER);
                r"(?P<text>.+)".to_string()
            }
            PREP_MARKER => {
                if pattern.prepositions.is_empty() {
                    return Err(grammar_error(
                        &pattern.id,
                        "<prep> marker with an empty preposition list",
                    ));
                }
                seen_markers.push(PREP_MARKER);
                let preps: Vec<String> = pattern.prepositions.clone();
                format!("(?P<prep>{})", alternation(&preps))
            }
            DIRECTION_MARKER => {
                seen_markers.push(DIRECTION_MARKER);
                format!("(?P<direction>{})", alternation(&direction_names(directions)))
            }
            t if t.starts_with('<') => {
                return Err(grammar_error(
                    &pattern.id,
                    &format!("unknown slot marker {t}"),
                ));
            }
            t if t.contains('|') => {
                let alternatives: Vec<String> = t.split('|').map(|v| v.to_string()).collect();
                if alternatives.iter().any(|v| v.is_empty()) {
                    return Err(grammar_error(&pattern.id, "empty verb alternative"));
                }
                format!("(?:{})", alternation(&alternatives))
            }
            t => regex::escape(t),
        };
        parts.push(part);
    }

    if pattern.flags.requires_second && !seen_markers.contains(&SECOND_MARKER) {
        return Err(grammar_error(
            &pattern.id,
            "requires_second without a <second> marker",
        ));
    }

    let source = format!("^{}$", parts.join(r"\s+"));
    build(pattern, &source)
}

fn build(pattern: &GrammarPattern, source: &str) -> Result<CompiledPattern> {
    let regex = Regex::new(source)
        .map_err(|e| grammar_error(&pattern.id, &format!("regex compilation: {e}")))?;
    Ok(CompiledPattern {
        pattern: pattern.clone(),
        regex,
    })
}

fn grammar_error(id: &PatternId, reason: &str) -> EmberError {
    EmberError::Grammar {
        id: id.as_str().to_string(),
        reason: reason.to_string(),
    }
}

/// Escaped alternation, longest alternative first so an abbreviation
/// never shadows the full word it abbreviates
fn alternation(words: &[String]) -> String {
    let mut escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    escaped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    escaped.join("|")
}

fn direction_names(directions: &DirectionTable) -> Vec<String> {
    directions
        .all_names()
        .into_iter()
        .map(|d| d.to_string())
        .collect()
}

/// The full compiled form of a pattern set
///
/// Rebuilt as a whole whenever any pattern is registered; correctness
/// over cache granularity.
#[derive(Debug, Default)]
pub struct CompiledGrammar {
    patterns: Vec<CompiledPattern>,
    by_id: AHashMap<PatternId, usize>,
}

impl CompiledGrammar {
    pub fn build(patterns: &[GrammarPattern], directions: &DirectionTable) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut by_id = AHashMap::with_capacity(patterns.len());
        for pattern in patterns {
            by_id.insert(pattern.id.clone(), compiled.len());
            compiled.push(compile(pattern, directions)?);
        }
        Ok(Self {
            patterns: compiled,
            by_id,
        })
    }

    /// Compiled patterns in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter()
    }

    pub fn get(&self, id: &PatternId) -> Option<&CompiledPattern> {
        self.by_id.get(id).map(|&i| &self.patterns[i])
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
