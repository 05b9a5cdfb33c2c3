//! Grammar patterns and their compiled forms
//!
//! Declarative templates come in from vocabulary data (code or TOML),
//! get compiled to anchored regexes, and are matched against player
//! input in registration order.

pub mod compiler;
pub mod loader;
pub mod pattern;
pub mod vocabulary;

pub use compiler::{CompiledGrammar, CompiledPattern, PatternMatch};
pub use loader::{load_grammar_file, parse_grammar_toml};
pub use pattern::{GrammarPattern, PatternFlags};
pub use vocabulary::{english_patterns, DirectionTable};
