//! Command processing pipeline
//!
//! Raw text flows through pattern matching into a ParsedCommand,
//! through resolution into a ResolvedCommand, and through dispatch
//! into action events:
//! text -> CommandParser -> CommandResolver -> ActionExecutor -> events

pub mod disambiguation;
pub mod executor;
pub mod parser;
pub mod resolver;

pub use disambiguation::{
    continue_with_disambiguation, DisambiguationOption, DisambiguationRequest, Disambiguator,
    SlotAssessment,
};
pub use executor::{ActionEvent, ActionExecutor, BatchFailure};
pub use parser::{CommandParser, ParseOutcome, ParsedCommand};
pub use resolver::{CommandResolver, ResolveOutcome, ResolvedCommand, SpatialRef};
