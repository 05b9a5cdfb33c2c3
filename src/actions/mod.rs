//! Action definitions, registry, and the builtin English set

pub mod builtin;
pub mod registry;

pub use builtin::register_builtin_actions;
pub use registry::{
    ActionDefinition, ActionOutcome, ActionRegistry, AllScope, FailureReason,
};
