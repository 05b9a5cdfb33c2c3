use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmberError {
    #[error("Actor not found: {0:?}")]
    ActorNotFound(crate::core::types::EntityId),

    #[error("Invalid grammar pattern '{id}': {reason}")]
    Grammar { id: String, reason: String },

    #[error("Grammar file error: {0}")]
    GrammarFile(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmberError>;
