//! Error types for the editor
//!
//! Only wire-contract and protocol violations are errors. A command whose
//! target is missing, already present or already absent degrades to a no-op
//! and never reaches these types.

use thiserror::Error;

/// Failures turning commands into wire records and back
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command type: {0}")]
    UnknownType(String),

    #[error("Command record has no `__type` discriminator")]
    MissingType,

    #[error("Command record is not an object")]
    NotARecord,

    #[error("Malformed {type_tag} record: {source}")]
    Malformed {
        type_tag: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures in the sequencing engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("No pending command with id {0}")]
    UnknownPending(u64),

    #[error("Position {0} is already occupied by a finalized command")]
    PositionTaken(u64),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Model error: {0}")]
    Model(#[from] apicollab_model::ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
