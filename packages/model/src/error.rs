use thiserror::Error;

/// Errors raised at the document model's construction and parse boundaries.
///
/// Resolving a path that is absent from the tree is not an error; it yields `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid node path: {0}")]
    InvalidPath(String),

    #[error("Document root must be a JSON object")]
    NotAnObject,

    #[error("Unrecognized document version (expected `swagger: 2.x` or `openapi: 3.x`)")]
    UnknownVersion,

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Json(e.to_string())
    }
}

/// Model Result type alias
pub type ModelResult<T> = Result<T, ModelError>;
