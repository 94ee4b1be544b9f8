use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in scholar-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failures inside the draft -> verify -> format pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The primary draft call did not succeed.
    #[error("generation failed: {0}")]
    Generation(LlmError),

    /// The dependent verification call did not succeed.
    #[error("verification failed: {0}")]
    Verification(LlmError),

    #[error("generation exceeded {seconds}s")]
    Timeout { seconds: u64 },

    #[error("generation returned no text")]
    EmptyResponse,
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout { seconds } => PipelineError::Timeout { seconds },
            other => PipelineError::Generation(other),
        }
    }
}

/// Request-level failures surfaced by the chat service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found")]
    ConversationNotFound,

    #[error("conversation is no longer active")]
    ConversationInactive,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("{0}")]
    InvalidMode(String),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}
