//! Feed error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Obligation not found: {0}")]
    ObligationNotFound(String),

    /// The submission collaborator rejected the transaction
    #[error("Transaction submission failed: {message}")]
    Submission { message: String },

    #[error("Invalid page cursor: {0}")]
    InvalidCursor(String),

    #[error("Pager did not finish within {max_pages} pages")]
    PageLimitExceeded { max_pages: usize },
}
