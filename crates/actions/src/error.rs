//! Action errors
//!
//! Validation outcomes are data (`SubmitButtonState`), not errors. Only
//! configuration loading can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
