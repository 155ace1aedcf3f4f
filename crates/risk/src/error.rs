//! Risk engine errors

use lendguard_core::WadError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Reserve not found for coin type {0}")]
    ReserveNotFound(String),

    #[error("Invalid on-chain value for {field}: {source}")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: WadError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RiskError {
    pub(crate) fn invalid(field: &'static str) -> impl FnOnce(WadError) -> RiskError {
        move |source| RiskError::InvalidValue { field, source }
    }
}
