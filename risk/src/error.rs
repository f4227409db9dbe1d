//! Error types for the risk engine

use thiserror::Error;

/// Errors raised by the risk calculators
///
/// Every calculator either returns a fully populated result or one of
/// these; nothing is retried or partially computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Out-of-range confidence, horizon, simulation count, value, etc.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Weights and series (or two series) disagree on length
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No return series for symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown stress scenario: {0}")]
    UnknownScenario(String),

    /// Configuration or scenario document could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RiskError>;

impl RiskError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        RiskError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}
