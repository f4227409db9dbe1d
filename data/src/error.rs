//! Error types for market data retrieval

use qr_risk::RiskError;
use thiserror::Error;

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Market data error types
#[derive(Debug, Error)]
pub enum DataError {
    /// The whole fetch did not finish in time
    #[error("Market data fetch timed out after {timeout_ms}ms with {pending} symbol(s) outstanding")]
    Timeout {
        /// Configured overall timeout
        timeout_ms: u64,
        /// Symbols still unresolved when the deadline passed
        pending: usize,
    },

    /// A provider failed transiently for a symbol
    #[error("Provider error for {symbol}: {message}")]
    Provider {
        /// Symbol being fetched
        symbol: String,
        /// Error message
        message: String,
    },

    /// The provider refused the request outright; retrying cannot help
    #[error("Provider rejected {symbol}: {message}")]
    Rejected {
        /// Symbol being fetched
        symbol: String,
        /// Error message
        message: String,
    },

    /// The same symbol was requested twice in one call
    #[error("Duplicate symbol in request: {0}")]
    DuplicateSymbol(String),

    /// The request named no symbols
    #[error("No symbols requested")]
    NoSymbols,

    /// Fetcher configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fetch task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    Task(String),

    /// Error raised while assembling the result set
    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl DataError {
    /// Check if a failed fetch is worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Provider { .. })
    }
}
