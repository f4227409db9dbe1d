//! # qr-data: Market Data for the Risk Engine
//!
//! Supplies the daily return series that `qr-risk` consumes.
//!
//! ## Core Components
//!
//! - **ReturnSeriesProvider**: async trait for any source of return series
//! - **SyntheticReturnProvider**: deterministic Gaussian data keyed by symbol
//! - **MarketDataFetcher**: bounded-concurrency fetch of many symbols with an
//!   overall deadline and per-symbol retries
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use qr_data::{FetcherConfig, MarketDataFetcher, SyntheticReturnProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = Arc::new(SyntheticReturnProvider::default());
//!     let fetcher = MarketDataFetcher::new(provider, FetcherConfig::default()).unwrap();
//!
//!     let returns = fetcher.fetch_returns(&["AAPL", "MSFT"], 252).await.unwrap();
//!     assert_eq!(returns.len(), 2);
//! }
//! ```

pub mod error;
pub mod fetcher;
pub mod provider;
pub mod synthetic;

pub use error::{DataError, DataResult};
pub use fetcher::{FetcherConfig, MarketDataFetcher};
pub use provider::ReturnSeriesProvider;
pub use synthetic::{SyntheticProviderConfig, SyntheticReturnProvider};
