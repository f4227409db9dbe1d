//! Return series provider trait
//!
//! A provider turns one symbol into a series of daily fractional returns.
//! Implementations may hit a network service, read files, or generate data;
//! the fetcher only relies on this trait.

use async_trait::async_trait;
use qr_risk::ReturnSeries;

use crate::error::DataResult;

/// Source of daily return series
///
/// Implementations must be safe to call from many tasks at once: the
/// fetcher shares a single provider across its whole task set.
#[async_trait]
pub trait ReturnSeriesProvider: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Fetch `days` daily returns for `symbol`, oldest first
    ///
    /// # Returns
    /// * `Ok(ReturnSeries)` - Exactly `days` observations
    /// * `Err(DataError)` - The symbol could not be resolved
    async fn fetch_returns(&self, symbol: &str, days: usize) -> DataResult<ReturnSeries>;
}
