//! Concurrent market data fetcher
//!
//! Resolves many symbols against one provider with a bounded number of
//! in-flight requests and a single deadline for the whole call. The task
//! set and its semaphore live only for the duration of one call; nothing
//! keeps running after `fetch_returns` returns, whether it succeeded,
//! failed or timed out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use qr_risk::{ReturnSeries, ReturnSeriesSet};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{DataError, DataResult};
use crate::provider::ReturnSeriesProvider;

/// Fetcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Maximum number of provider calls in flight at once
    pub max_concurrency: usize,

    /// Deadline for the whole fetch, in milliseconds
    pub timeout_ms: u64,

    /// Extra attempts per symbol after a retryable failure
    pub max_retries: u32,

    /// Backoff before retry `n` is `n * retry_backoff_ms`
    pub retry_backoff_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            timeout_ms: 30_000,
            max_retries: 2,
            retry_backoff_ms: 100,
        }
    }
}

impl FetcherConfig {
    pub fn validate(&self) -> DataResult<()> {
        if self.max_concurrency == 0 {
            return Err(DataError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(DataError::Config("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Fetches return series for many symbols through one provider
pub struct MarketDataFetcher {
    provider: Arc<dyn ReturnSeriesProvider>,
    config: FetcherConfig,
}

impl MarketDataFetcher {
    pub fn new(provider: Arc<dyn ReturnSeriesProvider>, config: FetcherConfig) -> DataResult<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch `days` returns for every symbol
    ///
    /// The returned set lists symbols in request order. Either every symbol
    /// resolves or the call fails; a partial set is never returned.
    pub async fn fetch_returns<S: AsRef<str>>(
        &self,
        symbols: &[S],
        days: usize,
    ) -> DataResult<ReturnSeriesSet> {
        let symbols = unique_symbols(symbols)?;

        info!(
            "Fetching {} day(s) of returns for {} symbol(s) from {}",
            days,
            symbols.len(),
            self.provider.name()
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, symbol) in symbols.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let symbol = symbol.clone();
            let config = self.config.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_with_retry(provider.as_ref(), &symbol, days, &config).await,
                    Err(e) => Err(DataError::Task(e.to_string())),
                };
                (index, result)
            });
        }

        let mut resolved: Vec<Option<ReturnSeries>> = vec![None; symbols.len()];
        let deadline = Duration::from_millis(self.config.timeout_ms);

        let collected = tokio::time::timeout(deadline, async {
            while let Some(joined) = tasks.join_next().await {
                let (index, result) = joined.map_err(|e| DataError::Task(e.to_string()))?;
                resolved[index] = Some(result?);
            }
            Ok::<(), DataError>(())
        })
        .await;

        // Nothing outlives the call
        tasks.abort_all();

        match collected {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Market data fetch failed: {}", e);
                return Err(e);
            }
            Err(_) => {
                let pending = resolved.iter().filter(|r| r.is_none()).count();
                warn!(
                    "Market data fetch timed out after {}ms, {} symbol(s) outstanding",
                    self.config.timeout_ms, pending
                );
                return Err(DataError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                    pending,
                });
            }
        }

        let mut set = ReturnSeriesSet::new();
        for (symbol, series) in symbols.into_iter().zip(resolved) {
            let series = series.ok_or_else(|| {
                DataError::Task(format!("no result recorded for {}", symbol))
            })?;
            set.insert(symbol, series)?;
        }

        info!("Fetched return series for {} symbol(s)", set.len());
        Ok(set)
    }
}

fn unique_symbols<S: AsRef<str>>(symbols: &[S]) -> DataResult<Vec<String>> {
    if symbols.is_empty() {
        return Err(DataError::NoSymbols);
    }

    let mut seen = HashSet::with_capacity(symbols.len());
    let mut ordered = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.as_ref();
        if !seen.insert(symbol) {
            return Err(DataError::DuplicateSymbol(symbol.to_string()));
        }
        ordered.push(symbol.to_string());
    }
    Ok(ordered)
}

async fn fetch_with_retry(
    provider: &dyn ReturnSeriesProvider,
    symbol: &str,
    days: usize,
    config: &FetcherConfig,
) -> DataResult<ReturnSeries> {
    let mut attempt = 0;
    loop {
        debug!("Fetching {} (attempt {})", symbol, attempt + 1);

        match provider.fetch_returns(symbol, days).await {
            Ok(series) => return Ok(series),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                warn!("Fetch for {} failed, retrying ({}/{}): {}", symbol, attempt, config.max_retries, e);
                let backoff = config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
