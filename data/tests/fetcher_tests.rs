//! Integration tests for the market data fetcher
//!
//! Scripted providers stand in for a real data source so concurrency,
//! retries and the overall deadline can be observed directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use qr_data::{
    DataError, DataResult, FetcherConfig, MarketDataFetcher, ReturnSeriesProvider,
    SyntheticReturnProvider,
};
use qr_risk::{ReturnSeries, RiskCalculator};

/// Records how many calls overlap
#[derive(Default)]
struct SlowProvider {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay_ms: u64,
}

#[async_trait]
impl ReturnSeriesProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch_returns(&self, _symbol: &str, days: usize) -> DataResult<ReturnSeries> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![0.001; days].into())
    }
}

/// Fails a fixed number of times per symbol before succeeding
struct FlakyProvider {
    failures_per_symbol: usize,
    attempts: Mutex<HashMap<String, usize>>,
}

impl FlakyProvider {
    fn new(failures_per_symbol: usize) -> Self {
        Self {
            failures_per_symbol,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn attempts(&self, symbol: &str) -> usize {
        self.attempts.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ReturnSeriesProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn fetch_returns(&self, symbol: &str, days: usize) -> DataResult<ReturnSeries> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(symbol.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if attempt <= self.failures_per_symbol {
            return Err(DataError::Provider {
                symbol: symbol.to_string(),
                message: format!("transient failure #{}", attempt),
            });
        }
        Ok(vec![-0.01; days].into())
    }
}

/// Knows only a fixed set of symbols
struct CatalogProvider {
    known: Vec<&'static str>,
    calls: AtomicUsize,
}

impl CatalogProvider {
    fn new(known: Vec<&'static str>) -> Self {
        Self {
            known,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReturnSeriesProvider for CatalogProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch_returns(&self, symbol: &str, days: usize) -> DataResult<ReturnSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.known.contains(&symbol) {
            Ok(vec![0.0; days].into())
        } else {
            Err(DataError::Rejected {
                symbol: symbol.to_string(),
                message: "not listed".to_string(),
            })
        }
    }
}

fn quick_config() -> FetcherConfig {
    FetcherConfig {
        max_concurrency: 10,
        timeout_ms: 5_000,
        max_retries: 2,
        retry_backoff_ms: 1,
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let provider = Arc::new(SlowProvider {
        delay_ms: 20,
        ..Default::default()
    });
    let fetcher = MarketDataFetcher::new(
        provider.clone(),
        FetcherConfig {
            max_concurrency: 3,
            ..quick_config()
        },
    )
    .unwrap();

    let symbols: Vec<String> = (0..12).map(|i| format!("SYM{}", i)).collect();
    let set = fetcher.fetch_returns(&symbols, 5).await.unwrap();

    assert_eq!(set.len(), 12);
    let observed = provider.max_in_flight.load(Ordering::SeqCst);
    assert!(observed >= 1 && observed <= 3, "observed {} concurrent calls", observed);
    assert_eq!(provider.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_result_preserves_request_order() {
    let provider = Arc::new(SlowProvider {
        delay_ms: 1,
        ..Default::default()
    });
    let fetcher = MarketDataFetcher::new(provider, quick_config()).unwrap();

    let requested = ["ZZZ", "AAA", "MMM", "BBB"];
    let set = fetcher.fetch_returns(&requested, 3).await.unwrap();
    let symbols: Vec<&str> = set.symbols().collect();
    assert_eq!(symbols, requested);
}

#[tokio::test]
async fn test_overall_timeout() {
    let provider = Arc::new(SlowProvider {
        delay_ms: 5_000,
        ..Default::default()
    });
    let fetcher = MarketDataFetcher::new(
        provider,
        FetcherConfig {
            timeout_ms: 50,
            ..quick_config()
        },
    )
    .unwrap();

    match fetcher.fetch_returns(&["SPY", "QQQ"], 10).await {
        Err(DataError::Timeout { timeout_ms, pending }) => {
            assert_eq!(timeout_ms, 50);
            assert_eq!(pending, 2);
        }
        other => panic!("Expected timeout, got {:?}", other.map(|s| s.len())),
    }
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let provider = Arc::new(FlakyProvider::new(2));
    let fetcher = MarketDataFetcher::new(provider.clone(), quick_config()).unwrap();

    let set = fetcher.fetch_returns(&["SPY", "TLT"], 4).await.unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(provider.attempts("SPY"), 3);
    assert_eq!(provider.attempts("TLT"), 3);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let provider = Arc::new(FlakyProvider::new(5));
    let fetcher = MarketDataFetcher::new(provider.clone(), quick_config()).unwrap();

    let result = fetcher.fetch_returns(&["SPY"], 4).await;
    assert!(matches!(result, Err(DataError::Provider { ref symbol, .. }) if symbol == "SPY"));
    assert_eq!(provider.attempts("SPY"), 3);
}

#[tokio::test]
async fn test_non_retryable_failure_fails_whole_call() {
    let provider = Arc::new(CatalogProvider::new(vec!["SPY", "QQQ"]));
    let fetcher = MarketDataFetcher::new(provider, quick_config()).unwrap();

    let result = fetcher.fetch_returns(&["SPY", "NOPE", "QQQ"], 4).await;
    assert!(matches!(result, Err(DataError::Rejected { ref symbol, .. }) if symbol == "NOPE"));
}

#[tokio::test]
async fn test_rejected_symbol_is_not_retried() {
    let provider = Arc::new(CatalogProvider::new(vec![]));
    let fetcher = MarketDataFetcher::new(provider.clone(), quick_config()).unwrap();

    let result = fetcher.fetch_returns(&["NOPE"], 4).await;
    assert!(matches!(result, Err(DataError::Rejected { .. })));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zero_days_rejected_without_retry() {
    let fetcher = MarketDataFetcher::new(
        Arc::new(SyntheticReturnProvider::default()),
        FetcherConfig {
            retry_backoff_ms: 10_000,
            timeout_ms: 1_000,
            ..quick_config()
        },
    )
    .unwrap();

    // A retry would sleep past the deadline and surface as a timeout
    let result = fetcher.fetch_returns(&["SPY"], 0).await;
    assert!(matches!(result, Err(DataError::Rejected { .. })));
}

#[tokio::test]
async fn test_rejects_bad_requests() {
    let fetcher = MarketDataFetcher::new(
        Arc::new(SyntheticReturnProvider::default()),
        quick_config(),
    )
    .unwrap();

    let empty: [&str; 0] = [];
    assert!(matches!(
        fetcher.fetch_returns(&empty, 10).await,
        Err(DataError::NoSymbols)
    ));
    assert!(matches!(
        fetcher.fetch_returns(&["SPY", "SPY"], 10).await,
        Err(DataError::DuplicateSymbol(_))
    ));
}

#[tokio::test]
async fn test_fetched_set_feeds_risk_engine() {
    let provider = Arc::new(FlakyProvider::new(0));
    let fetcher = MarketDataFetcher::new(provider, quick_config()).unwrap();
    let returns = fetcher.fetch_returns(&["A", "B"], 100).await.unwrap();

    let result = RiskCalculator::default()
        .portfolio_var_aligned(&returns, &[0.5, 0.5], 1_000_000.0, 0.95, 1)
        .unwrap();

    assert!((result.var_amount - 10_000.0).abs() < 1e-6);
    assert_eq!(result.volatility, 0.0);
}

#[test]
fn test_config_from_yaml() {
    let config: FetcherConfig = serde_yaml::from_str("max_concurrency: 4\ntimeout_ms: 1000").unwrap();
    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.timeout_ms, 1000);
    assert_eq!(config.max_retries, FetcherConfig::default().max_retries);
}

#[test]
fn test_blocking_fetch_with_runtime() {
    let fetcher = MarketDataFetcher::new(
        Arc::new(SyntheticReturnProvider::default()),
        quick_config(),
    )
    .unwrap();

    let set = tokio_test::block_on(fetcher.fetch_returns(&["AAPL"], 252)).unwrap();
    assert_eq!(set.get("AAPL").unwrap().len(), 252);
}
