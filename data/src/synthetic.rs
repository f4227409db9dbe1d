//! Deterministic synthetic return generator
//!
//! Each symbol gets its own generator seeded from a stable hash of the
//! symbol text, so the same symbol always produces the same series no
//! matter which task fetches it or in what order.

use async_trait::async_trait;
use qr_risk::ReturnSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::provider::ReturnSeriesProvider;

/// Synthetic provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticProviderConfig {
    /// Mixed into every per-symbol seed
    pub base_seed: u64,

    /// Lower bound of the per-symbol daily volatility
    pub min_daily_volatility: f64,

    /// Upper bound (exclusive) of the per-symbol daily volatility
    pub max_daily_volatility: f64,
}

impl Default for SyntheticProviderConfig {
    fn default() -> Self {
        Self {
            base_seed: 0,
            min_daily_volatility: 0.015,
            max_daily_volatility: 0.03,
        }
    }
}

/// Provider generating Gaussian returns with a per-symbol volatility
#[derive(Debug, Clone, Default)]
pub struct SyntheticReturnProvider {
    config: SyntheticProviderConfig,
}

impl SyntheticReturnProvider {
    pub fn new(config: SyntheticProviderConfig) -> DataResult<Self> {
        let SyntheticProviderConfig {
            min_daily_volatility: low,
            max_daily_volatility: high,
            ..
        } = config;

        if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
            return Err(DataError::Config(format!(
                "daily volatility range [{}, {}) is invalid",
                low, high
            )));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &SyntheticProviderConfig {
        &self.config
    }

    /// Seed used for `symbol`
    pub fn seed_for(&self, symbol: &str) -> u64 {
        u64::from(symbol_hash(symbol) as u32) ^ self.config.base_seed
    }

    /// Generate the series synchronously
    pub fn generate(&self, symbol: &str, days: usize) -> ReturnSeries {
        let mut rng = StdRng::seed_from_u64(self.seed_for(symbol));
        let span = self.config.max_daily_volatility - self.config.min_daily_volatility;
        let volatility = self.config.min_daily_volatility + rng.gen::<f64>() * span;

        (0..days)
            .map(|_| rng.sample::<f64, _>(StandardNormal) * volatility)
            .collect::<Vec<f64>>()
            .into()
    }
}

#[async_trait]
impl ReturnSeriesProvider for SyntheticReturnProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch_returns(&self, symbol: &str, days: usize) -> DataResult<ReturnSeries> {
        if days == 0 {
            return Err(DataError::Rejected {
                symbol: symbol.to_string(),
                message: "requested zero days of history".to_string(),
            });
        }

        Ok(self.generate(symbol, days))
    }
}

/// 31-multiplier polynomial hash over UTF-16 code units
fn symbol_hash(symbol: &str) -> i32 {
    symbol
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
