//! Monte Carlo loss simulation
//!
//! Each trial draws one independent standard normal return per symbol,
//! scales it by a fixed daily volatility and averages equally across
//! symbols. No correlation structure is modelled, so diversification is
//! overstated relative to the historical correlation matrix.

use crate::config::EngineConfig;
use crate::error::{Result, RiskError};
use crate::stats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Monte Carlo simulation result
///
/// Losses are positive; a negative `best_case` is a gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Number of simulated outcomes
    pub num_simulations: usize,

    /// VaR at 95% confidence
    pub var_95: f64,

    /// VaR at 99% confidence
    pub var_99: f64,

    /// Negative mean of simulated P&L
    pub expected_loss: f64,

    /// Loss of the worst simulated outcome
    pub worst_case: f64,

    /// Loss of the best simulated outcome
    pub best_case: f64,
}

/// Monte Carlo simulation engine
#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    daily_volatility: f64,
}

impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl MonteCarloEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            daily_volatility: config.monte_carlo_daily_volatility,
        }
    }

    /// Simulate `num_simulations` one-day portfolio P&L outcomes
    ///
    /// Percentile indices are clamped to the sample, so a single simulation
    /// yields VaR95 = VaR99 = worst = best.
    pub fn simulate<S, R>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        num_simulations: usize,
        rng: &mut R,
    ) -> Result<MonteCarloResult>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if symbols.is_empty() {
            return Err(RiskError::InvalidParameter(
                "Monte Carlo simulation needs at least one symbol".to_string(),
            ));
        }

        if num_simulations == 0 {
            return Err(RiskError::InvalidParameter(
                "Number of simulations must be positive".to_string(),
            ));
        }

        if !portfolio_value.is_finite() || portfolio_value <= 0.0 {
            return Err(RiskError::InvalidParameter(format!(
                "Portfolio value must be positive, got {}",
                portfolio_value
            )));
        }

        let num_assets = symbols.len() as f64;
        let mut outcomes = Vec::with_capacity(num_simulations);

        for _ in 0..num_simulations {
            let mut portfolio_return = 0.0;
            for _ in symbols {
                let z: f64 = StandardNormal.sample(rng);
                portfolio_return += z * self.daily_volatility / num_assets;
            }
            outcomes.push(portfolio_return * portfolio_value);
        }

        let sorted = stats::sorted_ascending(&outcomes);
        let n = sorted.len();

        Ok(MonteCarloResult {
            num_simulations,
            var_95: -sorted[stats::tail_index(0.05, n)],
            var_99: -sorted[stats::tail_index(0.01, n)],
            expected_loss: -stats::mean(&sorted),
            worst_case: -sorted[0],
            best_case: -sorted[n - 1],
        })
    }

    /// Simulate with a `StdRng` seeded from `seed`, for reproducible runs
    pub fn simulate_seeded<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        num_simulations: usize,
        seed: u64,
    ) -> Result<MonteCarloResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.simulate(symbols, portfolio_value, num_simulations, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monte_carlo_ordering() {
        let engine = MonteCarloEngine::default();
        let result = engine
            .simulate_seeded(&["AAPL", "MSFT", "GOOGL"], 1_000_000.0, 10_000, 42)
            .unwrap();

        assert_eq!(result.num_simulations, 10_000);
        assert!(result.var_95 > 0.0);
        assert!(result.var_99 >= result.var_95);
        assert!(result.worst_case >= result.var_99);
        assert!(result.best_case < 0.0);
        assert!(result.worst_case > result.best_case);
    }

    #[test]
    fn test_var_close_to_normal_quantile() {
        let engine = MonteCarloEngine::default();
        let result = engine.simulate_seeded(&["ONLY"], 1_000_000.0, 50_000, 7).unwrap();

        // Single asset, 2% daily vol: VaR95 ≈ 1.645 * 0.02 * 1M = 32,900
        assert!((result.var_95 - 32_900.0).abs() < 1_500.0);
        assert!(result.expected_loss.abs() < 1_000.0);
    }

    #[test]
    fn test_single_simulation() {
        let engine = MonteCarloEngine::default();
        let result = engine.simulate_seeded(&["A", "B"], 1000.0, 1, 1).unwrap();

        assert_eq!(result.var_95, result.var_99);
        assert_eq!(result.var_95, result.worst_case);
        assert_eq!(result.worst_case, result.best_case);
        assert_eq!(result.expected_loss, result.worst_case);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let engine = MonteCarloEngine::default();
        let a = engine.simulate_seeded(&["SPY"], 5000.0, 1000, 99).unwrap();
        let b = engine.simulate_seeded(&["SPY"], 5000.0, 1000, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_volatility() {
        let config = EngineConfig {
            monte_carlo_daily_volatility: 0.0,
            ..Default::default()
        };
        let engine = MonteCarloEngine::new(&config);
        let result = engine.simulate_seeded(&["A"], 1000.0, 100, 3).unwrap();
        assert_eq!(result.worst_case, 0.0);
        assert_eq!(result.best_case, 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let engine = MonteCarloEngine::default();
        let empty: [&str; 0] = [];

        assert!(matches!(
            engine.simulate_seeded(&["A"], 1000.0, 0, 1),
            Err(RiskError::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.simulate_seeded(&empty, 1000.0, 10, 1),
            Err(RiskError::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.simulate_seeded(&["A"], -5.0, 10, 1),
            Err(RiskError::InvalidParameter(_))
        ));
    }
}
