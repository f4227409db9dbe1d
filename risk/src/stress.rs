//! Stress testing and scenario analysis
//!
//! Applies a shock table to a list of symbols:
//! - Each symbol gets an equal share of the portfolio value. This ignores
//!   the portfolio's real weights, unlike historical VaR; the inconsistency
//!   is kept deliberately.
//! - Symbols missing from the table take the configured default shock
//!   (-20% by default) rather than being rejected.
//! - The worst asset is the one with the largest absolute shock; ties go
//!   to the symbol listed first.

use crate::config::EngineConfig;
use crate::error::{Result, RiskError};
use crate::scenarios::{ShockTable, StressScenario};
use crate::stats;
use serde::{Deserialize, Serialize};

pub const CUSTOM_STRESS: &str = "Custom Stress";

/// Result of a stress test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    /// Scenario name
    pub scenario_name: String,

    /// Portfolio loss in currency (positive = loss, negative = gain)
    pub loss: f64,

    /// Loss as a percentage of portfolio value
    pub loss_percentage: f64,

    /// Symbol with the largest absolute shock, `None` when every shock is zero
    pub worst_asset: Option<String>,

    /// Shock applied to the worst asset, in percent
    pub worst_asset_shock_pct: f64,
}

/// Summary across several scenario results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestReport {
    /// All scenario results
    pub results: Vec<StressTestResult>,

    /// Scenario with the largest loss
    pub worst_scenario: String,

    /// Largest loss
    pub max_loss: f64,

    /// Scenario with the smallest loss (largest gain)
    pub mildest_scenario: String,

    /// Smallest loss
    pub min_loss: f64,

    /// Average loss across scenarios
    pub average_loss: f64,
}

/// Stress testing engine
///
/// Carries no scenarios of its own; tables are supplied per call.
#[derive(Debug, Clone)]
pub struct StressTestEngine {
    default_shock: f64,
}

impl Default for StressTestEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl StressTestEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_shock: config.default_stress_shock,
        }
    }

    /// Shock applied to symbols absent from a table
    pub fn default_shock(&self) -> f64 {
        self.default_shock
    }

    /// Apply a shock table to an equally weighted list of symbols
    ///
    /// # Example
    ///
    /// ```
    /// use qr_risk::{ShockTable, StressTestEngine};
    ///
    /// let engine = StressTestEngine::default();
    /// let result = engine
    ///     .apply_shocks(&["AAA", "BBB"], 100_000.0, &ShockTable::new(), "Default only")
    ///     .unwrap();
    ///
    /// assert_eq!(result.loss, 100_000.0 * 0.20);
    /// assert_eq!(result.worst_asset.as_deref(), Some("AAA"));
    /// ```
    pub fn apply_shocks<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        shocks: &ShockTable,
        scenario_name: &str,
    ) -> Result<StressTestResult> {
        if symbols.is_empty() {
            return Err(RiskError::InvalidParameter(
                "Stress test needs at least one symbol".to_string(),
            ));
        }

        if !portfolio_value.is_finite() || portfolio_value <= 0.0 {
            return Err(RiskError::InvalidParameter(format!(
                "Portfolio value must be positive, got {}",
                portfolio_value
            )));
        }

        let applied = symbols
            .iter()
            .map(|symbol| {
                let shock = shocks
                    .get(symbol.as_ref())
                    .copied()
                    .unwrap_or(self.default_shock);
                if shock.is_finite() {
                    Ok(shock)
                } else {
                    Err(RiskError::InvalidParameter(format!(
                        "Non-finite shock for {}",
                        symbol.as_ref()
                    )))
                }
            })
            .collect::<Result<Vec<f64>>>()?;

        let mut worst: Option<(usize, f64)> = None;
        for (index, shock) in applied.iter().enumerate() {
            let current = worst.map_or(0.0, |(_, w)| w.abs());
            if shock.abs() > current {
                worst = Some((index, *shock));
            }
        }

        // Σ (value / N) · shock_i, written as value · mean(shock)
        let pnl = portfolio_value * stats::mean(&applied);
        let loss = -pnl;

        Ok(StressTestResult {
            scenario_name: scenario_name.to_string(),
            loss,
            loss_percentage: loss / portfolio_value * 100.0,
            worst_asset: worst.map(|(index, _)| symbols[index].as_ref().to_string()),
            worst_asset_shock_pct: worst.map_or(0.0, |(_, shock)| shock * 100.0),
        })
    }

    /// Run a named scenario
    pub fn run_scenario<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        scenario: &StressScenario,
    ) -> Result<StressTestResult> {
        self.apply_shocks(symbols, portfolio_value, &scenario.shocks, &scenario.name)
    }

    /// Apply the same shock to every symbol
    pub fn custom_shock<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        shock: f64,
    ) -> Result<StressTestResult> {
        if !shock.is_finite() {
            return Err(RiskError::InvalidParameter(format!(
                "Custom shock must be finite, got {}",
                shock
            )));
        }

        let table: ShockTable = symbols
            .iter()
            .map(|symbol| (symbol.as_ref().to_string(), shock))
            .collect();
        self.apply_shocks(symbols, portfolio_value, &table, CUSTOM_STRESS)
    }

    /// Run multiple stress test scenarios
    pub fn run_scenarios<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        scenarios: &[StressScenario],
    ) -> Result<Vec<StressTestResult>> {
        scenarios
            .iter()
            .map(|scenario| self.run_scenario(symbols, portfolio_value, scenario))
            .collect()
    }

    /// Summarize scenario results into a report
    pub fn summarize(&self, results: &[StressTestResult]) -> Result<StressTestReport> {
        let first = results.first().ok_or_else(|| {
            RiskError::InsufficientData("No stress test results provided".to_string())
        })?;

        let mut worst = first;
        let mut mildest = first;
        let mut total_loss = 0.0;

        for result in results {
            total_loss += result.loss;

            if result.loss > worst.loss {
                worst = result;
            }

            if result.loss < mildest.loss {
                mildest = result;
            }
        }

        Ok(StressTestReport {
            results: results.to_vec(),
            worst_scenario: worst.scenario_name.clone(),
            max_loss: worst.loss,
            mildest_scenario: mildest.scenario_name.clone(),
            min_loss: mildest.loss,
            average_loss: total_loss / results.len() as f64,
        })
    }
}
