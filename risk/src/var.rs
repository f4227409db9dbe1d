//! Historical-simulation Value at Risk
//!
//! VaR and Expected Shortfall come straight from the empirical distribution
//! of one-day portfolio returns:
//! - VaR_α = -sorted[⌊(1 - α) · L⌋] · value · √T
//! - ES_α  = -mean(sorted[0..=⌊(1 - α) · L⌋]) · value · √T
//!
//! The √T horizon scaling assumes i.i.d. normal returns. It is a known
//! simplification for multi-day horizons.

use crate::config::EngineConfig;
use crate::error::{Result, RiskError};
use crate::stats;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// VaR calculation result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VarResult {
    /// Portfolio value the figures are expressed against
    pub portfolio_value: f64,

    /// VaR amount (positive value represents potential loss)
    pub var_amount: f64,

    /// Confidence level (e.g., 0.95, 0.99)
    pub confidence_level: f64,

    /// Average loss at or beyond the VaR observation, same scaling as VaR
    pub expected_shortfall: f64,

    /// Time horizon in days
    pub time_horizon_days: u32,

    /// Annualized volatility of the unscaled daily returns
    pub volatility: f64,
}

impl VarResult {
    /// VaR as a percentage of portfolio value
    pub fn var_percentage(&self) -> f64 {
        self.var_amount / self.portfolio_value * 100.0
    }
}

// Written by hand so the derived percentage shows up in serialized output
// without being stored on the struct.
impl Serialize for VarResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VarResult", 7)?;
        state.serialize_field("portfolio_value", &self.portfolio_value)?;
        state.serialize_field("var_amount", &self.var_amount)?;
        state.serialize_field("var_percentage", &self.var_percentage())?;
        state.serialize_field("confidence_level", &self.confidence_level)?;
        state.serialize_field("expected_shortfall", &self.expected_shortfall)?;
        state.serialize_field("time_horizon_days", &self.time_horizon_days)?;
        state.serialize_field("volatility", &self.volatility)?;
        state.end()
    }
}

/// Historical VaR calculator
#[derive(Debug, Clone)]
pub struct VarCalculator {
    trading_days_per_year: u32,
}

impl Default for VarCalculator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl VarCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            trading_days_per_year: config.trading_days_per_year,
        }
    }

    /// Compute VaR, Expected Shortfall and annualized volatility
    ///
    /// With very high confidence on a short sample the tail index is 0:
    /// VaR is then the single worst observation and ES averages over
    /// exactly that one observation.
    ///
    /// # Example
    ///
    /// ```
    /// use qr_risk::VarCalculator;
    ///
    /// let returns = vec![-0.01; 100];
    /// let result = VarCalculator::default()
    ///     .compute_var(&returns, 1_000_000.0, 0.95, 1)
    ///     .unwrap();
    ///
    /// assert!((result.var_amount - 10_000.0).abs() < 1e-6);
    /// assert_eq!(result.volatility, 0.0);
    /// ```
    pub fn compute_var(
        &self,
        portfolio_returns: &[f64],
        portfolio_value: f64,
        confidence_level: f64,
        time_horizon_days: u32,
    ) -> Result<VarResult> {
        validate_inputs(portfolio_value, confidence_level, time_horizon_days)?;

        if portfolio_returns.is_empty() {
            return Err(RiskError::InsufficientData(
                "Portfolio return series is empty".to_string(),
            ));
        }

        if let Some(position) = portfolio_returns.iter().position(|r| !r.is_finite()) {
            return Err(RiskError::InvalidParameter(format!(
                "Non-finite portfolio return at observation {}",
                position
            )));
        }

        let sorted_returns = stats::sorted_ascending(portfolio_returns);
        let var_index = stats::tail_index(1.0 - confidence_level, sorted_returns.len());

        let time_scaling = (time_horizon_days as f64).sqrt();
        let var_amount = -sorted_returns[var_index] * portfolio_value * time_scaling;

        let tail_mean = stats::mean(&sorted_returns[..=var_index]);
        let expected_shortfall = -tail_mean * portfolio_value * time_scaling;

        let variance = stats::population_variance(portfolio_returns);
        let volatility = (variance * self.trading_days_per_year as f64).sqrt();

        Ok(VarResult {
            portfolio_value,
            var_amount,
            confidence_level,
            expected_shortfall,
            time_horizon_days,
            volatility,
        })
    }
}

/// Validate common input parameters
fn validate_inputs(portfolio_value: f64, confidence_level: f64, time_horizon_days: u32) -> Result<()> {
    if !portfolio_value.is_finite() || portfolio_value <= 0.0 {
        return Err(RiskError::InvalidParameter(format!(
            "Portfolio value must be positive, got {}",
            portfolio_value
        )));
    }

    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(RiskError::InvalidParameter(format!(
            "Confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }

    if time_horizon_days == 0 {
        return Err(RiskError::InvalidParameter(
            "Time horizon must be at least one day".to_string(),
        ));
    }

    Ok(())
}
