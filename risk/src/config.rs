//! Engine configuration
//!
//! The numeric constants that the calculators rely on live here instead of
//! being scattered through the code as literals. Every field has a default
//! so a partial YAML document is enough.

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};

/// Risk engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trading days per year used to annualize daily volatility
    pub trading_days_per_year: u32,

    /// Daily volatility of each simulated asset in the Monte Carlo model
    pub monte_carlo_daily_volatility: f64,

    /// Shock applied to symbols missing from a stress scenario (-0.20 = -20%)
    pub default_stress_shock: f64,

    /// Number of daily observations requested from the data source
    pub lookback_days: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            monte_carlo_daily_volatility: 0.02,
            default_stress_shock: -0.20,
            lookback_days: 252,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML
    ///
    /// # Example
    ///
    /// ```
    /// use qr_risk::EngineConfig;
    ///
    /// let config = EngineConfig::from_yaml("default_stress_shock: -0.25").unwrap();
    /// assert_eq!(config.default_stress_shock, -0.25);
    /// assert_eq!(config.trading_days_per_year, 252);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)
            .map_err(|e| RiskError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the calculators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.trading_days_per_year == 0 {
            return Err(RiskError::Config(
                "trading_days_per_year must be positive".to_string(),
            ));
        }

        if !self.monte_carlo_daily_volatility.is_finite() || self.monte_carlo_daily_volatility < 0.0
        {
            return Err(RiskError::Config(format!(
                "monte_carlo_daily_volatility must be a non-negative number, got {}",
                self.monte_carlo_daily_volatility
            )));
        }

        if !self.default_stress_shock.is_finite() {
            return Err(RiskError::Config(
                "default_stress_shock must be finite".to_string(),
            ));
        }

        if self.lookback_days == 0 {
            return Err(RiskError::Config(
                "lookback_days must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
