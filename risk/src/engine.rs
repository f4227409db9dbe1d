//! Risk calculation facade
//!
//! `RiskCalculator` bundles the individual calculators behind one
//! configuration and scenario library and routes each request to the
//! component that handles it. It holds no mutable state, so one instance
//! can be shared freely across threads.

use crate::config::EngineConfig;
use crate::correlation::{CorrelationEngine, CorrelationMatrix};
use crate::error::Result;
use crate::monte_carlo::{MonteCarloEngine, MonteCarloResult};
use crate::portfolio::{Portfolio, PortfolioAggregator};
use crate::scenarios::ScenarioLibrary;
use crate::series::{ReturnSeriesSet, WeightedSeries};
use crate::stress::{StressTestEngine, StressTestReport, StressTestResult};
use crate::var::{VarCalculator, VarResult};
use rand::Rng;

/// Risk calculation engine
#[derive(Debug, Clone)]
pub struct RiskCalculator {
    config: EngineConfig,
    scenarios: ScenarioLibrary,
    aggregator: PortfolioAggregator,
    var: VarCalculator,
    correlation: CorrelationEngine,
    stress: StressTestEngine,
    monte_carlo: MonteCarloEngine,
}

impl Default for RiskCalculator {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self::build(config, ScenarioLibrary::builtin())
    }
}

impl RiskCalculator {
    /// Create a calculator from a configuration and scenario library
    pub fn new(config: EngineConfig, scenarios: ScenarioLibrary) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scenarios))
    }

    /// Load the engine configuration from YAML, using the built-in scenarios
    ///
    /// # Example
    ///
    /// ```
    /// use qr_risk::RiskCalculator;
    ///
    /// let calculator = RiskCalculator::from_yaml("default_stress_shock: -0.30").unwrap();
    /// let result = calculator.custom_stress(&["ABC"], 1000.0, -0.10).unwrap();
    /// assert!((result.loss - 100.0).abs() < 1e-9);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = EngineConfig::from_yaml(yaml)?;
        Ok(Self::build(config, ScenarioLibrary::builtin()))
    }

    fn build(config: EngineConfig, scenarios: ScenarioLibrary) -> Self {
        Self {
            aggregator: PortfolioAggregator::new(),
            var: VarCalculator::new(&config),
            correlation: CorrelationEngine::new(),
            stress: StressTestEngine::new(&config),
            monte_carlo: MonteCarloEngine::new(&config),
            config,
            scenarios,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scenarios(&self) -> &ScenarioLibrary {
        &self.scenarios
    }

    /// Historical VaR of a weighted set of assets
    pub fn portfolio_var(
        &self,
        assets: &[WeightedSeries],
        portfolio_value: f64,
        confidence_level: f64,
        time_horizon_days: u32,
    ) -> Result<VarResult> {
        let portfolio_returns = self.aggregator.aggregate(assets)?;
        self.var.compute_var(
            portfolio_returns.as_slice(),
            portfolio_value,
            confidence_level,
            time_horizon_days,
        )
    }

    /// Historical VaR with weights aligned to the set's insertion order
    pub fn portfolio_var_aligned(
        &self,
        returns: &ReturnSeriesSet,
        weights: &[f64],
        portfolio_value: f64,
        confidence_level: f64,
        time_horizon_days: u32,
    ) -> Result<VarResult> {
        let assets = returns.with_weights(weights)?;
        self.portfolio_var(&assets, portfolio_value, confidence_level, time_horizon_days)
    }

    /// Historical VaR of a loaded portfolio, valued at Σ price × quantity
    pub fn var_for_portfolio(
        &self,
        portfolio: &Portfolio,
        returns: &ReturnSeriesSet,
        confidence_level: f64,
        time_horizon_days: u32,
    ) -> Result<VarResult> {
        let assets = portfolio.weighted_series(returns)?;
        self.portfolio_var(
            &assets,
            portfolio.total_value(),
            confidence_level,
            time_horizon_days,
        )
    }

    /// Run a scenario from the library by name
    pub fn stress_scenario<S: AsRef<str>>(
        &self,
        scenario_name: &str,
        symbols: &[S],
        portfolio_value: f64,
    ) -> Result<StressTestResult> {
        let scenario = self.scenarios.require(scenario_name)?;
        self.stress.run_scenario(symbols, portfolio_value, scenario)
    }

    /// Apply one shock to every symbol
    pub fn custom_stress<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        shock: f64,
    ) -> Result<StressTestResult> {
        self.stress.custom_shock(symbols, portfolio_value, shock)
    }

    /// Run every library scenario and summarize
    pub fn stress_all<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
    ) -> Result<StressTestReport> {
        let results = self
            .stress
            .run_scenarios(symbols, portfolio_value, self.scenarios.scenarios())?;
        self.stress.summarize(&results)
    }

    pub fn correlation_matrix<S: AsRef<str>>(
        &self,
        returns: &ReturnSeriesSet,
        symbol_order: &[S],
    ) -> Result<CorrelationMatrix> {
        self.correlation.compute_correlation_matrix(returns, symbol_order)
    }

    /// Monte Carlo simulation with a caller-supplied generator
    pub fn monte_carlo<S, R>(
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
        self.monte_carlo
            .simulate(symbols, portfolio_value, num_simulations, rng)
    }

    /// Monte Carlo simulation with a generator scoped to this call
    pub fn monte_carlo_seeded<S: AsRef<str>>(
        &self,
        symbols: &[S],
        portfolio_value: f64,
        num_simulations: usize,
        seed: u64,
    ) -> Result<MonteCarloResult> {
        self.monte_carlo
            .simulate_seeded(symbols, portfolio_value, num_simulations, seed)
    }
}
