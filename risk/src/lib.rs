//! # qr-risk: Portfolio Risk Calculation Engine
//!
//! Turns per-asset daily return series and portfolio weights into risk
//! statistics. Every calculation is a synchronous, pure function of its
//! inputs; the only randomness comes from a generator the caller passes in
//! (or a seed scoped to one call).
//!
//! ## Core Components
//!
//! - **PortfolioAggregator**: weighted combination of asset return series
//! - **VarCalculator**: historical-simulation VaR, Expected Shortfall and
//!   annualized volatility
//! - **CorrelationEngine**: pairwise Pearson correlation matrix
//! - **StressTestEngine**: scenario shock application
//! - **MonteCarloEngine**: independent Gaussian loss simulation
//! - **RiskCalculator**: facade tying the above to one configuration and
//!   scenario library
//!
//! ## Example Usage
//!
//! ```rust
//! use qr_risk::{RiskCalculator, WeightedSeries};
//!
//! let calculator = RiskCalculator::default();
//!
//! let assets = vec![
//!     WeightedSeries::new("A", 0.5, vec![-0.01; 100]),
//!     WeightedSeries::new("B", 0.5, vec![-0.01; 100]),
//! ];
//!
//! let result = calculator.portfolio_var(&assets, 1_000_000.0, 0.95, 1).unwrap();
//! assert!((result.var_amount - 10_000.0).abs() < 1e-6);
//! assert!((result.expected_shortfall - 10_000.0).abs() < 1e-6);
//! assert_eq!(result.volatility, 0.0);
//! ```

mod config;
mod correlation;
mod engine;
mod error;
mod monte_carlo;
mod portfolio;
mod scenarios;
mod series;
mod stats;
mod stress;
mod var;

pub use config::EngineConfig;
pub use correlation::{pearson, CorrelationEngine, CorrelationMatrix};
pub use engine::RiskCalculator;
pub use error::{Result, RiskError};
pub use monte_carlo::{MonteCarloEngine, MonteCarloResult};
pub use portfolio::{Portfolio, PortfolioAggregator, Position};
pub use scenarios::{ScenarioLibrary, ShockTable, StressScenario, COVID_19_CRASH, FINANCIAL_CRISIS_2008};
pub use series::{ReturnSeries, ReturnSeriesSet, WeightedSeries};
pub use stress::{StressTestEngine, StressTestReport, StressTestResult, CUSTOM_STRESS};
pub use var::{VarCalculator, VarResult};
