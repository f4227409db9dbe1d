//! Portfolio positions and return aggregation
//!
//! Provides:
//! - `Portfolio`: immutable set of positions loaded once from input
//! - `PortfolioAggregator`: weighted combination of asset return series
//!   into a single portfolio return series

use crate::error::{Result, RiskError};
use crate::series::{ReturnSeries, ReturnSeriesSet, WeightedSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Position in a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Asset symbol (e.g., "AAPL")
    pub symbol: String,

    /// Nominal weight; informational, not derived from price × quantity
    pub weight: f64,

    /// Current price per unit
    pub price: f64,

    /// Units held
    pub quantity: f64,
}

impl Position {
    pub fn new(symbol: impl Into<String>, weight: f64, price: f64, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
            price,
            quantity,
        }
    }

    /// Market value of the position (price × quantity)
    pub fn market_value(&self) -> f64 {
        self.price * self.quantity
    }
}

/// Immutable portfolio built once from its positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    /// Create a portfolio, rejecting empty input and repeated symbols
    pub fn new(positions: Vec<Position>) -> Result<Self> {
        if positions.is_empty() {
            return Err(RiskError::InvalidParameter(
                "Portfolio must contain at least one position".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for position in &positions {
            if !seen.insert(position.symbol.as_str()) {
                return Err(RiskError::InvalidParameter(format!(
                    "Duplicate position for symbol {}",
                    position.symbol
                )));
            }
        }

        Ok(Self { positions })
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Symbols in position order
    pub fn symbols(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.symbol.clone()).collect()
    }

    /// Nominal weights in position order
    pub fn weights(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.weight).collect()
    }

    /// Total value as Σ price × quantity, independent of the weights
    pub fn total_value(&self) -> f64 {
        self.positions.iter().map(Position::market_value).sum()
    }

    /// Pair every position with its return series by symbol lookup
    pub fn weighted_series(&self, returns: &ReturnSeriesSet) -> Result<Vec<WeightedSeries>> {
        self.positions
            .iter()
            .map(|position| {
                let series = returns
                    .get(&position.symbol)
                    .ok_or_else(|| RiskError::UnknownSymbol(position.symbol.clone()))?;
                Ok(WeightedSeries {
                    symbol: position.symbol.clone(),
                    weight: position.weight,
                    series: series.clone(),
                })
            })
            .collect()
    }
}

/// Combines weighted asset return series into a portfolio return series
///
/// `portfolio[t] = Σ_i weight_i * returns_i[t]`
///
/// Weights are applied as given. They are not normalized to sum to one;
/// that is left to the caller, so leveraged or partially invested weight
/// vectors are expressible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate an explicit list of `(symbol, weight, series)` assets
    pub fn aggregate(&self, assets: &[WeightedSeries]) -> Result<ReturnSeries> {
        let first = assets.first().ok_or_else(|| {
            RiskError::InsufficientData("No assets to aggregate".to_string())
        })?;
        let length = first.series.len();

        for asset in assets {
            if asset.series.len() != length {
                return Err(RiskError::dimension(
                    format!("return series for {}", asset.symbol),
                    length,
                    asset.series.len(),
                ));
            }

            if !asset.weight.is_finite() {
                return Err(RiskError::InvalidParameter(format!(
                    "Non-finite weight for {}",
                    asset.symbol
                )));
            }

            if let Some(t) = asset.series.iter().position(|r| !r.is_finite()) {
                return Err(RiskError::InvalidParameter(format!(
                    "Non-finite return for {} at observation {}",
                    asset.symbol, t
                )));
            }
        }

        let portfolio_returns = (0..length)
            .map(|t| {
                assets
                    .iter()
                    .fold(0.0, |acc, asset| acc + asset.weight * asset.series.as_slice()[t])
            })
            .collect();

        Ok(ReturnSeries::new(portfolio_returns))
    }

    /// Aggregate a set with a weights slice aligned to its insertion order
    pub fn aggregate_aligned(&self, returns: &ReturnSeriesSet, weights: &[f64]) -> Result<ReturnSeries> {
        let assets = returns.with_weights(weights)?;
        self.aggregate(&assets)
    }
}
