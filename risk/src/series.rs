//! Return series containers
//!
//! A `ReturnSeriesSet` keeps symbols in insertion order. That order is the
//! asset index used whenever the set is combined with a weights slice, so
//! the pairing is made explicit through [`WeightedSeries`] instead of being
//! left to two parallel collections.

use crate::error::{Result, RiskError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Chronologically ordered daily fractional returns for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    pub fn new(returns: Vec<f64>) -> Self {
        Self(returns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(returns: Vec<f64>) -> Self {
        Self(returns)
    }
}

impl AsRef<[f64]> for ReturnSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// One asset of a portfolio: its symbol, nominal weight and return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSeries {
    pub symbol: String,
    pub weight: f64,
    pub series: ReturnSeries,
}

impl WeightedSeries {
    pub fn new(symbol: impl Into<String>, weight: f64, series: impl Into<ReturnSeries>) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
            series: series.into(),
        }
    }
}

/// Symbol → return series, unique keys, stable insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeriesSet {
    series: IndexMap<String, ReturnSeries>,
}

impl ReturnSeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(symbol, series)` pairs, rejecting duplicates
    pub fn from_pairs<I, S, R>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: Into<ReturnSeries>,
    {
        let mut set = Self::new();
        for (symbol, series) in pairs {
            set.insert(symbol, series)?;
        }
        Ok(set)
    }

    /// Append a series; a symbol may only appear once
    pub fn insert(&mut self, symbol: impl Into<String>, series: impl Into<ReturnSeries>) -> Result<()> {
        let symbol = symbol.into();
        if self.series.contains_key(&symbol) {
            return Err(RiskError::InvalidParameter(format!(
                "Duplicate symbol in return series set: {}",
                symbol
            )));
        }
        self.series.insert(symbol, series.into());
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&ReturnSeries> {
        self.series.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Symbols in insertion order
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReturnSeries)> {
        self.series.iter().map(|(symbol, series)| (symbol.as_str(), series))
    }

    /// Length shared by every series in the set
    ///
    /// Fails with `InsufficientData` on an empty set and with
    /// `DimensionMismatch` naming the first series that disagrees with the
    /// first one.
    pub fn common_length(&self) -> Result<usize> {
        let mut iter = self.series.iter();
        let (_, first) = iter.next().ok_or_else(|| {
            RiskError::InsufficientData("Return series set is empty".to_string())
        })?;
        let expected = first.len();

        for (symbol, series) in iter {
            if series.len() != expected {
                return Err(RiskError::dimension(
                    format!("return series for {}", symbol),
                    expected,
                    series.len(),
                ));
            }
        }

        Ok(expected)
    }

    /// Pair the set with a weights slice aligned to insertion order
    ///
    /// `weights[i]` belongs to the i-th inserted symbol. The lengths must
    /// agree exactly.
    pub fn with_weights(&self, weights: &[f64]) -> Result<Vec<WeightedSeries>> {
        if weights.len() != self.series.len() {
            return Err(RiskError::dimension(
                "weights vector",
                self.series.len(),
                weights.len(),
            ));
        }

        Ok(self
            .series
            .iter()
            .zip(weights)
            .map(|((symbol, series), weight)| WeightedSeries {
                symbol: symbol.clone(),
                weight: *weight,
                series: series.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let set = ReturnSeriesSet::from_pairs(vec![
            ("MSFT", vec![0.01]),
            ("AAPL", vec![0.02]),
            ("GOOGL", vec![0.03]),
        ])
        .unwrap();

        let symbols: Vec<&str> = set.symbols().collect();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "GOOGL"]);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut set = ReturnSeriesSet::new();
        set.insert("SPY", vec![0.01]).unwrap();
        let err = set.insert("SPY", vec![0.02]).unwrap_err();
        assert!(matches!(err, RiskError::InvalidParameter(_)));
        assert_eq!(set.get("SPY").unwrap().as_slice(), &[0.01]);
    }

    #[test]
    fn test_common_length() {
        let set = ReturnSeriesSet::from_pairs(vec![("A", vec![0.0; 5]), ("B", vec![0.0; 5])]).unwrap();
        assert_eq!(set.common_length().unwrap(), 5);

        let ragged = ReturnSeriesSet::from_pairs(vec![("A", vec![0.0; 5]), ("B", vec![0.0; 4])]).unwrap();
        match ragged.common_length() {
            Err(RiskError::DimensionMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("Expected DimensionMismatch, got {:?}", other),
        }

        assert!(matches!(
            ReturnSeriesSet::new().common_length(),
            Err(RiskError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_with_weights_pairs_by_insertion_order() {
        let set = ReturnSeriesSet::from_pairs(vec![("B", vec![0.02]), ("A", vec![0.01])]).unwrap();
        let weighted = set.with_weights(&[0.7, 0.3]).unwrap();

        assert_eq!(weighted[0].symbol, "B");
        assert_eq!(weighted[0].weight, 0.7);
        assert_eq!(weighted[1].symbol, "A");
        assert_eq!(weighted[1].weight, 0.3);
    }

    #[test]
    fn test_with_weights_length_mismatch() {
        let set = ReturnSeriesSet::from_pairs(vec![("A", vec![0.01]), ("B", vec![0.02])]).unwrap();
        assert!(matches!(
            set.with_weights(&[1.0]),
            Err(RiskError::DimensionMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_series_serializes_as_plain_array() {
        let set = ReturnSeriesSet::from_pairs(vec![("A", vec![0.5, -0.25])]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"A":[0.5,-0.25]}"#);
    }
}
