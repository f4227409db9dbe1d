//! Pairwise Pearson correlation across return series

use crate::error::{Result, RiskError};
use crate::series::ReturnSeriesSet;
use nalgebra::DMatrix;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Square correlation matrix indexed by a symbol ordering
///
/// The diagonal is exactly 1.0 and `value(i, j) == value(j, i)` bit for bit.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    matrix: DMatrix<f64>,
}

impl CorrelationMatrix {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.symbols.len()
    }

    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    /// Correlation between two symbols by name
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.matrix[(i, j)])
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Row-major copy of the values
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CorrelationMatrix", 2)?;
        state.serialize_field("symbols", &self.symbols)?;
        state.serialize_field("values", &self.rows())?;
        state.end()
    }
}

/// Computes correlation matrices from return series
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build the |order| × |order| correlation matrix
    ///
    /// Each off-diagonal pair uses the overlapping prefix of the two series.
    /// A pair involving a constant (zero-variance) series has no defined
    /// correlation and is reported as 0 instead of an error.
    pub fn compute_correlation_matrix<S: AsRef<str>>(
        &self,
        returns: &ReturnSeriesSet,
        symbol_order: &[S],
    ) -> Result<CorrelationMatrix> {
        let series = symbol_order
            .iter()
            .map(|symbol| {
                returns
                    .get(symbol.as_ref())
                    .map(|s| s.as_slice())
                    .ok_or_else(|| RiskError::UnknownSymbol(symbol.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let n = series.len();
        let mut matrix = DMatrix::identity(n, n);

        for i in 0..n {
            for j in (i + 1)..n {
                let rho = pearson(series[i], series[j]);
                matrix[(i, j)] = rho;
                matrix[(j, i)] = rho;
            }
        }

        Ok(CorrelationMatrix {
            symbols: symbol_order.iter().map(|s| s.as_ref().to_string()).collect(),
            matrix,
        })
    }
}

/// Sum-based Pearson correlation over `min(len(x), len(y))` observations
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);

    if is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
        sum_y2 += yi * yi;
    }

    let n = n as f64;
    let numerator = n * sum_xy - sum_x * sum_y;
    let variance_product = (n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y);

    // Rounding can still leave a non-positive product for near-constant input
    if !(variance_product > 0.0) {
        return 0.0;
    }

    (numerator / variance_product.sqrt()).clamp(-1.0, 1.0)
}

/// True for empty or single-valued samples, whose variance is zero
fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}
