//! Portfolio CSV loading
//!
//! Expected layout, one position per row after a header:
//!
//! ```text
//! symbol,weight,price,quantity
//! AAPL,0.4,150.0,267
//! ```

use anyhow::{Context, Result};
use qr_risk::{Portfolio, Position};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PositionRow {
    symbol: String,
    weight: f64,
    price: f64,
    quantity: f64,
}

pub fn load_portfolio(path: &Path) -> Result<Portfolio> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open portfolio file {}", path.display()))?;
    parse_portfolio(file).with_context(|| format!("Invalid portfolio file {}", path.display()))
}

pub fn parse_portfolio<R: Read>(reader: R) -> Result<Portfolio> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut positions = Vec::new();
    for row in reader.deserialize::<PositionRow>() {
        let row = row.map_err(|e| {
            let context = match e.position() {
                Some(position) => format!("Malformed row on line {}", position.line()),
                None => "Malformed row".to_string(),
            };
            anyhow::Error::new(e).context(context)
        })?;
        positions.push(Position::new(
            crate::normalize_symbol(&row.symbol),
            row.weight,
            row.price,
            row.quantity,
        ));
    }

    Ok(Portfolio::new(positions)?)
}
