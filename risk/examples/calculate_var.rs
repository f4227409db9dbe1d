//! VaR, stress and Monte Carlo walkthrough
//!
//! Run with: cargo run --example calculate_var

use qr_risk::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Portfolio Risk Example ===\n");

    // 1. Two assets, 100 days of returns each
    let spy: Vec<f64> = (0..100)
        .map(|i| (i as f64 * 0.1).sin() * 0.01 + ((i * 17) % 100) as f64 / 100.0 * 0.005 - 0.0025)
        .collect();
    let tlt: Vec<f64> = (0..100).map(|i| (i as f64 * 0.23).cos() * 0.008).collect();

    let assets = vec![
        WeightedSeries::new("SPY", 0.6, spy.clone()),
        WeightedSeries::new("TLT", 0.4, tlt.clone()),
    ];

    let calculator = RiskCalculator::default();
    let portfolio_value = 1_000_000.0;

    // 2. Historical VaR at two confidence levels
    for confidence in [0.95, 0.99] {
        let result = calculator.portfolio_var(&assets, portfolio_value, confidence, 1)?;
        println!("--- Historical VaR ({:.0}%) ---", confidence * 100.0);
        println!("VaR:                ${:.2} ({:.2}%)", result.var_amount, result.var_percentage());
        println!("Expected Shortfall: ${:.2}", result.expected_shortfall);
        println!("Volatility:         {:.2}%", result.volatility * 100.0);
        println!();
    }

    // 3. Correlation
    let returns = ReturnSeriesSet::from_pairs(vec![("SPY", spy), ("TLT", tlt)])?;
    let matrix = calculator.correlation_matrix(&returns, &["SPY", "TLT"])?;
    println!("SPY/TLT correlation: {:.3}\n", matrix.value(0, 1));

    // 4. Stress scenarios
    let report = calculator.stress_all(&["SPY", "TLT"], portfolio_value)?;
    for result in &report.results {
        println!("{:<24} loss ${:>12.2} ({:.2}%)", result.scenario_name, result.loss, result.loss_percentage);
    }
    println!("Worst scenario: {}\n", report.worst_scenario);

    // 5. Monte Carlo
    let simulated = calculator.monte_carlo_seeded(&["SPY", "TLT"], portfolio_value, 10_000, 42)?;
    println!("Monte Carlo VaR 95%: ${:.2}", simulated.var_95);
    println!("Monte Carlo VaR 99%: ${:.2}", simulated.var_99);

    Ok(())
}
