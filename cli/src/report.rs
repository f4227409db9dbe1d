//! Human-readable and JSON rendering of results

use anyhow::Result;
use qr_risk::{
    CorrelationMatrix, MonteCarloResult, ScenarioLibrary, StressTestReport, StressTestResult,
    VarResult,
};
use serde::Serialize;
use std::fmt::Write;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render as JSON when requested, otherwise with the given text renderer
pub fn render<T: Serialize>(value: &T, json: bool, text: fn(&T) -> String) -> Result<String> {
    if json {
        to_json(value)
    } else {
        Ok(text(value))
    }
}

pub fn var_text(result: &VarResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Historical VaR ===");
    let _ = writeln!(out, "Portfolio value:    ${:.2}", result.portfolio_value);
    let _ = writeln!(
        out,
        "Confidence:         {:.1}% over {} day(s)",
        result.confidence_level * 100.0,
        result.time_horizon_days
    );
    let _ = writeln!(
        out,
        "VaR:                ${:.2} ({:.2}%)",
        result.var_amount,
        result.var_percentage()
    );
    let _ = writeln!(out, "Expected Shortfall: ${:.2}", result.expected_shortfall);
    let _ = write!(out, "Volatility:         {:.2}%", result.volatility * 100.0);
    out
}

pub fn stress_text(result: &StressTestResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Stress Test: {} ===", result.scenario_name);
    let _ = writeln!(
        out,
        "Loss:        ${:.2} ({:.2}%)",
        result.loss, result.loss_percentage
    );
    match &result.worst_asset {
        Some(asset) => {
            let _ = write!(
                out,
                "Worst asset: {} ({:.2}%)",
                asset, result.worst_asset_shock_pct
            );
        }
        None => {
            let _ = write!(out, "Worst asset: none");
        }
    }
    out
}

pub fn stress_report_text(report: &StressTestReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Stress Test Report ===");
    let _ = writeln!(out, "{:<28} {:>16} {:>9}  Worst asset", "Scenario", "Loss", "Loss %");
    for result in &report.results {
        let _ = writeln!(
            out,
            "{:<28} {:>16.2} {:>8.2}%  {}",
            result.scenario_name,
            result.loss,
            result.loss_percentage,
            result.worst_asset.as_deref().unwrap_or("-")
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Worst scenario:   {} (${:.2})", report.worst_scenario, report.max_loss);
    let _ = writeln!(out, "Mildest scenario: {} (${:.2})", report.mildest_scenario, report.min_loss);
    let _ = write!(out, "Average loss:     ${:.2}", report.average_loss);
    out
}

pub fn correlation_text(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:>8}", "");
    for symbol in matrix.symbols() {
        let _ = write!(out, " {:>8}", symbol);
    }
    for (i, symbol) in matrix.symbols().iter().enumerate() {
        let _ = write!(out, "\n{:>8}", symbol);
        for j in 0..matrix.dimension() {
            let _ = write!(out, " {:>8.3}", matrix.value(i, j));
        }
    }
    out
}

pub fn monte_carlo_text(result: &MonteCarloResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Monte Carlo ({} simulations) ===",
        result.num_simulations
    );
    let _ = writeln!(out, "VaR 95%:       ${:.2}", result.var_95);
    let _ = writeln!(out, "VaR 99%:       ${:.2}", result.var_99);
    let _ = writeln!(out, "Expected loss: ${:.2}", result.expected_loss);
    let _ = writeln!(out, "Worst case:    ${:.2}", result.worst_case);
    let _ = write!(out, "Best case:     ${:.2}", result.best_case);
    out
}

pub fn scenarios_text(library: &ScenarioLibrary) -> String {
    library
        .scenarios()
        .iter()
        .map(|scenario| {
            let shocks = scenario
                .shocks
                .iter()
                .map(|(symbol, shock)| format!("{} {:+.0}%", symbol, shock * 100.0))
                .collect::<Vec<_>>()
                .join(", ");
            if scenario.description.is_empty() {
                format!("{}\n  {}", scenario.name, shocks)
            } else {
                format!("{}: {}\n  {}", scenario.name, scenario.description, shocks)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
