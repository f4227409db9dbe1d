use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use qr_data::{MarketDataFetcher, SyntheticReturnProvider};
use qr_risk::{ReturnSeriesSet, RiskCalculator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod config;
mod portfolio_file;
mod report;

use config::AppConfig;

#[derive(Parser, Debug)]
#[clap(name = "quantrisk", version, about = "Portfolio risk calculator")]
struct Args {
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Historical VaR and Expected Shortfall
    Var {
        /// Comma-separated symbols
        #[clap(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// Comma-separated weights, equal weights when omitted
        #[clap(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        weights: Vec<f64>,

        /// Portfolio value
        #[clap(short, long)]
        value: f64,

        #[clap(long, default_value_t = 0.95)]
        confidence: f64,

        /// Horizon in trading days
        #[clap(long, default_value_t = 1)]
        days: u32,
    },

    /// Stress scenarios
    Stress {
        #[clap(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        #[clap(short, long)]
        value: f64,

        /// Library scenario to run
        #[clap(long, conflicts_with_all = ["shock", "all"])]
        scenario: Option<String>,

        /// Uniform shock applied to every symbol (-0.25 = -25%)
        #[clap(long, allow_negative_numbers = true, conflicts_with = "all")]
        shock: Option<f64>,

        /// Run every library scenario
        #[clap(long)]
        all: bool,
    },

    /// Pairwise correlation matrix
    Correlation {
        #[clap(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,
    },

    /// Monte Carlo loss simulation
    MonteCarlo {
        #[clap(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        #[clap(short, long)]
        value: f64,

        #[clap(short = 'n', long, default_value_t = 10_000)]
        simulations: usize,

        /// Seed for a reproducible run
        #[clap(long)]
        seed: Option<u64>,
    },

    /// VaR of a portfolio CSV (symbol,weight,price,quantity), printed as JSON
    Portfolio {
        #[clap(short, long)]
        file: PathBuf,

        #[clap(long, default_value_t = 0.95)]
        confidence: f64,

        #[clap(long, default_value_t = 1)]
        days: u32,
    },

    /// List the stress scenario library
    Scenarios,
}

/// Trimmed, upper-cased symbol
fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>> {
    let normalized: Vec<String> = symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .collect();

    if normalized.is_empty() {
        bail!("At least one symbol is required");
    }
    Ok(normalized)
}

/// Equal weights when none were given
fn resolve_weights(weights: &[f64], count: usize) -> Vec<f64> {
    if weights.is_empty() {
        vec![1.0 / count as f64; count]
    } else {
        weights.to_vec()
    }
}

struct App {
    config: AppConfig,
    calculator: RiskCalculator,
    fetcher: MarketDataFetcher,
}

impl App {
    fn new(config: AppConfig) -> Result<Self> {
        let scenarios = config.scenario_library()?;
        let calculator = RiskCalculator::new(config.engine.clone(), scenarios)?;
        let provider = SyntheticReturnProvider::new(config.synthetic.clone())?;
        let fetcher = MarketDataFetcher::new(Arc::new(provider), config.fetcher.clone())?;

        Ok(Self {
            config,
            calculator,
            fetcher,
        })
    }

    async fn fetch(&self, symbols: &[String]) -> Result<ReturnSeriesSet> {
        let returns = self
            .fetcher
            .fetch_returns(symbols, self.config.engine.lookback_days)
            .await
            .context("Failed to fetch market data")?;
        Ok(returns)
    }

    async fn run(&self, command: Command, json: bool) -> Result<String> {
        match command {
            Command::Var {
                symbols,
                weights,
                value,
                confidence,
                days,
            } => {
                let symbols = normalize_symbols(&symbols)?;
                let weights = resolve_weights(&weights, symbols.len());
                let returns = self.fetch(&symbols).await?;

                info!("Calculating {:.1}% VaR over {} day(s)", confidence * 100.0, days);
                let result = self
                    .calculator
                    .portfolio_var_aligned(&returns, &weights, value, confidence, days)?;
                report::render(&result, json, report::var_text)
            }

            Command::Stress {
                symbols,
                value,
                scenario,
                shock,
                all,
            } => {
                let symbols = normalize_symbols(&symbols)?;
                match (scenario, shock) {
                    (Some(name), _) => {
                        let result = self.calculator.stress_scenario(&name, &symbols, value)?;
                        report::render(&result, json, report::stress_text)
                    }
                    (None, Some(shock)) => {
                        let result = self.calculator.custom_stress(&symbols, value, shock)?;
                        report::render(&result, json, report::stress_text)
                    }
                    (None, None) => {
                        if !all {
                            info!("No scenario selected, running the whole library");
                        }
                        let report = self.calculator.stress_all(&symbols, value)?;
                        report::render(&report, json, report::stress_report_text)
                    }
                }
            }

            Command::Correlation { symbols } => {
                let symbols = normalize_symbols(&symbols)?;
                let returns = self.fetch(&symbols).await?;
                let matrix = self.calculator.correlation_matrix(&returns, &symbols)?;
                report::render(&matrix, json, report::correlation_text)
            }

            Command::MonteCarlo {
                symbols,
                value,
                simulations,
                seed,
            } => {
                let symbols = normalize_symbols(&symbols)?;
                info!("Running {} Monte Carlo simulations", simulations);
                let result = match seed {
                    Some(seed) => self
                        .calculator
                        .monte_carlo_seeded(&symbols, value, simulations, seed)?,
                    None => self.calculator.monte_carlo(
                        &symbols,
                        value,
                        simulations,
                        &mut rand::thread_rng(),
                    )?,
                };
                report::render(&result, json, report::monte_carlo_text)
            }

            Command::Portfolio {
                file,
                confidence,
                days,
            } => {
                info!("Loading portfolio from {:?}", file);
                let portfolio = portfolio_file::load_portfolio(&file)?;
                info!(
                    "Loaded {} position(s), total value ${:.2}",
                    portfolio.positions().len(),
                    portfolio.total_value()
                );

                let returns = self.fetch(&portfolio.symbols()).await?;
                let result = self
                    .calculator
                    .var_for_portfolio(&portfolio, &returns, confidence, days)?;
                report::to_json(&result)
            }

            Command::Scenarios => {
                let library = self.calculator.scenarios();
                if json {
                    report::to_json(library.scenarios())
                } else {
                    Ok(report::scenarios_text(library))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        info!("Loading configuration from {:?}", path);
    }
    let config = AppConfig::load_or_default(args.config.as_deref())?;
    let app = App::new(config)?;

    let output = app.run(args.command, args.json).await?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_stress_with_negative_shock() {
        let args = Args::parse_from(["quantrisk", "stress", "-s", "spy,qqq", "-v", "1000", "--shock", "-0.3"]);
        match args.command {
            Command::Stress { symbols, shock, .. } => {
                assert_eq!(symbols, vec!["spy", "qqq"]);
                assert_eq!(shock, Some(-0.3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_scenario_and_shock_conflict() {
        let result = Args::try_parse_from([
            "quantrisk", "stress", "-s", "SPY", "-v", "1000", "--scenario", "COVID-19 Crash", "--shock", "-0.1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_symbols() {
        let symbols = vec![" aapl ".to_string(), "".to_string(), "Msft".to_string()];
        assert_eq!(normalize_symbols(&symbols).unwrap(), vec!["AAPL", "MSFT"]);
        assert!(normalize_symbols(&[" ".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_weights() {
        assert_eq!(resolve_weights(&[], 4), vec![0.25; 4]);
        assert_eq!(resolve_weights(&[0.7, 0.3], 2), vec![0.7, 0.3]);
    }

    #[tokio::test]
    async fn test_custom_stress_json() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Stress {
            symbols: vec!["spy".to_string(), "qqq".to_string()],
            value: 100_000.0,
            scenario: None,
            shock: Some(-0.1),
            all: false,
        };

        let output = app.run(command, true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_relative_eq!(value["loss"].as_f64().unwrap(), 10_000.0, epsilon = 1e-9);
        assert_eq!(value["worst_asset"], "SPY");
    }

    #[tokio::test]
    async fn test_unknown_scenario_fails() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Stress {
            symbols: vec!["SPY".to_string()],
            value: 1000.0,
            scenario: Some("Dot-com Bust".to_string()),
            shock: None,
            all: false,
        };
        assert!(app.run(command, false).await.is_err());
    }

    #[tokio::test]
    async fn test_var_json_with_equal_weights() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Var {
            symbols: vec!["aapl".to_string(), " msft ".to_string()],
            weights: vec![],
            value: 100_000.0,
            confidence: 0.99,
            days: 5,
        };

        let output = app.run(command, true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["portfolio_value"], 100_000.0);
        assert_eq!(value["confidence_level"], 0.99);
        assert_eq!(value["time_horizon_days"], 5);
        let var_amount = value["var_amount"].as_f64().unwrap();
        assert!(var_amount > 0.0);
        assert!(value["expected_shortfall"].as_f64().unwrap() >= var_amount);
        assert!(value["volatility"].as_f64().unwrap() > 0.0);
        assert_relative_eq!(
            value["var_percentage"].as_f64().unwrap(),
            var_amount / 100_000.0 * 100.0,
            epsilon = 1e-9
        );
    }

    #[tokio::test]
    async fn test_correlation_json() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Correlation {
            symbols: vec!["spy".to_string(), "tlt".to_string(), "gld".to_string()],
        };

        let output = app.run(command, true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["symbols"], serde_json::json!(["SPY", "TLT", "GLD"]));
        let rows = value["values"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        for i in 0..3 {
            assert_eq!(rows[i][i], 1.0);
            for j in 0..3 {
                let rho = rows[i][j].as_f64().unwrap();
                assert!((-1.0..=1.0).contains(&rho));
                assert_eq!(rows[i][j], rows[j][i]);
            }
        }
    }

    #[tokio::test]
    async fn test_var_with_mismatched_weights_fails() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Var {
            symbols: vec!["SPY".to_string(), "QQQ".to_string()],
            weights: vec![1.0],
            value: 1000.0,
            confidence: 0.95,
            days: 1,
        };
        assert!(app.run(command, false).await.is_err());
    }

    #[tokio::test]
    async fn test_portfolio_batch_outputs_json() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = Command::Portfolio {
            file: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/portfolio.csv")),
            confidence: 0.95,
            days: 1,
        };

        let output = app.run(command, false).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_relative_eq!(value["portfolio_value"].as_f64().unwrap(), 100_200.0, epsilon = 1e-6);
        assert_eq!(value["confidence_level"], 0.95);
        assert!(value["var_amount"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_seeded_monte_carlo_is_reproducible() {
        let app = App::new(AppConfig::default()).unwrap();
        let command = || Command::MonteCarlo {
            symbols: vec!["AAPL".to_string()],
            value: 50_000.0,
            simulations: 500,
            seed: Some(11),
        };

        let first = app.run(command(), true).await.unwrap();
        let second = app.run(command(), true).await.unwrap();
        assert_eq!(first, second);
    }
}
