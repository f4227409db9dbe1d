//! Named stress scenarios
//!
//! Shock tables live here, outside the stress engine, so scenarios can be
//! added from configuration without touching the engine.

use crate::error::{Result, RiskError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Symbol → fractional shock (e.g., -0.37 for -37%)
pub type ShockTable = IndexMap<String, f64>;

pub const FINANCIAL_CRISIS_2008: &str = "2008 Financial Crisis";
pub const COVID_19_CRASH: &str = "COVID-19 Crash";

/// Peak-to-trough moves, autumn 2008
const FINANCIAL_CRISIS_2008_SHOCKS: &[(&str, f64)] = &[
    ("SPY", -0.37),
    ("QQQ", -0.42),
    ("IWM", -0.34),
    ("AAPL", -0.56),
    ("MSFT", -0.44),
    ("GOOGL", -0.65),
];

/// March 2020
const COVID_19_CRASH_SHOCKS: &[(&str, f64)] = &[
    ("SPY", -0.34),
    ("QQQ", -0.25),
    ("IWM", -0.41),
    ("AAPL", -0.17),
    ("MSFT", -0.20),
    ("GOOGL", -0.21),
];

/// Stress test scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Scenario name
    pub name: String,

    /// Scenario description
    #[serde(default)]
    pub description: String,

    /// Market shocks by symbol
    pub shocks: ShockTable,
}

impl StressScenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>, shocks: ShockTable) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            shocks,
        }
    }

    fn from_table(name: &str, description: &str, table: &[(&str, f64)]) -> Self {
        let shocks = table
            .iter()
            .map(|(symbol, shock)| (symbol.to_string(), *shock))
            .collect();
        Self::new(name, description, shocks)
    }

    /// Built-in 2008 Financial Crisis scenario
    pub fn financial_crisis_2008() -> Self {
        Self::from_table(
            FINANCIAL_CRISIS_2008,
            "Lehman Brothers collapse and credit crisis",
            FINANCIAL_CRISIS_2008_SHOCKS,
        )
    }

    /// Built-in COVID-19 crash scenario
    pub fn covid_19_crash() -> Self {
        Self::from_table(
            COVID_19_CRASH,
            "Pandemic-induced market crash, March 2020",
            COVID_19_CRASH_SHOCKS,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RiskError::Config("Scenario name must not be empty".to_string()));
        }
        for (symbol, shock) in &self.shocks {
            if !shock.is_finite() {
                return Err(RiskError::Config(format!(
                    "Scenario {} has a non-finite shock for {}",
                    self.name, symbol
                )));
            }
        }
        Ok(())
    }
}

/// Ordered collection of named scenarios
///
/// Typically loaded from YAML:
///
/// ```
/// use qr_risk::ScenarioLibrary;
///
/// let yaml = r#"
/// scenarios:
///   - name: Tech Selloff
///     shocks:
///       QQQ: -0.30
///       AAPL: -0.35
/// "#;
///
/// let library = ScenarioLibrary::from_yaml(yaml).unwrap();
/// assert_eq!(library.get("Tech Selloff").unwrap().shocks["QQQ"], -0.30);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLibrary {
    scenarios: Vec<StressScenario>,
}

impl ScenarioLibrary {
    /// Create a library, rejecting duplicate names
    pub fn new(scenarios: Vec<StressScenario>) -> Result<Self> {
        let mut library = Self::default();
        for scenario in scenarios {
            library.add(scenario)?;
        }
        Ok(library)
    }

    /// The built-in scenarios: 2008 Financial Crisis and COVID-19 Crash
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                StressScenario::financial_crisis_2008(),
                StressScenario::covid_19_crash(),
            ],
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let parsed: ScenarioLibrary = serde_yaml::from_str(yaml)
            .map_err(|e| RiskError::Config(format!("Failed to parse YAML: {}", e)))?;
        Self::new(parsed.scenarios)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: ScenarioLibrary = serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("Failed to parse JSON: {}", e)))?;
        Self::new(parsed.scenarios)
    }

    /// Add a scenario; names are unique
    pub fn add(&mut self, scenario: StressScenario) -> Result<()> {
        scenario.validate()?;
        if self.get(&scenario.name).is_some() {
            return Err(RiskError::Config(format!(
                "Duplicate scenario name: {}",
                scenario.name
            )));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Add every scenario of `other`, keeping the existing entry on a name clash
    pub fn merge(&mut self, other: ScenarioLibrary) {
        for scenario in other.scenarios {
            if self.get(&scenario.name).is_none() {
                self.scenarios.push(scenario);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&StressScenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Like `get`, failing with `UnknownScenario`
    pub fn require(&self, name: &str) -> Result<&StressScenario> {
        self.get(name)
            .ok_or_else(|| RiskError::UnknownScenario(name.to_string()))
    }

    pub fn scenarios(&self) -> &[StressScenario] {
        &self.scenarios
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
