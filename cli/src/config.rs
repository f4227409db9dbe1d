use anyhow::{bail, Context, Result};
use qr_data::{FetcherConfig, SyntheticProviderConfig};
use qr_risk::{EngineConfig, ScenarioLibrary, ShockTable, StressScenario};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub fetcher: FetcherConfig,
    pub synthetic: SyntheticProviderConfig,
    /// Extra stress scenarios (YAML, or JSON by extension)
    pub scenario_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&contents)?;

        // Scenario paths are relative to the config file
        if let (Some(file), Some(dir)) = (config.scenario_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }

        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml).context("Invalid configuration")?;
        config.engine.validate()?;
        config.fetcher.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Scenarios from the configured file, with the built-ins filling in
    /// any name the file does not define
    pub fn scenario_library(&self) -> Result<ScenarioLibrary> {
        let mut library = match &self.scenario_file {
            Some(path) => load_scenarios(path)?,
            None => return Ok(ScenarioLibrary::builtin()),
        };
        library.merge(ScenarioLibrary::builtin());
        Ok(library)
    }
}

fn load_scenarios(path: &Path) -> Result<ScenarioLibrary> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;

    let library = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ScenarioLibrary::from_json(&contents),
        _ => ScenarioLibrary::from_yaml(&contents),
    }
    .with_context(|| format!("Invalid scenario file {}", path.display()))?;

    normalize_shock_keys(&library)
        .with_context(|| format!("Invalid scenario file {}", path.display()))
}

/// Rewrite shock keys the way command-line symbols are written
fn normalize_shock_keys(library: &ScenarioLibrary) -> Result<ScenarioLibrary> {
    let scenarios = library
        .scenarios()
        .iter()
        .map(|scenario| {
            let mut shocks = ShockTable::new();
            for (symbol, shock) in &scenario.shocks {
                let key = crate::normalize_symbol(symbol);
                if shocks.insert(key.clone(), *shock).is_some() {
                    bail!(
                        "Scenario '{}' lists {} more than once",
                        scenario.name,
                        key
                    );
                }
            }
            Ok(StressScenario::new(
                scenario.name.clone(),
                scenario.description.clone(),
                shocks,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScenarioLibrary::new(scenarios)?)
}
