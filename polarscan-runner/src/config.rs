//! Serializable run configuration.
//!
//! A run config captures everything needed to reproduce a scan or backtest:
//! the symbol universe, the algorithm parameters, and the simulation
//! parameters. Validation happens when the raw tables are converted into
//! the engine's settings types, so out-of-range files are rejected before
//! any work starts.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use polarscan_core::engine::SimulationConfig;
use polarscan_core::settings::{AlgorithmParams, AlgorithmSettings, SettingsError};

/// Errors from interpreting a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid algorithm settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid simulation settings: {0}")]
    Simulation(String),
    #[error("empty symbol universe")]
    EmptyUniverse,
}

/// Serializable configuration for a scan or backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Symbols to scan or simulate.
    pub universe: Vec<String>,
    #[serde(default)]
    pub algorithm: AlgorithmParams,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl RunConfig {
    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a run id, which makes results
    /// cacheable and reproducible.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Validate the raw tables into engine-ready settings.
    pub fn to_components(&self) -> Result<(AlgorithmSettings, SimulationConfig), ConfigError> {
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let settings = AlgorithmSettings::new(self.algorithm.clone())?;
        validate_simulation(&self.simulation)?;
        Ok((settings, self.simulation.clone()))
    }
}

fn validate_simulation(simulation: &SimulationConfig) -> Result<(), ConfigError> {
    if simulation.entry_delay_minutes < 0 {
        return Err(ConfigError::Simulation(format!(
            "entry_delay_minutes must be >= 0, got {}",
            simulation.entry_delay_minutes
        )));
    }
    if !simulation.commission.is_finite() || simulation.commission < 0.0 {
        return Err(ConfigError::Simulation(format!(
            "commission must be >= 0, got {}",
            simulation.commission
        )));
    }
    for (name, value) in [
        ("stop_loss_percent", simulation.stop_loss_percent),
        ("take_profit_percent", simulation.take_profit_percent),
    ] {
        if let Some(value) = value {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Simulation(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
    }
    if let Some(days) = simulation.max_hold_days {
        if days < 1 {
            return Err(ConfigError::Simulation(format!(
                "max_hold_days must be >= 1, got {days}"
            )));
        }
    }
    Ok(())
}

/// Load a run configuration from a TOML file.
pub fn load_run_config(path: &Path) -> anyhow::Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading run config {}", path.display()))?;
    let config: RunConfig = toml::from_str(&text)
        .with_context(|| format!("parsing run config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarscan_core::settings::Timeframe;

    fn sample_config() -> RunConfig {
        RunConfig {
            universe: vec!["AAPL".into(), "MSFT".into()],
            algorithm: AlgorithmParams::default(),
            simulation: SimulationConfig::default(),
        }
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        let text = r#"
            universe = ["AAPL", "MSFT"]

            [algorithm]
            atr_multiplier = 3.0
            higher_timeframe = "1h"

            [simulation]
            stop_loss_percent = 5.0
            max_hold_days = 10
        "#;
        let config: RunConfig = toml::from_str(text).unwrap();
        assert_eq!(config.universe.len(), 2);
        assert_eq!(config.algorithm.atr_multiplier, 3.0);
        assert_eq!(config.algorithm.higher_timeframe, Timeframe::H1);
        assert_eq!(config.algorithm.fomo_filter, 1.0); // default
        assert_eq!(config.simulation.stop_loss_percent, Some(5.0));
        assert_eq!(config.simulation.entry_delay_minutes, 1); // default

        let (settings, simulation) = config.to_components().unwrap();
        assert_eq!(settings.atr_multiplier(), 3.0);
        assert_eq!(simulation.max_hold_days, Some(10));
    }

    #[test]
    fn run_id_is_deterministic_and_content_sensitive() {
        let config = sample_config();
        assert_eq!(config.run_id(), sample_config().run_id());

        let mut changed = sample_config();
        changed.algorithm.atr_multiplier = 2.5;
        assert_ne!(config.run_id(), changed.run_id());
    }

    #[test]
    fn out_of_range_algorithm_values_are_rejected() {
        let mut config = sample_config();
        config.algorithm.atr_multiplier = 99.0;
        assert!(matches!(
            config.to_components(),
            Err(ConfigError::Settings(_))
        ));
    }

    #[test]
    fn invalid_simulation_values_are_rejected() {
        let mut config = sample_config();
        config.simulation.commission = -1.0;
        assert!(matches!(
            config.to_components(),
            Err(ConfigError::Simulation(_))
        ));

        let mut config = sample_config();
        config.simulation.stop_loss_percent = Some(0.0);
        assert!(config.to_components().is_err());

        let mut config = sample_config();
        config.simulation.max_hold_days = Some(0);
        assert!(config.to_components().is_err());
    }

    #[test]
    fn empty_universe_is_rejected() {
        let mut config = sample_config();
        config.universe.clear();
        assert!(matches!(
            config.to_components(),
            Err(ConfigError::EmptyUniverse)
        ));
    }

    #[test]
    fn load_reads_a_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "universe = [\"SPY\"]\n").unwrap();
        let config = load_run_config(&path).unwrap();
        assert_eq!(config.universe, vec!["SPY".to_string()]);

        let missing = load_run_config(&dir.path().join("absent.toml"));
        assert!(missing.is_err());
    }
}
