use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use super::error::Error;
use arb_solver_core::EngineConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    pub buffer_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearcherConfig {
    pub source_asset: String,
    pub timeout_ms: u64,
    #[serde(default = "default_skip_stale")]
    pub skip_stale: bool,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_skip_stale() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BaseRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub interval_ms: u64,
    pub rate_fluctuation_bps: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub base_rates: Vec<BaseRate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub channel: ChannelConfig,
    pub searcher: SearcherConfig,
    pub simulator: SimulatorConfig,
}

/// Loads configuration from a TOML file, overridden by `ARB_*` environment
/// variables (`ARB_SEARCHER__TIMEOUT_MS=500`).
pub fn load_config(path: &Path) -> Result<Config, Error> {
    if !path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at path: {}",
            path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix("ARB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    app_config.validate()?;

    Ok(app_config)
}

impl Config {
    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.channel.buffer_size == 0 {
            return Err(invalid("channel.buffer_size must be greater than 0"));
        }
        if self.searcher.timeout_ms == 0 {
            return Err(invalid("searcher.timeout_ms must be greater than 0"));
        }
        let epsilon = self.searcher.engine.epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(invalid(&format!(
                "searcher.engine.epsilon must be finite and non-negative, got {}",
                epsilon
            )));
        }
        if self.simulator.interval_ms == 0 {
            return Err(invalid("simulator.interval_ms must be greater than 0"));
        }
        let bps = self.simulator.rate_fluctuation_bps;
        if !bps.is_finite() || bps < 0.0 {
            return Err(invalid(&format!(
                "simulator.rate_fluctuation_bps must be finite and non-negative, got {}",
                bps
            )));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> Error {
    Error::ConfigLoadError(format!("Invalid config: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arb_solver_core::SourceStrategy;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::Builder;

    fn write_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_toml(
            r#"
[channel]
buffer_size = 8

[searcher]
source_asset = "DAI"
timeout_ms = 100
skip_stale = false

[searcher.engine]
epsilon = 1e-6
strategy = "single_source"

[simulator]
interval_ms = 20
rate_fluctuation_bps = 2.5
seed = 9

[[simulator.base_rates]]
from = "DAI"
to = "USDT"
rate = 0.998
"#,
        );

        let config = load_config(file.path()).expect("config should load");

        assert_eq!(config.channel.buffer_size, 8);
        assert_eq!(config.searcher.source_asset, "DAI");
        assert_eq!(config.searcher.timeout_ms, 100);
        assert!(!config.searcher.skip_stale);
        assert_eq!(config.searcher.engine.epsilon, 1e-6);
        assert_eq!(config.searcher.engine.strategy, SourceStrategy::SingleSource);
        assert_eq!(config.simulator.seed, Some(9));
        assert_eq!(
            config.simulator.base_rates,
            vec![BaseRate {
                from: "DAI".to_string(),
                to: "USDT".to_string(),
                rate: 0.998,
            }]
        );
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let file = write_toml(
            r#"
[channel]
buffer_size = 8

[searcher]
source_asset = "WETH"
timeout_ms = 100

[simulator]
interval_ms = 20
rate_fluctuation_bps = 0.0
"#,
        );

        let config = load_config(file.path()).expect("config should load");

        assert!(config.searcher.skip_stale);
        assert_eq!(config.searcher.engine, EngineConfig::default());
        assert_eq!(config.simulator.seed, None);
        assert!(config.simulator.base_rates.is_empty());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = load_config(&PathBuf::from("does/not/exist.toml"));
        assert!(matches!(result, Err(Error::ConfigLoadError(_))));
    }

    #[test]
    fn test_missing_section_is_reported() {
        let file = write_toml("[channel]\nbuffer_size = 8\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(Error::ConfigLoadError(_))));
    }

    const VALID: &str = r#"
[channel]
buffer_size = 8

[searcher]
source_asset = "WETH"
timeout_ms = 100

[simulator]
interval_ms = 20
rate_fluctuation_bps = 5.0
"#;

    fn assert_rejected(from: &str, to: &str, field: &str) {
        assert!(VALID.contains(from), "fixture lacks {}", from);
        let file = write_toml(&VALID.replace(from, to));

        match load_config(file.path()) {
            Err(Error::ConfigLoadError(msg)) => {
                assert!(msg.contains(field), "unexpected message: {}", msg)
            }
            other => panic!("expected {} to be rejected, got {:?}", field, other),
        }
    }

    #[test]
    fn test_valid_fixture_loads() {
        let file = write_toml(VALID);
        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_zero_buffer_size_is_rejected() {
        assert_rejected("buffer_size = 8", "buffer_size = 0", "channel.buffer_size");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert_rejected("timeout_ms = 100", "timeout_ms = 0", "searcher.timeout_ms");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert_rejected("interval_ms = 20", "interval_ms = 0", "simulator.interval_ms");
    }

    #[test]
    fn test_negative_fluctuation_is_rejected() {
        assert_rejected(
            "rate_fluctuation_bps = 5.0",
            "rate_fluctuation_bps = -1.0",
            "simulator.rate_fluctuation_bps",
        );
    }

    #[test]
    fn test_infinite_fluctuation_is_rejected() {
        assert_rejected(
            "rate_fluctuation_bps = 5.0",
            "rate_fluctuation_bps = inf",
            "simulator.rate_fluctuation_bps",
        );
    }

    #[test]
    fn test_negative_epsilon_is_rejected() {
        assert_rejected(
            "timeout_ms = 100",
            "timeout_ms = 100\n\n[searcher.engine]\nepsilon = -1e-9",
            "searcher.engine.epsilon",
        );
    }

    #[test]
    fn test_bundled_config_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Config.toml");
        let config = load_config(&path).expect("bundled config should load");

        assert_eq!(config.searcher.source_asset, "WETH");
        assert_eq!(config.simulator.base_rates.len(), 6);
    }
}
