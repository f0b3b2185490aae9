//! CLI configuration with TOML file support.
//!
//! ```toml
//! log_level = "debug"
//! log_format = "json"
//!
//! [engine]
//! top_target_count = 10
//!
//! [engine.anomaly]
//! rapid_window_secs = 60
//! ```

use nestfest_quadratic::EngineParams;
use nestfest_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::CliError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine parameters (anomaly thresholds and friends).
    #[serde(default)]
    pub engine: EngineParams,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, validating engine parameters.
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        let config: Self = toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CliConfig is always serializable to TOML")
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            engine: EngineParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CliConfig::default();
        let parsed = CliConfig::from_toml_str(&config.to_toml_string()).expect("should parse");
        assert_eq!(parsed.log_level, config.log_level);
        assert_eq!(parsed.engine, config.engine);
    }

    #[test]
    fn nested_engine_tables_override_defaults() {
        let toml = r#"
            log_format = "json"

            [engine]
            top_target_count = 10

            [engine.anomaly]
            max_voters_per_ip = 20
        "#;
        let config = CliConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.engine.top_target_count, 10);
        assert_eq!(config.engine.anomaly.max_voters_per_ip, 20);
        assert_eq!(config.engine.anomaly.rapid_window_secs, 30);
    }

    #[test]
    fn invalid_engine_params_are_rejected() {
        let err = CliConfig::from_toml_str("[engine.anomaly]\nconcentration_bps = 10001").unwrap_err();
        assert!(matches!(err, CliError::Engine(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let config = CliConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = CliConfig::from_toml_file(Path::new("/nonexistent/nestfest-qv.toml"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
