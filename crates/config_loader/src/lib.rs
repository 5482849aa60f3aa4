//! # Config Loader
//!
//! Turns a `helmet-watch.toml` (or `.json`) file into a validated
//! [`MonitorBlueprint`]. Misconfiguration is fatal here, before the
//! scheduler starts ticking.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("helmet-watch.toml")).unwrap();
//! println!("Tick period: {}ms", blueprint.scheduler.tick_period_ms);
//! ```

mod parser;
mod validator;

pub use contracts::MonitorBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a `.toml` or `.json` file
    ///
    /// # Errors
    /// Unknown extension, unreadable file, parse failure or a rejected
    /// value.
    pub fn load_from_path(path: &Path) -> Result<MonitorBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, bytes = content.len(), "Read config file");
        Self::load_from_str(&content, format)
    }

    /// Parse and validate configuration text
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MonitorBlueprint, ContractError> {
        let blueprint = format.parse(content)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Validate an already-built blueprint (e.g. after CLI overrides)
    pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &MonitorBlueprint) -> Result<String, ContractError> {
        ConfigFormat::Toml.render(blueprint)
    }

    pub fn to_json(blueprint: &MonitorBlueprint) -> Result<String, ContractError> {
        ConfigFormat::Json.render(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MissingReadingPolicy, SinkType};
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[fleet]
synthetic_workers = 20

[scheduler]
tick_period_ms = 5000
missing_reading_policy = "fail_safe"

[source]
kind = "simulated"
compliance_probability = 0.7

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.scheduler.tick_period_ms, 5000);
        assert_eq!(bp.fleet.roster().unwrap().len(), 20);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let bp = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(bp.scheduler.tick_period_ms, 5000);
        assert_eq!(
            bp.scheduler.missing_reading_policy,
            MissingReadingPolicy::FailSafe
        );
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.scheduler.tick_period_ms, bp2.scheduler.tick_period_ms);
        assert_eq!(bp.sinks.len(), bp2.sinks.len());
        assert_eq!(bp.sinks[0].name, bp2.sinks[0].name);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(
            bp.fleet.roster().unwrap(),
            bp2.fleet.roster().unwrap()
        );
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.sinks.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[fleet]
workers = ["Worker 1", "Worker 2", "Worker 1"]
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
