//! 配置解析模块
//!
//! TOML 为主格式，JSON 便于与其他工具交换。

use std::path::Path;

use contracts::{ContractError, MonitorBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式 (不区分大小写)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!(
                "cannot determine config format of '{}' (expected .toml or .json)",
                path.display()
            ))
        })?;
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }

    /// 反序列化为蓝图 (不做校验)
    pub(crate) fn parse(self, content: &str) -> Result<MonitorBlueprint, ContractError> {
        let parsed = match self {
            Self::Toml => toml::from_str(content).map_err(|e| Box::new(e) as BoxedError),
            Self::Json => serde_json::from_str(content).map_err(|e| Box::new(e) as BoxedError),
        };
        parsed.map_err(|e| {
            ContractError::config_parse_with(format!("{} parse error: {e}", self.label()), e)
        })
    }

    /// 序列化蓝图
    pub(crate) fn render(self, blueprint: &MonitorBlueprint) -> Result<String, ContractError> {
        let rendered = match self {
            Self::Toml => toml::to_string_pretty(blueprint).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(blueprint).map_err(|e| e.to_string()),
        };
        rendered.map_err(|e| {
            ContractError::config_parse(format!("{} serialize error: {e}", self.label()))
        })
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MissingReadingPolicy, SinkType};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[fleet]
workers = ["Worker 1", "Worker 2"]

[scheduler]
tick_period_ms = 1000
missing_reading_policy = "exclude"

[[sinks]]
name = "board"
sink_type = "file"
[sinks.params]
path = "./snapshots.jsonl"
"#;
        let result = ConfigFormat::Toml.parse(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.scheduler.tick_period_ms, 1000);
        assert_eq!(
            bp.scheduler.missing_reading_policy,
            MissingReadingPolicy::Exclude
        );
        assert_eq!(bp.sinks[0].sink_type, SinkType::File);
        assert_eq!(
            bp.sinks[0].params.get("path").map(String::as_str),
            Some("./snapshots.jsonl")
        );
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "fleet": { "synthetic_workers": 5 },
            "source": { "kind": "simulated", "compliance_probability": 0.9, "seed": 7 },
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let result = ConfigFormat::Json.parse(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source.seed, Some(7));
        assert_eq!(bp.sinks[0].queue_capacity, 16);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = ConfigFormat::Toml.parse(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_policy() {
        let content = r#"
[scheduler]
missing_reading_policy = "ignore"
"#;
        assert!(ConfigFormat::Toml.parse(content).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("site/helmet-watch.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("helmet-watch")).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
