//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{MissingReadingPolicy, MonitorBlueprint};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    worker_count: usize,
    tick_period_ms: u64,
    missing_reading_policy: MissingReadingPolicy,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let loaded = config_loader::ConfigLoader::load_from_path(&args.config)
        .and_then(|blueprint| blueprint.fleet.roster().map(|roster| (blueprint, roster)));

    match loaded {
        Ok((blueprint, roster)) => {
            let warnings = collect_warnings(&blueprint, roster.len());
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    worker_count: roster.len(),
                    tick_period_ms: blueprint.scheduler.tick_period_ms,
                    missing_reading_policy: blueprint.scheduler.missing_reading_policy,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(if e.is_config_error() {
                e.to_string()
            } else {
                format!("cannot read configuration: {e}")
            }),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &MonitorBlueprint, workers: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - snapshots are not delivered anywhere".to_string());
    }

    if workers == 0 {
        warnings.push("Fleet is empty - danger rate will always read 0.00%".to_string());
    }

    let p = blueprint.source.compliance_probability;
    if p == 0.0 || p == 1.0 {
        warnings.push(format!(
            "compliance_probability is {} - every simulated reading is identical",
            p
        ));
    }

    if blueprint.scheduler.tick_period_ms < 100 {
        warnings.push(format!(
            "tick_period_ms = {} is very short; slow polls will collapse ticks",
            blueprint.scheduler.tick_period_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Workers: {}", summary.worker_count);
            println!("  Tick period: {} ms", summary.tick_period_ms);
            println!("  Missing readings: {:?}", summary.missing_reading_policy);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
