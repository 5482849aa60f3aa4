//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

use config_loader::ConfigLoader;
use contracts::MonitorBlueprint;

use crate::cli::RunArgs;
use crate::pipeline::{Monitor, MonitorConfig};

/// Execute the `run` command
pub async fn run_monitor(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint).context("Invalid configuration after CLI overrides")?;

    let roster = blueprint.fleet.roster()?;
    info!(
        workers = roster.len(),
        tick_period_ms = blueprint.scheduler.tick_period_ms,
        policy = ?blueprint.scheduler.missing_reading_policy,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint, roster.len());
        return Ok(());
    }

    let monitor_config = MonitorConfig {
        blueprint,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        board: args.board,
    };

    info!("Starting monitor...");
    let stats = Monitor::new(monitor_config)
        .run(shutdown_signal())
        .await
        .context("Monitor execution failed")?;

    info!(
        ticks = stats.scheduler.ticks,
        collapsed = stats.scheduler.ticks_collapsed,
        duration_secs = stats.scheduler.duration.as_secs_f64(),
        "Monitor completed"
    );
    stats.print_summary();

    info!("Helmet Watch finished");
    Ok(())
}

/// Apply CLI overrides on top of the file configuration
fn apply_overrides(blueprint: &mut MonitorBlueprint, args: &RunArgs) {
    if let Some(tick_ms) = args.tick_ms {
        info!(tick_ms, "Overriding tick period from CLI");
        blueprint.scheduler.tick_period_ms = tick_ms;
    }
    if args.max_ticks > 0 {
        blueprint.scheduler.max_ticks = Some(args.max_ticks);
    }
    if let Some(seed) = args.seed {
        info!(seed, "Overriding simulator seed from CLI");
        blueprint.source.seed = Some(seed);
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, stopping monitor...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &MonitorBlueprint, workers: usize) {
    println!("\n=== Configuration Summary ===\n");
    println!("Fleet: {} workers", workers);
    println!("Scheduler:");
    println!("  Tick period: {} ms", blueprint.scheduler.tick_period_ms);
    println!(
        "  Missing readings: {:?}",
        blueprint.scheduler.missing_reading_policy
    );
    if let Some(max) = blueprint.scheduler.max_ticks {
        println!("  Max ticks: {}", max);
    }
    println!("Source: {:?}", blueprint.source.kind);
    println!(
        "  Compliance probability: {}",
        blueprint.source.compliance_probability
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("helmet-watch.toml"),
            tick_ms: None,
            seed: None,
            max_ticks: 0,
            timeout: 0,
            dry_run: false,
            board: false,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut blueprint = MonitorBlueprint::default();
        let args = RunArgs {
            tick_ms: Some(100),
            seed: Some(3),
            max_ticks: 5,
            ..args()
        };

        apply_overrides(&mut blueprint, &args);

        assert_eq!(blueprint.scheduler.tick_period_ms, 100);
        assert_eq!(blueprint.scheduler.max_ticks, Some(5));
        assert_eq!(blueprint.source.seed, Some(3));
    }

    #[test]
    fn test_zero_max_ticks_keeps_config() {
        let mut blueprint = MonitorBlueprint::default();
        blueprint.scheduler.max_ticks = Some(7);

        apply_overrides(&mut blueprint, &args());

        assert_eq!(blueprint.scheduler.max_ticks, Some(7));
    }

    #[test]
    fn test_zero_tick_override_is_rejected() {
        let mut blueprint = MonitorBlueprint::default();
        let args = RunArgs {
            tick_ms: Some(0),
            ..args()
        };

        apply_overrides(&mut blueprint, &args);

        assert!(ConfigLoader::validate(&blueprint).is_err());
    }
}
