//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{MonitorBlueprint, Roster};

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    fleet: FleetInfo,
    scheduler: SchedulerInfo,
    source: SourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct FleetInfo {
    worker_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    workers: Vec<String>,
}

#[derive(Serialize)]
struct SchedulerInfo {
    tick_period_ms: u64,
    missing_reading_policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_ticks: Option<u64>,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    compliance_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let roster = blueprint.fleet.roster()?;

    if args.json {
        let info = build_config_info(&blueprint, &roster, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, &roster, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &MonitorBlueprint, roster: &Roster, args: &InfoArgs) -> ConfigInfo {
    let workers = if args.workers {
        roster.iter().map(|id| id.to_string()).collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        fleet: FleetInfo {
            worker_count: roster.len(),
            workers,
        },
        scheduler: SchedulerInfo {
            tick_period_ms: blueprint.scheduler.tick_period_ms,
            missing_reading_policy: format!("{:?}", blueprint.scheduler.missing_reading_policy),
            max_ticks: blueprint.scheduler.max_ticks,
        },
        source: SourceInfo {
            kind: format!("{:?}", blueprint.source.kind),
            compliance_probability: blueprint.source.compliance_probability,
            seed: blueprint.source.seed,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &MonitorBlueprint, roster: &Roster, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Helmet Watch Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("👷 Fleet ({} workers)", roster.len());
    if args.workers {
        for (i, worker) in roster.iter().enumerate() {
            let prefix = if i == roster.len() - 1 { "└─" } else { "├─" };
            println!("   {} {}", prefix, worker);
        }
    }

    let scheduler = &blueprint.scheduler;
    println!("\n⏱️  Scheduler");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Tick period: {} ms", scheduler.tick_period_ms);
    println!("   ├─ Missing readings: {:?}", scheduler.missing_reading_policy);
    match scheduler.max_ticks {
        Some(max) => println!("   └─ Max ticks: {}", max),
        None => println!("   └─ Max ticks: unlimited"),
    }

    let source = &blueprint.source;
    println!("\n📡 Source");
    println!("   ├─ Kind: {:?}", source.kind);
    println!("   ├─ Compliance probability: {}", source.compliance_probability);
    match source.seed {
        Some(seed) => println!("   └─ Seed: {}", seed),
        None => println!("   └─ Seed: (random)"),
    }

    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
