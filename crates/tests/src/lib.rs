//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 → 来源 → 调度 → 发布 的端到端测试
//! - 设备故障与慢观察者隔离

#[cfg(test)]
mod contract_tests {
    use contracts::{FleetSnapshot, MonitorBlueprint, WorkerStatus};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = FleetSnapshot {
            tick: 1,
            timestamp: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            statuses: vec![WorkerStatus {
                worker_id: "Worker 1".into(),
                compliant: false,
            }],
            non_compliant: vec!["Worker 1".into()],
            missing: Vec::new(),
            danger_rate: 100.0,
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["statuses"][0]["worker_id"], "Worker 1");
        assert_eq!(value["non_compliant"][0], "Worker 1");
        assert_eq!(value["danger_rate"], 100.0);
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_blueprint_defaults_serialize() {
        let json = config_loader::ConfigLoader::to_json(&MonitorBlueprint::default()).unwrap();
        assert!(json.contains("\"tick_period_ms\": 5000"));
        assert!(json.contains("\"missing_reading_policy\": \"fail_safe\""));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        FleetSnapshot, MissingReadingPolicy, Roster, SchedulerConfig, SensorReading,
        SensorSource, Sweep, WorkerId,
    };
    use publisher::{spawn_sinks, SnapshotPublisher};
    use scheduler::RefreshScheduler;
    use sensor_source::{DeviceProbe, DeviceSource, SensorSourceError, SimulatedSource};

    /// Source that reports a fixed set of workers as not wearing helmets
    struct FixedSource {
        not_worn: Vec<&'static str>,
    }

    impl SensorSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn poll(&self, workers: &[WorkerId]) -> Sweep {
            let mut sweep = Sweep::with_capacity(workers.len());
            for worker_id in workers {
                let compliant = !self.not_worn.contains(&worker_id.as_str());
                sweep.record(SensorReading::new(
                    worker_id.clone(),
                    compliant,
                    chrono::Utc::now(),
                ));
            }
            sweep
        }
    }

    /// Helmet devices where `Worker 2` never answers
    struct FlakyProbe;

    impl DeviceProbe for FlakyProbe {
        async fn read(&self, worker_id: &WorkerId) -> sensor_source::Result<bool> {
            match worker_id.as_str() {
                "Worker 2" => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(true)
                }
                "Worker 3" => Err(SensorSourceError::probe(worker_id.as_str(), "bad checksum")),
                _ => Ok(true),
            }
        }
    }

    fn scheduler_config(max_ticks: u64, policy: MissingReadingPolicy) -> SchedulerConfig {
        SchedulerConfig {
            tick_period_ms: 5000,
            missing_reading_policy: policy,
            max_ticks: Some(max_ticks),
        }
    }

    fn assert_consistent(snapshot: &FleetSnapshot) {
        assert_eq!(
            snapshot.danger_rate,
            aggregator::danger_rate(snapshot.non_compliant.len(), snapshot.statuses.len())
        );
        let red: Vec<&WorkerId> = snapshot
            .statuses
            .iter()
            .filter(|s| !s.compliant)
            .map(|s| &s.worker_id)
            .collect();
        assert_eq!(red, snapshot.non_compliant.iter().collect::<Vec<_>>());
    }

    /// End-to-end: config -> SimulatedSource -> RefreshScheduler -> file sink + viewer
    #[tokio::test(start_paused = true)]
    async fn test_e2e_simulated_monitor() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("snapshots.jsonl");
        let config = format!(
            r#"
[fleet]
synthetic_workers = 20

[scheduler]
tick_period_ms = 5000
max_ticks = 4

[source]
compliance_probability = 0.7
seed = 11

[[sinks]]
name = "archive"
sink_type = "file"
[sinks.params]
path = "{}"
"#,
            out.display().to_string().replace('\\', "/")
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let source = SimulatedSource::seeded(
            blueprint.source.compliance_probability,
            blueprint.source.seed.unwrap(),
        )
        .unwrap();
        let publisher = SnapshotPublisher::new();
        let sinks = spawn_sinks(&blueprint.sinks, &publisher).await.unwrap();
        let mut viewer = publisher.subscribe(8);

        let scheduler = RefreshScheduler::new(
            blueprint.scheduler.clone(),
            blueprint.fleet.roster().unwrap(),
            source,
            publisher.clone(),
        )
        .unwrap();
        let reader = scheduler.handle().reader();

        let stats = scheduler.run().await;
        for sink in sinks {
            sink.shutdown().await;
        }

        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.snapshots_published, 4);

        let mut received = Vec::new();
        while let Ok(snapshot) = viewer.try_recv() {
            assert_eq!(snapshot.fleet_size(), 20);
            assert_consistent(&snapshot);
            received.push(snapshot);
        }
        assert_eq!(received.len(), 4);
        assert!(Arc::ptr_eq(&received[3], &reader.latest().unwrap()));

        let archived: Vec<FleetSnapshot> = std::fs::read_to_string(&out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(archived.len(), 4);
        for (archived, live) in archived.iter().zip(&received) {
            assert_eq!(archived.tick, live.tick);
            assert_eq!(archived.non_compliant, live.non_compliant);
            assert_eq!(archived.danger_rate, live.danger_rate);
        }
    }

    /// Six of twenty workers without helmets reads as 30.00%
    #[tokio::test(start_paused = true)]
    async fn test_presentation_lines() {
        let source = FixedSource {
            not_worn: vec!["Worker 2", "Worker 5", "Worker 7", "Worker 11", "Worker 13", "Worker 20"],
        };
        let scheduler = RefreshScheduler::new(
            scheduler_config(1, MissingReadingPolicy::FailSafe),
            Roster::synthetic(20),
            source,
            SnapshotPublisher::new(),
        )
        .unwrap();
        let reader = scheduler.handle().reader();

        scheduler.run().await;
        let snapshot = reader.latest().unwrap();

        assert_eq!(snapshot.danger_rate_label(), "Danger rate: 30.00%");
        assert_eq!(
            snapshot.non_compliant_summary(),
            "Workers not wearing helmets: Worker 2, Worker 5, Worker 7, Worker 11, Worker 13, Worker 20"
        );
    }

    /// A hanging and a failing device only affect their own workers
    #[tokio::test(start_paused = true)]
    async fn test_device_failures_are_isolated() {
        for (policy, expected_size, expected_rate) in [
            (MissingReadingPolicy::FailSafe, 4, 50.0),
            (MissingReadingPolicy::Exclude, 2, 0.0),
        ] {
            let source =
                DeviceSource::with_timeout("helmets", FlakyProbe, Duration::from_millis(200));
            let publisher = SnapshotPublisher::new();
            let mut viewer = publisher.subscribe(4);
            let scheduler = RefreshScheduler::new(
                scheduler_config(1, policy),
                Roster::synthetic(4),
                source,
                publisher,
            )
            .unwrap();

            let stats = scheduler.run().await;
            let snapshot = viewer.recv().await.unwrap();

            assert_eq!(stats.unavailable_readings, 2);
            assert_eq!(snapshot.fleet_size(), expected_size);
            assert_eq!(snapshot.danger_rate, expected_rate);
            assert_eq!(
                snapshot.missing,
                vec![WorkerId::from("Worker 2"), WorkerId::from("Worker 3")]
            );
            assert_consistent(&snapshot);
        }
    }

    /// A viewer that never reads does not hold back the others
    #[tokio::test(start_paused = true)]
    async fn test_stalled_viewer_is_isolated() {
        let publisher = SnapshotPublisher::new();
        let mut stalled = publisher.subscribe(1);
        let mut active = publisher.subscribe(16);
        let scheduler = RefreshScheduler::new(
            scheduler_config(6, MissingReadingPolicy::FailSafe),
            Roster::synthetic(3),
            FixedSource { not_worn: vec![] },
            publisher.clone(),
        )
        .unwrap();

        let stats = scheduler.run().await;

        assert_eq!(stats.deliveries_dropped, 5);
        let mut ticks = Vec::new();
        while let Ok(snapshot) = active.try_recv() {
            ticks.push(snapshot.tick);
        }
        assert_eq!(ticks, vec![1, 2, 3, 4, 5, 6]);

        assert_eq!(stalled.try_recv().unwrap().tick, 1);
        assert!(stalled.try_recv().is_err());
        assert_eq!(stalled.metrics().dropped_count(), 5);
    }

    /// Stopping from another task ends the run after the current refresh
    #[tokio::test(start_paused = true)]
    async fn test_stop_from_viewer_task() {
        let publisher = SnapshotPublisher::new();
        let mut viewer = publisher.subscribe(4);
        let scheduler = RefreshScheduler::new(
            SchedulerConfig {
                tick_period_ms: 1000,
                ..Default::default()
            },
            Roster::synthetic(2),
            FixedSource { not_worn: vec!["Worker 1"] },
            publisher,
        )
        .unwrap();
        let handle = scheduler.handle();
        let task = scheduler.spawn();

        let mut seen = HashMap::new();
        while let Some(snapshot) = viewer.recv().await {
            seen.insert(snapshot.tick, snapshot.danger_rate);
            if snapshot.tick == 3 {
                handle.stop();
                break;
            }
        }

        let stats = task.await.unwrap();
        assert_eq!(stats.ticks, 3);
        assert_eq!(seen.len(), 3);
        assert!(seen.values().all(|rate| *rate == 50.0));
    }
}
