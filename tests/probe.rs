use helixprobe::engines::probe::{CapacityProbe, OsThreadSpawner, StopReason, ThreadSpawner};
use helixprobe::{AppConfig, HelixError, WorkerKind};
use std::thread::JoinHandle;

/// Small, fast configuration for probe tests: short warmup, generous latency
/// thresholds so a loaded CI machine cannot trip them.
fn create_test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.warmup.levels = 2;
    config.workload.seed = Some(7);
    config.probe.log_interval = 1_000;
    config.probe.slowness_warn_ms = 60_000;
    config.probe.slowness_abort_ms = 120_000;
    config.probe.carrier_threads = 2;
    config.probe.stack_bytes = 4 * 1024 * 1024;
    config.probe.thread_budget = 4;
    config.probe.task_budget = 8;
    config
}

#[test]
fn zero_budget_returns_immediately_for_threads() {
    let mut config = create_test_config();
    config.probe.thread_budget = 0;

    let probe = CapacityProbe::new(config).unwrap();
    let report = probe.run(5, WorkerKind::Thread).unwrap();

    assert_eq!(report.workers_started, 0);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert!(report.carriers.is_empty());
}

#[test]
fn zero_budget_returns_immediately_for_tasks() {
    let mut config = create_test_config();
    config.probe.task_budget = 0;

    let probe = CapacityProbe::new(config).unwrap();
    let report = probe.run(5, WorkerKind::Task).unwrap();

    assert_eq!(report.workers_started, 0);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
}

#[test]
fn thread_probe_exhausts_a_small_budget() {
    let probe = CapacityProbe::new(create_test_config()).unwrap();
    let report = probe.run(5, WorkerKind::Thread).unwrap();

    assert_eq!(report.workers_started, 4);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.worker_errors, 0);
    // Heavyweight runs do not tally carriers.
    assert!(report.carriers.is_empty());
}

#[test]
fn task_probe_tallies_one_observation_per_worker() {
    let probe = CapacityProbe::new(create_test_config()).unwrap();
    let report = probe.run(5, WorkerKind::Task).unwrap();

    assert_eq!(report.workers_started, 8);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.worker_errors, 0);

    let tallied: u64 = report.carriers.values().sum();
    assert_eq!(tallied, 8);
    assert!(report.carrier_count() >= 1);
    assert!(report.carriers.keys().all(|name| name.starts_with("carrier-")));
}

/// Spawner that refuses to create worker `fail_at` and every worker after it.
struct FailingSpawner {
    inner: OsThreadSpawner,
    fail_at: usize,
}

impl ThreadSpawner for FailingSpawner {
    fn spawn(
        &mut self,
        index: usize,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> std::io::Result<JoinHandle<()>> {
        if index >= self.fail_at {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "injected resource exhaustion",
            ));
        }
        self.inner.spawn(index, body)
    }
}

#[test]
fn spawn_failure_stops_the_probe_with_a_partial_report() {
    let config = create_test_config();
    let stack_bytes = config.probe.stack_bytes;
    let probe = CapacityProbe::new(config).unwrap();

    // Worker #3 (index 2) fails to spawn: two workers survive.
    let mut spawner = FailingSpawner {
        inner: OsThreadSpawner::new(stack_bytes),
        fail_at: 2,
    };
    let report = probe.run_with_spawner(5, &mut spawner).unwrap();

    assert_eq!(report.workers_started, 2);
    assert_eq!(report.stop_reason, StopReason::SpawnFailed);
}

#[test]
fn latency_threshold_of_zero_aborts_after_the_first_worker() {
    let mut config = create_test_config();
    config.probe.slowness_warn_ms = 0;
    config.probe.slowness_abort_ms = 0;

    let probe = CapacityProbe::new(config).unwrap();
    let report = probe.run(5, WorkerKind::Thread).unwrap();

    assert_eq!(report.workers_started, 1);
    assert_eq!(report.stop_reason, StopReason::LatencyExceeded);
}

#[test]
fn zero_target_depth_is_a_configuration_error() {
    let probe = CapacityProbe::new(create_test_config()).unwrap();
    let result = probe.run(0, WorkerKind::Thread);
    assert!(matches!(result, Err(HelixError::Configuration(_))));
}

#[test]
fn report_serializes_to_json() {
    let probe = CapacityProbe::new(create_test_config()).unwrap();
    let report = probe.run(3, WorkerKind::Task).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"stop_reason\":\"budget_exhausted\""));
    assert!(json.contains("\"workers_started\":8"));
}
