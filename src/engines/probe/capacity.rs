use super::carrier::CarrierTally;
use super::gate::Gate;
use super::report::{ProbeReport, StopReason};
use super::warmup;
use crate::config::AppConfig;
use crate::engines::evolution::dna::content_hash;
use crate::engines::evolution::{selection, Dna, DnaEvolver, TaskEvolved, TaskEvolver};
use crate::error::{HelixError, Result};
use crate::types::WorkerKind;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Seam for creating heavyweight workers, so tests can inject spawn failure
/// at a chosen worker index.
pub trait ThreadSpawner {
    fn spawn(
        &mut self,
        index: usize,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> std::io::Result<JoinHandle<()>>;
}

/// Default spawner: a named OS thread with the configured stack.
pub struct OsThreadSpawner {
    stack_bytes: usize,
}

impl OsThreadSpawner {
    pub fn new(stack_bytes: usize) -> Self {
        Self { stack_bytes }
    }
}

impl ThreadSpawner for OsThreadSpawner {
    fn spawn(
        &mut self,
        index: usize,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("dna-worker-{}", index))
            .stack_size(self.stack_bytes)
            .spawn(body)
    }
}

/// Evolution predicate for probe task workers: signals the per-iteration
/// reached gate at target depth, then parks on the release channel with the
/// whole recursion chain live.
struct HoldAtDepth {
    target: usize,
    reached: Arc<Gate>,
    release: watch::Receiver<bool>,
}

impl TaskEvolved for HoldAtDepth {
    fn test<'a>(&'a self, dna: &'a Dna) -> BoxFuture<'a, bool> {
        let done = dna.len() >= self.target;
        Box::pin(async move {
            if !done {
                return false;
            }
            self.reached.open();
            let mut release = self.release.clone();
            while !*release.borrow_and_update() {
                // A closed channel means the probe is gone; unpark.
                if release.changed().await.is_err() {
                    break;
                }
            }
            true
        })
    }
}

/// Discovers how many concurrently live workers the runtime sustains before
/// creation latency degrades.
///
/// Workers are spawned strictly one at a time: iteration i+1 does not begin
/// until worker i has signaled that it reached the target depth, so the
/// measured creation time is attributable to worker startup rather than to
/// contention between starting workers. Every worker then stays parked inside
/// its evolution predicate until the shared release gate opens.
pub struct CapacityProbe {
    config: AppConfig,
    runtime: tokio::runtime::Runtime,
}

impl CapacityProbe {
    /// Build a probe and its carrier pool. Carrier threads are named
    /// "carrier-N" so the tally can identify them, and get the same large
    /// stack as heavyweight workers: polling a depth-N future chain still
    /// recurses N frames deep on the carrier.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.probe.carrier_threads)
            .thread_stack_size(config.probe.stack_bytes)
            .thread_name_fn(|| {
                static CARRIER_ID: AtomicUsize = AtomicUsize::new(0);
                format!("carrier-{}", CARRIER_ID.fetch_add(1, Ordering::Relaxed))
            })
            .build()?;
        Ok(Self { config, runtime })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the probe: warmup, then the serialized spawn loop for `kind`.
    pub fn run(&self, target_depth: usize, kind: WorkerKind) -> Result<ProbeReport> {
        match kind {
            WorkerKind::Thread => {
                let mut spawner = OsThreadSpawner::new(self.config.probe.stack_bytes);
                self.run_with_spawner(target_depth, &mut spawner)
            }
            WorkerKind::Task => {
                self.check_depth(target_depth)?;
                self.warm_up();
                self.probe_tasks(target_depth)
            }
        }
    }

    /// Heavyweight run with an injectable spawner.
    pub fn run_with_spawner(
        &self,
        target_depth: usize,
        spawner: &mut dyn ThreadSpawner,
    ) -> Result<ProbeReport> {
        self.check_depth(target_depth)?;
        self.warm_up();
        self.probe_threads(target_depth, spawner)
    }

    fn check_depth(&self, target_depth: usize) -> Result<()> {
        if target_depth == 0 {
            return Err(HelixError::Configuration(
                "Target depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn warm_up(&self) {
        log::info!("warming up to {} depth levels", self.config.warmup.levels);
        warmup::run(
            self.runtime.handle(),
            &self.config.probe,
            &self.config.warmup,
            self.config.workload.seed,
        );
        log::info!("warmup done");
    }

    fn probe_threads(
        &self,
        target_depth: usize,
        spawner: &mut dyn ThreadSpawner,
    ) -> Result<ProbeReport> {
        let cfg = &self.config.probe;
        let warn_after = Duration::from_millis(cfg.slowness_warn_ms);
        let abort_after = Duration::from_millis(cfg.slowness_abort_ms);

        let release = Arc::new(Gate::new());
        let digest = Arc::new(AtomicU64::new(0));
        let errors = Arc::new(AtomicU64::new(0));
        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        let mut stop_reason = StopReason::BudgetExhausted;
        let started = Instant::now();

        while workers.len() < cfg.thread_budget {
            let spawn_started = Instant::now();
            let reached = Arc::new(Gate::new());
            let body = self.thread_worker_body(
                target_depth,
                workers.len(),
                Arc::clone(&reached),
                Arc::clone(&release),
                Arc::clone(&digest),
                Arc::clone(&errors),
            );

            match spawner.spawn(workers.len(), body) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    log::warn!("spawn failed after {} workers: {}", workers.len(), e);
                    stop_reason = StopReason::SpawnFailed;
                    break;
                }
            }

            if workers.len() % cfg.log_interval == 0 {
                log::info!(
                    "{} workers started, {}ms elapsed",
                    workers.len(),
                    started.elapsed().as_millis()
                );
            }

            // Serialize iterations: wait until this worker holds at depth.
            reached.wait();

            let creation = spawn_started.elapsed();
            if creation >= warn_after {
                log::warn!(
                    "slow worker creation: {}ms (worker count={})",
                    creation.as_millis(),
                    workers.len()
                );
                if creation >= abort_after {
                    log::warn!("worker creation too slow, stopping at {} workers", workers.len());
                    stop_reason = StopReason::LatencyExceeded;
                    break;
                }
            }
        }

        release.open();
        let workers_started = workers.len();
        if cfg.drain_workers {
            for worker in workers {
                let _ = worker.join();
            }
        } else {
            log::debug!("skipping join of {} parked workers", workers_started);
        }

        Ok(self.report(
            WorkerKind::Thread,
            target_depth,
            workers_started,
            started.elapsed(),
            stop_reason,
            BTreeMap::new(),
            &digest,
            &errors,
        ))
    }

    fn thread_worker_body(
        &self,
        target_depth: usize,
        index: usize,
        reached: Arc<Gate>,
        release: Arc<Gate>,
        digest: Arc<AtomicU64>,
        errors: Arc<AtomicU64>,
    ) -> Box<dyn FnOnce() + Send + 'static> {
        let seed = self.config.workload.seed.map(|s| s.wrapping_add(index as u64));
        Box::new(move || {
            let hold_reached = Arc::clone(&reached);
            let evolved = move |dna: &Dna| {
                if dna.len() < target_depth {
                    return false;
                }
                hold_reached.open();
                release.wait();
                true
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut evolver = DnaEvolver::new(seed);
                evolver.evolve(Dna::new(), &evolved, &selection::first)
            }));

            match outcome {
                Ok(Ok(dna)) => {
                    digest.fetch_xor(content_hash(&dna), Ordering::Relaxed);
                }
                Ok(Err(e)) => {
                    errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("worker {} failed: {}", index, e);
                }
                Err(_) => {
                    errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("worker {} panicked", index);
                }
            }

            // Keeps the orchestrator live when the worker failed below depth.
            reached.open();
        })
    }

    fn probe_tasks(&self, target_depth: usize) -> Result<ProbeReport> {
        let cfg = &self.config.probe;
        let warn_after = Duration::from_millis(cfg.slowness_warn_ms);
        let abort_after = Duration::from_millis(cfg.slowness_abort_ms);

        let tally = Arc::new(CarrierTally::new());
        let (release_tx, release_rx) = watch::channel(false);
        let digest = Arc::new(AtomicU64::new(0));
        let errors = Arc::new(AtomicU64::new(0));
        let mut workers: Vec<tokio::task::JoinHandle<()>> = Vec::new();
        let mut stop_reason = StopReason::BudgetExhausted;
        let started = Instant::now();

        while workers.len() < cfg.task_budget {
            let spawn_started = Instant::now();
            let reached = Arc::new(Gate::new());
            let seed = self
                .config
                .workload
                .seed
                .map(|s| s.wrapping_add(workers.len() as u64));

            workers.push(self.runtime.spawn(task_worker(
                target_depth,
                workers.len(),
                seed,
                Arc::clone(&tally),
                Arc::clone(&reached),
                release_rx.clone(),
                Arc::clone(&digest),
                Arc::clone(&errors),
            )));

            if workers.len() % cfg.log_interval == 0 {
                log::info!(
                    "{} workers started over {} carriers, {}ms elapsed",
                    workers.len(),
                    tally.carriers(),
                    started.elapsed().as_millis()
                );
            }

            reached.wait();

            let creation = spawn_started.elapsed();
            if creation >= warn_after {
                log::warn!(
                    "slow worker creation: {}ms (worker count={})",
                    creation.as_millis(),
                    workers.len()
                );
                if creation >= abort_after {
                    log::warn!("worker creation too slow, stopping at {} workers", workers.len());
                    stop_reason = StopReason::LatencyExceeded;
                    break;
                }
            }
        }

        let _ = release_tx.send(true);
        let workers_started = workers.len();
        if cfg.drain_workers {
            for worker in workers {
                let _ = self.runtime.block_on(worker);
            }
        } else {
            log::debug!("skipping join of {} parked workers", workers_started);
        }

        Ok(self.report(
            WorkerKind::Task,
            target_depth,
            workers_started,
            started.elapsed(),
            stop_reason,
            tally.snapshot(),
            &digest,
            &errors,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        kind: WorkerKind,
        target_depth: usize,
        workers_started: usize,
        elapsed: Duration,
        stop_reason: StopReason,
        carriers: BTreeMap<String, u64>,
        digest: &AtomicU64,
        errors: &AtomicU64,
    ) -> ProbeReport {
        ProbeReport {
            kind,
            target_depth,
            workers_started,
            elapsed_ms: elapsed.as_millis() as u64,
            stop_reason,
            carriers,
            available_parallelism: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            worker_errors: errors.load(Ordering::Relaxed),
            digest: digest.load(Ordering::Relaxed),
            completed_at: chrono::Utc::now(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn task_worker(
    target_depth: usize,
    index: usize,
    seed: Option<u64>,
    tally: Arc<CarrierTally>,
    reached: Arc<Gate>,
    release: watch::Receiver<bool>,
    digest: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
) {
    // Carrier identity is sampled exactly once, at task start.
    if let Some(carrier) = thread::current().name() {
        tally.record(carrier);
    }

    let evolved = HoldAtDepth {
        target: target_depth,
        reached: Arc::clone(&reached),
        release,
    };
    let mut evolver = TaskEvolver::new(seed);
    let outcome = AssertUnwindSafe(evolver.evolve(Dna::new(), &evolved, &selection::first))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(dna)) => {
            digest.fetch_xor(content_hash(&dna), Ordering::Relaxed);
        }
        Ok(Err(e)) => {
            errors.fetch_add(1, Ordering::Relaxed);
            log::warn!("worker {} failed: {}", index, e);
        }
        Err(_) => {
            errors.fetch_add(1, Ordering::Relaxed);
            log::warn!("worker {} panicked", index);
        }
    }

    reached.open();
}
