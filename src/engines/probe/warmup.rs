use super::sample::Sample;
use crate::config::{ProbeConfig, WarmupConfig};
use crate::engines::evolution::dna::content_hash;
use crate::engines::evolution::{selection, Dna, DnaEvolver, TaskEvolved, TaskEvolver};
use crate::error::{HelixError, Result};
use futures_util::future::BoxFuture;
use std::thread;
use tokio::runtime::Handle;

/// Pure depth predicate for warmup task workers.
struct DepthReached {
    target: usize,
}

impl TaskEvolved for DepthReached {
    fn test<'a>(&'a self, dna: &'a Dna) -> BoxFuture<'a, bool> {
        let done = dna.len() >= self.target;
        Box::pin(async move { done })
    }
}

/// Drive the runtime to a steady state before measurement.
///
/// For each increasing depth level, runs one heavyweight and one lightweight
/// worker to that depth with a hash-indexed selection, records the achieved
/// max depths into per-kind samples, and resets both samples before the next
/// level. A failing trial (stack exhaustion included) is logged and never
/// aborts the warmup.
pub fn run(runtime: &Handle, probe: &ProbeConfig, warmup: &WarmupConfig, seed: Option<u64>) {
    let thread_sample = Sample::new();
    let task_sample = Sample::new();
    let mut digest: u64 = 0;

    for depth in 1..=warmup.levels {
        let trial_seed = seed.map(|s| s.wrapping_add(depth as u64));

        match thread_trial(probe.stack_bytes, depth, trial_seed) {
            Ok((hash, max_depth)) => {
                digest ^= hash;
                thread_sample.add(max_depth);
            }
            Err(reason) => log::warn!("warmup thread trial at depth {} failed: {}", depth, reason),
        }

        match task_trial(runtime, depth, trial_seed) {
            Ok((hash, max_depth)) => {
                digest ^= hash;
                task_sample.add(max_depth);
            }
            Err(reason) => log::warn!("warmup task trial at depth {} failed: {}", depth, reason),
        }

        log::debug!(
            "warmup level {}: threads [{}], tasks [{}]",
            depth,
            thread_sample,
            task_sample
        );

        thread_sample.reset();
        task_sample.reset();
    }

    log::debug!("warmup digest: {:#x}", digest);
}

fn thread_trial(stack_bytes: usize, depth: usize, seed: Option<u64>) -> Result<(u64, usize)> {
    let worker = thread::Builder::new()
        .name(format!("warmup-thread-{}", depth))
        .stack_size(stack_bytes)
        .spawn(move || {
            let mut evolver = DnaEvolver::new(seed);
            let evolved = |dna: &Dna| dna.len() >= depth;
            evolver
                .evolve(Dna::new(), &evolved, &selection::hash_indexed)
                .map(|dna| (content_hash(&dna), evolver.max_depth()))
        })
        .map_err(HelixError::Spawn)?;

    worker
        .join()
        .map_err(|_| HelixError::WorkerPanic("warmup thread trial".to_string()))?
}

fn task_trial(runtime: &Handle, depth: usize, seed: Option<u64>) -> Result<(u64, usize)> {
    let worker = runtime.spawn(async move {
        let mut evolver = TaskEvolver::new(seed);
        let evolved = DepthReached { target: depth };
        evolver
            .evolve(Dna::new(), &evolved, &selection::hash_indexed)
            .await
            .map(|dna| (content_hash(&dna), evolver.max_depth()))
    });

    runtime
        .block_on(worker)
        .map_err(|join_error| HelixError::WorkerPanic(join_error.to_string()))?
}
