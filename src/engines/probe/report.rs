use crate::types::WorkerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a probe run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured worker budget was reached.
    BudgetExhausted,
    /// Creating one more worker exceeded the hard slowness threshold.
    LatencyExceeded,
    /// The host refused to create another worker.
    SpawnFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::BudgetExhausted => write!(f, "budget exhausted"),
            StopReason::LatencyExceeded => write!(f, "creation latency exceeded"),
            StopReason::SpawnFailed => write!(f, "worker spawn failed"),
        }
    }
}

/// Final report of one capacity probe run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub kind: WorkerKind,
    pub target_depth: usize,
    pub workers_started: usize,
    pub elapsed_ms: u64,
    pub stop_reason: StopReason,
    /// Carrier-thread usage snapshot; empty for heavyweight runs.
    pub carriers: BTreeMap<String, u64>,
    /// Host threads available to the carrier pool.
    pub available_parallelism: usize,
    /// Workers whose run failed (stack exhaustion, panic); each failure was
    /// logged when it happened.
    pub worker_errors: u64,
    /// XOR of the content hashes of every completed worker's sequence. Keeps
    /// the workload observable so it cannot be optimized away.
    pub digest: u64,
    pub completed_at: DateTime<Utc>,
}

impl ProbeReport {
    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "started {} {} to depth {} in {}ms ({})",
            self.workers_started, self.kind, self.target_depth, self.elapsed_ms, self.stop_reason
        )?;
        writeln!(
            f,
            "available cores: {}, carriers used: {}, worker errors: {}",
            self.available_parallelism,
            self.carrier_count(),
            self.worker_errors
        )?;
        for (carrier, count) in &self.carriers {
            writeln!(f, "  {} ran {} workers", carrier, count)?;
        }
        Ok(())
    }
}
