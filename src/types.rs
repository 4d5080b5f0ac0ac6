use serde::{Deserialize, Serialize};

/// The two execution-unit kinds the probe can measure.
///
/// `Thread` workers are OS threads spawned with a large fixed stack; the host
/// caps how many can exist. `Task` workers are tokio tasks multiplexed over a
/// small pool of named carrier threads; their count is bounded only by memory
/// and scheduler throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerKind {
    Thread,
    Task,
}

impl WorkerKind {
    pub fn is_task(self) -> bool {
        matches!(self, WorkerKind::Task)
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerKind::Thread => write!(f, "threads"),
            WorkerKind::Task => write!(f, "tasks"),
        }
    }
}

impl std::str::FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threads" | "thread" => Ok(WorkerKind::Thread),
            "tasks" | "task" => Ok(WorkerKind::Task),
            other => Err(format!("unknown worker kind '{}' (expected threads|tasks)", other)),
        }
    }
}
