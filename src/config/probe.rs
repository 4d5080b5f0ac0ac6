use super::traits::ConfigSection;
use crate::error::HelixError;
use serde::{Deserialize, Serialize};

/// 16 MB, the stack size used for deep-recursion workers and their carriers.
const DEFAULT_STACK_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Worker ceiling for heavyweight (OS thread) runs.
    pub thread_budget: usize,
    /// Worker ceiling for lightweight (task) runs.
    pub task_budget: usize,
    /// Emit a progress observation every N workers.
    pub log_interval: usize,
    /// Warn when creating one worker takes longer than this.
    pub slowness_warn_ms: u64,
    /// Stop the probe when creating one worker takes longer than this.
    pub slowness_abort_ms: u64,
    /// Carrier pool size for task runs.
    pub carrier_threads: usize,
    /// Stack size for heavyweight workers and carrier threads.
    pub stack_bytes: usize,
    /// Join all parked workers after release. Disable only to shorten very
    /// large demo runs; the skip is logged.
    pub drain_workers: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            thread_budget: 100_000,
            task_budget: 1_000_000,
            log_interval: 10_000,
            slowness_warn_ms: 1_000,
            slowness_abort_ms: 2_000,
            carrier_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            stack_bytes: DEFAULT_STACK_BYTES,
            drain_workers: true,
        }
    }
}

impl ConfigSection for ProbeConfig {
    fn section_name() -> &'static str {
        "probe"
    }

    fn validate(&self) -> Result<(), HelixError> {
        if self.log_interval == 0 {
            return Err(HelixError::Configuration(
                "Log interval must be at least 1".to_string(),
            ));
        }
        if self.slowness_abort_ms < self.slowness_warn_ms {
            return Err(HelixError::Configuration(
                "Slowness abort threshold must not be below the warn threshold".to_string(),
            ));
        }
        if self.carrier_threads == 0 {
            return Err(HelixError::Configuration(
                "Carrier pool needs at least one thread".to_string(),
            ));
        }
        if self.stack_bytes == 0 {
            return Err(HelixError::Configuration(
                "Worker stack size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ProbeConfig::default().validate().is_ok());
    }

    #[test]
    fn abort_threshold_below_warn_is_rejected() {
        let config = ProbeConfig {
            slowness_warn_ms: 500,
            slowness_abort_ms: 100,
            ..ProbeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_carrier_pool_is_rejected() {
        let config = ProbeConfig {
            carrier_threads: 0,
            ..ProbeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
