use super::traits::ConfigSection;
use crate::error::HelixError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Default target sequence depth when the caller does not supply one.
    pub target_depth: usize,
    /// Seed for symbol draws; None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            target_depth: 1_000,
            seed: None,
        }
    }
}

impl ConfigSection for WorkloadConfig {
    fn section_name() -> &'static str {
        "workload"
    }

    fn validate(&self) -> Result<(), HelixError> {
        if self.target_depth == 0 {
            return Err(HelixError::Configuration(
                "Target depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
