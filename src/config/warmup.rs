use super::traits::ConfigSection;
use crate::error::HelixError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupConfig {
    /// Number of increasing depth levels; level N targets depth N.
    pub levels: usize,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self { levels: 9 }
    }
}

impl ConfigSection for WarmupConfig {
    fn section_name() -> &'static str {
        "warmup"
    }

    fn validate(&self) -> Result<(), HelixError> {
        if self.levels == 0 {
            return Err(HelixError::Configuration(
                "Warmup needs at least one depth level".to_string(),
            ));
        }
        Ok(())
    }
}
