pub mod traits;
pub mod probe;
pub mod warmup;
pub mod workload;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use probe::ProbeConfig;
pub use warmup::WarmupConfig;
pub use workload::WorkloadConfig;
