//! Concurrent worker-capacity probe driven by a recursive synthetic workload.
//!
//! The probe spawns one worker at a time, each evolving a random DNA sequence
//! to a target recursion depth and then parking there, and measures how long
//! worker creation takes as the population of live, parked workers grows. It
//! supports heavyweight workers (OS threads with large stacks) and
//! lightweight workers (tasks multiplexed over a small pool of named carrier
//! threads), and reports which carriers ran the lightweight workers.

pub mod config;
pub mod engines;
pub mod error;
pub mod types;

pub use config::{AppConfig, ConfigManager};
pub use engines::probe::{CapacityProbe, ProbeReport, StopReason};
pub use error::{HelixError, Result};
pub use types::WorkerKind;
