pub mod dna;
pub mod evolver;
pub mod selection;
pub mod task_evolver;

pub use dna::Dna;
pub use evolver::DnaEvolver;
pub use task_evolver::{TaskEvolved, TaskEvolver};

/// Stack headroom below which a driver reports exhaustion instead of
/// recursing further. Applies to the OS stack of the running thread: the
/// worker's own stack for the sync driver, the carrier's for the async one.
const RED_ZONE: usize = 256 * 1024;

/// Branch gates fire on `content_hash % GATE == 0`.
const BRANCH_GATE: u64 = 256;
const REFINE_GATE: u64 = 128;

/// True when the current thread is inside the red zone. Unknown stack bounds
/// read as "not exhausted", which degrades to the platform's native overflow
/// behavior.
pub(crate) fn stack_exhausted() -> bool {
    stacker::remaining_stack().map_or(false, |remaining| remaining < RED_ZONE)
}
