use std::sync::Mutex;

/// Thread-safe accumulator of max-depth observations across warmup trials.
///
/// Observations are added by worker threads and read by the warmup driver
/// between trials, never concurrently with `add`.
pub struct Sample {
    observations: Mutex<Vec<usize>>,
}

impl Sample {
    pub fn new() -> Self {
        Self {
            observations: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, depth: usize) {
        self.observations.lock().unwrap().push(depth);
    }

    pub fn reset(&self) {
        self.observations.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.observations.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max(&self) -> Option<usize> {
        self.observations.lock().unwrap().iter().copied().max()
    }

    pub fn mean(&self) -> f64 {
        let observations = self.observations.lock().unwrap();
        if observations.is_empty() {
            return 0.0;
        }
        observations.iter().sum::<usize>() as f64 / observations.len() as f64
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} max={:?} mean={:.1}",
            self.len(),
            self.max(),
            self.mean()
        )
    }
}
