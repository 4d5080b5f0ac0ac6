use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Concurrent tally of which carrier threads ran task workers.
///
/// Keyed by the carrier's thread name. Entries are created lazily on first
/// observation and incremented atomically thereafter; nothing is removed for
/// the lifetime of a probe run. Each task worker records its carrier exactly
/// once, at task start, so the counts sum to the number of workers observed.
pub struct CarrierTally {
    counts: DashMap<String, AtomicU64>,
}

impl CarrierTally {
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
        }
    }

    /// Record one worker observation for `carrier`.
    pub fn record(&self, carrier: &str) {
        if let Some(count) = self.counts.get(carrier) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counts
            .entry(carrier.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Number of distinct carriers observed.
    pub fn carriers(&self) -> usize {
        self.counts.len()
    }

    /// Total observations across all carriers.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }

    /// Sorted snapshot of the tally.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for CarrierTally {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_lazily_and_increments() {
        let tally = CarrierTally::new();
        tally.record("carrier-0");
        tally.record("carrier-0");
        tally.record("carrier-1");

        assert_eq!(tally.carriers(), 2);
        assert_eq!(tally.total(), 3);

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.get("carrier-0"), Some(&2));
        assert_eq!(snapshot.get("carrier-1"), Some(&1));
    }

    #[test]
    fn concurrent_records_are_all_counted() {
        let tally = std::sync::Arc::new(CarrierTally::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tally = std::sync::Arc::clone(&tally);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        tally.record(&format!("carrier-{}", i % 2));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tally.total(), 4000);
        assert_eq!(tally.carriers(), 2);
    }
}
