use super::dna::{hash_gate, splice, Dna, NUCLEOTIDES};
use super::{stack_exhausted, BRANCH_GATE, REFINE_GATE};
use crate::error::{HelixError, Result};
use futures_util::future::BoxFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Evolution predicate for task workers.
///
/// The async counterpart of the sync driver's `Fn(&Dna) -> bool`: returning a
/// future lets a predicate park the worker on a gate once the target depth is
/// reached, keeping the whole recursion chain live while parked.
pub trait TaskEvolved: Send + Sync {
    fn test<'a>(&'a self, dna: &'a Dna) -> BoxFuture<'a, bool>;
}

/// Async recursive workload driver for lightweight (task) workers.
///
/// Applies the same A/C/G/T continuation rules as [`super::DnaEvolver`], but
/// each recursive step is a boxed future, so the "stack" of a task worker is
/// a heap-allocated chain of futures rather than OS stack frames. Polling a
/// chain of depth N still recurses N frames deep on the carrier thread, which
/// is why carriers get the same large stack as heavyweight workers.
pub struct TaskEvolver {
    rng: StdRng,
    max_depth: usize,
}

impl TaskEvolver {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, max_depth: 0 }
    }

    /// Deepest sequence length observed during the last run.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evolve `dna` until `evolved` holds, resolving branch candidates via
    /// `fittest`.
    pub fn evolve<'a, P, S>(
        &'a mut self,
        dna: Dna,
        evolved: &'a P,
        fittest: &'a S,
    ) -> BoxFuture<'a, Result<Dna>>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        self.step(dna, evolved, fittest)
    }

    fn step<'a, P, S>(
        &'a mut self,
        mut dna: Dna,
        evolved: &'a P,
        fittest: &'a S,
    ) -> BoxFuture<'a, Result<Dna>>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        Box::pin(async move {
            if stack_exhausted() {
                return Err(HelixError::StackExhausted { depth: dna.len() });
            }

            let symbol = NUCLEOTIDES[self.rng.gen_range(0..NUCLEOTIDES.len())];
            dna.push(symbol);
            if dna.len() > self.max_depth {
                self.max_depth = dna.len();
            }

            match symbol {
                'A' => self.continue_or_branch(dna, evolved, fittest).await,
                'C' => self.continue_straight(dna, evolved, fittest).await,
                'G' => self.split_recombine(dna, evolved, fittest).await,
                'T' => self.refine(dna, evolved, fittest).await,
                _ => unreachable!("symbol drawn from NUCLEOTIDES"),
            }
        })
    }

    async fn continue_or_branch<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        if evolved.test(&dna).await {
            return Ok(dna);
        }
        if !hash_gate(&dna, BRANCH_GATE) {
            return self.step(dna, evolved, fittest).await;
        }

        let fanout = 1 + self.rng.gen_range(0..3);
        let mut mutations = Vec::with_capacity(fanout);
        for _ in 0..fanout {
            mutations.push(self.step(dna.clone(), evolved, fittest).await?);
        }
        Ok(fittest(mutations))
    }

    async fn continue_straight<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        if evolved.test(&dna).await {
            return Ok(dna);
        }
        self.step(dna, evolved, fittest).await
    }

    async fn split_recombine<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        if evolved.test(&dna).await {
            return Ok(dna);
        }
        if !hash_gate(&dna, BRANCH_GATE) {
            return self.step(dna, evolved, fittest).await;
        }

        let left = self.step(dna.clone(), evolved, fittest).await?;
        let right = self.step(dna, evolved, fittest).await?;
        let split = self.rng.gen_range(0..left.len().min(right.len()));

        Ok(fittest(vec![
            splice(&left, &right, split),
            splice(&right, &left, split),
        ]))
    }

    async fn refine<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: TaskEvolved,
        S: Fn(Vec<Dna>) -> Dna + Send + Sync,
    {
        if evolved.test(&dna).await {
            return Ok(dna);
        }
        if !hash_gate(&dna, REFINE_GATE) {
            return self.step(dna, evolved, fittest).await;
        }

        let standard = self.step(dna.clone(), evolved, fittest).await?;
        for _ in 0..2 {
            let candidate = self.step(dna.clone(), evolved, fittest).await?;
            if fittest(vec![standard.clone(), candidate.clone()]) == candidate {
                return Ok(candidate);
            }
        }
        Ok(standard)
    }
}
