use super::dna::{hash_gate, splice, Dna, NUCLEOTIDES};
use super::{stack_exhausted, BRANCH_GATE, REFINE_GATE};
use crate::error::{HelixError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synchronous recursive workload driver.
///
/// Grows a DNA sequence one random symbol per recursive call until the
/// supplied evolution predicate reports the sequence done. The trailing symbol
/// of each step picks one of four continuation strategies, so the recursion
/// branches with a shape that depends on sequence content. Recursion depth is
/// bounded by nothing but the predicate and the OS stack; the driver checks
/// its remaining stack every step and surfaces exhaustion as
/// [`HelixError::StackExhausted`] instead of overrunning the guard page.
pub struct DnaEvolver {
    rng: StdRng,
    max_depth: usize,
}

impl DnaEvolver {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, max_depth: 0 }
    }

    /// Deepest sequence length observed during the last run, including
    /// branches that were not selected.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evolve `dna` until `evolved` holds, resolving branch candidates via
    /// `fittest`. The predicate is the only termination authority.
    pub fn evolve<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        self.step(dna, evolved, fittest)
    }

    fn step<P, S>(&mut self, mut dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        if stack_exhausted() {
            return Err(HelixError::StackExhausted { depth: dna.len() });
        }

        let symbol = NUCLEOTIDES[self.rng.gen_range(0..NUCLEOTIDES.len())];
        dna.push(symbol);
        if dna.len() > self.max_depth {
            self.max_depth = dna.len();
        }

        match symbol {
            'A' => self.continue_or_branch(dna, evolved, fittest),
            'C' => self.continue_straight(dna, evolved, fittest),
            'G' => self.split_recombine(dna, evolved, fittest),
            'T' => self.refine(dna, evolved, fittest),
            _ => unreachable!("symbol drawn from NUCLEOTIDES"),
        }
    }

    /// A: straight-line continuation, except on the branch gate, where the
    /// run fans out into 1-3 independent continuations resolved by `fittest`.
    fn continue_or_branch<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        if evolved(&dna) {
            return Ok(dna);
        }
        if !hash_gate(&dna, BRANCH_GATE) {
            return self.step(dna, evolved, fittest);
        }

        let fanout = 1 + self.rng.gen_range(0..3);
        let mut mutations = Vec::with_capacity(fanout);
        for _ in 0..fanout {
            mutations.push(self.step(dna.clone(), evolved, fittest)?);
        }
        Ok(fittest(mutations))
    }

    /// C: pure continuation, never branches.
    fn continue_straight<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        if evolved(&dna) {
            return Ok(dna);
        }
        self.step(dna, evolved, fittest)
    }

    /// G: on the branch gate, evolve two independent candidates and recombine
    /// them at a random split point bounded by the shorter one.
    fn split_recombine<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        if evolved(&dna) {
            return Ok(dna);
        }
        if !hash_gate(&dna, BRANCH_GATE) {
            return self.step(dna, evolved, fittest);
        }

        let left = self.step(dna.clone(), evolved, fittest)?;
        let right = self.step(dna, evolved, fittest)?;
        // Both candidates extend a non-empty sequence, so the bound is >= 1.
        let split = self.rng.gen_range(0..left.len().min(right.len()));

        Ok(fittest(vec![
            splice(&left, &right, split),
            splice(&right, &left, split),
        ]))
    }

    /// T: on the refine gate, evolve a standard candidate, then up to two
    /// alternatives, accepting the first one `fittest` prefers over it.
    fn refine<P, S>(&mut self, dna: Dna, evolved: &P, fittest: &S) -> Result<Dna>
    where
        P: Fn(&Dna) -> bool,
        S: Fn(Vec<Dna>) -> Dna,
    {
        if evolved(&dna) {
            return Ok(dna);
        }
        if !hash_gate(&dna, REFINE_GATE) {
            return self.step(dna, evolved, fittest);
        }

        let standard = self.step(dna.clone(), evolved, fittest)?;
        for _ in 0..2 {
            let candidate = self.step(dna.clone(), evolved, fittest)?;
            if fittest(vec![standard.clone(), candidate.clone()]) == candidate {
                return Ok(candidate);
            }
        }
        Ok(standard)
    }
}
