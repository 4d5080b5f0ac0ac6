use std::hash::{Hash, Hasher};

/// DNA sequence representation for the synthetic workload
///
/// A sequence is an ordered string of symbols drawn from the 4-letter
/// nucleotide alphabet {A, C, G, T}. It is the evolving state of one workload
/// instance: each recursive step appends exactly one symbol, and branching
/// strategies build new sequences by concatenation or splicing, never by
/// in-place mutation of a produced result.
///
/// # Why a plain `String`?
///
/// The workload exists to consume call stack, not to model biology:
/// - **Append**: pushing one symbol per recursive step is trivial
/// - **Splice**: recombination is byte slicing, since the alphabet is ASCII
/// - **Hashing**: branching gates and selection policies key off the content
///   hash of the whole sequence
///
/// A sequence is owned exclusively by the recursive call chain that is
/// building it; clones are taken only at branch points.
pub type Dna = String;

/// The 4-letter alphabet every sequence is drawn from.
pub const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Content hash of a sequence.
///
/// Uses the default SipHash with its fixed initialization keys, so the value
/// is fully determined by the sequence content: the same sequence always
/// hashes (and therefore branches) the same way.
pub fn content_hash(dna: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    dna.hash(&mut hasher);
    hasher.finish()
}

/// Content-dependent branching gate: true on roughly 1 in `modulus` sequences.
///
/// This is deliberately not a fixed-probability RNG draw. The gate scales with
/// content, so identical sequences always take the same branch, while the
/// randomized straight-line steps keep the overall pattern pseudo-random.
pub fn hash_gate(dna: &str, modulus: u64) -> bool {
    content_hash(dna) % modulus == 0
}

/// Recombine two sequences at `split`: prefix of `left` + suffix of `right`.
///
/// `split` must not exceed the length of either input.
pub fn splice(left: &str, right: &str, split: usize) -> Dna {
    let mut out = Dna::with_capacity(right.len());
    out.push_str(&left[..split]);
    out.push_str(&right[split..]);
    out
}
