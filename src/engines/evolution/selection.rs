use super::dna::{content_hash, Dna};

/// Trivial selection: keep the first candidate.
///
/// Used by the capacity probe, where the workload only has to burn stack and
/// the choice between branches is irrelevant.
pub fn first(mut candidates: Vec<Dna>) -> Dna {
    candidates.swap_remove(0)
}

/// Hash-indexed selection: pick the candidate indexed by the content hash of
/// the first one. Deterministic given the candidate set, so warmup trials with
/// identical branch content converge on identical picks.
pub fn hash_indexed(mut candidates: Vec<Dna>) -> Dna {
    let idx = (content_hash(&candidates[0]) as usize) % candidates.len();
    candidates.swap_remove(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_returns_first_candidate() {
        let picked = first(vec!["ACGT".to_string(), "TTTT".to_string()]);
        assert_eq!(picked, "ACGT");
    }

    #[test]
    fn hash_indexed_returns_a_member_of_the_input() {
        let candidates = vec!["ACGT".to_string(), "TTTT".to_string(), "GGCC".to_string()];
        let picked = hash_indexed(candidates.clone());
        assert!(candidates.contains(&picked));
    }

    #[test]
    fn hash_indexed_is_deterministic() {
        let candidates = vec!["ACGTAC".to_string(), "TTTTTT".to_string()];
        assert_eq!(hash_indexed(candidates.clone()), hash_indexed(candidates));
    }
}
