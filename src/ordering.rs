//! Deterministic per-session question order.
//!
//! Each survey session presents its questions in a shuffled order derived
//! from a seed string (typically the session id), so a respondent who reloads
//! the survey sees the same order while different sessions do not share one.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::questions::Question;

/// Stable 64-bit seed from an arbitrary seed string.
pub fn session_seed(seed: &str) -> u64 {
    let hash = blake3::hash(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Shuffled copy of `items`; the input is left untouched.
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut shuffled = items.to_vec();
    let mut rng = StdRng::seed_from_u64(session_seed(seed));
    shuffled.shuffle(&mut rng);
    shuffled
}

/// Presentation order (question ids) of the active questions for a session.
pub fn question_order(questions: &[Question], seed: &str) -> Vec<i64> {
    let ids: Vec<i64> = questions.iter().filter(|q| q.active).map(|q| q.id).collect();
    seeded_shuffle(&ids, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_order() {
        let items: Vec<u32> = (0..50).collect();
        assert_eq!(seeded_shuffle(&items, "session-a"), seeded_shuffle(&items, "session-a"));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut shuffled = seeded_shuffle(&items, "session-b");
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn different_seeds_differ() {
        let items: Vec<u32> = (0..50).collect();
        assert_ne!(seeded_shuffle(&items, "alpha"), seeded_shuffle(&items, "beta"));
    }
}
