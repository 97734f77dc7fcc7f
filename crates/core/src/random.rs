//! Deterministic helpers over the injected seeded generator.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn pick_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

/// Fisher-Yates shuffle driven by the injected generator.
pub(crate) fn shuffle<T>(rng: &mut ChaCha8Rng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = pick_index(rng, i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn pick_index_stays_inside_requested_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(12_345);
        for len in 1..50 {
            assert!(pick_index(&mut rng, len) < len);
        }
    }

    #[test]
    fn shuffle_is_a_permutation_and_seed_stable() {
        let mut left: Vec<u32> = (0..16).collect();
        let mut right = left.clone();
        shuffle(&mut ChaCha8Rng::seed_from_u64(7), &mut left);
        shuffle(&mut ChaCha8Rng::seed_from_u64(7), &mut right);
        assert_eq!(left, right);

        let mut sorted = left.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }
}
