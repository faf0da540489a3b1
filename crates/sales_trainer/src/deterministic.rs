//! Deterministic utilities for reproducible training
//!
//! Row ordering for the train/test split and per-tree seeds are both derived
//! from an xxhash64-style mixer, so a fixed seed yields identical partitions
//! and forests on every platform.

const PRIME1: u64 = 0x9E37_79B1_85EB_CA87;
const PRIME2: u64 = 0xC2B2_AE3D_27D4_EB4F;
const PRIME3: u64 = 0x1656_67B1_9E37_79F9;
const PRIME5: u64 = 0x85EB_CA77_C2B2_AE63;

/// Mix `values` under `seed` into a well-distributed 64-bit hash
pub fn xxhash64(values: &[u64], seed: u64) -> u64 {
    let mut h = seed.wrapping_add(PRIME5);

    for &val in values {
        h = h.wrapping_add(val.wrapping_mul(PRIME3));
        h = h.rotate_left(17).wrapping_mul(PRIME2);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Seeded permutation of `0..n`.
///
/// Rows are ordered by the hash of their index; ties fall back to the index.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut keyed: Vec<(u64, usize)> = (0..n)
        .map(|i| (xxhash64(&[i as u64], seed), i))
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, i)| i).collect()
}

/// Seed for the `tree_idx`-th tree of a forest seeded with `forest_seed`
pub fn tree_seed(forest_seed: u64, tree_idx: usize) -> u64 {
    xxhash64(&[tree_idx as u64, 0x7265_6573], forest_seed)
}
