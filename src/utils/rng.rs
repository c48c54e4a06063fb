//! Random number generation owned by a network instance.
//!
//! A network carries its own `StdRng` so weight initialization and sample
//! shuffling are reproducible under a fixed seed, without any global state.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Create the generator for a network: fixed seed when given, OS entropy otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fisher-Yates shuffle of a sample-order permutation.
pub fn shuffle_indices(indices: &mut [usize], rng: &mut StdRng) {
    indices.shuffle(rng);
}
