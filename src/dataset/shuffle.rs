use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle rows in place with a fixed-seed generator, so the same inputs
/// and seed always produce the same ordering.
pub fn seeded_shuffle<T>(rows: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
}
