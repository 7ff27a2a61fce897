//! Shuffle index selection

use rand::Rng;

/// Pick a uniformly random index different from `current`
///
/// Single-element collections return index 0 (nothing else to pick).
pub fn random_other_index(len: usize, current: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let mut rng = rand::thread_rng();
    let mut index = rng.gen_range(0..len - 1);
    if index >= current {
        index += 1;
    }
    index
}
