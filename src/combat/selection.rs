//! Weighted random selection
//!
//! Cumulative weights over a declaration-ordered list: the first entry whose
//! running total exceeds the roll wins. With a seeded RNG the choice is
//! fully reproducible.

use rand::Rng;

use super::constants::PERCENT;

/// Index of the chosen entry, or `None` if no weight is positive
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last = Some(i);
        if roll < cumulative {
            return Some(i);
        }
    }
    // Float rounding can leave the roll a hair above the final total
    last
}

/// One independent gate: hit weight `chance`, miss weight `100 - chance`
pub fn gate<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    let hit = chance.clamp(0.0, PERCENT);
    weighted_pick(&[hit, PERCENT - hit], rng) == Some(0)
}
