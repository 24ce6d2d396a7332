//! Tournament selection.
//!
//! # References
//!
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection, and
//!   the Effects of Noise"

use super::types::Individual;
use rand::Rng;

/// Picks one parent index: `k` aspirants drawn uniformly with replacement,
/// the lowest fitness wins and the earliest draw wins ties.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness_or_worst() < population[best_idx].fitness_or_worst() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Runs `count` independent tournaments and returns the winners in draw order.
pub fn select_tournament<I: Individual, R: Rng>(
    population: &[I],
    count: usize,
    k: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..count).map(|_| tournament(population, k, &mut *rng)).collect()
}
