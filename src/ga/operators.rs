//! Real-valued genetic operators.
//!
//! These operate on `&mut [f64]` gene vectors and are problem-agnostic.
//!
//! # Crossover Operators
//!
//! - [`blend_crossover`] (BLX-α): Eshelman & Schaffer (1993), children drawn
//!   from the parents' interval extended by α on both sides
//!
//! # Mutation Operators
//!
//! - [`gaussian_mutation`]: independent per-gene normal perturbation
//!
//! # References
//!
//! - Eshelman & Schaffer (1993), "Real-Coded Genetic Algorithms and
//!   Interval-Schemata"
//! - Bäck & Schwefel (1993), "An Overview of Evolutionary Algorithms for
//!   Parameter Optimization"

use rand::Rng;
use rand_distr::StandardNormal;

/// Blend crossover (BLX-α) applied in place.
///
/// For each gene an independent `γ ~ U[-α, 1 + α)` is drawn and
///
/// ```text
/// first  = (1 - γ) * x1 + γ * x2
/// second = γ * x1 + (1 - γ) * x2
/// ```
///
/// With α = 0.5 each child lies within the parents' interval widened by half
/// its length on each side.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn blend_crossover<R: Rng>(first: &mut [f64], second: &mut [f64], alpha: f64, rng: &mut R) {
    assert_eq!(first.len(), second.len(), "parents must have equal length");

    for (x1, x2) in first.iter_mut().zip(second.iter_mut()) {
        let gamma = (1.0 + 2.0 * alpha) * rng.random::<f64>() - alpha;
        let (a, b) = (*x1, *x2);
        *x1 = (1.0 - gamma) * a + gamma * b;
        *x2 = gamma * a + (1.0 - gamma) * b;
    }
}

/// Gaussian mutation applied in place.
///
/// Each gene independently, with probability `indpb`, receives
/// `N(mu, sigma)` noise. Returns the number of genes changed.
pub fn gaussian_mutation<R: Rng>(
    genes: &mut [f64],
    mu: f64,
    sigma: f64,
    indpb: f64,
    rng: &mut R,
) -> usize {
    let mut changed = 0;
    for g in genes.iter_mut() {
        if rng.random::<f64>() < indpb {
            let z: f64 = rng.sample(StandardNormal);
            *g += mu + sigma * z;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_blend_children_within_extended_interval() {
        let mut rng = create_rng(42);
        for _ in 0..500 {
            let mut a = [0.0, 10.0];
            let mut b = [4.0, 2.0];
            blend_crossover(&mut a, &mut b, 0.5, &mut rng);
            // Gene 0: parents 0 and 4, extended interval [-2, 6]
            assert!((-2.0..=6.0).contains(&a[0]) && (-2.0..=6.0).contains(&b[0]));
            // Gene 1: parents 10 and 2, extended interval [-2, 14]
            assert!((-2.0..=14.0).contains(&a[1]) && (-2.0..=14.0).contains(&b[1]));
        }
    }

    #[test]
    fn test_blend_preserves_gene_sum() {
        let mut rng = create_rng(9);
        let mut a = [1.0, -3.0, 7.5];
        let mut b = [2.0, 5.0, -1.5];
        let before: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        blend_crossover(&mut a, &mut b, 0.5, &mut rng);
        for (i, s) in before.iter().enumerate() {
            assert!((a[i] + b[i] - s).abs() < 1e-12);
        }
    }

    #[test]
    fn test_blend_identical_parents_unchanged() {
        let mut rng = create_rng(1);
        let mut a = [3.0, -1.0];
        let mut b = [3.0, -1.0];
        blend_crossover(&mut a, &mut b, 0.5, &mut rng);
        assert_eq!(a, [3.0, -1.0]);
        assert_eq!(b, [3.0, -1.0]);
    }

    #[test]
    #[should_panic(expected = "parents must have equal length")]
    fn test_blend_length_mismatch_panics() {
        let mut rng = create_rng(1);
        blend_crossover(&mut [1.0], &mut [1.0, 2.0], 0.5, &mut rng);
    }

    #[test]
    fn test_gaussian_zero_probability_is_noop() {
        let mut rng = create_rng(5);
        let mut genes = [1.0, 2.0];
        assert_eq!(gaussian_mutation(&mut genes, 0.0, 1.0, 0.0, &mut rng), 0);
        assert_eq!(genes, [1.0, 2.0]);
    }

    #[test]
    fn test_gaussian_full_probability_changes_all() {
        let mut rng = create_rng(5);
        let mut genes = [0.0; 8];
        assert_eq!(gaussian_mutation(&mut genes, 0.0, 1.0, 1.0, &mut rng), 8);
        assert!(genes.iter().all(|&g| g != 0.0));
    }

    #[test]
    fn test_gaussian_noise_statistics() {
        let mut rng = create_rng(11);
        let n = 20_000;
        let mut genes = vec![0.0; n];
        gaussian_mutation(&mut genes, 0.0, 1.0, 1.0, &mut rng);
        let mean = genes.iter().sum::<f64>() / n as f64;
        let var = genes.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    #[test]
    fn test_gaussian_rate_matches_indpb() {
        let mut rng = create_rng(13);
        let mut genes = vec![0.0; 10_000];
        let changed = gaussian_mutation(&mut genes, 0.0, 1.0, 0.2, &mut rng);
        assert!((1700..2300).contains(&changed), "changed {changed}");
    }
}
