//! Scalar dissimilarity between two numeric sequences.
//!
//! All metrics take two equal-length, non-empty, NaN-free sequences. Callers
//! holding sequences with missing entries use [`drop_invalid_pairs`] first.
//!
//! # References
//!
//! - Sakoe & Chiba (1978), "Dynamic programming algorithm optimization for
//!   spoken word recognition" (symmetric DTW step pattern)
//! - Huttenlocher et al. (1993), "Comparing images using the Hausdorff distance"

use crate::error::{AlignError, Result};
use std::fmt;
use std::str::FromStr;

/// Loss returned by [`DistanceMethod::Correlation`] when the Pearson
/// coefficient is undefined (zero variance or a single pair).
pub const CORRELATION_UNDEFINED: f64 = 1000.0;

/// Distance algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceMethod {
    /// L2 norm of the difference vector.
    #[default]
    Euclidean,
    /// L1 norm of the difference vector.
    Manhattan,
    /// Dynamic time warping with absolute-difference local cost.
    Dtw,
    /// `1 - pearson(a, b)`.
    Correlation,
    /// Riemann-sum area between the two curves.
    Area,
    /// Symmetric Hausdorff distance between the value sets.
    Hausdorff,
}

type Metric = fn(&[f64], &[f64]) -> f64;

static METHODS: [(&str, DistanceMethod, Metric); 6] = [
    ("euclidean", DistanceMethod::Euclidean, euclidean),
    ("manhattan", DistanceMethod::Manhattan, manhattan),
    ("dtw", DistanceMethod::Dtw, dtw),
    ("correlation", DistanceMethod::Correlation, correlation),
    ("area", DistanceMethod::Area, area),
    ("hausdorff", DistanceMethod::Hausdorff, hausdorff),
];

impl DistanceMethod {
    fn entry(&self) -> &'static (&'static str, DistanceMethod, Metric) {
        // Every variant has exactly one table row.
        let idx = match self {
            DistanceMethod::Euclidean => 0,
            DistanceMethod::Manhattan => 1,
            DistanceMethod::Dtw => 2,
            DistanceMethod::Correlation => 3,
            DistanceMethod::Area => 4,
            DistanceMethod::Hausdorff => 5,
        };
        &METHODS[idx]
    }

    pub fn name(&self) -> &'static str {
        self.entry().0
    }

    /// Computes the distance between `a` and `b`.
    ///
    /// # Errors
    /// `InvalidArgument` if the sequences differ in length, are empty, or
    /// contain NaN.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(AlignError::invalid(
                "sequences",
                format!("{} vs {}", a.len(), b.len()),
                "sequences must have equal length",
            ));
        }
        if a.is_empty() {
            return Err(AlignError::invalid("sequences", 0, "sequences must not be empty"));
        }
        if a.iter().chain(b).any(|v| v.is_nan()) {
            return Err(AlignError::invalid(
                "sequences",
                "NaN",
                "remove invalid pairs before computing a distance",
            ));
        }
        Ok((self.entry().2)(a, b))
    }
}

impl FromStr for DistanceMethod {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self> {
        METHODS
            .iter()
            .find(|(name, _, _)| *name == s)
            .map(|&(_, method, _)| method)
            .ok_or_else(|| AlignError::invalid("method", s, "unsupported distance method"))
    }
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-function form of [`DistanceMethod::distance`].
pub fn distance(a: &[f64], b: &[f64], method: DistanceMethod) -> Result<f64> {
    method.distance(a, b)
}

/// Removes every index where either sequence holds NaN.
///
/// Both outputs keep the surviving pairs in their original order.
pub fn drop_invalid_pairs(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .unzip()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

fn area(a: &[f64], b: &[f64]) -> f64 {
    // Unit spacing: the Riemann sum reduces to the summed absolute gap.
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Symmetric step pattern: diagonal moves cost `2d`, horizontal and vertical `d`.
fn dtw(a: &[f64], b: &[f64]) -> f64 {
    let m = b.len();
    let mut prev = vec![f64::INFINITY; m];
    let mut curr = vec![f64::INFINITY; m];

    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            let d = (x - y).abs();
            curr[j] = if i == 0 && j == 0 {
                d
            } else {
                let diag = if i > 0 && j > 0 { prev[j - 1] + 2.0 * d } else { f64::INFINITY };
                let up = if i > 0 { prev[j] + d } else { f64::INFINITY };
                let left = if j > 0 { curr[j - 1] + d } else { f64::INFINITY };
                diag.min(up).min(left)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m - 1]
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if !denom.is_finite() || denom <= 0.0 {
        return CORRELATION_UNDEFINED;
    }
    let r = (cov / denom).clamp(-1.0, 1.0);
    1.0 - r
}

fn hausdorff(a: &[f64], b: &[f64]) -> f64 {
    directed_hausdorff(a, b).max(directed_hausdorff(b, a))
}

/// `max` over `from` of the distance to the nearest value in `to`.
fn directed_hausdorff(from: &[f64], to: &[f64]) -> f64 {
    let mut sorted = to.to_vec();
    sorted.sort_by(f64::total_cmp);

    from.iter()
        .map(|&x| {
            let idx = sorted.partition_point(|&v| v < x);
            let above = sorted.get(idx).map(|&v| v - x);
            let below = idx.checked_sub(1).map(|i| x - sorted[i]);
            match (above, below) {
                (Some(u), Some(l)) => u.min(l),
                (Some(u), None) => u,
                (None, Some(l)) => l,
                (None, None) => f64::INFINITY,
            }
        })
        .fold(0.0, f64::max)
}
