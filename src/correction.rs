//! Correction of a point set by its best offset.
//!
//! [`correct`] runs the offset search and, on success, applies the best
//! offset to every input point. On any failure the original points come back
//! untouched together with the reason; no zero offset is ever reported as a
//! correction.

use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::optimizer::{optimize, OptimizationResult};
use crate::points::{apply_offset, AdjustedPoint, Offset, PointSample};
use crate::raster::RasterSurface;
use tracing::{info, warn};

/// Outcome of [`correct`].
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// The best offset was found and applied to every point.
    Corrected {
        points: Vec<AdjustedPoint>,
        result: OptimizationResult,
    },
    /// The search failed; `points` is the input set as given.
    Unchanged {
        points: Vec<PointSample>,
        reason: AlignError,
    },
}

/// Summary of a [`Correction`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectionReport {
    pub best_offset: Option<Offset>,
    pub best_loss: Option<f64>,
    pub generations: usize,
    pub success: bool,
}

impl Correction {
    pub fn is_success(&self) -> bool {
        matches!(self, Correction::Corrected { .. })
    }

    pub fn result(&self) -> Option<&OptimizationResult> {
        match self {
            Correction::Corrected { result, .. } => Some(result),
            Correction::Unchanged { .. } => None,
        }
    }

    /// Why the points were left unchanged.
    pub fn reason(&self) -> Option<&AlignError> {
        match self {
            Correction::Corrected { .. } => None,
            Correction::Unchanged { reason, .. } => Some(reason),
        }
    }

    /// Number of points carried by the outcome.
    pub fn len(&self) -> usize {
        match self {
            Correction::Corrected { points, .. } => points.len(),
            Correction::Unchanged { points, .. } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn report(&self) -> CorrectionReport {
        match self {
            Correction::Corrected { result, .. } => CorrectionReport {
                best_offset: Some(result.offset),
                best_loss: Some(result.loss),
                generations: result.generations,
                success: true,
            },
            Correction::Unchanged { .. } => CorrectionReport {
                best_offset: None,
                best_loss: None,
                generations: 0,
                success: false,
            },
        }
    }
}

/// Finds the best offset for `points` and applies it to the whole set.
///
/// The offset is applied to the original coordinates; the buffer used while
/// searching plays no part in the returned geometry.
pub fn correct(points: &[PointSample], surface: &RasterSurface, config: &AlignConfig) -> Correction {
    match optimize(points, surface, config) {
        Ok(result) => {
            info!(
                points = points.len(),
                dx = result.offset.dx,
                dy = result.offset.dy,
                loss = result.loss,
                "points corrected"
            );
            Correction::Corrected {
                points: apply_offset(points, result.offset),
                result,
            }
        }
        Err(reason) => {
            warn!(points = points.len(), error = %reason, "correction failed, points unchanged");
            Correction::Unchanged {
                points: points.to_vec(),
                reason,
            }
        }
    }
}
