//! Point measurements, offsets, and the offset search box.

use crate::error::{AlignError, Result};
use std::collections::BTreeMap;

/// A rigid planar translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Axis-aligned search box `[x_min, x_max] × [y_min, y_max]` for offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub lower: [f64; 2],
    pub upper: [f64; 2],
}

impl Bounds {
    pub fn new(lower: [f64; 2], upper: [f64; 2]) -> Self {
        Self { lower, upper }
    }

    /// Symmetric box `[-half, half]` on both axes.
    pub fn symmetric(half: f64) -> Self {
        Self::new([-half, -half], [half, half])
    }

    /// Rejects non-finite coordinates and inverted intervals.
    pub fn validate(&self) -> Result<()> {
        for axis in 0..2 {
            let (lo, hi) = (self.lower[axis], self.upper[axis]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(AlignError::invalid(
                    "bounds",
                    format!("{self:?}"),
                    "bounds must be finite",
                ));
            }
            if lo > hi {
                return Err(AlignError::invalid(
                    "bounds",
                    format!("{self:?}"),
                    "lower bound exceeds upper bound",
                ));
            }
        }
        Ok(())
    }

    pub fn contains(&self, offset: Offset) -> bool {
        (self.lower[0]..=self.upper[0]).contains(&offset.dx)
            && (self.lower[1]..=self.upper[1]).contains(&offset.dy)
    }

    /// Projects an offset onto the box.
    pub fn clamp(&self, offset: Offset) -> Offset {
        Offset {
            dx: offset.dx.clamp(self.lower[0], self.upper[0]),
            dy: offset.dy.clamp(self.lower[1], self.upper[1]),
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::symmetric(30.0)
    }
}

/// One point measurement (e.g. a LiDAR footprint centroid).
///
/// Numeric attributes are keyed by name; the reference measurement used for
/// comparison is one of them, chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSample {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub attributes: BTreeMap<String, f64>,
}

impl PointSample {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    /// The sample translated by `offset`, original coordinates kept.
    pub fn shifted(&self, offset: Offset) -> AdjustedPoint {
        AdjustedPoint {
            id: self.id.clone(),
            orig_x: self.x,
            orig_y: self.y,
            x: self.x + offset.dx,
            y: self.y + offset.dy,
            attributes: self.attributes.clone(),
        }
    }
}

/// A point after an offset: original and shifted coordinates side by side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustedPoint {
    pub id: String,
    pub orig_x: f64,
    pub orig_y: f64,
    pub x: f64,
    pub y: f64,
    pub attributes: BTreeMap<String, f64>,
}

impl AdjustedPoint {
    pub fn offset(&self) -> Offset {
        Offset::new(self.x - self.orig_x, self.y - self.orig_y)
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }
}

/// Shifts every sample by the same offset.
pub fn apply_offset(points: &[PointSample], offset: Offset) -> Vec<AdjustedPoint> {
    points.iter().map(|p| p.shifted(offset)).collect()
}

/// Whether any sample carries the attribute `name`.
pub fn has_field(points: &[PointSample], name: &str) -> bool {
    points.iter().any(|p| p.attributes.contains_key(name))
}
