//! Point and buffered-disk sampling of a raster surface.
//!
//! A point samples the single cell that contains it. A buffered point samples
//! every cell whose footprint intersects the disk of the given radius, and the
//! valid values are reduced with a [`Statistic`].

use super::RasterSurface;
use crate::error::{AlignError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Aggregate applied to the valid cell values under a sample geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Statistic {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    Sum,
}

static STATISTIC_NAMES: [(&str, Statistic); 5] = [
    ("mean", Statistic::Mean),
    ("median", Statistic::Median),
    ("min", Statistic::Min),
    ("max", Statistic::Max),
    ("sum", Statistic::Sum),
];

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Sum => "sum",
        }
    }

    /// Reduces a non-empty set of values. Returns `None` for an empty slice.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let v = match self {
            Statistic::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Statistic::Sum => values.iter().sum(),
            Statistic::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Statistic::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
        };
        Some(v)
    }
}

impl FromStr for Statistic {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self> {
        STATISTIC_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, stat)| stat)
            .ok_or_else(|| AlignError::invalid("statistic", s, "unsupported statistic"))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a sample geometry produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoData {
    /// The geometry does not overlap the raster extent.
    OutsideExtent,
    /// Every intersected cell is nodata.
    AllNodata,
    /// Non-finite coordinates or a non-invertible transform.
    InvalidGeometry,
}

impl fmt::Display for NoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoData::OutsideExtent => f.write_str("geometry outside raster extent"),
            NoData::AllNodata => f.write_str("all intersected cells are nodata"),
            NoData::InvalidGeometry => f.write_str("invalid sample geometry"),
        }
    }
}

/// Outcome of sampling one geometry.
pub type Sample = std::result::Result<f64, NoData>;

/// Validates a buffer radius: finite and non-negative.
pub fn check_buffer_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(AlignError::invalid(
            "buffer_radius",
            radius,
            "must be finite and >= 0",
        ))
    }
}

/// Samples `surface` at `(x, y)`.
///
/// The outer `Result` reports argument errors (bad radius); the inner
/// [`Sample`] is the per-point outcome.
pub fn sample(
    surface: &RasterSurface,
    x: f64,
    y: f64,
    buffer_radius: f64,
    statistic: Statistic,
) -> Result<Sample> {
    check_buffer_radius(buffer_radius)?;
    Ok(sample_unchecked(surface, x, y, buffer_radius, statistic))
}

/// Samples every point in order. Per-point failures stay local to that point.
pub fn sample_all<I>(
    surface: &RasterSurface,
    points: I,
    buffer_radius: f64,
    statistic: Statistic,
) -> Result<Vec<Sample>>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    check_buffer_radius(buffer_radius)?;
    let samples: Vec<Sample> = points
        .into_iter()
        .map(|(x, y)| sample_unchecked(surface, x, y, buffer_radius, statistic))
        .collect();
    let missing = samples.iter().filter(|s| s.is_err()).count();
    if missing > 0 {
        debug!(missing, total = samples.len(), "points without raster value");
    }
    Ok(samples)
}

pub(crate) fn sample_unchecked(
    surface: &RasterSurface,
    x: f64,
    y: f64,
    buffer_radius: f64,
    statistic: Statistic,
) -> Sample {
    if !x.is_finite() || !y.is_finite() || !surface.transform().is_invertible() {
        return Err(NoData::InvalidGeometry);
    }
    let values = if buffer_radius == 0.0 {
        cell_at(surface, x, y)?
    } else {
        cells_in_disk(surface, x, y, buffer_radius)?
    };
    statistic.apply(&values).ok_or(NoData::AllNodata)
}

/// Valid value of the cell containing `(x, y)`, as a one-element set.
fn cell_at(surface: &RasterSurface, x: f64, y: f64) -> std::result::Result<Vec<f64>, NoData> {
    let (col, row) = surface
        .transform()
        .invert(x, y)
        .ok_or(NoData::InvalidGeometry)?;
    let (col, row) = (col.floor(), row.floor());
    if col < 0.0 || row < 0.0 || col >= surface.cols() as f64 || row >= surface.rows() as f64 {
        return Err(NoData::OutsideExtent);
    }
    match surface.valid_value(row as usize, col as usize) {
        Some(v) => Ok(vec![v]),
        None => Err(NoData::AllNodata),
    }
}

/// Valid values of all cells whose footprint intersects the disk.
fn cells_in_disk(
    surface: &RasterSurface,
    x: f64,
    y: f64,
    radius: f64,
) -> std::result::Result<Vec<f64>, NoData> {
    let gt = surface.transform();
    let (col_range, row_range) =
        pixel_window(surface, x, y, radius).ok_or(NoData::OutsideExtent)?;

    let mut touched = 0usize;
    let mut values = Vec::new();
    for row in row_range {
        for col in col_range.clone() {
            let corners = gt.cell_corners(col, row);
            if distance_to_quad((x, y), &corners) >= radius {
                continue;
            }
            touched += 1;
            if let Some(v) = surface.valid_value(row, col) {
                values.push(v);
            }
        }
    }

    if touched == 0 {
        Err(NoData::OutsideExtent)
    } else if values.is_empty() {
        Err(NoData::AllNodata)
    } else {
        Ok(values)
    }
}

type CellRange = std::ops::Range<usize>;

/// Candidate cell window of the disk's bounding square, clipped to the grid.
fn pixel_window(
    surface: &RasterSurface,
    x: f64,
    y: f64,
    radius: f64,
) -> Option<(CellRange, CellRange)> {
    let gt = surface.transform();
    let mut min_c = f64::INFINITY;
    let mut max_c = f64::NEG_INFINITY;
    let mut min_r = f64::INFINITY;
    let mut max_r = f64::NEG_INFINITY;
    for (px, py) in [
        (x - radius, y - radius),
        (x + radius, y - radius),
        (x + radius, y + radius),
        (x - radius, y + radius),
    ] {
        let (c, r) = gt.invert(px, py)?;
        min_c = min_c.min(c);
        max_c = max_c.max(c);
        min_r = min_r.min(r);
        max_r = max_r.max(r);
    }

    let clip = |lo: f64, hi: f64, n: usize| -> Option<CellRange> {
        let start = lo.floor().max(0.0);
        let end = (hi.floor() + 1.0).min(n as f64);
        if start >= end {
            None
        } else {
            Some(start as usize..end as usize)
        }
    };
    Some((
        clip(min_c, max_c, surface.cols())?,
        clip(min_r, max_r, surface.rows())?,
    ))
}

/// Distance from `p` to a convex quadrilateral; zero when `p` is inside.
fn distance_to_quad(p: (f64, f64), quad: &[(f64, f64); 4]) -> f64 {
    let mut sign = 0.0f64;
    let mut inside = true;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
        if cross != 0.0 {
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                inside = false;
                break;
            }
        }
    }
    if inside {
        return 0.0;
    }
    (0..4)
        .map(|i| distance_to_segment(p, quad[i], quad[(i + 1) % 4]))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoTransform;

    /// 4x4 grid, 1-unit cells, upper-left corner at (0, 4); value = row * 4 + col.
    fn ramp() -> RasterSurface {
        let values: Vec<f64> = (0..16).map(|v| v as f64).collect();
        RasterSurface::from_vec(values, 4, 4, GeoTransform::new(0.0, 4.0, 1.0, -1.0), None)
            .unwrap()
    }

    const ALL: [Statistic; 5] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Min,
        Statistic::Max,
        Statistic::Sum,
    ];

    #[test]
    fn test_point_returns_containing_cell_for_every_statistic() {
        let s = ramp();
        // (2.5, 1.5) lies in row 2, col 2
        for stat in ALL {
            assert_eq!(sample(&s, 2.5, 1.5, 0.0, stat).unwrap(), Ok(10.0), "{stat}");
        }
    }

    #[test]
    fn test_point_outside_extent() {
        let s = ramp();
        assert_eq!(
            sample(&s, -0.5, 1.0, 0.0, Statistic::Mean).unwrap(),
            Err(NoData::OutsideExtent)
        );
        assert_eq!(
            sample(&s, 4.0, 1.0, 0.0, Statistic::Mean).unwrap(),
            Err(NoData::OutsideExtent)
        );
    }

    #[test]
    fn test_point_on_nodata_cell() {
        let s = ramp().with_nodata(10.0);
        assert_eq!(
            sample(&s, 2.5, 1.5, 0.0, Statistic::Mean).unwrap(),
            Err(NoData::AllNodata)
        );
    }

    #[test]
    fn test_nan_coordinates() {
        let s = ramp();
        assert_eq!(
            sample(&s, f64::NAN, 1.0, 0.0, Statistic::Mean).unwrap(),
            Err(NoData::InvalidGeometry)
        );
    }

    #[test]
    fn test_small_disk_stays_in_cell() {
        let s = ramp();
        assert_eq!(sample(&s, 2.5, 1.5, 0.2, Statistic::Sum).unwrap(), Ok(10.0));
    }

    #[test]
    fn test_disk_collects_neighbours() {
        let s = ramp();
        // Radius 0.6 around the centre of cell (row 2, col 2) reaches the four
        // edge neighbours but not the diagonal ones (corner distance ~0.707).
        let got = sample(&s, 2.5, 1.5, 0.6, Statistic::Sum).unwrap().unwrap();
        assert!((got - (10.0 + 6.0 + 14.0 + 9.0 + 11.0)).abs() < 1e-12);

        let got = sample(&s, 2.5, 1.5, 0.6, Statistic::Min).unwrap().unwrap();
        assert_eq!(got, 6.0);
        let got = sample(&s, 2.5, 1.5, 0.6, Statistic::Max).unwrap().unwrap();
        assert_eq!(got, 14.0);
        let got = sample(&s, 2.5, 1.5, 0.6, Statistic::Median).unwrap().unwrap();
        assert_eq!(got, 10.0);
    }

    #[test]
    fn test_disk_partially_outside_uses_overlap() {
        let s = ramp();
        // Centred on the top-left corner: only cell (0, 0) intersects.
        let got = sample(&s, 0.0, 4.0, 0.5, Statistic::Mean).unwrap();
        assert_eq!(got, Ok(0.0));
    }

    #[test]
    fn test_disk_fully_outside() {
        let s = ramp();
        assert_eq!(
            sample(&s, 20.0, 20.0, 2.0, Statistic::Mean).unwrap(),
            Err(NoData::OutsideExtent)
        );
        // Near the corner but not touching it.
        assert_eq!(
            sample(&s, -1.0, 5.0, 1.0, Statistic::Mean).unwrap(),
            Err(NoData::OutsideExtent)
        );
    }

    #[test]
    fn test_disk_all_nodata() {
        let s = RasterSurface::filled(3, 3, -1.0, GeoTransform::new(0.0, 3.0, 1.0, -1.0))
            .with_nodata(-1.0);
        assert_eq!(
            sample(&s, 1.5, 1.5, 1.0, Statistic::Mean).unwrap(),
            Err(NoData::AllNodata)
        );
    }

    #[test]
    fn test_disk_skips_nodata_cells() {
        let s = ramp().with_nodata(6.0);
        let got = sample(&s, 2.5, 1.5, 0.6, Statistic::Sum).unwrap().unwrap();
        assert!((got - (10.0 + 14.0 + 9.0 + 11.0)).abs() < 1e-12);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let s = ramp();
        assert!(matches!(
            sample(&s, 1.0, 1.0, -1.0, Statistic::Mean),
            Err(AlignError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_statistic_parsing() {
        for (name, stat) in STATISTIC_NAMES {
            assert_eq!(name.parse::<Statistic>().unwrap(), stat);
            assert_eq!(stat.to_string(), name);
        }
        assert!(matches!(
            "mode".parse::<Statistic>(),
            Err(AlignError::InvalidArgument { name: "statistic", .. })
        ));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(Statistic::Median.apply(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(Statistic::Median.apply(&[]), None);
    }

    #[test]
    fn test_sample_all_keeps_order() {
        let s = ramp();
        let got = sample_all(
            &s,
            vec![(0.5, 3.5), (99.0, 99.0), (3.5, 0.5)],
            0.0,
            Statistic::Mean,
        )
        .unwrap();
        assert_eq!(got, vec![Ok(0.0), Err(NoData::OutsideExtent), Ok(15.0)]);
    }
}
