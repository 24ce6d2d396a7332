//! Georeferenced read-only raster grid.

use super::GeoTransform;
use crate::error::{AlignError, Result};
use ndarray::Array2;

/// A 2D grid of cell values with an affine transform and an optional nodata
/// sentinel.
///
/// Cells are stored row-major as `(row, col)`. A cell is invalid when it
/// equals the nodata sentinel or is NaN.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    data: Array2<f64>,
    transform: GeoTransform,
    nodata: Option<f64>,
}

impl RasterSurface {
    pub fn new(data: Array2<f64>, transform: GeoTransform, nodata: Option<f64>) -> Self {
        Self {
            data,
            transform,
            nodata,
        }
    }

    /// Builds a surface from row-major values.
    pub fn from_vec(
        values: Vec<f64>,
        rows: usize,
        cols: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
    ) -> Result<Self> {
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|e| {
            AlignError::invalid("raster shape", format!("{rows}x{cols}"), e.to_string())
        })?;
        Ok(Self::new(data, transform, nodata))
    }

    /// A surface where every cell holds `value`.
    pub fn filled(rows: usize, cols: usize, value: f64, transform: GeoTransform) -> Self {
        Self::new(Array2::from_elem((rows, cols), value), transform, None)
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Raw cell value, `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Cell value if it is in bounds and valid.
    pub fn valid_value(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col).filter(|&v| self.is_valid(v))
    }

    pub fn is_valid(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.nodata {
            Some(nd) => value != nd,
            None => true,
        }
    }
}
