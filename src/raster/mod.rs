//! Raster surface model and sampling.
//!
//! - [`GeoTransform`]: affine grid-index ↔ planar-coordinate mapping
//! - [`RasterSurface`]: read-only cell grid with a nodata sentinel
//! - [`sample`] / [`sample_all`]: point and buffered-disk aggregation

mod sampler;
mod surface;
mod transform;

pub use sampler::{check_buffer_radius, sample, sample_all, NoData, Sample, Statistic};
pub(crate) use sampler::sample_unchecked;
pub use surface::RasterSurface;
pub use transform::GeoTransform;
