//! Planar offset correction of point measurements against a reference raster.
//!
//! Point measurements (for example spaceborne lidar ground elevations) often
//! carry a constant horizontal displacement relative to a reference surface.
//! This crate searches for the translation `(dx, dy)` that best aligns the
//! points' measured values with the raster values beneath them:
//!
//! - **Raster sampling** ([`raster`]): point or disk-buffered sampling of an
//!   affine-georeferenced grid with a per-point NoData outcome.
//! - **Distance metrics** ([`distance`]): euclidean, manhattan, DTW,
//!   correlation, area and Hausdorff distances between value sequences.
//! - **Loss evaluation** ([`loss`]): shift, sample, pair, filter, compare.
//! - **Genetic search** ([`ga`], [`optimizer`]): a generic, seeded GA engine
//!   and the offset problem plugged into it.
//! - **Correction** ([`correction`]): apply the best offset to the full point
//!   set, or return the points untouched with the failure reason.
//!
//! # Example
//!
//! ```
//! use u_geoalign::{correct, AlignConfig, Bounds, GeoTransform, LossConfig, PointSample, RasterSurface};
//!
//! let surface = RasterSurface::filled(10, 10, 100.0, GeoTransform::new(0.0, 10.0, 1.0, -1.0));
//! let points = vec![
//!     PointSample::new("a", 2.5, 2.5).with_attribute("elev", 100.0),
//!     PointSample::new("b", 6.5, 7.5).with_attribute("elev", 100.0),
//! ];
//! let config = AlignConfig::default()
//!     .with_loss(LossConfig::default().with_buffer_radius(0.0).with_measurement("elev"))
//!     .with_bounds(Bounds::symmetric(0.0));
//!
//! let correction = correct(&points, &surface, &config);
//! assert!(correction.is_success());
//! assert_eq!(correction.report().best_loss, Some(0.0));
//! ```
//!
//! # Features
//!
//! - `parallel`: evaluate each generation on a scoped rayon pool
//! - `serde`: `Serialize`/`Deserialize` for configuration, data and results
//!
//! The library emits [`tracing`] events and never installs a subscriber.

pub mod config;
pub mod correction;
pub mod distance;
pub mod error;
pub mod ga;
pub mod loss;
pub mod optimizer;
pub mod points;
pub mod random;
pub mod raster;

pub use config::{AlignConfig, OperatorConfig};
pub use correction::{correct, Correction, CorrectionReport};
pub use distance::{distance, drop_invalid_pairs, DistanceMethod, CORRELATION_UNDEFINED};
pub use error::{AlignError, Result};
pub use loss::{
    evaluate_loss, extract_values, perform_distance, Evaluation, LossConfig, LossEvaluator,
    LossStatus, SampledPoint, NO_VALID_DATA_LOSS,
};
pub use optimizer::{optimize, OffsetIndividual, OffsetProblem, OptimizationResult, NAN_LOSS};
pub use points::{apply_offset, has_field, AdjustedPoint, Bounds, Offset, PointSample};
pub use raster::{sample, sample_all, GeoTransform, NoData, RasterSurface, Sample, Statistic};
