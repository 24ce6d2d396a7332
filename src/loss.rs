//! Loss between sampled raster values and reference point measurements.
//!
//! [`LossEvaluator`] shifts a point set by a candidate [`Offset`], samples the
//! raster under each shifted point, pairs the samples with the points'
//! reference measurements, and reduces the valid pairs with a
//! [`DistanceMethod`]. It is deterministic for a fixed offset and dataset.

use crate::distance::DistanceMethod;
use crate::error::{AlignError, Result};
use crate::points::{has_field, AdjustedPoint, Offset, PointSample};
use crate::raster::{check_buffer_radius, sample_unchecked, RasterSurface, Sample, Statistic};

/// Loss reported when no (reference, sample) pair survives filtering.
pub const NO_VALID_DATA_LOSS: f64 = 1000.0;

/// Sampling and comparison parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LossConfig {
    /// Disk radius around each point; 0 samples the containing cell only.
    pub buffer_radius: f64,

    /// Aggregate over the cells under a buffered point.
    pub statistic: Statistic,

    /// Distance between reference and sampled sequences.
    pub method: DistanceMethod,

    /// Name of the reference measurement attribute.
    ///
    /// `None` selects extraction-only mode: values are sampled but no
    /// comparison is made and the loss is 0.
    pub measurement: Option<String>,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            buffer_radius: 12.5,
            statistic: Statistic::Mean,
            method: DistanceMethod::Euclidean,
            measurement: None,
        }
    }
}

impl LossConfig {
    pub fn with_buffer_radius(mut self, radius: f64) -> Self {
        self.buffer_radius = radius;
        self
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn with_method(mut self, method: DistanceMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_measurement(mut self, field: impl Into<String>) -> Self {
        self.measurement = Some(field.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_buffer_radius(self.buffer_radius)
    }
}

/// How a loss value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LossStatus {
    /// The distance was computed over `pairs` valid pairs.
    Compared { pairs: usize },
    /// No valid pair remained; the loss is [`NO_VALID_DATA_LOSS`].
    NoValidData,
    /// No measurement attribute was requested; the loss is 0.
    ExtractionOnly,
}

/// A shifted point with the raster value sampled beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPoint {
    pub point: AdjustedPoint,
    pub value: Sample,
}

/// Full result of one loss evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub status: LossStatus,
    /// Points in input order.
    pub points: Vec<SampledPoint>,
    /// Number of points for which the raster gave no value.
    pub nodata_count: usize,
}

/// Evaluates candidate offsets against a fixed point set and raster.
///
/// Borrowing both inputs immutably lets one evaluator be shared across
/// worker threads.
#[derive(Debug, Clone)]
pub struct LossEvaluator<'a> {
    points: &'a [PointSample],
    surface: &'a RasterSurface,
    config: LossConfig,
}

impl<'a> LossEvaluator<'a> {
    /// Validates the configuration against the inputs.
    ///
    /// # Errors
    /// - `InvalidArgument` for a negative or non-finite buffer radius
    /// - `MissingField` if a measurement is requested and no point carries it
    pub fn new(
        points: &'a [PointSample],
        surface: &'a RasterSurface,
        config: LossConfig,
    ) -> Result<Self> {
        config.validate()?;
        if let Some(field) = &config.measurement {
            if !points.is_empty() && !has_field(points, field) {
                return Err(AlignError::MissingField(field.clone()));
            }
        }
        Ok(Self {
            points,
            surface,
            config,
        })
    }

    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    pub fn points(&self) -> &'a [PointSample] {
        self.points
    }

    /// Loss value only, without materialising the shifted point set.
    pub fn loss(&self, offset: Offset) -> Result<f64> {
        let Some(field) = &self.config.measurement else {
            return Ok(0.0);
        };
        let (reference, sampled): (Vec<f64>, Vec<f64>) = self
            .points
            .iter()
            .filter_map(|p| {
                let reference = p.attribute(field).filter(|v| !v.is_nan())?;
                let value = self.sample_at(p.x + offset.dx, p.y + offset.dy).ok()?;
                (!value.is_nan()).then_some((reference, value))
            })
            .unzip();
        self.compare(&reference, &sampled).map(|(loss, _)| loss)
    }

    /// Loss together with the sampled, shifted point set.
    pub fn evaluate(&self, offset: Offset) -> Result<Evaluation> {
        let points: Vec<SampledPoint> = self
            .points
            .iter()
            .map(|p| {
                let point = p.shifted(offset);
                let value = self.sample_at(point.x, point.y);
                SampledPoint { point, value }
            })
            .collect();
        let nodata_count = points.iter().filter(|p| p.value.is_err()).count();

        let Some(field) = &self.config.measurement else {
            return Ok(Evaluation {
                loss: 0.0,
                status: LossStatus::ExtractionOnly,
                points,
                nodata_count,
            });
        };

        let (reference, sampled): (Vec<f64>, Vec<f64>) = points
            .iter()
            .filter_map(|sp| {
                let reference = sp.point.attribute(field).filter(|v| !v.is_nan())?;
                let value = sp.value.ok().filter(|v| !v.is_nan())?;
                Some((reference, value))
            })
            .unzip();
        let (loss, status) = self.compare(&reference, &sampled)?;

        Ok(Evaluation {
            loss,
            status,
            points,
            nodata_count,
        })
    }

    fn sample_at(&self, x: f64, y: f64) -> Sample {
        sample_unchecked(
            self.surface,
            x,
            y,
            self.config.buffer_radius,
            self.config.statistic,
        )
    }

    fn compare(&self, reference: &[f64], sampled: &[f64]) -> Result<(f64, LossStatus)> {
        if reference.is_empty() {
            return Ok((NO_VALID_DATA_LOSS, LossStatus::NoValidData));
        }
        let loss = self.config.method.distance(reference, sampled)?;
        Ok((
            loss,
            LossStatus::Compared {
                pairs: reference.len(),
            },
        ))
    }
}

/// One-shot evaluation of `offset`.
pub fn evaluate_loss(
    points: &[PointSample],
    surface: &RasterSurface,
    offset: Offset,
    config: &LossConfig,
) -> Result<Evaluation> {
    LossEvaluator::new(points, surface, config.clone())?.evaluate(offset)
}

/// Distance between the points' measurements and the raster at zero offset.
pub fn perform_distance(
    points: &[PointSample],
    surface: &RasterSurface,
    config: &LossConfig,
) -> Result<f64> {
    LossEvaluator::new(points, surface, config.clone())?.loss(Offset::ZERO)
}

/// Samples the raster under every point without comparison.
pub fn extract_values(
    points: &[PointSample],
    surface: &RasterSurface,
    buffer_radius: f64,
    statistic: Statistic,
) -> Result<Vec<SampledPoint>> {
    let config = LossConfig {
        buffer_radius,
        statistic,
        method: DistanceMethod::default(),
        measurement: None,
    };
    Ok(LossEvaluator::new(points, surface, config)?
        .evaluate(Offset::ZERO)?
        .points)
}
