//! Alignment configuration.
//!
//! [`AlignConfig`] bundles every parameter of an alignment run: sampling and
//! loss ([`LossConfig`]), the offset search box ([`Bounds`]), the GA engine
//! ([`GaConfig`]), and the variation operators ([`OperatorConfig`]).

use crate::error::{AlignError, Result};
use crate::ga::GaConfig;
use crate::loss::LossConfig;
use crate::points::Bounds;

/// Parameters of the real-valued variation operators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OperatorConfig {
    /// Blend crossover α.
    pub blend_alpha: f64,

    /// Mean of the Gaussian mutation noise.
    pub mutation_mu: f64,

    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f64,

    /// Per-coordinate mutation probability.
    pub gene_mutation_rate: f64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            blend_alpha: 0.5,
            mutation_mu: 0.0,
            mutation_sigma: 1.0,
            gene_mutation_rate: 0.2,
        }
    }
}

impl OperatorConfig {
    pub fn with_blend_alpha(mut self, alpha: f64) -> Self {
        self.blend_alpha = alpha;
        self
    }

    pub fn with_mutation_sigma(mut self, sigma: f64) -> Self {
        self.mutation_sigma = sigma;
        self
    }

    /// Sets the per-coordinate mutation probability, clamped to `[0, 1]`.
    pub fn with_gene_mutation_rate(mut self, rate: f64) -> Self {
        self.gene_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.blend_alpha.is_finite() || self.blend_alpha < 0.0 {
            return Err(AlignError::invalid("blend_alpha", self.blend_alpha, "must be finite and >= 0"));
        }
        if !self.mutation_mu.is_finite() {
            return Err(AlignError::invalid("mutation_mu", self.mutation_mu, "must be finite"));
        }
        if !self.mutation_sigma.is_finite() || self.mutation_sigma < 0.0 {
            return Err(AlignError::invalid(
                "mutation_sigma",
                self.mutation_sigma,
                "must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.gene_mutation_rate) {
            return Err(AlignError::invalid(
                "gene_mutation_rate",
                self.gene_mutation_rate,
                "must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Complete configuration of an offset search.
///
/// ```
/// use u_geoalign::{AlignConfig, Bounds, DistanceMethod, LossConfig, Statistic};
///
/// let config = AlignConfig::default()
///     .with_loss(
///         LossConfig::default()
///             .with_buffer_radius(12.5)
///             .with_statistic(Statistic::Median)
///             .with_method(DistanceMethod::Correlation)
///             .with_measurement("elev_lowestmode"),
///     )
///     .with_bounds(Bounds::symmetric(20.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignConfig {
    pub loss: LossConfig,
    pub bounds: Bounds,
    pub ga: GaConfig,
    pub operators: OperatorConfig,
}

impl AlignConfig {
    pub fn with_loss(mut self, loss: LossConfig) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_operators(mut self, operators: OperatorConfig) -> Self {
        self.operators = operators;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.loss.validate()?;
        self.bounds.validate()?;
        self.ga
            .validate()
            .map_err(|reason| AlignError::invalid("ga", "config", reason))?;
        self.operators.validate()
    }
}
