//! Genetic search for the planar offset that minimises the loss.
//!
//! [`OffsetProblem`] plugs a [`LossEvaluator`] into the generic GA engine:
//! an individual is a candidate [`Offset`], its fitness is the loss of the
//! point set shifted by that offset. Offspring are kept inside the search
//! [`Bounds`].

use crate::config::{AlignConfig, OperatorConfig};
use crate::error::{AlignError, Result};
use crate::ga::operators::{blend_crossover, gaussian_mutation};
use crate::ga::{GaError, GaProblem, GaRunner, GenerationStats, Individual};
use crate::loss::LossEvaluator;
use crate::points::{Bounds, Offset, PointSample};
use crate::raster::RasterSurface;
use rand::Rng;
use tracing::{debug, info, warn};

/// Fitness assigned to an offset whose loss evaluates to NaN.
pub const NAN_LOSS: f64 = 1000.0;

/// A candidate offset with its cached loss.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetIndividual {
    pub offset: Offset,
    fitness: Option<f64>,
}

impl OffsetIndividual {
    pub fn new(offset: Offset) -> Self {
        Self {
            offset,
            fitness: None,
        }
    }

    fn genes(&self) -> [f64; 2] {
        [self.offset.dx, self.offset.dy]
    }

    fn set_genes(&mut self, genes: [f64; 2], bounds: &Bounds) {
        self.offset = bounds.clamp(Offset::new(genes[0], genes[1]));
    }
}

impl Individual for OffsetIndividual {
    type Fitness = f64;

    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    fn invalidate(&mut self) {
        self.fitness = None;
    }
}

/// The offset search as a GA problem.
#[derive(Debug, Clone)]
pub struct OffsetProblem<'a> {
    evaluator: LossEvaluator<'a>,
    bounds: Bounds,
    operators: OperatorConfig,
}

impl<'a> OffsetProblem<'a> {
    pub fn new(evaluator: LossEvaluator<'a>, bounds: Bounds, operators: OperatorConfig) -> Self {
        Self {
            evaluator,
            bounds,
            operators,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn evaluator(&self) -> &LossEvaluator<'a> {
        &self.evaluator
    }
}

impl GaProblem for OffsetProblem<'_> {
    type Individual = OffsetIndividual;
    type Error = AlignError;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> OffsetIndividual {
        let [x_lo, y_lo] = self.bounds.lower;
        let [x_hi, y_hi] = self.bounds.upper;
        let dx = x_lo + (x_hi - x_lo) * rng.random::<f64>();
        let dy = y_lo + (y_hi - y_lo) * rng.random::<f64>();
        OffsetIndividual::new(Offset::new(dx, dy))
    }

    fn evaluate(&self, individual: &OffsetIndividual) -> Result<f64> {
        let offset = individual.offset;
        let loss = self.evaluator.loss(offset)?;
        if loss.is_nan() {
            warn!(
                dx = offset.dx,
                dy = offset.dy,
                penalty = NAN_LOSS,
                "loss is NaN, scoring offset with penalty"
            );
            return Ok(NAN_LOSS);
        }
        Ok(loss)
    }

    fn crossover<R: Rng>(
        &self,
        first: &mut OffsetIndividual,
        second: &mut OffsetIndividual,
        rng: &mut R,
    ) {
        let (mut a, mut b) = (first.genes(), second.genes());
        blend_crossover(&mut a, &mut b, self.operators.blend_alpha, rng);
        first.set_genes(a, &self.bounds);
        second.set_genes(b, &self.bounds);
    }

    fn mutate<R: Rng>(&self, individual: &mut OffsetIndividual, rng: &mut R) {
        let mut genes = individual.genes();
        gaussian_mutation(
            &mut genes,
            self.operators.mutation_mu,
            self.operators.mutation_sigma,
            self.operators.gene_mutation_rate,
            rng,
        );
        individual.set_genes(genes, &self.bounds);
    }

    fn on_generation(&self, stats: &GenerationStats) {
        if stats.generation == 0 {
            debug!(
                evaluations = stats.evaluations,
                best = stats.best,
                mean = stats.mean,
                "initial population evaluated"
            );
        }
    }
}

/// Outcome of an offset search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    pub offset: Offset,
    pub loss: f64,
    /// Generation steps executed after initialization.
    pub generations: usize,
    /// Loss evaluations, initialization included.
    pub evaluations: usize,
    /// Population statistics, index 0 being the initial population.
    pub history: Vec<GenerationStats>,
}

impl From<GaError<AlignError>> for AlignError {
    fn from(err: GaError<AlignError>) -> Self {
        match err {
            GaError::InvalidConfig(reason) => AlignError::invalid("ga", "config", reason),
            GaError::Evaluation(inner) => inner,
            GaError::WorkerPool(reason) => AlignError::WorkerPool(reason),
        }
    }
}

/// Searches `config.bounds` for the offset that minimises the loss of
/// `points` against `surface`.
///
/// # Errors
/// - [`AlignError::EmptyInput`] for an empty point set; nothing is evaluated
/// - [`AlignError::InvalidArgument`] for an invalid configuration
/// - [`AlignError::MissingField`] if no point carries the measurement
/// - [`AlignError::WorkerPool`] if the parallel pool cannot be built
pub fn optimize(
    points: &[PointSample],
    surface: &RasterSurface,
    config: &AlignConfig,
) -> Result<OptimizationResult> {
    if points.is_empty() {
        return Err(AlignError::EmptyInput);
    }
    config.validate()?;

    let evaluator = LossEvaluator::new(points, surface, config.loss.clone())?;
    if config.loss.measurement.is_none() {
        warn!("no measurement attribute configured, every offset scores 0");
    }
    let problem = OffsetProblem::new(evaluator, config.bounds, config.operators.clone());

    let result = GaRunner::run(&problem, &config.ga)?;
    let offset = result.best.offset;
    info!(
        dx = offset.dx,
        dy = offset.dy,
        loss = result.best_fitness,
        generations = result.generations,
        evaluations = result.evaluations,
        "offset search finished"
    );

    Ok(OptimizationResult {
        offset,
        loss: result.best_fitness,
        generations: result.generations,
        evaluations: result.evaluations,
        history: result.history,
    })
}
