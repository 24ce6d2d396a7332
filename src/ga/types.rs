//! Core trait definitions for the GA engine.
//!
//! [`Individual`] and [`GaProblem`] are the contract between the generic
//! evolutionary loop and a concrete search problem. All state lives in the
//! problem instance and the [`GaConfig`](super::GaConfig); nothing is
//! registered globally.

use rand::Rng;

/// Marker trait for fitness values.
///
/// Lower fitness is better (minimization).
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// A value no evaluated fitness can beat.
    fn worst() -> Self;

    /// Conversion for statistics and logging.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn worst() -> Self {
        f32::INFINITY
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// A candidate solution carrying a cached fitness.
///
/// The cache is empty until the runner evaluates the individual, and is
/// cleared by the runner whenever crossover or mutation touches it.
///
/// ```ignore
/// #[derive(Clone)]
/// struct Genome {
///     genes: Vec<f64>,
///     fitness: Option<f64>,
/// }
///
/// impl Individual for Genome {
///     type Fitness = f64;
///     fn fitness(&self) -> Option<f64> { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = Some(f); }
///     fn invalidate(&mut self) { self.fitness = None; }
/// }
/// ```
pub trait Individual: Clone + Send + Sync {
    type Fitness: Fitness;

    /// The cached fitness, `None` when not (or no longer) evaluated.
    fn fitness(&self) -> Option<Self::Fitness>;

    fn set_fitness(&mut self, fitness: Self::Fitness);

    /// Clears the cached fitness.
    fn invalidate(&mut self);

    fn is_evaluated(&self) -> bool {
        self.fitness().is_some()
    }

    /// Cached fitness, or [`Fitness::worst`] when unevaluated.
    fn fitness_or_worst(&self) -> Self::Fitness {
        self.fitness().unwrap_or_else(Self::Fitness::worst)
    }
}

/// Defines a GA optimization problem.
///
/// `GaProblem` must be `Send + Sync`: with parallel evaluation enabled the
/// runner calls [`evaluate`](GaProblem::evaluate) from worker threads.
pub trait GaProblem: Send + Sync {
    type Individual: Individual;

    /// Error an evaluation may raise. Any error aborts the run.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a random, unevaluated individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Computes the fitness of an individual. Must be a pure function of the
    /// individual and the problem data.
    fn evaluate(
        &self,
        individual: &Self::Individual,
    ) -> Result<<Self::Individual as Individual>::Fitness, Self::Error>;

    /// Recombines two parents in place, turning them into two children.
    ///
    /// The default implementation leaves both unchanged.
    fn crossover<R: Rng>(
        &self,
        _first: &mut Self::Individual,
        _second: &mut Self::Individual,
        _rng: &mut R,
    ) {
    }

    /// Mutates an individual in place.
    ///
    /// The default implementation is a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rng: &mut R) {}

    /// Called after each generation has been evaluated.
    fn on_generation(&self, _stats: &super::GenerationStats) {}
}
