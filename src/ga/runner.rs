//! GA evolutionary loop execution.
//!
//! [`GaRunner`] runs the simple generational scheme:
//! initialize → evaluate → (select → crossover → mutate → evaluate → replace)*.
//!
//! Only individuals whose cached fitness was invalidated by variation are
//! re-evaluated. All random draws happen on the calling thread in a fixed
//! order; with a worker pool only fitness evaluation is distributed, so a
//! seeded run gives the same result with or without parallelism.

use super::config::GaConfig;
use super::selection::select_tournament;
use super::types::{Fitness, GaProblem, Individual};
use crate::random::create_rng;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Summary of the population after one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0 for the initial population.
    pub generation: usize,

    /// Fitness evaluations performed in this generation.
    pub evaluations: usize,

    /// Lowest fitness in the population.
    pub best: f64,

    /// Mean fitness of the population.
    pub mean: f64,
}

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// The best individual of the final population.
    pub best: I,

    /// Fitness of `best`.
    pub best_fitness: I::Fitness,

    /// Generation steps executed (excluding initialization).
    pub generations: usize,

    /// Total fitness evaluations, initialization included.
    pub evaluations: usize,

    /// Statistics for the initial population and every generation.
    pub history: Vec<GenerationStats>,
}

/// Reasons a GA run can fail.
#[derive(Debug, Error)]
pub enum GaError<E: std::error::Error + 'static> {
    #[error("invalid GA configuration: {0}")]
    InvalidConfig(String),

    #[error("fitness evaluation failed: {0}")]
    Evaluation(#[source] E),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("Best fitness: {:?}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    /// - [`GaError::InvalidConfig`] if `config` fails validation
    /// - [`GaError::Evaluation`] as soon as any evaluation fails; the run is
    ///   abandoned
    /// - [`GaError::WorkerPool`] if the worker pool cannot be created
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
    ) -> Result<GaResult<P::Individual>, GaError<P::Error>> {
        config.validate().map_err(GaError::InvalidConfig)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = create_rng(seed);
        // Scoped to this run; dropped on every exit path.
        let evaluator = Evaluator::new::<P::Error>(config)?;

        // 1. Initialize and evaluate population
        let mut population: Vec<P::Individual> = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        let mut evaluations = evaluator.evaluate_pending(problem, &mut population)?;

        let initial = population_stats(0, evaluations, &population);
        problem.on_generation(&initial);
        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(initial);

        // 2. Generational loop
        for gen in 1..=config.max_generations {
            let parents = select_tournament(
                &population,
                config.population_size,
                config.tournament_size,
                &mut rng,
            );
            let mut offspring: Vec<P::Individual> =
                parents.iter().map(|&i| population[i].clone()).collect();

            vary(problem, &mut offspring, config, &mut rng);

            let evaluated = evaluator.evaluate_pending(problem, &mut offspring)?;
            evaluations += evaluated;
            population = offspring;

            let stats = population_stats(gen, evaluated, &population);
            debug!(
                generation = gen,
                evaluations = evaluated,
                best = stats.best,
                mean = stats.mean,
                "generation complete"
            );
            problem.on_generation(&stats);
            history.push(stats);
        }

        // 3. Best of the final population
        let best = find_best(&population)
            .ok_or_else(|| GaError::InvalidConfig("population is empty".into()))?
            .clone();
        Ok(GaResult {
            best_fitness: best.fitness_or_worst(),
            best,
            generations: config.max_generations,
            evaluations,
            history,
        })
    }
}

/// Crossover on consecutive pairs, then per-individual mutation.
///
/// Touched individuals lose their cached fitness.
fn vary<P: GaProblem, R: Rng>(
    problem: &P,
    offspring: &mut [P::Individual],
    config: &GaConfig,
    rng: &mut R,
) {
    for i in (1..offspring.len()).step_by(2) {
        if rng.random::<f64>() < config.crossover_rate {
            let (head, tail) = offspring.split_at_mut(i);
            let (first, second) = (&mut head[i - 1], &mut tail[0]);
            problem.crossover(first, second, rng);
            first.invalidate();
            second.invalidate();
        }
    }

    for ind in offspring.iter_mut() {
        if rng.random::<f64>() < config.mutation_rate {
            problem.mutate(ind, rng);
            ind.invalidate();
        }
    }
}

/// Evaluates the individuals without a cached fitness.
struct Evaluator {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Evaluator {
    fn new<E: std::error::Error + 'static>(config: &GaConfig) -> Result<Self, GaError<E>> {
        #[cfg(feature = "parallel")]
        {
            let pool = if config.parallel {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(config.workers.unwrap_or(0))
                    .build()
                    .map_err(|e| GaError::WorkerPool(e.to_string()))?;
                Some(pool)
            } else {
                None
            };
            Ok(Self { pool })
        }

        #[cfg(not(feature = "parallel"))]
        {
            if config.parallel {
                tracing::warn!("parallel evaluation requested without the `parallel` feature; evaluating sequentially");
            }
            Ok(Self {})
        }
    }

    /// Returns the number of evaluations performed.
    fn evaluate_pending<P: GaProblem>(
        &self,
        problem: &P,
        population: &mut [P::Individual],
    ) -> Result<usize, GaError<P::Error>> {
        let pending: Vec<usize> = population
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_evaluated())
            .map(|(i, _)| i)
            .collect();

        let fitnesses = self.compute(problem, population, &pending)?;
        for (&i, f) in pending.iter().zip(fitnesses) {
            population[i].set_fitness(f);
        }
        Ok(pending.len())
    }

    #[allow(clippy::type_complexity)]
    fn compute<P: GaProblem>(
        &self,
        problem: &P,
        population: &[P::Individual],
        pending: &[usize],
    ) -> Result<Vec<<P::Individual as Individual>::Fitness>, GaError<P::Error>> {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            // Indexed collect keeps population order regardless of completion order.
            return pool.install(|| {
                pending
                    .par_iter()
                    .map(|&i| problem.evaluate(&population[i]))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(GaError::Evaluation)
            });
        }

        pending
            .iter()
            .map(|&i| problem.evaluate(&population[i]).map_err(GaError::Evaluation))
            .collect()
    }
}

fn population_stats<I: Individual>(
    generation: usize,
    evaluations: usize,
    population: &[I],
) -> GenerationStats {
    let fitnesses: Vec<f64> = population
        .iter()
        .map(|ind| ind.fitness_or_worst().to_f64())
        .collect();
    let best = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = fitnesses.iter().sum::<f64>() / fitnesses.len().max(1) as f64;
    GenerationStats {
        generation,
        evaluations,
        best,
        mean,
    }
}

/// Find the individual with the best (lowest) fitness; the first one on ties.
fn find_best<I: Individual>(population: &[I]) -> Option<&I> {
    population.iter().min_by(|a, b| {
        a.fitness_or_worst()
            .partial_cmp(&b.fitness_or_worst())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::operators::{blend_crossover, gaussian_mutation};
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ---- Continuous optimization: sphere function ----

    #[derive(Clone, Debug, PartialEq)]
    struct RealVector {
        genes: Vec<f64>,
        fitness: Option<f64>,
    }

    impl Individual for RealVector {
        type Fitness = f64;
        fn fitness(&self) -> Option<f64> {
            self.fitness
        }
        fn set_fitness(&mut self, f: f64) {
            self.fitness = Some(f);
        }
        fn invalidate(&mut self) {
            self.fitness = None;
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("evaluation refused")]
    struct Refused;

    struct SphereProblem {
        dim: usize,
        evaluations: AtomicUsize,
        generations_seen: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl SphereProblem {
        fn new(dim: usize) -> Self {
            Self {
                dim,
                evaluations: AtomicUsize::new(0),
                generations_seen: AtomicUsize::new(0),
                fail_after: None,
            }
        }
    }

    impl GaProblem for SphereProblem {
        type Individual = RealVector;
        type Error = Refused;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> RealVector {
            let genes: Vec<f64> = (0..self.dim)
                .map(|_| rng.random_range(-5.0..5.0))
                .collect();
            RealVector {
                genes,
                fitness: None,
            }
        }

        fn evaluate(&self, ind: &RealVector) -> Result<f64, Refused> {
            let n = self.evaluations.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                return Err(Refused);
            }
            // f(x) = sum(x_i^2), minimum at origin
            Ok(ind.genes.iter().map(|x| x * x).sum())
        }

        fn crossover<R: Rng>(&self, a: &mut RealVector, b: &mut RealVector, rng: &mut R) {
            blend_crossover(&mut a.genes, &mut b.genes, 0.5, rng);
        }

        fn mutate<R: Rng>(&self, ind: &mut RealVector, rng: &mut R) {
            gaussian_mutation(&mut ind.genes, 0.0, 0.3, 0.5, rng);
        }

        fn on_generation(&self, _stats: &GenerationStats) {
            self.generations_seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_generations(60)
            .with_seed(42)
    }

    #[test]
    fn test_sphere_optimization() {
        let problem = SphereProblem::new(3);
        let result = GaRunner::run(&problem, &config()).unwrap();
        assert!(
            result.best_fitness < 1.0,
            "expected fitness < 1.0 for 3D sphere, got {}",
            result.best_fitness
        );
        assert_eq!(result.generations, 60);
    }

    #[test]
    fn test_zero_generations_returns_best_initial() {
        let problem = SphereProblem::new(2);
        let config = config().with_max_generations(0);
        let result = GaRunner::run(&problem, &config).unwrap();

        let mut rng = create_rng(42);
        let expected = (0..config.population_size)
            .map(|_| problem.create_individual(&mut rng))
            .map(|ind| ind.genes.iter().map(|x| x * x).sum::<f64>())
            .fold(f64::INFINITY, f64::min);

        assert_eq!(result.best_fitness, expected);
        assert_eq!(result.generations, 0);
        assert_eq!(result.evaluations, config.population_size);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let a = GaRunner::run(&SphereProblem::new(2), &config()).unwrap();
        let b = GaRunner::run(&SphereProblem::new(2), &config()).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness.to_bits(), b.best_fitness.to_bits());
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_unchanged_individuals_not_reevaluated() {
        let problem = SphereProblem::new(2);
        let config = config()
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0)
            .with_max_generations(5);
        let result = GaRunner::run(&problem, &config).unwrap();

        assert_eq!(result.evaluations, 40);
        assert_eq!(problem.evaluations.load(Ordering::SeqCst), 40);
        assert!(result.history[1..].iter().all(|s| s.evaluations == 0));
    }

    #[test]
    fn test_evaluation_count_matches_problem_calls() {
        let problem = SphereProblem::new(2);
        let result = GaRunner::run(&problem, &config()).unwrap();
        assert_eq!(result.evaluations, problem.evaluations.load(Ordering::SeqCst));
        let per_gen: usize = result.history.iter().map(|s| s.evaluations).sum();
        assert_eq!(per_gen, result.evaluations);
    }

    #[test]
    fn test_callback_per_generation() {
        let problem = SphereProblem::new(2);
        let result = GaRunner::run(&problem, &config().with_max_generations(7)).unwrap();
        assert_eq!(problem.generations_seen.load(Ordering::SeqCst), 8);
        assert_eq!(result.history.len(), 8);
        for (i, s) in result.history.iter().enumerate() {
            assert_eq!(s.generation, i);
            assert!(s.best <= s.mean);
        }
    }

    #[test]
    fn test_population_of_one() {
        let problem = SphereProblem::new(2);
        let config = config().with_population_size(1).with_max_generations(10);
        let result = GaRunner::run(&problem, &config).unwrap();
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_evaluation_error_aborts_run() {
        let mut problem = SphereProblem::new(2);
        problem.fail_after = Some(50);
        let err = GaRunner::run(&problem, &config()).unwrap_err();
        assert!(matches!(err, GaError::Evaluation(Refused)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let problem = SphereProblem::new(2);
        let err = GaRunner::run(&problem, &config().with_population_size(0)).unwrap_err();
        assert!(matches!(err, GaError::InvalidConfig(_)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = GaRunner::run(&SphereProblem::new(3), &config()).unwrap();
        let parallel =
            GaRunner::run(&SphereProblem::new(3), &config().with_parallel(true).with_workers(4))
                .unwrap();
        assert_eq!(sequential.best, parallel.best);
        assert_eq!(sequential.history, parallel.history);
    }
}
