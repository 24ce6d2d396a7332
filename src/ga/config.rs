//! GA configuration.
//!
//! [`GaConfig`] holds every parameter of the evolutionary loop. It is an
//! ordinary value owned by the caller, so two runs never share settings.

/// Configuration for the genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_geoalign::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.seed, Some(1118));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_geoalign::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(80)
///     .with_max_generations(40)
///     .with_crossover_rate(0.6)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of individuals, constant across generations.
    pub population_size: usize,

    /// Number of generation steps after the initial population.
    ///
    /// 0 returns the best of the initial population.
    pub max_generations: usize,

    /// Aspirants drawn (with replacement) per tournament.
    pub tournament_size: usize,

    /// Probability of recombining each consecutive pair of parents (0.0–1.0).
    pub crossover_rate: f64,

    /// Probability of mutating each offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Whether to evaluate individuals on a worker pool.
    ///
    /// Takes effect only with the `parallel` cargo feature.
    pub parallel: bool,

    /// Worker threads for parallel evaluation. `None` lets rayon decide.
    pub workers: Option<usize>,

    /// Random seed. `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            tournament_size: 3,
            crossover_rate: 0.7,
            mutation_rate: 0.2,
            parallel: false,
            workers: None,
            seed: Some(1118),
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover rate, clamped to `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate, clamped to `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draws a fresh seed for every run.
    pub fn with_random_seed(mut self) -> Self {
        self.seed = None;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        if self.workers == Some(0) {
            return Err("workers must be positive or None".into());
        }
        Ok(())
    }
}
