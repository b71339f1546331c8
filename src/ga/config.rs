//! Engine configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::error::ConfigError;

/// Absorbs floating-point noise before taking a ceiling, so that
/// `10 * 0.7` yields 7 offspring and not 8.
const CEIL_EPSILON: f64 = 1e-9;

/// A probability in `[0, 1]`.
///
/// Out-of-range values are clamped rather than rejected; `NaN` becomes 0.
///
/// ```
/// use gendist::ga::Rate;
///
/// assert_eq!(Rate::new(1.7).value(), 1.0);
/// assert_eq!(Rate::new(-0.2).value(), 0.0);
/// assert_eq!(Rate::new(0.25).value(), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f64", into = "f64"))]
pub struct Rate(f64);

impl Rate {
    /// Creates a rate, clamping into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Rate(0.0)
        } else {
            Rate(value.clamp(0.0, 1.0))
        }
    }

    /// The clamped value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// `ceil(count * rate)`, never more than `count`.
    pub fn ceil_of(self, count: usize) -> usize {
        let scaled = count as f64 * self.0;
        let n = (scaled - scaled.abs() * CEIL_EPSILON).ceil() as usize;
        n.min(count)
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Rate::new(value)
    }
}

impl From<Rate> for f64 {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

/// Configuration for the evolution engine.
///
/// # Defaults
///
/// ```
/// use gendist::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.num_mutate(), 10);
/// assert_eq!(config.num_crossover(), 50);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use gendist::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_mutation_rate(0.1)
///     .with_crossover_rate(0.5)
///     .with_seed(42);
/// assert_eq!(config.num_mutate(), 1);
/// assert_eq!(config.num_crossover(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of genomes kept after every generation.
    pub population_size: usize,

    /// Fraction of the population drawn for mutation each generation.
    pub mutation_rate: Rate,

    /// Fraction of the population drawn for crossover each generation.
    pub crossover_rate: Rate,

    /// How many times a single mutation is attempted before the generation
    /// fails with [`GenerationError::MutationExhausted`].
    ///
    /// [`GenerationError::MutationExhausted`]: crate::error::GenerationError::MutationExhausted
    pub max_mutation_retries: usize,

    /// Maximum number of generations for [`Engine::run`](super::Engine::run).
    pub max_generations: usize,

    /// Number of generations without improvement before a run stops.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Optional wall-clock limit for a run, in milliseconds.
    ///
    /// Checked between generations, so a run may overshoot by one
    /// generation's worth of work.
    pub time_limit_ms: Option<u64>,

    /// Whether to score genomes on the rayon thread pool.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are
    /// identical either way.
    pub parallel: bool,

    /// Master seed. `None` draws a random seed, making the run irreproducible.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: Rate::new(0.1),
            crossover_rate: Rate::new(0.5),
            max_mutation_retries: 16,
            max_generations: 500,
            stagnation_limit: 0,
            time_limit_ms: None,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the mutation rate, clamped into `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = Rate::new(rate);
        self
    }

    /// Sets the crossover rate, clamped into `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = Rate::new(rate);
        self
    }

    /// Sets the mutation retry bound.
    pub fn with_max_mutation_retries(mut self, n: usize) -> Self {
        self.max_mutation_retries = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables or disables parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of genomes mutated per generation.
    ///
    /// `ceil(population_size * mutation_rate)`, at most `population_size`.
    pub fn num_mutate(&self) -> usize {
        self.mutation_rate.ceil_of(self.population_size)
    }

    /// Number of genomes drawn for crossover per generation.
    ///
    /// `ceil(population_size * crossover_rate)`, at most `population_size`,
    /// rounded down to an even number.
    pub fn num_crossover(&self) -> usize {
        let n = self.crossover_rate.ceil_of(self.population_size);
        n - n % 2
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::NonPositivePopulation);
        }
        if self.max_mutation_retries == 0 {
            return Err(ConfigError::ZeroMutationRetries);
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }
}
