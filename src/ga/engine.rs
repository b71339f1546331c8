//! Generational evolution loop.
//!
//! [`Engine`] advances a fixed-size population one generation at a time:
//! select → mutate → select → cross → score → replace. Replacement is
//! truncation elitism over the union of parents and offspring, so the best
//! cost never increases from one generation to the next.

use super::config::GaConfig;
use super::types::{
    Cost, Crosser, GenerationObserver, GenerationStats, Genome, Mutator, Objective, Population,
};
use crate::error::{ConfigError, GenerationError};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Result of a multi-generation run.
#[derive(Debug, Clone)]
pub struct RunResult<G> {
    /// The best genome found.
    pub best: Genome<G>,

    /// Cost of `best`.
    pub best_cost: Cost,

    /// Number of generations executed by this run.
    pub generations: usize,

    /// Whether the run stopped because the stagnation limit was reached.
    pub stagnated: bool,

    /// Whether the run stopped because the stop flag was raised.
    pub cancelled: bool,

    /// Whether the run stopped because the time limit elapsed.
    pub timed_out: bool,

    /// Best cost before the first generation, then after each generation.
    pub cost_history: Vec<Cost>,
}

/// Independent random streams, one per stochastic stage.
#[derive(Debug, Clone)]
struct RngStreams {
    selection: StdRng,
    mutation: StdRng,
    crossover: StdRng,
}

impl RngStreams {
    fn from_seed(seed: u64) -> Self {
        let mut master = StdRng::seed_from_u64(seed);
        Self {
            selection: StdRng::from_rng(&mut master),
            mutation: StdRng::from_rng(&mut master),
            crossover: StdRng::from_rng(&mut master),
        }
    }
}

/// Evolves a population of genomes against an objective.
///
/// # Usage
///
/// ```
/// use gendist::ga::{Cost, Engine, GaConfig, Genome, SinglePointCrosser};
/// use gendist::error::NoNeighborsError;
/// use rand::{Rng, RngCore};
///
/// // Drive every gene to zero.
/// let objective = |g: &Genome<i64>| -> anyhow::Result<Cost> {
///     Ok(g.iter().map(|x| x.abs()).sum())
/// };
/// let mutator = |g: &Genome<i64>, rng: &mut dyn RngCore| {
///     let mut child = g.clone();
///     let i = rng.random_range(0..child.len());
///     let step = child[i].signum();
///     child.genes_mut()[i] -= step;
///     Ok::<_, NoNeighborsError>(child)
/// };
///
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_mutation_rate(0.5)
///     .with_max_generations(200)
///     .with_seed(7);
/// let prototype = Genome::new(vec![3, -2, 4]);
/// let mut engine = Engine::new(prototype, config, objective, mutator, SinglePointCrosser)?;
/// let result = engine.run(())?;
/// assert_eq!(result.best_cost, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Engine<G, O, M, C> {
    config: GaConfig,
    objective: O,
    mutator: M,
    crosser: C,
    population: Population<G>,
    costs: Option<Vec<Cost>>,
    best: Option<(Genome<G>, Cost)>,
    generation: usize,
    genome_len: usize,
    num_mutate: usize,
    num_crossover: usize,
    streams: RngStreams,
}

impl<G, O, M, C> Engine<G, O, M, C>
where
    G: Clone + Send + Sync,
    O: Objective<G>,
    M: Mutator<G>,
    C: Crosser<G>,
{
    /// Creates an engine whose initial population is `population_size`
    /// copies of `prototype`.
    pub fn new(
        prototype: Genome<G>,
        config: GaConfig,
        objective: O,
        mutator: M,
        crosser: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if prototype.is_empty() {
            return Err(ConfigError::EmptyPrototype);
        }
        mutator.check_prototype(&prototype)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let population = Population::from_prototype(&prototype, config.population_size);

        Ok(Self {
            num_mutate: config.num_mutate(),
            num_crossover: config.num_crossover(),
            genome_len: prototype.len(),
            streams: RngStreams::from_seed(seed),
            config,
            objective,
            mutator,
            crosser,
            population,
            costs: None,
            best: None,
            generation: 0,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The current population, best first once scored.
    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    /// Consumes the engine and returns the current population.
    pub fn into_population(self) -> Population<G> {
        self.population
    }

    /// Costs aligned with [`population`](Self::population), if scored.
    pub fn costs(&self) -> Option<&[Cost]> {
        self.costs.as_deref()
    }

    /// The best genome found so far, if anything has been scored.
    pub fn best(&self) -> Option<&Genome<G>> {
        self.best.as_ref().map(|(genome, _)| genome)
    }

    /// The best cost found so far, if anything has been scored.
    pub fn best_cost(&self) -> Option<Cost> {
        self.best.as_ref().map(|&(_, cost)| cost)
    }

    /// Number of generations completed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of genomes mutated per generation.
    pub fn num_mutate(&self) -> usize {
        self.num_mutate
    }

    /// Number of genomes drawn for crossover per generation.
    pub fn num_crossover(&self) -> usize {
        self.num_crossover
    }

    /// Scores the current population if it has not been scored yet and
    /// returns the best cost.
    ///
    /// The population is reordered best-first with a stable sort.
    pub fn evaluate(&mut self) -> Result<Cost, GenerationError<G>> {
        if let (Some(_), Some(best)) = (&self.costs, self.best_cost()) {
            return Ok(best);
        }

        let members = self.population.members().to_vec();
        let costs = score_all(&self.objective, &members, self.config.parallel)?;
        let (members, costs) = truncate_best(members, &costs, self.config.population_size);
        self.install(members, costs);

        Ok(self.best_cost().unwrap_or(Cost::MAX))
    }

    /// Advances the population by exactly one generation.
    ///
    /// On error the population, costs, and generation counter are unchanged.
    #[instrument(level = "debug", skip(self), fields(generation = self.generation + 1))]
    pub fn step(&mut self) -> Result<GenerationStats, GenerationError<G>> {
        let previous_best = self.best_cost();
        let n = self.population.len();

        // Select for mutation and mutate. Parents stay in the pool.
        let picked = index::sample(&mut self.streams.selection, n, self.num_mutate);
        let mut mutants = Vec::with_capacity(self.num_mutate);
        for i in picked.iter() {
            let child = mutate_with_retry(
                &self.mutator,
                &self.population[i],
                &mut self.streams.mutation,
                self.config.max_mutation_retries,
            )?;
            debug_assert_eq!(child.len(), self.genome_len, "mutator changed genome length");
            mutants.push(child);
        }

        // Independent draw for crossover, paired sequentially.
        let picked = index::sample(&mut self.streams.selection, n, self.num_crossover).into_vec();
        let mut offspring = Vec::with_capacity(self.num_crossover);
        for pair in picked.chunks_exact(2) {
            let (a, b) = self.crosser.cross(
                &self.population[pair[0]],
                &self.population[pair[1]],
                &mut self.streams.crossover,
            );
            debug_assert_eq!(a.len(), self.genome_len, "crosser changed genome length");
            debug_assert_eq!(b.len(), self.genome_len, "crosser changed genome length");
            offspring.push(a);
            offspring.push(b);
        }

        // Score the union; nothing is replaced unless every score succeeds.
        let mut union = Vec::with_capacity(n + mutants.len() + offspring.len());
        union.extend(self.population.iter().cloned());
        union.extend(mutants);
        union.extend(offspring);
        let costs = score_all(&self.objective, &union, self.config.parallel)?;

        let (members, costs) = truncate_best(union, &costs, self.config.population_size);
        self.install(members, costs);
        self.generation += 1;

        let stats = self.stats(previous_best);
        tracing::debug!(
            best_cost = stats.best_cost,
            worst_cost = stats.worst_cost,
            mean_cost = stats.mean_cost,
            improved = stats.improved,
            "Generation complete"
        );
        Ok(stats)
    }

    /// Runs until `max_generations`, stagnation, or the time limit.
    pub fn run<Obs>(&mut self, observer: Obs) -> Result<RunResult<G>, GenerationError<G>>
    where
        Obs: GenerationObserver<G>,
    {
        self.run_with_cancel(observer, None)
    }

    /// Runs with an optional cooperative stop flag.
    ///
    /// The flag is checked between generations: once it is set, the current
    /// generation finishes and the run returns with `cancelled` set.
    #[instrument(level = "info", skip(self, observer, cancel), fields(population_size = self.config.population_size, num_mutate = self.num_mutate, num_crossover = self.num_crossover))]
    pub fn run_with_cancel<Obs>(
        &mut self,
        mut observer: Obs,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunResult<G>, GenerationError<G>>
    where
        Obs: GenerationObserver<G>,
    {
        let started = Instant::now();
        let initial = self.evaluate()?;
        tracing::info!(initial_cost = initial, "Starting evolution run");

        let mut cost_history = Vec::with_capacity(self.config.max_generations + 1);
        cost_history.push(initial);

        let mut generations = 0usize;
        let mut stagnation_counter = 0usize;
        let mut stagnated = false;
        let mut cancelled = false;
        let mut timed_out = false;

        while generations < self.config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if let Some(limit) = self.config.time_limit_ms {
                if started.elapsed().as_millis() >= u128::from(limit) {
                    timed_out = true;
                    break;
                }
            }

            let stats = self.step()?;
            generations += 1;
            cost_history.push(stats.best_cost);
            observer.on_generation(&stats, &self.population);

            if stats.improved {
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            if self.config.stagnation_limit > 0 && stagnation_counter >= self.config.stagnation_limit
            {
                stagnated = true;
                break;
            }
        }

        let (best, best_cost) = match &self.best {
            Some((genome, cost)) => (genome.clone(), *cost),
            None => (self.population[0].clone(), initial),
        };
        tracing::info!(
            best_cost,
            generations,
            stagnated,
            cancelled,
            timed_out,
            "Evolution run finished"
        );

        Ok(RunResult {
            best,
            best_cost,
            generations,
            stagnated,
            cancelled,
            timed_out,
            cost_history,
        })
    }

    /// Replaces the population with scored, best-first members.
    fn install(&mut self, members: Vec<Genome<G>>, costs: Vec<Cost>) {
        if let (Some(genome), Some(&cost)) = (members.first(), costs.first()) {
            if self.best_cost().map_or(true, |best| cost < best) {
                self.best = Some((genome.clone(), cost));
            }
        }
        self.population = Population::from_members(members);
        self.costs = Some(costs);
    }

    fn stats(&self, previous_best: Option<Cost>) -> GenerationStats {
        let costs = self.costs.as_deref().unwrap_or_default();
        let best_cost = costs.first().copied().unwrap_or(Cost::MAX);
        let worst_cost = costs.last().copied().unwrap_or(Cost::MAX);
        let mean_cost = if costs.is_empty() {
            f64::NAN
        } else {
            costs.iter().map(|&c| c as f64).sum::<f64>() / costs.len() as f64
        };
        GenerationStats {
            generation: self.generation,
            best_cost,
            worst_cost,
            mean_cost,
            improved: previous_best.map_or(true, |prev| best_cost < prev),
        }
    }
}

/// Applies `mutator`, resampling on [`NoNeighborsError`](crate::error::NoNeighborsError)
/// up to `max_attempts` times.
fn mutate_with_retry<G, M, R>(
    mutator: &M,
    genome: &Genome<G>,
    rng: &mut R,
    max_attempts: usize,
) -> Result<Genome<G>, GenerationError<G>>
where
    M: Mutator<G>,
    R: Rng,
{
    let mut attempt = 1;
    loop {
        match mutator.mutate(genome, rng) {
            Ok(child) => return Ok(child),
            Err(last) if attempt >= max_attempts => {
                tracing::warn!(attempts = attempt, unit = %last.unit, "Mutation retries exhausted");
                return Err(GenerationError::MutationExhausted {
                    attempts: attempt,
                    last,
                });
            }
            Err(err) => {
                tracing::trace!(attempt, position = err.position, unit = %err.unit, "Mutation target has no neighbors, resampling");
                attempt += 1;
            }
        }
    }
}

/// Scores every genome, failing on the first objective error.
#[cfg(feature = "parallel")]
fn score_all<G, O>(
    objective: &O,
    genomes: &[Genome<G>],
    parallel: bool,
) -> Result<Vec<Cost>, GenerationError<G>>
where
    G: Clone + Send + Sync,
    O: Objective<G>,
{
    if parallel {
        genomes
            .par_iter()
            .map(|genome| score_one(objective, genome))
            .collect()
    } else {
        genomes
            .iter()
            .map(|genome| score_one(objective, genome))
            .collect()
    }
}

/// Scores every genome, failing on the first objective error.
#[cfg(not(feature = "parallel"))]
fn score_all<G, O>(
    objective: &O,
    genomes: &[Genome<G>],
    _parallel: bool,
) -> Result<Vec<Cost>, GenerationError<G>>
where
    G: Clone + Send + Sync,
    O: Objective<G>,
{
    genomes
        .iter()
        .map(|genome| score_one(objective, genome))
        .collect()
}

fn score_one<G: Clone, O: Objective<G>>(
    objective: &O,
    genome: &Genome<G>,
) -> Result<Cost, GenerationError<G>> {
    objective
        .score(genome)
        .map_err(|source| GenerationError::ObjectiveEvaluation {
            genome: genome.clone(),
            source,
        })
}

/// Stable sort by cost, keeping the first `keep` genomes.
///
/// Equal costs keep their insertion order, so current members win ties
/// against offspring.
fn truncate_best<G>(
    genomes: Vec<Genome<G>>,
    costs: &[Cost],
    keep: usize,
) -> (Vec<Genome<G>>, Vec<Cost>) {
    let mut order: Vec<usize> = (0..genomes.len()).collect();
    order.sort_by_key(|&i| costs[i]);
    order.truncate(keep);

    let mut slots: Vec<Option<Genome<G>>> = genomes.into_iter().map(Some).collect();
    let members = order.iter().filter_map(|&i| slots[i].take()).collect();
    let kept_costs = order.iter().map(|&i| costs[i]).collect();
    (members, kept_costs)
}

// ============================================================================
// Tests
// ============================================================================
