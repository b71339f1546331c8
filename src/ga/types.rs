//! Core data model and operator contracts for the evolution engine.
//!
//! A [`Genome`] is one candidate assignment, position-aligned with a
//! canonical unit ordering shared by the whole run. A [`Population`] is the
//! fixed-size set of genomes evolved together. The three operator traits,
//! [`Objective`], [`Mutator`], and [`Crosser`], are the seams where
//! domain-specific logic plugs into the generic engine.

use crate::error::{ConfigError, NoNeighborsError};
use rand::{Rng, RngCore};
use std::ops::Index;

/// Cost assigned to a genome by an [`Objective`]. Lower is better.
pub type Cost = i64;

/// An ordered sequence of genes, one per unit.
///
/// Genomes have value semantics: cloning yields an independent copy, and
/// operators always return new genomes instead of editing their inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome<G> {
    genes: Vec<G>,
}

impl<G> Genome<G> {
    /// Wraps a gene vector.
    pub fn new(genes: Vec<G>) -> Self {
        Self { genes }
    }

    /// The genes in canonical order.
    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    /// Mutable access for operators building a new genome from a copy.
    pub fn genes_mut(&mut self) -> &mut [G] {
        &mut self.genes
    }

    /// Consumes the genome and returns its genes.
    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the genome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Iterates over the genes in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, G> {
        self.genes.iter()
    }
}

impl<G> From<Vec<G>> for Genome<G> {
    fn from(genes: Vec<G>) -> Self {
        Self::new(genes)
    }
}

impl<G> Index<usize> for Genome<G> {
    type Output = G;

    fn index(&self, position: usize) -> &G {
        &self.genes[position]
    }
}

impl<G> FromIterator<G> for Genome<G> {
    fn from_iter<I: IntoIterator<Item = G>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The working set of genomes, with a size fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population<G> {
    members: Vec<Genome<G>>,
}

impl<G: Clone> Population<G> {
    /// Creates a population of `size` independent copies of `prototype`.
    pub fn from_prototype(prototype: &Genome<G>, size: usize) -> Self {
        Self {
            members: vec![prototype.clone(); size],
        }
    }
}

impl<G> Population<G> {
    pub(crate) fn from_members(members: Vec<Genome<G>>) -> Self {
        Self { members }
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The genomes, best first once the population has been scored.
    pub fn members(&self) -> &[Genome<G>] {
        &self.members
    }

    /// Iterates over the genomes.
    pub fn iter(&self) -> std::slice::Iter<'_, Genome<G>> {
        self.members.iter()
    }

    /// Returns the genome at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Genome<G>> {
        self.members.get(index)
    }
}

impl<G> Index<usize> for Population<G> {
    type Output = Genome<G>;

    fn index(&self, index: usize) -> &Genome<G> {
        &self.members[index]
    }
}

/// Scores a genome. Lower cost is fitter.
///
/// Implementations must be free of shared mutable state: the engine may call
/// `score` concurrently on different genomes. Any error aborts the current
/// generation step.
///
/// Closures of the form `Fn(&Genome<G>) -> anyhow::Result<Cost>` implement
/// this trait directly:
///
/// ```
/// use gendist::ga::{Cost, Genome, Objective};
///
/// let sum = |g: &Genome<i64>| -> anyhow::Result<Cost> { Ok(g.iter().sum()) };
/// assert_eq!(sum.score(&Genome::new(vec![1, 2, 3])).unwrap(), 6);
/// ```
pub trait Objective<G>: Send + Sync {
    /// Computes the cost of `genome`.
    fn score(&self, genome: &Genome<G>) -> anyhow::Result<Cost>;
}

impl<G, F> Objective<G> for F
where
    F: Fn(&Genome<G>) -> anyhow::Result<Cost> + Send + Sync,
{
    fn score(&self, genome: &Genome<G>) -> anyhow::Result<Cost> {
        self(genome)
    }
}

/// Produces a perturbed copy of a genome.
///
/// The input is never modified. A mutator may refuse a randomly chosen target
/// with [`NoNeighborsError`]; the engine then retries with a fresh draw.
pub trait Mutator<G>: Send + Sync {
    /// Returns a mutated copy of `genome`.
    fn mutate<R: Rng>(&self, genome: &Genome<G>, rng: &mut R)
        -> Result<Genome<G>, NoNeighborsError>;

    /// Checks that `prototype` has the shape this mutator works on.
    ///
    /// Called once by the engine before the population is created. Accepts
    /// any genome by default.
    fn check_prototype(&self, _prototype: &Genome<G>) -> Result<(), ConfigError> {
        Ok(())
    }
}

impl<G, F> Mutator<G> for F
where
    F: Fn(&Genome<G>, &mut dyn RngCore) -> Result<Genome<G>, NoNeighborsError> + Send + Sync,
{
    fn mutate<R: Rng>(
        &self,
        genome: &Genome<G>,
        rng: &mut R,
    ) -> Result<Genome<G>, NoNeighborsError> {
        self(genome, rng)
    }
}

/// Recombines two parents into two offspring of the same length.
///
/// Parents are never modified.
pub trait Crosser<G>: Send + Sync {
    /// Returns the two offspring of `a` and `b`.
    fn cross<R: Rng>(&self, a: &Genome<G>, b: &Genome<G>, rng: &mut R) -> (Genome<G>, Genome<G>);
}

impl<G, F> Crosser<G> for F
where
    F: Fn(&Genome<G>, &Genome<G>, &mut dyn RngCore) -> (Genome<G>, Genome<G>) + Send + Sync,
{
    fn cross<R: Rng>(&self, a: &Genome<G>, b: &Genome<G>, rng: &mut R) -> (Genome<G>, Genome<G>) {
        self(a, b, rng)
    }
}

/// Receives a report after every completed generation.
///
/// Implemented for `()` as a no-op and for any
/// `FnMut(&GenerationStats, &Population<G>)`.
pub trait GenerationObserver<G> {
    /// Called once the population has been replaced.
    fn on_generation(&mut self, stats: &GenerationStats, population: &Population<G>);
}

impl<G> GenerationObserver<G> for () {
    fn on_generation(&mut self, _stats: &GenerationStats, _population: &Population<G>) {}
}

impl<G, F> GenerationObserver<G> for F
where
    F: FnMut(&GenerationStats, &Population<G>),
{
    fn on_generation(&mut self, stats: &GenerationStats, population: &Population<G>) {
        self(stats, population)
    }
}

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 1-based index of the generation just completed.
    pub generation: usize,
    /// Lowest cost in the new population.
    pub best_cost: Cost,
    /// Highest cost in the new population.
    pub worst_cost: Cost,
    /// Mean cost of the new population.
    pub mean_cost: f64,
    /// Whether `best_cost` is strictly lower than before this generation.
    pub improved: bool,
}
