//! Generational evolution engine.
//!
//! A generic, domain-agnostic engine built on three operator contracts.
//! Callers supply a prototype [`Genome`], an [`Objective`], a [`Mutator`],
//! and a [`Crosser`]; the [`Engine`] handles sampling, scoring, and
//! replacement.
//!
//! # Core Traits
//!
//! - [`Objective`]: pure scoring function, lower cost is better
//! - [`Mutator`]: produces a perturbed copy of a genome
//! - [`Crosser`]: recombines two genomes into two offspring
//! - [`GenerationObserver`]: receives a report after each generation
//!
//! All three operator traits are implemented for plain closures.
//!
//! # Key Types
//!
//! - [`GaConfig`]: population size, operator rates, termination, seeding
//! - [`Engine`]: runs one generation ([`Engine::step`]) or many ([`Engine::run`])
//! - [`RunResult`]: best genome and cost history of a run
//!
//! # Generation
//!
//! 1. Draw `num_mutate` distinct genomes and mutate each one
//! 2. Independently draw `num_crossover` distinct genomes and cross them in
//!    sequential pairs
//! 3. Score parents and offspring together
//! 4. Stable-sort by cost and keep the first `population_size`
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod engine;
pub mod operators;
mod types;

pub use config::{GaConfig, Rate};
pub use engine::{Engine, RunResult};
pub use operators::{GaussianMutator, SinglePointCrosser};
pub use types::{
    Cost, Crosser, GenerationObserver, GenerationStats, Genome, Mutator, Objective, Population,
};
