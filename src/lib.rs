//! Evolutionary search over graph-constrained group assignments.
//!
//! The crate evolves candidate assignments of base units to higher-level
//! groups. It was built for legislative redistricting, where voting
//! districts are assigned to legislative districts, but the evolution core
//! knows nothing about maps:
//!
//! - **[`ga`]**: the generational engine. A fixed-size population is
//!   perturbed by a [`Mutator`](ga::Mutator) and a [`Crosser`](ga::Crosser),
//!   scored by an [`Objective`](ga::Objective), and truncated back to size
//!   keeping the lowest costs.
//! - **[`district`]**: the redistricting domain. An [`AdjacencyGraph`]
//!   of voting districts, a mutator that lets a unit join a neighboring
//!   group, and a handful of map objectives.
//! - **[`error`]**: the error taxonomy shared by both.
//!
//! # Architecture
//!
//! Loading district and neighbor files, exporting results, and command-line
//! handling belong to the caller. The core receives a validated graph and a
//! prototype genome, and reports each generation through
//! [`GenerationObserver`](ga::GenerationObserver).
//!
//! [`AdjacencyGraph`]: district::AdjacencyGraph

pub mod district;
pub mod error;
pub mod ga;
