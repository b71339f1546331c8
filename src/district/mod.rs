//! Redistricting domain.
//!
//! Voting districts ([`Unit`]) are the genes' positions; legislative
//! districts ([`GroupId`]) are the gene values. A genome is a full plan
//! assigning every voting district to a legislative district.
//!
//! - [`AdjacencyGraph`] / [`GraphBuilder`]: validated neighbor relation
//! - [`DistrictMutator`]: a unit joins a neighboring district
//! - [`objective`]: population balance, compactness, partisan fairness
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gendist::district::{AdjacencyGraph, CutEdges, DistrictMutator, GroupId, Unit, UnitId, Votes};
//! use gendist::ga::{Engine, GaConfig, SinglePointCrosser};
//!
//! let mut builder = AdjacencyGraph::builder();
//! for (id, group) in [(1, 1), (2, 2), (3, 1), (4, 2)] {
//!     builder = builder.add_unit(Unit::new(UnitId(id), GroupId(group), Votes::default()));
//! }
//! let graph = Arc::new(
//!     builder
//!         .add_adjacency(UnitId(1), UnitId(2))
//!         .add_adjacency(UnitId(2), UnitId(3))
//!         .add_adjacency(UnitId(3), UnitId(4))
//!         .build()?,
//! );
//!
//! let config = GaConfig::default()
//!     .with_population_size(8)
//!     .with_mutation_rate(0.5)
//!     .with_max_generations(50)
//!     .with_seed(1);
//! let mut engine = Engine::new(
//!     graph.prototype(),
//!     config,
//!     CutEdges::new(graph.clone()),
//!     DistrictMutator::new(graph.clone()),
//!     SinglePointCrosser,
//! )?;
//! let result = engine.run(())?;
//! assert!(result.best_cost <= 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod graph;
mod mutator;
pub mod objective;

pub use graph::{AdjacencyGraph, GraphBuilder, GroupId, Unit, UnitId, Votes};
pub use mutator::DistrictMutator;
pub use objective::{CutEdges, EfficiencyGap, PopulationBalance, ReassignmentCount, Weighted};
