//! Error taxonomy.
//!
//! Construction-time problems ([`ConfigError`], [`GraphIntegrityError`]) are
//! fatal and returned before any evolution happens. [`NoNeighborsError`] is
//! recoverable: the engine resamples a mutation target a bounded number of
//! times before escalating to [`GenerationError::MutationExhausted`].
//! [`GenerationError`] aborts a generation step without touching the
//! population.

use crate::district::UnitId;
use crate::ga::Genome;

/// Invalid engine configuration or prototype.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("population_size must be positive")]
    NonPositivePopulation,
    #[error("prototype genome must contain at least one gene")]
    EmptyPrototype,
    #[error("max_mutation_retries must be at least 1")]
    ZeroMutationRetries,
    #[error("prototype has {actual} genes, expected {expected}")]
    PrototypeLength { expected: usize, actual: usize },
    #[error("time_limit_ms must be positive or None")]
    ZeroTimeLimit,
}

/// Referential-integrity violation detected while building an adjacency graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphIntegrityError {
    #[error("unit {0} is defined more than once")]
    DuplicateUnit(UnitId),
    #[error("neighbor entry references unknown unit {unit}")]
    UnknownUnit { unit: UnitId },
    #[error("unit {unit} lists unknown neighbor {neighbor}")]
    DanglingNeighbor { unit: UnitId, neighbor: UnitId },
    #[error("unit {0} lists itself as a neighbor")]
    SelfLoop(UnitId),
}

/// The selected mutation target has no neighbors to inherit a group from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unit {unit} at position {position} has no neighbors")]
pub struct NoNeighborsError {
    /// Position of the unit in the canonical ordering.
    pub position: usize,
    /// Identifier of the unit.
    pub unit: UnitId,
}

/// Failure of a single generation step.
///
/// When a step fails, the population, costs, and generation counter are left
/// exactly as they were before the call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError<G> {
    /// Every attempt to mutate a selected genome hit a unit without neighbors.
    #[error("mutation failed after {attempts} attempts: {last}")]
    MutationExhausted {
        attempts: usize,
        #[source]
        last: NoNeighborsError,
    },
    /// The objective failed on a genome from the scored union.
    #[error("objective evaluation failed: {source}")]
    ObjectiveEvaluation {
        genome: Genome<G>,
        #[source]
        source: anyhow::Error,
    },
}

impl<G> GenerationError<G> {
    /// The genome that caused an objective failure, if any.
    pub fn genome(&self) -> Option<&Genome<G>> {
        match self {
            GenerationError::ObjectiveEvaluation { genome, .. } => Some(genome),
            GenerationError::MutationExhausted { .. } => None,
        }
    }
}
