//! Boundary-growth mutation.
//!
//! A randomly chosen unit joins the group of one of its neighbors. Repeated
//! application grows groups along the adjacency graph, which biases the
//! search toward contiguous districts without enforcing contiguity.

use super::graph::{AdjacencyGraph, GroupId};
use crate::error::{ConfigError, NoNeighborsError};
use crate::ga::{Genome, Mutator};
use rand::Rng;
use std::sync::Arc;

/// Graph-constrained mutator over group assignments.
#[derive(Debug, Clone)]
pub struct DistrictMutator {
    graph: Arc<AdjacencyGraph>,
}

impl DistrictMutator {
    /// Creates a mutator sharing `graph`.
    pub fn new(graph: Arc<AdjacencyGraph>) -> Self {
        Self { graph }
    }

    /// The graph used to pick neighbors.
    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    /// Reassigns the unit at `position` to the current group of a uniformly
    /// chosen neighbor.
    ///
    /// Returns [`NoNeighborsError`] when the unit is isolated.
    ///
    /// # Panics
    /// Panics if the genome length differs from the number of units, or if
    /// `position` is out of range.
    pub fn mutate_at<R: Rng>(
        &self,
        genome: &Genome<GroupId>,
        position: usize,
        rng: &mut R,
    ) -> Result<Genome<GroupId>, NoNeighborsError> {
        assert_eq!(
            genome.len(),
            self.graph.len(),
            "genome length must match the number of units"
        );
        let unit = self.graph.units()[position].id;

        let neighbors = self.graph.neighbors(position);
        if neighbors.is_empty() {
            return Err(NoNeighborsError { position, unit });
        }
        let neighbor = neighbors[rng.random_range(0..neighbors.len())];

        let mut child = genome.clone();
        child.genes_mut()[position] = genome[neighbor];
        Ok(child)
    }
}

impl Mutator<GroupId> for DistrictMutator {
    fn mutate<R: Rng>(
        &self,
        genome: &Genome<GroupId>,
        rng: &mut R,
    ) -> Result<Genome<GroupId>, NoNeighborsError> {
        let position = rng.random_range(0..genome.len());
        self.mutate_at(genome, position, rng)
    }

    fn check_prototype(&self, prototype: &Genome<GroupId>) -> Result<(), ConfigError> {
        if prototype.len() != self.graph.len() {
            return Err(ConfigError::PrototypeLength {
                expected: self.graph.len(),
                actual: prototype.len(),
            });
        }
        Ok(())
    }
}
