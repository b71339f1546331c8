//! Voting-district records and their adjacency graph.
//!
//! The graph is built once through [`GraphBuilder`], which checks
//! referential integrity, and is read-only afterwards. Units keep the order
//! in which they were added; that order is the canonical gene order for
//! every genome in a run.

use crate::error::GraphIntegrityError;
use crate::ga::Genome;
use std::collections::HashMap;
use std::fmt;

/// Identifier of a base unit (a voting district).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a group (a legislative district).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vote counts recorded for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Votes {
    pub republicans: u64,
    pub democrats: u64,
    pub other: u64,
}

impl Votes {
    /// Creates a vote record from per-party counts.
    pub fn new(republicans: u64, democrats: u64, other: u64) -> Self {
        Self {
            republicans,
            democrats,
            other,
        }
    }

    /// All votes cast. Widened so that the sum cannot overflow.
    pub fn total(&self) -> u128 {
        u128::from(self.republicans) + u128::from(self.democrats) + u128::from(self.other)
    }

    /// Per-party sum of two records, or `None` if any count overflows.
    pub fn checked_add(self, other: Votes) -> Option<Votes> {
        Some(Votes {
            republicans: self.republicans.checked_add(other.republicans)?,
            democrats: self.democrats.checked_add(other.democrats)?,
            other: self.other.checked_add(other.other)?,
        })
    }
}

/// An immutable base unit: its id, its initial group, and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    /// Group the unit belongs to before any evolution.
    pub group: GroupId,
    pub votes: Votes,
}

impl Unit {
    /// Creates a unit starting in `group`.
    pub fn new(id: UnitId, group: GroupId, votes: Votes) -> Self {
        Self { id, group, votes }
    }
}

/// Static neighbor relation among units.
///
/// Neighbor lists are stored as canonical positions. The relation may be
/// asymmetric if it was built that way; see [`is_symmetric`](Self::is_symmetric).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyGraph {
    units: Vec<Unit>,
    positions: HashMap<UnitId, usize>,
    neighbors: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    /// Starts building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the graph has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in canonical order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The unit at a canonical position.
    pub fn unit(&self, position: usize) -> Option<&Unit> {
        self.units.get(position)
    }

    /// Canonical position of a unit.
    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Neighbor positions of the unit at `position`.
    ///
    /// Empty for isolated units and for out-of-range positions.
    pub fn neighbors(&self, position: usize) -> &[usize] {
        self.neighbors.get(position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbor ids of a unit. Empty for unknown ids.
    pub fn neighbor_ids(&self, id: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.position(id)
            .map(|p| self.neighbors(p))
            .unwrap_or_default()
            .iter()
            .map(|&n| self.units[n].id)
    }

    /// All directed edges as `(position, neighbor_position)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(p, ns)| ns.iter().map(move |&n| (p, n)))
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }

    /// Whether every edge has its reverse.
    pub fn is_symmetric(&self) -> bool {
        self.edges().all(|(p, n)| self.neighbors[n].contains(&p))
    }

    /// The genome of initial group assignments, in canonical order.
    pub fn prototype(&self) -> Genome<GroupId> {
        self.units.iter().map(|u| u.group).collect()
    }
}

/// Collects units and neighbor entries, then validates them into an
/// [`AdjacencyGraph`].
///
/// ```
/// use gendist::district::{AdjacencyGraph, GroupId, Unit, UnitId, Votes};
///
/// let graph = AdjacencyGraph::builder()
///     .add_unit(Unit::new(UnitId(1), GroupId(1), Votes::default()))
///     .add_unit(Unit::new(UnitId(2), GroupId(2), Votes::default()))
///     .add_adjacency(UnitId(1), UnitId(2))
///     .build()?;
/// assert!(graph.is_symmetric());
/// assert_eq!(graph.neighbor_ids(UnitId(1)).collect::<Vec<_>>(), vec![UnitId(2)]);
/// # Ok::<(), gendist::error::GraphIntegrityError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    units: Vec<Unit>,
    edges: Vec<(UnitId, UnitId)>,
}

impl GraphBuilder {
    /// Adds a unit. Insertion order becomes the canonical order.
    pub fn add_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    /// Records `neighbor` as a neighbor of `unit` (one direction only).
    pub fn add_neighbor(mut self, unit: UnitId, neighbor: UnitId) -> Self {
        self.edges.push((unit, neighbor));
        self
    }

    /// Records `a` and `b` as neighbors of each other.
    pub fn add_adjacency(self, a: UnitId, b: UnitId) -> Self {
        self.add_neighbor(a, b).add_neighbor(b, a)
    }

    /// Validates and builds the graph.
    ///
    /// Duplicate neighbor entries collapse into one.
    pub fn build(self) -> Result<AdjacencyGraph, GraphIntegrityError> {
        let mut positions = HashMap::with_capacity(self.units.len());
        for (position, unit) in self.units.iter().enumerate() {
            if positions.insert(unit.id, position).is_some() {
                return Err(GraphIntegrityError::DuplicateUnit(unit.id));
            }
        }

        let mut neighbors = vec![Vec::new(); self.units.len()];
        for (unit, neighbor) in self.edges {
            let from = *positions
                .get(&unit)
                .ok_or(GraphIntegrityError::UnknownUnit { unit })?;
            let to = *positions
                .get(&neighbor)
                .ok_or(GraphIntegrityError::DanglingNeighbor { unit, neighbor })?;
            if from == to {
                return Err(GraphIntegrityError::SelfLoop(unit));
            }
            let list: &mut Vec<usize> = &mut neighbors[from];
            if !list.contains(&to) {
                list.push(to);
            }
        }

        let graph = AdjacencyGraph {
            units: self.units,
            positions,
            neighbors,
        };
        tracing::debug!(
            units = graph.len(),
            edges = graph.edge_count(),
            symmetric = graph.is_symmetric(),
            "Adjacency graph built"
        );
        Ok(graph)
    }
}
