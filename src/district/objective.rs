//! Built-in redistricting objectives.
//!
//! All objectives are pure functions of the genome and the read-only graph,
//! and return lower costs for better maps:
//!
//! - [`ReassignmentCount`]: units moved away from a reference plan
//! - [`PopulationBalance`]: spread of group sizes around the mean
//! - [`CutEdges`]: adjacency edges crossing group boundaries (compactness)
//! - [`EfficiencyGap`]: imbalance of wasted two-party votes (partisan fairness)
//! - [`Weighted`]: integer-weighted sum of other objectives

use super::graph::{AdjacencyGraph, GroupId, Votes};
use crate::ga::{Cost, Genome, Objective};
use anyhow::{bail, ensure, Context};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Number of positions whose group differs from a reference genome.
#[derive(Debug, Clone)]
pub struct ReassignmentCount {
    reference: Genome<GroupId>,
}

impl ReassignmentCount {
    /// Counts moves relative to `reference`, usually the initial plan.
    pub fn new(reference: Genome<GroupId>) -> Self {
        Self { reference }
    }
}

impl Objective<GroupId> for ReassignmentCount {
    fn score(&self, genome: &Genome<GroupId>) -> anyhow::Result<Cost> {
        ensure!(
            genome.len() == self.reference.len(),
            "genome has {} genes, reference has {}",
            genome.len(),
            self.reference.len()
        );
        let moved = genome
            .iter()
            .zip(self.reference.iter())
            .filter(|(a, b)| a != b)
            .count();
        Ok(Cost::try_from(moved)?)
    }
}

/// Per-group vote totals over the fixed set of groups in the initial plan.
///
/// Fails if the genome assigns a unit to a group that was not in the plan.
fn group_totals(
    graph: &AdjacencyGraph,
    groups: &[GroupId],
    genome: &Genome<GroupId>,
) -> anyhow::Result<BTreeMap<GroupId, Votes>> {
    ensure!(
        genome.len() == graph.len(),
        "genome has {} genes, graph has {} units",
        genome.len(),
        graph.len()
    );
    let mut totals: BTreeMap<GroupId, Votes> =
        groups.iter().map(|&g| (g, Votes::default())).collect();
    for (unit, group) in graph.units().iter().zip(genome.iter()) {
        let Some(entry) = totals.get_mut(group) else {
            bail!("unit {} assigned to unknown group {}", unit.id, group);
        };
        *entry = entry
            .checked_add(unit.votes)
            .with_context(|| format!("vote total of group {group} overflows"))?;
    }
    Ok(totals)
}

/// Distinct groups of the graph's initial plan, sorted.
fn initial_groups(graph: &AdjacencyGraph) -> Vec<GroupId> {
    let mut groups: Vec<GroupId> = graph.units().iter().map(|u| u.group).collect();
    groups.sort_unstable();
    groups.dedup();
    groups
}

/// Sum of absolute deviations of group sizes from the mean.
///
/// Group size is the total vote count. Deviations are scaled by the number
/// of groups `k` to stay in integers: `Σ |k·size_g − Σ size|`. A group that
/// loses all its units still counts, with size 0.
#[derive(Debug, Clone)]
pub struct PopulationBalance {
    graph: Arc<AdjacencyGraph>,
    groups: Vec<GroupId>,
}

impl PopulationBalance {
    /// Balances over the groups present in the graph's initial plan.
    pub fn new(graph: Arc<AdjacencyGraph>) -> Self {
        let groups = initial_groups(&graph);
        Self { graph, groups }
    }
}

impl Objective<GroupId> for PopulationBalance {
    fn score(&self, genome: &Genome<GroupId>) -> anyhow::Result<Cost> {
        let totals = group_totals(&self.graph, &self.groups, genome)?;
        let k = totals.len() as i128;
        let sizes = totals
            .values()
            .map(|v| i128::try_from(v.total()))
            .collect::<Result<Vec<i128>, _>>()
            .context("group size overflows")?;
        let sum: i128 = sizes.iter().sum();
        let spread: i128 = sizes.iter().map(|&s| (k * s - sum).abs()).sum();
        Cost::try_from(spread).context("population spread overflows cost")
    }
}

/// Number of directed adjacency edges whose endpoints are in different
/// groups. Fewer cut edges means more compact districts.
#[derive(Debug, Clone)]
pub struct CutEdges {
    graph: Arc<AdjacencyGraph>,
}

impl CutEdges {
    /// Counts cut edges of `graph`.
    pub fn new(graph: Arc<AdjacencyGraph>) -> Self {
        Self { graph }
    }
}

impl Objective<GroupId> for CutEdges {
    fn score(&self, genome: &Genome<GroupId>) -> anyhow::Result<Cost> {
        ensure!(
            genome.len() == self.graph.len(),
            "genome has {} genes, graph has {} units",
            genome.len(),
            self.graph.len()
        );
        let cut = self
            .graph
            .edges()
            .filter(|&(a, b)| genome[a] != genome[b])
            .count();
        Ok(Cost::try_from(cut)?)
    }
}

/// Absolute difference between wasted Republican and Democratic votes.
///
/// In each group the losing party wastes all its votes and the winner wastes
/// everything above the `floor(two_party / 2) + 1` needed to win. Ties waste
/// every vote on both sides. Third-party votes are ignored.
#[derive(Debug, Clone)]
pub struct EfficiencyGap {
    graph: Arc<AdjacencyGraph>,
    groups: Vec<GroupId>,
}

impl EfficiencyGap {
    /// Scores over the groups present in the graph's initial plan.
    pub fn new(graph: Arc<AdjacencyGraph>) -> Self {
        let groups = initial_groups(&graph);
        Self { graph, groups }
    }
}

impl Objective<GroupId> for EfficiencyGap {
    fn score(&self, genome: &Genome<GroupId>) -> anyhow::Result<Cost> {
        let totals = group_totals(&self.graph, &self.groups, genome)?;
        let (mut wasted_r, mut wasted_d) = (0i128, 0i128);
        for votes in totals.values() {
            let r = i128::from(votes.republicans);
            let d = i128::from(votes.democrats);
            let needed = (r + d) / 2 + 1;
            match r.cmp(&d) {
                std::cmp::Ordering::Greater => {
                    wasted_r += r - needed;
                    wasted_d += d;
                }
                std::cmp::Ordering::Less => {
                    wasted_d += d - needed;
                    wasted_r += r;
                }
                std::cmp::Ordering::Equal => {
                    wasted_r += r;
                    wasted_d += d;
                }
            }
        }
        Cost::try_from((wasted_r - wasted_d).abs()).context("efficiency gap overflows cost")
    }
}

/// Integer-weighted sum of objectives.
///
/// ```
/// use gendist::district::Weighted;
/// use gendist::ga::{Cost, Genome, Objective};
///
/// let len = |g: &Genome<u8>| -> anyhow::Result<Cost> { Ok(g.len() as Cost) };
/// let first = |g: &Genome<u8>| -> anyhow::Result<Cost> { Ok(Cost::from(g[0])) };
/// let combined = Weighted::new().with(10, len).with(1, first);
/// assert_eq!(combined.score(&Genome::new(vec![3, 0])).unwrap(), 23);
/// ```
pub struct Weighted<G> {
    terms: Vec<(Cost, Box<dyn Objective<G>>)>,
}

impl<G> Default for Weighted<G> {
    fn default() -> Self {
        Self { terms: Vec::new() }
    }
}

impl<G> Weighted<G> {
    /// An empty sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `objective` with `weight`.
    pub fn with<O>(mut self, weight: Cost, objective: O) -> Self
    where
        O: Objective<G> + 'static,
    {
        self.terms.push((weight, Box::new(objective)));
        self
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether there are no terms. An empty sum scores 0.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<G> Objective<G> for Weighted<G> {
    fn score(&self, genome: &Genome<G>) -> anyhow::Result<Cost> {
        let mut total: Cost = 0;
        for (i, (weight, objective)) in self.terms.iter().enumerate() {
            let cost = objective
                .score(genome)
                .with_context(|| format!("weighted term {i} failed"))?;
            total = weight
                .checked_mul(cost)
                .and_then(|c| total.checked_add(c))
                .with_context(|| format!("weighted term {i} overflows cost"))?;
        }
        Ok(total)
    }
}
