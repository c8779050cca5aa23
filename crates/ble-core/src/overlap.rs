//! Removal of nested basic levels.
//!
//! A basic level that subsumes another basic level is too general. The
//! resolver disqualifies every such ancestor and recomputes the basic levels
//! of the sources below it, restricted to candidates inside its subtree,
//! until no assigned basic level is an ancestor of another one.

use crate::error::{BleError, Result};
use crate::graph::{NodeIndex, WeightedGraph};
use crate::path::SourceNode;
use crate::select::{Assignment, BasicLevelSelector};
use crate::weights::WeightTable;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One source whose basic level changed during resolution.
///
/// `before` and `after` name the same basic level when only its weights
/// were refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentChange {
    pub source: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// What a resolution run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub iterations: usize,
    /// Disqualified node ids, in disqualification order.
    pub disqualified: Vec<String>,
    pub changes: Vec<AssignmentChange>,
}

impl ResolutionReport {
    pub fn is_noop(&self) -> bool {
        self.iterations == 0
    }
}

/// Map every basic level that is an ancestor of other basic levels to the
/// set of those descendants.
pub fn overlapping_basic_levels(
    graph: &WeightedGraph,
    basic_levels: &BTreeSet<NodeIndex>,
) -> BTreeMap<NodeIndex, BTreeSet<NodeIndex>> {
    let mut out = BTreeMap::new();
    for &ancestor in basic_levels {
        let nested: BTreeSet<NodeIndex> = basic_levels
            .iter()
            .copied()
            .filter(|&other| graph.has_path(ancestor, other))
            .collect();
        if !nested.is_empty() {
            out.insert(ancestor, nested);
        }
    }
    out
}

/// Distinct basic levels of an assignment.
pub fn assigned_basic_levels(graph: &WeightedGraph, assignment: &Assignment) -> BTreeSet<NodeIndex> {
    assignment
        .values()
        .flatten()
        .filter_map(|bl| graph.index_of(&bl.id))
        .collect()
}

pub struct OverlapResolver<'a> {
    graph: &'a WeightedGraph,
    depths: &'a HashMap<NodeIndex, usize>,
    subsumer_threshold: usize,
    max_iterations: usize,
}

impl<'a> OverlapResolver<'a> {
    pub fn new(
        graph: &'a WeightedGraph,
        depths: &'a HashMap<NodeIndex, usize>,
        subsumer_threshold: usize,
    ) -> Self {
        Self {
            graph,
            depths,
            subsumer_threshold,
            max_iterations: graph.node_count() + 1,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run to a fixed point, updating `weights` and `assignment` in place.
    ///
    /// `sources` must hold a [`SourceNode`] for every key of `assignment`.
    /// On return every assigned basic level is re-materialised under the
    /// final weights.
    pub fn resolve(
        &self,
        weights: &mut WeightTable,
        sources: &mut BTreeMap<NodeIndex, SourceNode>,
        assignment: &mut Assignment,
    ) -> Result<ResolutionReport> {
        let mut report = ResolutionReport::default();

        loop {
            let overlaps =
                overlapping_basic_levels(self.graph, &assigned_basic_levels(self.graph, assignment));
            if overlaps.is_empty() {
                break;
            }
            if report.iterations >= self.max_iterations {
                return Err(BleError::NotConverged(report.iterations));
            }
            report.iterations += 1;

            tracing::info!(
                iteration = report.iterations,
                overlapping = overlaps.len(),
                "removing overlapping basic levels"
            );

            for (&ancestor, nested) in &overlaps {
                weights.disqualify(ancestor);
                report.disqualified.push(self.graph.id(ancestor).to_string());
                tracing::debug!(
                    basic_level = self.graph.id(ancestor),
                    nested = nested.len(),
                    "disqualified basic level"
                );

                let subtree = self.graph.descendants(ancestor);
                let batch = sources
                    .iter_mut()
                    .filter(|(ix, _)| subtree.contains(*ix) && assignment.contains_key(*ix))
                    .map(|(_, source)| source);

                let selector = BasicLevelSelector::new(
                    self.graph,
                    weights,
                    self.depths,
                    self.subsumer_threshold,
                );
                let recomputed = selector.select(batch, &subtree);

                self.merge(assignment, recomputed, &mut report.changes);
            }
        }

        // Cumulative weights of untouched basic levels may still count
        // descendants that were disqualified later.
        let selector =
            BasicLevelSelector::new(self.graph, weights, self.depths, self.subsumer_threshold);
        for slot in assignment.values_mut() {
            if let Some(bl) = slot.as_mut() {
                if let Some(ix) = self.graph.index_of(&bl.id) {
                    *bl = selector.materialize(ix);
                }
            }
        }

        Ok(report)
    }

    /// Overwrite the slots of `recomputed` sources, recording every value
    /// that differs from the current one.
    fn merge(
        &self,
        assignment: &mut Assignment,
        recomputed: Assignment,
        changes: &mut Vec<AssignmentChange>,
    ) {
        for (ix, after) in recomputed {
            let Some(slot) = assignment.get_mut(&ix) else {
                continue;
            };
            if *slot != after {
                let before_id = slot.as_ref().map(|bl| bl.id.clone());
                let after_id = after.as_ref().map(|bl| bl.id.clone());
                tracing::debug!(
                    source = self.graph.id(ix),
                    before = before_id.as_deref().unwrap_or("-"),
                    after = after_id.as_deref().unwrap_or("-"),
                    "basic level changed"
                );
                changes.push(AssignmentChange {
                    source: self.graph.id(ix).to_string(),
                    before: before_id,
                    after: after_id,
                });
            }
            *slot = after;
        }
    }
}
