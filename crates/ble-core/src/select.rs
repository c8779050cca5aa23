//! Basic-level selection for a batch of source nodes.

use crate::graph::{NodeIndex, Weight, WeightedGraph};
use crate::path::SourceNode;
use crate::weights::WeightTable;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Assignment of every source node to its basic level, if any.
pub type Assignment = BTreeMap<NodeIndex, Option<BasicLevel>>;

/// A materialised basic level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicLevel {
    pub id: String,
    pub label: String,
    /// Edges on the shortest root → basic level path.
    pub depth: usize,
    /// Effective weight at materialisation time.
    pub weight_value: Weight,
    pub num_descendants: usize,
    /// `weight_value` plus the effective weights of all descendants,
    /// saturating at `Weight::MAX`.
    pub cumulative_weight: Weight,
    #[serde(skip)]
    pub descendants: BTreeSet<String>,
}

/// Picks the basic level of each source among its chosen local maxima.
pub struct BasicLevelSelector<'a> {
    graph: &'a WeightedGraph,
    weights: &'a WeightTable,
    depths: &'a HashMap<NodeIndex, usize>,
    subsumer_threshold: usize,
}

impl<'a> BasicLevelSelector<'a> {
    pub fn new(
        graph: &'a WeightedGraph,
        weights: &'a WeightTable,
        depths: &'a HashMap<NodeIndex, usize>,
        subsumer_threshold: usize,
    ) -> Self {
        Self {
            graph,
            weights,
            depths,
            subsumer_threshold,
        }
    }

    /// Re-choose each source's path under the current weights and select its
    /// basic level.
    ///
    /// The first local maximum (in path order) subsuming at least
    /// `subsumer_threshold` nodes is taken. If it is not in `candidates` the
    /// source gets `None`; later local maxima are not considered.
    pub fn select<'s>(
        &self,
        sources: impl IntoIterator<Item = &'s mut SourceNode>,
        candidates: &BTreeSet<NodeIndex>,
    ) -> Assignment {
        let mut out = Assignment::new();

        for source in sources {
            source.choose_path(self.weights);

            let accepted = source.chosen_local_maxima().iter().find_map(|&lm| {
                let descendants = self.graph.descendants(lm);
                (descendants.len() >= self.subsumer_threshold).then_some((lm, descendants))
            });

            let basic_level = match accepted {
                Some((lm, descendants)) if candidates.contains(&lm) => {
                    Some(self.materialize_with(lm, &descendants))
                }
                Some((lm, _)) => {
                    tracing::trace!(
                        source = self.graph.id(source.index()),
                        basic_level = self.graph.id(lm),
                        "basic level rejected: not a candidate"
                    );
                    None
                }
                None => None,
            };

            out.insert(source.index(), basic_level);
        }

        out
    }

    /// Build the basic-level record of `ix` under the current weights.
    pub fn materialize(&self, ix: NodeIndex) -> BasicLevel {
        let descendants = self.graph.descendants(ix);
        self.materialize_with(ix, &descendants)
    }

    fn materialize_with(&self, ix: NodeIndex, descendants: &BTreeSet<NodeIndex>) -> BasicLevel {
        let node = self.graph.node(ix);
        let weight_value = self.weights.get(ix);
        let cumulative_weight = descendants
            .iter()
            .map(|&d| self.weights.get(d))
            .fold(weight_value, Weight::saturating_add);

        BasicLevel {
            id: node.id.clone(),
            label: node.label.clone(),
            // Every node of a rooted graph has a depth.
            depth: self.depths.get(&ix).copied().unwrap_or_default(),
            weight_value,
            num_descendants: descendants.len(),
            cumulative_weight,
            descendants: descendants
                .iter()
                .map(|&d| self.graph.id(d).to_string())
                .collect(),
        }
    }
}
