//! Root/source paths of a single source node and the choice among them.

use crate::config::PathOrder;
use crate::error::{BleError, Result};
use crate::graph::{NodeIndex, Weight, WeightedGraph};
use crate::local_maxima::local_maxima;
use crate::weights::WeightTable;

/// How one path scored during the last [`SourceNode::choose_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEvaluation {
    pub index: usize,
    pub local_maxima: Vec<NodeIndex>,
    pub score: Weight,
}

/// A node that receives a basic level, with every simple path between the
/// root and itself.
#[derive(Debug, Clone)]
pub struct SourceNode {
    index: NodeIndex,
    paths: Vec<Vec<NodeIndex>>,
    selected: Option<usize>,
    chosen_local_maxima: Vec<NodeIndex>,
    evaluations: Vec<PathEvaluation>,
}

impl SourceNode {
    /// Enumerate the paths for `index`, stored in `order`.
    ///
    /// Path enumeration order is lexicographic by root-first id sequence,
    /// whatever the storage orientation.
    pub fn resolve(graph: &WeightedGraph, index: NodeIndex, order: PathOrder) -> Result<Self> {
        let mut paths = if graph.contains(index) {
            graph.paths_from_root(index)
        } else {
            Vec::new()
        };

        if paths.is_empty() {
            let node = if graph.contains(index) {
                graph.id(index).to_string()
            } else {
                format!("#{}", index.index())
            };
            return Err(BleError::UnreachableNode {
                node,
                root: graph.root_id().to_string(),
            });
        }

        if order == PathOrder::LeafToRoot {
            for path in &mut paths {
                path.reverse();
            }
        }

        Ok(Self {
            index,
            paths,
            selected: None,
            chosen_local_maxima: Vec::new(),
            evaluations: Vec::new(),
        })
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn paths(&self) -> &[Vec<NodeIndex>] {
        &self.paths
    }

    /// Score every path under `weights` and keep the first one whose score
    /// strictly beats all earlier ones. Paths scoring 0 are never chosen.
    pub fn choose_path(&mut self, weights: &WeightTable) {
        self.selected = None;
        self.chosen_local_maxima.clear();
        self.evaluations.clear();

        let mut best: Weight = 0;
        for (index, path) in self.paths.iter().enumerate() {
            let found = local_maxima(path, |ix| weights.get(ix));
            tracing::trace!(
                source = self.index.index(),
                path = index,
                maxima = found.maxima.len(),
                score = found.score,
                "evaluated path"
            );

            if found.score > best {
                best = found.score;
                self.selected = Some(index);
                self.chosen_local_maxima = found.maxima.clone();
            }

            self.evaluations.push(PathEvaluation {
                index,
                local_maxima: found.maxima,
                score: found.score,
            });
        }
    }

    pub fn selected_path(&self) -> Option<usize> {
        self.selected
    }

    pub fn chosen_path(&self) -> Option<&[NodeIndex]> {
        self.selected.map(|i| self.paths[i].as_slice())
    }

    /// Local maxima of the chosen path, in stored path order.
    pub fn chosen_local_maxima(&self) -> &[NodeIndex] {
        &self.chosen_local_maxima
    }

    pub fn evaluations(&self) -> &[PathEvaluation] {
        &self.evaluations
    }
}
