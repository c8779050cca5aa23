//! Effective node weights.
//!
//! Base weights are read once from the graph and never change. Overlap
//! resolution removes a basic level from contention by *disqualifying* it,
//! which makes its effective weight 0 while the original value stays
//! available through [`WeightTable::original`].

use crate::graph::{NodeIndex, Weight, WeightProperty, WeightedGraph};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    property: WeightProperty,
    base: Vec<Weight>,
    disqualified: BTreeSet<NodeIndex>,
}

impl WeightTable {
    pub fn new(graph: &WeightedGraph, property: WeightProperty) -> Self {
        let base = graph
            .node_indices()
            .map(|ix| graph.node(ix).weight(property))
            .collect();
        Self {
            property,
            base,
            disqualified: BTreeSet::new(),
        }
    }

    pub fn property(&self) -> WeightProperty {
        self.property
    }

    /// Effective weight; unknown nodes weigh 0.
    pub fn get(&self, ix: NodeIndex) -> Weight {
        if self.disqualified.contains(&ix) {
            0
        } else {
            self.original(ix)
        }
    }

    pub fn original(&self, ix: NodeIndex) -> Weight {
        self.base.get(ix.index()).copied().unwrap_or(0)
    }

    /// Returns `false` if the node was already disqualified.
    pub fn disqualify(&mut self, ix: NodeIndex) -> bool {
        self.disqualified.insert(ix)
    }

    pub fn is_disqualified(&self, ix: NodeIndex) -> bool {
        self.disqualified.contains(&ix)
    }

    pub fn disqualified(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.disqualified.iter().copied()
    }
}
