//! End-to-end basic-level computation over one rooted graph.

use crate::config::{BleConfig, SourceScope};
use crate::error::Result;
use crate::graph::{GraphDocument, NodeIndex, WeightedGraph};
use crate::overlap::{OverlapResolver, ResolutionReport};
use crate::path::SourceNode;
use crate::select::{Assignment, BasicLevel, BasicLevelSelector};
use crate::stats::{self, BleStats, OverviewRow};
use crate::weights::WeightTable;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

// ============================================================================
// Collection
// ============================================================================

/// Basic levels of every source node below a root.
///
/// Construction runs the whole pipeline: the rooted subgraph is extracted and
/// validated, the root is optionally zeroed, every source gets an initial
/// basic level with all nodes as candidates, and overlapping basic levels are
/// resolved to a fixed point.
#[derive(Debug, Clone)]
pub struct BleCollection {
    config: BleConfig,
    graph: WeightedGraph,
    weights: WeightTable,
    depths: HashMap<NodeIndex, usize>,
    sources: BTreeMap<NodeIndex, SourceNode>,
    initial: Assignment,
    assignment: Assignment,
    resolution: ResolutionReport,
}

impl BleCollection {
    pub fn new(doc: &GraphDocument, config: BleConfig) -> Result<Self> {
        let graph = WeightedGraph::from_document(doc, &config.root)?;
        info!(
            root = graph.root_id(),
            descendants = graph.node_count() - 1,
            edges = graph.edge_count(),
            "found descendants of root"
        );

        let mut weights = WeightTable::new(&graph, config.weight_property);
        if config.root_zero {
            let before = weights.original(graph.root());
            weights.disqualify(graph.root());
            info!(
                property = %config.weight_property,
                before,
                after = weights.get(graph.root()),
                "changed weight of root node"
            );
        }

        let depths = graph.depths();

        let source_indices: Vec<NodeIndex> = match config.sources {
            SourceScope::Leaves => graph.leaves(),
            SourceScope::AllDescendants => graph
                .node_indices()
                .filter(|&ix| ix != graph.root())
                .collect(),
        };
        info!(count = source_indices.len(), scope = %config.sources, "found source nodes");

        let mut sources = BTreeMap::new();
        for ix in source_indices {
            sources.insert(ix, SourceNode::resolve(&graph, ix, config.path_order)?);
        }

        let candidates: BTreeSet<NodeIndex> = graph.node_indices().collect();
        let initial = BasicLevelSelector::new(&graph, &weights, &depths, config.subsumer_threshold)
            .select(sources.values_mut(), &candidates);

        let mut collection = Self {
            config,
            graph,
            weights,
            depths,
            sources,
            assignment: initial.clone(),
            initial,
            resolution: ResolutionReport::default(),
        };
        collection.resolution = collection.resolve_overlaps()?;

        info!(
            unique = collection.unique_basic_levels().len(),
            iterations = collection.resolution.iterations,
            "computed basic levels"
        );
        Ok(collection)
    }

    /// Run overlap resolution on the current assignment.
    ///
    /// Already part of [`BleCollection::new`]; calling it again reports zero
    /// iterations and leaves the assignment unchanged.
    pub fn resolve_overlaps(&mut self) -> Result<ResolutionReport> {
        let mut resolver =
            OverlapResolver::new(&self.graph, &self.depths, self.config.subsumer_threshold);
        if let Some(max_iterations) = self.config.max_iterations {
            resolver = resolver.with_max_iterations(max_iterations);
        }
        resolver.resolve(&mut self.weights, &mut self.sources, &mut self.assignment)
    }

    pub fn config(&self) -> &BleConfig {
        &self.config
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn resolution(&self) -> &ResolutionReport {
        &self.resolution
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Assignment before overlap resolution.
    pub fn initial_assignment(&self) -> &Assignment {
        &self.initial
    }

    pub fn source(&self, id: &str) -> Option<&SourceNode> {
        self.graph.index_of(id).and_then(|ix| self.sources.get(&ix))
    }

    /// `None` both for sources without a basic level and for unknown ids.
    pub fn basic_level_of(&self, id: &str) -> Option<&BasicLevel> {
        let ix = self.graph.index_of(id)?;
        self.assignment.get(&ix)?.as_ref()
    }

    /// Final assignment keyed by source id.
    pub fn assignments(&self) -> BTreeMap<&str, Option<&BasicLevel>> {
        self.assignment
            .iter()
            .map(|(&ix, bl)| (self.graph.id(ix), bl.as_ref()))
            .collect()
    }

    pub fn unique_basic_levels(&self) -> Vec<&BasicLevel> {
        stats::unique_basic_levels(self.assignment.values())
    }

    pub fn basic_level_table(&self, min_cumulative_weight: u64) -> Vec<&BasicLevel> {
        stats::basic_level_table(self.assignment.values(), min_cumulative_weight)
    }

    pub fn stats(&self) -> BleStats {
        BleStats::from_assignment(self.assignment.values())
    }

    pub fn to_output(&self) -> AssignmentDocument {
        AssignmentDocument {
            settings: self.config.clone(),
            stats: self.stats(),
            assignments: self
                .assignment
                .iter()
                .map(|(&ix, bl)| (self.graph.id(ix).to_string(), bl.clone()))
                .collect(),
            resolution: self.resolution.clone(),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Serialisable result of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentDocument {
    pub settings: BleConfig,
    pub stats: BleStats,
    pub assignments: BTreeMap<String, Option<BasicLevel>>,
    pub resolution: ResolutionReport,
}

/// Run `config` once per subsumer threshold and collect the statistics.
pub fn overview_table(
    doc: &GraphDocument,
    config: &BleConfig,
    thresholds: &[usize],
) -> Result<Vec<OverviewRow>> {
    thresholds
        .iter()
        .map(|&subsumer_threshold| {
            let collection = BleCollection::new(
                doc,
                config.clone().with_subsumer_threshold(subsumer_threshold),
            )?;
            Ok(OverviewRow {
                subsumer_threshold,
                stats: collection.stats(),
            })
        })
        .collect()
}
