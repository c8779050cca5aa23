//! Weighted event-type graphs.
//!
//! A [`GraphDocument`] is the serialisable input handed over by the ETL
//! layer: nodes with (possibly missing) attributes and parent → child edges.
//! [`WeightedGraph::from_document`] turns it into the rooted working graph:
//! the designated root plus all of its descendants, with every attribute
//! validated and cycles rejected.
//!
//! Node indices of a [`WeightedGraph`] are assigned in lexicographic id
//! order, so ordering `NodeIndex` values is the same as ordering ids. The
//! rest of the crate relies on this for deterministic iteration.

use crate::error::{BleError, Result};
use petgraph::algo::{all_simple_paths, dijkstra, has_path_connecting, toposort};
use petgraph::graph::DiGraph;
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

pub use petgraph::graph::NodeIndex;

/// Node weight: an occurrence count or a number of features.
pub type Weight = u64;

// ============================================================================
// Weight property
// ============================================================================

/// Which node attribute serves as the weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProperty {
    /// Wikidata: how many incidents are typed with the event type.
    #[default]
    OccurrenceFrequency,
    /// Length of the node's feature list.
    NumFeatures,
}

impl WeightProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OccurrenceFrequency => "occurrence_frequency",
            Self::NumFeatures => "num_features",
        }
    }
}

impl fmt::Display for WeightProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightProperty {
    type Err = BleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "occurrence_frequency" => Ok(Self::OccurrenceFrequency),
            "num_features" => Ok(Self::NumFeatures),
            other => Err(BleError::UnsupportedWeightProperty(other.to_string())),
        }
    }
}

// ============================================================================
// Input document
// ============================================================================

/// Serialisable graph as produced by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// A node as declared in a [`GraphDocument`].
///
/// Attributes are optional here so that a missing one can be reported for
/// the nodes that actually take part in a computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_frequency: Option<Weight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// A "more general than" edge: `parent` subsumes `child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub parent: String,
    pub child: String,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully attributed node.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        occurrence_frequency: Weight,
        features: Vec<String>,
    ) -> &mut Self {
        self.nodes.push(NodeRecord {
            id: id.into(),
            label: Some(label.into()),
            occurrence_frequency: Some(occurrence_frequency),
            features: Some(features),
        });
        self
    }

    pub fn add_edge(&mut self, parent: impl Into<String>, child: impl Into<String>) -> &mut Self {
        self.edges.push(EdgeRecord {
            parent: parent.into(),
            child: child.into(),
        });
        self
    }
}

// ============================================================================
// Rooted working graph
// ============================================================================

/// A validated node of the working graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub occurrence_frequency: Weight,
    pub features: Vec<String>,
}

impl GraphNode {
    fn from_record(record: &NodeRecord) -> Result<Self> {
        let missing = |attribute: &'static str| BleError::MissingAttribute {
            node: record.id.clone(),
            attribute,
        };

        Ok(Self {
            id: record.id.clone(),
            label: record.label.clone().ok_or_else(|| missing("label"))?,
            occurrence_frequency: record
                .occurrence_frequency
                .ok_or_else(|| missing("occurrence_frequency"))?,
            features: record.features.clone().ok_or_else(|| missing("features"))?,
        })
    }

    pub fn weight(&self, property: WeightProperty) -> Weight {
        match property {
            WeightProperty::OccurrenceFrequency => self.occurrence_frequency,
            WeightProperty::NumFeatures => self.features.len() as Weight,
        }
    }
}

/// Directed acyclic graph restricted to one root and its descendants.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl WeightedGraph {
    /// Validate `doc` and keep only `root` and its descendants.
    ///
    /// Fails on duplicate ids, edges to undeclared nodes, cycles anywhere in
    /// the document, an unknown root, or a reachable node lacking one of
    /// `label`, `occurrence_frequency` and `features`.
    pub fn from_document(doc: &GraphDocument, root: &str) -> Result<Self> {
        let mut records: BTreeMap<&str, &NodeRecord> = BTreeMap::new();
        for record in &doc.nodes {
            if records.insert(record.id.as_str(), record).is_some() {
                return Err(BleError::DuplicateNode(record.id.clone()));
            }
        }

        let mut skeleton: DiGraph<&str, ()> = DiGraph::with_capacity(records.len(), doc.edges.len());
        let mut skeleton_index: HashMap<&str, NodeIndex> = HashMap::with_capacity(records.len());
        for id in records.keys() {
            skeleton_index.insert(*id, skeleton.add_node(*id));
        }

        for edge in &doc.edges {
            let endpoint = |id: &String| {
                skeleton_index
                    .get(id.as_str())
                    .copied()
                    .ok_or_else(|| BleError::UnknownNode {
                        parent: edge.parent.clone(),
                        child: edge.child.clone(),
                        missing: id.clone(),
                    })
            };
            let parent = endpoint(&edge.parent)?;
            let child = endpoint(&edge.child)?;
            skeleton.update_edge(parent, child, ());
        }

        if let Err(cycle) = toposort(&skeleton, None) {
            return Err(BleError::CyclicGraph(skeleton[cycle.node_id()].to_string()));
        }

        let Some(&skeleton_root) = skeleton_index.get(root) else {
            return Err(BleError::UnknownRoot(root.to_string()));
        };

        let mut reachable: BTreeSet<&str> = BTreeSet::new();
        let mut dfs = Dfs::new(&skeleton, skeleton_root);
        while let Some(ix) = dfs.next(&skeleton) {
            reachable.insert(skeleton[ix]);
        }

        let mut graph = DiGraph::with_capacity(reachable.len(), doc.edges.len());
        let mut index = HashMap::with_capacity(reachable.len());
        for id in &reachable {
            let node = GraphNode::from_record(records[id])?;
            index.insert(node.id.clone(), graph.add_node(node));
        }

        for edge in skeleton.edge_references() {
            let parent = index.get(skeleton[edge.source()]).copied();
            let child = index.get(skeleton[edge.target()]).copied();
            if let (Some(parent), Some(child)) = (parent, child) {
                graph.add_edge(parent, child, ());
            }
        }

        let root = index[root];
        tracing::debug!(
            root = root_id_of(&graph, root),
            descendants = reachable.len() - 1,
            discarded = records.len() - reachable.len(),
            "built rooted subgraph"
        );

        Ok(Self { graph, index, root })
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn root_id(&self) -> &str {
        root_id_of(&self.graph, self.root)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node indices in ascending id order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub fn contains(&self, ix: NodeIndex) -> bool {
        ix.index() < self.graph.node_count()
    }

    pub fn node(&self, ix: NodeIndex) -> &GraphNode {
        &self.graph[ix]
    }

    pub fn id(&self, ix: NodeIndex) -> &str {
        &self.graph[ix].id
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn children(&self, ix: NodeIndex) -> BTreeSet<NodeIndex> {
        self.graph
            .neighbors_directed(ix, Direction::Outgoing)
            .collect()
    }

    pub fn is_leaf(&self, ix: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(ix, Direction::Outgoing)
            .next()
            .is_none()
    }

    /// Nodes without descendants, root excluded.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&ix| ix != self.root && self.is_leaf(ix))
            .collect()
    }

    /// Every node reachable from `ix`, excluding `ix` itself.
    pub fn descendants(&self, ix: NodeIndex) -> BTreeSet<NodeIndex> {
        let mut out = BTreeSet::new();
        let mut dfs = Dfs::new(&self.graph, ix);
        while let Some(next) = dfs.next(&self.graph) {
            if next != ix {
                out.insert(next);
            }
        }
        out
    }

    /// `true` when a directed path leads from `from` to a different node `to`.
    pub fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        from != to && has_path_connecting(&self.graph, from, to, None)
    }

    /// Number of edges on the shortest root → node path, for every node.
    pub fn depths(&self) -> HashMap<NodeIndex, usize> {
        dijkstra(&self.graph, self.root, None, |_| 1usize)
    }

    /// All simple root → `target` paths (root first), sorted lexicographically
    /// by their node-id sequence.
    pub fn paths_from_root(&self, target: NodeIndex) -> Vec<Vec<NodeIndex>> {
        let mut paths: Vec<Vec<NodeIndex>> =
            all_simple_paths::<Vec<NodeIndex>, _>(&self.graph, self.root, target, 0, None)
                .collect();
        paths.sort();
        paths
    }

    /// Serialise the rooted graph back into a document.
    pub fn to_document(&self) -> GraphDocument {
        let nodes = self
            .graph
            .node_indices()
            .map(|ix| &self.graph[ix])
            .map(|node| NodeRecord {
                id: node.id.clone(),
                label: Some(node.label.clone()),
                occurrence_frequency: Some(node.occurrence_frequency),
                features: Some(node.features.clone()),
            })
            .collect();

        let mut edges: Vec<EdgeRecord> = self
            .graph
            .edge_references()
            .map(|edge| EdgeRecord {
                parent: self.id(edge.source()).to_string(),
                child: self.id(edge.target()).to_string(),
            })
            .collect();
        edges.sort_by(|a, b| (&a.parent, &a.child).cmp(&(&b.parent, &b.child)));

        GraphDocument { nodes, edges }
    }
}

fn root_id_of(graph: &DiGraph<GraphNode, ()>, root: NodeIndex) -> &str {
    &graph[root].id
}
