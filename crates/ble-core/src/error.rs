//! Configuration errors raised by the BLE core.
//!
//! Every variant is fatal: there is no meaningful partial result once the
//! graph or the settings are inconsistent. A source node without a
//! qualifying local maximum is *not* an error; it is reported as `None`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BleError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BleError {
    #[error("node `{0}` is declared more than once")]
    DuplicateNode(String),
    #[error("edge {parent} -> {child} refers to unknown node `{missing}`")]
    UnknownNode {
        parent: String,
        child: String,
        missing: String,
    },
    #[error("root node `{0}` not found in directed graph")]
    UnknownRoot(String),
    #[error("attribute `{attribute}` missing from node `{node}`")]
    MissingAttribute { node: String, attribute: &'static str },
    #[error("graph is not acyclic: cycle through node `{0}`")]
    CyclicGraph(String),
    #[error("no path found from root `{root}` to node `{node}`")]
    UnreachableNode { node: String, root: String },
    #[error("weight property `{0}` is not supported (expected occurrence_frequency | num_features)")]
    UnsupportedWeightProperty(String),
    #[error("path order `{0}` is not supported (expected root_to_leaf | leaf_to_root)")]
    UnsupportedPathOrder(String),
    #[error("source scope `{0}` is not supported (expected leaves | all_descendants)")]
    UnsupportedSourceScope(String),
    #[error("overlap resolution did not converge after {0} iterations")]
    NotConverged(usize),
}
