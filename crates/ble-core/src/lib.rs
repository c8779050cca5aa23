//! Basic Level Event selection.
//!
//! Given a weighted, rooted event-type hierarchy, every source node (by
//! default every leaf) is assigned a *basic level*: the most informative
//! ancestor on its heaviest root path, found as a local weight maximum that
//! subsumes enough nodes. Basic levels nested inside other basic levels are
//! then removed until the assignment is free of overlaps.
//!
//! ```no_run
//! use ble_core::{BleCollection, BleConfig, GraphDocument, WeightProperty};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc: GraphDocument = serde_json::from_str(&std::fs::read_to_string("graph.json")?)?;
//! let config = BleConfig::new("wd:Q1656682", WeightProperty::OccurrenceFrequency, 0);
//! let collection = BleCollection::new(&doc, config)?;
//! println!("{}", collection.stats());
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod graph;
pub mod local_maxima;
pub mod overlap;
pub mod path;
pub mod select;
pub mod stats;
pub mod weights;

pub use collection::{overview_table, AssignmentDocument, BleCollection};
pub use config::{BleConfig, PathOrder, SourceScope};
pub use error::{BleError, Result};
pub use graph::{
    EdgeRecord, GraphDocument, GraphNode, NodeIndex, NodeRecord, Weight, WeightProperty,
    WeightedGraph,
};
pub use local_maxima::{local_maxima, LocalMaxima};
pub use overlap::{overlapping_basic_levels, AssignmentChange, OverlapResolver, ResolutionReport};
pub use path::{PathEvaluation, SourceNode};
pub use select::{Assignment, BasicLevel, BasicLevelSelector};
pub use stats::{BleStats, OverviewRow, Summary};
pub use weights::WeightTable;
