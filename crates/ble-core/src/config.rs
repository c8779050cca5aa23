//! Settings of a basic-level computation.

use crate::error::{BleError, Result};
use crate::graph::WeightProperty;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orientation in which root/source paths are walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOrder {
    /// Most general local maximum first.
    #[default]
    RootToLeaf,
    /// Local maximum closest to the source first.
    LeafToRoot,
}

impl PathOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RootToLeaf => "root_to_leaf",
            Self::LeafToRoot => "leaf_to_root",
        }
    }
}

impl fmt::Display for PathOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathOrder {
    type Err = BleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "root_to_leaf" => Ok(Self::RootToLeaf),
            "leaf_to_root" => Ok(Self::LeafToRoot),
            other => Err(BleError::UnsupportedPathOrder(other.to_string())),
        }
    }
}

/// Which nodes receive a basic level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceScope {
    /// Nodes without descendants.
    #[default]
    Leaves,
    /// Every node except the root.
    AllDescendants,
}

impl SourceScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leaves => "leaves",
            Self::AllDescendants => "all_descendants",
        }
    }
}

impl fmt::Display for SourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceScope {
    type Err = BleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "leaves" => Ok(Self::Leaves),
            "all_descendants" => Ok(Self::AllDescendants),
            other => Err(BleError::UnsupportedSourceScope(other.to_string())),
        }
    }
}

/// Parameters of a [`crate::BleCollection`].
///
/// Loadable from JSON; only `root`, `weight_property` and
/// `subsumer_threshold` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BleConfig {
    /// Only this node and its descendants take part.
    pub root: String,
    pub weight_property: WeightProperty,
    /// Minimum number of descendants a basic level must subsume.
    pub subsumer_threshold: usize,
    /// Force the root's weight to 0 so it never wins as its own basic level.
    #[serde(default = "default_root_zero")]
    pub root_zero: bool,
    #[serde(default)]
    pub path_order: PathOrder,
    /// Nodes that receive a basic level. Defaults to leaves only; use
    /// [`SourceScope::AllDescendants`] to assign every non-root node.
    #[serde(default)]
    pub sources: SourceScope,
    /// Cap on overlap-resolution passes; defaults to node count + 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

fn default_root_zero() -> bool {
    true
}

impl BleConfig {
    pub fn new(
        root: impl Into<String>,
        weight_property: WeightProperty,
        subsumer_threshold: usize,
    ) -> Self {
        Self {
            root: root.into(),
            weight_property,
            subsumer_threshold,
            root_zero: true,
            path_order: PathOrder::default(),
            sources: SourceScope::default(),
            max_iterations: None,
        }
    }

    pub fn with_root_zero(mut self, root_zero: bool) -> Self {
        self.root_zero = root_zero;
        self
    }

    pub fn with_path_order(mut self, path_order: PathOrder) -> Self {
        self.path_order = path_order;
        self
    }

    pub fn with_sources(mut self, sources: SourceScope) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_subsumer_threshold(mut self, subsumer_threshold: usize) -> Self {
        self.subsumer_threshold = subsumer_threshold;
        self
    }
}

impl fmt::Display for BleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "setting root: {}", self.root)?;
        writeln!(f, "setting root_zero: {}", self.root_zero)?;
        writeln!(f, "setting weight_property: {}", self.weight_property)?;
        writeln!(f, "setting subsumer_threshold: {}", self.subsumer_threshold)?;
        writeln!(f, "setting path_order: {}", self.path_order)?;
        write!(f, "setting sources: {}", self.sources)
    }
}
