//! Cached SPARQL results.
//!
//! Each file holds a JSON array of `[left, right]` string pairs, one per
//! result row of the corresponding Wikidata query.

use crate::error::{IngestError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub type Pairs = Vec<(String, String)>;

/// Locations of the six relation files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFiles {
    /// `[sub, super]`
    pub subclass_of: PathBuf,
    /// `[event_type, incident]`
    pub instance_of: PathBuf,
    /// `[incident, label]`
    pub inc_to_labels: PathBuf,
    /// `[incident, property]`
    pub inc_to_props: PathBuf,
    /// `[event_type, label]`
    pub event_type_to_labels: PathBuf,
    /// `[property, label]`
    pub prop_to_labels: PathBuf,
}

impl CacheFiles {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            subclass_of: dir.join("subclass_of.json"),
            instance_of: dir.join("instance_of.json"),
            inc_to_labels: dir.join("inc_to_labels.json"),
            inc_to_props: dir.join("inc_to_props.json"),
            event_type_to_labels: dir.join("event_type_to_labels.json"),
            prop_to_labels: dir.join("prop_to_labels.json"),
        }
    }
}

/// Raw relation pairs, as loaded from [`CacheFiles`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    pub subclass_of: Pairs,
    pub instance_of: Pairs,
    pub inc_to_labels: Pairs,
    pub inc_to_props: Pairs,
    pub event_type_to_labels: Pairs,
    pub prop_to_labels: Pairs,
}

impl Relations {
    pub fn load(files: &CacheFiles) -> Result<Self> {
        Ok(Self {
            subclass_of: read_pairs(&files.subclass_of)?,
            instance_of: read_pairs(&files.instance_of)?,
            inc_to_labels: read_pairs(&files.inc_to_labels)?,
            inc_to_props: read_pairs(&files.inc_to_props)?,
            event_type_to_labels: read_pairs(&files.event_type_to_labels)?,
            prop_to_labels: read_pairs(&files.prop_to_labels)?,
        })
    }
}

pub fn read_pairs(path: &Path) -> Result<Pairs> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pairs: Pairs = serde_json::from_str(&text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = pairs.len(), "loaded relation file");
    Ok(pairs)
}
