//! Wikidata event-type hierarchy ingestion.
//!
//! Reads the cached results of the Wikidata relation queries (no network
//! access) and turns them into a [`ble_core::GraphDocument`]: one node per
//! labelled event type, weighted by the number of incidents typed with it,
//! with `subclass of` edges pointing from super type to subtype.

pub mod collection;
pub mod error;
pub mod relations;

pub use collection::{title_id, EventType, EventTypeCollection, Incident, IngestOptions, Property};
pub use error::{IngestError, Result};
pub use relations::{read_pairs, CacheFiles, Pairs, Relations};

/// Default root of the Wikidata event hierarchy (`occurrence`).
pub const EVENT_ROOT: &str = "wd:Q1656682";
