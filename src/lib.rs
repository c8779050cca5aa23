//! Basic Level Event taxonomy toolkit.
//!
//! Facade over the workspace crates:
//! - [`core`]: weighted event-type graphs and basic-level selection
//! - [`wikidata`]: graph construction from cached Wikidata relation files

pub use ble_core as core;
pub use ble_ingest_wikidata as wikidata;
