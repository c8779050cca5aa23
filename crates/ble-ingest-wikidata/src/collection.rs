//! Wikidata event types, incidents and properties.

use crate::error::Result;
use crate::relations::{CacheFiles, Pairs, Relations};
use ble_core::{GraphDocument, Weight};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Records
// ============================================================================

/// Last path segment of an entity URI, e.g. `Q40231`.
pub fn title_id(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// A property such as `country` (`wdt:P17`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub title_label: String,
    pub title_id: String,
    pub full_uri: String,
    pub prefix_uri: String,
}

/// An incident such as `2014 Acre gubernatorial election` (`wd:Q51336711`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub title_label: String,
    pub title_id: String,
    pub full_uri: String,
    pub prefix_uri: String,
    /// Prefixed URIs of the known properties of the incident.
    pub properties: BTreeSet<String>,
}

/// An event type such as `election` (`wd:Q40231`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub title_label: String,
    pub title_id: String,
    pub full_uri: String,
    pub prefix_uri: String,
    /// Full URIs of the kept incidents typed with this event type.
    pub incidents: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// An incident is kept only if it has every one of these properties,
    /// given as full or `wdt:`-prefixed URIs.
    pub needed_properties: BTreeSet<String>,
    /// Leaves with fewer incidents are pruned, repeatedly, until every leaf
    /// reaches the minimum.
    pub min_leaf_incident_freq: Weight,
}

// ============================================================================
// Collection
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTypeCollection {
    pub properties: BTreeMap<String, Property>,
    pub incidents: BTreeMap<String, Incident>,
    pub event_types: BTreeMap<String, EventType>,
    /// `(sub, super)` pairs between known event types.
    pub subclass_of: Vec<(String, String)>,
    options: IngestOptions,
}

impl EventTypeCollection {
    pub fn load(files: &CacheFiles, options: IngestOptions) -> Result<Self> {
        let relations = Relations::load(files)?;
        Ok(Self::from_relations(&relations, options))
    }

    pub fn from_relations(relations: &Relations, options: IngestOptions) -> Self {
        let properties: BTreeMap<String, Property> = group(&relations.prop_to_labels)
            .into_iter()
            .filter_map(|(uri, labels)| {
                let label = labels.into_iter().next()?;
                let id = title_id(uri).to_string();
                Some((
                    uri.to_string(),
                    Property {
                        title_label: label.to_string(),
                        prefix_uri: format!("wdt:{id}"),
                        title_id: id,
                        full_uri: uri.to_string(),
                    },
                ))
            })
            .collect();
        tracing::info!(count = properties.len(), "found different properties");

        let incident_props = group(&relations.inc_to_props);
        let mut incidents = BTreeMap::new();
        let mut skipped = 0usize;
        for (uri, labels) in group(&relations.inc_to_labels) {
            let props = incident_props.get(uri).cloned().unwrap_or_default();
            let has = |needed: &str| {
                props
                    .iter()
                    .any(|p| *p == needed || format!("wdt:{}", title_id(p)) == needed)
            };
            if !options.needed_properties.iter().all(|needed| has(needed.as_str())) {
                skipped += 1;
                continue;
            }

            let Some(label) = labels.into_iter().next() else {
                continue;
            };
            let id = title_id(uri).to_string();
            incidents.insert(
                uri.to_string(),
                Incident {
                    title_label: label.to_string(),
                    prefix_uri: format!("wd:{id}"),
                    title_id: id,
                    full_uri: uri.to_string(),
                    properties: props
                        .iter()
                        .filter_map(|p| properties.get(*p))
                        .map(|p| p.prefix_uri.clone())
                        .collect(),
                },
            );
        }
        tracing::info!(count = incidents.len(), skipped, "instantiated incidents");

        let typed_incidents = group(&relations.instance_of);
        let mut event_types = BTreeMap::new();
        for (uri, labels) in group(&relations.event_type_to_labels) {
            let Some(label) = labels.into_iter().next() else {
                continue;
            };
            let id = title_id(uri).to_string();
            let kept: BTreeSet<String> = typed_incidents
                .get(uri)
                .map(|incs| {
                    incs.iter()
                        .filter(|inc| incidents.contains_key(**inc))
                        .map(|inc| inc.to_string())
                        .collect()
                })
                .unwrap_or_default();
            event_types.insert(
                uri.to_string(),
                EventType {
                    title_label: label.to_string(),
                    prefix_uri: format!("wd:{id}"),
                    title_id: id,
                    full_uri: uri.to_string(),
                    incidents: kept,
                },
            );
        }
        tracing::info!(count = event_types.len(), "instantiated event types");

        let subclass_of: BTreeSet<(String, String)> = relations
            .subclass_of
            .iter()
            .filter(|(sub, sup)| {
                sub != sup && event_types.contains_key(sub) && event_types.contains_key(sup)
            })
            .cloned()
            .collect();

        Self {
            properties,
            incidents,
            event_types,
            subclass_of: subclass_of.into_iter().collect(),
            options,
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Event-type graph for basic-level selection.
    ///
    /// Node ids are the `wd:` prefixed URIs, weights are incident counts and
    /// features the sorted properties seen on those incidents. Edges run from
    /// super type to subtype.
    pub fn to_graph_document(&self) -> GraphDocument {
        let mut children: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (sub, sup) in &self.subclass_of {
            children.entry(sup.as_str()).or_default().insert(sub.as_str());
        }

        let kept = self.prune_leaves(&children);

        let mut doc = GraphDocument::new();
        for (uri, event_type) in &self.event_types {
            if !kept.contains(uri.as_str()) {
                continue;
            }
            let features: BTreeSet<&str> = event_type
                .incidents
                .iter()
                .filter_map(|inc| self.incidents.get(inc))
                .flat_map(|inc| inc.properties.iter().map(String::as_str))
                .collect();
            doc.add_node(
                event_type.prefix_uri.clone(),
                event_type.title_label.clone(),
                event_type.incidents.len() as Weight,
                features.into_iter().map(str::to_string).collect(),
            );
        }

        for (sup, subs) in &children {
            for sub in subs {
                if kept.contains(sup) && kept.contains(sub) {
                    doc.add_edge(
                        self.event_types[*sup].prefix_uri.clone(),
                        self.event_types[*sub].prefix_uri.clone(),
                    );
                }
            }
        }

        tracing::info!(
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            "built event type graph"
        );
        doc
    }

    fn prune_leaves<'a>(&'a self, children: &BTreeMap<&'a str, BTreeSet<&'a str>>) -> BTreeSet<&'a str> {
        let mut kept: BTreeSet<&str> = self.event_types.keys().map(String::as_str).collect();
        let min = self.options.min_leaf_incident_freq;
        if min == 0 {
            return kept;
        }

        let mut round = 0;
        loop {
            let doomed: Vec<&str> = kept
                .iter()
                .copied()
                .filter(|uri| {
                    let is_leaf = children
                        .get(uri)
                        .map_or(true, |subs| subs.iter().all(|sub| !kept.contains(sub)));
                    is_leaf && (self.event_types[*uri].incidents.len() as Weight) < min
                })
                .collect();
            if doomed.is_empty() {
                break;
            }
            round += 1;
            tracing::debug!(round, removed = doomed.len(), "pruned infrequent leaves");
            for uri in doomed {
                kept.remove(uri);
            }
        }
        kept
    }
}

/// Group pairs by their left element; right elements come out sorted.
fn group(pairs: &Pairs) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (left, right) in pairs {
        out.entry(left.as_str()).or_default().insert(right.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY: &str = "http://www.wikidata.org/entity/";
    const PROP: &str = "http://www.wikidata.org/prop/direct/";

    fn e(id: &str) -> String {
        format!("{ENTITY}{id}")
    }

    fn p(id: &str) -> String {
        format!("{PROP}{id}")
    }

    fn pairs(rows: &[(String, &str)]) -> Pairs {
        rows.iter().map(|(l, r)| (l.clone(), r.to_string())).collect()
    }

    /// event (Q1) > election (Q2) > {by-election (Q3), referendum (Q4)}
    fn relations() -> Relations {
        Relations {
            subclass_of: vec![
                (e("Q2"), e("Q1")),
                (e("Q3"), e("Q2")),
                (e("Q4"), e("Q2")),
                (e("Q9"), e("Q2")),
            ],
            instance_of: vec![
                (e("Q3"), e("Q31")),
                (e("Q3"), e("Q32")),
                (e("Q4"), e("Q41")),
                (e("Q2"), e("Q21")),
            ],
            inc_to_labels: pairs(&[
                (e("Q31"), "2014 Acre gubernatorial election"),
                (e("Q32"), "by-election 2"),
                (e("Q41"), "referendum 1"),
                (e("Q21"), "election 1"),
            ]),
            inc_to_props: vec![
                (e("Q31"), p("P17")),
                (e("Q31"), p("P585")),
                (e("Q32"), p("P17")),
                (e("Q41"), p("P585")),
                (e("Q21"), p("P999")),
            ],
            event_type_to_labels: pairs(&[
                (e("Q1"), "occurrence"),
                (e("Q1"), "event"),
                (e("Q2"), "election"),
                (e("Q3"), "by-election"),
                (e("Q4"), "referendum"),
            ]),
            prop_to_labels: pairs(&[(p("P17"), "country"), (p("P585"), "point in time")]),
        }
    }

    fn node<'a>(doc: &'a GraphDocument, id: &str) -> &'a ble_core::NodeRecord {
        doc.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn records_take_smallest_label_and_prefixed_ids() {
        let collection = EventTypeCollection::from_relations(&relations(), IngestOptions::default());

        let event = &collection.event_types[&e("Q1")];
        assert_eq!(event.title_label, "event");
        assert_eq!(event.prefix_uri, "wd:Q1");
        assert_eq!(collection.properties[&p("P17")].prefix_uri, "wdt:P17");

        // Unknown properties are dropped from incidents.
        assert!(collection.incidents[&e("Q21")].properties.is_empty());
        // Q9 has no label, so its subclass edge is discarded.
        assert_eq!(collection.subclass_of.len(), 3);
    }

    #[test]
    fn graph_document_carries_counts_and_features() {
        let doc = EventTypeCollection::from_relations(&relations(), IngestOptions::default())
            .to_graph_document();

        assert_eq!(doc.nodes.len(), 4);
        let by_election = node(&doc, "wd:Q3");
        assert_eq!(by_election.occurrence_frequency, Some(2));
        assert_eq!(
            by_election.features,
            Some(vec!["wdt:P17".to_string(), "wdt:P585".to_string()])
        );
        assert!(doc
            .edges
            .iter()
            .any(|edge| edge.parent == "wd:Q2" && edge.child == "wd:Q3"));
    }

    #[test]
    fn needed_properties_filter_incidents() {
        let options = IngestOptions {
            needed_properties: BTreeSet::from(["wdt:P17".to_string()]),
            ..IngestOptions::default()
        };
        let collection = EventTypeCollection::from_relations(&relations(), options);
        assert_eq!(collection.incidents.len(), 2);

        let doc = collection.to_graph_document();
        assert_eq!(node(&doc, "wd:Q4").occurrence_frequency, Some(0));
        assert_eq!(node(&doc, "wd:Q3").occurrence_frequency, Some(2));

        let by_full_uri = IngestOptions {
            needed_properties: BTreeSet::from([p("P585")]),
            ..IngestOptions::default()
        };
        assert_eq!(
            EventTypeCollection::from_relations(&relations(), by_full_uri).incidents.len(),
            2
        );
    }

    #[test]
    fn infrequent_leaves_are_pruned_repeatedly() {
        let options = IngestOptions {
            min_leaf_incident_freq: 2,
            ..IngestOptions::default()
        };
        let doc = EventTypeCollection::from_relations(&relations(), options).to_graph_document();
        let ids: Vec<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
        // Q4 (1 incident) goes; Q2 keeps Q3 below it and survives.
        assert_eq!(ids, ["wd:Q1", "wd:Q2", "wd:Q3"]);

        let options = IngestOptions {
            min_leaf_incident_freq: 3,
            ..IngestOptions::default()
        };
        let doc = EventTypeCollection::from_relations(&relations(), options).to_graph_document();
        assert!(doc.nodes.is_empty());
        assert!(doc.edges.is_empty());
    }
}
