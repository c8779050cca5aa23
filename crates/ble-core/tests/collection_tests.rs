use anyhow::Result;
use ble_core::{
    BasicLevelSelector, BleCollection, BleConfig, BleError, GraphDocument, NodeIndex, PathOrder,
    SourceNode, SourceScope, WeightProperty, WeightTable, WeightedGraph,
};
use std::collections::BTreeSet;

/// Nodes 0-7 rooted at 5:
///
/// ```text
/// 5 -> 4 -> 3, 5 -> 3
/// 3 -> 2 -> 1 -> 0, 3 -> 1
/// 3 -> 6 -> 7
/// ```
fn scenario() -> GraphDocument {
    let mut doc = GraphDocument::new();
    for (id, weight) in [(0, 0), (1, 1), (2, 10), (3, 5), (4, 4), (5, 1), (6, 4), (7, 1)] {
        doc.add_node(id.to_string(), format!("node {id}"), weight, vec![]);
    }
    for (parent, child) in [(5, 4), (4, 3), (3, 2), (2, 1), (3, 1), (5, 3), (3, 6), (6, 7), (1, 0)] {
        doc.add_edge(parent.to_string(), child.to_string());
    }
    doc
}

fn config(threshold: usize) -> BleConfig {
    BleConfig::new("5", WeightProperty::OccurrenceFrequency, threshold)
}

fn bl_id(collection: &BleCollection, source: &str) -> Option<String> {
    collection.basic_level_of(source).map(|bl| bl.id.clone())
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn initial_assignment_before_overlap_removal() -> Result<()> {
    let collection = BleCollection::new(&scenario(), config(0))?;
    let graph = collection.graph();
    let initial = collection.initial_assignment();

    let of = |id: &str| {
        graph
            .index_of(id)
            .and_then(|ix| initial[&ix].clone())
            .map(|bl| bl.id)
    };
    assert_eq!(of("0").as_deref(), Some("2"));
    assert_eq!(of("7").as_deref(), Some("3"));

    let three = initial[&graph.index_of("7").unwrap()].clone().unwrap();
    assert_eq!(three.depth, 1);
    assert_eq!(three.weight_value, 5);
    assert_eq!(three.num_descendants, 5);
    assert_eq!(three.cumulative_weight, 5 + 10 + 1 + 0 + 4 + 1);
    Ok(())
}

#[test]
fn nested_basic_level_is_replaced_below_threshold_zero() -> Result<()> {
    for order in [PathOrder::RootToLeaf, PathOrder::LeafToRoot] {
        let collection = BleCollection::new(&scenario(), config(0).with_path_order(order))?;

        assert_eq!(bl_id(&collection, "0").as_deref(), Some("2"), "{order}");
        assert_eq!(bl_id(&collection, "7").as_deref(), Some("6"), "{order}");

        let report = collection.resolution();
        assert_eq!(report.iterations, 1);
        assert_eq!(report.disqualified, vec!["3".to_string()]);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].source, "7");
        assert_eq!(report.changes[0].before.as_deref(), Some("3"));
        assert_eq!(report.changes[0].after.as_deref(), Some("6"));
    }
    Ok(())
}

#[test]
fn threshold_two_leaves_source_without_basic_level() -> Result<()> {
    for order in [PathOrder::RootToLeaf, PathOrder::LeafToRoot] {
        let collection = BleCollection::new(&scenario(), config(2).with_path_order(order))?;

        assert_eq!(bl_id(&collection, "0").as_deref(), Some("2"));
        assert_eq!(bl_id(&collection, "7"), None);

        let stats = collection.stats();
        assert_eq!(stats.nodes_with_bl, 1);
        assert_eq!(stats.nodes_without_bl, 1);
        assert_eq!(stats.unique_bls, 1);
    }
    Ok(())
}

#[test]
fn final_basic_levels_carry_depth_and_cumulative_weight() -> Result<()> {
    let collection = BleCollection::new(&scenario(), config(0))?;

    let two = collection.basic_level_of("0").unwrap();
    assert_eq!(two.label, "node 2");
    assert_eq!(two.depth, 2);
    assert_eq!(two.weight_value, 10);
    assert_eq!(two.num_descendants, 2);
    assert_eq!(
        two.descendants,
        BTreeSet::from(["0".to_string(), "1".to_string()])
    );
    assert_eq!(two.cumulative_weight, 11);

    let six = collection.basic_level_of("7").unwrap();
    assert_eq!(six.depth, 2);
    assert_eq!(six.weight_value, 4);
    assert_eq!(six.num_descendants, 1);
    assert_eq!(six.cumulative_weight, 5);

    assert!(collection.weights().is_disqualified(collection.graph().index_of("3").unwrap()));
    assert_eq!(collection.weights().original(collection.graph().index_of("3").unwrap()), 5);
    Ok(())
}

#[test]
fn resolving_again_changes_nothing() -> Result<()> {
    let mut collection = BleCollection::new(&scenario(), config(0))?;
    let before = collection.assignment().clone();

    let report = collection.resolve_overlaps()?;
    assert!(report.is_noop());
    assert!(report.changes.is_empty());
    assert_eq!(collection.assignment(), &before);
    Ok(())
}

#[test]
fn identical_input_gives_identical_output() -> Result<()> {
    let a = BleCollection::new(&scenario(), config(0))?.to_output();
    let b = BleCollection::new(&scenario(), config(0))?.to_output();
    assert_eq!(serde_json::to_string(&a)?, serde_json::to_string(&b)?);
    Ok(())
}

#[test]
fn output_document_lists_every_source() -> Result<()> {
    let output = BleCollection::new(&scenario(), config(2))?.to_output();
    let json = serde_json::to_value(&output)?;

    assert_eq!(json["settings"]["root"], "5");
    assert_eq!(json["assignments"]["0"]["id"], "2");
    assert_eq!(json["assignments"]["0"]["cumulative_weight"], 11);
    assert!(json["assignments"]["0"].get("descendants").is_none());
    assert!(json["assignments"]["7"].is_null());
    assert_eq!(json["resolution"]["disqualified"][0], "3");
    Ok(())
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn all_descendants_scope_assigns_inner_nodes() -> Result<()> {
    let collection = BleCollection::new(
        &scenario(),
        config(0).with_sources(SourceScope::AllDescendants),
    )?;

    let assignments = collection.assignments();
    assert_eq!(assignments.len(), 7);
    assert!(!assignments.contains_key("5"));

    assert_eq!(bl_id(&collection, "0").as_deref(), Some("2"));
    assert_eq!(bl_id(&collection, "1").as_deref(), Some("2"));
    assert_eq!(bl_id(&collection, "7").as_deref(), Some("6"));
    // 2 and 6 now peak at 4, which sits outside the disqualified subtree.
    assert_eq!(bl_id(&collection, "2"), None);
    assert_eq!(bl_id(&collection, "6"), None);
    assert_eq!(bl_id(&collection, "4"), None);
    assert_eq!(collection.stats().nodes_with_bl, 3);
    Ok(())
}

#[test]
fn root_weight_is_kept_without_root_zero() -> Result<()> {
    let collection = BleCollection::new(&scenario(), config(0).with_root_zero(false))?;
    let root = collection.graph().root();
    assert_eq!(collection.weights().get(root), 1);

    let zeroed = BleCollection::new(&scenario(), config(0))?;
    assert_eq!(zeroed.weights().get(root), 0);
    Ok(())
}

#[test]
fn feature_counts_can_drive_the_weights() -> Result<()> {
    let mut doc = GraphDocument::new();
    let features = |n: usize| (0..n).map(|i| format!("wdt:P{i}")).collect::<Vec<_>>();
    doc.add_node("r", "root", 0, features(9))
        .add_node("a", "a", 0, features(3))
        .add_node("b", "b", 0, features(1))
        .add_node("leaf", "leaf", 0, vec![])
        .add_edge("r", "a")
        .add_edge("a", "b")
        .add_edge("b", "leaf");

    let collection =
        BleCollection::new(&doc, BleConfig::new("r", WeightProperty::NumFeatures, 0))?;
    let bl = collection.basic_level_of("leaf").unwrap();
    assert_eq!(bl.id, "a");
    assert_eq!(bl.weight_value, 3);
    assert_eq!(bl.cumulative_weight, 4);

    let by_frequency = BleCollection::new(&doc, BleConfig::new("r", WeightProperty::OccurrenceFrequency, 0))?;
    assert!(by_frequency.basic_level_of("leaf").is_none());
    Ok(())
}

#[test]
fn threshold_sweep_reports_one_row_per_threshold() -> Result<()> {
    let rows = ble_core::overview_table(&scenario(), &config(0), &[0, 2])?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].subsumer_threshold, 0);
    assert_eq!(rows[0].stats.nodes_with_bl, 2);
    assert_eq!(rows[1].subsumer_threshold, 2);
    assert_eq!(rows[1].stats.nodes_with_bl, 1);
    Ok(())
}

// ============================================================================
// Candidate restriction
// ============================================================================

#[test]
fn excluded_first_maximum_yields_none_not_a_fallback() -> Result<()> {
    let mut doc = GraphDocument::new();
    for (id, weight) in [("r", 0), ("a", 5), ("b", 1), ("c", 4), ("d", 1), ("leaf", 0)] {
        doc.add_node(id, id, weight, vec![]);
    }
    doc.add_edge("r", "a")
        .add_edge("a", "b")
        .add_edge("b", "c")
        .add_edge("c", "d")
        .add_edge("d", "leaf");

    let graph = WeightedGraph::from_document(&doc, "r")?;
    let weights = WeightTable::new(&graph, WeightProperty::OccurrenceFrequency);
    let depths = graph.depths();
    let leaf = graph.index_of("leaf").unwrap();
    let a = graph.index_of("a").unwrap();
    let mut source = SourceNode::resolve(&graph, leaf, PathOrder::RootToLeaf)?;

    let selector = BasicLevelSelector::new(&graph, &weights, &depths, 0);
    let all: BTreeSet<NodeIndex> = graph.node_indices().collect();
    let with_a = selector.select([&mut source], &all);
    assert_eq!(with_a[&leaf].as_ref().map(|bl| bl.id.as_str()), Some("a"));

    let without_a: BTreeSet<NodeIndex> = all.iter().copied().filter(|&ix| ix != a).collect();
    let restricted = selector.select([&mut source], &without_a);
    assert_eq!(restricted[&leaf], None);
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn configuration_errors_surface_from_construction() {
    let err = BleCollection::new(&scenario(), BleConfig::new("99", WeightProperty::OccurrenceFrequency, 0))
        .unwrap_err();
    assert_eq!(err, BleError::UnknownRoot("99".into()));

    let mut doc = scenario();
    doc.add_edge("0", "5");
    assert!(matches!(
        BleCollection::new(&doc, config(0)).unwrap_err(),
        BleError::CyclicGraph(_)
    ));
}

#[test]
fn iteration_cap_reports_non_convergence() {
    let err = BleCollection::new(&scenario(), config(0).with_max_iterations(0)).unwrap_err();
    assert_eq!(err, BleError::NotConverged(0));

    assert!(BleCollection::new(&scenario(), config(0).with_max_iterations(1)).is_ok());
}

#[test]
fn huge_weights_saturate_instead_of_overflowing() -> Result<()> {
    let mut doc = GraphDocument::new();
    for (id, weight) in [("r", 0), ("a", u64::MAX), ("b", 1), ("c", 0)] {
        doc.add_node(id, id, weight, vec![]);
    }
    doc.add_edge("r", "a").add_edge("a", "b").add_edge("b", "c");

    let collection = BleCollection::new(&doc, BleConfig::new("r", WeightProperty::OccurrenceFrequency, 0))?;
    let bl = collection.basic_level_of("c").unwrap();
    assert_eq!(bl.id, "a");
    assert_eq!(bl.cumulative_weight, u64::MAX);
    assert_eq!(collection.stats().nodes_with_bl, 1);
    Ok(())
}
