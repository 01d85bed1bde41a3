//! Unit tests for GraphStore node management and store properties.

use edgeable::{GraphError, GraphStore, NodeId, PropertyMap, PropertyValue, StoreConfig};

#[test]
fn test_put_node_creates_node() {
    let store = GraphStore::in_memory();
    let node = store
        .put_node("A", PropertyMap::new().with("name", "Alpha"))
        .unwrap();

    assert_eq!(node.id(), &NodeId::from("A"));
    assert!(store.has_node("A"));
    assert_eq!(store.node_count(), 1);
    assert_eq!(
        store.get_node("A").unwrap().get_property("name"),
        Some(PropertyValue::String("Alpha".to_string()))
    );
}

#[test]
fn test_put_node_twice_merges() {
    let store = GraphStore::in_memory();
    store
        .put_node("A", PropertyMap::new().with("k1", "v1").with("k2", "old"))
        .unwrap();
    store
        .put_node("A", PropertyMap::new().with("k2", "new").with("k3", "v3"))
        .unwrap();

    let props = store.get_node("A").unwrap().get_properties();
    assert_eq!(props.get_string("k1"), Some("v1"));
    assert_eq!(props.get_string("k2"), Some("new"));
    assert_eq!(props.get_string("k3"), Some("v3"));
    assert_eq!(store.node_count(), 1);
}

#[test]
fn test_get_missing_node() {
    let store = GraphStore::in_memory();
    assert!(store.get_node("missing").is_none());
    assert!(!store.has_node(5));
}

#[test]
fn test_empty_id_rejected() {
    let store = GraphStore::in_memory();
    let result = store.put_node("", PropertyMap::new());

    assert!(matches!(result, Err(GraphError::InvalidArgument { .. })));
    assert_eq!(store.node_count(), 0);
}

#[test]
fn test_get_nodes_in_insertion_order() {
    let store = GraphStore::in_memory();
    for (i, id) in ["C", "A", "B"].iter().enumerate() {
        store
            .put_node(*id, PropertyMap::new().with("rank", i as i64))
            .unwrap();
    }

    let all: Vec<String> = store
        .get_nodes(|_| true)
        .iter()
        .map(|n| n.id().to_string())
        .collect();
    assert_eq!(all, vec!["C", "A", "B"]);

    let ranked = store.get_nodes(|n| n.get_properties().get_int("rank") >= Some(1));
    assert_eq!(ranked.len(), 2);
}

#[test]
fn test_predicate_may_read_the_store() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    store.put_node("C", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new(), false).unwrap();

    let connected = store.get_nodes(|n| !n.edges().is_empty());
    assert_eq!(connected, vec![a, b]);
}

#[test]
fn test_counts_and_clear() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    let c = store.put_node("C", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new(), false).unwrap();
    a.attach(&c, PropertyMap::new(), true).unwrap();
    store.set_property("owner", "ops").unwrap();

    assert_eq!(store.node_count(), 3);
    assert_eq!(store.edge_count(), 3);

    store.clear().unwrap();

    assert_eq!(store.node_count(), 0);
    assert_eq!(store.edge_count(), 0);
    assert!(store.has_property("owner"));
}

#[test]
fn test_store_properties() {
    let store = GraphStore::in_memory();
    store.set_property("name", "routes").unwrap();
    store
        .set_properties(&PropertyMap::new().with("version", 2i64).with("name", "roads"))
        .unwrap();

    assert_eq!(
        store.get_property("name"),
        Some(PropertyValue::String("roads".to_string()))
    );
    assert!(store.has_property("version"));
    assert_eq!(
        store.delete_property("version").unwrap(),
        Some(PropertyValue::Int(2))
    );
    assert!(!store.has_property("version"));
    assert_eq!(store.delete_property("version").unwrap(), None);
}

#[test]
fn test_store_properties_are_copies() {
    let store = GraphStore::in_memory();
    store.set_property("k", 1i64).unwrap();

    let mut props = store.get_properties();
    props.insert("k", 2i64);

    assert_eq!(store.get_property("k"), Some(PropertyValue::Int(1)));
}

#[test]
fn test_store_property_empty_key_rejected() {
    let store = GraphStore::in_memory();
    assert!(store.set_property("", 1i64).is_err());
    assert!(store
        .set_properties(&PropertyMap::new().with("ok", 1i64).with("", 2i64))
        .is_err());
    assert!(store.get_properties().is_empty());
}

#[test]
fn test_config_properties_seed_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = StoreConfig::new()
        .with_snapshot_path(dir.path().join("graph.db"))
        .with_property("region", "eu");

    let store = GraphStore::open(config).unwrap();

    assert_eq!(
        store.get_property("region"),
        Some(PropertyValue::String("eu".to_string()))
    );
    assert_eq!(store.snapshot_path(), Some(dir.path().join("graph.db")));
}

#[test]
fn test_clones_share_state() {
    let store = GraphStore::in_memory();
    let other = store.clone();
    store.put_node("A", PropertyMap::new()).unwrap();

    assert!(other.has_node("A"));
}
