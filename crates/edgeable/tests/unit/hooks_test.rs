//! Unit tests for create/delete hooks on nodes and edges.

use edgeable::{
    edge_hook, node_hook, GraphError, GraphStore, HookDecision, HookEvent, PropertyMap,
    PropertyValue,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_create_node_hook_can_mutate_node() {
    let store = GraphStore::in_memory();
    store
        .on_create_node(
            Some(node_hook(|node| {
                node.set_property("hooked", true).unwrap();
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    let a = store.put_node("A", PropertyMap::new()).unwrap();

    assert_eq!(a.get_property("hooked"), Some(PropertyValue::Bool(true)));
}

#[test]
fn test_create_node_hook_sees_initial_properties() {
    let store = GraphStore::in_memory();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    store
        .on_create_node(
            Some(node_hook(move |node| {
                *sink.lock().unwrap() = node.get_property("name");
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    store
        .put_node("A", PropertyMap::new().with("name", "Alpha"))
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), Some(PropertyValue::from("Alpha")));
}

#[test]
fn test_cancelled_node_is_not_created() {
    let store = GraphStore::in_memory();
    store
        .on_create_node(Some(node_hook(|_| HookDecision::Cancel)), Some("deny"))
        .unwrap();

    let result = store.put_node("A", PropertyMap::new());

    assert!(matches!(result, Err(GraphError::Cancelled { .. })));
    assert!(result.unwrap_err().is_cancelled());
    assert!(!store.has_node("A"));
}

#[test]
fn test_merge_does_not_fire_create_hook() {
    let store = GraphStore::in_memory();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store
        .on_create_node(
            Some(node_hook(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    store.put_node("A", PropertyMap::new()).unwrap();
    store.put_node("A", PropertyMap::new().with("k", 1i64)).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_replace_hook_by_key() {
    let store = GraphStore::in_memory();
    store
        .on_create_node(
            Some(node_hook(|n| {
                n.set_property("tag", "first").unwrap();
                HookDecision::Proceed
            })),
            Some("tagger"),
        )
        .unwrap();
    let key = store
        .on_create_node(
            Some(node_hook(|n| {
                n.set_property("tag", "second").unwrap();
                HookDecision::Proceed
            })),
            Some("tagger"),
        )
        .unwrap();

    assert_eq!(key, "tagger");
    assert_eq!(store.hook_count(HookEvent::CreateNode), 1);
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    assert_eq!(a.get_property("tag"), Some(PropertyValue::from("second")));
}

#[test]
fn test_remove_hook_with_none() {
    let store = GraphStore::in_memory();
    let key = store
        .on_create_node(Some(node_hook(|_| HookDecision::Cancel)), None)
        .unwrap();
    assert!(!key.is_empty());

    store.on_create_node(None, Some(&key)).unwrap();

    assert_eq!(store.hook_count(HookEvent::CreateNode), 0);
    assert!(store.put_node("A", PropertyMap::new()).is_ok());
}

#[test]
fn test_empty_hook_key_rejected() {
    let store = GraphStore::in_memory();
    let result = store.on_delete_node(Some(node_hook(|_| HookDecision::Proceed)), Some(""));

    assert!(matches!(result, Err(GraphError::InvalidArgument { .. })));
    assert_eq!(store.hook_count(HookEvent::DeleteNode), 0);
}

#[test]
fn test_first_cancel_stops_later_handlers() {
    let store = GraphStore::in_memory();
    let order = Arc::new(Mutex::new(Vec::new()));
    for (name, decision) in [
        ("one", HookDecision::Proceed),
        ("two", HookDecision::Cancel),
        ("three", HookDecision::Proceed),
    ] {
        let log = Arc::clone(&order);
        store
            .on_create_node(
                Some(node_hook(move |_| {
                    log.lock().unwrap().push(name);
                    decision
                })),
                Some(name),
            )
            .unwrap();
    }

    assert!(store.put_node("A", PropertyMap::new()).is_err());
    assert_eq!(*order.lock().unwrap(), vec!["one", "two"]);
}

#[test]
fn test_create_edge_hook_fires_for_mirror() {
    let store = GraphStore::in_memory();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    store
        .on_create_edge(
            Some(edge_hook(move |edge| {
                log.lock().unwrap().push(edge.to_string());
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();

    a.attach(&b, PropertyMap::new(), false).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["A->B", "B->A"]);
}

#[test]
fn test_cancelled_attach_leaves_no_edges() {
    let store = GraphStore::in_memory();
    store
        .on_create_edge(Some(edge_hook(|_| HookDecision::Cancel)), None)
        .unwrap();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();

    assert!(!a.attach(&b, PropertyMap::new(), false).unwrap());

    assert_eq!(store.edge_count(), 0);
}

#[test]
fn test_create_edge_hook_can_set_edge_property() {
    let store = GraphStore::in_memory();
    store
        .on_create_edge(
            Some(edge_hook(|edge| {
                edge.set_property("weight", 1.5, true).unwrap();
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();

    a.attach(&b, PropertyMap::new(), true).unwrap();

    assert_eq!(
        a.get_edge(&b).unwrap().get_property("weight"),
        Some(PropertyValue::Float(1.5))
    );
}

#[test]
fn test_cancelled_detach_keeps_edge() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new(), false).unwrap();
    store
        .on_delete_edge(Some(edge_hook(|_| HookDecision::Cancel)), Some("pin"))
        .unwrap();

    assert!(!a.detach(Some(&b), false).unwrap());
    assert!(a.has_edge(&b));
    assert!(b.has_edge(&a));

    store.on_delete_edge(None, Some("pin")).unwrap();
    assert!(a.detach(Some(&b), false).unwrap());
    assert_eq!(store.edge_count(), 0);
}

#[test]
fn test_delete_edge_hook_sees_live_edge() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new().with("km", 3i64), true).unwrap();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    store
        .on_delete_edge(
            Some(edge_hook(move |edge| {
                *sink.lock().unwrap() = edge.get_property("km");
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    a.detach(Some(&b), true).unwrap();

    assert_eq!(*seen.lock().unwrap(), Some(PropertyValue::Int(3)));
}

#[test]
fn test_cancelled_node_delete() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new(), false).unwrap();
    store
        .on_delete_node(Some(node_hook(|_| HookDecision::Cancel)), None)
        .unwrap();

    assert!(!a.delete().unwrap());

    assert!(a.exists());
    assert_eq!(store.edge_count(), 2);
}

#[test]
fn test_delete_node_fires_edge_hooks() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    a.attach(&b, PropertyMap::new(), false).unwrap();
    let removed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&removed);
    store
        .on_delete_edge(
            Some(edge_hook(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    assert!(a.delete().unwrap());

    assert_eq!(removed.load(Ordering::SeqCst), 2);
    assert!(b.edges().is_empty());
}

#[test]
fn test_delete_node_fires_hooks_for_inbound_edges() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    b.attach(&a, PropertyMap::new(), true).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store
        .on_delete_edge(
            Some(edge_hook(move |edge| {
                sink.lock().unwrap().push(edge.to_string());
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    assert!(a.delete().unwrap());

    assert_eq!(*seen.lock().unwrap(), vec!["B->A".to_string()]);
    assert!(b.edges().is_empty());
}

#[test]
fn test_vetoed_inbound_edge_still_goes_with_node() {
    let store = GraphStore::in_memory();
    let a = store.put_node("A", PropertyMap::new()).unwrap();
    let b = store.put_node("B", PropertyMap::new()).unwrap();
    b.attach(&a, PropertyMap::new(), true).unwrap();
    store
        .on_delete_edge(Some(edge_hook(|_| HookDecision::Cancel)), None)
        .unwrap();

    assert!(a.delete().unwrap());

    assert!(!store.has_node("A"));
    assert_eq!(store.edge_count(), 0);
}

#[test]
fn test_cancelled_node_fires_hooks_for_edges_given_by_hooks() {
    let store = GraphStore::in_memory();
    let hub = store.put_node("hub", PropertyMap::new()).unwrap();
    {
        let hub = hub.clone();
        store
            .on_create_node(
                Some(node_hook(move |node| {
                    node.attach(&hub, PropertyMap::new(), false).unwrap();
                    HookDecision::Proceed
                })),
                Some("link"),
            )
            .unwrap();
    }
    store
        .on_create_node(Some(node_hook(|_| HookDecision::Cancel)), Some("deny"))
        .unwrap();
    let removed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&removed);
    store
        .on_delete_edge(
            Some(edge_hook(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                HookDecision::Proceed
            })),
            None,
        )
        .unwrap();

    assert!(store.put_node("A", PropertyMap::new()).is_err());

    assert!(!store.has_node("A"));
    assert_eq!(removed.load(Ordering::SeqCst), 2);
    assert!(hub.edges().is_empty());
}
