//! Graph traversal algorithms.
//!
//! Provides shortest-route search, alternate-route discovery and weighted
//! neighbor reachability. Route search works on a borrowed `GraphState`;
//! neighbor search reads adjacency through a closure. Both return node ids,
//! which [`Node`](super::Node) wraps into handles.
//!
//! Neighbors are always expanded in adjacency insertion order, so results are
//! deterministic for a fixed graph and insertion history.

use super::property::PropertyMap;
use super::types::{EdgeView, GraphState, NodeId};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Breadth-first shortest route by hop count.
///
/// Each node is visited at most once. Nodes in `skip` are never enqueued,
/// except `destination` itself which stays reachable.
///
/// # Returns
/// The ordered ids `source ..= destination`, `[source]` when both are the
/// same node, or `None` if no route exists or `source` is missing.
pub fn find_route(
    state: &GraphState,
    source: &NodeId,
    destination: &NodeId,
    skip: &HashSet<NodeId>,
) -> Option<Vec<NodeId>> {
    if !state.nodes.contains_key(source) {
        return None;
    }
    if source == destination {
        return Some(vec![source.clone()]);
    }

    // Predecessor map; the source maps to itself.
    let mut previous: HashMap<&NodeId, &NodeId> = HashMap::new();
    let mut queue = VecDeque::new();
    previous.insert(source, source);
    queue.push_back(source);

    'search: while let Some(current) = queue.pop_front() {
        let Some(record) = state.nodes.get(current) else {
            continue;
        };
        for next in record.edges.keys() {
            if previous.contains_key(next) || (next != destination && skip.contains(next)) {
                continue;
            }
            previous.insert(next, current);
            if next == destination {
                break 'search;
            }
            queue.push_back(next);
        }
    }

    if !previous.contains_key(destination) {
        return None;
    }
    let mut route = vec![destination.clone()];
    let mut step = destination;
    while step != source {
        step = previous[step];
        route.push(step.clone());
    }
    route.reverse();
    Some(route)
}

/// Discover a family of alternate routes.
///
/// Starts from the shortest route, then re-runs [`find_route`] with skip-sets
/// grown one intermediate node at a time from each route found. Skip-sets are
/// explored breadth first and never grow beyond `effort` nodes; a skip-set
/// already explored in another order is not explored again. Routes are
/// deduplicated and returned in discovery order.
///
/// `effort` bounds exploration, not output: the number of routes returned
/// depends on the graph's shape.
pub fn find_routes(
    state: &GraphState,
    source: &NodeId,
    destination: &NodeId,
    effort: usize,
) -> Vec<Vec<NodeId>> {
    let mut routes: Vec<Vec<NodeId>> = Vec::new();
    let mut explored: HashSet<BTreeSet<NodeId>> = HashSet::new();
    let mut queue: VecDeque<BTreeSet<NodeId>> = VecDeque::new();
    queue.push_back(BTreeSet::new());

    while let Some(skip) = queue.pop_front() {
        if !explored.insert(skip.clone()) {
            continue;
        }
        let skip_lookup: HashSet<NodeId> = skip.iter().cloned().collect();
        let Some(route) = find_route(state, source, destination, &skip_lookup) else {
            continue;
        };

        if skip.len() < effort {
            for step in &route {
                if step != source && step != destination && !skip.contains(step) {
                    let mut next = skip.clone();
                    next.insert(step.clone());
                    queue.push_back(next);
                }
            }
        }
        if !routes.contains(&route) {
            routes.push(route);
        }
    }
    routes
}

/// Outbound adjacency of `id` as owned pairs, or `None` if the node is missing.
pub fn adjacency(state: &GraphState, id: &NodeId) -> Option<Vec<(NodeId, PropertyMap)>> {
    state.nodes.get(id).map(|record| {
        record
            .edges
            .iter()
            .map(|(next, edge)| (next.clone(), edge.properties.clone()))
            .collect()
    })
}

/// Nodes reachable from `source` within a cumulative `distance`.
///
/// Each traversed edge adds `distance_fn(edge)` to the distance of the node
/// it leaves from. A node is included, and expanded, the first time it is
/// reached within budget; NaN weights make an edge impassable. The source is
/// never included.
///
/// The graph is read through `adjacency`, one node at a time, so callers can
/// release any lock they hold before `distance_fn` runs.
///
/// Discovery follows insertion order rather than a priority queue, so under
/// non-uniform weights the reported set is not guaranteed to be the minimal
/// cost closure.
pub fn find_neighbors<A, F>(
    source: &NodeId,
    distance: f64,
    mut adjacency: A,
    distance_fn: F,
) -> Vec<NodeId>
where
    A: FnMut(&NodeId) -> Option<Vec<(NodeId, PropertyMap)>>,
    F: Fn(&EdgeView<'_>) -> f64,
{
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<(NodeId, f64)> = VecDeque::new();
    let mut result = Vec::new();

    visited.insert(source.clone());
    queue.push_back((source.clone(), 0.0));

    while let Some((current, travelled)) = queue.pop_front() {
        let Some(edges) = adjacency(&current) else {
            continue;
        };
        for (next, properties) in edges {
            if visited.contains(&next) {
                continue;
            }
            let view = EdgeView {
                source: &current,
                destination: &next,
                properties: &properties,
            };
            let total = travelled + distance_fn(&view);
            // `!(a <= b)` also rejects NaN
            if !(total <= distance) {
                continue;
            }
            visited.insert(next.clone());
            result.push(next.clone());
            queue.push_back((next, total));
        }
    }
    result
}
