//! Node handles.
//!
//! A [`Node`] is a store handle plus an id. It owns nothing; every call looks
//! the node up in the store, so a handle outlives the node it names. Writes
//! through a handle to a deleted node fail with [`GraphError::NodeNotFound`],
//! reads return absent values.

use super::algorithms;
use super::edge::Edge;
use super::hooks::run_hooks;
use super::property::{validate_key, PropertyMap, PropertyValue};
use super::store::GraphStore;
use super::types::{EdgeRecord, EdgeView, NodeId};
use crate::error::{GraphError, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

/// Default skip-set bound for [`Node::find_routes_to`].
pub const DEFAULT_ROUTE_EFFORT: usize = 5;

/// Handle to a node in a [`GraphStore`].
///
/// Two handles are equal when they name the same id.
#[derive(Clone)]
pub struct Node {
    store: GraphStore,
    id: NodeId,
}

impl Node {
    pub(crate) fn new(store: GraphStore, id: NodeId) -> Self {
        Self { store, id }
    }

    /// The node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The store this node belongs to.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Whether the node is still in the store.
    pub fn exists(&self) -> bool {
        let _admission = self.store.guard().acquire_read();
        self.store.contains(&self.id)
    }

    // ===== Edges =====

    /// Connect this node to `destination`.
    ///
    /// Returns `false` without doing anything for a self-attach. If the edge
    /// already exists, `properties` are merged into it and `false` is
    /// returned without firing hooks. Otherwise the edge is committed, the
    /// create-edge hooks run (a veto removes it again and returns `false`),
    /// and `true` is returned.
    ///
    /// Unless `directed`, the mirror edge `destination -> self` is attached
    /// with the same properties as a directed attach.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either endpoint is missing and
    /// [`GraphError::InvalidArgument`] for an empty property key or a
    /// destination from a different store.
    pub fn attach(&self, destination: &Node, properties: PropertyMap, directed: bool) -> Result<bool> {
        properties.validate()?;
        if !self.store.same_store(&destination.store) {
            return Err(GraphError::invalid_argument(format!(
                "cannot attach '{}' to '{}' from another store",
                self.id, destination.id
            )));
        }
        let _admission = self.store.guard().acquire_write()?;
        if destination.id == self.id {
            return Ok(false);
        }

        let existed = {
            let mut state = self.store.state_mut();
            if !state.nodes.contains_key(&destination.id) {
                return Err(GraphError::NodeNotFound {
                    node_id: destination.id.to_string(),
                });
            }
            let node = state
                .nodes
                .get_mut(&self.id)
                .ok_or_else(|| self.not_found())?;
            match node.edges.get_mut(&destination.id) {
                Some(edge) => {
                    edge.properties.merge(&properties);
                    true
                }
                None => {
                    node.edges.insert(
                        destination.id.clone(),
                        EdgeRecord {
                            properties: properties.clone(),
                        },
                    );
                    false
                }
            }
        };

        let created = if existed {
            false
        } else {
            info!("attach '{}' -> '{}'", self.id, destination.id);
            let edge = Edge::new(self.store.clone(), self.id.clone(), destination.id.clone());
            let handlers = self.store.hooks().create_edge.handlers();
            if run_hooks(&handlers, &edge).is_cancel() {
                debug!("attach '{}' -> '{}' cancelled by hook", self.id, destination.id);
                self.store.remove_edge_record(&self.id, &destination.id);
                return Ok(false);
            }
            true
        };

        if !directed {
            destination.attach(self, properties, true)?;
        }
        Ok(created)
    }

    /// Disconnect this node.
    ///
    /// With `Some(destination)` the edge to it is removed after the
    /// delete-edge hooks agree; unless `directed`, the mirror edge is removed
    /// too if it still exists. With `None` every outbound edge is detached
    /// that way. Returns `true` if an outbound edge was detached; removing
    /// only a leftover mirror returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if this node is missing.
    pub fn detach(&self, destination: Option<&Node>, directed: bool) -> Result<bool> {
        let _admission = self.store.guard().acquire_write()?;
        if !self.store.contains(&self.id) {
            return Err(self.not_found());
        }
        match destination {
            Some(destination) => Ok(self.detach_from(&destination.id, directed)),
            None => {
                let mut detached = false;
                for destination in self.destination_ids() {
                    detached |= self.detach_from(&destination, directed);
                }
                Ok(detached)
            }
        }
    }

    /// Delete this node and every edge referencing it.
    ///
    /// Returns `false` if a delete-node hook vetoed the deletion. Outbound
    /// edges with their mirrors, then the remaining inbound edges, are each
    /// removed through the delete-edge hooks. An edge whose removal a hook
    /// vetoed is dropped with the node anyway, since an edge may never
    /// outlive its endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node is already gone.
    pub fn delete(&self) -> Result<bool> {
        let _admission = self.store.guard().acquire_write()?;
        if !self.store.contains(&self.id) {
            return Err(self.not_found());
        }
        let handlers = self.store.hooks().delete_node.handlers();
        if run_hooks(&handlers, self).is_cancel() {
            debug!("delete node '{}' cancelled by hook", self.id);
            return Ok(false);
        }

        self.release_edges();
        self.store.purge_node(&self.id);
        info!("delete node '{}'", self.id);
        Ok(true)
    }

    /// The edge to `destination`, if any.
    pub fn get_edge(&self, destination: &Node) -> Option<Edge> {
        let _admission = self.store.guard().acquire_read();
        self.edge_handles()
            .into_iter()
            .find(|edge| edge.destination_id() == &destination.id)
    }

    /// Whether an edge to `destination` exists.
    pub fn has_edge(&self, destination: &Node) -> bool {
        self.get_edge(destination).is_some()
    }

    /// Outbound edges in attach order.
    pub fn edges(&self) -> Vec<Edge> {
        let _admission = self.store.guard().acquire_read();
        self.edge_handles()
    }

    /// Outbound edges accepted by `predicate`, in attach order.
    pub fn get_edges(&self, predicate: impl Fn(&Edge) -> bool) -> Vec<Edge> {
        let _admission = self.store.guard().acquire_read();
        self.edge_handles()
            .into_iter()
            .filter(|edge| predicate(edge))
            .collect()
    }

    // ===== Properties =====

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<PropertyValue> {
        let _admission = self.store.guard().acquire_read();
        self.store
            .state()
            .nodes
            .get(&self.id)
            .and_then(|node| node.properties.get(key).cloned())
    }

    /// Copy of all properties; empty if the node is gone.
    pub fn get_properties(&self) -> PropertyMap {
        let _admission = self.store.guard().acquire_read();
        self.store
            .state()
            .nodes
            .get(&self.id)
            .map(|node| node.properties.clone())
            .unwrap_or_default()
    }

    /// Check if a property exists.
    pub fn has_property(&self, key: &str) -> bool {
        let _admission = self.store.guard().acquire_read();
        self.store
            .state()
            .nodes
            .get(&self.id)
            .is_some_and(|node| node.properties.contains_key(key))
    }

    /// Add or update a property.
    pub fn set_property(&self, key: &str, value: impl Into<PropertyValue>) -> Result<()> {
        validate_key(key)?;
        let _admission = self.store.guard().acquire_write()?;
        let mut state = self.store.state_mut();
        let node = state.nodes.get_mut(&self.id).ok_or_else(|| self.not_found())?;
        node.properties.insert(key, value);
        Ok(())
    }

    /// Merge `properties` into the node's properties.
    pub fn set_properties(&self, properties: &PropertyMap) -> Result<()> {
        properties.validate()?;
        let _admission = self.store.guard().acquire_write()?;
        let mut state = self.store.state_mut();
        let node = state.nodes.get_mut(&self.id).ok_or_else(|| self.not_found())?;
        node.properties.merge(properties);
        Ok(())
    }

    /// Remove a property, returning its value if it was set.
    pub fn delete_property(&self, key: &str) -> Result<Option<PropertyValue>> {
        let _admission = self.store.guard().acquire_write()?;
        let mut state = self.store.state_mut();
        let node = state.nodes.get_mut(&self.id).ok_or_else(|| self.not_found())?;
        Ok(node.properties.remove(key))
    }

    // ===== Routes =====

    /// Shortest route by hop count from this node to `destination`.
    ///
    /// Nodes in `skip` are never stepped through, though `destination` stays
    /// reachable even if listed. Returns `None` when no route exists.
    pub fn find_route_to(&self, destination: &Node, skip: &[NodeId]) -> Option<Vec<Node>> {
        let _admission = self.store.guard().acquire_read();
        let skip: HashSet<NodeId> = skip.iter().cloned().collect();
        let route = algorithms::find_route(&self.store.state(), &self.id, &destination.id, &skip);
        route.map(|ids| self.handles(ids))
    }

    /// A family of alternate routes to `destination`, shortest first.
    ///
    /// Alternates are found by re-running the shortest-route search with
    /// intermediate nodes of earlier routes excluded. `effort` bounds how many
    /// nodes may be excluded at once; it limits exploration, not the number of
    /// routes returned.
    pub fn find_routes_to(&self, destination: &Node, effort: usize) -> Vec<Vec<Node>> {
        let _admission = self.store.guard().acquire_read();
        let routes =
            algorithms::find_routes(&self.store.state(), &self.id, &destination.id, effort);
        routes.into_iter().map(|ids| self.handles(ids)).collect()
    }

    /// Nodes within `distance` hops, in discovery order.
    pub fn find_neighbors(&self, distance: f64) -> Vec<Node> {
        self.find_neighbors_by(distance, |_| 1.0)
    }

    /// Nodes within `distance` where each edge costs `distance_fn(edge)`.
    ///
    /// Traversal is breadth first and a node is settled on first discovery,
    /// so with uneven weights a node may be reported via a costlier path or
    /// missed when only a later-discovered path fits the budget.
    pub fn find_neighbors_by(
        &self,
        distance: f64,
        distance_fn: impl Fn(&EdgeView<'_>) -> f64,
    ) -> Vec<Node> {
        let _admission = self.store.guard().acquire_read();
        // The state lock is taken per expanded node and released before
        // `distance_fn` sees any of its edges.
        let ids = algorithms::find_neighbors(
            &self.id,
            distance,
            |id| algorithms::adjacency(&self.store.state(), id),
            distance_fn,
        );
        self.handles(ids)
    }

    // ===== Internal =====

    pub(crate) fn edge_handles(&self) -> Vec<Edge> {
        self.destination_ids()
            .into_iter()
            .map(|destination| Edge::new(self.store.clone(), self.id.clone(), destination))
            .collect()
    }

    fn destination_ids(&self) -> Vec<NodeId> {
        self.store
            .state()
            .nodes
            .get(&self.id)
            .map(|node| node.edges.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove `self -> destination` and, unless `directed`, its mirror. Each
    /// removal must pass the delete-edge hooks; a veto on the forward edge
    /// also spares the mirror. Only the forward edge counts toward the result.
    fn detach_from(&self, destination: &NodeId, directed: bool) -> bool {
        let mut detached = false;
        if self.store.has_edge_record(&self.id, destination) {
            if !self.remove_edge_with_hooks(&self.id, destination) {
                return false;
            }
            info!("detach '{}' from '{}'", self.id, destination);
            detached = true;
        }
        if !directed
            && self.store.has_edge_record(destination, &self.id)
            && self.remove_edge_with_hooks(destination, &self.id)
        {
            info!("detach '{}' from '{}'", destination, self.id);
        }
        detached
    }

    /// Remove every edge touching this node, outbound first, each through the
    /// delete-edge hooks. Vetoes are reported but cannot keep the node alive.
    pub(crate) fn release_edges(&self) {
        for destination in self.destination_ids() {
            self.detach_from(&destination, false);
        }
        for source in self.store.inbound_sources(&self.id) {
            if self.remove_edge_with_hooks(&source, &self.id) {
                info!("detach '{}' from '{}'", source, self.id);
            }
        }
    }

    fn remove_edge_with_hooks(&self, source: &NodeId, destination: &NodeId) -> bool {
        let edge = Edge::new(self.store.clone(), source.clone(), destination.clone());
        let handlers = self.store.hooks().delete_edge.handlers();
        if run_hooks(&handlers, &edge).is_cancel() {
            debug!("detach '{}' -> '{}' cancelled by hook", source, destination);
            return false;
        }
        self.store.remove_edge_record(source, destination)
    }

    fn handles(&self, ids: Vec<NodeId>) -> Vec<Node> {
        ids.into_iter()
            .map(|id| Node::new(self.store.clone(), id))
            .collect()
    }

    fn not_found(&self) -> GraphError {
        GraphError::NodeNotFound {
            node_id: self.id.to_string(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
