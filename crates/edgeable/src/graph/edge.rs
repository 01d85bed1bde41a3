//! Edge handles.

use super::node::Node;
use super::property::{validate_key, PropertyMap, PropertyValue};
use super::store::GraphStore;
use super::types::{EdgeRecord, NodeId};
use crate::error::{GraphError, Result};
use std::fmt;

/// Handle to the directed edge `source -> destination`.
///
/// Like [`Node`], an edge handle is resolved through the store on every call.
/// Property writes are mirrored onto `destination -> source` unless the call
/// is `directed`; a missing mirror is skipped.
#[derive(Clone)]
pub struct Edge {
    store: GraphStore,
    source: NodeId,
    destination: NodeId,
}

impl Edge {
    pub(crate) fn new(store: GraphStore, source: NodeId, destination: NodeId) -> Self {
        Self {
            store,
            source,
            destination,
        }
    }

    /// Source node id.
    pub fn source_id(&self) -> &NodeId {
        &self.source
    }

    /// Destination node id.
    pub fn destination_id(&self) -> &NodeId {
        &self.destination
    }

    /// Handle to the source node.
    pub fn source(&self) -> Node {
        Node::new(self.store.clone(), self.source.clone())
    }

    /// Handle to the destination node.
    pub fn destination(&self) -> Node {
        Node::new(self.store.clone(), self.destination.clone())
    }

    /// Whether the edge is still in the store.
    pub fn exists(&self) -> bool {
        let _admission = self.store.guard().acquire_read();
        self.store.has_edge_record(&self.source, &self.destination)
    }

    /// The opposite edge `destination -> source`, if it exists.
    pub fn mirror(&self) -> Option<Edge> {
        let _admission = self.store.guard().acquire_read();
        if self.store.has_edge_record(&self.destination, &self.source) {
            Some(Edge::new(
                self.store.clone(),
                self.destination.clone(),
                self.source.clone(),
            ))
        } else {
            None
        }
    }

    /// Get a property value.
    pub fn get_property(&self, key: &str) -> Option<PropertyValue> {
        let _admission = self.store.guard().acquire_read();
        self.read(|edge| edge.properties.get(key).cloned())
            .flatten()
    }

    /// Copy of all properties; empty if the edge is gone.
    pub fn get_properties(&self) -> PropertyMap {
        let _admission = self.store.guard().acquire_read();
        self.read(|edge| edge.properties.clone())
            .unwrap_or_default()
    }

    /// Check if a property exists.
    pub fn has_property(&self, key: &str) -> bool {
        let _admission = self.store.guard().acquire_read();
        self.read(|edge| edge.properties.contains_key(key))
            .unwrap_or(false)
    }

    /// Set a property, on the mirror too unless `directed`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if this edge no longer exists and
    /// [`GraphError::InvalidArgument`] for an empty key.
    pub fn set_property(
        &self,
        key: &str,
        value: impl Into<PropertyValue>,
        directed: bool,
    ) -> Result<()> {
        validate_key(key)?;
        let value = value.into();
        self.write(directed, |edge| {
            edge.properties.insert(key, value.clone());
        })
    }

    /// Merge `properties` into this edge, and the mirror unless `directed`.
    pub fn set_properties(&self, properties: &PropertyMap, directed: bool) -> Result<()> {
        properties.validate()?;
        self.write(directed, |edge| edge.properties.merge(properties))
    }

    /// Remove a property, from the mirror too unless `directed`.
    ///
    /// Returns the value removed from this edge.
    pub fn delete_property(&self, key: &str, directed: bool) -> Result<Option<PropertyValue>> {
        let mut removed = None;
        let mut first = true;
        self.write(directed, |edge| {
            let value = edge.properties.remove(key);
            if first {
                removed = value;
                first = false;
            }
        })?;
        Ok(removed)
    }

    /// Detach this edge, and its mirror unless `directed`.
    ///
    /// Same as `self.source().detach(Some(&self.destination()), directed)`.
    pub fn delete(&self, directed: bool) -> Result<bool> {
        self.source().detach(Some(&self.destination()), directed)
    }

    fn read<R>(&self, f: impl FnOnce(&EdgeRecord) -> R) -> Option<R> {
        let state = self.store.state();
        state
            .nodes
            .get(&self.source)
            .and_then(|node| node.edges.get(&self.destination))
            .map(f)
    }

    /// Apply `f` to this edge, then to the mirror unless `directed`, in one
    /// state-lock step.
    fn write(&self, directed: bool, mut f: impl FnMut(&mut EdgeRecord)) -> Result<()> {
        let _admission = self.store.guard().acquire_write()?;
        let mut state = self.store.state_mut();
        let edge = state
            .nodes
            .get_mut(&self.source)
            .and_then(|node| node.edges.get_mut(&self.destination))
            .ok_or_else(|| GraphError::EdgeNotFound {
                source_id: self.source.to_string(),
                destination_id: self.destination.to_string(),
            })?;
        f(edge);

        if !directed {
            if let Some(mirror) = state
                .nodes
                .get_mut(&self.destination)
                .and_then(|node| node.edges.get_mut(&self.source))
            {
                f(mirror);
            }
        }
        Ok(())
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.destination == other.destination
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.destination.hash(state);
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}->{})", self.source, self.destination)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.destination)
    }
}
