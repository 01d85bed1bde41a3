//! Core graph types: node ids, stored records and the edge view.

use super::property::PropertyMap;
use crate::error::{GraphError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node: a string or an integer.
///
/// Ids are immutable once assigned. `NodeId::Str("1")` and `NodeId::Int(1)`
/// are distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    /// String id
    Str(String),
    /// Integer id
    Int(i64),
}

impl NodeId {
    /// Reject empty string ids.
    pub fn validate(&self) -> Result<()> {
        match self {
            NodeId::Str(s) if s.is_empty() => {
                Err(GraphError::invalid_argument("node id must not be an empty string"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Str(s) => write!(f, "{s}"),
            NodeId::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Str(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Str(value)
    }
}

impl From<&String> for NodeId {
    fn from(value: &String) -> Self {
        NodeId::Str(value.clone())
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Int(value)
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        NodeId::Int(value as i64)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId::Int(value as i64)
    }
}

impl From<&NodeId> for NodeId {
    fn from(value: &NodeId) -> Self {
        value.clone()
    }
}

/// Stored outbound edge. The source is the owning node, the destination is the
/// adjacency key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct EdgeRecord {
    pub properties: PropertyMap,
}

/// Stored node: properties plus outbound adjacency in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct NodeRecord {
    pub properties: PropertyMap,
    pub edges: IndexMap<NodeId, EdgeRecord>,
}

/// The complete in-memory state of a store; also the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct GraphState {
    pub properties: PropertyMap,
    pub nodes: IndexMap<NodeId, NodeRecord>,
}

impl GraphState {
    /// Number of directed adjacency entries.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.edges.len()).sum()
    }

    /// Check structural invariants: no self edges, no dangling destinations,
    /// no empty ids or keys.
    pub fn validate(&self) -> Result<()> {
        self.properties.validate()?;
        for (id, node) in &self.nodes {
            id.validate()?;
            node.properties.validate()?;
            for (destination, edge) in &node.edges {
                if destination == id {
                    return Err(GraphError::invalid_argument(format!(
                        "self edge on node {id}"
                    )));
                }
                if !self.nodes.contains_key(destination) {
                    return Err(GraphError::invalid_argument(format!(
                        "edge {id}->{destination} points to a missing node"
                    )));
                }
                edge.properties.validate()?;
            }
        }
        Ok(())
    }
}

/// Borrowed view of an edge handed to traversal callbacks.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    /// Source node id
    pub source: &'a NodeId,
    /// Destination node id
    pub destination: &'a NodeId,
    /// Edge properties
    pub properties: &'a PropertyMap,
}
