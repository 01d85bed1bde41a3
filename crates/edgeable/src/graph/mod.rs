//! Core graph types and operations.
//!
//! This module defines the fundamental building blocks:
//! - [`GraphStore`]: The main graph database interface
//! - [`Node`]: Handle to a node and its outbound edges
//! - [`Edge`]: Handle to a directed edge between two nodes

mod edge;
mod hooks;
mod node;
mod property;
mod store;
mod types;
pub(crate) mod algorithms;

pub use edge::Edge;
pub use hooks::{edge_hook, node_hook, EdgeHook, HookDecision, HookEvent, NodeHook};
pub use node::{Node, DEFAULT_ROUTE_EFFORT};
pub use property::{PropertyMap, PropertyValue};
pub use store::GraphStore;
pub use types::{EdgeView, NodeId};

pub(crate) use types::GraphState;
#[cfg(test)]
pub(crate) use types::{EdgeRecord, NodeRecord};
