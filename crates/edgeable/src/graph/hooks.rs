//! Lifecycle hooks fired on node and edge creation and deletion.
//!
//! Handlers live in ordered registries keyed by caller-supplied or generated
//! keys. They run in registration order; the first handler returning
//! [`HookDecision::Cancel`] vetoes the mutation and stops the remaining ones.
//! Side effects of handlers that already ran are kept.

use super::edge::Edge;
use super::node::Node;
use crate::error::{GraphError, Result};
use indexmap::IndexMap;
use log::debug;
use std::sync::Arc;

/// Outcome returned by every hook handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookDecision {
    /// Let the mutation go ahead.
    #[default]
    Proceed,
    /// Veto the mutation.
    Cancel,
}

impl HookDecision {
    /// Whether this decision vetoes the mutation.
    pub fn is_cancel(self) -> bool {
        self == HookDecision::Cancel
    }
}

/// Handler invoked with the node being created or deleted.
pub type NodeHook = Arc<dyn Fn(&Node) -> HookDecision + Send + Sync>;

/// Handler invoked with the edge being created or deleted.
pub type EdgeHook = Arc<dyn Fn(&Edge) -> HookDecision + Send + Sync>;

/// Wrap a closure as a [`NodeHook`].
pub fn node_hook<F>(handler: F) -> NodeHook
where
    F: Fn(&Node) -> HookDecision + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// Wrap a closure as an [`EdgeHook`].
pub fn edge_hook<F>(handler: F) -> EdgeHook
where
    F: Fn(&Edge) -> HookDecision + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// The mutation a registry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// A node was created
    CreateNode,
    /// A node is about to be deleted
    DeleteNode,
    /// An edge was created
    CreateEdge,
    /// An edge is about to be deleted
    DeleteEdge,
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::CreateNode => write!(f, "create_node"),
            HookEvent::DeleteNode => write!(f, "delete_node"),
            HookEvent::CreateEdge => write!(f, "create_edge"),
            HookEvent::DeleteEdge => write!(f, "delete_edge"),
        }
    }
}

/// Ordered map of handler key to handler.
pub(crate) struct HookRegistry<H: Clone> {
    event: HookEvent,
    handlers: IndexMap<String, H>,
}

impl<H: Clone> HookRegistry<H> {
    fn new(event: HookEvent) -> Self {
        Self {
            event,
            handlers: IndexMap::new(),
        }
    }

    /// Register, replace or (with `None`) remove a handler. Returns the key.
    ///
    /// A replaced handler keeps its original position in the firing order.
    pub fn register(&mut self, handler: Option<H>, key: Option<&str>) -> Result<String> {
        let key = match key {
            Some("") => {
                return Err(GraphError::invalid_argument("hook key must not be empty"));
            }
            Some(key) => key.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        match handler {
            Some(handler) => {
                debug!("register {} hook '{}'", self.event, key);
                self.handlers.insert(key.clone(), handler);
            }
            None => {
                debug!("remove {} hook '{}'", self.event, key);
                self.handlers.shift_remove(&key);
            }
        }
        Ok(key)
    }

    /// Clone the handlers out so none of them runs under the registry lock.
    pub fn handlers(&self) -> Vec<H> {
        self.handlers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// All four registries of a store.
pub(crate) struct Hooks {
    pub create_node: HookRegistry<NodeHook>,
    pub delete_node: HookRegistry<NodeHook>,
    pub create_edge: HookRegistry<EdgeHook>,
    pub delete_edge: HookRegistry<EdgeHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self {
            create_node: HookRegistry::new(HookEvent::CreateNode),
            delete_node: HookRegistry::new(HookEvent::DeleteNode),
            create_edge: HookRegistry::new(HookEvent::CreateEdge),
            delete_edge: HookRegistry::new(HookEvent::DeleteEdge),
        }
    }

    pub fn count(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::CreateNode => self.create_node.len(),
            HookEvent::DeleteNode => self.delete_node.len(),
            HookEvent::CreateEdge => self.create_edge.len(),
            HookEvent::DeleteEdge => self.delete_edge.len(),
        }
    }
}

/// Run handlers in order, stopping at the first veto.
pub(crate) fn run_hooks<T: ?Sized>(
    handlers: &[Arc<dyn Fn(&T) -> HookDecision + Send + Sync>],
    subject: &T,
) -> HookDecision {
    for handler in handlers {
        if handler(subject).is_cancel() {
            return HookDecision::Cancel;
        }
    }
    HookDecision::Proceed
}
