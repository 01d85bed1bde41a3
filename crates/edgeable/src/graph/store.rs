//! Main GraphStore interface for graph operations.

use super::edge::Edge;
use super::hooks::{run_hooks, EdgeHook, HookEvent, Hooks, NodeHook};
use super::node::Node;
use super::property::{validate_key, PropertyMap, PropertyValue};
use super::types::{GraphState, NodeId, NodeRecord};
use crate::concurrency::{ConcurrencyGuard, LockSnapshot};
use crate::config::StoreConfig;
use crate::error::{GraphError, Result};
use crate::storage::{FileBackend, MemoryBackend, PersistenceManager, SnapshotBackend};
use log::{debug, info, trace};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The graph database.
///
/// `GraphStore` is a cheap, cloneable handle; every clone, and every [`Node`]
/// and [`Edge`] handed out by it, refers to the same underlying graph.
///
/// Mutations are writer-class and lookups are reader-class (see
/// [`ConcurrencyGuard`]). User callbacks never run while the internal state
/// lock is held, so hooks and predicates may call back into the store.
#[derive(Clone)]
pub struct GraphStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    guard: ConcurrencyGuard,
    state: RwLock<GraphState>,
    hooks: RwLock<Hooks>,
    persistence: RwLock<PersistenceManager>,
    compression_level: u32,
}

impl GraphStore {
    /// Open a store persisted at `config.snapshot_path`.
    ///
    /// When `config.load_existing` is set and a snapshot exists, the store is
    /// hydrated from it. Configured properties fill in any store property the
    /// snapshot does not define.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use edgeable::{GraphStore, StoreConfig};
    ///
    /// let store = GraphStore::open(StoreConfig::new().with_snapshot_path("./my.graph")).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] for an invalid configuration and
    /// [`GraphError::Storage`] / [`GraphError::Serialization`] if an existing
    /// snapshot cannot be read.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        info!("Opening graph at path: {:?}", config.snapshot_path);
        let backend = FileBackend::new(&config.snapshot_path);
        Self::with_backend(config, Box::new(backend))
    }

    /// Open a store on an arbitrary snapshot backend.
    ///
    /// # Errors
    ///
    /// Same as [`GraphStore::open`].
    pub fn with_backend(config: StoreConfig, backend: Box<dyn SnapshotBackend>) -> Result<Self> {
        config.validate()?;
        let persistence = PersistenceManager::new(backend, config.compression_level);

        let mut state = GraphState::default();
        if config.load_existing {
            if let Some(restored) = persistence.restore()? {
                info!(
                    "Hydrated {} nodes from {}",
                    restored.nodes.len(),
                    persistence.describe()
                );
                state = restored;
            }
        }
        for (key, value) in config.properties.iter() {
            if !state.properties.contains_key(key) {
                state.properties.insert(key.clone(), value.clone());
            }
        }

        Ok(Self::from_parts(state, persistence, config.compression_level))
    }

    /// Create a store whose snapshots live in memory.
    ///
    /// **Warning**: nothing is written to disk; saved snapshots are lost when
    /// the last handle is dropped.
    pub fn in_memory() -> Self {
        let config = StoreConfig::default();
        let persistence =
            PersistenceManager::new(Box::new(MemoryBackend::new()), config.compression_level);
        Self::from_parts(GraphState::default(), persistence, config.compression_level)
    }

    fn from_parts(state: GraphState, persistence: PersistenceManager, compression_level: u32) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                guard: ConcurrencyGuard::new(),
                state: RwLock::new(state),
                hooks: RwLock::new(Hooks::new()),
                persistence: RwLock::new(persistence),
                compression_level,
            }),
        }
    }

    // ===== Nodes =====

    /// Create the node `id`, or merge `properties` into it if it exists.
    ///
    /// Create-node hooks run once the node and its initial properties are in
    /// place, so handlers can mutate it. Merging never fires hooks.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] for an empty id or property key,
    /// and [`GraphError::Cancelled`] if a create-node hook vetoed the node, in
    /// which case it is removed again along with any edges earlier hooks
    /// gave it, each through the delete-edge hooks.
    pub fn put_node(&self, id: impl Into<NodeId>, properties: PropertyMap) -> Result<Node> {
        let id = id.into();
        id.validate()?;
        properties.validate()?;
        let _admission = self.inner.guard.acquire_write()?;

        let created = {
            let mut state = self.state_mut();
            match state.nodes.get_mut(&id) {
                Some(node) => {
                    node.properties.merge(&properties);
                    false
                }
                None => {
                    state.nodes.insert(
                        id.clone(),
                        NodeRecord {
                            properties,
                            ..NodeRecord::default()
                        },
                    );
                    true
                }
            }
        };

        let node = Node::new(self.clone(), id);
        if created {
            info!("create node '{}'", node.id());
            let handlers = self.inner.hooks.read().create_node.handlers();
            if run_hooks(&handlers, &node).is_cancel() {
                debug!("create node '{}' cancelled by hook", node.id());
                node.release_edges();
                self.purge_node(node.id());
                return Err(GraphError::Cancelled {
                    operation: format!("create node {}", node.id()),
                });
            }
        } else {
            trace!("merged properties into node '{}'", node.id());
        }
        Ok(node)
    }

    /// Get a handle to the node `id`, or `None` if it does not exist.
    pub fn get_node(&self, id: impl Into<NodeId>) -> Option<Node> {
        let id = id.into();
        let _admission = self.inner.guard.acquire_read();
        if self.state().nodes.contains_key(&id) {
            Some(Node::new(self.clone(), id))
        } else {
            None
        }
    }

    /// Check whether the node `id` exists.
    pub fn has_node(&self, id: impl Into<NodeId>) -> bool {
        let id = id.into();
        let _admission = self.inner.guard.acquire_read();
        self.contains(&id)
    }

    /// Snapshot of every node accepted by `predicate`, in insertion order.
    pub fn get_nodes(&self, predicate: impl Fn(&Node) -> bool) -> Vec<Node> {
        let _admission = self.inner.guard.acquire_read();
        self.node_handles()
            .into_iter()
            .filter(|node| predicate(node))
            .collect()
    }

    /// Snapshot of every edge accepted by `edge_predicate` whose source node is
    /// accepted by `node_predicate`.
    pub fn get_edges(
        &self,
        edge_predicate: impl Fn(&Edge) -> bool,
        node_predicate: impl Fn(&Node) -> bool,
    ) -> Vec<Edge> {
        let _admission = self.inner.guard.acquire_read();
        self.node_handles()
            .into_iter()
            .filter(|node| node_predicate(node))
            .flat_map(|node| node.edge_handles())
            .filter(|edge| edge_predicate(edge))
            .collect()
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        let _admission = self.inner.guard.acquire_read();
        self.state().nodes.len()
    }

    /// Get the total number of directed edges in the graph.
    ///
    /// A non-directed attach contributes two.
    pub fn edge_count(&self) -> usize {
        let _admission = self.inner.guard.acquire_read();
        self.state().edge_count()
    }

    /// Remove every node and edge. Store properties are kept and no hooks fire.
    ///
    /// This is a destructive operation that cannot be undone.
    pub fn clear(&self) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        debug!("Clearing graph");
        self.state_mut().nodes.clear();
        Ok(())
    }

    // ===== Store properties =====

    /// Get a store property.
    pub fn get_property(&self, key: &str) -> Option<PropertyValue> {
        let _admission = self.inner.guard.acquire_read();
        self.state().properties.get(key).cloned()
    }

    /// Copy of all store properties.
    pub fn get_properties(&self) -> PropertyMap {
        let _admission = self.inner.guard.acquire_read();
        self.state().properties.clone()
    }

    /// Check whether a store property exists.
    pub fn has_property(&self, key: &str) -> bool {
        let _admission = self.inner.guard.acquire_read();
        self.state().properties.contains_key(key)
    }

    /// Set a store property.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] for an empty key.
    pub fn set_property(&self, key: &str, value: impl Into<PropertyValue>) -> Result<()> {
        validate_key(key)?;
        let _admission = self.inner.guard.acquire_write()?;
        self.state_mut().properties.insert(key, value);
        Ok(())
    }

    /// Merge `properties` into the store properties.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] for an empty key.
    pub fn set_properties(&self, properties: &PropertyMap) -> Result<()> {
        properties.validate()?;
        let _admission = self.inner.guard.acquire_write()?;
        self.state_mut().properties.merge(properties);
        Ok(())
    }

    /// Remove a store property, returning its value if it was set.
    pub fn delete_property(&self, key: &str) -> Result<Option<PropertyValue>> {
        let _admission = self.inner.guard.acquire_write()?;
        Ok(self.state_mut().properties.remove(key))
    }

    // ===== Hooks =====

    /// Register, replace or remove a create-node hook.
    ///
    /// With `key == None` a fresh key is generated. Passing `None` as the
    /// handler removes the hook registered under `key`. Returns the key.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] for an empty key.
    pub fn on_create_node(&self, handler: Option<NodeHook>, key: Option<&str>) -> Result<String> {
        self.inner.hooks.write().create_node.register(handler, key)
    }

    /// Register, replace or remove a delete-node hook. See [`GraphStore::on_create_node`].
    pub fn on_delete_node(&self, handler: Option<NodeHook>, key: Option<&str>) -> Result<String> {
        self.inner.hooks.write().delete_node.register(handler, key)
    }

    /// Register, replace or remove a create-edge hook. See [`GraphStore::on_create_node`].
    pub fn on_create_edge(&self, handler: Option<EdgeHook>, key: Option<&str>) -> Result<String> {
        self.inner.hooks.write().create_edge.register(handler, key)
    }

    /// Register, replace or remove a delete-edge hook. See [`GraphStore::on_create_node`].
    pub fn on_delete_edge(&self, handler: Option<EdgeHook>, key: Option<&str>) -> Result<String> {
        self.inner.hooks.write().delete_edge.register(handler, key)
    }

    /// Number of handlers registered for `event`.
    pub fn hook_count(&self, event: HookEvent) -> usize {
        self.inner.hooks.read().count(event)
    }

    // ===== Persistence =====

    /// Write a snapshot of the whole graph to the configured location.
    ///
    /// The state is encoded in one consistent step, then the target is
    /// replaced atomically.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`] if the snapshot cannot be written; the
    /// previous snapshot is left intact.
    pub fn save(&self) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        let persistence = self.inner.persistence.read();
        let bytes = persistence.encode(&self.state())?;
        persistence.persist(&bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), persistence.describe());
        Ok(())
    }

    /// Write a snapshot to `path` without changing the configured location.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        let persistence = self.file_persistence(path.as_ref())?;
        let bytes = persistence.encode(&self.state())?;
        persistence.persist(&bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), persistence.describe());
        Ok(())
    }

    /// Replace the in-memory graph with the snapshot at the configured location.
    ///
    /// The snapshot is decoded and validated in full before anything is
    /// swapped; on failure the current state is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`] if no snapshot exists or it cannot be
    /// read, and [`GraphError::Serialization`] if it is invalid.
    pub fn load(&self) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        let persistence = self.inner.persistence.read();
        self.replace_from(&persistence)
    }

    /// Discard unsaved changes by loading the last snapshot again.
    pub fn reload(&self) -> Result<()> {
        self.load()
    }

    /// Replace the in-memory graph with the snapshot at `path`.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        let persistence = self.file_persistence(path.as_ref())?;
        self.replace_from(&persistence)
    }

    /// Path snapshots are saved to, if the store is file-backed.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.inner.persistence.read().location()
    }

    /// Point future saves and loads at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] if `path` cannot name a file.
    pub fn set_snapshot_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let _admission = self.inner.guard.acquire_write()?;
        let persistence = self.file_persistence(path.as_ref())?;
        *self.inner.persistence.write() = persistence;
        Ok(())
    }

    /// Save and release this handle.
    pub fn close(self) -> Result<()> {
        self.save()
    }

    /// Current admission counters of this store's guard.
    pub fn lock_snapshot(&self) -> LockSnapshot {
        self.inner.guard.snapshot()
    }

    // ===== Crate-internal plumbing =====

    pub(crate) fn guard(&self) -> &ConcurrencyGuard {
        &self.inner.guard
    }

    pub(crate) fn hooks(&self) -> RwLockReadGuard<'_, Hooks> {
        self.inner.hooks.read()
    }

    /// Recursive read so callbacks nested under an outer read never deadlock
    /// behind a queued writer.
    pub(crate) fn state(&self) -> RwLockReadGuard<'_, GraphState> {
        self.inner.state.read_recursive()
    }

    pub(crate) fn state_mut(&self) -> RwLockWriteGuard<'_, GraphState> {
        self.inner.state.write()
    }

    pub(crate) fn contains(&self, id: &NodeId) -> bool {
        self.state().nodes.contains_key(id)
    }

    pub(crate) fn has_edge_record(&self, source: &NodeId, destination: &NodeId) -> bool {
        self.state()
            .nodes
            .get(source)
            .is_some_and(|node| node.edges.contains_key(destination))
    }

    pub(crate) fn remove_edge_record(&self, source: &NodeId, destination: &NodeId) -> bool {
        self.state_mut()
            .nodes
            .get_mut(source)
            .and_then(|node| node.edges.shift_remove(destination))
            .is_some()
    }

    /// Ids of the nodes with an edge into `id`, in store order.
    pub(crate) fn inbound_sources(&self, id: &NodeId) -> Vec<NodeId> {
        self.state()
            .nodes
            .iter()
            .filter(|(_, node)| node.edges.contains_key(id))
            .map(|(source, _)| source.clone())
            .collect()
    }

    /// Remove a node and every edge still referencing it, without firing hooks.
    pub(crate) fn purge_node(&self, id: &NodeId) -> bool {
        let mut state = self.state_mut();
        let removed = state.nodes.shift_remove(id).is_some();
        for node in state.nodes.values_mut() {
            node.edges.shift_remove(id);
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn state_lock_is_free(&self) -> bool {
        self.inner.state.try_write().is_some()
    }

    pub(crate) fn same_store(&self, other: &GraphStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn node_handles(&self) -> Vec<Node> {
        let ids: Vec<NodeId> = self.state().nodes.keys().cloned().collect();
        ids.into_iter()
            .map(|id| Node::new(self.clone(), id))
            .collect()
    }

    fn file_persistence(&self, path: &Path) -> Result<PersistenceManager> {
        StoreConfig::validate_snapshot_path(path)?;
        Ok(PersistenceManager::new(
            Box::new(FileBackend::new(path)),
            self.inner.compression_level,
        ))
    }

    fn replace_from(&self, persistence: &PersistenceManager) -> Result<()> {
        let restored = persistence.restore()?.ok_or_else(|| {
            GraphError::storage(
                format!("No snapshot found at {}", persistence.describe()),
                None::<std::io::Error>,
            )
        })?;
        info!(
            "Loaded {} nodes from {}",
            restored.nodes.len(),
            persistence.describe()
        );
        *self.state_mut() = restored;
        Ok(())
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("GraphStore")
            .field("nodes", &state.nodes.len())
            .field("edges", &state.edge_count())
            .field("snapshot", &self.inner.persistence.read().describe())
            .finish()
    }
}
