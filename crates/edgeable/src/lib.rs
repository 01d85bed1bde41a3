//! # edgeable
//!
//! A small embedded graph store: string- or integer-keyed nodes, directed or
//! mirrored edges, free-form properties on everything, and whole-graph
//! snapshots on disk.
//!
//! ## Core Principles
//!
//! - **Handles, not references**: [`Node`] and [`Edge`] resolve through the store on every call
//! - **Explicit persistence**: nothing touches disk until [`GraphStore::save`]
//! - **Hooks can veto**: create/delete handlers return a [`HookDecision`]
//! - **Shared store**: one [`ConcurrencyGuard`] per store admits readers together and writers apart from readers
//!
//! ## Architecture
//!
//! ```text
//! GraphStore (nodes, store properties, hooks)
//!     ↓
//! Node / Edge handles (attach, detach, properties, routes)
//!     ↓
//! Algorithms (route search, neighbor reachability)
//!     ↓
//! Snapshot backend (file, memory)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use edgeable::{GraphStore, PropertyMap, StoreConfig};
//!
//! let store = GraphStore::open(StoreConfig::new().with_snapshot_path("./cities.db")).unwrap();
//!
//! let a = store.put_node("A", PropertyMap::new()).unwrap();
//! let b = store.put_node("B", PropertyMap::new()).unwrap();
//! a.attach(&b, PropertyMap::new().with("distance", 2.0), false).unwrap();
//!
//! assert_eq!(a.find_route_to(&b, &[]).unwrap(), vec![a.clone(), b.clone()]);
//! store.close().unwrap();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod storage;

// Re-export main types
pub use concurrency::{ConcurrencyGuard, LockSnapshot, ReaderGuard, WriterGuard};
pub use config::StoreConfig;
pub use error::{GraphError, Result};
pub use graph::{
    edge_hook, node_hook, Edge, EdgeHook, EdgeView, GraphStore, HookDecision, HookEvent, Node,
    NodeHook, NodeId, PropertyMap, PropertyValue,
};
pub use storage::{FileBackend, MemoryBackend, SnapshotBackend};
