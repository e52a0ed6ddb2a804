//! Node store boundary
//!
//! Rules are persisted one node per record. The engine only needs to create
//! records, fetch them by id and delete them; anything that can do that (a
//! document database, a key/value store, the in-memory map below) can back
//! the engine.

mod memory;
mod record;

pub use memory::*;
pub use record::*;

use crate::error::Result;
use std::sync::Arc;

/// Storage collaborator holding individually addressable rule nodes.
///
/// Implementations report transport or storage faults as
/// `RuleEngineError::Store`. A missing id is not a fault: `get` returns
/// `Ok(None)` and the engine decides what that means.
pub trait NodeStore: Send + Sync {
    /// Persist a record and return the id assigned to it
    fn create(&self, record: NodeRecord) -> Result<NodeId>;

    fn get(&self, id: &NodeId) -> Result<Option<StoredNode>>;

    /// Remove a record, returning whether it existed
    fn delete(&self, id: &NodeId) -> Result<bool>;
}

impl<S: NodeStore + ?Sized> NodeStore for &S {
    fn create(&self, record: NodeRecord) -> Result<NodeId> {
        (**self).create(record)
    }

    fn get(&self, id: &NodeId) -> Result<Option<StoredNode>> {
        (**self).get(id)
    }

    fn delete(&self, id: &NodeId) -> Result<bool> {
        (**self).delete(id)
    }
}

impl<S: NodeStore + ?Sized> NodeStore for Arc<S> {
    fn create(&self, record: NodeRecord) -> Result<NodeId> {
        (**self).create(record)
    }

    fn get(&self, id: &NodeId) -> Result<Option<StoredNode>> {
        (**self).get(id)
    }

    fn delete(&self, id: &NodeId) -> Result<bool> {
        (**self).delete(id)
    }
}

impl<S: NodeStore + ?Sized> NodeStore for Box<S> {
    fn create(&self, record: NodeRecord) -> Result<NodeId> {
        (**self).create(record)
    }

    fn get(&self, id: &NodeId) -> Result<Option<StoredNode>> {
        (**self).get(id)
    }

    fn delete(&self, id: &NodeId) -> Result<bool> {
        (**self).delete(id)
    }
}
