//! In-memory node store with fast hashing (ahash)

use crate::error::{Result, RuleEngineError};
use crate::store::{NodeId, NodeRecord, NodeStore, StoredNode};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Thread-safe in-memory `NodeStore`.
///
/// Ids are sequential, rendered as 24 hex digits. A record is only accepted
/// once every child it references is present, so a parent can never be
/// observed before its children.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: RwLock<AHashMap<NodeId, NodeRecord>>,
    next_id: AtomicU64,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    fn allocate_id(&self) -> NodeId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        NodeId::new(format!("{:024x}", n))
    }
}

impl NodeStore for MemoryNodeStore {
    fn create(&self, record: NodeRecord) -> Result<NodeId> {
        let mut nodes = self.nodes.write();

        if let Some(missing) = record.children().find(|child| !nodes.contains_key(*child)) {
            return Err(RuleEngineError::Store(format!(
                "refusing to write node referencing unknown child {}",
                missing
            )));
        }

        let id = self.allocate_id();
        debug!(node_id = %id, kind = ?record.kind, "stored node");
        nodes.insert(id.clone(), record);
        Ok(id)
    }

    fn get(&self, id: &NodeId) -> Result<Option<StoredNode>> {
        let nodes = self.nodes.read();
        Ok(nodes.get(id).map(|record| StoredNode {
            id: id.clone(),
            record: record.clone(),
        }))
    }

    fn delete(&self, id: &NodeId) -> Result<bool> {
        Ok(self.nodes.write().remove(id).is_some())
    }
}
