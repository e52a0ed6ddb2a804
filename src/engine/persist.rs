//! Bottom-up persistence of parsed rules

use crate::error::Result;
use crate::rule::AstNode;
use crate::store::{NodeId, NodeRecord, NodeStore};
use tracing::debug;

/// Write every node of `ast` to the store, children before parents, and
/// return the root's id.
///
/// A parent record is only written once both child ids are known, so every
/// reference it carries already resolves. If a write fails midway the
/// children written so far stay behind as unreferenced records.
pub fn persist<S: NodeStore + ?Sized>(store: &S, ast: &AstNode) -> Result<NodeId> {
    match ast {
        AstNode::Operand(cond) => {
            let id = store.create(NodeRecord::operand(cond))?;
            debug!(node_id = %id, field = %cond.field, "persisted operand");
            Ok(id)
        }
        AstNode::Operator {
            combinator,
            left,
            right,
        } => {
            let left = persist(store, left)?;
            let right = persist(store, right)?;
            let id = store.create(NodeRecord::operator(*combinator, left, right))?;
            debug!(node_id = %id, combinator = %combinator, "persisted operator");
            Ok(id)
        }
    }
}
