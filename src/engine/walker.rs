//! Walks a persisted rule tree one store lookup at a time

use crate::error::{Result, RuleEngineError};
use crate::rule::{short_circuit, AstNode, Record};
use crate::store::{NodeId, NodeStore, NodeView};
use smallvec::SmallVec;

/// Ids of the nodes between the root and the current node, inclusive.
/// Rule trees are shallow in practice, so this rarely spills to the heap.
type AncestorPath = SmallVec<[NodeId; 16]>;

/// Depth-first walker over stored nodes.
///
/// Only the current root-to-node path is held in memory. Each child is
/// fetched immediately before use, and a child that short-circuit evaluation
/// skips is never fetched at all.
pub(crate) struct TreeWalker<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
    path: AncestorPath,
}

impl<'a, S: NodeStore + ?Sized> TreeWalker<'a, S> {
    pub(crate) fn new(store: &'a S, max_depth: usize) -> Self {
        Self {
            store,
            max_depth,
            path: AncestorPath::new(),
        }
    }

    pub(crate) fn evaluate(&mut self, id: &NodeId, record: &Record) -> Result<bool> {
        let view = self.enter(id)?;
        let result = match view {
            NodeView::Operand(cond) => cond.matches(record),
            NodeView::Operator {
                combinator,
                left,
                right,
            } => self.evaluate(&left, record).and_then(|left| {
                match short_circuit(combinator, left) {
                    Some(decided) => Ok(decided),
                    None => self.evaluate(&right, record),
                }
            }),
        };
        self.path.pop();
        result
    }

    /// Rebuild the owned AST rooted at `id`
    pub(crate) fn load(&mut self, id: &NodeId) -> Result<AstNode> {
        let view = self.enter(id)?;
        let result = match view {
            NodeView::Operand(cond) => Ok(AstNode::Operand(cond)),
            NodeView::Operator {
                combinator,
                left,
                right,
            } => self.load(&left).and_then(|left| {
                let right = self.load(&right)?;
                Ok(AstNode::operator(combinator, left, right))
            }),
        };
        self.path.pop();
        result
    }

    /// Ids of every node in the tree, root first
    pub(crate) fn collect(&mut self, id: &NodeId, out: &mut Vec<NodeId>) -> Result<()> {
        let view = self.enter(id)?;
        out.push(id.clone());
        let result = match view {
            NodeView::Operand(_) => Ok(()),
            NodeView::Operator { left, right, .. } => self
                .collect(&left, out)
                .and_then(|_| self.collect(&right, out)),
        };
        self.path.pop();
        result
    }

    /// Fetch and validate a node, then push it onto the ancestor path.
    /// Every successful call must be paired with a `path.pop()`.
    fn enter(&mut self, id: &NodeId) -> Result<NodeView> {
        if let Some(parent) = self.path.last() {
            if self.path.contains(id) {
                return Err(RuleEngineError::corrupt(
                    parent,
                    format!("child {} is also its ancestor", id),
                ));
            }
            if self.path.len() >= self.max_depth {
                return Err(RuleEngineError::corrupt(
                    parent,
                    format!("tree exceeds maximum depth of {}", self.max_depth),
                ));
            }
        }

        let node = match (self.store.get(id)?, self.path.last()) {
            (Some(node), _) => node,
            (None, None) => return Err(RuleEngineError::NotFound(id.clone())),
            (None, Some(parent)) => {
                return Err(RuleEngineError::corrupt(
                    parent,
                    format!("child {} not found", id),
                ))
            }
        };

        let view = node.view()?;
        self.path.push(id.clone());
        Ok(view)
    }
}
