//! Persisted node layout
//!
//! Children are linked by store-assigned identifiers, never nested inline.
//! Comparator and combinator are kept as raw strings so that a record
//! damaged in storage is still readable and can be rejected explicitly.

use crate::error::{Result, RuleEngineError};
use crate::rule::{Combinator, Comparator, Condition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Operator,
    Operand,
}

/// Node fields as written to the store, before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A record together with the identifier the store gave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub record: NodeRecord,
}

/// Validated view of a stored node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeView {
    Operator {
        combinator: Combinator,
        left: NodeId,
        right: NodeId,
    },
    Operand(Condition),
}

impl NodeRecord {
    pub fn operator(combinator: Combinator, left: NodeId, right: NodeId) -> Self {
        Self {
            kind: NodeKind::Operator,
            combinator: Some(combinator.as_str().to_string()),
            left: Some(left),
            right: Some(right),
            field: None,
            comparator: None,
            value: None,
        }
    }

    pub fn operand(cond: &Condition) -> Self {
        Self {
            kind: NodeKind::Operand,
            combinator: None,
            left: None,
            right: None,
            field: Some(cond.field.clone()),
            comparator: Some(cond.comparator.as_str().to_string()),
            value: Some(cond.value.clone()),
        }
    }

    /// Child references, for operator records
    pub fn children(&self) -> impl Iterator<Item = &NodeId> {
        self.left.iter().chain(self.right.iter())
    }
}

impl StoredNode {
    /// Check structural invariants and decode the raw fields
    pub fn view(&self) -> Result<NodeView> {
        let record = &self.record;
        match record.kind {
            NodeKind::Operator => {
                let combinator = record
                    .combinator
                    .as_deref()
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operator without combinator"))?
                    .parse::<Combinator>()
                    .map_err(|reason| RuleEngineError::corrupt(&self.id, reason))?;
                let left = record
                    .left
                    .clone()
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operator without left child"))?;
                let right = record
                    .right
                    .clone()
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operator without right child"))?;
                Ok(NodeView::Operator {
                    combinator,
                    left,
                    right,
                })
            }
            NodeKind::Operand => {
                let field = record
                    .field
                    .clone()
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operand without field"))?;
                let comparator = record
                    .comparator
                    .as_deref()
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operand without comparator"))?
                    .parse::<Comparator>()
                    .map_err(|reason| RuleEngineError::corrupt(&self.id, reason))?;
                let value = record
                    .value
                    .clone()
                    .ok_or_else(|| RuleEngineError::corrupt(&self.id, "operand without value"))?;
                Ok(NodeView::Operand(Condition {
                    field,
                    comparator,
                    value,
                }))
            }
        }
    }
}
