//! Error types for the rule engine

use crate::store::NodeId;
use thiserror::Error;

/// Main error type for the rule engine
#[derive(Error, Debug)]
pub enum RuleEngineError {
    /// The rule text contains a character sequence no token matches.
    /// `position` is a byte offset into the whitespace-normalized text, or 0
    /// when the text as a whole is rejected.
    #[error("Lex error at offset {position}: {reason}")]
    Lex { reason: String, position: usize },

    /// The token sequence violates the grammar. `position` is a token index.
    #[error("Syntax error at token {position}: {reason}")]
    Syntax { reason: String, position: usize },

    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Corrupt rule tree at node {node}: {reason}")]
    CorruptTree { node: NodeId, reason: String },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RuleEngineError {
    pub(crate) fn lex(reason: impl Into<String>, position: usize) -> Self {
        Self::Lex {
            reason: reason.into(),
            position,
        }
    }

    pub(crate) fn syntax(reason: impl Into<String>, position: usize) -> Self {
        Self::Syntax {
            reason: reason.into(),
            position,
        }
    }

    pub(crate) fn corrupt(node: &NodeId, reason: impl Into<String>) -> Self {
        Self::CorruptTree {
            node: node.clone(),
            reason: reason.into(),
        }
    }

    /// HTTP-style status class for a transport binding
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Lex { .. } | Self::Syntax { .. } => 400,
            Self::Evaluation(_) | Self::CorruptTree { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Store(_) | Self::Serialization(_) | Self::Task(_) | Self::Config(_) => 500,
        }
    }

    /// Whether the caller (or the caller's data) caused the failure
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleEngineError>;
