//! Rule Engine Core - boolean eligibility rules over persisted syntax trees
//!
//! Rule strings like `(age > 30 AND department = 'Sales')` are tokenized,
//! parsed into an AST and stored one node per record, with children linked
//! by id. Stored rules are evaluated against JSON records by walking the
//! tree through the store, fetching each node only when it is needed.
//!
//! ```
//! use rule_engine_core::{MemoryNodeStore, Record, RuleEngine};
//! use serde_json::json;
//!
//! let engine = RuleEngine::new(MemoryNodeStore::new());
//! let rule = engine.create_rule("(age > 30 AND department = 'Sales')").unwrap();
//!
//! let record: Record = json!({"age": 31, "department": "Sales"})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//! assert!(engine.evaluate_rule(&rule.id, &record).unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod rule;
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use crate::config::EngineConfig;
pub use crate::engine::{persist, CreatedRule, RuleEngine};
pub use crate::error::{Result, RuleEngineError};
pub use crate::rule::{
    evaluate, parse, parse_rule, tokenize, AstNode, Combinator, Comparator, Condition, Record,
    Token,
};
pub use crate::store::{MemoryNodeStore, NodeId, NodeKind, NodeRecord, NodeStore, NodeView, StoredNode};
