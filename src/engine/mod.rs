//! Rule engine: create rules from text, evaluate stored rules
//!
//! `RuleEngine` holds nothing but a store handle and its limits, so one
//! instance can be shared freely between concurrent callers.

mod persist;
mod walker;


pub use persist::persist;

use crate::config::EngineConfig;
use crate::error::{Result, RuleEngineError};
use crate::rule::{tokenize, AstNode, Parser, Record};
use crate::store::{NodeId, NodeStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use walker::TreeWalker;

/// Result of creating a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRule {
    /// Id of the root node; the handle used to evaluate the rule
    pub id: NodeId,
    pub rule_text: String,
}

/// Parses, persists and evaluates rules against a `NodeStore`
#[derive(Debug, Clone)]
pub struct RuleEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: NodeStore> RuleEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Build an engine with custom limits, rejecting limits that fail
    /// `EngineConfig::validate`
    pub fn with_config(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse rule text under this engine's limits, without persisting it
    pub fn parse(&self, rule_text: &str) -> Result<AstNode> {
        if rule_text.len() > self.config.max_rule_length {
            return Err(RuleEngineError::lex(
                format!(
                    "rule text is {} bytes, limit is {}",
                    rule_text.len(),
                    self.config.max_rule_length
                ),
                0,
            ));
        }

        let tokens = tokenize(rule_text)?;
        Parser::new(&tokens)
            .with_max_depth(self.config.max_depth)
            .parse()
    }

    /// Parse `rule_text` and persist its tree, returning the root id.
    ///
    /// Identical texts are never deduplicated: each call writes a fresh tree.
    #[instrument(skip(self, rule_text), fields(rule_len = rule_text.len()))]
    pub fn create_rule(&self, rule_text: &str) -> Result<CreatedRule> {
        let ast = self.parse(rule_text)?;
        let id = persist(&self.store, &ast)?;

        info!(rule_id = %id, nodes = ast.node_count(), "rule created");
        Ok(CreatedRule {
            id,
            rule_text: rule_text.to_string(),
        })
    }

    /// Evaluate the stored rule rooted at `root` against `record`
    #[instrument(skip_all, fields(rule_id = %root))]
    pub fn evaluate_rule(&self, root: &NodeId, record: &Record) -> Result<bool> {
        let result = TreeWalker::new(&self.store, self.config.max_depth).evaluate(root, record);
        match &result {
            Ok(verdict) => debug!(verdict, "rule evaluated"),
            Err(err @ RuleEngineError::CorruptTree { .. }) => warn!(error = %err, "corrupt rule tree"),
            Err(err) => debug!(error = %err, "rule evaluation failed"),
        }
        result
    }

    /// Reconstruct the in-memory AST of a stored rule
    #[instrument(skip_all, fields(rule_id = %root))]
    pub fn load_rule(&self, root: &NodeId) -> Result<AstNode> {
        TreeWalker::new(&self.store, self.config.max_depth)
            .load(root)
            .map_err(|err| {
                if let RuleEngineError::CorruptTree { .. } = &err {
                    warn!(error = %err, "corrupt rule tree");
                }
                err
            })
    }

    /// Delete every node of a stored rule, root first, returning how many
    /// records were removed.
    ///
    /// The tree is validated before anything is deleted. Removing the root
    /// first means a concurrent reader sees `NotFound`, never a parent whose
    /// child has vanished.
    #[instrument(skip_all, fields(rule_id = %root))]
    pub fn delete_rule(&self, root: &NodeId) -> Result<usize> {
        let mut ids = Vec::new();
        TreeWalker::new(&self.store, self.config.max_depth).collect(root, &mut ids)?;

        let mut removed = 0;
        for id in &ids {
            if self.store.delete(id)? {
                removed += 1;
            }
        }

        info!(removed, "rule deleted");
        Ok(removed)
    }
}

impl<S: NodeStore + 'static> RuleEngine<S> {
    /// Evaluate on the blocking thread pool so async callers are not stalled
    /// by store round-trips.
    pub async fn evaluate_rule_async(self: Arc<Self>, root: NodeId, record: Record) -> Result<bool> {
        tokio::task::spawn_blocking(move || self.evaluate_rule(&root, &record))
            .await
            .map_err(|e| RuleEngineError::Task(format!("evaluation task failed: {}", e)))?
    }
}
