//! Engine configuration
//!
//! Loaded from JSON documents; every field is optional and falls back to its
//! default.

use crate::error::{Result, RuleEngineError};
use serde::{Deserialize, Serialize};

/// Default bound on parenthesis nesting and stored tree depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest accepted `max_depth`. Parsing and tree walks recurse once per
/// level, and this keeps them inside a 2 MiB thread stack.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// Default bound on raw rule text length, in bytes
pub const DEFAULT_MAX_RULE_LENGTH: usize = 8192;

/// Limits applied while parsing and walking rule trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth of a rule tree. Parsing deeper input is a
    /// syntax error; walking a deeper stored tree is a corrupt-tree error.
    pub max_depth: usize,
    /// Maximum accepted length of a rule string
    pub max_rule_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_rule_length: DEFAULT_MAX_RULE_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(RuleEngineError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(RuleEngineError::Config(format!(
                "max_depth {} exceeds the limit of {}",
                self.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        if self.max_rule_length == 0 {
            return Err(RuleEngineError::Config(
                "max_rule_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
