//! Abstract Syntax Tree for rule expressions

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Values that survive tokenization without quoting
static BARE_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-?\d+(?:\.\d+)?|\w+)$").expect("valid bare value pattern"));

/// In-memory AST node, owned by the parse that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Boolean combinator over two subtrees, e.g. "(A AND B)"
    Operator {
        combinator: Combinator,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    /// Single comparison like "age > 30"
    Operand(Condition),
}

/// Leaf comparison of a record field against a literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub comparator: Comparator,
    /// Raw literal text with any quotes stripped. Numeric comparators parse
    /// it at evaluation time.
    pub value: String,
}

/// Boolean combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
    /// Equal (=)
    Equal,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Less than or equal (<=)
    LessEqual,
}

impl AstNode {
    pub fn operator(combinator: Combinator, left: AstNode, right: AstNode) -> Self {
        AstNode::Operator {
            combinator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operand(
        field: impl Into<String>,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Self {
        AstNode::Operand(Condition {
            field: field.into(),
            comparator,
            value: value.into(),
        })
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        match self {
            AstNode::Operand(_) => 1,
            AstNode::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            AstNode::Operand(_) => 1,
            AstNode::Operator { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::Equal => "=",
            Comparator::GreaterEqual => ">=",
            Comparator::LessEqual => "<=",
        }
    }

    /// Whether the comparator needs both sides as numbers
    pub fn is_numeric(self) -> bool {
        !matches!(self, Comparator::Equal)
    }
}

impl FromStr for Combinator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            other => Err(format!("unrecognized combinator '{}'", other)),
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            ">" => Ok(Comparator::Greater),
            "<" => Ok(Comparator::Less),
            "=" => Ok(Comparator::Equal),
            ">=" => Ok(Comparator::GreaterEqual),
            "<=" => Ok(Comparator::LessEqual),
            other => Err(format!("unrecognized comparator '{}'", other)),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if BARE_VALUE.is_match(text) && text != "AND" && text != "OR" {
        f.write_str(text)
    } else {
        write!(f, "'{}'", text)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_literal(f, &self.field)?;
        write!(f, " {} ", self.comparator)?;
        write_literal(f, &self.value)
    }
}

/// Renders canonical rule text that parses back to an equal tree
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Operand(cond) => write!(f, "{}", cond),
            AstNode::Operator {
                combinator,
                left,
                right,
            } => write!(f, "({} {} {})", left, combinator, right),
        }
    }
}
