//! In-memory rule evaluator
//!
//! Works directly on an owned AST. The stored-tree walker in the engine
//! shares the per-condition comparison defined here.

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{AstNode, Combinator, Comparator, Condition};
use serde_json::{Map, Value};

/// Input record a rule is evaluated against
pub type Record = Map<String, Value>;

/// Evaluate an AST against a record
pub fn evaluate(ast: &AstNode, record: &Record) -> Result<bool> {
    match ast {
        AstNode::Operand(cond) => cond.matches(record),
        AstNode::Operator {
            combinator,
            left,
            right,
        } => {
            let left = evaluate(left, record)?;
            match short_circuit(*combinator, left) {
                Some(result) => Ok(result),
                None => evaluate(right, record),
            }
        }
    }
}

/// Result decided by the left side alone, if any
#[inline]
pub(crate) fn short_circuit(combinator: Combinator, left: bool) -> Option<bool> {
    match (combinator, left) {
        (Combinator::And, false) => Some(false),
        (Combinator::Or, true) => Some(true),
        _ => None,
    }
}

impl Condition {
    /// Compare the record's field against this condition's literal.
    ///
    /// Ordering comparators coerce both sides to numbers; equality compares
    /// string forms and never parses numbers.
    pub fn matches(&self, record: &Record) -> Result<bool> {
        let actual = record.get(&self.field).ok_or_else(|| {
            RuleEngineError::Evaluation(format!("field '{}' missing from record", self.field))
        })?;

        match self.comparator {
            Comparator::Equal => Ok(string_form(&self.field, actual)? == self.value),
            Comparator::Greater => self.compare_numeric(actual, |a, b| a > b),
            Comparator::Less => self.compare_numeric(actual, |a, b| a < b),
            Comparator::GreaterEqual => self.compare_numeric(actual, |a, b| a >= b),
            Comparator::LessEqual => self.compare_numeric(actual, |a, b| a <= b),
        }
    }

    fn compare_numeric<F>(&self, actual: &Value, op: F) -> Result<bool>
    where
        F: Fn(f64, f64) -> bool,
    {
        let lhs = numeric_field(&self.field, actual)?;
        let rhs = numeric_literal(&self.field, &self.value)?;
        Ok(op(lhs, rhs))
    }
}

fn string_form(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(RuleEngineError::Evaluation(format!(
            "field '{}' holds non-scalar value {}",
            field, other
        ))),
    }
}

fn numeric_field(field: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).ok_or_else(|| {
        RuleEngineError::Evaluation(format!(
            "field '{}' is not numeric: {}",
            field, value
        ))
    })
}

fn numeric_literal(field: &str, literal: &str) -> Result<f64> {
    literal
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            RuleEngineError::Evaluation(format!(
                "value '{}' compared against field '{}' is not numeric",
                literal, field
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::parser::parse_rule;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected JSON object"),
        }
    }

    #[test]
    fn test_and_rule() {
        let ast = parse_rule("(age > 30 AND department = 'Sales')").unwrap();

        let data = record(json!({"age": 31, "department": "Sales"}));
        assert!(evaluate(&ast, &data).unwrap());

        let data = record(json!({"age": 20, "department": "Sales"}));
        assert!(!evaluate(&ast, &data).unwrap());
    }

    #[test]
    fn test_or_rule() {
        let ast = parse_rule("(salary >= 50000 OR experience >= 5)").unwrap();

        let data = record(json!({"salary": 40000, "experience": 6}));
        assert!(evaluate(&ast, &data).unwrap());

        let data = record(json!({"salary": 40000, "experience": 4}));
        assert!(!evaluate(&ast, &data).unwrap());
    }

    #[test]
    fn test_missing_field() {
        let ast = parse_rule("(age > 30 AND department = 'Sales')").unwrap();
        let data = record(json!({"department": "Sales"}));
        assert!(matches!(
            evaluate(&ast, &data),
            Err(RuleEngineError::Evaluation(_))
        ));
    }

    #[test]
    fn test_and_short_circuit_skips_right() {
        let ast = parse_rule("(age > 30 AND department = 'Sales')").unwrap();
        let data = record(json!({"age": 20}));
        assert!(!evaluate(&ast, &data).unwrap());
    }

    #[test]
    fn test_or_short_circuit_skips_right() {
        let ast = parse_rule("(age > 30 OR department = 'Sales')").unwrap();
        let data = record(json!({"age": 40}));
        assert!(evaluate(&ast, &data).unwrap());
    }

    #[test]
    fn test_numeric_strings_in_record() {
        let ast = parse_rule("age >= 30").unwrap();
        assert!(evaluate(&ast, &record(json!({"age": "30"}))).unwrap());
        assert!(evaluate(&ast, &record(json!({"age": " 31.5 "}))).unwrap());
        assert!(evaluate(&ast, &record(json!({"age": "thirty"}))).is_err());
    }

    #[test]
    fn test_padded_literal_and_field_coerce_alike() {
        let ast = parse_rule("score >= ' 5'").unwrap();
        assert!(evaluate(&ast, &record(json!({"score": " 5"}))).unwrap());
        assert!(evaluate(&ast, &record(json!({"score": 6}))).unwrap());
        assert!(!evaluate(&ast, &record(json!({"score": "4 "}))).unwrap());
    }

    #[test]
    fn test_non_numeric_literal() {
        let ast = parse_rule("age > thirty").unwrap();
        let err = evaluate(&ast, &record(json!({"age": 31}))).unwrap_err();
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_equality_is_string_comparison() {
        let ast = parse_rule("code = 007").unwrap();
        // 7 renders as "7", not "007"
        assert!(!evaluate(&ast, &record(json!({"code": 7}))).unwrap());
        assert!(evaluate(&ast, &record(json!({"code": "007"}))).unwrap());

        let ast = parse_rule("age = 30").unwrap();
        assert!(evaluate(&ast, &record(json!({"age": 30}))).unwrap());
    }

    #[test]
    fn test_equality_never_parses_numbers() {
        let ast = parse_rule("name = Bob").unwrap();
        assert!(!evaluate(&ast, &record(json!({"name": "Alice"}))).unwrap());
    }

    #[test]
    fn test_boolean_equality() {
        let ast = parse_rule("active = true").unwrap();
        assert!(evaluate(&ast, &record(json!({"active": true}))).unwrap());
    }

    #[test]
    fn test_null_and_arrays_rejected() {
        let ast = parse_rule("tags = x").unwrap();
        assert!(evaluate(&ast, &record(json!({"tags": ["x"]}))).is_err());
        assert!(evaluate(&ast, &record(json!({"tags": null}))).is_err());
    }

    #[test]
    fn test_fractional_threshold() {
        let ast = parse_rule("(ratio > 0.5 AND delta < -2)").unwrap();
        assert!(evaluate(&ast, &record(json!({"ratio": 0.75, "delta": -3}))).unwrap());
    }
}
