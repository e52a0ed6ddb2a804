//! Recursive-descent rule parser
//!
//! Grammar, with grouping mandatory for every combinator:
//!
//! ```text
//! expression := '(' expression combinator expression ')'
//!             | operand
//! operand    := FIELD COMPARATOR VALUE
//! combinator := 'AND' | 'OR'
//! ```

use crate::config::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{AstNode, Combinator, Comparator, Condition};
use crate::rule::lexer::{tokenize, Token};

/// Parse a rule string into an AST
pub fn parse_rule(rule: &str) -> Result<AstNode> {
    let tokens = tokenize(rule)?;
    parse(&tokens)
}

/// Parse a token sequence into an AST using the default depth bound
pub fn parse(tokens: &[Token]) -> Result<AstNode> {
    Parser::new(tokens).parse()
}

/// Single-cursor parser over a token slice. The cursor only moves forward.
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting bound, clamped to `MAX_DEPTH_LIMIT`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// Parse the whole sequence; leftover tokens are an error
    pub fn parse(mut self) -> Result<AstNode> {
        let ast = self.expression(1)?;
        if let Some(extra) = self.tokens.get(self.position) {
            return Err(RuleEngineError::syntax(
                format!("unexpected trailing token {}", extra),
                self.position,
            ));
        }
        Ok(ast)
    }

    fn expression(&mut self, depth: usize) -> Result<AstNode> {
        if depth > self.max_depth {
            return Err(RuleEngineError::syntax(
                format!("nesting exceeds maximum depth of {}", self.max_depth),
                self.position,
            ));
        }

        match self.peek("expression")? {
            Token::LParen => {
                self.position += 1;
                let left = self.expression(depth + 1)?;
                let combinator = self.combinator()?;
                let right = self.expression(depth + 1)?;
                self.expect_close()?;
                Ok(AstNode::Operator {
                    combinator,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            _ => self.operand(),
        }
    }

    fn operand(&mut self) -> Result<AstNode> {
        let field_position = self.position;
        let field = self.literal("field name")?;
        if field.is_empty() {
            return Err(RuleEngineError::syntax("field name is empty", field_position));
        }
        let comparator = self.comparator()?;
        let value = self.literal("comparison value")?;
        Ok(AstNode::Operand(Condition {
            field,
            comparator,
            value,
        }))
    }

    fn combinator(&mut self) -> Result<Combinator> {
        let combinator = match self.peek("AND or OR")? {
            Token::And => Combinator::And,
            Token::Or => Combinator::Or,
            other => return Err(self.unexpected(other, "AND or OR")),
        };
        self.position += 1;
        Ok(combinator)
    }

    fn comparator(&mut self) -> Result<Comparator> {
        let comparator = match self.peek("comparison operator")? {
            Token::Compare(op) => *op,
            other => return Err(self.unexpected(other, "comparison operator")),
        };
        self.position += 1;
        Ok(comparator)
    }

    fn literal(&mut self, expected: &str) -> Result<String> {
        let text = match self.peek(expected)? {
            Token::Literal(text) => text.clone(),
            other => return Err(self.unexpected(other, expected)),
        };
        self.position += 1;
        Ok(text)
    }

    fn expect_close(&mut self) -> Result<()> {
        match self.peek("')'")? {
            Token::RParen => {
                self.position += 1;
                Ok(())
            }
            other => Err(self.unexpected(other, "')'")),
        }
    }

    /// Look at the current token without consuming it
    fn peek(&self, expected: &str) -> Result<&'a Token> {
        self.tokens.get(self.position).ok_or_else(|| {
            RuleEngineError::syntax(
                format!("unexpected end of input, expected {}", expected),
                self.position,
            )
        })
    }

    fn unexpected(&self, found: &Token, expected: &str) -> RuleEngineError {
        RuleEngineError::syntax(
            format!("expected {}, found {}", expected, found),
            self.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_position(result: Result<AstNode>) -> usize {
        match result {
            Err(RuleEngineError::Syntax { position, .. }) => position,
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_condition() {
        let ast = parse_rule("age > 30").unwrap();
        match ast {
            AstNode::Operand(cond) => {
                assert_eq!(cond.field, "age");
                assert_eq!(cond.comparator, Comparator::Greater);
                assert_eq!(cond.value, "30");
            }
            _ => panic!("Expected operand"),
        }
    }

    #[test]
    fn test_parse_grouped_rule() {
        let ast = parse_rule("(age > 30 AND department = 'Sales')").unwrap();
        assert_eq!(
            ast,
            AstNode::operator(
                Combinator::And,
                AstNode::operand("age", Comparator::Greater, "30"),
                AstNode::operand("department", Comparator::Equal, "Sales"),
            )
        );
    }

    #[test]
    fn test_parse_nested_groups() {
        let ast =
            parse_rule("((age > 30 AND department = 'Sales') OR (salary >= 50000 OR experience >= 5))")
                .unwrap();
        match ast {
            AstNode::Operator {
                combinator: Combinator::Or,
                left,
                right,
            } => {
                assert!(matches!(
                    *left,
                    AstNode::Operator {
                        combinator: Combinator::And,
                        ..
                    }
                ));
                assert!(matches!(
                    *right,
                    AstNode::Operator {
                        combinator: Combinator::Or,
                        ..
                    }
                ));
            }
            _ => panic!("Expected OR at the root"),
        }
    }

    #[test]
    fn test_ungrouped_combination_is_rejected() {
        // Grouping is mandatory, so the trailing "AND ..." is left over
        let position = syntax_position(parse_rule("age > 30 AND department = 'Sales'"));
        assert_eq!(position, 3);
    }

    #[test]
    fn test_missing_right_operand() {
        let position = syntax_position(parse_rule("(age > 30 AND)"));
        assert_eq!(position, 5);
    }

    #[test]
    fn test_missing_comparator() {
        let position = syntax_position(parse_rule("(age 30 AND x = 1)"));
        assert_eq!(position, 2);
    }

    #[test]
    fn test_empty_field_rejected() {
        assert_eq!(syntax_position(parse_rule("'' = x")), 0);
        assert_eq!(syntax_position(parse_rule("(age > 30 OR '' = x)")), 5);
    }

    #[test]
    fn test_empty_value_allowed() {
        let ast = parse_rule("note = ''").unwrap();
        assert_eq!(ast, AstNode::operand("note", Comparator::Equal, ""));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(parse_rule("((age > 30 AND x = 1)").is_err());
        assert!(parse_rule("(age > 30 AND x = 1))").is_err());
    }

    #[test]
    fn test_missing_combinator() {
        let err = parse_rule("(age > 30 x = 1)").unwrap_err();
        assert!(err.to_string().contains("AND or OR"));
    }

    #[test]
    fn test_three_way_group_rejected() {
        assert!(parse_rule("(a = 1 AND b = 2 AND c = 3)").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(syntax_position(parse_rule("")), 0);
    }

    #[test]
    fn test_depth_limit() {
        let mut rule = "a = 1".to_string();
        for _ in 0..4 {
            rule = format!("({} OR a = 1)", rule);
        }
        let tokens = tokenize(&rule).unwrap();

        assert!(Parser::new(&tokens).with_max_depth(5).parse().is_ok());
        let err = Parser::new(&tokens).with_max_depth(4).parse().unwrap_err();
        assert!(err.to_string().contains("maximum depth"));
    }

    #[test]
    fn test_depth_bound_is_clamped() {
        let rule = "(".repeat(500_000);
        let tokens = tokenize(&rule).unwrap();
        let err = Parser::new(&tokens)
            .with_max_depth(usize::MAX)
            .parse()
            .unwrap_err();
        assert!(err.to_string().contains(&MAX_DEPTH_LIMIT.to_string()));
    }

    #[test]
    fn test_pathological_nesting_is_bounded() {
        let rule = "(".repeat(10_000);
        assert!(parse_rule(&rule).is_err());
    }
}
