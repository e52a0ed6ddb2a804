//! Rule string tokenizer

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::Comparator;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Anchored token pattern, tried at the cursor. Alternation order matters:
/// two-character comparators come before their one-character prefixes, and
/// signed or fractional numbers before plain word runs.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<paren>[()])|(?P<cmp>>=|<=|[<>=])|'(?P<quoted>[^']*)'|(?P<number>-?\d+\.\d+|-\d+)|(?P<word>\w+))",
    )
    .expect("valid token pattern")
});

/// Lexical token. Bare words, numbers and quoted strings all become
/// `Literal`; the parser decides what a literal means from its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    And,
    Or,
    Compare(Comparator),
    Literal(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Compare(op) => write!(f, "{}", op),
            Token::Literal(text) => write!(f, "'{}'", text),
        }
    }
}

/// Collapse whitespace runs to a single space and trim the ends
pub fn normalize(rule: &str) -> String {
    rule.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a rule string into tokens
pub fn tokenize(rule: &str) -> Result<Vec<Token>> {
    let normalized = normalize(rule);
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < normalized.len() {
        let rest = &normalized[offset..];
        if rest.starts_with(' ') {
            offset += 1;
            continue;
        }

        let caps = TOKEN_RE.captures(rest).ok_or_else(|| {
            let snippet: String = rest.chars().take(12).collect();
            RuleEngineError::lex(format!("unrecognized input near \"{}\"", snippet), offset)
        })?;

        let token = if let Some(m) = caps.name("paren") {
            if m.as_str() == "(" {
                Token::LParen
            } else {
                Token::RParen
            }
        } else if let Some(m) = caps.name("cmp") {
            let op = m
                .as_str()
                .parse::<Comparator>()
                .map_err(|reason| RuleEngineError::lex(reason, offset))?;
            Token::Compare(op)
        } else if let Some(m) = caps.name("quoted") {
            Token::Literal(m.as_str().to_string())
        } else if let Some(m) = caps.name("number") {
            Token::Literal(m.as_str().to_string())
        } else if let Some(m) = caps.name("word") {
            match m.as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                word => Token::Literal(word.to_string()),
            }
        } else {
            return Err(RuleEngineError::lex("empty match", offset));
        };

        // Group 0 spans the whole match, quotes included
        offset += caps.get(0).map_or(0, |m| m.end());
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Token {
        Token::Literal(text.to_string())
    }

    #[test]
    fn test_tokenize_grouped_rule() {
        let tokens = tokenize("(age > 30 AND department = 'Sales')").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                lit("age"),
                Token::Compare(Comparator::Greater),
                lit("30"),
                Token::And,
                lit("department"),
                Token::Compare(Comparator::Equal),
                lit("Sales"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_longest_match_for_comparators() {
        let tokens = tokenize("a>=1").unwrap();
        assert_eq!(
            tokens,
            vec![lit("a"), Token::Compare(Comparator::GreaterEqual), lit("1")]
        );

        let tokens = tokenize("a <= 1").unwrap();
        assert_eq!(tokens[1], Token::Compare(Comparator::LessEqual));
    }

    #[test]
    fn test_whitespace_normalized() {
        let tokens = tokenize("  (\tage\n>   30 OR  x = y )  ").unwrap();
        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[0], Token::LParen);
        assert_eq!(tokens[4], Token::Or);
    }

    #[test]
    fn test_keywords_are_whole_words() {
        let tokens = tokenize("ANDROID = ORACLE").unwrap();
        assert_eq!(
            tokens,
            vec![lit("ANDROID"), Token::Compare(Comparator::Equal), lit("ORACLE")]
        );
    }

    #[test]
    fn test_quoted_keyword_is_literal() {
        let tokens = tokenize("mode = 'AND'").unwrap();
        assert_eq!(tokens[2], lit("AND"));
    }

    #[test]
    fn test_quoted_literal_keeps_inner_space() {
        let tokens = tokenize("city = 'New York'").unwrap();
        assert_eq!(tokens[2], lit("New York"));
    }

    #[test]
    fn test_signed_and_fractional_numbers() {
        let tokens = tokenize("(score > -3 AND ratio <= 0.75)").unwrap();
        assert_eq!(tokens[3], lit("-3"));
        assert_eq!(tokens[7], lit("0.75"));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("age > 30 & x = 1").unwrap_err();
        match err {
            RuleEngineError::Lex { position, .. } => assert_eq!(position, 9),
            other => panic!("Expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            tokenize("name = 'Sales"),
            Err(RuleEngineError::Lex { .. })
        ));
    }

    #[test]
    fn test_not_equal_is_rejected() {
        assert!(tokenize("age != 30").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
