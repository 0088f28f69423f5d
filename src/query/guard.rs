//! Static read-only check applied before a statement is submitted.
//!
//! The check is lexical. Tokenizing (rather than matching on raw text) keeps
//! comments, string literals and quoted identifiers from being mistaken for
//! keywords: `SELECT 'DELETE'` is fine, `/* SELECT */ DELETE FROM t` is not.

use sqlparser::dialect::DatabricksDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

use super::{QueryError, QueryResult};

/// Statements allowed to start a query.
const READ_ONLY_LEADERS: &[&str] = &["SELECT", "WITH", "EXPLAIN", "SHOW", "DESCRIBE", "DESC", "VALUES"];

/// Keywords that turn a `WITH ...` statement into a write.
const DATA_MODIFYING: &[&str] = &["INSERT", "UPDATE", "DELETE", "MERGE"];

fn rejected(reason: impl Into<String>) -> QueryError {
    QueryError::NonReadOnly {
        reason: reason.into(),
    }
}

/// Unquoted keyword text, upper-cased.
fn keyword(token: &Token) -> Option<String> {
    match token {
        Token::Word(word) if word.quote_style.is_none() => Some(word.value.to_ascii_uppercase()),
        _ => None,
    }
}

/// Reject anything that is not a single read-only statement.
pub fn ensure_read_only(sql: &str) -> QueryResult<()> {
    let tokens = Tokenizer::new(&DatabricksDialect {}, sql)
        .tokenize()
        .map_err(|e| rejected(format!("statement could not be tokenized: {}", e)))?;

    let mut significant: Vec<Token> = tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        .collect();

    if significant.last() == Some(&Token::SemiColon) {
        significant.pop();
    }
    if significant.contains(&Token::SemiColon) {
        return Err(rejected("only a single statement is allowed"));
    }

    // `(SELECT ...)` is still a query.
    let Some(first) = significant.iter().find(|t| **t != Token::LParen) else {
        return Err(rejected("statement is empty"));
    };
    let leader = keyword(first).ok_or_else(|| rejected(format!("unexpected `{}` at start of statement", first)))?;
    if !READ_ONLY_LEADERS.contains(&leader.as_str()) {
        return Err(rejected(format!("{} statements are not allowed", leader)));
    }

    if leader == "WITH" {
        let mut depth = 0usize;
        for token in &significant {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                _ if depth == 0 => {
                    if let Some(word) = keyword(token).filter(|w| DATA_MODIFYING.contains(&w.as_str())) {
                        return Err(rejected(format!("WITH ... {} is not allowed", word)));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
