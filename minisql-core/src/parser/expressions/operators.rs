//! Operator tables.
//!
//! Binding power, loosest first:
//! - `OR`
//! - `AND`
//! - comparison: `=`, `<>`, `<`, `>`, `<=`, `>=`
//! - additive: `+`, `-`
//! - multiplicative: `*`, `/`
//!
//! Prefix `-`, `+` and `NOT` bind tighter than all of them.

use crate::lexer::{Keyword, Symbol, Token, TokenKind};

pub(crate) const LOWEST_PRECEDENCE: u8 = 1;

/// Deepest parenthesized expression accepted before the parser gives up.
pub(crate) const MAX_NESTING_DEPTH: usize = 256;

pub(crate) fn binary_precedence(token: &Token) -> Option<u8> {
    match token.kind {
        TokenKind::Keyword(Keyword::Or) => Some(1),
        TokenKind::Keyword(Keyword::And) => Some(2),
        TokenKind::Symbol(
            Symbol::Equal
            | Symbol::NotEqual
            | Symbol::LessThan
            | Symbol::GreaterThan
            | Symbol::LessThanEq
            | Symbol::GreaterThanEq,
        ) => Some(3),
        TokenKind::Symbol(Symbol::Plus | Symbol::Minus) => Some(4),
        TokenKind::Symbol(Symbol::Asterisk | Symbol::Slash) => Some(5),
        _ => None,
    }
}

pub(crate) fn is_prefix_operator(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Keyword(Keyword::Not) | TokenKind::Symbol(Symbol::Minus | Symbol::Plus)
    )
}
