//! Expression parsing by precedence climbing.
//!
//! Prefix operators are gathered in [`primary`]; binary operators and their
//! binding powers live in [`operators`].

mod operators;
mod primary;

use crate::ast::Expression;

use super::{ParseResult, Parser};

use operators::{binary_precedence, LOWEST_PRECEDENCE};

pub(crate) use operators::MAX_NESTING_DEPTH;

impl Parser {
    /// Parse a full expression. On failure the position is restored.
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.position;
        self.parse_binary_expression(LOWEST_PRECEDENCE)
            .map_err(|err| {
                self.position = start;
                err
            })
    }

    /// Fold operators binding at least as tightly as `min_precedence` into a
    /// left-associative tree.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expression()?;

        while let Some((operator, precedence)) = self
            .current_token()
            .and_then(|t| binary_precedence(t).map(|p| (t.clone(), p)))
        {
            if precedence < min_precedence {
                break;
            }
            self.advance();

            let right = self.parse_binary_expression(precedence + 1)?;
            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            };
        }

        Ok(left)
    }
}
