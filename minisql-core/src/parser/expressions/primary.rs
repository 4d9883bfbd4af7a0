//! Prefix operators and primary expressions: literals, identifiers, `NULL`
//! and parenthesized sub-expressions.

use crate::ast::Expression;
use crate::lexer::{Keyword, Symbol, TokenKind};
use crate::parser::{ParseResult, Parser};

use super::operators::{is_prefix_operator, LOWEST_PRECEDENCE, MAX_NESTING_DEPTH};

impl Parser {
    /// Stacked prefix operators collapse into one `Unary` node whose operator
    /// list starts with the one nearest the operand.
    pub(super) fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let mut operators = Vec::new();
        while let Some(operator) = self.current_token().filter(|t| is_prefix_operator(t)).cloned() {
            operators.push(operator);
            self.advance();
        }

        let operand = self.parse_primary_expression()?;
        if operators.is_empty() {
            return Ok(operand);
        }

        operators.reverse();
        Ok(Expression::Unary {
            operand: Box::new(operand),
            operators,
        })
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.current_token().cloned() else {
            return Err(self.error("an expression"));
        };

        match token.kind {
            TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Numeric(_)
            | TokenKind::Boolean(_)
            | TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expression::Term(token))
            }
            TokenKind::Symbol(Symbol::LeftParen) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error(format!(
                        "at most {} levels of nested parentheses",
                        MAX_NESTING_DEPTH
                    )));
                }
                self.advance();
                self.depth += 1;
                let inner = self.parse_binary_expression(LOWEST_PRECEDENCE);
                self.depth -= 1;
                let inner = inner?;
                self.expect_symbol(Symbol::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.error("an expression")),
        }
    }
}
