//! Recursive-descent SQL parser.
//!
//! Every `parse_*_statement` method follows the same contract: it either
//! consumes tokens and returns `Ok(Some(..))`, or leaves the position exactly
//! where it found it. A statement whose leading keyword does not match
//! returns `Ok(None)` so the dispatcher can try the next one; a statement that
//! matched its keyword but is malformed returns a [`ParseError`], which aborts
//! the whole parse.

mod expressions;
mod statements;
#[cfg(test)]
mod tests;

use crate::ast::Statement;
use crate::error::{Location, ParseError};
use crate::lexer::{lex, Keyword, Symbol, Token, TokenKind};

pub type ParseResult<T> = Result<T, ParseError>;

/// Lex and parse a batch of `;`-separated statements.
pub fn parse(source: &str) -> ParseResult<Vec<Statement>> {
    Parser::from_source(source)?.parse_statements()
}

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Parenthesized expressions currently open.
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    pub fn from_source(source: &str) -> ParseResult<Self> {
        Ok(Self::new(lex(source)?))
    }

    /// Index of the next token to be consumed.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Location of the current token, or of the last one once input ran out.
    fn error_location(&self) -> Location {
        self.current_token()
            .or_else(|| self.tokens.last())
            .map(|token| token.location)
            .unwrap_or_default()
    }

    pub(crate) fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError::new(self.error_location(), expected)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_token().is_some_and(|t| t.is_keyword(keyword))
    }

    pub(crate) fn check_symbol(&self, symbol: Symbol) -> bool {
        self.current_token().is_some_and(|t| t.is_symbol(symbol))
    }

    pub(crate) fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        let matched = self.check_keyword(keyword);
        if matched {
            self.advance();
        }
        matched
    }

    pub(crate) fn consume_symbol(&mut self, symbol: Symbol) -> bool {
        let matched = self.check_symbol(symbol);
        if matched {
            self.advance();
        }
        matched
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(keyword.to_string()))
        }
    }

    pub(crate) fn expect_symbol(&mut self, symbol: Symbol) -> ParseResult<()> {
        if self.consume_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(symbol.to_string()))
        }
    }

    pub(crate) fn expect_identifier(&mut self, what: &str) -> ParseResult<Token> {
        match self.current_token() {
            Some(token @ Token {
                kind: TokenKind::Identifier(_),
                ..
            }) => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            _ => Err(self.error(what)),
        }
    }

    /// Run `parse`, rewinding to the entry position unless it produced a value.
    pub(crate) fn attempt<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<Option<T>>,
    ) -> ParseResult<Option<T>> {
        let start = self.position;
        let result = parse(self);
        if !matches!(result, Ok(Some(_))) {
            self.position = start;
        }
        result
    }

    /// One or more `item`s separated by commas.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.consume_symbol(Symbol::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Parse statements until the tokens run out. `;` separates statements
    /// and may also trail the last one.
    pub fn parse_statements(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);

            if self.is_at_end() {
                break;
            }
            if !self.consume_symbol(Symbol::Semicolon) {
                return Err(self.error("';' after statement"));
            }
        }

        Ok(statements)
    }

    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        if let Some(select) = self.parse_select_statement()? {
            return Ok(Statement::Select(select));
        }
        if let Some(insert) = self.parse_insert_statement()? {
            return Ok(Statement::Insert(insert));
        }
        if let Some(update) = self.parse_update_statement()? {
            return Ok(Statement::Update(update));
        }
        if let Some(delete) = self.parse_delete_statement()? {
            return Ok(Statement::Delete(delete));
        }
        if let Some(create) = self.parse_create_table_statement()? {
            return Ok(Statement::Create(create));
        }
        if let Some(drop) = self.parse_drop_table_statement()? {
            return Ok(Statement::DropTable(drop));
        }

        Err(self.error("a statement (SELECT, INSERT, UPDATE, DELETE, CREATE TABLE or DROP TABLE)"))
    }
}
