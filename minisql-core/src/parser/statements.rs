//! Statement parsers.

use crate::ast::*;
use crate::lexer::{Keyword, Symbol, TokenKind};

use super::{ParseResult, Parser};

impl Parser {
    /// `SELECT items FROM table [AS alias] [WHERE expr] [ORDER BY items]`
    pub fn parse_select_statement(&mut self) -> ParseResult<Option<SelectStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Select) {
                return Ok(None);
            }

            let items = p.parse_comma_separated(Self::parse_select_item)?;

            p.expect_keyword(Keyword::From)?;
            let from = p.parse_table_reference()?;
            let where_clause = p.parse_where_clause()?;

            let order_by = if p.consume_keyword(Keyword::Order) {
                p.expect_keyword(Keyword::By)?;
                p.parse_comma_separated(Self::parse_order_by_item)?
            } else {
                Vec::new()
            };

            Ok(Some(SelectStatement {
                items,
                from,
                where_clause,
                order_by,
            }))
        })
    }

    fn parse_select_item(&mut self) -> ParseResult<SelectItem> {
        if let Some(star) = self.current_token().filter(|t| t.is_symbol(Symbol::Asterisk)) {
            let star = star.clone();
            self.advance();
            return Ok(SelectItem::Star(star));
        }

        let expression = self.parse_expression()?;
        let alias = if self.consume_keyword(Keyword::As) {
            Some(self.expect_identifier("column alias")?)
        } else {
            None
        };

        Ok(SelectItem::Expression { expression, alias })
    }

    fn parse_table_reference(&mut self) -> ParseResult<TableReference> {
        let name = self.expect_identifier("table name")?;
        let alias = if self.consume_keyword(Keyword::As) {
            Some(self.expect_identifier("table alias")?)
        } else {
            None
        };
        Ok(TableReference { name, alias })
    }

    fn parse_order_by_item(&mut self) -> ParseResult<OrderByItem> {
        let expression = self.parse_expression()?;
        let descending = if self.consume_keyword(Keyword::Desc) {
            true
        } else {
            self.consume_keyword(Keyword::Asc);
            false
        };
        Ok(OrderByItem {
            expression,
            descending,
        })
    }

    fn parse_where_clause(&mut self) -> ParseResult<Option<Expression>> {
        if self.consume_keyword(Keyword::Where) {
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }

    /// `INSERT INTO table VALUES (exprs) [, (exprs)]*`
    pub fn parse_insert_statement(&mut self) -> ParseResult<Option<InsertStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Insert) {
                return Ok(None);
            }

            p.expect_keyword(Keyword::Into)?;
            let table = p.expect_identifier("table name")?;
            p.expect_keyword(Keyword::Values)?;

            let values = p.parse_comma_separated(|p| {
                p.expect_symbol(Symbol::LeftParen)?;
                let row = p.parse_comma_separated(Self::parse_expression)?;
                p.expect_symbol(Symbol::RightParen)?;
                Ok(row)
            })?;

            Ok(Some(InsertStatement { table, values }))
        })
    }

    /// `UPDATE table SET column = expr [, column = expr]* [WHERE expr]`
    pub fn parse_update_statement(&mut self) -> ParseResult<Option<UpdateStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Update) {
                return Ok(None);
            }

            let table = p.expect_identifier("table name")?;
            p.expect_keyword(Keyword::Set)?;

            let assignments = p.parse_comma_separated(|p| {
                let column = p.expect_identifier("column name")?;
                p.expect_symbol(Symbol::Equal)?;
                let value = p.parse_expression()?;
                Ok(Assignment { column, value })
            })?;

            let where_clause = p.parse_where_clause()?;

            Ok(Some(UpdateStatement {
                table,
                assignments,
                where_clause,
            }))
        })
    }

    /// `DELETE FROM table [WHERE expr]`
    pub fn parse_delete_statement(&mut self) -> ParseResult<Option<DeleteStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Delete) {
                return Ok(None);
            }

            p.expect_keyword(Keyword::From)?;
            let table = p.expect_identifier("table name")?;
            let where_clause = p.parse_where_clause()?;

            Ok(Some(DeleteStatement {
                table,
                where_clause,
            }))
        })
    }

    /// `CREATE TABLE name (column type [NOT NULL | NULL], ...)`
    pub fn parse_create_table_statement(&mut self) -> ParseResult<Option<CreateTableStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Create) {
                return Ok(None);
            }

            p.expect_keyword(Keyword::Table)?;
            let name = p.expect_identifier("table name")?;

            p.expect_symbol(Symbol::LeftParen)?;
            let columns = p.parse_comma_separated(Self::parse_column_definition)?;
            p.expect_symbol(Symbol::RightParen)?;

            Ok(Some(CreateTableStatement { name, columns }))
        })
    }

    fn parse_column_definition(&mut self) -> ParseResult<ColumnDefinition> {
        let name = self.expect_identifier("column name")?;

        // Any word is accepted here; the executor rejects unknown types.
        let data_type = match self.current_token() {
            Some(token) if matches!(token.kind, TokenKind::Keyword(_) | TokenKind::Identifier(_)) => {
                let token = token.clone();
                self.advance();
                token
            }
            _ => return Err(self.error("column type")),
        };

        let nullability = if self.consume_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Null)?;
            Nullability::NotNull
        } else if self.consume_keyword(Keyword::Null) {
            Nullability::Null
        } else {
            Nullability::Unspecified
        };

        Ok(ColumnDefinition {
            name,
            data_type,
            nullability,
        })
    }

    /// `DROP TABLE name`
    pub fn parse_drop_table_statement(&mut self) -> ParseResult<Option<DropTableStatement>> {
        self.attempt(|p| {
            if !p.consume_keyword(Keyword::Drop) {
                return Ok(None);
            }

            p.expect_keyword(Keyword::Table)?;
            let name = p.expect_identifier("table name")?;

            Ok(Some(DropTableStatement { name }))
        })
    }
}
