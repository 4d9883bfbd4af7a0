//! Abstract syntax tree for parsed statements.
//!
//! Nodes hold the tokens they were built from, so every name and literal
//! keeps its source location through to the executor.

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Create(CreateTableStatement),
    DropTable(DropTableStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
    Delete(DeleteStatement),
    Update(UpdateStatement),
}

impl Statement {
    /// Short statement tag, used in logs and shell output.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Create(_) => "CREATE TABLE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Delete(_) => "DELETE",
            Statement::Update(_) => "UPDATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal or identifier.
    Term(Token),
    /// Prefix operators, innermost first: `NOT -x` holds `[-, NOT]`.
    Unary {
        operand: Box<Expression>,
        operators: Vec<Token>,
    },
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: Token,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NotNull,
    Null,
    /// No constraint written; the column is nullable.
    Unspecified,
}

impl Nullability {
    pub fn is_nullable(&self) -> bool {
        !matches!(self, Nullability::NotNull)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Token,
    pub data_type: Token,
    pub nullability: Nullability,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: Token,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: Token,
    pub values: Vec<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Star(Token),
    Expression {
        expression: Expression,
        alias: Option<Token>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub name: Token,
    pub alias: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: Expression,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub items: Vec<SelectItem>,
    pub from: TableReference,
    pub where_clause: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: Token,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: Token,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expression>,
}
