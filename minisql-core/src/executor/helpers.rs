//! Expression resolution and evaluation.
//!
//! The executor only evaluates terms (literals and column references),
//! optionally under prefix `-`, `+` or `NOT`. Expressions are resolved
//! against the table's columns before any row is touched, so a missing
//! column is reported even when the table is empty.

use std::cmp::Ordering;

use crate::ast::Expression;
use crate::error::StatementError;
use crate::lexer::{Keyword, Symbol, Token, TokenKind};

use super::{Cell, ColumnType, Table};

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Literal(Cell),
    Column(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Negate,
    Identity,
    Not,
}

/// An expression bound to a table's columns, ready to evaluate per row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolved {
    operand: Operand,
    operators: Vec<UnaryOp>,
    /// Static type; `None` for a bare `NULL` literal.
    pub column_type: Option<ColumnType>,
    /// Set when the expression is a plain column reference.
    pub column_name: Option<String>,
}

impl Resolved {
    pub fn column(index: usize, column_type: ColumnType, name: &str) -> Self {
        Self {
            operand: Operand::Column(index),
            operators: Vec::new(),
            column_type: Some(column_type),
            column_name: Some(name.to_string()),
        }
    }

    fn literal(cell: Cell) -> Self {
        Self {
            column_type: cell.column_type(),
            operand: Operand::Literal(cell),
            operators: Vec::new(),
            column_name: None,
        }
    }

    pub fn evaluate(&self, row: &[Cell]) -> Result<Cell, StatementError> {
        let mut value = match &self.operand {
            Operand::Literal(cell) => cell.clone(),
            Operand::Column(index) => row.get(*index).cloned().unwrap_or(Cell::Null),
        };

        for op in &self.operators {
            value = match (op, value) {
                (_, Cell::Null) => Cell::Null,
                (UnaryOp::Identity, cell) => cell,
                (UnaryOp::Negate, Cell::Int(v)) => Cell::Int(
                    v.checked_neg()
                        .ok_or_else(|| StatementError::Misc(format!("integer overflow negating {}", v)))?,
                ),
                (UnaryOp::Not, Cell::Boolean(v)) => Cell::Boolean(!v),
                (op, cell) => {
                    return Err(StatementError::InvalidExpression(format!(
                        "cannot apply {:?} to {}",
                        op, cell
                    )))
                }
            };
        }

        Ok(value)
    }
}

/// Resolve `expression` against `table`. Without a table, column references
/// are rejected and only literals reduce.
pub(crate) fn resolve(
    expression: &Expression,
    table: Option<&Table>,
) -> Result<Resolved, StatementError> {
    match expression {
        Expression::Term(token) => resolve_term(token, table),
        Expression::Unary { operand, operators } => {
            // A minus directly on a numeric literal is part of the literal,
            // so the most negative int can be written.
            let (mut resolved, operators) = match (operand.as_ref(), operators.split_first()) {
                (Expression::Term(term), Some((first, rest))) if first.is_symbol(Symbol::Minus) => {
                    match &term.kind {
                        TokenKind::Numeric(text) => {
                            (Resolved::literal(Cell::Int(parse_int(text, true)?)), rest)
                        }
                        _ => (resolve(operand, table)?, operators.as_slice()),
                    }
                }
                _ => (resolve(operand, table)?, operators.as_slice()),
            };
            for token in operators {
                let (op, operand_type) = match token.kind {
                    TokenKind::Symbol(Symbol::Minus) => (UnaryOp::Negate, ColumnType::Int),
                    TokenKind::Symbol(Symbol::Plus) => (UnaryOp::Identity, ColumnType::Int),
                    TokenKind::Keyword(Keyword::Not) => (UnaryOp::Not, ColumnType::Boolean),
                    _ => {
                        return Err(StatementError::InvalidExpression(format!(
                            "unknown prefix operator '{}'",
                            token.text()
                        )))
                    }
                };

                match resolved.column_type {
                    Some(found) if found != operand_type => {
                        return Err(StatementError::InvalidExpression(format!(
                            "operator '{}' cannot be applied to {}",
                            token.text().to_uppercase(),
                            found
                        )));
                    }
                    _ => resolved.column_type = Some(operand_type),
                }
                resolved.operators.push(op);
            }
            resolved.column_name = None;
            Ok(resolved)
        }
        Expression::Binary { operator, .. } => Err(StatementError::InvalidExpression(format!(
            "binary operator '{}' is not supported",
            operator.text().to_uppercase()
        ))),
    }
}

fn resolve_term(token: &Token, table: Option<&Table>) -> Result<Resolved, StatementError> {
    match &token.kind {
        TokenKind::Identifier(name) => {
            let Some(table) = table else {
                return Err(StatementError::InvalidExpression(format!(
                    "column reference '{}' is not allowed here",
                    name
                )));
            };
            let index = table
                .column_index(name)
                .ok_or_else(|| StatementError::ColumnDoesNotExist(name.clone()))?;
            Ok(Resolved::column(index, table.column_types()[index], name))
        }
        TokenKind::Numeric(text) => Ok(Resolved::literal(Cell::Int(parse_int(text, false)?))),
        TokenKind::String(text) => Ok(Resolved::literal(Cell::Text(text.clone()))),
        TokenKind::Boolean(text) => Ok(Resolved::literal(Cell::Boolean(text == "true"))),
        TokenKind::Keyword(Keyword::Null) => Ok(Resolved::literal(Cell::Null)),
        _ => Err(StatementError::InvalidExpression(format!("unexpected {}", token))),
    }
}

/// Coerce numeric literal text to an `int`, negated when `negative` is set.
///
/// Decimal and exponent forms are reduced with exact integer arithmetic and
/// accepted only when they denote a whole number in range.
pub(crate) fn parse_int(text: &str, negative: bool) -> Result<i64, StatementError> {
    let literal = if negative { format!("-{}", text) } else { text.to_string() };
    let invalid = || StatementError::Misc(format!("invalid numeric literal {}", literal));
    let out_of_range = || StatementError::Misc(format!("numeric literal {} is out of range for int", literal));

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(index) => (&text[..index], text[index + 1..].parse::<i64>().map_err(|_| invalid())?),
        None => (text, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    // value = digits * 10^scale
    let digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes())
        .map(|b| b - b'0')
        .skip_while(|&d| d == 0)
        .collect();
    if digits.is_empty() {
        return Ok(0);
    }
    let fraction_len = i64::try_from(fraction.len()).map_err(|_| invalid())?;
    let scale = exponent.checked_sub(fraction_len).ok_or_else(out_of_range)?;

    let kept = if scale < 0 {
        let dropped = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
        if dropped >= digits.len() || digits[digits.len() - dropped..].iter().any(|&d| d != 0) {
            return Err(StatementError::Misc(format!(
                "numeric literal {} is not a whole number",
                literal
            )));
        }
        &digits[..digits.len() - dropped]
    } else {
        &digits[..]
    };

    let mut magnitude: u64 = 0;
    for &digit in kept {
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u64::from(digit)))
            .ok_or_else(out_of_range)?;
    }
    if scale > 0 {
        let power = u32::try_from(scale)
            .ok()
            .and_then(|s| 10u64.checked_pow(s))
            .ok_or_else(out_of_range)?;
        magnitude = magnitude.checked_mul(power).ok_or_else(out_of_range)?;
    }

    if negative {
        0i64.checked_sub_unsigned(magnitude).ok_or_else(out_of_range)
    } else {
        i64::try_from(magnitude).map_err(|_| out_of_range())
    }
}

/// Resolve a WHERE clause, which must be boolean (or a bare `NULL`).
pub(crate) fn resolve_predicate(
    where_clause: Option<&Expression>,
    table: &Table,
) -> Result<Option<Resolved>, StatementError> {
    let Some(expression) = where_clause else {
        return Ok(None);
    };

    let resolved = resolve(expression, Some(table))?;
    match resolved.column_type {
        None | Some(ColumnType::Boolean) => Ok(Some(resolved)),
        Some(_) => Err(StatementError::WhereClauseNotBoolean),
    }
}

/// A row passes when there is no predicate or it evaluates to `true`.
pub(crate) fn row_matches(
    predicate: Option<&Resolved>,
    row: &[Cell],
) -> Result<bool, StatementError> {
    match predicate {
        None => Ok(true),
        Some(predicate) => Ok(predicate.evaluate(row)? == Cell::Boolean(true)),
    }
}

/// Total order for sorting: `NULL` first, then values of the same type in
/// their natural order.
pub(crate) fn compare_cells(left: &Cell, right: &Cell) -> Ordering {
    fn rank(cell: &Cell) -> u8 {
        match cell {
            Cell::Null => 0,
            Cell::Boolean(_) => 1,
            Cell::Int(_) => 2,
            Cell::Text(_) => 3,
        }
    }

    match (left, right) {
        (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
        (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
        (Cell::Boolean(a), Cell::Boolean(b)) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
