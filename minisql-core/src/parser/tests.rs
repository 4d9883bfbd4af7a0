//! Tests for the SQL parser.

use super::*;
use crate::ast::*;
use crate::lexer::{Keyword, Symbol, TokenKind};
use super::expressions::MAX_NESTING_DEPTH;

fn parse_one(input: &str) -> Statement {
    let mut statements = parse(input).unwrap();
    assert_eq!(statements.len(), 1, "expected one statement in {input:?}");
    statements.remove(0)
}

fn select(input: &str) -> SelectStatement {
    match parse_one(input) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT statement, got {other:?}"),
    }
}

fn term_text(expression: &Expression) -> &str {
    match expression {
        Expression::Term(token) => token.text(),
        other => panic!("Expected term, got {other:?}"),
    }
}

fn where_of(input: &str) -> Expression {
    select(input).where_clause.expect("missing WHERE clause")
}

#[test]
fn test_create_table() {
    let stmt = parse_one("CREATE TABLE t (a int, b text NOT NULL, c boolean NULL)");
    let Statement::Create(create) = stmt else {
        panic!("Expected CREATE TABLE statement");
    };
    assert_eq!(create.name.text(), "t");

    let names: Vec<&str> = create.columns.iter().map(|c| c.name.text()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let types: Vec<&str> = create.columns.iter().map(|c| c.data_type.text()).collect();
    assert_eq!(types, vec!["int", "text", "boolean"]);

    let nullability: Vec<Nullability> = create.columns.iter().map(|c| c.nullability).collect();
    assert_eq!(
        nullability,
        vec![Nullability::Unspecified, Nullability::NotNull, Nullability::Null]
    );
}

#[test]
fn test_create_table_accepts_unknown_type_word() {
    let Statement::Create(create) = parse_one("CREATE TABLE t (a float)") else {
        panic!("Expected CREATE TABLE statement");
    };
    assert_eq!(
        create.columns[0].data_type.kind,
        TokenKind::Identifier("float".to_string())
    );
}

#[test]
fn test_drop_table() {
    let stmt = parse_one("DROP TABLE users");
    if let Statement::DropTable(drop) = stmt {
        assert_eq!(drop.name.text(), "users");
    } else {
        panic!("Expected DROP TABLE statement");
    }
}

#[test]
fn test_insert_multiple_tuples() {
    let stmt = parse_one("INSERT INTO t VALUES (1, 'x', true), (2, 'y', false)");
    let Statement::Insert(insert) = stmt else {
        panic!("Expected INSERT statement");
    };
    assert_eq!(insert.table.text(), "t");
    assert_eq!(insert.values.len(), 2);
    assert_eq!(insert.values[0].len(), 3);
    assert_eq!(term_text(&insert.values[1][1]), "y");
}

#[test]
fn test_select_items_and_aliases() {
    let s = select("SELECT a, 42 AS answer, * FROM t AS u");
    assert_eq!(s.items.len(), 3);
    assert_eq!(s.from.name.text(), "t");
    assert_eq!(s.from.alias.as_ref().map(|a| a.text()), Some("u"));

    match &s.items[1] {
        SelectItem::Expression { expression, alias } => {
            assert_eq!(term_text(expression), "42");
            assert_eq!(alias.as_ref().map(|a| a.text()), Some("answer"));
        }
        other => panic!("Expected expression item, got {other:?}"),
    }
    assert!(matches!(s.items[2], SelectItem::Star(_)));
}

#[test]
fn test_select_where_and_order_by() {
    let s = select("SELECT a FROM t WHERE active ORDER BY a DESC, b, c ASC");
    assert_eq!(term_text(s.where_clause.as_ref().unwrap()), "active");

    let order: Vec<(&str, bool)> = s
        .order_by
        .iter()
        .map(|item| (term_text(&item.expression), item.descending))
        .collect();
    assert_eq!(order, vec![("a", true), ("b", false), ("c", false)]);
}

#[test]
fn test_update() {
    let stmt = parse_one("UPDATE users SET age = 31, name = 'Al' WHERE admin");
    let Statement::Update(update) = stmt else {
        panic!("Expected UPDATE statement");
    };
    assert_eq!(update.table.text(), "users");
    assert_eq!(update.assignments.len(), 2);
    assert_eq!(update.assignments[1].column.text(), "name");
    assert_eq!(term_text(&update.assignments[1].value), "Al");
    assert!(update.where_clause.is_some());
}

#[test]
fn test_delete() {
    let stmt = parse_one("DELETE FROM users");
    if let Statement::Delete(delete) = stmt {
        assert_eq!(delete.table.text(), "users");
        assert!(delete.where_clause.is_none());
    } else {
        panic!("Expected DELETE statement");
    }
}

#[test]
fn test_multiple_statements() {
    let statements = parse("CREATE TABLE t (a int); INSERT INTO t VALUES (1); SELECT a FROM t;").unwrap();
    let kinds: Vec<&str> = statements.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec!["CREATE TABLE", "INSERT", "SELECT"]);
}

#[test]
fn test_trailing_semicolon_is_optional() {
    assert_eq!(parse("SELECT a FROM t").unwrap().len(), 1);
    assert_eq!(parse("SELECT a FROM t;").unwrap().len(), 1);
}

#[test]
fn test_empty_source() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("   ").unwrap().is_empty());
}

#[test]
fn test_missing_semicolon_between_statements() {
    let err = parse("SELECT a FROM t SELECT b FROM t").unwrap_err();
    assert_eq!(err.location.column, 16);
    assert!(err.expected.contains("';'"));
}

#[test]
fn test_precedence() {
    // a OR b AND c = 1 + 2 * 3  ==>  a OR (b AND (c = (1 + (2 * 3))))
    let expr = where_of("SELECT a FROM t WHERE a OR b AND c = 1 + 2 * 3");
    let Expression::Binary { left, right, operator } = expr else {
        panic!("Expected binary expression");
    };
    assert!(operator.is_keyword(Keyword::Or));
    assert_eq!(term_text(&left), "a");

    let Expression::Binary { right, operator, .. } = *right else {
        panic!("Expected AND");
    };
    assert!(operator.is_keyword(Keyword::And));

    let Expression::Binary { right, operator, .. } = *right else {
        panic!("Expected =");
    };
    assert!(operator.is_symbol(Symbol::Equal));

    let Expression::Binary { right, operator, .. } = *right else {
        panic!("Expected +");
    };
    assert!(operator.is_symbol(Symbol::Plus));
    assert!(matches!(
        *right,
        Expression::Binary { ref operator, .. } if operator.is_symbol(Symbol::Asterisk)
    ));
}

#[test]
fn test_left_associative() {
    // 1 - 2 - 3  ==>  (1 - 2) - 3
    let expr = where_of("SELECT a FROM t WHERE 1 - 2 - 3");
    let Expression::Binary { left, right, .. } = expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(term_text(&right), "3");
    assert!(matches!(*left, Expression::Binary { .. }));
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = where_of("SELECT a FROM t WHERE (1 + 2) * 3");
    let Expression::Binary { left, operator, .. } = expr else {
        panic!("Expected binary expression");
    };
    assert!(operator.is_symbol(Symbol::Asterisk));
    assert!(matches!(*left, Expression::Binary { .. }));
}

fn nested(levels: usize) -> String {
    format!("SELECT {}1{} FROM t", "(".repeat(levels), ")".repeat(levels))
}

#[test]
fn test_nested_parentheses_within_limit() {
    let stmt = select(&nested(50));
    let SelectItem::Expression { expression, .. } = &stmt.items[0] else {
        panic!("Expected expression item");
    };
    assert_eq!(term_text(expression), "1");
    assert!(parse(&nested(MAX_NESTING_DEPTH)).is_ok());
}

#[test]
fn test_deep_nesting_is_a_parse_error() {
    let err = parse(&nested(MAX_NESTING_DEPTH + 1)).unwrap_err();
    assert!(err.expected.contains("nested parentheses"), "{err}");

    let err = parse(&nested(200_000)).unwrap_err();
    assert!(err.expected.contains("nested parentheses"), "{err}");

    let mut parser = Parser::from_source(&format!("{} SELECT (1) FROM t", nested(300))).unwrap();
    assert!(parser.parse_statements().is_err());
    assert_eq!(parser.depth, 0);
}

#[test]
fn test_stacked_unary_operators_innermost_first() {
    let expr = where_of("SELECT a FROM t WHERE NOT - a");
    let Expression::Unary { operand, operators } = expr else {
        panic!("Expected unary expression");
    };
    assert_eq!(term_text(&operand), "a");
    assert!(operators[0].is_symbol(Symbol::Minus));
    assert!(operators[1].is_keyword(Keyword::Not));
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    let expr = where_of("SELECT a FROM t WHERE -a * b");
    let Expression::Binary { left, .. } = expr else {
        panic!("Expected binary expression");
    };
    assert!(matches!(*left, Expression::Unary { .. }));
}

#[test]
fn test_null_literal() {
    let Statement::Insert(insert) = parse_one("INSERT INTO t VALUES (NULL)") else {
        panic!("Expected INSERT statement");
    };
    assert!(matches!(
        &insert.values[0][0],
        Expression::Term(token) if token.is_keyword(Keyword::Null)
    ));
}

#[test]
fn test_select_parser_rewinds_on_other_statement() {
    let mut parser = Parser::from_source("INSERT INTO t VALUES (1)").unwrap();
    let before = parser.position();
    assert_eq!(parser.parse_select_statement().unwrap(), None);
    assert_eq!(parser.position(), before);
}

#[test]
fn test_select_parser_rewinds_on_error() {
    let mut parser = Parser::from_source("SELECT a t").unwrap();
    let err = parser.parse_select_statement().unwrap_err();
    assert_eq!(err.expected, "FROM");
    assert_eq!(parser.position(), 0);
}

#[test]
fn test_statement_parsers_rewind_mid_batch() {
    let mut parser = Parser::from_source("DROP TABLE a; SELECT x FROM a").unwrap();
    assert!(matches!(parser.parse_statement().unwrap(), Statement::DropTable(_)));
    assert!(parser.consume_symbol(Symbol::Semicolon));

    let position = parser.position();
    assert_eq!(parser.parse_create_table_statement().unwrap(), None);
    assert_eq!(parser.parse_delete_statement().unwrap(), None);
    assert_eq!(parser.position(), position);
    assert!(parser.parse_select_statement().unwrap().is_some());
    assert!(parser.is_at_end());
}

#[test]
fn test_error_locations() {
    let err = parse("SELECT FROM t").unwrap_err();
    assert_eq!(err.location, Location::new(0, 7));
    assert_eq!(err.expected, "an expression");

    let err = parse("CREATE TABLE t (a)").unwrap_err();
    assert_eq!(err.expected, "column type");

    let err = parse("INSERT INTO t VALUES (1").unwrap_err();
    assert_eq!(err.expected, "')'");

    let err = parse("UPDATE t SET a 1").unwrap_err();
    assert_eq!(err.expected, "'='");
    assert_eq!(err.location, Location::new(0, 15));
}

#[test]
fn test_unknown_leading_token() {
    let err = parse("EXPLAIN SELECT a FROM t").unwrap_err();
    assert_eq!(err.location, Location::new(0, 0));
    assert!(err.expected.starts_with("a statement"));
}

#[test]
fn test_lex_error_surfaces_as_parse_error() {
    let err = parse("SELECT a FROM t WHERE a = 1.2.3").unwrap_err();
    assert_eq!(err.location, Location::new(0, 26));
}

#[test]
fn test_error_aborts_whole_batch() {
    assert!(parse("SELECT a FROM t; DROP t; SELECT b FROM t").is_err());
}
