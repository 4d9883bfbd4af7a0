//! In-memory catalog backend.
//!
//! Tables live in a map keyed by name and are only reached through that map.
//! Every mutating statement validates all of its input before it touches a
//! table, so a failed statement leaves the catalog as it was.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::ast::*;
use crate::error::StatementError;

use super::helpers::{compare_cells, resolve, resolve_predicate, row_matches, Resolved};
use super::{Backend, CatalogSnapshot, Cell, Column, ColumnType, ExecutionOutcome, ResultSet, Table};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Table>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn table_or_err(&self, name: &str) -> Result<&Table, StatementError> {
        self.tables
            .get(name)
            .ok_or_else(|| StatementError::TableDoesNotExist(name.to_string()))
    }

    fn table_mut_or_err(&mut self, name: &str) -> Result<&mut Table, StatementError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StatementError::TableDoesNotExist(name.to_string()))
    }

    fn create_table(&mut self, stmt: &CreateTableStatement) -> Result<ExecutionOutcome, StatementError> {
        let name = stmt.name.text();
        if self.tables.contains_key(name) {
            return Err(StatementError::TableAlreadyExists(name.to_string()));
        }

        let mut table = Table::default();
        for column in &stmt.columns {
            let column_type = ColumnType::from_token(&column.data_type).ok_or_else(|| {
                StatementError::UnsupportedColumnType(column.data_type.text().to_string())
            })?;
            table.add_column(
                column.name.text(),
                column_type,
                column.nullability.is_nullable(),
            )?;
        }

        info!(table = name, columns = table.column_count(), "created table");
        self.tables.insert(name.to_string(), table);
        Ok(ExecutionOutcome::Created)
    }

    fn drop_table(&mut self, stmt: &DropTableStatement) -> Result<ExecutionOutcome, StatementError> {
        let name = stmt.name.text();
        match self.tables.remove(name) {
            Some(table) => {
                info!(table = name, rows = table.row_count(), "dropped table");
                Ok(ExecutionOutcome::Dropped)
            }
            None => Err(StatementError::TableDoesNotExist(name.to_string())),
        }
    }

    fn insert(&mut self, stmt: &InsertStatement) -> Result<ExecutionOutcome, StatementError> {
        let table = self.table_mut_or_err(stmt.table.text())?;
        let expected = table.column_count();

        let mut staged = Vec::with_capacity(stmt.values.len());
        for tuple in &stmt.values {
            let found = tuple.len();
            if found < expected {
                return Err(StatementError::NotEnoughValues { expected, found });
            }
            if found > expected {
                return Err(StatementError::TooManyValues { expected, found });
            }

            let row = tuple
                .iter()
                .map(|expression| resolve(expression, None)?.evaluate(&[]))
                .collect::<Result<Vec<Cell>, StatementError>>()?;
            table.check_row(&row)?;
            staged.push(row);
        }

        let count = staged.len();
        table.rows.extend(staged);
        debug!(table = stmt.table.text(), rows = count, "inserted rows");
        Ok(ExecutionOutcome::Inserted(count))
    }

    fn select(&self, stmt: &SelectStatement) -> Result<ResultSet, StatementError> {
        let table = self.table_or_err(stmt.from.name.text())?;

        let mut columns = Vec::new();
        let mut projections = Vec::new();
        for item in &stmt.items {
            match item {
                SelectItem::Star(_) => {
                    for (index, name) in table.column_names().iter().enumerate() {
                        let column_type = table.column_types()[index];
                        columns.push(Column::new(name.as_str(), column_type));
                        projections.push(Resolved::column(index, column_type, name));
                    }
                }
                SelectItem::Expression { expression, alias } => {
                    let resolved = resolve(expression, Some(table))?;
                    let name = match (alias, &resolved.column_name) {
                        (Some(alias), _) => alias.text().to_string(),
                        (None, Some(column)) => column.clone(),
                        (None, None) => format!("col_{}", columns.len()),
                    };
                    // A bare NULL has no type of its own; report it as text.
                    let column_type = resolved.column_type.unwrap_or(ColumnType::Text);
                    columns.push(Column::new(name, column_type));
                    projections.push(resolved);
                }
            }
        }

        let predicate = resolve_predicate(stmt.where_clause.as_ref(), table)?;
        let sort_keys = stmt
            .order_by
            .iter()
            .map(|item| -> Result<(Resolved, bool), StatementError> {
                Ok((resolve(&item.expression, Some(table))?, item.descending))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut selected = Vec::new();
        for row in table.rows() {
            if row_matches(predicate.as_ref(), row)? {
                selected.push(row);
            }
        }

        if !sort_keys.is_empty() {
            let mut keyed = selected
                .into_iter()
                .map(|row| {
                    let keys = sort_keys
                        .iter()
                        .map(|(key, _)| key.evaluate(row))
                        .collect::<Result<Vec<Cell>, StatementError>>()?;
                    Ok::<_, StatementError>((keys, row))
                })
                .collect::<Result<Vec<_>, StatementError>>()?;

            // stable: ties keep table order
            keyed.sort_by(|(left, _), (right, _)| {
                left.iter()
                    .zip(right)
                    .zip(&sort_keys)
                    .map(|((l, r), (_, descending))| {
                        let ordering = compare_cells(l, r);
                        if *descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            selected = keyed.into_iter().map(|(_, row)| row).collect();
        }

        let rows = selected
            .into_iter()
            .map(|row| {
                projections
                    .iter()
                    .map(|projection| projection.evaluate(row))
                    .collect::<Result<Vec<Cell>, StatementError>>()
            })
            .collect::<Result<Vec<_>, StatementError>>()?;

        Ok(ResultSet { columns, rows })
    }

    fn delete(&mut self, stmt: &DeleteStatement) -> Result<ExecutionOutcome, StatementError> {
        let table = self.table_mut_or_err(stmt.table.text())?;
        let predicate = resolve_predicate(stmt.where_clause.as_ref(), table)?;

        let doomed = table
            .rows
            .iter()
            .map(|row| row_matches(predicate.as_ref(), row))
            .collect::<Result<Vec<bool>, StatementError>>()?;

        let before = table.row_count();
        let mut doomed = doomed.into_iter();
        table.rows.retain(|_| !doomed.next().unwrap_or(false));
        let count = before - table.row_count();

        debug!(table = stmt.table.text(), rows = count, "deleted rows");
        Ok(ExecutionOutcome::Deleted(count))
    }

    fn update(&mut self, stmt: &UpdateStatement) -> Result<ExecutionOutcome, StatementError> {
        let table = self.table_mut_or_err(stmt.table.text())?;

        let mut assigned = HashSet::new();
        let mut assignments = Vec::with_capacity(stmt.assignments.len());
        for assignment in &stmt.assignments {
            let name = assignment.column.text();
            let index = table
                .column_index(name)
                .ok_or_else(|| StatementError::ColumnDoesNotExist(name.to_string()))?;
            if !assigned.insert(index) {
                return Err(StatementError::DuplicateColumn(name.to_string()));
            }

            let value = resolve(&assignment.value, Some(&*table))?;
            if value.column_type.is_some() {
                table.check_value(index, value.column_type)?;
            }
            assignments.push((index, value));
        }

        let predicate = resolve_predicate(stmt.where_clause.as_ref(), table)?;

        // Right-hand sides see the row as it was before the update.
        let mut staged = Vec::new();
        for (position, row) in table.rows.iter().enumerate() {
            if !row_matches(predicate.as_ref(), row)? {
                continue;
            }
            let mut updated = row.clone();
            for (index, value) in &assignments {
                updated[*index] = value.evaluate(row)?;
            }
            table.check_row(&updated)?;
            staged.push((position, updated));
        }

        let count = staged.len();
        for (position, row) in staged {
            table.rows[position] = row;
        }

        debug!(table = stmt.table.text(), rows = count, "updated rows");
        Ok(ExecutionOutcome::Updated(count))
    }
}

impl Backend for MemoryBackend {
    fn execute(&mut self, statement: &Statement) -> Result<ExecutionOutcome, StatementError> {
        debug!(statement = statement.kind(), "executing statement");
        match statement {
            Statement::Create(stmt) => self.create_table(stmt),
            Statement::DropTable(stmt) => self.drop_table(stmt),
            Statement::Insert(stmt) => self.insert(stmt),
            Statement::Select(stmt) => self.select(stmt).map(ExecutionOutcome::Selected),
            Statement::Delete(stmt) => self.delete(stmt),
            Statement::Update(stmt) => self.update(stmt),
        }
    }

    fn snapshot(&self) -> CatalogSnapshot {
        self.tables
            .iter()
            .map(|(name, table)| (name.clone(), table.snapshot()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(backend: &mut MemoryBackend, sql: &str) -> Result<ExecutionOutcome, StatementError> {
        let statements = parse(sql).unwrap();
        let mut last = Ok(ExecutionOutcome::Created);
        for statement in &statements {
            last = backend.execute(statement);
        }
        last
    }

    fn query(backend: &mut MemoryBackend, sql: &str) -> ResultSet {
        match run(backend, sql) {
            Ok(ExecutionOutcome::Selected(rs)) => rs,
            other => panic!("Expected result set, got {other:?}"),
        }
    }

    fn fixture() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        run(
            &mut backend,
            "CREATE TABLE people (id int NOT NULL, name text, active boolean);
             INSERT INTO people VALUES (3, 'carol', true), (1, 'alice', false), (2, 'bob', true), (4, NULL, NULL)",
        )
        .unwrap();
        backend
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_create_table_shape() {
        let mut backend = MemoryBackend::new();
        assert_eq!(
            run(&mut backend, "CREATE TABLE t (a int, b text, c boolean)"),
            Ok(ExecutionOutcome::Created)
        );

        let table = backend.table("t").unwrap();
        assert_eq!(table.column_names(), ["a", "b", "c"]);
        assert_eq!(
            table.column_types(),
            [ColumnType::Int, ColumnType::Text, ColumnType::Boolean]
        );
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_create_table_errors() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "CREATE TABLE people (x int)"),
            Err(StatementError::TableAlreadyExists("people".to_string()))
        );
        assert_eq!(backend.table("people").unwrap().row_count(), 4);

        assert_eq!(
            run(&mut backend, "CREATE TABLE t (a float)"),
            Err(StatementError::UnsupportedColumnType("float".to_string()))
        );
        assert_eq!(
            run(&mut backend, "CREATE TABLE t (a int, a text)"),
            Err(StatementError::DuplicateColumn("a".to_string()))
        );
        assert!(backend.table("t").is_none());
    }

    #[test]
    fn test_drop_table() {
        let mut backend = fixture();
        assert_eq!(run(&mut backend, "DROP TABLE people"), Ok(ExecutionOutcome::Dropped));
        assert!(backend.table("people").is_none());
        assert_eq!(
            run(&mut backend, "DROP TABLE people"),
            Err(StatementError::TableDoesNotExist("people".to_string()))
        );
    }

    #[test]
    fn test_insert_is_all_or_nothing() {
        let mut backend = fixture();
        let err = run(&mut backend, "INSERT INTO people VALUES (5, 'eve', true), (6, 7, true)");
        assert_eq!(
            err,
            Err(StatementError::TypeMismatch {
                column: "name".to_string(),
                expected: ColumnType::Text,
                found: ColumnType::Int,
            })
        );
        assert_eq!(backend.table("people").unwrap().row_count(), 4);
    }

    #[test]
    fn test_insert_arity() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "INSERT INTO people VALUES (5, 'eve')"),
            Err(StatementError::NotEnoughValues {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            run(&mut backend, "INSERT INTO people VALUES (5, 'eve', true, 1)"),
            Err(StatementError::TooManyValues {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn test_insert_constraints() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "INSERT INTO people VALUES (NULL, 'x', true)"),
            Err(StatementError::NullConstraint("id".to_string()))
        );
        assert!(matches!(
            run(&mut backend, "INSERT INTO people VALUES (id, 'x', true)"),
            Err(StatementError::InvalidExpression(_))
        ));
        assert!(matches!(
            run(&mut backend, "INSERT INTO people VALUES (1 + 1, 'x', true)"),
            Err(StatementError::InvalidExpression(_))
        ));
        assert_eq!(
            run(&mut backend, "INSERT INTO nowhere VALUES (1)"),
            Err(StatementError::TableDoesNotExist("nowhere".to_string()))
        );
        assert_eq!(
            run(&mut backend, "INSERT INTO people VALUES (-7, 'neg', NOT true)"),
            Ok(ExecutionOutcome::Inserted(1))
        );
    }

    #[test]
    fn test_select_columns_and_literals() {
        let mut backend = fixture();
        let rs = query(&mut backend, "SELECT name, 42, 'y' AS label, id FROM people");
        assert_eq!(rs.column_names(), vec!["name", "col_1", "label", "id"]);
        assert_eq!(rs.columns[1].column_type, ColumnType::Int);
        assert_eq!(rs.rows.len(), 4);
        assert_eq!(
            rs.rows[0],
            vec![text("carol"), Cell::Int(42), text("y"), Cell::Int(3)]
        );
    }

    #[test]
    fn test_select_star() {
        let mut backend = fixture();
        let rs = query(&mut backend, "SELECT *, 1 FROM people");
        assert_eq!(rs.column_names(), vec!["id", "name", "active", "col_3"]);
        assert_eq!(rs.rows[3], vec![Cell::Int(4), Cell::Null, Cell::Null, Cell::Int(1)]);
    }

    #[test]
    fn test_select_where() {
        let mut backend = fixture();
        let rs = query(&mut backend, "SELECT id FROM people WHERE active");
        assert_eq!(rs.rows, vec![vec![Cell::Int(3)], vec![Cell::Int(2)]]);

        let rs = query(&mut backend, "SELECT id FROM people WHERE NOT active");
        assert_eq!(rs.rows, vec![vec![Cell::Int(1)]]);

        let rs = query(&mut backend, "SELECT id FROM people WHERE false");
        assert!(rs.rows.is_empty());

        assert_eq!(
            run(&mut backend, "SELECT id FROM people WHERE name"),
            Err(StatementError::WhereClauseNotBoolean)
        );
        assert!(matches!(
            run(&mut backend, "SELECT id FROM people WHERE id = 1"),
            Err(StatementError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_select_order_by() {
        let mut backend = fixture();
        let rs = query(&mut backend, "SELECT id FROM people ORDER BY id");
        let ids: Vec<Cell> = rs.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(ids, vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]);

        let rs = query(&mut backend, "SELECT name FROM people ORDER BY name DESC");
        let names: Vec<Cell> = rs.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(names, vec![text("carol"), text("bob"), text("alice"), Cell::Null]);

        // second key orders rows within each group of the first
        let rs = query(&mut backend, "SELECT id FROM people ORDER BY active DESC, name");
        let ids: Vec<Cell> = rs.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(ids, vec![Cell::Int(2), Cell::Int(3), Cell::Int(1), Cell::Int(4)]);
    }

    #[test]
    fn test_order_by_puts_null_first() {
        let mut backend = fixture();
        let rs = query(&mut backend, "SELECT id FROM people ORDER BY name");
        let ids: Vec<Cell> = rs.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(ids, vec![Cell::Int(4), Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
    }

    #[test]
    fn test_insert_numeric_literals_exactly() {
        let mut backend = MemoryBackend::new();
        run(&mut backend, "CREATE TABLE n (v int)").unwrap();
        assert_eq!(
            run(
                &mut backend,
                "INSERT INTO n VALUES (9007199254740993.0), (-9223372036854775808), (12e1)"
            ),
            Ok(ExecutionOutcome::Inserted(3))
        );

        let rs = query(&mut backend, "SELECT v FROM n");
        let values: Vec<Cell> = rs.rows.into_iter().map(|mut r| r.remove(0)).collect();
        assert_eq!(
            values,
            vec![Cell::Int(9007199254740993), Cell::Int(i64::MIN), Cell::Int(120)]
        );

        assert!(matches!(
            run(&mut backend, "INSERT INTO n VALUES (1.0000000000000001)"),
            Err(StatementError::Misc(_))
        ));
        assert!(matches!(
            run(&mut backend, "INSERT INTO n VALUES (9223372036854775808)"),
            Err(StatementError::Misc(_))
        ));
        assert_eq!(query(&mut backend, "SELECT v FROM n").rows.len(), 3);
    }

    #[test]
    fn test_select_errors() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "SELECT x FROM missing"),
            Err(StatementError::TableDoesNotExist("missing".to_string()))
        );
        assert_eq!(
            run(&mut backend, "SELECT nope FROM people"),
            Err(StatementError::ColumnDoesNotExist("nope".to_string()))
        );
        assert!(matches!(
            run(&mut backend, "SELECT id * 2 FROM people"),
            Err(StatementError::InvalidExpression(_))
        ));
        assert_eq!(
            run(&mut backend, "SELECT id FROM people ORDER BY rank"),
            Err(StatementError::ColumnDoesNotExist("rank".to_string()))
        );
    }

    #[test]
    fn test_missing_column_reported_on_empty_table() {
        let mut backend = MemoryBackend::new();
        run(&mut backend, "CREATE TABLE t (a int)").unwrap();
        assert_eq!(
            run(&mut backend, "SELECT b FROM t"),
            Err(StatementError::ColumnDoesNotExist("b".to_string()))
        );
    }

    #[test]
    fn test_delete() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "DELETE FROM people WHERE active"),
            Ok(ExecutionOutcome::Deleted(2))
        );
        let rs = query(&mut backend, "SELECT id FROM people");
        assert_eq!(rs.rows, vec![vec![Cell::Int(1)], vec![Cell::Int(4)]]);

        assert_eq!(run(&mut backend, "DELETE FROM people"), Ok(ExecutionOutcome::Deleted(2)));
        assert_eq!(backend.table("people").unwrap().row_count(), 0);
    }

    #[test]
    fn test_delete_rejects_bad_predicate() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "DELETE FROM people WHERE id"),
            Err(StatementError::WhereClauseNotBoolean)
        );
        assert_eq!(backend.table("people").unwrap().row_count(), 4);
    }

    #[test]
    fn test_update() {
        let mut backend = fixture();
        assert_eq!(
            run(&mut backend, "UPDATE people SET name = 'x', active = false WHERE active"),
            Ok(ExecutionOutcome::Updated(2))
        );
        let rs = query(&mut backend, "SELECT name, active FROM people ORDER BY id");
        assert_eq!(
            rs.rows,
            vec![
                vec![text("alice"), Cell::Boolean(false)],
                vec![text("x"), Cell::Boolean(false)],
                vec![text("x"), Cell::Boolean(false)],
                vec![Cell::Null, Cell::Null],
            ]
        );
    }

    #[test]
    fn test_update_from_column() {
        let mut backend = MemoryBackend::new();
        run(
            &mut backend,
            "CREATE TABLE pairs (a int, b int); INSERT INTO pairs VALUES (1, 2)",
        )
        .unwrap();
        run(&mut backend, "UPDATE pairs SET a = b, b = a").unwrap();
        let rs = query(&mut backend, "SELECT a, b FROM pairs");
        assert_eq!(rs.rows, vec![vec![Cell::Int(2), Cell::Int(1)]]);
    }

    #[test]
    fn test_update_errors_leave_table_untouched() {
        let mut backend = fixture();
        let before = backend.table("people").unwrap().clone();

        assert_eq!(
            run(&mut backend, "UPDATE people SET age = 1"),
            Err(StatementError::ColumnDoesNotExist("age".to_string()))
        );
        assert!(matches!(
            run(&mut backend, "UPDATE people SET id = 'one'"),
            Err(StatementError::TypeMismatch { .. })
        ));
        assert_eq!(
            run(&mut backend, "UPDATE people SET id = NULL"),
            Err(StatementError::NullConstraint("id".to_string()))
        );
        assert_eq!(
            run(&mut backend, "UPDATE people SET id = 1, id = 2"),
            Err(StatementError::DuplicateColumn("id".to_string()))
        );
        assert_eq!(backend.table("people").unwrap(), &before);
    }

    #[test]
    fn test_snapshot() {
        let backend = fixture();
        let snapshot = backend.snapshot();
        let people = &snapshot["people"];
        assert_eq!(people.columns, vec!["id", "name", "active"]);
        assert_eq!(people.row_count, 4);
        assert_eq!(backend.table_names(), vec!["people"]);
    }
}
