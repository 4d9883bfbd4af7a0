use crate::error::StatementError;

use super::{Cell, ColumnType, TableSnapshot};

/// Row-oriented table owned by the catalog.
///
/// `column_names`, `column_types` and `nullable` are parallel; every row has
/// one cell per column and each cell is `Null` or of the column's type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    column_names: Vec<String>,
    column_types: Vec<ColumnType>,
    nullable: Vec<bool>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    pub fn is_nullable(&self, index: usize) -> bool {
        self.nullable.get(index).copied().unwrap_or(true)
    }

    pub(crate) fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        nullable: bool,
    ) -> Result<(), StatementError> {
        if self.column_index(name).is_some() {
            return Err(StatementError::DuplicateColumn(name.to_string()));
        }
        self.column_names.push(name.to_string());
        self.column_types.push(column_type);
        self.nullable.push(nullable);
        Ok(())
    }

    /// Check that a value of `found` type may be stored in column `index`.
    /// `None` stands for `NULL`.
    pub(crate) fn check_value(
        &self,
        index: usize,
        found: Option<ColumnType>,
    ) -> Result<(), StatementError> {
        let column = &self.column_names[index];
        match found {
            None if !self.is_nullable(index) => Err(StatementError::NullConstraint(column.clone())),
            Some(found) if found != self.column_types[index] => Err(StatementError::TypeMismatch {
                column: column.clone(),
                expected: self.column_types[index],
                found,
            }),
            _ => Ok(()),
        }
    }

    /// Validate a complete row before it is stored.
    pub(crate) fn check_row(&self, row: &[Cell]) -> Result<(), StatementError> {
        for (index, cell) in row.iter().enumerate() {
            self.check_value(index, cell.column_type())?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            columns: self.column_names.clone(),
            column_types: self.column_types.clone(),
            row_count: self.rows.len(),
        }
    }
}
