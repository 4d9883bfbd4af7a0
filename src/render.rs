//! Result presentation.

use minisql_core::{Cell, ResultSet};

const SEPARATOR: &str = " | ";

/// Render a result set as an aligned text table.
///
/// Each column is as wide as its longest header or cell, counted in
/// characters, and every cell is padded to that width. `NULL` renders empty.
///
/// ```text
/// id | name
/// ---+------
/// 1  | alice
/// 2  |
/// ```
pub fn render_table(rs: &ResultSet) -> String {
    let cells: Vec<Vec<String>> = rs
        .rows
        .iter()
        .map(|row| row.iter().map(Cell::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = rs.columns.iter().map(|c| c.name.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = rs.columns.iter().map(|c| c.name.as_str()).collect();
    push_line(&mut out, &header, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in &cells {
        let row: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&mut out, &row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(&padded.join(SEPARATOR));
    out.push('\n');
}

/// Render a result set as pretty-printed JSON.
pub fn render_json(rs: &ResultSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rs)
}
