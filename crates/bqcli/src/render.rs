//! psql-style rendering of result sets and table schemas.

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde_json::Value;

use crate::service::{RowSet, TableDetail};

/// Maximum rows fetched and shown per query.
pub const DEFAULT_ROW_CAP: u32 = 100;

/// `+---+` borders, `|---+---|` under the header, no lines between rows.
const PSQL_PRESET: &str = "||--|-+||    ++++++";

fn psql_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(PSQL_PRESET)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

/// Render a result set followed by its row-count footer. Empty when the
/// query matched no rows.
pub fn render_rows(rows: &RowSet, cap: u32) -> String {
    if rows.total_rows == 0 {
        return String::new();
    }

    let mut table = psql_table();
    table.set_header(rows.columns.iter().map(|c| Cell::new(&c.name)));
    for row in &rows.rows {
        table.add_row(row.iter().map(|v| Cell::new(format_cell(v))));
    }

    for index in 0..rows.columns.len() {
        let numeric = !rows.rows.is_empty()
            && rows
                .rows
                .iter()
                .filter_map(|row| row.get(index))
                .all(|v| v.is_null() || is_numeric(v));
        if numeric {
            if let Some(column) = table.column_mut(index) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
    }

    format!("{}\n{}", table, footer(rows.total_rows, cap))
}

/// `(<cap> of <total> rows)` when the cap truncated the result.
pub fn footer(total_rows: u64, cap: u32) -> String {
    if u64::from(cap) < total_rows {
        format!("({} of {} rows)", cap, total_rows)
    } else {
        format!("({} rows)", total_rows)
    }
}

/// Fully-qualified table id, then one headerless row per field: name, type,
/// mode, description.
pub fn render_schema(detail: &TableDetail) -> String {
    let mut table = psql_table();
    for field in &detail.fields {
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(&field.field_type),
            Cell::new(&field.mode),
            Cell::new(field.description.as_deref().unwrap_or("")),
        ]);
    }
    format!("{}\n{}", detail.full_table_id, table)
}

/// Display text for one value: `NULL` for nulls, strings verbatim, and
/// compact JSON for arrays and records.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.parse::<f64>().is_ok(),
        _ => false,
    }
}
