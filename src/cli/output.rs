//! Human-readable rendering of records and schemas.

use crate::storage::{Record, Value};
use colored::Colorize;

/// Display width of a cell, capped so one long value can't blow out the table.
const MAX_CELL: usize = 40;

fn cell(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > MAX_CELL {
        let cut: String = text.chars().take(MAX_CELL - 3).collect();
        format!("{cut}...")
    } else {
        text
    }
}

/// Render rows as an aligned text table.
///
/// Columns follow `columns` when given (table order), otherwise the
/// record's own key order.
#[must_use]
pub fn render_records(rows: &[Record], columns: Option<&[String]>) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<String> = match columns {
        Some(cols) => cols
            .iter()
            .filter(|c| first.contains_key(c.as_str()))
            .cloned()
            .collect(),
        None => first.keys().cloned().collect(),
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map_or_else(String::new, cell))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h.bold(), w = *w))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}
