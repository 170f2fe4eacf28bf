//! Plain-text rendering of reports for the terminal.
//!
//! Each section becomes a bordered table sized to its widest cell. Column
//! widths are measured in display columns, so names with wide characters
//! stay aligned.

use std::fmt::Write;

use attendance_core::report::{Report, Table};
use unicode_width::UnicodeWidthStr;

/// Placeholder shown for a section without rows.
pub const NO_DATA: &str = "No data to display.";

/// Render a whole report: title, every section, then any notes.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", report.title);

    for section in &report.sections {
        out.push('\n');
        out.push_str(&render_section(&section.name, &section.table));
    }

    if !report.notes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in &report.notes {
            let _ = writeln!(out, "  - {}", note);
        }
    }
    out
}

/// Render one named table, or the [`NO_DATA`] placeholder when it is empty.
pub fn render_section(name: &str, table: &Table) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", name);

    if table.is_empty() {
        let _ = writeln!(out, "  {}", NO_DATA);
        return out;
    }

    let widths = column_widths(table);
    let rule = horizontal_rule(&widths);

    out.push_str(&rule);
    out.push_str(&format_row(&table.columns, &widths));
    out.push_str(&rule);
    for row in &table.rows {
        out.push_str(&format_row(row, &widths));
    }
    out.push_str(&rule);
    out
}

// ── Layout helpers ────────────────────────────────────────────────────────────

fn column_widths(table: &Table) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn horizontal_rule(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push(' ');
        line.push_str(&pad(cell, *width));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// Right-pad `text` with spaces to `width` display columns.
fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
