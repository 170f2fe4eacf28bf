//! Tabular report contract handed to the report sink.
//!
//! A [`Report`] is an ordered list of named sections. Empty sections stay in
//! the list so a sink can render a "no data" placeholder for them.

use serde::{Deserialize, Serialize};

/// A rectangular table of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded, long rows truncated, to the
    /// column count.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (`row`, column named `column`).
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// One named result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub table: Table,
}

/// A complete report: title plus ordered sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
    /// Contained problems worth showing next to the data.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn push_section(&mut self, name: impl Into<String>, table: Table) {
        self.sections.push(ReportSection {
            name: name.into(),
            table,
        });
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Table> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.table)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}
