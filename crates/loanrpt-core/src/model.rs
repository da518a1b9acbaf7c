use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One output row. Always exactly `expected_field_count` cells once emitted.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Header,
    Data,
    Subtotal,
    SectionLabel,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Header => write!(f, "header"),
            RowKind::Data => write!(f, "data"),
            RowKind::Subtotal => write!(f, "subtotal"),
            RowKind::SectionLabel => write!(f, "section label"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub kind: RowKind,
    pub cells: Row,
}

/// A data row that was abandoned because too few cells were recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub loan_number: String,
    pub cells_found: usize,
    pub cells_expected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionWarning {
    pub message: String,
}

/// Per-document mutable state threaded through the scan.
#[derive(Debug, Clone, Default)]
pub struct ReconstructionState {
    pub header_seen: bool,
    /// Cell count of the first header, used to skip repeated headers.
    pub header_width: usize,
    pub expected_field_count: usize,
    /// Labelled values waiting to be pulled into template rows, ordered by key.
    pub pending_labels: BTreeMap<String, String>,
    pub rows: Vec<TableRow>,
    pub dropped_rows: Vec<DroppedRow>,
    pub warnings: Vec<ReconstructionWarning>,
}

impl ReconstructionState {
    pub fn new(expected_field_count: usize) -> Self {
        ReconstructionState {
            expected_field_count,
            ..Default::default()
        }
    }

    /// Push a row, padding with empty cells or truncating to the expected width.
    pub fn emit(&mut self, kind: RowKind, mut cells: Row) {
        fit_width(&mut cells, self.expected_field_count);
        log::debug!("emit {kind} row: {:?}", cells.first());
        self.rows.push(TableRow { kind, cells });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.warnings.push(ReconstructionWarning { message });
    }

    pub fn into_table(self) -> Table {
        Table {
            field_count: self.expected_field_count,
            rows: self.rows,
            dropped_rows: self.dropped_rows,
            warnings: self.warnings,
        }
    }
}

/// The reconstructed table for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub field_count: usize,
    pub rows: Vec<TableRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_rows: Vec<DroppedRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReconstructionWarning>,
}

impl Table {
    /// Plain cell rows in output order, ready for a CSV writer.
    pub fn cell_rows(&self) -> Vec<Row> {
        self.rows.iter().map(|r| r.cells.clone()).collect()
    }

    pub fn count(&self, kind: RowKind) -> usize {
        self.rows.iter().filter(|r| r.kind == kind).count()
    }
}

/// Pad with empty strings or truncate so `cells.len() == width`.
pub fn fit_width(cells: &mut Row, width: usize) {
    cells.resize(width, String::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_pads_and_truncates() {
        let mut short = vec!["a".to_string()];
        fit_width(&mut short, 3);
        assert_eq!(short, vec!["a", "", ""]);

        let mut long = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        fit_width(&mut long, 2);
        assert_eq!(long, vec!["a", "b"]);
    }

    #[test]
    fn test_emit_enforces_width() {
        let mut state = ReconstructionState::new(4);
        state.emit(RowKind::SectionLabel, vec!["Totals".into()]);
        assert_eq!(state.rows[0].cells.len(), 4);
        assert_eq!(state.rows[0].kind, RowKind::SectionLabel);
    }
}
