use loanrpt_core::model::{RowKind, Table};

const MAX_CELL_WIDTH: usize = 24;

/// Aligned, human-readable preview of a reconstructed table.
pub fn print(table: &Table) {
    print!("{}", format_table(table));
}

pub fn format_table(table: &Table) -> String {
    let mut widths = vec![0usize; table.field_count];
    for row in table.rows.iter().filter(|r| r.kind != RowKind::SectionLabel) {
        for (w, cell) in widths.iter_mut().zip(&row.cells) {
            *w = (*w).max(cell.chars().count().min(MAX_CELL_WIDTH));
        }
    }

    let mut out = String::new();
    for row in &table.rows {
        match row.kind {
            RowKind::SectionLabel => {
                // Multi-line labels print on one line
                let label = row.cells.first().map(|c| c.replace('\n', " / "));
                out.push_str(&format!("\n=== {} ===\n", label.unwrap_or_default()));
            }
            kind => {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .zip(&widths)
                    .map(|(cell, &w)| format!("{:<w$}", truncate(cell)))
                    .collect();
                out.push_str(cells.join("  ").trim_end());
                out.push('\n');
                if kind == RowKind::Header {
                    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
                    out.push_str(&"-".repeat(total));
                    out.push('\n');
                }
            }
        }
    }

    out.push_str(&format!(
        "\n{} data row(s), {} subtotal(s), {} dropped\n",
        table.count(RowKind::Data),
        table.count(RowKind::Subtotal),
        table.dropped_rows.len()
    ));
    out
}

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        cell.to_string()
    } else {
        let mut s: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
        s.push('~');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanrpt_core::model::{ReconstructionState, RowKind};

    #[test]
    fn test_format_table_aligns_columns() {
        let mut state = ReconstructionState::new(3);
        state.emit(RowKind::Header, vec!["Loan #".into(), "Name".into(), "Balance".into()]);
        state.emit(RowKind::Data, vec!["10023".into(), "Johnson".into(), "249,500.00".into()]);
        state.emit(RowKind::SectionLabel, vec!["Report Totals\nAll Investors".into()]);

        let text = format_table(&state.into_table());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Loan #  Name     Balance");
        assert!(lines[1].starts_with("-----"));
        assert_eq!(lines[2], "10023   Johnson  249,500.00");
        assert!(text.contains("=== Report Totals / All Investors ==="));
        assert!(text.contains("1 data row(s), 0 subtotal(s), 0 dropped"));
    }

    #[test]
    fn test_long_cells_truncated() {
        let long = "x".repeat(40);
        let t = truncate(&long);
        assert_eq!(t.chars().count(), MAX_CELL_WIDTH);
        assert!(t.ends_with('~'));
    }
}
