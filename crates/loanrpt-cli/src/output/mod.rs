pub mod csv;
pub mod json;
pub mod table;

use loanrpt_core::error::ReportError;
use loanrpt_core::model::Table;
use loanrpt_core::persist::{FsPersistence, Persistence};
use std::path::Path;

/// Print or save a reconstructed table in the requested format.
pub fn emit(table: &Table, format: &str, out: Option<&Path>) -> Result<(), ReportError> {
    match out {
        Some(path) => {
            // Files always get CSV
            FsPersistence.write_rows(path, &table.cell_rows())?;
            eprintln!("Wrote {} row(s) to {}", table.rows.len(), path.display());
        }
        None => match format {
            "json" => json::print(table)?,
            "table" => table::print(table),
            _ => csv::print(table)?,
        },
    }
    print_diagnostics(table);
    Ok(())
}

/// Dropped rows and warnings go to stderr so stdout stays machine-readable.
pub fn print_diagnostics(table: &Table) {
    for dropped in &table.dropped_rows {
        eprintln!(
            "  dropped loan {}: {} of {} cell(s)",
            dropped.loan_number, dropped.cells_found, dropped.cells_expected
        );
    }
    for w in &table.warnings {
        eprintln!("  warning: {}", w.message);
    }
}
