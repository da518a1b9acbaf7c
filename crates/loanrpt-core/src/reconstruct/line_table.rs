//! Line-by-line reconstruction of loan tables.
//!
//! The scan walks the page-ordered lines once. Each position is classified
//! by the first matching rule in [`RULES`]; the matching handler consumes
//! one or more lines and returns the next position.

use crate::error::ReportError;
use crate::layout::schema::LayoutProfile;
use crate::model::{DroppedRow, ReconstructionState, Row, RowKind, Table};
use crate::patterns::{is_amount, is_date, is_loan_number, is_page_marker, split_name_code, split_term_date};
use crate::reconstruct::{emit_section_label, Scan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    SectionLabel,
    Noise,
    Header,
    Subtotal,
    DataRow,
    Skip,
}

type Predicate = fn(&Scan<'_>, usize, &ReconstructionState) -> bool;

/// Classification rules in precedence order; first match wins.
pub const RULES: &[(LineClass, Predicate)] = &[
    (LineClass::SectionLabel, is_section_label),
    (LineClass::Noise, is_noise),
    (LineClass::Header, is_header_sentinel),
    (LineClass::Subtotal, is_subtotal),
    (LineClass::DataRow, starts_data_row),
];

fn is_section_label(scan: &Scan<'_>, pos: usize, _: &ReconstructionState) -> bool {
    scan.starts_section_label(pos)
}

fn is_noise(scan: &Scan<'_>, pos: usize, _: &ReconstructionState) -> bool {
    scan.is_noise(pos)
}

fn is_header_sentinel(scan: &Scan<'_>, pos: usize, _: &ReconstructionState) -> bool {
    scan.line(pos) == Some(scan.layout.header_sentinel.as_str())
}

fn is_subtotal(scan: &Scan<'_>, pos: usize, state: &ReconstructionState) -> bool {
    state.header_seen
        && scan.layout.subtotal.is_some()
        && scan
            .line(pos)
            .is_some_and(|l| is_amount(l) && !is_loan_number(l))
}

fn starts_data_row(scan: &Scan<'_>, pos: usize, state: &ReconstructionState) -> bool {
    state.header_seen && scan.line(pos).is_some_and(is_loan_number)
}

pub fn classify_line(scan: &Scan<'_>, pos: usize, state: &ReconstructionState) -> LineClass {
    RULES
        .iter()
        .find(|(_, matches)| matches(scan, pos, state))
        .map(|(class, _)| *class)
        .unwrap_or(LineClass::Skip)
}

/// Reconstruct a table from page-ordered lines.
///
/// Fails with [`ReportError::StructureMismatch`] when the header sentinel
/// never appears; anything else degrades to dropped rows and warnings.
pub fn reconstruct(lines: &[&str], layout: &LayoutProfile) -> Result<Table, ReportError> {
    let scan = Scan::new(lines, layout);
    let mut state = ReconstructionState::new(layout.field_count);

    let mut pos = 0;
    while pos < lines.len() {
        pos = step(&scan, pos, &mut state);
    }

    if !state.header_seen {
        return Err(ReportError::StructureMismatch(format!(
            "header sentinel '{}' not found in {} line(s)",
            layout.header_sentinel,
            lines.len()
        )));
    }

    log::info!(
        "reconstructed '{}': {} data row(s), {} subtotal(s), {} dropped",
        layout.name,
        state.rows.iter().filter(|r| r.kind == RowKind::Data).count(),
        state.rows.iter().filter(|r| r.kind == RowKind::Subtotal).count(),
        state.dropped_rows.len()
    );

    Ok(state.into_table())
}

/// Process the line at `pos` and return the position of the next unread line.
pub fn step(scan: &Scan<'_>, pos: usize, state: &mut ReconstructionState) -> usize {
    match classify_line(scan, pos, state) {
        LineClass::SectionLabel => emit_section_label(scan, pos, state),
        LineClass::Header => collect_header(scan, pos, state),
        LineClass::Subtotal => emit_subtotal(scan, pos, state),
        LineClass::DataRow => collect_data_row(scan, pos, state),
        LineClass::Noise | LineClass::Skip => pos + 1,
    }
}

fn collect_header(scan: &Scan<'_>, pos: usize, state: &mut ReconstructionState) -> usize {
    if state.header_seen {
        // Running header repeated on a later page.
        let (cells, next) = scan_header(scan, pos, None);
        if cells.len() != state.header_width {
            state.warn(format!(
                "repeated header has {} cell(s), expected {}",
                cells.len(),
                state.header_width
            ));
        }
        return next;
    }

    let (cells, next) = scan_header(scan, pos, None);
    state.header_seen = true;
    state.header_width = cells.len();
    if scan.layout.width_from_header {
        state.expected_field_count = cells.len();
    }
    state.emit(RowKind::Header, cells);
    next
}

/// Collect header cells starting at the sentinel on `pos`.
///
/// Stops at a loan number, page marker or section label once
/// `min_header_cells` are collected, or before a new cell would exceed
/// `limit`.
fn scan_header(scan: &Scan<'_>, pos: usize, limit: Option<usize>) -> (Row, usize) {
    let layout = scan.layout;
    let min_cells = layout.min_header_cells;
    let mut cells: Row = vec![layout.header_sentinel.clone()];
    let mut i = pos + 1;

    while let Some(line) = scan.line(i) {
        if is_page_marker(line) {
            i += 1;
            if cells.len() >= min_cells {
                break;
            }
            continue;
        }
        if cells.len() >= min_cells && (is_loan_number(line) || scan.starts_section_label(i)) {
            break;
        }
        if layout.is_noise(line) {
            i += 1;
            continue;
        }
        let cell_count = cells.len();
        match cells.last_mut() {
            Some(last) if layout.is_header_continuation(line) => {
                last.push(' ');
                last.push_str(line);
            }
            _ if limit.is_some_and(|n| cell_count >= n) => break,
            _ => cells.push(line.to_string()),
        }
        i += 1;
    }

    (cells, i)
}

fn emit_subtotal(scan: &Scan<'_>, pos: usize, state: &mut ReconstructionState) -> usize {
    let (Some(amount), Some(def)) = (scan.line(pos), scan.layout.subtotal.as_ref()) else {
        return pos + 1;
    };

    let mut cells = vec![String::new(); state.expected_field_count];
    if let Some(cell) = cells.get_mut(def.name_column) {
        *cell = def.marker.clone();
    }
    match cells.get_mut(def.amount_column) {
        Some(cell) => *cell = amount.to_string(),
        None => state.warn(format!(
            "subtotal {amount} dropped: amount column {} outside row width {}",
            def.amount_column, state.expected_field_count
        )),
    }
    state.emit(RowKind::Subtotal, cells);
    pos + 1
}

fn collect_data_row(scan: &Scan<'_>, pos: usize, state: &mut ReconstructionState) -> usize {
    let layout = scan.layout;
    let width = state.expected_field_count;
    let min_cells = width.saturating_sub(layout.short_row_tolerance);
    let loan_number = scan.line(pos).unwrap_or_default().to_string();
    let mut cells: Row = vec![loan_number.clone()];
    let mut i = pos + 1;

    while cells.len() < width {
        let Some(line) = scan.line(i) else {
            break;
        };
        if scan.is_noise(i) {
            i += 1;
            continue;
        }
        if line == layout.header_sentinel {
            // The row continues after the header repeated on the next page.
            let (_, next) = scan_header(scan, i, Some(state.header_width));
            i = next;
            continue;
        }
        if is_loan_number(line) && cells.len() >= min_cells {
            break;
        }
        if scan.starts_section_label(i) {
            break;
        }
        push_cell(&mut cells, line, layout);
        i += 1;
    }

    if cells.len() * 100 >= width * layout.min_fill_percent {
        state.emit(RowKind::Data, cells);
    } else {
        state.warn(format!(
            "dropped loan {loan_number}: {} of {width} cell(s) recovered",
            cells.len()
        ));
        state.dropped_rows.push(DroppedRow {
            loan_number,
            cells_found: cells.len(),
            cells_expected: width,
        });
    }
    i
}

/// Append one source line to a data row, undoing the known layout
/// collisions.
pub fn push_cell(cells: &mut Row, raw: &str, layout: &LayoutProfile) {
    if cells.len() == layout.split_name_code_at {
        if let Some((name, code)) = split_name_code(raw) {
            place_cell(cells, name, layout);
            place_cell(cells, code, layout);
            return;
        }
    }
    if layout.split_term_date {
        if let Some((term, date)) = split_term_date(raw) {
            place_cell(cells, term, layout);
            place_cell(cells, date, layout);
            return;
        }
    }
    place_cell(cells, raw, layout);
}

fn place_cell(cells: &mut Row, value: &str, layout: &LayoutProfile) {
    // A blank date column is missing from the text stream entirely.
    while layout.date_columns.contains(&cells.len()) && !is_date(value) {
        cells.push(String::new());
    }
    cells.push(value.to_string());
}
