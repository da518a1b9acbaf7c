//! Code-dictionary reconstruction for reports that print figures next to
//! classification codes (e.g. `CMR105`) instead of in columns.
//!
//! The whole document is first swept for coded lines. Template rows are then
//! filled by popping the smallest remaining codes, so every code lands in at
//! most one row.

use crate::error::ReportError;
use crate::layout::schema::{DictionaryDef, LayoutProfile};
use crate::model::{ReconstructionState, RowKind, Table};
use crate::patterns::find_code;
use crate::reconstruct::{emit_section_label, Scan};

pub fn reconstruct(lines: &[&str], layout: &LayoutProfile) -> Result<Table, ReportError> {
    let dict = layout.dictionary.as_ref().ok_or_else(|| {
        ReportError::LayoutInvalid(format!("layout '{}' has no dictionary", layout.name))
    })?;
    let scan = Scan::new(lines, layout);
    let mut state = ReconstructionState::new(layout.field_count);

    collect_codes(&scan, dict, &mut state);
    if state.pending_labels.is_empty() {
        return Err(ReportError::StructureMismatch(format!(
            "no '{}' codes found in {} line(s)",
            dict.code_marker,
            lines.len()
        )));
    }
    let collected = state.pending_labels.len();

    let mut pos = 0;
    while pos < lines.len() {
        pos = step(&scan, dict, pos, &mut state);
    }

    if !state.pending_labels.is_empty() {
        let leftover: Vec<&str> = state.pending_labels.keys().map(String::as_str).collect();
        let message = format!("{} code(s) not placed in any row: {}", leftover.len(), leftover.join(", "));
        state.warn(message);
    }

    log::info!(
        "reconstructed '{}': {} row(s) from {} code(s)",
        layout.name,
        state.rows.len(),
        collected
    );

    Ok(state.into_table())
}

/// Sweep every line for `code → value` pairs.
pub fn collect_codes(scan: &Scan<'_>, dict: &DictionaryDef, state: &mut ReconstructionState) {
    for line in scan.lines {
        if !line.contains(dict.code_marker.as_str()) {
            continue;
        }
        let Some(code) = find_code(line, &dict.code_marker) else {
            continue;
        };
        let value = line
            .split_whitespace()
            .filter(|tok| *tok != code)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(previous) = state.pending_labels.insert(code.to_string(), value) {
            state.warn(format!("code {code} appears more than once; '{previous}' replaced"));
        }
    }
}

pub fn step(
    scan: &Scan<'_>,
    dict: &DictionaryDef,
    pos: usize,
    state: &mut ReconstructionState,
) -> usize {
    let Some(line) = scan.line(pos) else {
        return pos + 1;
    };

    if find_code(line, &dict.code_marker).is_some() {
        return pos + 1;
    }
    if scan.starts_section_label(pos) {
        return emit_section_label(scan, pos, state);
    }
    if scan.is_noise(pos) {
        return pos + 1;
    }
    if let Some(template) = dict.rows.iter().find(|t| t.label == line) {
        let mut cells = vec![template.label.clone()];
        for _ in 0..template.codes {
            match state.pending_labels.pop_first() {
                Some((code, value)) => cells.push(format!("{value} {code}")),
                None => {
                    state.warn(format!("ran out of codes while filling '{}'", template.label));
                    break;
                }
            }
        }
        state.emit(RowKind::Data, cells);
    }
    pos + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::builtin::load_preset;
    use std::collections::HashSet;

    fn cmr_lines() -> Vec<&'static str> {
        vec![
            "Mortgage Servicer",
            "Schedule CMR",
            "Fixed-Rate 30yr CMR105 1,250",
            "Fixed-Rate 15yr CMR101 830",
            "Adjustable CMR112 44",
            "Mortgage Loans",
            "Rate 6.125 CMR120",
            "Rate 5.875 CMR118",
            "Rate 5.500 CMR115",
            "WAC",
            "Months 312 CMR130",
            "Months 170 CMR125",
            "Page 1 of 1",
            "WARM",
        ]
    }

    #[test]
    fn test_collect_codes_sorted() {
        let layout = load_preset("ots-cmr").unwrap();
        let lines = cmr_lines();
        let scan = Scan::new(&lines, &layout);
        let mut state = ReconstructionState::new(layout.field_count);

        collect_codes(&scan, layout.dictionary.as_ref().unwrap(), &mut state);

        let keys: Vec<&str> = state.pending_labels.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["CMR101", "CMR105", "CMR112", "CMR115", "CMR118", "CMR120", "CMR125", "CMR130"]
        );
        assert_eq!(state.pending_labels["CMR105"], "Fixed-Rate 30yr 1,250");
    }

    #[test]
    fn test_template_rows_pop_in_key_order() {
        let layout = load_preset("ots-cmr").unwrap();
        let table = reconstruct(&cmr_lines(), &layout).unwrap();

        assert_eq!(table.rows[0].kind, RowKind::SectionLabel);
        assert_eq!(table.rows[0].cells, vec!["Schedule CMR", "", "", ""]);

        let loans = &table.rows[1].cells;
        assert_eq!(loans[0], "Mortgage Loans");
        assert_eq!(loans[1], "Fixed-Rate 15yr 830 CMR101");
        assert_eq!(loans[2], "Fixed-Rate 30yr 1,250 CMR105");
        assert_eq!(loans[3], "Adjustable 44 CMR112");

        let wac = &table.rows[2].cells;
        assert_eq!(wac[1], "Rate 5.500 CMR115");

        // Only two codes remain for the last template row.
        let warm = &table.rows[3].cells;
        assert_eq!(warm[0], "WARM");
        assert_eq!(warm[1], "Months 170 CMR125");
        assert_eq!(warm[2], "Months 312 CMR130");
        assert_eq!(warm[3], "");
        assert!(table.warnings.iter().any(|w| w.message.contains("WARM")));
    }

    #[test]
    fn test_each_code_used_at_most_once() {
        let layout = load_preset("ots-cmr").unwrap();
        let mut lines = cmr_lines();
        // Labels repeated: the dictionary keeps shrinking instead of reusing codes.
        lines.extend(["Mortgage Loans", "WAC"]);

        let table = reconstruct(&lines, &layout).unwrap();

        let mut seen = HashSet::new();
        for row in &table.rows {
            for cell in row.cells.iter().skip(1).filter(|c| !c.is_empty()) {
                let code = cell.rsplit(' ').next().unwrap();
                assert!(seen.insert(code.to_string()), "code {code} used twice");
            }
        }
        assert_eq!(seen.len(), 8);
        assert!(table.rows.iter().all(|r| r.cells.len() == 4));
    }

    #[test]
    fn test_no_codes_is_structure_mismatch() {
        let layout = load_preset("ots-cmr").unwrap();
        let err = reconstruct(&["Schedule CMR", "WAC"], &layout).unwrap_err();
        assert!(matches!(err, ReportError::StructureMismatch(_)));
    }
}
