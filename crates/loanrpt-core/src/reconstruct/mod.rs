pub mod aggregate;
pub mod dictionary;
pub mod line_table;

use crate::layout::schema::{LabelJoin, LayoutProfile};
use crate::model::{ReconstructionState, RowKind};
use crate::patterns::{is_amount, is_date, is_loan_number, is_page_marker};

/// Read-only view of a document's lines and the layout driving the scan.
#[derive(Debug, Clone, Copy)]
pub struct Scan<'a> {
    pub lines: &'a [&'a str],
    pub layout: &'a LayoutProfile,
}

impl<'a> Scan<'a> {
    pub fn new(lines: &'a [&'a str], layout: &'a LayoutProfile) -> Self {
        Scan { lines, layout }
    }

    pub fn line(&self, pos: usize) -> Option<&'a str> {
        self.lines.get(pos).copied()
    }

    /// Running header/footer or page marker.
    pub fn is_noise(&self, pos: usize) -> bool {
        self.line(pos)
            .is_some_and(|l| is_page_marker(l) || self.layout.is_noise(l))
    }

    /// True when `pos` opens a section label: either the line carries a
    /// label itself, or it is the first half of a label that joins with
    /// its previous line.
    pub fn starts_section_label(&self, pos: usize) -> bool {
        let Some(line) = self.line(pos) else {
            return false;
        };
        if self.layout.section_label(line).is_some() {
            return true;
        }
        if self.is_noise(pos) || line == self.layout.header_sentinel || is_cue(line) {
            return false;
        }
        self.line(pos + 1)
            .and_then(|next| self.layout.section_label(next))
            .is_some_and(|def| {
                def.join == LabelJoin::Previous
                    && def.prefix.as_ref().map_or(true, |p| p.is_match(line))
            })
    }
}

/// Loan numbers, amounts and dates are table values, never label text.
fn is_cue(line: &str) -> bool {
    is_loan_number(line) || is_amount(line) || is_date(line)
}

/// Emit a section-label row starting at `pos` and return the next position.
pub fn emit_section_label(scan: &Scan<'_>, pos: usize, state: &mut ReconstructionState) -> usize {
    let Some(line) = scan.line(pos) else {
        return pos + 1;
    };

    let (label, next_pos) = match scan.layout.section_label(line).map(|d| d.join) {
        Some(LabelJoin::Next) => match scan.line(pos + 1) {
            Some(next) => (format!("{line}\n{next}"), pos + 2),
            None => (line.to_string(), pos + 1),
        },
        // A previous-joined label reached directly had its first half
        // consumed elsewhere.
        Some(LabelJoin::None) | Some(LabelJoin::Previous) => (line.to_string(), pos + 1),
        None => match scan.line(pos + 1) {
            Some(next) => (format!("{line} {next}"), pos + 2),
            None => (line.to_string(), pos + 1),
        },
    };

    state.emit(RowKind::SectionLabel, vec![label]);
    next_pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::schema::{LayoutKind, LinePattern, SectionLabelDef};

    fn layout() -> LayoutProfile {
        LayoutProfile {
            name: "t".into(),
            description: None,
            version: "1".into(),
            kind: LayoutKind::LineTable,
            header_sentinel: "Loan #".into(),
            header_continuations: vec![],
            min_header_cells: 10,
            field_count: 3,
            width_from_header: true,
            section_labels: vec![
                SectionLabelDef {
                    text: "Investor Codes".into(),
                    join: LabelJoin::Previous,
                    prefix: None,
                },
                SectionLabelDef {
                    text: "Report Totals".into(),
                    join: LabelJoin::Next,
                    prefix: None,
                },
                SectionLabelDef {
                    text: "Summary".into(),
                    join: LabelJoin::None,
                    prefix: None,
                },
            ],
            noise: vec!["Mortgage Servicer".into()],
            subtotal: None,
            split_name_code_at: 1,
            split_term_date: true,
            date_columns: vec![],
            short_row_tolerance: 3,
            min_fill_percent: 80,
            dictionary: None,
        }
    }

    #[test]
    fn test_previous_join_label() {
        let layout = layout();
        let lines = ["Table 3", "Investor Codes", "x"];
        let scan = Scan::new(&lines, &layout);
        let mut state = ReconstructionState::new(3);

        assert!(scan.starts_section_label(0));
        let next = emit_section_label(&scan, 0, &mut state);

        assert_eq!(next, 2);
        assert_eq!(state.rows[0].cells, vec!["Table 3 Investor Codes", "", ""]);
    }

    #[test]
    fn test_cue_lines_never_prefix_a_label() {
        let layout = layout();
        let lines = [
            "1,234,567.89",
            "Investor Codes",
            "10023",
            "Investor Codes",
            "01/15/2055",
            "Investor Codes",
        ];
        let scan = Scan::new(&lines, &layout);

        assert!(!scan.starts_section_label(0));
        assert!(!scan.starts_section_label(2));
        assert!(!scan.starts_section_label(4));
        assert!(scan.starts_section_label(1));
    }

    #[test]
    fn test_prefix_pattern_restricts_previous_join() {
        let mut layout = layout();
        layout.section_labels[0].prefix = Some(LinePattern::new(r"^Table \d+$").unwrap());
        let lines = ["FNMA", "Investor Codes", "Table 12", "Investor Codes"];
        let scan = Scan::new(&lines, &layout);

        assert!(!scan.starts_section_label(0));
        assert!(scan.starts_section_label(2));

        let mut state = ReconstructionState::new(2);
        assert_eq!(emit_section_label(&scan, 2, &mut state), 4);
        assert_eq!(state.rows[0].cells[0], "Table 12 Investor Codes");
    }

    #[test]
    fn test_next_join_label() {
        let layout = layout();
        let lines = ["Report Totals", "All Investors"];
        let scan = Scan::new(&lines, &layout);
        let mut state = ReconstructionState::new(2);

        let next = emit_section_label(&scan, 0, &mut state);

        assert_eq!(next, 2);
        assert_eq!(state.rows[0].cells, vec!["Report Totals\nAll Investors", ""]);
    }

    #[test]
    fn test_plain_label_and_noise_prefix() {
        let layout = layout();
        let lines = ["Mortgage Servicer", "Investor Codes", "Loan Type Summary"];
        let scan = Scan::new(&lines, &layout);

        // Noise never becomes the first half of a label.
        assert!(!scan.starts_section_label(0));
        assert!(scan.is_noise(0));
        assert!(scan.starts_section_label(1));
        assert!(scan.starts_section_label(2));

        let mut state = ReconstructionState::new(3);
        assert_eq!(emit_section_label(&scan, 1, &mut state), 2);
        assert_eq!(state.rows[0].cells[0], "Investor Codes");
    }
}
