pub mod builtin;
pub mod schema;

use crate::error::ReportError;
use schema::{LayoutKind, LayoutProfile};
use std::path::Path;

/// Load a layout from a JSON file.
pub fn load_layout(path: &Path) -> Result<LayoutProfile, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|e| ReportError::LayoutLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_layout(&content, path)
}

/// Parse a layout from a JSON string.
pub fn parse_layout(json: &str, source: &Path) -> Result<LayoutProfile, ReportError> {
    let layout: LayoutProfile = serde_json::from_str(json).map_err(|e| ReportError::LayoutLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Parse a layout from a JSON string (no file path context).
pub fn parse_layout_str(json: &str) -> Result<LayoutProfile, ReportError> {
    let layout: LayoutProfile = serde_json::from_str(json).map_err(ReportError::Json)?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Validate that a layout is well-formed.
pub fn validate_layout(layout: &LayoutProfile) -> Result<(), ReportError> {
    if layout.field_count == 0 {
        return Err(ReportError::LayoutInvalid(
            "field_count must be at least 1".into(),
        ));
    }

    if layout.min_fill_percent == 0 || layout.min_fill_percent > 100 {
        return Err(ReportError::LayoutInvalid(format!(
            "min_fill_percent {} is outside 1..=100",
            layout.min_fill_percent
        )));
    }

    for label in &layout.section_labels {
        if label.text.trim().is_empty() {
            return Err(ReportError::LayoutInvalid(
                "section label text must not be empty".into(),
            ));
        }
    }

    if layout.noise.iter().any(|n| n.is_empty()) {
        return Err(ReportError::LayoutInvalid(
            "noise entries must not be empty".into(),
        ));
    }

    match layout.kind {
        LayoutKind::LineTable => {
            if layout.header_sentinel.trim().is_empty() {
                return Err(ReportError::LayoutInvalid(
                    "line_table layouts need a header_sentinel".into(),
                ));
            }
            if layout.dictionary.is_some() {
                return Err(ReportError::LayoutInvalid(
                    "dictionary is only valid for code_dictionary layouts".into(),
                ));
            }
            if let Some(ref subtotal) = layout.subtotal {
                for (what, col) in [
                    ("subtotal.name_column", subtotal.name_column),
                    ("subtotal.amount_column", subtotal.amount_column),
                ] {
                    check_column(layout, what, col)?;
                }
            }
            for &col in &layout.date_columns {
                check_column(layout, "date_columns", col)?;
            }
        }
        LayoutKind::CodeDictionary => {
            let dict = layout.dictionary.as_ref().ok_or_else(|| {
                ReportError::LayoutInvalid("code_dictionary layouts need a dictionary".into())
            })?;
            if dict.code_marker.is_empty() {
                return Err(ReportError::LayoutInvalid(
                    "dictionary.code_marker must not be empty".into(),
                ));
            }
            if dict.rows.is_empty() {
                return Err(ReportError::LayoutInvalid(
                    "dictionary.rows must not be empty".into(),
                ));
            }
            for row in &dict.rows {
                if row.codes + 1 > layout.field_count {
                    return Err(ReportError::LayoutInvalid(format!(
                        "template row '{}' pops {} codes but field_count is {}",
                        row.label, row.codes, layout.field_count
                    )));
                }
            }
        }
    }

    Ok(())
}

fn check_column(layout: &LayoutProfile, what: &str, col: usize) -> Result<(), ReportError> {
    // A header-learned width may grow, but the configured width is the floor.
    if col >= layout.field_count {
        return Err(ReportError::LayoutInvalid(format!(
            "{what} column {col} is outside field_count {}",
            layout.field_count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_layout() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "kind": "line_table",
            "header_sentinel": "Loan #",
            "field_count": 5,
            "subtotal": { "marker": "Subtotal", "amount_column": 4 }
        }"#;
        let layout = parse_layout_str(json).unwrap();
        assert_eq!(layout.name, "Test");
        assert_eq!(layout.min_header_cells, 10);
        assert_eq!(layout.min_fill_percent, 80);
        assert_eq!(layout.short_row_tolerance, 3);
        assert!(layout.width_from_header);
        assert_eq!(layout.subtotal.unwrap().name_column, 1);
    }

    #[test]
    fn test_label_prefix_pattern() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "kind": "line_table",
            "header_sentinel": "Loan #",
            "field_count": 5,
            "section_labels": [
                { "text": "Investor Codes", "join": "previous", "prefix": "^Table \\d+$" }
            ]
        }"#;
        let layout = parse_layout_str(json).unwrap();
        let prefix = layout.section_labels[0].prefix.as_ref().unwrap();
        assert!(prefix.is_match("Table 3"));
        assert!(!prefix.is_match("FNMA"));

        let broken = json.replace(r"^Table \\d+$", "(");
        assert!(matches!(parse_layout_str(&broken), Err(ReportError::Json(_))));
    }

    #[test]
    fn test_missing_sentinel_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "kind": "line_table",
            "field_count": 5
        }"#;
        assert!(parse_layout_str(json).is_err());
    }

    #[test]
    fn test_column_out_of_range_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "kind": "line_table",
            "header_sentinel": "Loan #",
            "field_count": 5,
            "date_columns": [5]
        }"#;
        assert!(matches!(
            parse_layout_str(json),
            Err(ReportError::LayoutInvalid(_))
        ));
    }

    #[test]
    fn test_dictionary_required_for_code_dictionary() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "kind": "code_dictionary",
            "field_count": 4
        }"#;
        assert!(parse_layout_str(json).is_err());
    }

    #[test]
    fn test_template_wider_than_row_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "kind": "code_dictionary",
            "field_count": 3,
            "dictionary": { "rows": [{ "label": "WAC", "codes": 3 }] }
        }"#;
        assert!(parse_layout_str(json).is_err());
    }

    #[test]
    fn test_load_layout_reports_path() {
        let err = load_layout(Path::new("/nonexistent/layout.json")).unwrap_err();
        assert!(matches!(err, ReportError::LayoutLoad { .. }));
    }
}
