use crate::error::ReportError;
use crate::layout::schema::LayoutProfile;
use crate::layout::validate_layout;

const NEW_LOANS_JSON: &str = include_str!("../../../../layouts/new-loans.json");
const OTS_CMR_JSON: &str = include_str!("../../../../layouts/ots-cmr.json");

/// Available predefined layouts.
pub const PRESETS: &[&str] = &["new-loans", "ots-cmr"];

/// Load a predefined layout by name.
pub fn load_preset(name: &str) -> Result<LayoutProfile, ReportError> {
    let json = match name {
        "new-loans" => NEW_LOANS_JSON,
        "ots-cmr" => OTS_CMR_JSON,
        _ => {
            return Err(ReportError::LayoutInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let layout: LayoutProfile = serde_json::from_str(json)?;
    validate_layout(&layout)?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::schema::{LabelJoin, LayoutKind};

    #[test]
    fn test_load_new_loans_preset() {
        let layout = load_preset("new-loans").unwrap();
        assert_eq!(layout.kind, LayoutKind::LineTable);
        assert_eq!(layout.header_sentinel, "Loan #");
        assert_eq!(layout.field_count, 17);
        assert_eq!(layout.subtotal.as_ref().unwrap().amount_column, 10);
        assert_eq!(
            layout.section_label("Investor Codes").map(|l| l.join),
            Some(LabelJoin::Previous)
        );
    }

    #[test]
    fn test_load_ots_cmr_preset() {
        let layout = load_preset("ots-cmr").unwrap();
        assert_eq!(layout.kind, LayoutKind::CodeDictionary);
        let dict = layout.dictionary.unwrap();
        assert_eq!(dict.code_marker, "CMR");
        let labels: Vec<&str> = dict.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Mortgage Loans", "WAC", "WARM"]);
    }

    #[test]
    fn test_all_presets_load() {
        for name in PRESETS {
            assert!(load_preset(name).is_ok(), "preset {name} failed to load");
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }
}
