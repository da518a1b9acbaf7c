use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which reconstruction engine a layout drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Header, loan rows and subtotals rebuilt line by line.
    LineTable,
    /// Labelled codes collected into a dictionary and popped into template rows.
    CodeDictionary,
}

/// How a section label is joined with a neighbouring physical line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelJoin {
    #[default]
    None,
    /// `"{previous} {line}"`
    Previous,
    /// `"{line}\n{next}"`
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLabelDef {
    /// Substring that identifies the label line.
    pub text: String,
    #[serde(default)]
    pub join: LabelJoin,
    /// For `previous` joins: the line before must match this to be taken
    /// as the first half of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<LinePattern>,
}

/// A regex over a whole line, stored in layouts as its source string.
#[derive(Debug, Clone)]
pub struct LinePattern(Regex);

impl LinePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(LinePattern)
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.0.is_match(line)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for LinePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for LinePattern {}

impl Serialize for LinePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        LinePattern::new(&pattern)
            .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{pattern}': {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtotalDef {
    /// Text written into the name column of a subtotal row.
    pub marker: String,
    #[serde(default = "default_name_column")]
    pub name_column: usize,
    /// Principal balance column receiving the amount.
    pub amount_column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRowDef {
    pub label: String,
    /// Number of dictionary entries popped into this row.
    pub codes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryDef {
    #[serde(default = "default_code_marker")]
    pub code_marker: String,
    pub rows: Vec<TemplateRowDef>,
}

/// Per-format configuration for the reconstruction engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub kind: LayoutKind,
    /// Exact line that opens the header block.
    #[serde(default)]
    pub header_sentinel: String,
    /// Header words that continue the previous header cell.
    #[serde(default)]
    pub header_continuations: Vec<String>,
    #[serde(default = "default_min_header_cells")]
    pub min_header_cells: usize,
    /// Row width, used until (or instead of) a header defines it.
    pub field_count: usize,
    #[serde(default = "default_true")]
    pub width_from_header: bool,
    #[serde(default)]
    pub section_labels: Vec<SectionLabelDef>,
    /// Running header/footer substrings skipped wherever they appear.
    #[serde(default)]
    pub noise: Vec<String>,
    #[serde(default)]
    pub subtotal: Option<SubtotalDef>,
    #[serde(default = "default_name_column")]
    pub split_name_code_at: usize,
    #[serde(default = "default_true")]
    pub split_term_date: bool,
    /// Columns that must hold a date; a non-date there means the source
    /// column was blank and the rest of the row shifted left.
    #[serde(default)]
    pub date_columns: Vec<usize>,
    #[serde(default = "default_short_row_tolerance")]
    pub short_row_tolerance: usize,
    #[serde(default = "default_min_fill_percent")]
    pub min_fill_percent: usize,
    #[serde(default)]
    pub dictionary: Option<DictionaryDef>,
}

fn default_min_header_cells() -> usize {
    10
}

fn default_name_column() -> usize {
    1
}

fn default_short_row_tolerance() -> usize {
    3
}

fn default_min_fill_percent() -> usize {
    80
}

fn default_true() -> bool {
    true
}

fn default_code_marker() -> String {
    "CMR".to_string()
}

impl LayoutProfile {
    /// Section label definition matching `line`, if any.
    pub fn section_label(&self, line: &str) -> Option<&SectionLabelDef> {
        self.section_labels.iter().find(|l| line.contains(&l.text))
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.noise.iter().any(|n| line.contains(n.as_str()))
    }

    pub fn is_header_continuation(&self, line: &str) -> bool {
        self.header_continuations.iter().any(|c| c == line)
    }
}
