use loanrpt_core::error::ReportError;
use loanrpt_core::layout::builtin;
use loanrpt_core::layout::schema::{LabelJoin, LayoutKind, LayoutProfile};
use std::path::Path;

pub fn list() -> Result<(), ReportError> {
    println!("Available predefined layouts:\n");
    for name in builtin::PRESETS {
        let layout = builtin::load_preset(name)?;
        println!("  {:<10} {} (v{}) [{}]", name, layout.name, layout.version, kind_name(layout.kind));
        if let Some(ref desc) = layout.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

fn kind_name(kind: LayoutKind) -> &'static str {
    match kind {
        LayoutKind::LineTable => "line_table",
        LayoutKind::CodeDictionary => "code_dictionary",
    }
}

pub fn explain(preset: &str) -> Result<(), ReportError> {
    let layout = builtin::load_preset(preset)?;

    println!("{} (version {})\n", layout.name, layout.version);
    if let Some(ref desc) = layout.description {
        println!("{}\n", desc);
    }

    match layout.kind {
        LayoutKind::LineTable => explain_line_table(&layout),
        LayoutKind::CodeDictionary => explain_dictionary(&layout),
    }

    if !layout.section_labels.is_empty() {
        println!("Section labels:");
        for label in &layout.section_labels {
            let join = match label.join {
                LabelJoin::None => "alone",
                LabelJoin::Previous => "joined with the line before",
                LabelJoin::Next => "joined with the line after",
            };
            match label.prefix {
                Some(ref prefix) => {
                    println!("  {:<24} {} matching /{}/", label.text, join, prefix.as_str())
                }
                None => println!("  {:<24} {}", label.text, join),
            }
        }
        println!();
    }

    if !layout.noise.is_empty() {
        println!("Lines containing these are skipped as running headers/footers:");
        for noise in &layout.noise {
            println!("  {}", noise);
        }
        println!();
    }

    Ok(())
}

fn explain_line_table(layout: &LayoutProfile) {
    println!(
        "The table starts at the line '{}'. Header cells are collected until",
        layout.header_sentinel
    );
    println!(
        "a loan number follows at least {} cells.",
        layout.min_header_cells
    );
    if layout.width_from_header {
        println!("Every row gets as many cells as the header has.\n");
    } else {
        println!("Every row gets exactly {} cells.\n", layout.field_count);
    }

    if !layout.header_continuations.is_empty() {
        println!(
            "Header words joined to the previous cell: {}\n",
            layout.header_continuations.join(", ")
        );
    }

    println!("Data rows:");
    println!("  start at a line of 4 or more digits (the loan number)");
    println!(
        "  may end early at the next loan number, {} cell(s) short at most",
        layout.short_row_tolerance
    );
    println!(
        "  are dropped below {}% of the expected cells",
        layout.min_fill_percent
    );
    println!(
        "  split '<name> <2-digit code>' in cell {}",
        layout.split_name_code_at
    );
    if layout.split_term_date {
        println!("  split '<term> <MM/DD/YYYY>' into two cells");
    }
    if !layout.date_columns.is_empty() {
        let cols: Vec<String> = layout.date_columns.iter().map(|c| c.to_string()).collect();
        println!("  get an empty cell when a date column ({}) is blank", cols.join(", "));
    }
    println!("  skip the header when it repeats inside a row split by a page break");
    println!();

    if let Some(ref subtotal) = layout.subtotal {
        println!(
            "A standalone amount becomes a '{}' row, amount in column {}.\n",
            subtotal.marker, subtotal.amount_column
        );
    }
}

fn explain_dictionary(layout: &LayoutProfile) {
    let Some(ref dict) = layout.dictionary else {
        return;
    };
    println!(
        "Every line holding a {}-code is collected first. The rows below are then",
        dict.code_marker
    );
    println!("filled with the lowest remaining codes, each code used once:\n");
    for row in &dict.rows {
        println!("  {:<24} {} code(s)", row.label, row.codes);
    }
    println!();
    println!("Rows are {} cells wide.\n", layout.field_count);
}

pub fn schema() -> Result<(), ReportError> {
    print!(
        r#"JSON Layout Schema
==================

A layout file tells `loanrpt convert` how one report format is laid out.

Top-level fields:
  name                  (string, required)  Human-readable name
  description           (string, optional)  What report this layout reads
  version               (string, required)  Version identifier
  kind                  (string, required)  "line_table" or "code_dictionary"
  field_count           (number, required)  Row width (fallback when the
                                            header sets the width)
  width_from_header     (bool, default true) Learn the row width from the header
  section_labels        (array, optional)   {{ "text", "join", "prefix" }}; join is
                                            "none", "previous" or "next"; prefix is
                                            a regex the line before must match
  noise                 (array, optional)   Running header/footer substrings

line_table only:
  header_sentinel       (string, required)  Exact line that opens the header
  header_continuations  (array, optional)   Words appended to the previous
                                            header cell
  min_header_cells      (number, default 10)
  subtotal              (object, optional)  {{ "marker", "name_column",
                                            "amount_column" }}
  split_name_code_at    (number, default 1) Cell holding "<name> <code>"
  split_term_date       (bool, default true)
  date_columns          (array, optional)   Columns that may be blank
  short_row_tolerance   (number, default 3)
  min_fill_percent      (number, default 80)

code_dictionary only:
  dictionary            (object, required)  {{ "code_marker": "CMR",
                                            "rows": [{{ "label", "codes" }}] }}

Example:
{{
  "name": "Payoff Report",
  "version": "1.0",
  "kind": "line_table",
  "header_sentinel": "Loan #",
  "field_count": 12,
  "noise": ["Mortgage Servicer", "Run Date:"],
  "subtotal": {{ "marker": "Total", "amount_column": 8 }},
  "date_columns": [4]
}}
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ReportError> {
    let layout = loanrpt_core::layout::load_layout(file)?;

    println!("Layout '{}' (v{}) is valid.", layout.name, layout.version);
    println!("  Kind: {}", kind_name(layout.kind));
    println!("  Fields: {}", layout.field_count);

    let mut warnings = Vec::new();
    if layout.kind == LayoutKind::LineTable
        && layout.width_from_header
        && layout.min_header_cells > layout.field_count
    {
        warnings.push(format!(
            "min_header_cells ({}) exceeds field_count ({})",
            layout.min_header_cells, layout.field_count
        ));
    }
    if layout.short_row_tolerance >= layout.field_count {
        warnings.push("short_row_tolerance lets any row end at the next loan number".to_string());
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
