use loanrpt_core::error::ReportError;
use loanrpt_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::commands::resolve_layout;
use crate::output;

pub fn run(
    input_file: PathBuf,
    preset: Option<String>,
    layout_file: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
    words: bool,
) -> Result<(), ReportError> {
    let pdf_bytes = std::fs::read(&input_file)?;

    let table = if words {
        // Word boxes are dumped as-is; no layout applies.
        let extractor = PdftotextExtractor::new().with_words();
        loanrpt_core::extract_word_table(&pdf_bytes, &extractor)?
    } else {
        let layout = resolve_layout(preset, layout_file)?;
        loanrpt_core::reconstruct_pdf(&pdf_bytes, &PdftotextExtractor::new(), &layout)?
    };

    output::emit(&table, output_format, output_file.as_deref())
}
