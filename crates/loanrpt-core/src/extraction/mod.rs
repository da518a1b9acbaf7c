pub mod pdftotext;

use crate::error::ReportError;
use crate::model::Row;
use serde::{Deserialize, Serialize};

/// A single word with its bounding box, as laid out on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub text: String,
    pub block_index: usize,
    pub line_index: usize,
    pub word_index: usize,
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    /// Trimmed, non-empty lines in reading order.
    pub lines: Vec<String>,
    pub words: Vec<Word>,
}

impl PageContent {
    pub fn from_lines(page_number: usize, lines: &[&str]) -> Self {
        PageContent {
            page_number,
            lines: clean_lines(lines.iter().copied()),
            words: Vec::new(),
        }
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ReportError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Trim every line and drop the ones that are blank.
pub fn clean_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rebuild reading-order lines from word tokens.
///
/// Words sharing a block and line index form one line, joined in word order.
/// Lines are ordered by block then line index, which is the order the
/// extractor reports them in.
pub fn group_words_into_lines(words: &[Word]) -> Vec<String> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by_key(|w| (w.block_index, w.line_index, w.word_index));

    let mut lines: Vec<String> = Vec::new();
    let mut current_key = None;

    for word in sorted {
        let key = (word.block_index, word.line_index);
        let text = word.text.trim();
        if text.is_empty() {
            continue;
        }
        match lines.last_mut() {
            Some(line) if current_key == Some(key) => {
                line.push(' ');
                line.push_str(text);
            }
            _ => {
                lines.push(text.to_string());
                current_key = Some(key);
            }
        }
    }

    lines
}

/// Concatenate lines of all pages in page order.
pub fn document_lines(pages: &[PageContent]) -> Vec<&str> {
    pages
        .iter()
        .flat_map(|p| p.lines.iter().map(String::as_str))
        .collect()
}

/// Cells per word row: `x0, y0, x1, y1, word, block, line, word_no`.
pub const WORD_FIELD_COUNT: usize = 8;

/// One row per word box, pages in order, words in extraction order.
pub fn word_rows(pages: &[PageContent]) -> Vec<Row> {
    pages
        .iter()
        .flat_map(|p| p.words.iter())
        .map(|w| {
            vec![
                w.x0.to_string(),
                w.y0.to_string(),
                w.x1.to_string(),
                w.y1.to_string(),
                w.text.clone(),
                w.block_index.to_string(),
                w.line_index.to_string(),
                w.word_index.to_string(),
            ]
        })
        .collect()
}
