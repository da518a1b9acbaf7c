use crate::error::ReportError;
use crate::extraction::{clean_lines, PageContent, PdfExtractor, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Lines come from plain reading-order mode. Word boxes, when requested,
/// come from `pdftotext -bbox-layout`.
pub struct PdftotextExtractor {
    with_words: bool,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor { with_words: false }
    }

    /// Also collect word-level bounding boxes for position-based layouts.
    pub fn with_words(mut self) -> Self {
        self.with_words = true;
        self
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ReportError> {
        // The temp file is removed when `tmpfile` drops, on every return path.
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| ReportError::SourceUnavailable(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| ReportError::SourceUnavailable(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let text = run_pdftotext(&tmp_path, None)?;

        let mut words_by_page = if self.with_words {
            let xml = run_pdftotext(&tmp_path, Some("-bbox-layout"))?;
            parse_bbox_words(&xml)?
        } else {
            Vec::new()
        };

        // pdftotext uses form feed \x0c as page separator and ends the
        // document with one, so the last split is empty.
        let mut pages: Vec<PageContent> = text
            .split('\x0c')
            .enumerate()
            .map(|(i, page_text)| PageContent {
                page_number: i + 1,
                lines: clean_lines(page_text.lines()),
                words: Vec::new(),
            })
            .collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.lines.is_empty()) {
            pages.pop();
        }

        for (page, words) in pages.iter_mut().zip(words_by_page.drain(..)) {
            page.words = words;
        }

        log::info!(
            "pdftotext extracted {} page(s), {} line(s)",
            pages.len(),
            pages.iter().map(|p| p.lines.len()).sum::<usize>()
        );

        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn run_pdftotext(pdf_path: &Path, mode: Option<&str>) -> Result<String, ReportError> {
    let mut cmd = Command::new("pdftotext");
    if let Some(mode) = mode {
        cmd.arg(mode);
    }
    let output = cmd
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-") // output to stdout
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReportError::PdftotextNotFound
            } else {
                ReportError::SourceUnavailable(format!("pdftotext failed: {}", e))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(ReportError::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `pdftotext -bbox-layout` XHTML into words, one Vec per page.
///
/// Block indices count per page, line indices per block and word indices
/// per line.
fn parse_bbox_words(xml: &str) -> Result<Vec<Vec<Word>>, ReportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<Vec<Word>> = Vec::new();
    let mut block: Option<usize> = None;
    let mut line: Option<usize> = None;
    let mut word_no = 0;
    let mut pending: Option<Word> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ReportError::SourceUnavailable(format!("bad bbox xml: {e}")))?;
        match event {
            Event::Start(tag) => match tag.name().as_ref() {
                b"page" => {
                    pages.push(Vec::new());
                    block = None;
                }
                b"block" => {
                    block = Some(block.map_or(0, |b| b + 1));
                    line = None;
                }
                b"line" => {
                    line = Some(line.map_or(0, |l| l + 1));
                    word_no = 0;
                }
                b"word" => {
                    pending = word_from_tag(&tag, block.unwrap_or(0), line.unwrap_or(0), word_no);
                    word_no += 1;
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some(word) = pending.as_mut() {
                    let decoded = text
                        .unescape()
                        .map_err(|e| ReportError::SourceUnavailable(format!("bad bbox xml: {e}")))?;
                    word.text.push_str(decoded.trim());
                }
            }
            Event::End(tag) if tag.name().as_ref() == b"word" => {
                if let (Some(word), Some(page)) = (pending.take(), pages.last_mut()) {
                    if !word.text.is_empty() {
                        page.push(word);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn word_from_tag(tag: &BytesStart<'_>, block: usize, line: usize, word_no: usize) -> Option<Word> {
    let mut coords = [None; 4];
    for attr in tag.attributes().flatten() {
        let slot = match attr.key.as_ref() {
            b"xMin" => 0,
            b"yMin" => 1,
            b"xMax" => 2,
            b"yMax" => 3,
            _ => continue,
        };
        coords[slot] = attr.unescape_value().ok().and_then(|v| v.parse::<f32>().ok());
    }
    Some(Word {
        x0: coords[0]?,
        y0: coords[1]?,
        x1: coords[2]?,
        y1: coords[3]?,
        text: String::new(),
        block_index: block,
        line_index: line,
        word_index: word_no,
    })
}
