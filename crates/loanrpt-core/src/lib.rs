pub mod error;
pub mod extraction;
pub mod layout;
pub mod model;
pub mod patterns;
pub mod persist;
pub mod reconstruct;
pub mod source;

use error::ReportError;
use extraction::{
    document_lines, group_words_into_lines, word_rows, PageContent, PdfExtractor, WORD_FIELD_COUNT,
};
use layout::schema::{LayoutKind, LayoutProfile};
use model::{ReconstructionState, RowKind, Table};
use persist::Persistence;
use reconstruct::aggregate::InvestorRecord;
use source::{ReportPayload, ReportRequest, ReportSource};
use std::path::Path;

/// Main API entry point: rebuild the table of a PDF report.
///
/// Extraction failures abort the whole document; a document without the
/// expected structure yields [`ReportError::StructureMismatch`].
pub fn reconstruct_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    layout: &LayoutProfile,
) -> Result<Table, ReportError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    log::debug!(
        "{} returned {} page(s) for layout '{}'",
        extractor.backend_name(),
        pages.len(),
        layout.name
    );
    reconstruct_pages(&pages, layout)
}

/// Rebuild a table from already-extracted pages.
///
/// Pages that only carry word boxes are regrouped into lines first.
pub fn reconstruct_pages(pages: &[PageContent], layout: &LayoutProfile) -> Result<Table, ReportError> {
    let regrouped: Vec<PageContent> = pages
        .iter()
        .map(|p| {
            if p.lines.is_empty() && !p.words.is_empty() {
                PageContent {
                    lines: group_words_into_lines(&p.words),
                    ..p.clone()
                }
            } else {
                p.clone()
            }
        })
        .collect();
    let lines = document_lines(&regrouped);

    match layout.kind {
        LayoutKind::LineTable => reconstruct::line_table::reconstruct(&lines, layout),
        LayoutKind::CodeDictionary => reconstruct::dictionary::reconstruct(&lines, layout),
    }
}

/// Dump every word box of a PDF as a row, without reconstruction.
///
/// The extractor must be configured to return words.
pub fn extract_word_table(pdf_bytes: &[u8], extractor: &dyn PdfExtractor) -> Result<Table, ReportError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(word_table(&pages))
}

/// Word rows of already-extracted pages.
pub fn word_table(pages: &[PageContent]) -> Table {
    let mut state = ReconstructionState::new(WORD_FIELD_COUNT);
    for row in word_rows(pages) {
        state.emit(RowKind::Data, row);
    }
    if state.rows.is_empty() {
        state.warn(format!("no word boxes in {} page(s)", pages.len()));
    }
    log::info!("dumped {} word(s)", state.rows.len());
    state.into_table()
}

/// Build the investor summary table from structured records.
pub fn reconstruct_records(records: &[InvestorRecord]) -> Table {
    reconstruct::aggregate::reconstruct(records)
}

/// How a full fetch-reconstruct-persist run ended, when it did not error.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Rows were rebuilt and written.
    Saved(Table),
    /// The document was obtained (and kept, if a destination was given) but
    /// no table could be rebuilt from it.
    ReconstructionFailed { reason: String },
}

/// Fetch one report, keep the raw document, rebuild its table and persist it.
///
/// Source and write failures are returned as errors so callers can tell
/// "could not obtain" and "parsed but failed to save" apart from a
/// reconstruction failure.
#[allow(clippy::too_many_arguments)]
pub fn run_report(
    source: &dyn ReportSource,
    persistence: &dyn Persistence,
    extractor: &dyn PdfExtractor,
    request: &ReportRequest,
    layout: Option<&LayoutProfile>,
    pdf_dest: Option<&Path>,
    csv_dest: &Path,
) -> Result<ReportOutcome, ReportError> {
    let table = match source.fetch(request)? {
        ReportPayload::Document(bytes) => {
            if let Some(dest) = pdf_dest {
                persistence.write_bytes(dest, &bytes)?;
            }
            let layout = layout.ok_or_else(|| {
                ReportError::LayoutInvalid("a layout is required to reconstruct a document".into())
            })?;
            match reconstruct_pdf(&bytes, extractor, layout) {
                Ok(table) => table,
                Err(ReportError::StructureMismatch(reason)) => {
                    log::warn!("reconstruction failed: {reason}");
                    return Ok(ReportOutcome::ReconstructionFailed { reason });
                }
                Err(e) => return Err(e),
            }
        }
        ReportPayload::Records(records) => reconstruct_records(&records),
    };

    persistence.write_rows(csv_dest, &table.cell_rows())?;
    log::info!(
        "saved {} row(s) to {} ({} dropped)",
        table.rows.len(),
        csv_dest.display(),
        table.dropped_rows.len()
    );
    Ok(ReportOutcome::Saved(table))
}
