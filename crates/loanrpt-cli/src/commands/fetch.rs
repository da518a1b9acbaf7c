use loanrpt_core::error::ReportError;
use loanrpt_core::extraction::pdftotext::PdftotextExtractor;
use loanrpt_core::persist::FsPersistence;
use loanrpt_core::source::{ReportRequest, ResponseFileSource};
use loanrpt_core::ReportOutcome;
use std::path::PathBuf;

use crate::commands::resolve_layout;
use crate::output;

pub fn run(
    response_file: PathBuf,
    document: Option<String>,
    pdf_dest: Option<PathBuf>,
    csv_dest: PathBuf,
    preset: Option<String>,
    layout_file: Option<PathBuf>,
) -> Result<(), ReportError> {
    let (request, layout) = match document {
        Some(name) => (
            ReportRequest::Document { name },
            Some(resolve_layout(preset, layout_file)?),
        ),
        None => (ReportRequest::Records, None),
    };

    let source = ResponseFileSource::new(response_file);
    let outcome = loanrpt_core::run_report(
        &source,
        &FsPersistence,
        &PdftotextExtractor::new(),
        &request,
        layout.as_ref(),
        pdf_dest.as_deref(),
        &csv_dest,
    );

    match outcome {
        Ok(ReportOutcome::Saved(table)) => {
            eprintln!("Saved {} row(s) to {}", table.rows.len(), csv_dest.display());
            if let Some(pdf) = &pdf_dest {
                eprintln!("  document kept at {}", pdf.display());
            }
            output::print_diagnostics(&table);
            Ok(())
        }
        Ok(ReportOutcome::ReconstructionFailed { reason }) => {
            if let Some(pdf) = &pdf_dest {
                eprintln!("Document saved to {}, but no table could be rebuilt.", pdf.display());
            }
            Err(ReportError::StructureMismatch(reason))
        }
        Err(e @ ReportError::WriteFailure { .. }) => {
            eprintln!("Report parsed but failed to save.");
            Err(e)
        }
        Err(e) => Err(e),
    }
}
