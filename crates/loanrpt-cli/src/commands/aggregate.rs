use loanrpt_core::error::ReportError;
use loanrpt_core::source::{ReportPayload, ReportRequest, ReportSource, ResponseFileSource};
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), ReportError> {
    let source = ResponseFileSource::new(input_file);
    let records = match source.fetch(&ReportRequest::Records)? {
        ReportPayload::Records(records) => records,
        ReportPayload::Document(_) => {
            return Err(ReportError::SourceUnavailable(format!(
                "{} holds a document, not investor records",
                source.path().display()
            )))
        }
    };

    let table = loanrpt_core::reconstruct_records(&records);
    output::emit(&table, output_format, output_file.as_deref())
}
