use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("report structure mismatch: {0}")]
    StructureMismatch(String),

    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load layout from {path}: {reason}")]
    LayoutLoad { path: PathBuf, reason: String },

    #[error("invalid layout: {0}")]
    LayoutInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// True for failures that happened after the document was obtained,
    /// i.e. the raw report exists but no table could be rebuilt from it.
    pub fn is_reconstruction_failure(&self) -> bool {
        matches!(self, ReportError::StructureMismatch(_))
    }
}
