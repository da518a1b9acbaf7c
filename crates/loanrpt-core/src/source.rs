//! Report source: where raw report documents and records come from.
//!
//! Transport and authentication are the caller's business; this module only
//! understands the servicer's response envelopes.

use crate::error::ReportError;
use crate::reconstruct::aggregate::InvestorRecord;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to ask the report source for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportRequest {
    /// A named document from the document collection, e.g. `NewLoansEnteredReport`.
    Document { name: String },
    /// The structured investor records.
    Records,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    Document(Vec<u8>),
    Records(Vec<InvestorRecord>),
}

pub trait ReportSource {
    fn fetch(&self, request: &ReportRequest) -> Result<ReportPayload, ReportError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiDocument {
    pub name: String,
    #[serde(default)]
    pub document_base64: Option<String>,
}

/// Response envelope of the servicer's document-producing calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub api_call_successful: bool,
    #[serde(default)]
    pub document_collection: Vec<ApiDocument>,
    /// Single-document responses carry the document outside the collection.
    #[serde(default)]
    pub document: Option<ApiDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordsResponse {
    pub results: Vec<InvestorRecord>,
}

impl ApiEnvelope {
    /// Decode the named document from the envelope.
    pub fn document_bytes(&self, name: &str) -> Result<Vec<u8>, ReportError> {
        if !self.api_call_successful {
            return Err(ReportError::SourceUnavailable("API call unsuccessful".into()));
        }
        let encoded = self
            .document_collection
            .iter()
            .chain(self.document.iter())
            .find(|d| d.name == name)
            .and_then(|d| d.document_base64.as_deref())
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ReportError::SourceUnavailable(format!("no '{name}' document in API response"))
            })?;
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| ReportError::SourceUnavailable(format!("document '{name}' is not valid base64: {e}")))
    }
}

/// Decode a raw API response body for `request`.
pub fn decode_response(body: &[u8], request: &ReportRequest) -> Result<ReportPayload, ReportError> {
    match request {
        ReportRequest::Document { name } => {
            let envelope: ApiEnvelope = serde_json::from_slice(body).map_err(|e| {
                ReportError::SourceUnavailable(format!("unreadable API response: {e}"))
            })?;
            envelope.document_bytes(name).map(ReportPayload::Document)
        }
        ReportRequest::Records => {
            let response: RecordsResponse = serde_json::from_slice(body).map_err(|e| {
                ReportError::SourceUnavailable(format!("unreadable records response: {e}"))
            })?;
            Ok(ReportPayload::Records(response.results))
        }
    }
}

/// Reads a saved API response from disk.
pub struct ResponseFileSource {
    path: PathBuf,
}

impl ResponseFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResponseFileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSource for ResponseFileSource {
    fn fetch(&self, request: &ReportRequest) -> Result<ReportPayload, ReportError> {
        let body = std::fs::read(&self.path).map_err(|e| {
            ReportError::SourceUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;
        log::info!("loaded API response from {} ({} bytes)", self.path.display(), body.len());
        decode_response(&body, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(success: bool, name: &str, payload: &[u8]) -> String {
        serde_json::json!({
            "ApiCallSuccessful": success,
            "DocumentCollection": [
                { "Name": "Coupons", "DocumentBase64": "" },
                { "Name": name, "DocumentBase64": STANDARD.encode(payload) }
            ]
        })
        .to_string()
    }

    fn request(name: &str) -> ReportRequest {
        ReportRequest::Document { name: name.into() }
    }

    #[test]
    fn test_decode_named_document() {
        let body = envelope(true, "NewLoansEnteredReport", b"%PDF-1.4");
        let payload = decode_response(body.as_bytes(), &request("NewLoansEnteredReport")).unwrap();
        assert_eq!(payload, ReportPayload::Document(b"%PDF-1.4".to_vec()));
    }

    #[test]
    fn test_single_document_envelope() {
        let body = serde_json::json!({
            "ApiCallSuccessful": true,
            "Document": { "Name": "OtsScheduleCmr", "DocumentBase64": STANDARD.encode(b"pdf") }
        })
        .to_string();
        let payload = decode_response(body.as_bytes(), &request("OtsScheduleCmr")).unwrap();
        assert_eq!(payload, ReportPayload::Document(b"pdf".to_vec()));
    }

    #[test]
    fn test_unsuccessful_call() {
        let body = envelope(false, "NewLoansEnteredReport", b"x");
        let err = decode_response(body.as_bytes(), &request("NewLoansEnteredReport")).unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable(_)));
    }

    #[test]
    fn test_missing_and_empty_documents() {
        let body = envelope(true, "NewLoansEnteredReport", b"x");
        assert!(decode_response(body.as_bytes(), &request("Portfolio")).is_err());
        assert!(decode_response(body.as_bytes(), &request("Coupons")).is_err());
    }

    #[test]
    fn test_decode_records() {
        let body = br#"{"results": [{"num_loans": 1, "inv_name": "FNMA", "inv_bank_cd": 1,
            "inv_cd": 100, "inv_group_cd": 10, "balances": 10.00, "rem_term": 12,
            "years": 1, "int_rate": 3.5}]}"#;
        match decode_response(body, &ReportRequest::Records).unwrap() {
            ReportPayload::Records(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].group_key(), "1-100-10");
            }
            other => panic!("expected records, got {other:?}"),
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = ResponseFileSource::new("/nonexistent/response.json");
        let err = source.fetch(&ReportRequest::Records).unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable(_)));
    }
}
