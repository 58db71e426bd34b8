//! Failure taxonomy for a single analysis submission.

use serde_json::Value;
use thiserror::Error;

pub const MISSING_FILES_MESSAGE: &str = "Please upload all three CSV files";
pub const COLUMN_MISMATCH_HINT: &str =
    "Analysis failed. Please check your files and ensure they have the same columns.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("missing input files: {missing:?}")]
    MissingFiles { missing: Vec<&'static str> },

    #[error("endpoint not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("backend error {status} at {endpoint}")]
    Server {
        status: u16,
        endpoint: String,
        detail: Option<String>,
    },

    #[error("request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error("network failure reaching {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("invalid report body: {reason}")]
    InvalidReport { reason: String },
}

impl SubmitError {
    /// The single human-readable line shown on the upload screen.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::MissingFiles { .. } => MISSING_FILES_MESSAGE.to_string(),
            SubmitError::NotFound { endpoint } => format!(
                "Analysis endpoint not found (404) at {}. \
                 Check that VITE_API_BASE_URL points at the running analysis backend.",
                endpoint
            ),
            SubmitError::Server {
                status,
                endpoint,
                detail,
            } => {
                let mut msg = format!(
                    "The analysis backend at {} failed while processing your files (HTTP {}).",
                    endpoint, status
                );
                if let Some(first) = detail.as_deref().and_then(|d| d.lines().find(|l| !l.trim().is_empty())) {
                    msg.push(' ');
                    msg.push_str(first.trim());
                }
                msg
            }
            SubmitError::Rejected { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| COLUMN_MISMATCH_HINT.to_string()),
            SubmitError::Network { endpoint, .. } => format!(
                "Could not reach the analysis backend at {}. \
                 Check your network connection and that the backend is running.",
                endpoint
            ),
            SubmitError::InvalidReport { reason } => format!(
                "The analysis backend returned a response that is not a valid report: {}",
                reason
            ),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::MissingFiles { .. })
    }
}

/// Pull `detail` or `error` text out of an error body.
///
/// Bodies that are not JSON are treated as an empty object.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: Value = serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
    ["detail", "error"].iter().find_map(|key| match parsed.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    })
}
