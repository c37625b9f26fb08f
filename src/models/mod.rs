use serde::{Deserialize, Serialize};

/// A submission that has passed validation but has not yet been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub unit_number: u16,
    pub name: String,
}

/// A persisted door-access issue report.
///
/// `submitted_at` is a pre-formatted `YYYY-MM-DD HH:mm:ss` wall-clock string
/// in the configured UTC offset; it is stored verbatim by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "unitNumber")]
    pub unit_number: u16,
    pub name: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
}

/// Response body for `POST /submit`, shared by every outcome of the
/// intake pipeline.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            warnings: None,
        }
    }

    pub fn ok_with_warnings(message: impl Into<String>, warnings: Vec<String>) -> Self {
        assert!(
            !warnings.is_empty(),
            "Partial success must carry at least one warning"
        );
        Self {
            success: true,
            message: message.into(),
            warnings: Some(warnings),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            warnings: None,
        }
    }
}
