//! Request and receipt types for the JobBuddy generation endpoints.

use serde_json::Value;

/// Options forwarded to the generate endpoint as query parameters plus an
/// optional request body.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Delivery mode, e.g. "poll".
    pub mode: Option<String>,
    /// Export format requested from the backend, e.g. "word".
    pub export_format: Option<String>,
    /// Request body; the backend accepts an empty object.
    pub body: Value,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            mode: None,
            export_format: None,
            body: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Acknowledgement that the backend accepted a generation request. The job
/// itself completes later; progress is observed by polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub accepted: bool,
    /// Status reported at submission time, usually "PROCESSING".
    pub initial_status: Option<String>,
}
