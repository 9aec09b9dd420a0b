use serde::{Deserialize, Serialize};

/// Lossy progress observability published to `destill.progress` (§3, §5).
/// Consumers must treat these as hints, never as a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub request_id: String,
    pub stage: String,
    pub current: u64,
    pub total: u64,
}

impl ProgressUpdate {
    pub fn new(request_id: impl Into<String>, stage: impl Into<String>, current: u64, total: u64) -> Self {
        Self {
            request_id: request_id.into(),
            stage: stage.into(),
            current,
            total,
        }
    }
}

/// Read-model summarizing one request's lifecycle (§3), served by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub request_id: String,
    pub build_url: String,
    pub status: RequestState,
    pub chunks_total: u64,
    pub chunks_processed: u64,
    pub findings_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Processing,
    Completed,
    Failed,
}
