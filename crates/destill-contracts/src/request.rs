use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_request_id;

/// An operator's request to triage one CI build. Immutable once created;
/// consumed exactly once by the ingestor (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub request_id: String,
    pub build_url: String,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRequest {
    /// Create a request for `build_url`, minting a fresh time-sortable id.
    pub fn new(build_url: impl Into<String>) -> Self {
        Self {
            request_id: new_request_id(),
            build_url: build_url.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_fresh_id_and_given_url() {
        let req = AnalysisRequest::new("https://buildkite.com/acme/ci/builds/42");
        assert!(req.request_id.starts_with("req-"));
        assert_eq!(req.build_url, "https://buildkite.com/acme/ci/builds/42");
    }

    #[test]
    fn request_round_trips_through_json() {
        let req = AnalysisRequest::new("https://github.com/acme/repo/actions/runs/99");
        let json = serde_json::to_string(&req).unwrap();
        let back: AnalysisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
