use destill_contracts::MetadataMap;
use std::time::Duration;

/// Default per-request timeout (§5).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request-scoped settings threaded through every provider call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub timeout: Duration,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Result of successfully parsing a build URL (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
    pub provider_name: String,
    pub build_id: String,
    pub metadata: MetadataMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub state: String,
    /// "script" or empty for jobs the ingestor should process (§4.5 step 4).
    pub job_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub id: String,
    pub number: u64,
    pub url: String,
    pub state: String,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: String,
    pub path: String,
    pub download_url: String,
    pub size: u64,
}
