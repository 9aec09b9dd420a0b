//! Error taxonomy for destill (§7).
//!
//! One flat `thiserror` enum, following the teacher's `OrbitError` pattern
//! of a single error type with classification helper methods instead of a
//! type per module. Component crates keep their own narrower error enums
//! (`BrokerError`, `ProviderError`, `StoreError`); they convert into
//! `DestillError` via `#[from]` at the edge where the CLI or a run loop
//! needs one type to log or report.

use thiserror::Error;

use destill_broker::BrokerError;
use destill_provider::ProviderError;
use destill_store::StoreError;

pub type Result<T> = std::result::Result<T, DestillError>;

#[derive(Debug, Error)]
pub enum DestillError {
    /// Missing or invalid required configuration (§7 "configuration error").
    #[error("configuration error: {0}")]
    Config(String),

    /// `build_url` did not match any recognized provider URL format.
    #[error("not a recognized CI build URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Provider(ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to parse JUnit report: {0}")]
    JunitParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Hand-written rather than `#[from]`: a missing credential is a
/// *configuration* error (§7), not a provider-side failure, so it needs its
/// own `DestillError` variant instead of a transparent wrap.
impl From<ProviderError> for DestillError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::MissingToken(provider) => crate::config::missing_token_error(&provider),
            other => DestillError::Provider(other),
        }
    }
}

impl DestillError {
    /// The `"Hint: ..."` line §6/§7 requires for the recognized error kinds
    /// that have one (*invalid-url*, *auth-failed*, *build-not-found*).
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DestillError::InvalidUrl(_) => Some(
                "supported formats: https://buildkite.com/{org}/{pipeline}/builds/{number}, \
                 https://github.com/{owner}/{repo}/actions/runs/{run_id}",
            ),
            DestillError::Provider(e) => e.hint(),
            _ => None,
        }
    }

    /// Process exit code for the CLI (§6: 0 on success, 1 on any
    /// user-visible failure).
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the underlying failure is transient and a caller might
    /// reasonably retry (§7 "rate-limited"/"network-timeout").
    pub fn is_transient(&self) -> bool {
        match self {
            DestillError::Provider(e) => e.is_transient(),
            DestillError::Broker(BrokerError::Transport(_)) => true,
            _ => false,
        }
    }
}
