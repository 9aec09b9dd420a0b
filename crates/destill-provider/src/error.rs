use thiserror::Error;

/// Observable error kinds surfaced by the `Provider` capability (§4.2, §7).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not a recognized CI build URL: {0}")]
    InvalidUrl(String),

    #[error("authentication failed against the provider")]
    AuthFailed,

    /// The credential this provider needs was never configured. Distinct
    /// from [`ProviderError::AuthFailed`] (a rejected credential): this is
    /// a configuration error, not a provider-side rejection (§7).
    #[error("no credential configured for provider {0}")]
    MissingToken(String),

    #[error("build not found: {0}")]
    BuildNotFound(String),

    #[error("provider rate-limited this request")]
    RateLimited,

    #[error("provider request timed out")]
    NetworkTimeout,

    #[error("provider transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Transient errors are worth retrying (§7: "rate-limited/network-timeout — transient").
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::NetworkTimeout)
    }

    /// A short, user-facing hint for the recognized error kinds (§6 CLI surface).
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ProviderError::InvalidUrl(_) => Some(
                "supported build URL forms: https://buildkite.com/{org}/{pipeline}/builds/{number}, \
                 https://github.com/{owner}/{repo}/actions/runs/{run_id}",
            ),
            ProviderError::AuthFailed => {
                Some("check that BUILDKITE_API_TOKEN or GITHUB_TOKEN is set and valid")
            }
            ProviderError::BuildNotFound(_) => Some("the build or run id does not exist, or the token lacks access"),
            _ => None,
        }
    }
}
