//! Tagged-variant provider dispatch and the credential-attaching registry
//! (§4.2, §9 "Polymorphism over CI providers").
//!
//! The source system dispatches providers through a registry of factories
//! keyed by string name returning trait objects. Here the registry exists
//! only to attach credentials at construction time; dispatch itself is a
//! closed tagged `enum` matched in [`ProviderKind`], not an open set of
//! trait objects.

use async_trait::async_trait;

use crate::buildkite::BuildkiteProvider;
use crate::error::ProviderError;
use crate::github_actions::GitHubActionsProvider;
use crate::model::{Artifact, Build, BuildRef, RequestContext};
use crate::traits::Provider;
use crate::url::{parse_buildkite_url, parse_github_actions_url};

pub enum ProviderKind {
    Buildkite(BuildkiteProvider),
    GitHubActions(GitHubActionsProvider),
}

#[async_trait]
impl Provider for ProviderKind {
    fn parse_url(&self, url: &str) -> Result<BuildRef, ProviderError> {
        match self {
            ProviderKind::Buildkite(p) => p.parse_url(url),
            ProviderKind::GitHubActions(p) => p.parse_url(url),
        }
    }

    async fn fetch_build(&self, ctx: &RequestContext, build_ref: &BuildRef) -> Result<Build, ProviderError> {
        match self {
            ProviderKind::Buildkite(p) => p.fetch_build(ctx, build_ref).await,
            ProviderKind::GitHubActions(p) => p.fetch_build(ctx, build_ref).await,
        }
    }

    async fn fetch_job_log(&self, ctx: &RequestContext, job_id: &str) -> Result<String, ProviderError> {
        match self {
            ProviderKind::Buildkite(p) => p.fetch_job_log(ctx, job_id).await,
            ProviderKind::GitHubActions(p) => p.fetch_job_log(ctx, job_id).await,
        }
    }

    async fn fetch_artifacts(&self, ctx: &RequestContext, job_id: &str) -> Result<Vec<Artifact>, ProviderError> {
        match self {
            ProviderKind::Buildkite(p) => p.fetch_artifacts(ctx, job_id).await,
            ProviderKind::GitHubActions(p) => p.fetch_artifacts(ctx, job_id).await,
        }
    }

    async fn download_artifact(&self, ctx: &RequestContext, artifact: &Artifact) -> Result<Vec<u8>, ProviderError> {
        match self {
            ProviderKind::Buildkite(p) => p.download_artifact(ctx, artifact).await,
            ProviderKind::GitHubActions(p) => p.download_artifact(ctx, artifact).await,
        }
    }
}

/// Holds the credentials needed to construct each provider variant.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub buildkite_token: Option<String>,
    pub github_token: Option<String>,
}

/// Resolves a build URL to the right [`ProviderKind`], attaching the
/// matching credential. Construction, not lookup, is the registry's job —
/// the set of recognized URL forms is fixed (§4.2).
pub struct ProviderRegistry {
    credentials: ProviderCredentials,
}

impl ProviderRegistry {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self { credentials }
    }

    /// Recognize `url` and construct the provider that can serve it.
    pub fn resolve(&self, url: &str) -> Result<ProviderKind, ProviderError> {
        if parse_buildkite_url(url).is_some() {
            let token = self
                .credentials
                .buildkite_token
                .clone()
                .ok_or_else(|| ProviderError::MissingToken("buildkite".to_string()))?;
            return Ok(ProviderKind::Buildkite(BuildkiteProvider::new(token)));
        }

        if parse_github_actions_url(url).is_some() {
            let token = self
                .credentials
                .github_token
                .clone()
                .ok_or_else(|| ProviderError::MissingToken("github".to_string()))?;
            return Ok(ProviderKind::GitHubActions(GitHubActionsProvider::new(token)));
        }

        Err(ProviderError::InvalidUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_buildkite_url_with_token() {
        let registry = ProviderRegistry::new(ProviderCredentials {
            buildkite_token: Some("tok".into()),
            github_token: None,
        });
        let provider = registry.resolve("https://buildkite.com/acme/pipeline/builds/1").unwrap();
        assert!(matches!(provider, ProviderKind::Buildkite(_)));
    }

    #[test]
    fn missing_credential_is_missing_token_not_auth_failed() {
        let registry = ProviderRegistry::new(ProviderCredentials::default());
        let result = registry.resolve("https://buildkite.com/acme/pipeline/builds/1");
        assert!(matches!(result, Err(ProviderError::MissingToken(p)) if p == "buildkite"));
    }

    #[test]
    fn unrecognized_url_is_invalid_url() {
        let registry = ProviderRegistry::new(ProviderCredentials::default());
        let result = registry.resolve("https://gitlab.com/acme/repo");
        assert!(matches!(result, Err(ProviderError::InvalidUrl(_))));
    }
}
