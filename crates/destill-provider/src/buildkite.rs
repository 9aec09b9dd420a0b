//! Buildkite REST API v2 provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::ProviderError;
use crate::model::{Artifact, Build, BuildRef, Job, RequestContext};
use crate::retry::retry_with_backoff;
use crate::traits::Provider;
use crate::url::parse_buildkite_url;
use destill_contracts::MetadataBuilder;

const API_BASE: &str = "https://api.buildkite.com/v2";

#[derive(Clone)]
struct BuildCoordinates {
    org: String,
    pipeline: String,
    number: u64,
}

/// Populated by `fetch_build`, consumed by `fetch_job_log`/`fetch_artifacts`
/// since the `Provider` trait's per-job calls don't carry org/pipeline/build
/// number themselves (§5 "Provider client cache").
pub struct BuildkiteProvider {
    client: reqwest::Client,
    token: String,
    job_coordinates: Mutex<HashMap<String, BuildCoordinates>>,
}

impl BuildkiteProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            job_coordinates: Mutex::new(HashMap::new()),
        }
    }

    fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    fn map_status(status: StatusCode) -> Option<ProviderError> {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(ProviderError::AuthFailed),
            StatusCode::NOT_FOUND => Some(ProviderError::BuildNotFound(status.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Some(ProviderError::RateLimited),
            _ if status.is_success() => None,
            _ => Some(ProviderError::Transport(format!("unexpected status {status}"))),
        }
    }

    fn coordinates_for(&self, job_id: &str) -> Result<BuildCoordinates, ProviderError> {
        self.job_coordinates
            .lock()
            .expect("buildkite job coordinate cache poisoned")
            .get(job_id)
            .cloned()
            .ok_or_else(|| ProviderError::Transport(format!("unknown job id {job_id}: fetch_build must run first")))
    }
}

#[derive(serde::Deserialize)]
struct BuildkiteJobResponse {
    id: String,
    name: Option<String>,
    state: String,
    #[serde(rename = "type")]
    job_type: Option<String>,
}

#[derive(serde::Deserialize)]
struct BuildkiteBuildResponse {
    id: String,
    number: u64,
    web_url: String,
    state: String,
    jobs: Vec<BuildkiteJobResponse>,
}

#[derive(serde::Deserialize)]
struct BuildkiteArtifactResponse {
    id: String,
    path: String,
    download_url: String,
    file_size: u64,
}

#[async_trait]
impl Provider for BuildkiteProvider {
    fn parse_url(&self, url: &str) -> Result<BuildRef, ProviderError> {
        let parsed = parse_buildkite_url(url).ok_or_else(|| ProviderError::InvalidUrl(url.to_string()))?;
        let metadata = MetadataBuilder::new()
            .provider("buildkite")
            .extra("buildkite.org", parsed.org.clone())
            .extra("buildkite.pipeline", parsed.pipeline.clone())
            .build();
        Ok(BuildRef {
            provider_name: "buildkite".to_string(),
            build_id: parsed.number.to_string(),
            metadata,
        })
    }

    async fn fetch_build(&self, ctx: &RequestContext, build_ref: &BuildRef) -> Result<Build, ProviderError> {
        let org = build_ref
            .metadata
            .get("buildkite.org")
            .ok_or_else(|| ProviderError::Transport("missing buildkite.org in BuildRef metadata".into()))?;
        let pipeline = build_ref
            .metadata
            .get("buildkite.pipeline")
            .ok_or_else(|| ProviderError::Transport("missing buildkite.pipeline in BuildRef metadata".into()))?;

        let url = format!("{API_BASE}/organizations/{org}/pipelines/{pipeline}/builds/{}", build_ref.build_id);
        let body: BuildkiteBuildResponse = retry_with_backoff(|| async {
            let response = self
                .auth(self.client.get(&url))
                .timeout(ctx.timeout)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if let Some(err) = Self::map_status(response.status()) {
                return Err(err);
            }

            response.json().await.map_err(map_reqwest_error)
        })
        .await?;

        let mut cache = self.job_coordinates.lock().expect("buildkite job coordinate cache poisoned");
        let number: u64 = build_ref
            .build_id
            .parse()
            .map_err(|_| ProviderError::Transport("non-numeric buildkite build id".into()))?;
        for job in &body.jobs {
            cache.insert(
                job.id.clone(),
                BuildCoordinates {
                    org: org.clone(),
                    pipeline: pipeline.clone(),
                    number,
                },
            );
        }
        drop(cache);

        Ok(Build {
            id: body.id,
            number: body.number,
            url: body.web_url,
            state: body.state,
            jobs: body
                .jobs
                .into_iter()
                .map(|j| Job {
                    id: j.id,
                    name: j.name.unwrap_or_default(),
                    state: j.state,
                    job_type: j.job_type.unwrap_or_default(),
                })
                .collect(),
        })
    }

    async fn fetch_job_log(&self, ctx: &RequestContext, job_id: &str) -> Result<String, ProviderError> {
        let coords = self.coordinates_for(job_id)?;
        let url = format!(
            "{API_BASE}/organizations/{}/pipelines/{}/builds/{}/jobs/{job_id}/log",
            coords.org, coords.pipeline, coords.number
        );
        retry_with_backoff(|| async {
            let response = self.auth(self.client.get(&url)).timeout(ctx.timeout).send().await.map_err(map_reqwest_error)?;
            if let Some(err) = Self::map_status(response.status()) {
                return Err(err);
            }
            response.text().await.map_err(map_reqwest_error)
        })
        .await
    }

    async fn fetch_artifacts(&self, ctx: &RequestContext, job_id: &str) -> Result<Vec<Artifact>, ProviderError> {
        let coords = self.coordinates_for(job_id)?;
        let url = format!(
            "{API_BASE}/organizations/{}/pipelines/{}/builds/{}/jobs/{job_id}/artifacts",
            coords.org, coords.pipeline, coords.number
        );
        let artifacts: Vec<BuildkiteArtifactResponse> = retry_with_backoff(|| async {
            let response = self.auth(self.client.get(&url)).timeout(ctx.timeout).send().await.map_err(map_reqwest_error)?;
            if let Some(err) = Self::map_status(response.status()) {
                return Err(err);
            }
            response.json().await.map_err(map_reqwest_error)
        })
        .await?;
        Ok(artifacts
            .into_iter()
            .map(|a| Artifact {
                id: a.id,
                path: a.path,
                download_url: a.download_url,
                size: a.file_size,
            })
            .collect())
    }

    async fn download_artifact(&self, ctx: &RequestContext, artifact: &Artifact) -> Result<Vec<u8>, ProviderError> {
        let bytes = retry_with_backoff(|| async {
            let response = self
                .auth(self.client.get(&artifact.download_url))
                .timeout(ctx.timeout)
                .send()
                .await
                .map_err(map_reqwest_error)?;
            if let Some(err) = Self::map_status(response.status()) {
                return Err(err);
            }
            response.bytes().await.map_err(map_reqwest_error)
        })
        .await?;
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::NetworkTimeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_extracts_org_and_pipeline_into_metadata() {
        let provider = BuildkiteProvider::new("token");
        let build_ref = provider
            .parse_url("https://buildkite.com/acme/pipeline/builds/42")
            .unwrap();
        assert_eq!(build_ref.provider_name, "buildkite");
        assert_eq!(build_ref.build_id, "42");
        assert_eq!(build_ref.metadata.get("buildkite.org").unwrap(), "acme");
        assert_eq!(build_ref.metadata.get("buildkite.pipeline").unwrap(), "pipeline");
    }

    #[test]
    fn parse_url_rejects_unrecognized_url() {
        let provider = BuildkiteProvider::new("token");
        assert!(matches!(
            provider.parse_url("https://example.com/nope"),
            Err(ProviderError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn fetch_job_log_requires_fetch_build_first() {
        let provider = BuildkiteProvider::new("token");
        let ctx = RequestContext::default();
        let result = provider.fetch_job_log(&ctx, "unknown-job").await;
        assert!(matches!(result, Err(ProviderError::Transport(_))));
    }
}
