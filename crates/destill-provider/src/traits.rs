use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{Artifact, Build, BuildRef, RequestContext};

/// Uniform surface the ingestor reaches external CI systems through (§4.2).
#[async_trait]
pub trait Provider: Send + Sync {
    fn parse_url(&self, url: &str) -> Result<BuildRef, ProviderError>;
    async fn fetch_build(&self, ctx: &RequestContext, build_ref: &BuildRef) -> Result<Build, ProviderError>;
    async fn fetch_job_log(&self, ctx: &RequestContext, job_id: &str) -> Result<String, ProviderError>;
    async fn fetch_artifacts(&self, ctx: &RequestContext, job_id: &str) -> Result<Vec<Artifact>, ProviderError>;
    async fn download_artifact(&self, ctx: &RequestContext, artifact: &Artifact) -> Result<Vec<u8>, ProviderError>;
}
