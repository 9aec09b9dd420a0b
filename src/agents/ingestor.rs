//! Ingestor run loop (§4.5): subscribes to `destill.requests`, resolves
//! each request's build URL to a provider, fetches and chunks every
//! relevant job's log, and publishes chunks and JUnit findings downstream.
//!
//! Runs on its own thread, bridging the broker's blocking `Subscription`
//! with the provider's async calls via a `tokio::runtime::Handle`, the way
//! the teacher's `orbit-star` background indexer bridges a blocking
//! filesystem walk with async manifest I/O.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use destill_broker::Broker;
use destill_contracts::{
    topics, AnalysisRequest, ContextNote, LogChunk, MetadataBuilder, ProgressUpdate, Severity,
    TriageCard,
};
use destill_provider::{Artifact, Provider, ProviderRegistry, RequestContext};

use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::junit::{parse_junit_report, stack_trace_lines};

/// How long a single `recv_timeout` waits before re-checking cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// JUnit artifacts are recognized by substring "junit" and suffix ".xml"
/// (§4.5 step 5.e).
fn is_junit_artifact(path: &str) -> bool {
    path.to_ascii_lowercase().contains("junit") && path.ends_with(".xml")
}

/// Derive the ranker-facing `job_state` string and the analyzer-facing
/// `exit_status` code from a provider's raw job state. Anything other than
/// the two recognized terminal states is left unset, matching §4.7's
/// "unknown job state" and the analyzer's `ExitState::Unknown` handling.
fn job_state_and_exit_status(raw_state: &str) -> (Option<&'static str>, Option<&'static str>) {
    match raw_state {
        "passed" => (Some("passed"), Some("0")),
        "failed" => (Some("failed"), Some("1")),
        _ => (None, None),
    }
}

pub fn run(
    broker: Arc<dyn Broker>,
    registry: ProviderRegistry,
    runtime: tokio::runtime::Handle,
    cancel: CancellationToken,
) -> Result<()> {
    let subscription = broker.subscribe(topics::REQUESTS, "destill-ingestor")?;
    let ctx = RequestContext::default();

    loop {
        if cancel.is_cancelled() {
            info!("ingestor: cancelled, exiting");
            return Ok(());
        }

        let Some(message) = subscription.recv_timeout(POLL_INTERVAL) else {
            continue;
        };

        let request: AnalysisRequest = match serde_json::from_slice(&message.value) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "ingestor: dropping unparseable request");
                continue;
            }
        };

        if let Err(e) = process_request(&broker, &registry, &runtime, &ctx, &request) {
            warn!(request_id = %request.request_id, error = %e, "ingestor: request failed, dropping");
        }
    }
}

fn process_request(
    broker: &Arc<dyn Broker>,
    registry: &ProviderRegistry,
    runtime: &tokio::runtime::Handle,
    ctx: &RequestContext,
    request: &AnalysisRequest,
) -> Result<()> {
    publish_progress(broker, &request.request_id, "Downloading build metadata", 0, 1);

    let build_ref = match registry.resolve(&request.build_url) {
        Ok(provider) => provider,
        Err(e) => {
            publish_progress(broker, &request.request_id, "Invalid build URL", 0, 0);
            return Err(e.into());
        }
    };

    let parsed = build_ref.parse_url(&request.build_url)?;
    let build = match runtime.block_on(build_ref.fetch_build(ctx, &parsed)) {
        Ok(build) => build,
        Err(e) => {
            publish_progress(broker, &request.request_id, "Failed to fetch build", 0, 0);
            return Err(e.into());
        }
    };

    let relevant_jobs: Vec<_> = build
        .jobs
        .iter()
        .filter(|j| j.job_type.is_empty() || j.job_type == "script")
        .collect();
    let total = relevant_jobs.len() as u64;

    for (idx, job) in relevant_jobs.into_iter().enumerate() {
        publish_progress(
            broker,
            &request.request_id,
            "Fetching logs",
            idx as u64 + 1,
            total,
        );

        let log = match runtime.block_on(build_ref.fetch_job_log(ctx, &job.id)) {
            Ok(log) => log,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "ingestor: partial job failure, continuing");
                continue;
            }
        };

        let (job_state, exit_status) = job_state_and_exit_status(&job.state);
        let mut metadata_builder = MetadataBuilder::new()
            .build_url(request.build_url.clone())
            .build_id(build.id.clone())
            .build_number(build.number.to_string())
            .job_type(job.job_type.clone())
            .provider(parsed.provider_name.clone());
        if let Some(state) = job_state {
            metadata_builder = metadata_builder.job_state(state);
        }
        if let Some(status) = exit_status {
            metadata_builder = metadata_builder.exit_status(status);
        }
        let metadata = metadata_builder.build();

        let chunks = destill_chunker::chunk(
            &log,
            &request.request_id,
            &build.id,
            &job.name,
            &job.id,
            &metadata,
        );

        for chunk in &chunks {
            publish_chunk(broker, chunk)?;
        }

        if let Err(e) = publish_junit_findings(
            broker,
            runtime,
            &build_ref,
            ctx,
            request,
            &build,
            job,
            &parsed.provider_name,
        ) {
            debug!(job_id = %job.id, error = %e, "ingestor: no JUnit findings published for job");
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn publish_junit_findings(
    broker: &Arc<dyn Broker>,
    runtime: &tokio::runtime::Handle,
    provider: &destill_provider::ProviderKind,
    ctx: &RequestContext,
    request: &AnalysisRequest,
    build: &destill_provider::Build,
    job: &destill_provider::Job,
    provider_name: &str,
) -> Result<()> {
    let artifacts = runtime.block_on(provider.fetch_artifacts(ctx, &job.id))?;
    for artifact in artifacts.iter().filter(|a| is_junit_artifact(&a.path)) {
        let bytes = runtime.block_on(download_artifact(provider, ctx, artifact))?;
        let xml = String::from_utf8_lossy(&bytes);
        let failures = parse_junit_report(&xml)?;

        for failure in failures {
            let post_context = failure
                .stack_trace
                .as_deref()
                .map(|trace| stack_trace_lines(trace, 50))
                .unwrap_or_default();

            let card = TriageCard {
                id: format!("{}-{}-junit-{}", request.request_id, job.id, failure.case),
                request_id: request.request_id.clone(),
                message_hash: destill_contracts::ids::message_hash(&failure.message),
                source: format!("junit:{}", artifact.path),
                job_name: job.name.clone(),
                job_id: job.id.clone(),
                build_url: build.url.clone(),
                chunk_index: 0,
                line_in_chunk: 1,
                metadata: MetadataBuilder::new()
                    .build_url(request.build_url.clone())
                    .build_id(build.id.clone())
                    .provider(provider_name)
                    .build(),
                timestamp: request.timestamp,
                line_number: 1,
                raw_message: failure.message.clone(),
                normalized_message: failure.message,
                severity: Severity::Error,
                confidence_score: 1.0,
                pre_context: vec![],
                post_context,
                context_note: ContextNote::JunitStructuredFailure,
            };

            publish_finding(broker, &card)?;
        }
    }
    Ok(())
}

async fn download_artifact(
    provider: &destill_provider::ProviderKind,
    ctx: &RequestContext,
    artifact: &Artifact,
) -> std::result::Result<Vec<u8>, destill_provider::ProviderError> {
    provider.download_artifact(ctx, artifact).await
}

fn publish_progress(broker: &Arc<dyn Broker>, request_id: &str, stage: &str, current: u64, total: u64) {
    let update = ProgressUpdate::new(request_id, stage, current, total);
    if let Ok(bytes) = serde_json::to_vec(&update) {
        let _ = broker.publish(topics::PROGRESS, request_id, bytes);
    }
}

fn publish_chunk(broker: &Arc<dyn Broker>, chunk: &LogChunk) -> Result<()> {
    let bytes = serde_json::to_vec(chunk)?;
    broker.publish(topics::LOGS_RAW, &chunk.build_id, bytes)?;
    Ok(())
}

fn publish_finding(broker: &Arc<dyn Broker>, card: &TriageCard) -> Result<()> {
    let bytes = serde_json::to_vec(card)?;
    broker.publish(topics::FINDINGS, &card.request_id, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junit_artifact_matches_substring_and_suffix() {
        assert!(is_junit_artifact("reports/junit-results.xml"));
        assert!(!is_junit_artifact("reports/results.json"));
        assert!(!is_junit_artifact("junit-results.xml.gz"));
    }

    #[test]
    fn job_state_maps_passed_and_failed_only() {
        assert_eq!(job_state_and_exit_status("passed"), (Some("passed"), Some("0")));
        assert_eq!(job_state_and_exit_status("failed"), (Some("failed"), Some("1")));
        assert_eq!(job_state_and_exit_status("running"), (None, None));
    }
}
