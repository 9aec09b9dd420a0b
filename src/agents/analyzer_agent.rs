//! Analyzer agent run loop (§4.6): subscribes to `destill.logs.raw`,
//! scans each chunk, and publishes the resulting triage cards.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use destill_broker::Broker;
use destill_contracts::{topics, LogChunk, TriageCard, TriageCardContext};

use crate::cancellation::CancellationToken;
use crate::error::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(broker: Arc<dyn Broker>, cancel: CancellationToken) -> Result<()> {
    let subscription = broker.subscribe(topics::LOGS_RAW, "destill-analyzer")?;

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let Some(message) = subscription.recv_timeout(POLL_INTERVAL) else {
            continue;
        };

        let chunk: LogChunk = match serde_json::from_slice(&message.value) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "analyzer: dropping unparseable chunk");
                continue;
            }
        };

        for card in cards_for(&chunk) {
            let bytes = match serde_json::to_vec(&card) {
                Ok(b) => b,
                Err(e) => {
                    warn!(error = %e, "analyzer: failed to marshal card, dropping");
                    continue;
                }
            };
            if let Err(e) = broker.publish(topics::FINDINGS, &chunk.request_id, bytes) {
                warn!(error = %e, "analyzer: publish failed");
                return Err(e.into());
            }
        }
    }
}

/// Turn one chunk's findings into the triage cards the analyzer agent
/// publishes, each carrying the `"{job_id}-{hash}-{line}"` local id §4.6
/// names before the `run` loop's request-id prefix is attached by
/// `TriageCard::from_finding`.
fn cards_for(chunk: &LogChunk) -> Vec<TriageCard> {
    destill_analyzer::analyze_chunk(chunk)
        .iter()
        .map(|finding| {
            TriageCard::from_finding(
                finding,
                chunk.line_start,
                TriageCardContext {
                    request_id: &chunk.request_id,
                    job_id: &chunk.job_id,
                    job_name: &chunk.job_name,
                    build_url: chunk
                        .metadata
                        .get(destill_contracts::metadata::KEY_BUILD_URL)
                        .map(String::as_str)
                        .unwrap_or_default(),
                    source: chunk
                        .metadata
                        .get(destill_contracts::metadata::KEY_PROVIDER)
                        .map(String::as_str)
                        .unwrap_or("unknown"),
                    chunk_index: chunk.chunk_index,
                    metadata: chunk.metadata.clone(),
                    timestamp: chrono::Utc::now(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use destill_contracts::MetadataBuilder;

    fn chunk(content: &str) -> LogChunk {
        LogChunk {
            request_id: "req-1".into(),
            build_id: "build-1".into(),
            job_name: "test".into(),
            job_id: "job-1".into(),
            chunk_index: 0,
            total_chunks: 1,
            content: content.into(),
            line_start: 1,
            line_end: content.lines().count() as u64,
            metadata: MetadataBuilder::new()
                .exit_status("1")
                .build_url("https://buildkite.com/acme/ci/builds/1")
                .provider("buildkite")
                .build(),
        }
    }

    #[test]
    fn cards_carry_request_and_job_ids_from_the_chunk() {
        let c = chunk("java.lang.OutOfMemoryError: Java heap space\nmore context to pad the line length out a bit so it is not skipped as too short");
        let cards = cards_for(&c);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].request_id, "req-1");
        assert_eq!(cards[0].job_id, "job-1");
        assert!(cards[0].id.starts_with("req-1-job-1-"));
    }

    #[test]
    fn empty_chunk_yields_no_cards() {
        assert!(cards_for(&chunk("")).is_empty());
    }
}
