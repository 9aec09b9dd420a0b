//! Ranker-sink run loop: subscribes to `destill.analysis.findings`,
//! accumulates cards per request in a bounded in-process window, and once a
//! request has gone quiet, ranks and writes the result to the [`Store`]
//! (§4.7 supplement; see SPEC_FULL.md §9 REDESIGN FLAGS).
//!
//! Findings arrive incrementally with no on-wire "request complete" signal,
//! so completion is inferred the way the teacher's indexer debounces a
//! burst of filesystem events: a request is flushed once no new card has
//! arrived for it for `QUIET_WINDOW`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use destill_broker::Broker;
use destill_contracts::{topics, TriageCard};
use destill_store::Store;

use crate::cancellation::CancellationToken;
use crate::error::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How long a request's finding stream must be silent before it is
/// considered complete and flushed to the store.
const QUIET_WINDOW: Duration = Duration::from_secs(3);

struct Pending {
    cards: Vec<TriageCard>,
    last_seen: Instant,
}

pub fn run(broker: Arc<dyn Broker>, store: Arc<dyn Store>, cancel: CancellationToken) -> Result<()> {
    let subscription = broker.subscribe(topics::FINDINGS, "destill-ranker")?;
    let mut pending: HashMap<String, Pending> = HashMap::new();

    loop {
        if cancel.is_cancelled() {
            info!("ranker-sink: cancelled, exiting");
            return Ok(());
        }

        match subscription.recv_timeout(POLL_INTERVAL) {
            Some(message) => {
                let card: TriageCard = match serde_json::from_slice(&message.value) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(error = %e, "ranker-sink: dropping unparseable card");
                        continue;
                    }
                };
                let entry = pending.entry(card.request_id.clone()).or_insert_with(|| Pending {
                    cards: Vec::new(),
                    last_seen: Instant::now(),
                });
                entry.cards.push(card);
                entry.last_seen = Instant::now();
            }
            None => flush_quiet_requests(&store, &mut pending),
        }
    }
}

fn flush_quiet_requests(store: &Arc<dyn Store>, pending: &mut HashMap<String, Pending>) {
    let now = Instant::now();
    let ready: Vec<String> = pending
        .iter()
        .filter(|(_, p)| now.duration_since(p.last_seen) >= QUIET_WINDOW)
        .map(|(request_id, _)| request_id.clone())
        .collect();

    for request_id in ready {
        let Some(entry) = pending.remove(&request_id) else {
            continue;
        };
        let result = destill_ranker::rank(entry.cards);
        let ranked = destill_ranker::flatten_by_tier(result);
        let cards: Vec<TriageCard> = ranked.into_iter().map(|r| r.card).collect();
        let count = cards.len();
        if let Err(e) = store.store(&request_id, cards) {
            warn!(request_id = %request_id, error = %e, "ranker-sink: failed to persist ranked cards");
            continue;
        }
        info!(request_id = %request_id, findings = count, "ranker-sink: ranked and stored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use destill_contracts::{ContextNote, MetadataBuilder, Severity};
    use destill_store::InMemoryStore;

    fn card(request_id: &str, normalized_message: &str) -> TriageCard {
        TriageCard {
            id: format!("{request_id}-job-1-{normalized_message}-1"),
            request_id: request_id.into(),
            message_hash: "deadbeef".into(),
            source: "buildkite".into(),
            job_name: "job".into(),
            job_id: "job-1".into(),
            build_url: "https://buildkite.com/acme/ci/builds/1".into(),
            chunk_index: 0,
            line_in_chunk: 1,
            metadata: MetadataBuilder::new().build(),
            timestamp: Utc::now(),
            line_number: 1,
            raw_message: normalized_message.into(),
            normalized_message: normalized_message.into(),
            severity: Severity::Error,
            confidence_score: 0.8,
            pre_context: vec![],
            post_context: vec![],
            context_note: ContextNote::None,
        }
    }

    #[test]
    fn quiet_request_is_flushed_and_stored() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let mut pending = HashMap::new();
        pending.insert(
            "req-1".to_string(),
            Pending {
                cards: vec![card("req-1", "boom")],
                last_seen: Instant::now() - QUIET_WINDOW - Duration::from_secs(1),
            },
        );

        flush_quiet_requests(&store, &mut pending);

        assert!(pending.is_empty());
        assert_eq!(store.get_findings("req-1").unwrap().len(), 1);
    }

    #[test]
    fn recently_active_request_is_not_flushed_yet() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let mut pending = HashMap::new();
        pending.insert(
            "req-1".to_string(),
            Pending {
                cards: vec![card("req-1", "boom")],
                last_seen: Instant::now(),
            },
        );

        flush_quiet_requests(&store, &mut pending);

        assert!(pending.contains_key("req-1"));
        assert!(store.get_findings("req-1").is_err());
    }
}
