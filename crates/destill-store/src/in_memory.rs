//! In-memory [`Store`]. Write-through on `store`, shared reads on `get_*`
//! (§5 "In-memory store indexes").

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use destill_contracts::TriageCard;

use crate::error::StoreError;
use crate::traits::Store;

#[derive(Default)]
pub struct InMemoryStore {
    findings: RwLock<HashMap<String, Vec<TriageCard>>>,
    closed: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn get_findings(&self, request_id: &str) -> Result<Vec<TriageCard>, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store closed".into()));
        }

        self.findings
            .read()
            .expect("store index poisoned")
            .get(request_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                request_id: request_id.to_string(),
            })
    }

    fn get_by_hash(&self, request_id: &str, message_hash: &str) -> Result<TriageCard, StoreError> {
        let cards = self.get_findings(request_id)?;
        cards
            .into_iter()
            .find(|c| c.message_hash == message_hash)
            .ok_or_else(|| StoreError::HashNotFound {
                request_id: request_id.to_string(),
                message_hash: message_hash.to_string(),
            })
    }

    fn store(&self, request_id: &str, cards: Vec<TriageCard>) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store closed".into()));
        }

        self.findings
            .write()
            .expect("store index poisoned")
            .entry(request_id.to_string())
            .or_default()
            .extend(cards);
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use destill_contracts::{ContextNote, MetadataBuilder, Severity};

    fn card(message_hash: &str) -> TriageCard {
        TriageCard {
            id: format!("req-1-job-1-{message_hash}-1"),
            request_id: "req-1".into(),
            message_hash: message_hash.into(),
            source: "buildkite".into(),
            job_name: "job".into(),
            job_id: "job-1".into(),
            build_url: "https://buildkite.com/acme/ci/builds/1".into(),
            chunk_index: 0,
            line_in_chunk: 1,
            metadata: MetadataBuilder::new().build(),
            timestamp: Utc::now(),
            line_number: 1,
            raw_message: "boom".into(),
            normalized_message: "boom".into(),
            severity: Severity::Error,
            confidence_score: 0.9,
            pre_context: vec![],
            post_context: vec![],
            context_note: ContextNote::None,
        }
    }

    #[test]
    fn store_then_get_findings_round_trips() {
        let store = InMemoryStore::new();
        store.store("req-1", vec![card("hash-a")]).unwrap();
        let found = store.get_findings("req-1").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn get_findings_for_unknown_request_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_findings("missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn get_by_hash_finds_matching_card() {
        let store = InMemoryStore::new();
        store.store("req-1", vec![card("hash-a"), card("hash-b")]).unwrap();
        let found = store.get_by_hash("req-1", "hash-b").unwrap();
        assert_eq!(found.message_hash, "hash-b");
    }

    #[test]
    fn get_by_hash_missing_hash_is_hash_not_found() {
        let store = InMemoryStore::new();
        store.store("req-1", vec![card("hash-a")]).unwrap();
        assert!(matches!(
            store.get_by_hash("req-1", "hash-z"),
            Err(StoreError::HashNotFound { .. })
        ));
    }

    #[test]
    fn store_is_write_through_appending_across_calls() {
        let store = InMemoryStore::new();
        store.store("req-1", vec![card("hash-a")]).unwrap();
        store.store("req-1", vec![card("hash-b")]).unwrap();
        assert_eq!(store.get_findings("req-1").unwrap().len(), 2);
    }

    #[test]
    fn closed_store_rejects_reads_and_writes() {
        let store = InMemoryStore::new();
        store.close().unwrap();
        assert!(matches!(store.store("req-1", vec![]), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.get_findings("req-1"), Err(StoreError::Unavailable(_))));
    }
}
