use destill_contracts::TriageCard;

use crate::error::StoreError;

/// Narrow persistence interface the core reads and writes through (§6).
pub trait Store: Send + Sync {
    fn get_findings(&self, request_id: &str) -> Result<Vec<TriageCard>, StoreError>;
    fn get_by_hash(&self, request_id: &str, message_hash: &str) -> Result<TriageCard, StoreError>;
    fn store(&self, request_id: &str, cards: Vec<TriageCard>) -> Result<(), StoreError>;
    fn close(&self) -> Result<(), StoreError>;
}
