//! Durable [`Store`] backed by an embedded `redb` database, one table keyed
//! by `request_id` holding the JSON-encoded card list. See DESIGN.md for why
//! this replaces the spec's `POSTGRES_DSN` with an embedded engine.

use redb::{Database, ReadableTable, TableDefinition};

use destill_contracts::TriageCard;

use crate::error::StoreError;
use crate::traits::Store;

const FINDINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("findings");

pub struct DurableStore {
    db: Database,
}

impl DurableStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let write_txn = db.begin_write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        {
            write_txn
                .open_table(FINDINGS_TABLE)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { db })
    }
}

impl Store for DurableStore {
    fn get_findings(&self, request_id: &str) -> Result<Vec<TriageCard>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let table = read_txn
            .open_table(FINDINGS_TABLE)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let value = table
            .get(request_id)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .ok_or_else(|| StoreError::NotFound {
                request_id: request_id.to_string(),
            })?;
        serde_json::from_slice(value.value()).map_err(|e| StoreError::Unavailable(e.to_string()))
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
        let mut merged = self.get_findings(request_id).unwrap_or_default();
        merged.extend(cards);
        let encoded = serde_json::to_vec(&merged).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(FINDINGS_TABLE)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            table
                .insert(request_id, encoded.as_slice())
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
