use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::state::{ClientRecord, PaymentLedgerEntry};
use crate::types::ClientId;

/// storage collaborator boundary
///
/// Each call is atomic on its own; the core performs no transactions or
/// rollback across calls. In particular, if `append_ledger_entry` fails
/// after `save_client` succeeded, the persisted balance and the ledger are
/// left inconsistent. This is a known gap, not silently handled.
pub trait ClientStore {
    fn load_client(&self, client_id: ClientId) -> Result<ClientRecord>;

    /// upsert the record, including whatever ledger history it carries
    fn save_client(&mut self, record: &ClientRecord) -> Result<()>;

    /// append one ledger entry to an existing client's history
    fn append_ledger_entry(
        &mut self,
        client_id: ClientId,
        entry: &PaymentLedgerEntry,
    ) -> Result<()>;

    fn delete_client(&mut self, client_id: ClientId) -> Result<()>;

    /// all clients, ordered by join date
    fn list_clients(&self) -> Result<Vec<ClientRecord>>;
}

/// in-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: HashMap<ClientId, ClientRecord>,
}

/// serializable snapshot of the whole store
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    clients: Vec<ClientRecord>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// export all clients as pretty-printed json
    pub fn to_json_pretty(&self) -> Result<String> {
        let snapshot = StoreSnapshot {
            clients: self.list_clients()?,
        };
        serde_json::to_string_pretty(&snapshot).map_err(|e| LedgerError::StorageFailure {
            message: e.to_string(),
        })
    }

    /// rebuild a store from an exported snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StoreSnapshot =
            serde_json::from_str(json).map_err(|e| LedgerError::StorageFailure {
                message: e.to_string(),
            })?;

        let mut store = Self::new();
        for record in snapshot.clients {
            store.clients.insert(record.client_id, record);
        }
        Ok(store)
    }
}

impl ClientStore for InMemoryClientStore {
    fn load_client(&self, client_id: ClientId) -> Result<ClientRecord> {
        self.clients
            .get(&client_id)
            .cloned()
            .ok_or(LedgerError::ClientNotFound { client_id })
    }

    fn save_client(&mut self, record: &ClientRecord) -> Result<()> {
        self.clients.insert(record.client_id, record.clone());
        Ok(())
    }

    fn append_ledger_entry(
        &mut self,
        client_id: ClientId,
        entry: &PaymentLedgerEntry,
    ) -> Result<()> {
        let record = self
            .clients
            .get_mut(&client_id)
            .ok_or(LedgerError::ClientNotFound { client_id })?;

        record.loan.history.push(entry.clone());
        Ok(())
    }

    fn delete_client(&mut self, client_id: ClientId) -> Result<()> {
        // ledger entries are owned by the client record and go with it
        self.clients
            .remove(&client_id)
            .map(|_| ())
            .ok_or(LedgerError::ClientNotFound { client_id })
    }

    fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        let mut records: Vec<ClientRecord> = self.clients.values().cloned().collect();
        records.sort_by(|a, b| {
            a.joined_date
                .cmp(&b.joined_date)
                .then(a.client_id.cmp(&b.client_id))
        });
        Ok(records)
    }
}
