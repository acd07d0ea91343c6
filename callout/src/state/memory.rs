//! In-memory state store for tests and local runs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::{StateStore, StoreResult};
use super::types::{IncidentRecord, Partition, TicketId};

/// `HashMap`-backed store, cheap to clone and share across tasks
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<(Partition, TicketId), IncidentRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(
        &self,
        partition: Partition,
        ticket_id: &str,
    ) -> StoreResult<Option<IncidentRecord>> {
        let map = self.inner.lock().await;
        Ok(map.get(&(partition, ticket_id.to_string())).cloned())
    }

    async fn put(&self, partition: Partition, record: &IncidentRecord) -> StoreResult<()> {
        let mut map = self.inner.lock().await;
        map.insert((partition, record.ticket_id.clone()), record.clone());
        Ok(())
    }

    async fn delete(&self, partition: Partition, ticket_id: &str) -> StoreResult<()> {
        let mut map = self.inner.lock().await;
        map.remove(&(partition, ticket_id.to_string()));
        Ok(())
    }

    async fn list(&self, partition: Partition) -> StoreResult<Vec<TicketId>> {
        let map = self.inner.lock().await;
        Ok(map
            .keys()
            .filter(|(p, _)| *p == partition)
            .map(|(_, id)| id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::split_targets;
    use super::*;

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let store = MemoryStore::new();
        let record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));

        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());

        store.put(Partition::Pending, &record).await.unwrap();
        let fetched = store
            .get(Partition::Pending, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.summary, "disk full");

        assert_eq!(store.list(Partition::Pending).await.unwrap(), vec!["T-1"]);
        assert!(store.list(Partition::Acknowledged).await.unwrap().is_empty());

        store.delete(Partition::Pending, "T-1").await.unwrap();
        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();

        let record = IncidentRecord::new("T-1", "cpu high", split_targets("+15550001"));
        store.put(Partition::Pending, &record).await.unwrap();

        assert!(handle.get(Partition::Pending, "T-1").await.unwrap().is_some());
    }
}
