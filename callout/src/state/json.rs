//! File-backed state store
//!
//! One JSON document per ticket at `<root>/<partition>/<ticket_id>.json`,
//! mirroring the object-store key layout the engine was designed
//! against. A missing file is absence; every other IO failure surfaces
//! as `StoreError::Unavailable`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::store::{StateStore, StoreError, StoreResult};
use super::types::{IncidentRecord, Partition, TicketId};

/// JSON-document store rooted at a local directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store, creating the partition directories if missing
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for partition in [Partition::Pending, Partition::Acknowledged] {
            std::fs::create_dir_all(root.join(partition.as_str()))
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, partition: Partition, ticket_id: &str) -> PathBuf {
        self.root
            .join(partition.as_str())
            .join(format!("{ticket_id}.json"))
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn get(
        &self,
        partition: Partition,
        ticket_id: &str,
    ) -> StoreResult<Option<IncidentRecord>> {
        let path = self.document_path(partition, ticket_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }

    async fn put(&self, partition: Partition, record: &IncidentRecord) -> StoreResult<()> {
        let path = self.document_path(partition, &record.ticket_id);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn delete(&self, partition: Partition, ticket_id: &str) -> StoreResult<()> {
        let path = self.document_path(partition, ticket_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn list(&self, partition: Partition) -> StoreResult<Vec<TicketId>> {
        let dir = self.root.join(partition.as_str());
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut tickets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tickets.push(stem.to_string());
                }
            }
        }
        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::{split_targets, IncidentStatus};
    use super::*;

    fn test_store() -> (JsonFileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("state")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_absent_record_is_none() {
        let (store, _dir) = test_store();
        assert!(store
            .get(Partition::Pending, "missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let (store, _dir) = test_store();
        let record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));

        store.put(Partition::Pending, &record).await.unwrap();
        let fetched = store
            .get(Partition::Pending, "T-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.ticket_id, "T-1");
        assert_eq!(fetched.status, IncidentStatus::Pending);

        store.delete(Partition::Pending, "T-1").await.unwrap();
        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());

        // Deleting again is still fine
        store.delete(Partition::Pending, "T-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_move_on_disk() {
        let (store, _dir) = test_store();
        let mut record = IncidentRecord::new("T-1", "disk full", split_targets("+15550001"));
        store.commit(&record).await.unwrap();

        record.acknowledge();
        store.commit(&record).await.unwrap();

        assert!(store.get(Partition::Pending, "T-1").await.unwrap().is_none());
        assert!(store
            .get(Partition::Acknowledged, "T-1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_partition() {
        let (store, _dir) = test_store();
        for id in ["T-1", "T-2"] {
            let record = IncidentRecord::new(id, "cpu high", split_targets("+15550001"));
            store.put(Partition::Pending, &record).await.unwrap();
        }

        let mut tickets = store.list(Partition::Pending).await.unwrap();
        tickets.sort();
        assert_eq!(tickets, vec!["T-1", "T-2"]);
        assert!(store.list(Partition::Acknowledged).await.unwrap().is_empty());
    }
}
