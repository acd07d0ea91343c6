//! State store contract
//!
//! The store is the only resource shared between the escalation loop
//! and the acknowledgment path; both sides read authoritative state
//! from it rather than trusting in-memory copies.

use async_trait::async_trait;

use super::types::{IncidentRecord, IncidentStatus, Partition, TicketId};

/// Error type for state store operations
///
/// Absence of a record is not an error; `get` returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for state store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence keyed by `(partition, ticket_id)`.
///
/// No ordering guarantees are provided across concurrent writers; the
/// contract is last-writer-wins. Callers compensate by re-reading
/// before externally visible actions and by treating `acknowledged`
/// as authoritative whenever a ticket appears in both partitions.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch a record, distinguishing absence from failure
    async fn get(&self, partition: Partition, ticket_id: &str)
        -> StoreResult<Option<IncidentRecord>>;

    /// Upsert a record at `(partition, ticket_id)`
    async fn put(&self, partition: Partition, record: &IncidentRecord) -> StoreResult<()>;

    /// Remove a record; a no-op if absent
    async fn delete(&self, partition: Partition, ticket_id: &str) -> StoreResult<()>;

    /// All ticket ids currently present in a partition
    async fn list(&self, partition: Partition) -> StoreResult<Vec<TicketId>>;

    /// Persist a record into the partition its status demands.
    ///
    /// An acknowledged record is written to `acknowledged` and then
    /// removed from `pending` — a move, not a copy. The two writes are
    /// not transactional: a crash in between can leave the ticket in
    /// both partitions (or neither), which [`reconcile`] cleans up.
    async fn commit(&self, record: &IncidentRecord) -> StoreResult<()> {
        if record.status == IncidentStatus::Acknowledged {
            self.put(Partition::Acknowledged, record).await?;
            self.delete(Partition::Pending, &record.ticket_id).await
        } else {
            self.put(Partition::Pending, record).await
        }
    }
}

/// Sweep `pending` for tickets that also exist in `acknowledged` and
/// drop the pending leftovers.
///
/// The acknowledged copy wins; a both-present ticket is the residue of
/// a crash between the two halves of [`StateStore::commit`]. Returns
/// the number of pending records removed.
pub async fn reconcile<S: StateStore + ?Sized>(store: &S) -> StoreResult<usize> {
    let mut removed = 0;
    for ticket_id in store.list(Partition::Pending).await? {
        if store.get(Partition::Acknowledged, &ticket_id).await?.is_some() {
            store.delete(Partition::Pending, &ticket_id).await?;
            tracing::info!(
                ticket_id = %ticket_id,
                "removed pending leftover for acknowledged ticket"
            );
            removed += 1;
        }
    }
    Ok(removed)
}
