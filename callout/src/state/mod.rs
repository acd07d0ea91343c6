//! State persistence for escalating incidents
//!
//! Two logical partitions — `pending` and `acknowledged` — each hold
//! at most one record per ticket. The escalation loop and the
//! acknowledgment path run concurrently with no shared in-process
//! state; this store is their only meeting point, so both re-read it
//! before acting and treat `acknowledged` as authoritative when a
//! ticket shows up in both partitions.

pub mod json;
pub mod memory;
pub mod store;
pub mod types;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{reconcile, StateStore, StoreError, StoreResult};
pub use types::{
    split_targets, FinalStatus, IncidentRecord, IncidentStatus, Partition, TicketId,
};
