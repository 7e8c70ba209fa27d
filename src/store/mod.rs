//! Repository traits over the document store.
//!
//! Events, templates, and mint records are persisted as whole documents.
//! Two implementations exist: Postgres-backed JSONB storage
//! ([`postgres`]) and an in-process store ([`memory`]) used by tests and
//! for running the service without a database.
//!
//! Consistency is delegated entirely to the backing store: there is no
//! application-level locking and no version checks. Concurrent writers to
//! the same event document race, last write wins.

use crate::types::{
    Event, EventId, EventPhase, MintRecord, MintStatus, NftTemplate, TemplateId, UserId,
};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryEventStore, MemoryMintRecordStore, MemoryTemplateStore};
pub use postgres::{
    PostgresEventStore, PostgresMintRecordStore, PostgresTemplateStore, run_migrations,
};

/// Store error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database reported an error.
    #[error("database error: {0}")]
    Database(String),
    /// A persisted document failed to round-trip through serde.
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A page request, 1-indexed.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl PageRequest {
    /// Clamps page to at least 1 and limit to 1..=100.
    #[must_use]
    pub const fn clamped(page: u32, limit: u32) -> Self {
        let page = if page == 0 { 1 } else { page };
        let limit = if limit == 0 {
            1
        } else if limit > 100 {
            100
        } else {
            limit
        };
        Self { page, limit }
    }

    /// Row offset for the page.
    #[must_use]
    pub const fn offset(self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Row limit for the page.
    #[must_use]
    pub const fn fetch_limit(self) -> i64 {
        self.limit as i64
    }
}

/// Filters for listing events.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventFilter {
    /// Scheduling phase relative to now
    pub phase: Option<EventPhase>,
    /// Creator reference
    pub created_by: Option<UserId>,
}

/// Filters for the mint record ledger.
#[derive(Clone, Copy, Debug, Default)]
pub struct MintRecordFilter {
    /// Attempt outcome
    pub status: Option<MintStatus>,
    /// Event reference
    pub event: Option<EventId>,
    /// User reference
    pub user: Option<UserId>,
}

/// One group in the per-status mint record breakdown.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StatusCount {
    /// The status group
    pub status: MintStatus,
    /// Number of records in the group
    pub count: u64,
}

/// Event repository.
///
/// The event document embeds its participant roster; `update` replaces the
/// whole document.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn insert(&self, event: &Event) -> Result<()>;

    /// Fetch an event by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document is corrupt.
    async fn get(&self, id: EventId) -> Result<Option<Event>>;

    /// Replace the stored document with `event`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn update(&self, event: &Event) -> Result<()>;

    /// Delete an event. Returns `true` if a document was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn delete(&self, id: EventId) -> Result<bool>;

    /// List events matching `filter`, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<(Vec<Event>, u64)>;
}

/// NFT template repository.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Insert a new template.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn insert(&self, template: &NftTemplate) -> Result<()>;

    /// Fetch a template by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document is corrupt.
    async fn get(&self, id: TemplateId) -> Result<Option<NftTemplate>>;

    /// Replace the stored document with `template`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn update(&self, template: &NftTemplate) -> Result<()>;

    /// Delete a template. Returns `true` if a document was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn delete(&self, id: TemplateId) -> Result<bool>;

    /// List templates, optionally by creator, newest first, with the total.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list(
        &self,
        creator: Option<UserId>,
        page: PageRequest,
    ) -> Result<(Vec<NftTemplate>, u64)>;
}

/// Append-only mint record ledger.
#[async_trait]
pub trait MintRecordStore: Send + Sync {
    /// Append one ledger entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn append(&self, record: &MintRecord) -> Result<()>;

    /// List records matching `filter`, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list(
        &self,
        filter: MintRecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<MintRecord>, u64)>;

    /// Count records per status, optionally scoped to one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn count_by_status(&self, event: Option<EventId>) -> Result<Vec<StatusCount>>;
}
