//! Postgres-backed document stores.
//!
//! Entities are persisted as JSONB documents alongside denormalized columns
//! for the fields list queries filter and sort on. Queries are bound at
//! runtime, so the crate builds without a live database.

use super::{
    EventFilter, EventStore, MintRecordFilter, MintRecordStore, PageRequest, Result, StatusCount,
    StoreError, TemplateStore,
};
use crate::types::{
    Event, EventId, MintRecord, NftTemplate, RecordId, TemplateId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Run embedded migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(format!("migration failed: {e}")))?;
    Ok(())
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn from_document<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// Postgres event store.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, event: &Event) -> Result<()> {
        let data = to_document(event)?;
        sqlx::query(
            "INSERT INTO events (id, created_by, start_date, end_date, created_at, data)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.id.as_uuid())
        .bind(event.created_by.as_uuid())
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_at)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM events WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(|(data,)| from_document(data)).transpose()
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let data = to_document(event)?;
        sqlx::query(
            "UPDATE events
             SET created_by = $2, start_date = $3, end_date = $4, created_at = $5, data = $6
             WHERE id = $1",
        )
        .bind(event.id.as_uuid())
        .bind(event.created_by.as_uuid())
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_at)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<(Vec<Event>, u64)> {
        // The phase filter matches the stored dates against the database
        // clock, mirroring the in-memory phase computation.
        const WHERE: &str = "($1::uuid IS NULL OR created_by = $1)
             AND ($2::text IS NULL
                  OR ($2 = 'upcoming' AND start_date > now())
                  OR ($2 = 'ongoing' AND start_date <= now() AND end_date >= now())
                  OR ($2 = 'ended' AND end_date < now()))";

        let created_by = filter.created_by.map(|u| *u.as_uuid());
        let phase = filter.phase.map(crate::types::EventPhase::as_str);

        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(&format!(
            "SELECT data FROM events WHERE {WHERE}
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(created_by)
        .bind(phase)
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM events WHERE {WHERE}"))
                .bind(created_by)
                .bind(phase)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        let events = rows
            .into_iter()
            .map(|(data,)| from_document(data))
            .collect::<Result<Vec<Event>>>()?;
        Ok((events, total.unsigned_abs()))
    }
}

/// Postgres NFT template store.
#[derive(Clone)]
pub struct PostgresTemplateStore {
    pool: PgPool,
}

impl PostgresTemplateStore {
    /// Creates a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PostgresTemplateStore {
    async fn insert(&self, template: &NftTemplate) -> Result<()> {
        let data = to_document(template)?;
        sqlx::query(
            "INSERT INTO nft_templates (id, creator, created_at, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(template.id.as_uuid())
        .bind(template.creator.as_uuid())
        .bind(template.created_at)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: TemplateId) -> Result<Option<NftTemplate>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM nft_templates WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(|(data,)| from_document(data)).transpose()
    }

    async fn update(&self, template: &NftTemplate) -> Result<()> {
        let data = to_document(template)?;
        sqlx::query("UPDATE nft_templates SET creator = $2, created_at = $3, data = $4 WHERE id = $1")
            .bind(template.id.as_uuid())
            .bind(template.creator.as_uuid())
            .bind(template.created_at)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: TemplateId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nft_templates WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        creator: Option<UserId>,
        page: PageRequest,
    ) -> Result<(Vec<NftTemplate>, u64)> {
        let creator = creator.map(|u| *u.as_uuid());

        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT data FROM nft_templates
             WHERE ($1::uuid IS NULL OR creator = $1)
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(creator)
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM nft_templates WHERE ($1::uuid IS NULL OR creator = $1)",
        )
        .bind(creator)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let templates = rows
            .into_iter()
            .map(|(data,)| from_document(data))
            .collect::<Result<Vec<NftTemplate>>>()?;
        Ok((templates, total.unsigned_abs()))
    }
}

/// Postgres mint record ledger.
///
/// Records are flat, so they get plain columns instead of a JSONB document.
#[derive(Clone)]
pub struct PostgresMintRecordStore {
    pool: PgPool,
}

type RecordRow = (
    Uuid,
    Option<Uuid>,
    Uuid,
    String,
    Option<String>,
    DateTime<Utc>,
);

impl PostgresMintRecordStore {
    /// Creates a ledger over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: RecordRow) -> Result<MintRecord> {
        let (id, user, event, status, tx_hash, created_at) = row;
        Ok(MintRecord {
            id: RecordId::from_uuid(id),
            user: user.map(UserId::from_uuid),
            event: EventId::from_uuid(event),
            status: status.parse().map_err(StoreError::Corrupt)?,
            tx_hash,
            created_at,
        })
    }
}

#[async_trait]
impl MintRecordStore for PostgresMintRecordStore {
    async fn append(&self, record: &MintRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO mint_records (id, user_id, event_id, status, tx_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id.as_uuid())
        .bind(record.user.map(|u| *u.as_uuid()))
        .bind(record.event.as_uuid())
        .bind(record.status.as_str())
        .bind(record.tx_hash.as_deref())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list(
        &self,
        filter: MintRecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<MintRecord>, u64)> {
        const WHERE: &str = "($1::text IS NULL OR status = $1)
             AND ($2::uuid IS NULL OR event_id = $2)
             AND ($3::uuid IS NULL OR user_id = $3)";

        let status = filter.status.map(crate::types::MintStatus::as_str);
        let event = filter.event.map(|e| *e.as_uuid());
        let user = filter.user.map(|u| *u.as_uuid());

        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "SELECT id, user_id, event_id, status, tx_hash, created_at
             FROM mint_records WHERE {WHERE}
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(status)
        .bind(event)
        .bind(user)
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM mint_records WHERE {WHERE}"))
                .bind(status)
                .bind(event)
                .bind(user)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        let records = rows
            .into_iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<MintRecord>>>()?;
        Ok((records, total.unsigned_abs()))
    }

    async fn count_by_status(&self, event: Option<EventId>) -> Result<Vec<StatusCount>> {
        let event = event.map(|e| *e.as_uuid());

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM mint_records
             WHERE ($1::uuid IS NULL OR event_id = $1)
             GROUP BY status",
        )
        .bind(event)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok(StatusCount {
                    status: status.parse().map_err(StoreError::Corrupt)?,
                    count: count.unsigned_abs(),
                })
            })
            .collect()
    }
}
