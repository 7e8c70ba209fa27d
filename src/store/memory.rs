//! In-process document stores.
//!
//! Back the same traits as the Postgres stores with `RwLock<Vec<_>>`.
//! Used by the test suite and for running the service without a database.

use super::{
    EventFilter, EventStore, MintRecordFilter, MintRecordStore, PageRequest, Result, StatusCount,
    TemplateStore,
};
use crate::types::{Event, EventId, MintRecord, MintStatus, NftTemplate, TemplateId, UserId};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(0);
    items
        .iter()
        .skip(offset)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

/// In-memory event store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Event>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Event>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<()> {
        self.write().push(event.clone());
        Ok(())
    }

    async fn get(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.read().iter().find(|e| e.id == id).cloned())
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let mut events = self.write();
        if let Some(stored) = events.iter_mut().find(|e| e.id == event.id) {
            *stored = event.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<bool> {
        let mut events = self.write();
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() < before)
    }

    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<(Vec<Event>, u64)> {
        let now = Utc::now();
        let mut matching: Vec<Event> = self
            .read()
            .iter()
            .filter(|e| filter.phase.is_none_or(|phase| e.phase(now) == Some(phase)))
            .filter(|e| filter.created_by.is_none_or(|creator| e.created_by == creator))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        Ok((page_slice(&matching, page), total))
    }
}

/// In-memory NFT template store.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<Vec<NftTemplate>>,
}

impl MemoryTemplateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<NftTemplate>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<NftTemplate>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn insert(&self, template: &NftTemplate) -> Result<()> {
        self.write().push(template.clone());
        Ok(())
    }

    async fn get(&self, id: TemplateId) -> Result<Option<NftTemplate>> {
        Ok(self.read().iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, template: &NftTemplate) -> Result<()> {
        let mut templates = self.write();
        if let Some(stored) = templates.iter_mut().find(|t| t.id == template.id) {
            *stored = template.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: TemplateId) -> Result<bool> {
        let mut templates = self.write();
        let before = templates.len();
        templates.retain(|t| t.id != id);
        Ok(templates.len() < before)
    }

    async fn list(
        &self,
        creator: Option<UserId>,
        page: PageRequest,
    ) -> Result<(Vec<NftTemplate>, u64)> {
        let mut matching: Vec<NftTemplate> = self
            .read()
            .iter()
            .filter(|t| creator.is_none_or(|c| t.creator == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        Ok((page_slice(&matching, page), total))
    }
}

/// In-memory mint record ledger.
#[derive(Debug, Default)]
pub struct MemoryMintRecordStore {
    records: RwLock<Vec<MintRecord>>,
}

impl MemoryMintRecordStore {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<MintRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<MintRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MintRecordStore for MemoryMintRecordStore {
    async fn append(&self, record: &MintRecord) -> Result<()> {
        self.write().push(record.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: MintRecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<MintRecord>, u64)> {
        let mut matching: Vec<MintRecord> = self
            .read()
            .iter()
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.event.is_none_or(|e| r.event == e))
            .filter(|r| filter.user.is_none_or(|u| r.user == Some(u)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        Ok((page_slice(&matching, page), total))
    }

    async fn count_by_status(&self, event: Option<EventId>) -> Result<Vec<StatusCount>> {
        let records = self.read();
        let scoped = records
            .iter()
            .filter(|r| event.is_none_or(|e| r.event == e));

        let mut counts: Vec<StatusCount> = Vec::new();
        for record in scoped {
            match counts.iter_mut().find(|c| c.status == record.status) {
                Some(group) => group.count += 1,
                None => counts.push(StatusCount {
                    status: record.status,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Metadata, Participant};

    fn event(created_by: UserId) -> Event {
        Event::new(
            "Launch party".to_string(),
            None,
            TemplateId::new(),
            Metadata::new(),
            None,
            None,
            created_by,
        )
    }

    #[tokio::test]
    async fn event_store_round_trip() {
        let store = MemoryEventStore::new();
        let creator = UserId::new();
        let mut e = event(creator);
        store.insert(&e).await.unwrap();

        e.participants.push(Participant::new(None, Some("addr".to_string()), None));
        store.update(&e).await.unwrap();

        let loaded = store.get(e.id).await.unwrap().unwrap();
        assert_eq!(loaded.participants.len(), 1);

        assert!(store.delete(e.id).await.unwrap());
        assert!(!store.delete(e.id).await.unwrap());
        assert!(store.get(e.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn event_list_filters_by_creator() {
        let store = MemoryEventStore::new();
        let creator = UserId::new();
        store.insert(&event(creator)).await.unwrap();
        store.insert(&event(UserId::new())).await.unwrap();

        let filter = EventFilter {
            created_by: Some(creator),
            ..EventFilter::default()
        };
        let (events, total) = store.list(filter, PageRequest::clamped(1, 10)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].created_by, creator);
    }

    #[tokio::test]
    async fn record_list_paginates_newest_first() {
        let store = MemoryMintRecordStore::new();
        let event_id = EventId::new();
        for _ in 0..25 {
            let record = MintRecord::new(None, event_id, MintStatus::Success, Some("tx".to_string()));
            store.append(&record).await.unwrap();
        }

        let (page2, total) = store
            .list(MintRecordFilter::default(), PageRequest::clamped(2, 10))
            .await
            .unwrap();
        assert_eq!(total, 25);
        assert_eq!(page2.len(), 10);
        assert!(page2.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn status_breakdown_counts_groups() {
        let store = MemoryMintRecordStore::new();
        let event_id = EventId::new();
        for status in [MintStatus::Success, MintStatus::Success, MintStatus::Failed] {
            store
                .append(&MintRecord::new(None, event_id, status, None))
                .await
                .unwrap();
        }
        store
            .append(&MintRecord::new(None, EventId::new(), MintStatus::Pending, None))
            .await
            .unwrap();

        let counts = store.count_by_status(Some(event_id)).await.unwrap();
        let success = counts.iter().find(|c| c.status == MintStatus::Success).unwrap();
        let failed = counts.iter().find(|c| c.status == MintStatus::Failed).unwrap();
        assert_eq!(success.count, 2);
        assert_eq!(failed.count, 1);
        assert!(!counts.iter().any(|c| c.status == MintStatus::Pending));
    }
}
