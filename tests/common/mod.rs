// Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use nextup::access::AccessGate;
use nextup::error::{StoreError, StoreResult};
use nextup::model::{
    AuthorizationState, CalendarEvent, CompletionFilter, ListHandle, NewItem, NormalizedItem,
    Normalizer, RawItem,
};
use nextup::pipeline::AggregationPipeline;
use nextup::store::{MemoryStore, ReminderStore};
use std::sync::Arc;
use std::time::Duration;

/// Fixed clock used by every scenario: 2026-03-10 09:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// `now` shifted by `mins`, expressed in the UTC fixed zone so due
/// components round-trip through the normalizer unchanged.
pub fn at(mins: i64) -> DateTime<FixedOffset> {
    (fixed_now() + chrono::Duration::minutes(mins)).with_timezone(&utc())
}

pub fn pipeline_for(store: Arc<dyn ReminderStore>, interactive: bool) -> AggregationPipeline {
    let gate = Arc::new(AccessGate::new(store, interactive));
    AggregationPipeline::new(gate)
        .with_normalizer(Normalizer::fixed(utc()))
        .with_now_provider(Arc::new(fixed_now))
}

pub fn pipeline(store: MemoryStore) -> AggregationPipeline {
    pipeline_for(Arc::new(store), true)
}

pub fn titles(items: &[NormalizedItem]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

pub fn item(title: &str, due: Option<DateTime<Utc>>, completed: bool) -> NormalizedItem {
    NormalizedItem {
        title: title.to_string(),
        due_at: due,
        list_name: "Inbox".to_string(),
        notes: None,
        url: None,
        completed,
    }
}

/// Wraps a `MemoryStore` and sabotages item fetches: queries touching one
/// of `failing_lists` error out, and every fetch first sleeps for `delay`.
/// With `hangs` set, authorization queries never answer.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub failing_lists: Vec<String>,
    pub delay: Option<Duration>,
    pub hangs: bool,
}

impl FlakyStore {
    pub fn failing(inner: MemoryStore, lists: &[&str]) -> Self {
        Self {
            inner,
            failing_lists: lists.iter().map(|s| s.to_string()).collect(),
            delay: None,
            hangs: false,
        }
    }

    pub fn stalling(inner: MemoryStore, delay: Duration) -> Self {
        Self {
            inner,
            failing_lists: Vec::new(),
            delay: Some(delay),
            hangs: false,
        }
    }

    pub fn unresponsive(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing_lists: Vec::new(),
            delay: None,
            hangs: true,
        }
    }
}

#[async_trait]
impl ReminderStore for FlakyStore {
    async fn authorization_status(&self) -> AuthorizationState {
        if self.hangs {
            std::future::pending::<()>().await;
        }
        self.inner.authorization_status().await
    }

    async fn request_access(&self) -> StoreResult<bool> {
        if self.hangs {
            std::future::pending::<()>().await;
        }
        self.inner.request_access().await
    }

    async fn lists(&self) -> StoreResult<Vec<ListHandle>> {
        self.inner.lists().await
    }

    async fn default_list(&self) -> StoreResult<Option<ListHandle>> {
        self.inner.default_list().await
    }

    async fn fetch_items(
        &self,
        lists: Option<&[String]>,
        filter: CompletionFilter,
    ) -> StoreResult<Vec<RawItem>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ids) = lists
            && ids.iter().any(|id| self.failing_lists.contains(id))
        {
            return Err(StoreError::StoreOperationFailed(format!(
                "backend refused {:?}",
                ids
            )));
        }
        self.inner.fetch_items(lists, filter).await
    }

    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> StoreResult<Vec<CalendarEvent>> {
        self.inner.fetch_events(start, end, calendars).await
    }

    async fn create_item(&self, item: NewItem) -> StoreResult<String> {
        self.inner.create_item(item).await
    }
}
