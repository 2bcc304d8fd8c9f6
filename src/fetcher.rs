// File: ./src/fetcher.rs
//! Bounded queries against the store.
//!
//! Every store call is wrapped in a timeout; expiry surfaces as
//! `StoreError::TimedOut`, which read paths treat like any other failure.
use crate::error::{StoreError, StoreResult};
use crate::model::{CalendarEvent, CompletionFilter, DueComponents, RawItem};
use crate::resolver::ListSelection;
use crate::store::ReminderStore;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ItemFetcher {
    store: Arc<dyn ReminderStore>,
    timeout: Duration,
}

impl ItemFetcher {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn bounded<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::TimedOut(self.timeout)),
        }
    }

    async fn query(
        &self,
        selection: &ListSelection,
        filter: CompletionFilter,
    ) -> StoreResult<Vec<RawItem>> {
        if selection.is_empty() {
            return Ok(Vec::new());
        }
        let ids = selection.identifiers();
        self.bounded(self.store.fetch_items(ids.as_deref(), filter))
            .await
    }

    /// Incomplete items whose due date resolves inside `[start, end]`.
    /// Items without a resolvable due date are excluded.
    pub async fn fetch_window<R>(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        selection: &ListSelection,
        resolve: R,
    ) -> StoreResult<Vec<RawItem>>
    where
        R: Fn(&DueComponents) -> Option<DateTime<Utc>>,
    {
        let items = self.query(selection, CompletionFilter::Incomplete).await?;
        let total = items.len();
        let windowed: Vec<RawItem> = items
            .into_iter()
            .filter(|item| {
                item.due
                    .as_ref()
                    .and_then(&resolve)
                    .is_some_and(|due| due >= start && due <= end)
            })
            .collect();
        log::debug!(
            "Window {} .. {}: {} of {} candidates",
            start,
            end,
            windowed.len(),
            total
        );
        Ok(windowed)
    }

    /// Every item of the selection, complete or not, dated or not.
    pub async fn fetch_all(&self, selection: &ListSelection) -> StoreResult<Vec<RawItem>> {
        self.query(selection, CompletionFilter::Any).await
    }

    /// Incomplete items of the selection regardless of due date.
    pub async fn fetch_incomplete(&self, selection: &ListSelection) -> StoreResult<Vec<RawItem>> {
        self.query(selection, CompletionFilter::Incomplete).await
    }

    pub async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        selection: &ListSelection,
    ) -> StoreResult<Vec<CalendarEvent>> {
        if selection.is_empty() {
            return Ok(Vec::new());
        }
        let ids = selection.identifiers();
        self.bounded(self.store.fetch_events(start, end, ids.as_deref()))
            .await
    }
}
