// File: ./src/store/mod.rs
//! The seam between the aggregation pipeline and whatever system service
//! actually holds reminders, lists and calendar events.
pub mod file;
pub mod memory;

use crate::error::StoreResult;
use crate::model::{
    AuthorizationState, CalendarEvent, CompletionFilter, ListHandle, NewItem, RawItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use file::FileStore;
pub use memory::MemoryStore;

/// External reminder/calendar data service.
///
/// `lists: None` means "every list"; `Some(&[])` selects nothing.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn authorization_status(&self) -> AuthorizationState;

    /// Interactive grant prompt. Returns whether access was granted.
    async fn request_access(&self) -> StoreResult<bool>;

    async fn lists(&self) -> StoreResult<Vec<ListHandle>>;

    async fn default_list(&self) -> StoreResult<Option<ListHandle>>;

    async fn fetch_items(
        &self,
        lists: Option<&[String]>,
        filter: CompletionFilter,
    ) -> StoreResult<Vec<RawItem>>;

    /// Events overlapping `[start, end]`.
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> StoreResult<Vec<CalendarEvent>>;

    /// Creates a reminder and returns its identifier.
    async fn create_item(&self, item: NewItem) -> StoreResult<String>;
}

pub(crate) fn selects(lists: Option<&[String]>, list_id: &str) -> bool {
    lists.is_none_or(|ids| ids.iter().any(|id| id == list_id))
}
