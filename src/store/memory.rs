// File: src/store/memory.rs
use crate::error::{StoreError, StoreResult};
use crate::model::{
    AuthorizationState, CalendarEvent, CompletionFilter, DueComponents, ListHandle, NewItem,
    RawItem,
};
use crate::store::{ReminderStore, selects};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    lists: Vec<ListHandle>,
    /// list identifier -> items of that list
    items: HashMap<String, Vec<RawItem>>,
    /// item uid -> list identifier
    index: HashMap<String, String>,
    events: Vec<CalendarEvent>,
    default_list: Option<String>,
    status: AuthorizationState,
    grant_on_request: bool,
    access_requests: usize,
}

impl Inner {
    fn has_list(&self, id: &str) -> bool {
        self.lists.iter().any(|l| l.identifier == id)
    }

    fn add_item(&mut self, item: RawItem) {
        self.index.insert(item.uid.clone(), item.list_id.clone());
        self.items.entry(item.list_id.clone()).or_default().push(item);
    }
}

/// In-memory store. Lists keep insertion order; items are grouped per list
/// with a uid index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(status: AuthorizationState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                status,
                grant_on_request: true,
                ..Default::default()
            }),
        }
    }

    /// Authorized store, the common case for tests and embedding hosts.
    pub fn authorized() -> Self {
        Self::new(AuthorizationState::Authorized)
    }

    pub fn with_list(mut self, list: ListHandle) -> Self {
        self.inner.get_mut().lists.push(list);
        self
    }

    pub fn with_item(mut self, item: RawItem) -> Self {
        self.inner.get_mut().add_item(item);
        self
    }

    pub fn with_event(mut self, event: CalendarEvent) -> Self {
        self.inner.get_mut().events.push(event);
        self
    }

    pub fn with_default_list(mut self, list_id: &str) -> Self {
        self.inner.get_mut().default_list = Some(list_id.to_string());
        self
    }

    /// What the user answers when prompted.
    pub fn grant_on_request(mut self, grant: bool) -> Self {
        self.inner.get_mut().grant_on_request = grant;
        self
    }

    pub async fn insert_item(&self, item: RawItem) {
        self.inner.lock().await.add_item(item);
    }

    pub async fn set_status(&self, status: AuthorizationState) {
        self.inner.lock().await.status = status;
    }

    /// Number of interactive prompts shown so far.
    pub async fn access_requests(&self) -> usize {
        self.inner.lock().await.access_requests
    }

    pub async fn item(&self, uid: &str) -> Option<RawItem> {
        let inner = self.inner.lock().await;
        let list_id = inner.index.get(uid)?;
        inner
            .items
            .get(list_id)?
            .iter()
            .find(|i| i.uid == uid)
            .cloned()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn authorization_status(&self) -> AuthorizationState {
        self.inner.lock().await.status
    }

    async fn request_access(&self) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        inner.access_requests += 1;
        if inner.status == AuthorizationState::NotDetermined {
            inner.status = if inner.grant_on_request {
                AuthorizationState::Authorized
            } else {
                AuthorizationState::Denied
            };
        }
        Ok(inner.status.can_read())
    }

    async fn lists(&self) -> StoreResult<Vec<ListHandle>> {
        Ok(self.inner.lock().await.lists.clone())
    }

    async fn default_list(&self) -> StoreResult<Option<ListHandle>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .default_list
            .as_ref()
            .and_then(|id| inner.lists.iter().find(|l| &l.identifier == id))
            .cloned())
    }

    async fn fetch_items(
        &self,
        lists: Option<&[String]>,
        filter: CompletionFilter,
    ) -> StoreResult<Vec<RawItem>> {
        let inner = self.inner.lock().await;
        // Walk lists in registration order so results are deterministic.
        let mut out = Vec::new();
        for list in &inner.lists {
            if !selects(lists, &list.identifier) {
                continue;
            }
            if let Some(items) = inner.items.get(&list.identifier) {
                out.extend(items.iter().filter(|i| filter.admits(i)).cloned());
            }
        }
        Ok(out)
    }

    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> StoreResult<Vec<CalendarEvent>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| selects(calendars, &e.calendar_id) && e.overlaps(start, end))
            .cloned()
            .collect())
    }

    async fn create_item(&self, item: NewItem) -> StoreResult<String> {
        let mut inner = self.inner.lock().await;
        if item.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title is empty".to_string()));
        }

        let list_id = match item.list_id {
            Some(id) if inner.has_list(&id) => id,
            Some(id) => return Err(StoreError::ListNotFound(id)),
            None => inner
                .default_list
                .clone()
                .filter(|id| inner.has_list(id))
                .ok_or(StoreError::NoDefaultList)?,
        };

        let raw = RawItem {
            uid: Uuid::new_v4().to_string(),
            title: Some(item.title),
            due: item
                .due
                .map(|d| DueComponents::from_datetime(&d.with_timezone(&Local))),
            notes: item.notes,
            url: None,
            completed: false,
            list_id,
        };
        let uid = raw.uid.clone();
        inner.add_item(raw);
        Ok(uid)
    }
}
