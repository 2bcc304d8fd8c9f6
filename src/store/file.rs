// File: src/store/file.rs
//! JSON-file backed store used by the command-line front end.
use crate::error::{StoreError, StoreResult};
use crate::model::{
    AuthorizationState, CalendarEvent, CompletionFilter, DueComponents, ListHandle, NewItem,
    RawItem,
};
use crate::storage::{LocalStorage, StoreData};
use crate::store::{ReminderStore, selects};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Pause between attempts while another handle holds the store lock.
const LOCK_RETRY: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // The async paths never park a runtime thread on the file lock. They poll
    // it and sleep between attempts, so an outer timeout can drop them.
    async fn read(&self) -> StoreResult<StoreData> {
        loop {
            if let Some(data) = LocalStorage::try_load(&self.path)? {
                return Ok(data);
            }
            log::trace!("Store at {:?} is locked, retrying", self.path);
            tokio::time::sleep(LOCK_RETRY).await;
        }
    }

    async fn update<T, F>(&self, mut f: F) -> anyhow::Result<T>
    where
        F: FnMut(&mut StoreData) -> anyhow::Result<T> + Send,
    {
        loop {
            if let Some(out) = LocalStorage::try_modify(&self.path, &mut f)? {
                return Ok(out);
            }
            log::trace!("Store at {:?} is locked, retrying", self.path);
            tokio::time::sleep(LOCK_RETRY).await;
        }
    }

    /// Registers a list, replacing the title of an existing identifier.
    pub fn upsert_list(&self, list: ListHandle) -> StoreResult<()> {
        LocalStorage::modify(&self.path, |data| {
            match data
                .lists
                .iter_mut()
                .find(|l| l.identifier == list.identifier)
            {
                Some(existing) => existing.title = list.title,
                None => data.lists.push(list),
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn set_default_list(&self, list_id: Option<String>) -> StoreResult<()> {
        LocalStorage::modify(&self.path, |data| {
            data.default_list = list_id;
            Ok(())
        })?;
        Ok(())
    }

    pub fn set_authorization(&self, status: AuthorizationState) -> StoreResult<()> {
        LocalStorage::modify(&self.path, |data| {
            data.authorization = status;
            Ok(())
        })?;
        Ok(())
    }

    pub fn add_event(&self, event: CalendarEvent) -> StoreResult<()> {
        LocalStorage::modify(&self.path, |data| {
            data.events.push(event);
            Ok(())
        })?;
        Ok(())
    }
}

fn has_list(data: &StoreData, id: &str) -> bool {
    data.lists.iter().any(|l| l.identifier == id)
}

#[async_trait]
impl ReminderStore for FileStore {
    async fn authorization_status(&self) -> AuthorizationState {
        match self.read().await {
            Ok(data) => data.authorization,
            Err(e) => {
                log::warn!("Could not read store at {:?}: {}", self.path, e);
                AuthorizationState::Unknown
            }
        }
    }

    async fn request_access(&self) -> StoreResult<bool> {
        let status = self
            .update(|data| {
                if data.authorization == AuthorizationState::NotDetermined {
                    data.authorization = if data.grant_on_request {
                        AuthorizationState::Authorized
                    } else {
                        AuthorizationState::Denied
                    };
                }
                Ok(data.authorization)
            })
            .await?;
        Ok(status.can_read())
    }

    async fn lists(&self) -> StoreResult<Vec<ListHandle>> {
        Ok(self.read().await?.lists)
    }

    async fn default_list(&self) -> StoreResult<Option<ListHandle>> {
        let data = self.read().await?;
        Ok(data
            .default_list
            .as_ref()
            .and_then(|id| data.lists.iter().find(|l| &l.identifier == id))
            .cloned())
    }

    async fn fetch_items(
        &self,
        lists: Option<&[String]>,
        filter: CompletionFilter,
    ) -> StoreResult<Vec<RawItem>> {
        let data = self.read().await?;
        Ok(data
            .items
            .into_iter()
            .filter(|i| selects(lists, &i.list_id) && filter.admits(i))
            .collect())
    }

    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Option<&[String]>,
    ) -> StoreResult<Vec<CalendarEvent>> {
        let data = self.read().await?;
        Ok(data
            .events
            .into_iter()
            .filter(|e| selects(calendars, &e.calendar_id) && e.overlaps(start, end))
            .collect())
    }

    async fn create_item(&self, item: NewItem) -> StoreResult<String> {
        if item.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title is empty".to_string()));
        }

        // Typed failures are carried out of the locked closure separately so
        // they are not flattened into anyhow.
        let mut rejection: Option<StoreError> = None;
        let uid = self
            .update(|data| {
                let list_id = match &item.list_id {
                    Some(id) if has_list(data, id) => id.clone(),
                    Some(id) => {
                        rejection = Some(StoreError::ListNotFound(id.clone()));
                        anyhow::bail!("list not found");
                    }
                    None => match data.default_list.clone().filter(|id| has_list(data, id)) {
                        Some(id) => id,
                        None => {
                            rejection = Some(StoreError::NoDefaultList);
                            anyhow::bail!("no default list");
                        }
                    },
                };

                let raw = RawItem {
                    uid: Uuid::new_v4().to_string(),
                    title: Some(item.title.clone()),
                    due: item
                        .due
                        .map(|d| DueComponents::from_datetime(&d.with_timezone(&Local))),
                    notes: item.notes.clone(),
                    url: None,
                    completed: false,
                    list_id,
                };
                let uid = raw.uid.clone();
                data.items.push(raw);
                Ok(uid)
            })
            .await;

        match (uid, rejection) {
            (_, Some(typed)) => Err(typed),
            (Ok(uid), None) => Ok(uid),
            (Err(e), None) => Err(e.into()),
        }
    }
}
