// File: ./src/model/item.rs
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_uid() -> String {
    Uuid::new_v4().to_string()
}

/// Authorization reported by the external store.
///
/// Only an explicit request may move the state away from `NotDetermined`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum AuthorizationState {
    #[default]
    NotDetermined,
    Authorized,
    WriteOnly,
    Denied,
    Restricted,
    Unknown,
}

impl AuthorizationState {
    pub fn can_read(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, Self::Authorized | Self::WriteOnly)
    }
}

/// A reminder list (calendar). Identity is `identifier`; `title` is display-only
/// and may collide with other lists.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListHandle {
    pub identifier: String,
    pub title: String,
}

impl ListHandle {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
        }
    }
}

/// Due date as the store keeps it: calendar components in the local time zone.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DueComponents {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub minute: Option<u32>,
}

impl DueComponents {
    pub fn date_only(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            hour: None,
            minute: None,
        }
    }

    /// Captures year..minute of `dt` as seen in its own time zone. Seconds are dropped.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: Some(dt.hour()),
            minute: Some(dt.minute()),
        }
    }

    /// Resolves against the local time zone.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        self.resolve_in(&Local)
    }

    /// Returns `None` when the components do not name a real instant in `tz`
    /// (invalid calendar date, or a wall-clock time skipped by a DST jump).
    /// Date-only components resolve to midnight; ambiguous times pick the earliest.
    pub fn resolve_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = match self.hour {
            Some(h) => NaiveTime::from_hms_opt(h, self.minute.unwrap_or(0), 0)?,
            None => NaiveTime::MIN,
        };
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A reminder exactly as the external store hands it over.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default = "default_uid")]
    pub uid: String,
    pub title: Option<String>,
    #[serde(default)]
    pub due: Option<DueComponents>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub list_id: String,
}

impl RawItem {
    pub fn new(title: &str, list_id: &str) -> Self {
        Self {
            uid: default_uid(),
            title: Some(title.to_string()),
            due: None,
            notes: None,
            url: None,
            completed: false,
            list_id: list_id.to_string(),
        }
    }

    pub fn with_due_at<Tz: TimeZone>(mut self, dt: &DateTime<Tz>) -> Self {
        self.due = Some(DueComponents::from_datetime(dt));
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Presentation-ready reminder. `title` is never empty.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub list_name: String,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub completed: bool,
}

/// A calendar event overlapping a query window.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default = "default_uid")]
    pub uid: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub calendar_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CalendarEvent {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= end && self.end >= start
    }
}

/// Input of the single-item creation operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub due: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub list_id: Option<String>,
}

impl NewItem {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CompletionFilter {
    Incomplete,
    Any,
}

impl CompletionFilter {
    pub fn admits(&self, item: &RawItem) -> bool {
        match self {
            Self::Incomplete => !item.completed,
            Self::Any => true,
        }
    }
}

/// One list paired with its ranked sample.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ListOverview {
    pub list: ListHandle,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub upcoming: Vec<NormalizedItem>,
    pub per_list: Vec<ListOverview>,
    /// Full ranked contents of one list, for the single-list view.
    #[serde(default)]
    pub detail: Option<ListOverview>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.per_list.is_empty() && self.detail.is_none()
    }
}
