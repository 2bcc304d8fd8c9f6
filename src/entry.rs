// File: ./src/entry.rs
//! Render entries: the immutable snapshot handed to the renderer each tick.
use crate::config::WidgetConfig;
use crate::model::{AggregationResult, ListHandle, ListOverview, NormalizedItem};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub const NO_UPCOMING_TITLE: &str = "No upcoming reminders";

/// Tap target of every entry: opens the reminders app.
pub const OPEN_APP_URL: &str = "x-apple-reminderkit://";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    UpcomingTimeline,
    SpecificList,
    AllListsOverview,
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEntry {
    /// Instant this entry describes.
    pub date: DateTime<Utc>,
    pub mode: ViewMode,

    /// Headline for the simple view.
    pub title: String,
    pub due_time: Option<DateTime<Utc>>,

    // Echoed configuration
    pub selected_list: Option<String>,
    pub tags: Vec<String>,
    pub show_url: bool,
    pub show_summary: bool,

    pub upcoming: Vec<NormalizedItem>,
    pub lists: Vec<ListOverview>,
    pub detail: Option<ListOverview>,

    pub open_url: String,
}

impl RenderEntry {
    /// True when nothing beyond the fallback headline is shown.
    pub fn is_fallback(&self) -> bool {
        self.due_time.is_none()
            && self.title == NO_UPCOMING_TITLE
            && self.upcoming.is_empty()
            && self.lists.is_empty()
            && self.detail.is_none()
    }

    /// Sample content for previews and galleries.
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        let in_one_hour = now + Duration::hours(1);
        let in_two_hours = now + Duration::hours(2);
        let tomorrow = now + Duration::days(1);

        let item = |title: &str, due: Option<DateTime<Utc>>, list: &str, notes: &str| {
            NormalizedItem {
                title: title.to_string(),
                due_at: due,
                list_name: list.to_string(),
                notes: Some(notes.to_string()),
                url: None,
                completed: false,
            }
        };

        let work = ListHandle::new("work-projects-list-id", "Work Projects");
        let errands = ListHandle::new("personal-errands-list-id", "Personal Errands");

        let upcoming = vec![
            item("Team Meeting", Some(in_one_hour), &work.title, "Discuss Q3 goals"),
            item("Grocery Shopping", Some(in_two_hours), &errands.title, "Milk, Eggs, Bread"),
            NormalizedItem {
                url: Some("http://example.com/report".to_string()),
                ..item("Project Deadline", Some(tomorrow), &work.title, "Finalize report")
            },
        ];

        let detail_items = vec![
            NormalizedItem {
                url: Some("http://example.com/task1".to_string()),
                ..item("Task 1 in Details", Some(in_one_hour), &work.title, "Detailed notes for task 1")
            },
            item("Task 2 in Details (No Due Date)", None, &work.title, "No specific due date here."),
            NormalizedItem {
                completed: true,
                ..item("Completed Task in Details", Some(now), &work.title, "This one is done.")
            },
        ];

        Self {
            date: now,
            mode: ViewMode::UpcomingTimeline,
            title: "Placeholder Reminder".to_string(),
            due_time: Some(in_one_hour),
            selected_list: Some(work.title.clone()),
            tags: vec!["#placeholder".to_string()],
            show_url: false,
            show_summary: true,
            upcoming,
            lists: vec![
                ListOverview {
                    list: work.clone(),
                    items: Vec::new(),
                },
                ListOverview {
                    list: errands,
                    items: Vec::new(),
                },
            ],
            detail: Some(ListOverview {
                list: work,
                items: detail_items,
            }),
            open_url: OPEN_APP_URL.to_string(),
        }
    }
}

/// Headline: first upcoming item in the selected list (any list when none is
/// selected), else the first upcoming item, else the fallback text.
fn headline(
    upcoming: &[NormalizedItem],
    selected_list: Option<&str>,
) -> (String, Option<DateTime<Utc>>) {
    let preferred = upcoming
        .iter()
        .find(|i| selected_list.is_none_or(|name| i.list_name == name));
    match preferred.or(upcoming.first()) {
        Some(item) => (item.title.clone(), item.due_at),
        None => (NO_UPCOMING_TITLE.to_string(), None),
    }
}

/// Maps one aggregation onto an entry for `mode`. Pure; only the slice the
/// mode displays is carried, configuration flags are copied verbatim.
pub fn adapt(
    result: AggregationResult,
    config: &WidgetConfig,
    mode: ViewMode,
    now: DateTime<Utc>,
) -> RenderEntry {
    let (title, due_time) = headline(&result.upcoming, config.selected_list.as_deref());

    let AggregationResult {
        upcoming,
        per_list,
        detail,
    } = result;

    let (upcoming, lists, detail) = match mode {
        ViewMode::UpcomingTimeline => (upcoming, Vec::new(), None),
        ViewMode::AllListsOverview => (Vec::new(), per_list, None),
        ViewMode::SpecificList => (Vec::new(), Vec::new(), detail),
        ViewMode::Simple => (Vec::new(), Vec::new(), None),
    };

    RenderEntry {
        date: now,
        mode,
        title,
        due_time,
        selected_list: config.selected_list.clone(),
        tags: config.tags.clone(),
        show_url: config.show_url,
        show_summary: config.show_summary,
        upcoming,
        lists,
        detail,
        open_url: OPEN_APP_URL.to_string(),
    }
}
