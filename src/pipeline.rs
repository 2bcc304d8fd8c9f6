// File: src/pipeline.rs
//! Aggregation of reminders into the composite views a widget renders.
//!
//! Read operations never fail: authorization problems, store errors and
//! timeouts are logged and turned into empty results, because the renderer
//! has no way to show an error. Only `create_item` returns a typed error.
use crate::access::AccessGate;
use crate::config::Config;
use crate::entry::ViewMode;
use crate::error::{StoreError, StoreResult};
use crate::fetcher::ItemFetcher;
use crate::model::ranking::{rank_events, rank_lists, ranked};
use crate::model::{
    AggregationResult, CalendarEvent, ListHandle, ListOverview, NewItem, NormalizedItem,
    Normalizer,
};
use crate::resolver::{self, ListSelection};
use crate::store::ReminderStore;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;

pub type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Horizon for the "next reminder" headline before falling back to the
/// earliest future item.
pub const NEXT_REMINDER_HOURS: i64 = 3;

/// `now + hours`, saturating at the latest representable instant.
pub fn window_end(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now.checked_add_signed(Duration::hours(hours))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Clone)]
pub struct AggregationPipeline {
    gate: Arc<AccessGate>,
    fetcher: ItemFetcher,
    normalizer: Normalizer,
    now_provider: NowProvider,
}

impl AggregationPipeline {
    pub fn new(gate: Arc<AccessGate>) -> Self {
        let fetcher = ItemFetcher::new(gate.store().clone());
        Self {
            gate,
            fetcher,
            normalizer: Normalizer::local(),
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now_provider)()
    }

    pub fn gate(&self) -> &Arc<AccessGate> {
        &self.gate
    }

    fn store(&self) -> &dyn ReminderStore {
        self.gate.store().as_ref()
    }

    async fn readable(&self) -> bool {
        match self.gate.ensure_access().await {
            Ok(status) if status.can_read() => true,
            Ok(status) => {
                log::debug!("Reads unavailable while access is {:?}", status);
                false
            }
            Err(e) => {
                log::warn!("Reminder access unavailable: {}", e);
                false
            }
        }
    }

    async fn list_handles(&self) -> StoreResult<Vec<ListHandle>> {
        self.fetcher.bounded(self.store().lists()).await
    }

    fn absorb<T: Default>(what: &str, result: StoreResult<T>) -> T {
        result.unwrap_or_else(|e| {
            log::warn!("{} failed, showing nothing: {}", what, e);
            T::default()
        })
    }

    // --- Upcoming ---

    /// Incomplete items due within `[now, now + hours]`, optionally limited to
    /// lists titled `list_name`, ranked.
    pub async fn build_upcoming(&self, hours: u32, list_name: Option<&str>) -> Vec<NormalizedItem> {
        if !self.readable().await {
            return Vec::new();
        }
        Self::absorb("Upcoming fetch", self.try_upcoming(hours, list_name).await)
    }

    async fn try_upcoming(
        &self,
        hours: u32,
        list_name: Option<&str>,
    ) -> StoreResult<Vec<NormalizedItem>> {
        let now = self.now();
        let end = window_end(now, i64::from(hours));
        let lists = self.list_handles().await?;
        let selection = resolver::resolve(list_name, &lists);

        let raws = self
            .fetcher
            .fetch_window(now, end, &selection, |d| self.normalizer.resolve_due(d))
            .await?;

        let items = self
            .normalizer
            .normalize_all(&raws, &lists)
            .into_iter()
            .filter(|i| i.due_at.is_some_and(|due| due >= now && due <= end))
            .collect();
        Ok(ranked(items))
    }

    // --- Overview ---

    /// Every list with its first `sample_size` incomplete items, lists ordered
    /// by title. A list whose fetch fails shows up with no items.
    pub async fn build_overview(&self, sample_size: usize) -> Vec<ListOverview> {
        if !self.readable().await {
            return Vec::new();
        }
        let lists = Self::absorb("List query", self.list_handles().await);

        let branches = lists
            .into_iter()
            .map(|list| self.overview_branch(list, sample_size));
        let mut overview = join_all(branches).await;

        rank_lists(&mut overview);
        overview
    }

    async fn overview_branch(&self, list: ListHandle, sample_size: usize) -> ListOverview {
        let selection = ListSelection::Lists(vec![list.clone()]);
        let raws = match self.fetcher.fetch_all(&selection).await {
            Ok(raws) => raws,
            Err(e) => {
                log::warn!("Fetch for list '{}' failed: {}", list.title, e);
                Vec::new()
            }
        };

        let mut items: Vec<NormalizedItem> = self
            .normalizer
            .normalize_all(&raws, std::slice::from_ref(&list))
            .into_iter()
            .filter(|i| !i.completed)
            .collect();
        items = ranked(items);
        items.truncate(sample_size);

        ListOverview { list, items }
    }

    // --- Single list ---

    /// All items of one list (completed included), ranked. `None` when the
    /// list is unknown or unreadable.
    pub async fn build_list_detail(&self, list_id: &str) -> Option<ListOverview> {
        if !self.readable().await {
            return None;
        }
        match self.try_list_detail(list_id).await {
            Ok(detail) => detail,
            Err(e) => {
                log::warn!("Detail fetch for list {} failed: {}", list_id, e);
                None
            }
        }
    }

    async fn try_list_detail(&self, list_id: &str) -> StoreResult<Option<ListOverview>> {
        let lists = self.list_handles().await?;
        let Some(list) = lists.into_iter().find(|l| l.identifier == list_id) else {
            log::debug!("Detail requested for unknown list {}", list_id);
            return Ok(None);
        };
        let selection = ListSelection::Lists(vec![list.clone()]);
        let raws = self.fetcher.fetch_all(&selection).await?;
        let items = ranked(
            self.normalizer
                .normalize_all(&raws, std::slice::from_ref(&list)),
        );
        Ok(Some(ListOverview { list, items }))
    }

    // --- Composite ---

    /// Everything one tick needs, built concurrently.
    pub async fn aggregate(&self, config: &Config) -> AggregationResult {
        let detail_list = match config.view_mode {
            ViewMode::SpecificList => config.detail_list.as_deref(),
            _ => None,
        };

        let (upcoming, per_list, detail) = tokio::join!(
            self.build_upcoming(config.upcoming_hours, config.selected_list.as_deref()),
            self.build_overview(config.sample_size),
            async {
                match detail_list {
                    Some(id) => self.build_list_detail(id).await,
                    None => None,
                }
            }
        );

        AggregationResult {
            upcoming,
            per_list,
            detail,
        }
    }

    // --- Headline ---

    /// The earliest incomplete item due in the next few hours, else the
    /// earliest incomplete item due at or after now.
    pub async fn next_reminder(&self, list_name: Option<&str>) -> Option<NormalizedItem> {
        if !self.readable().await {
            return None;
        }
        let future_items = Self::absorb("Next reminder fetch", self.try_future_items(list_name).await);

        let horizon = window_end(self.now(), NEXT_REMINDER_HOURS);
        let soon = future_items
            .iter()
            .find(|i| i.due_at.is_some_and(|d| d <= horizon))
            .cloned();
        if soon.is_some() {
            return soon;
        }
        log::debug!("Nothing due within {}h, using the earliest future item", NEXT_REMINDER_HOURS);
        future_items.into_iter().next()
    }

    async fn try_future_items(&self, list_name: Option<&str>) -> StoreResult<Vec<NormalizedItem>> {
        let now = self.now();
        let lists = self.list_handles().await?;
        let selection = resolver::resolve(list_name, &lists);
        let raws = self.fetcher.fetch_incomplete(&selection).await?;
        let items = self
            .normalizer
            .normalize_all(&raws, &lists)
            .into_iter()
            .filter(|i| i.due_at.is_some_and(|d| d >= now))
            .collect();
        Ok(ranked(items))
    }

    // --- Configuration helpers ---

    /// Distinct `#tags` found in notes of incomplete reminders, without the
    /// leading `#` or trailing punctuation, sorted.
    pub async fn collect_tags(&self) -> Vec<String> {
        if !self.readable().await {
            return Vec::new();
        }
        let raws = Self::absorb(
            "Tag scan",
            self.fetcher.fetch_incomplete(&ListSelection::All).await,
        );

        let tags: BTreeSet<String> = raws
            .iter()
            .filter_map(|r| r.notes.as_deref())
            .flat_map(str::split_whitespace)
            .filter_map(|word| word.strip_prefix('#'))
            .map(|tag| tag.trim_end_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        tags.into_iter().collect()
    }

    /// All lists, sorted by title, for pickers.
    pub async fn list_options(&self) -> Vec<ListHandle> {
        if !self.readable().await {
            return Vec::new();
        }
        let mut lists = Self::absorb("List query", self.list_handles().await);
        lists.sort_by_key(|l| l.title.to_lowercase());
        lists
    }

    // --- Events ---

    /// Calendar events overlapping `[now, now + hours]`, by start time.
    pub async fn build_events(&self, hours: u32) -> Vec<CalendarEvent> {
        if !self.readable().await {
            return Vec::new();
        }
        let now = self.now();
        let end = window_end(now, i64::from(hours));
        let mut events = Self::absorb(
            "Event fetch",
            self.fetcher.fetch_events(now, end, &ListSelection::All).await,
        );
        rank_events(&mut events);
        events
    }

    // --- Write path ---

    /// Creates a reminder. Unlike the read paths, failures are returned.
    pub async fn create_item(&self, item: NewItem) -> StoreResult<String> {
        let title = item.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty".to_string()));
        }
        let item = NewItem { title, ..item };

        self.gate.ensure_write_access().await?;
        let uid = self.fetcher.bounded(self.store().create_item(item)).await?;
        log::info!("Created reminder {}", uid);
        Ok(uid)
    }
}
