// End-to-end behavior of the aggregation pipeline over an in-memory store.
mod common;

use chrono::{Duration, NaiveDate};
use common::{at, fixed_now, pipeline, titles};
use nextup::config::Config;
use nextup::entry::ViewMode;
use nextup::model::{AuthorizationState, CalendarEvent, DueComponents, ListHandle, RawItem};
use nextup::pipeline::window_end;
use nextup::store::MemoryStore;

fn personal_and_work() -> MemoryStore {
    MemoryStore::authorized()
        .with_list(ListHandle::new("p1", "Personal"))
        .with_list(ListHandle::new("w1", "Work"))
        .with_item(RawItem::new("Buy milk", "p1").with_due_at(&at(30)))
        .with_item(RawItem::new("Report", "w1").with_due_at(&at(5 * 60)))
}

#[tokio::test]
async fn test_upcoming_keeps_only_the_window() {
    let pipeline = pipeline(personal_and_work());

    let upcoming = pipeline.build_upcoming(3, None).await;
    assert_eq!(titles(&upcoming), vec!["Buy milk"]);
    assert_eq!(upcoming[0].list_name, "Personal");
    assert_eq!(upcoming[0].due_at, Some(fixed_now() + Duration::minutes(30)));
}

#[tokio::test]
async fn test_upcoming_never_leaves_the_window() {
    let store = personal_and_work()
        .with_item(RawItem::new("Overdue", "p1").with_due_at(&at(-10)))
        .with_item(RawItem::new("Undated", "p1"))
        .with_item(RawItem::new("Done soon", "p1").with_due_at(&at(10)).completed())
        .with_item(RawItem::new("Edge", "w1").with_due_at(&at(3 * 60)))
        .with_item(RawItem {
            due: Some(DueComponents {
                year: 2026,
                month: 2,
                day: 30,
                hour: Some(9),
                minute: Some(30),
            }),
            ..RawItem::new("Impossible date", "p1")
        });
    let pipeline = pipeline(store);

    let upcoming = pipeline.build_upcoming(3, None).await;
    assert_eq!(titles(&upcoming), vec!["Buy milk", "Edge"]);

    let end = fixed_now() + Duration::hours(3);
    for item in &upcoming {
        let due = item.due_at.expect("windowed items are dated");
        assert!(due >= fixed_now() && due <= end);
        assert!(!item.completed);
    }
}

#[tokio::test]
async fn test_huge_windows_saturate_instead_of_overflowing() {
    let store = personal_and_work()
        .with_item(RawItem::new("Far future", "w1").with_due_at(&at(50 * 365 * 24 * 60)))
        .with_event(CalendarEvent {
            uid: "retro".to_string(),
            title: "Retro".to_string(),
            start: fixed_now() + Duration::hours(2),
            end: fixed_now() + Duration::hours(3),
            calendar_id: "work".to_string(),
            notes: None,
        });
    let pipeline = pipeline(store);

    let upcoming = pipeline.build_upcoming(u32::MAX, None).await;
    assert_eq!(titles(&upcoming), vec!["Buy milk", "Report", "Far future"]);

    let events = pipeline.build_events(u32::MAX).await;
    assert_eq!(events.len(), 1);

    assert_eq!(
        window_end(fixed_now(), i64::from(u32::MAX)),
        chrono::DateTime::<chrono::Utc>::MAX_UTC
    );
    assert_eq!(window_end(fixed_now(), 3), fixed_now() + Duration::hours(3));
}

#[tokio::test]
async fn test_upcoming_filters_by_list_title() {
    let pipeline = pipeline(personal_and_work());

    let work = pipeline.build_upcoming(24, Some("work")).await;
    assert_eq!(titles(&work), vec!["Report"]);

    let everything = pipeline.build_upcoming(24, None).await;
    assert_eq!(titles(&everything), vec!["Buy milk", "Report"]);

    // An unknown name means nothing matched, not "show everything".
    let unknown = pipeline.build_upcoming(24, Some("Groceries")).await;
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_upcoming_includes_every_list_sharing_a_title() {
    let store = personal_and_work()
        .with_list(ListHandle::new("w2", "Work"))
        .with_item(RawItem::new("Standup", "w2").with_due_at(&at(60)));
    let pipeline = pipeline(store);

    let work = pipeline.build_upcoming(24, Some("Work")).await;
    assert_eq!(titles(&work), vec!["Standup", "Report"]);
}

#[tokio::test]
async fn test_date_only_due_resolves_to_midnight() {
    let tomorrow = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
    let store = MemoryStore::authorized()
        .with_list(ListHandle::new("p1", "Personal"))
        .with_item(RawItem {
            due: Some(DueComponents::date_only(tomorrow)),
            ..RawItem::new("Bins out", "p1")
        });
    let pipeline = pipeline(store);

    // Midnight tomorrow is 15 hours after 09:00.
    assert!(pipeline.build_upcoming(14, None).await.is_empty());
    let upcoming = pipeline.build_upcoming(15, None).await;
    assert_eq!(titles(&upcoming), vec!["Bins out"]);
}

#[tokio::test]
async fn test_overview_samples_and_orders_lists() {
    let store = MemoryStore::authorized()
        .with_list(ListHandle::new("w1", "Work"))
        .with_list(ListHandle::new("h1", "Home"))
        .with_item(RawItem::new("Third", "w1").with_due_at(&at(180)))
        .with_item(RawItem::new("First", "w1").with_due_at(&at(60)))
        .with_item(RawItem::new("Finished", "w1").with_due_at(&at(10)).completed())
        .with_item(RawItem::new("Second", "w1").with_due_at(&at(120)));
    let pipeline = pipeline(store);

    let overview = pipeline.build_overview(2).await;
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].list.title, "Home");
    assert!(overview[0].items.is_empty());
    assert_eq!(overview[1].list.title, "Work");
    assert_eq!(titles(&overview[1].items), vec!["First", "Second"]);
}

#[tokio::test]
async fn test_overview_respects_sample_size_and_keeps_undated() {
    let store = MemoryStore::authorized()
        .with_list(ListHandle::new("a", "alpha"))
        .with_item(RawItem::new("zeta", "a"))
        .with_item(RawItem::new("Beta", "a"))
        .with_item(RawItem::new("dated", "a").with_due_at(&at(-600)));
    let pipeline = pipeline(store);

    let overview = pipeline.build_overview(5).await;
    assert_eq!(titles(&overview[0].items), vec!["dated", "Beta", "zeta"]);

    let capped = pipeline.build_overview(1).await;
    assert!(capped.iter().all(|l| l.items.len() <= 1));

    let none = pipeline.build_overview(0).await;
    assert!(none[0].items.is_empty());
}

#[tokio::test]
async fn test_list_detail_includes_completed_items() {
    let store = MemoryStore::authorized()
        .with_list(ListHandle::new("w1", "Work"))
        .with_item(RawItem::new("Archived", "w1").completed())
        .with_item(RawItem::new("Someday", "w1"))
        .with_item(RawItem::new("Soon", "w1").with_due_at(&at(15)));
    let pipeline = pipeline(store);

    let detail = pipeline.build_list_detail("w1").await.unwrap();
    assert_eq!(detail.list.title, "Work");
    assert_eq!(titles(&detail.items), vec!["Soon", "Someday", "Archived"]);

    assert!(pipeline.build_list_detail("missing").await.is_none());
}

#[tokio::test]
async fn test_aggregate_builds_every_view() {
    let config = Config {
        upcoming_hours: 3,
        sample_size: 1,
        view_mode: ViewMode::SpecificList,
        detail_list: Some("w1".to_string()),
        ..Config::default()
    };
    let pipeline = pipeline(personal_and_work());

    let result = pipeline.aggregate(&config).await;
    assert_eq!(titles(&result.upcoming), vec!["Buy milk"]);
    let names: Vec<&str> = result.per_list.iter().map(|l| l.list.title.as_str()).collect();
    assert_eq!(names, vec!["Personal", "Work"]);
    assert_eq!(result.detail.unwrap().list.identifier, "w1");

    // Detail is only built for the single-list view.
    let timeline = Config {
        view_mode: ViewMode::UpcomingTimeline,
        ..config
    };
    assert!(pipeline.aggregate(&timeline).await.detail.is_none());
}

#[tokio::test]
async fn test_untitled_items_never_reach_the_views() {
    let store = MemoryStore::authorized()
        .with_list(ListHandle::new("p1", "Personal"))
        .with_item(RawItem {
            title: None,
            ..RawItem::new("", "p1").with_due_at(&at(20))
        })
        .with_item(RawItem::new("   ", "p1").with_due_at(&at(25)))
        .with_item(RawItem::new("Call mum", "p1").with_due_at(&at(30)));
    let pipeline = pipeline(store);

    assert_eq!(titles(&pipeline.build_upcoming(1, None).await), vec!["Call mum"]);
    let overview = pipeline.build_overview(10).await;
    assert_eq!(titles(&overview[0].items), vec!["Call mum"]);
}

#[tokio::test]
async fn test_no_state_is_kept_between_runs() {
    let store = std::sync::Arc::new(
        MemoryStore::authorized().with_list(ListHandle::new("p1", "Personal")),
    );
    let pipeline = common::pipeline_for(store.clone(), false);
    assert!(pipeline.build_upcoming(1, None).await.is_empty());

    store
        .insert_item(RawItem::new("Late addition", "p1").with_due_at(&at(5)))
        .await;
    assert_eq!(
        titles(&pipeline.build_upcoming(1, None).await),
        vec!["Late addition"]
    );

    store.set_status(AuthorizationState::Denied).await;
    assert!(pipeline.build_upcoming(1, None).await.is_empty());
}
