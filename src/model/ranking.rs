// --- SORTING ---
use crate::model::item::{CalendarEvent, ListOverview, NormalizedItem};
use std::cmp::Ordering;

/// Ordering used everywhere items are listed:
/// open before done, dated before undated, earlier due first,
/// and undated items by case-insensitive title.
pub fn compare(a: &NormalizedItem, b: &NormalizedItem) -> Ordering {
    if a.completed != b.completed {
        return a.completed.cmp(&b.completed);
    }
    match (a.due_at, b.due_at) {
        (Some(d1), Some(d2)) => d1.cmp(&d2),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => fold(&a.title).cmp(&fold(&b.title)),
    }
}

/// Stable sort; items equal under `compare` keep their input order.
pub fn rank(items: &mut [NormalizedItem]) {
    items.sort_by(compare);
}

pub fn ranked(mut items: Vec<NormalizedItem>) -> Vec<NormalizedItem> {
    rank(&mut items);
    items
}

/// Outer ordering of the overview: list title, case-insensitive ascending.
pub fn rank_lists(lists: &mut [ListOverview]) {
    lists.sort_by(|a, b| fold(&a.list.title).cmp(&fold(&b.list.title)));
}

pub fn rank_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| fold(&a.title).cmp(&fold(&b.title)))
    });
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}
