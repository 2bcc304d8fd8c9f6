// Converts raw store records into presentation records.
use crate::model::item::{DueComponents, ListHandle, NormalizedItem, RawItem};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;

/// Turns `RawItem`s into `NormalizedItem`s, resolving due components in a
/// fixed zone or the process-local one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    zone: Option<FixedOffset>,
}

impl Normalizer {
    pub fn local() -> Self {
        Self { zone: None }
    }

    pub fn fixed(offset: FixedOffset) -> Self {
        Self { zone: Some(offset) }
    }

    pub fn resolve_due(&self, due: &DueComponents) -> Option<DateTime<Utc>> {
        match &self.zone {
            Some(tz) => due.resolve_in(tz),
            None => due.resolve(),
        }
    }

    /// Returns `None` for items without a usable (non-blank) title.
    pub fn normalize(&self, raw: &RawItem, list_name: &str) -> Option<NormalizedItem> {
        let title = raw.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;

        Some(NormalizedItem {
            title: title.to_string(),
            due_at: raw.due.as_ref().and_then(|d| self.resolve_due(d)),
            list_name: list_name.to_string(),
            // Notes keep their layout; only an all-blank body is dropped.
            notes: raw.notes.clone().filter(|n| !n.trim().is_empty()),
            url: non_blank(raw.url.as_deref()),
            completed: raw.completed,
        })
    }

    /// Normalizes a batch. List names come from `lists`; an item whose list is
    /// not among them is labelled with its raw list identifier.
    pub fn normalize_all(&self, raws: &[RawItem], lists: &[ListHandle]) -> Vec<NormalizedItem> {
        let titles: HashMap<&str, &str> = lists
            .iter()
            .map(|l| (l.identifier.as_str(), l.title.as_str()))
            .collect();

        let mut dropped = 0usize;
        let items: Vec<NormalizedItem> = raws
            .iter()
            .filter_map(|raw| {
                let name = titles
                    .get(raw.list_id.as_str())
                    .copied()
                    .unwrap_or(raw.list_id.as_str());
                let item = self.normalize(raw, name);
                if item.is_none() {
                    dropped += 1;
                }
                item
            })
            .collect();

        if dropped > 0 {
            log::debug!("Dropped {} untitled item(s) during normalization", dropped);
        }
        items
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
