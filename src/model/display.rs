// File: ./src/model/display.rs
use crate::model::item::{CalendarEvent, NormalizedItem};
use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const URL_PREVIEW_CHARS: usize = 30;

pub trait ItemDisplay {
    fn checkbox_symbol(&self) -> &'static str;
    fn format_due(&self, now: DateTime<Utc>) -> String;
    fn url_preview(&self) -> Option<String>;
}

impl ItemDisplay for NormalizedItem {
    fn checkbox_symbol(&self) -> &'static str {
        if self.completed { "[✔]" } else { "[ ]" }
    }

    fn format_due(&self, now: DateTime<Utc>) -> String {
        match self.due_at {
            Some(due) => format_relative(due, now),
            None => String::new(),
        }
    }

    fn url_preview(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        if url.chars().count() > URL_PREVIEW_CHARS {
            let head: String = url.chars().take(URL_PREVIEW_CHARS).collect();
            Some(format!("{}...", head))
        } else {
            Some(url.to_string())
        }
    }
}

/// "in 30m", "in 5h", "3d ago", or a local date for anything further out.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at - now;
    let mins = delta.num_minutes();
    if mins.abs() >= 7 * 1440 {
        return at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    let span = if mins.abs() >= 1440 {
        format!("{}d", mins.abs() / 1440)
    } else if mins.abs() >= 60 {
        format!("{}h", mins.abs() / 60)
    } else {
        format!("{}m", mins.abs())
    };
    if mins >= 0 {
        format!("in {}", span)
    } else {
        format!("{} ago", span)
    }
}

pub fn format_event_span(event: &CalendarEvent) -> String {
    let start = event.start.with_timezone(&Local);
    let end = event.end.with_timezone(&Local);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
    } else {
        format!(
            "{} - {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Pads or truncates `text` to exactly `width` terminal columns.
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{}{}", text, " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
