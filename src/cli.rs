// File: ./src/cli.rs
//! Shared command-line logic: argument parsing, help and plain-text output.
use crate::entry::{RenderEntry, ViewMode};
use crate::model::display::{ItemDisplay, fit_width, format_event_span};
use crate::model::{CalendarEvent, ListHandle, ListOverview, NormalizedItem};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::str::FromStr;

const TITLE_COLUMNS: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upcoming {
        hours: Option<u32>,
        list: Option<String>,
    },
    Overview {
        sample: Option<usize>,
    },
    List {
        id: String,
    },
    Next {
        list: Option<String>,
    },
    Events {
        hours: Option<u32>,
    },
    Lists,
    Tags,
    Entry {
        mode: Option<ViewMode>,
        json: bool,
    },
    Add {
        title: String,
        due: Option<DateTime<Utc>>,
        list: Option<String>,
        notes: Option<String>,
    },
    Grant,
    Watch,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| anyhow!("Missing value for {}", flag))
}

fn take_number<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T> {
    let raw = take_value(args, i, flag)?;
    raw.parse::<T>()
        .map_err(|_| anyhow!("Invalid number for {}: {}", flag, raw))
}

/// Accepts `YYYY-MM-DD` (local midnight) or `YYYY-MM-DDTHH:MM` / `YYYY-MM-DD HH:MM` (local).
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let naive = if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        date.and_time(chrono::NaiveTime::MIN)
    } else {
        NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
            .with_context(|| format!("Unrecognized date: {}", input))?
    };
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("{} does not exist in the local time zone", input))
}

/// Parses `args` without the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut root = None;
    let mut verbose = false;
    let mut i = 0;

    // Global options come before the command.
    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--root" => root = Some(PathBuf::from(take_value(args, &mut i, "--root")?)),
            "-v" | "--verbose" => verbose = true,
            _ => break,
        }
        i += 1;
    }

    let Some(name) = args.get(i).cloned() else {
        return Ok(Invocation {
            root,
            verbose,
            command: Command::Entry {
                mode: None,
                json: false,
            },
        });
    };
    i += 1;

    let mut hours = None;
    let mut list = None;
    let mut sample = None;
    let mut mode = None;
    let mut json = false;
    let mut due = None;
    let mut notes = None;
    let mut positional: Vec<String> = Vec::new();

    while i < args.len() {
        match args[i].as_str() {
            "--hours" => hours = Some(take_number(args, &mut i, "--hours")?),
            "--list" => list = Some(take_value(args, &mut i, "--list")?),
            "--sample" => sample = Some(take_number(args, &mut i, "--sample")?),
            "--mode" => {
                let raw = take_value(args, &mut i, "--mode")?;
                mode = Some(
                    ViewMode::from_str(&raw).map_err(|_| anyhow!("Unknown view mode: {}", raw))?,
                );
            }
            "--json" => json = true,
            "--due" => due = Some(parse_due(&take_value(args, &mut i, "--due")?)?),
            "--notes" => notes = Some(take_value(args, &mut i, "--notes")?),
            other if other.starts_with("--") => bail!("Unknown option: {}", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match name.as_str() {
        "-h" | "--help" | "help" => Command::Help,
        "upcoming" => Command::Upcoming { hours, list },
        "overview" => Command::Overview { sample },
        "list" => Command::List {
            id: positional
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("Usage: nextup list <ID>"))?,
        },
        "next" => Command::Next { list },
        "events" => Command::Events { hours },
        "lists" => Command::Lists,
        "tags" => Command::Tags,
        "entry" => Command::Entry { mode, json },
        "add" => {
            if positional.is_empty() {
                bail!("Usage: nextup add <TITLE> [--due DATE] [--list ID] [--notes TEXT]");
            }
            Command::Add {
                title: positional.join(" "),
                due,
                list,
                notes,
            }
        }
        "grant" => Command::Grant,
        "watch" => Command::Watch,
        other => bail!("Unknown command: {} (see --help)", other),
    };

    Ok(Invocation {
        root,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Nextup v{} - upcoming reminders and events at a glance",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] [--verbose] <command>", binary_name);
    println!();
    println!("COMMANDS:");
    println!("    entry [--mode MODE] [--json]     Build the widget entry (default command)");
    println!("    upcoming [--hours N] [--list NAME]");
    println!("                                     Incomplete reminders due soon");
    println!("    overview [--sample N]            Every list with its next reminders");
    println!("    list <ID>                        All reminders of one list");
    println!("    next [--list NAME]               The next reminder");
    println!("    events [--hours N]               Calendar events coming up");
    println!("    lists                            Reminder lists");
    println!("    tags                             #tags used in reminder notes");
    println!("    add <TITLE> [--due DATE] [--list ID] [--notes TEXT]");
    println!("                                     Create a reminder");
    println!("    grant                            Answer the access prompt");
    println!("    watch                            Rebuild the entry on every refresh");
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Debug logging (or set NEXTUP_LOG=debug).");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("VIEW MODES:");
    println!("    upcoming-timeline, specific-list, all-lists-overview, simple");
    println!();
    println!("DATES:");
    println!("    2026-10-18            Local midnight");
    println!("    2026-10-18T14:30      Local time");
}

// --- Plain-text rendering ---

pub fn render_item(item: &NormalizedItem, now: DateTime<Utc>, show_url: bool) -> String {
    let mut line = format!(
        "{} {} {:>10}  {}",
        item.checkbox_symbol(),
        fit_width(&item.title, TITLE_COLUMNS),
        item.format_due(now),
        item.list_name
    );
    if show_url && let Some(url) = item.url_preview() {
        line.push_str(&format!("  <{}>", url));
    }
    line
}

pub fn render_items(items: &[NormalizedItem], now: DateTime<Utc>, show_url: bool) -> String {
    if items.is_empty() {
        return "  (nothing)".to_string();
    }
    items
        .iter()
        .map(|i| format!("  {}", render_item(i, now, show_url)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_overview(lists: &[ListOverview], now: DateTime<Utc>, show_url: bool) -> String {
    if lists.is_empty() {
        return "  (no lists)".to_string();
    }
    lists
        .iter()
        .map(|o| {
            format!(
                "{} ({})\n{}",
                o.list.title,
                o.list.identifier,
                render_items(&o.items, now, show_url)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_lists(lists: &[ListHandle]) -> String {
    lists
        .iter()
        .map(|l| format!("{}  {}", fit_width(&l.title, TITLE_COLUMNS), l.identifier))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "  (no events)".to_string();
    }
    events
        .iter()
        .map(|e| {
            format!(
                "  {}  {}",
                fit_width(&e.title, TITLE_COLUMNS),
                format_event_span(e)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_entry(entry: &RenderEntry) -> String {
    let now = entry.date;
    let mut out = String::new();
    out.push_str(&format!("[{}] {}", entry.mode, entry.title));
    if let Some(due) = entry.due_time {
        out.push_str(&format!(" ({})", crate::model::display::format_relative(due, now)));
    }
    out.push('\n');
    if let Some(list) = &entry.selected_list {
        out.push_str(&format!("List: {}\n", list));
    }
    if !entry.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", entry.tags.join(", ")));
    }

    match entry.mode {
        ViewMode::UpcomingTimeline => {
            out.push_str(&render_items(&entry.upcoming, now, entry.show_url));
            if entry.show_summary {
                out.push_str(&format!("\n{} upcoming", entry.upcoming.len()));
            }
        }
        ViewMode::AllListsOverview => {
            out.push_str(&render_overview(&entry.lists, now, entry.show_url));
        }
        ViewMode::SpecificList => match &entry.detail {
            Some(detail) => out.push_str(&render_overview(
                std::slice::from_ref(detail),
                now,
                entry.show_url,
            )),
            None => out.push_str("  (no list selected)"),
        },
        ViewMode::Simple => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_command_is_entry() {
        let inv = parse_args(&args(&["--root", "/tmp/x"])).unwrap();
        assert_eq!(inv.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            inv.command,
            Command::Entry {
                mode: None,
                json: false
            }
        );
    }

    #[test]
    fn test_parse_upcoming_flags() {
        let inv = parse_args(&args(&["-v", "upcoming", "--hours", "3", "--list", "Work"])).unwrap();
        assert!(inv.verbose);
        assert_eq!(
            inv.command,
            Command::Upcoming {
                hours: Some(3),
                list: Some("Work".to_string())
            }
        );
    }

    #[test]
    fn test_parse_add_joins_title_words() {
        let inv = parse_args(&args(&["add", "Buy", "milk", "--list", "home"])).unwrap();
        match inv.command {
            Command::Add { title, list, due, .. } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(list.as_deref(), Some("home"));
                assert!(due.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_mode() {
        let inv = parse_args(&args(&["entry", "--mode", "all-lists-overview", "--json"])).unwrap();
        assert_eq!(
            inv.command,
            Command::Entry {
                mode: Some(ViewMode::AllListsOverview),
                json: true
            }
        );
        assert!(parse_args(&args(&["entry", "--mode", "fancy"])).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_args(&args(&["upcoming", "--hours", "soon"])).is_err());
        assert!(parse_args(&args(&["add"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["lists", "--bogus"])).is_err());
    }

    #[test]
    fn test_parse_due_formats() {
        assert!(parse_due("2026-10-18").is_ok());
        assert!(parse_due("2026-10-18T14:30").is_ok());
        assert!(parse_due("2026-10-18 14:30").is_ok());
        assert!(parse_due("tomorrow").is_err());
    }
}
