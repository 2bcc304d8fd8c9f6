// File: ./src/resolver.rs
//! Maps a configured list name onto concrete list identifiers.
//!
//! Matching is by display title, which is not unique: two lists called
//! "Work" both match. This is kept for compatibility with configurations
//! that store titles rather than identifiers.
use crate::model::ListHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSelection {
    /// No filter; every list.
    All,
    /// Exactly these lists. May be empty, meaning "nothing matched".
    Lists(Vec<ListHandle>),
}

impl ListSelection {
    /// `None` for all lists, otherwise the identifiers to query.
    pub fn identifiers(&self) -> Option<Vec<String>> {
        match self {
            Self::All => None,
            Self::Lists(lists) => Some(lists.iter().map(|l| l.identifier.clone()).collect()),
        }
    }

    /// True when the selection can never yield items.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Lists(lists) if lists.is_empty())
    }
}

/// A missing or blank name selects all lists. A name with no
/// case-insensitive title match selects nothing, never everything.
pub fn resolve(name: Option<&str>, known: &[ListHandle]) -> ListSelection {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return ListSelection::All;
    };
    let wanted = name.to_lowercase();
    let matches: Vec<ListHandle> = known
        .iter()
        .filter(|l| l.title.to_lowercase() == wanted)
        .cloned()
        .collect();

    if matches.is_empty() {
        log::debug!("No list titled '{}'", name);
    } else if matches.len() > 1 {
        log::debug!("{} lists share the title '{}'", matches.len(), name);
    }
    ListSelection::Lists(matches)
}
