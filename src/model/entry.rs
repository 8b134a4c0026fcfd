//! Flattened listing entries derived from session tabs.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::Tab;

/// Which tab attribute orders the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Last access time, in milliseconds.
    #[default]
    LastAccessed,
    /// Position of the tab within its window.
    Index,
}

impl SortBy {
    /// Compute the sort key for a tab.
    #[must_use]
    pub const fn key_of(self, tab: &Tab) -> i64 {
        match self {
            Self::LastAccessed => tab.last_accessed,
            Self::Index => tab.index,
        }
    }
}

/// One tab flattened out of its window, ready for filtering and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Sort key (index or last-accessed milliseconds).
    pub key: i64,
    /// Identifier of the owning window.
    pub window_id: String,
    /// Identifier of the tab within the dump.
    pub tab_id: String,
    /// Last access time in milliseconds since the Unix epoch.
    pub last_accessed: i64,
    /// Position within its window.
    pub index: i64,
    /// Page URL, used verbatim as a link target.
    pub url: String,
    /// Page title.
    pub title: String,
}

impl Entry {
    /// Flatten a tab into an entry keyed by `sort_by`.
    #[must_use]
    pub fn from_tab(window_id: &str, tab_id: &str, tab: &Tab, sort_by: SortBy) -> Self {
        Self {
            key: sort_by.key_of(tab),
            window_id: window_id.to_string(),
            tab_id: tab_id.to_string(),
            last_accessed: tab.last_accessed,
            index: tab.index,
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }

    /// Last access time truncated to whole seconds.
    #[must_use]
    pub const fn last_accessed_secs(&self) -> i64 {
        self.last_accessed.div_euclid(1000)
    }

    /// Last access time as a UTC instant, at whole-second precision.
    #[must_use]
    pub fn last_accessed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_accessed_secs(), 0)
    }

    /// Order by sort key, then by window and tab identifier.
    ///
    /// Identifiers compare numerically when both parse as integers so that
    /// tab "9" sorts before tab "10".
    #[must_use]
    pub fn cmp_key_then_id(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| cmp_ids(&self.window_id, &other.window_id))
            .then_with(|| cmp_ids(&self.tab_id, &other.tab_id))
    }
}

fn cmp_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
