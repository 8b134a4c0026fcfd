//! Flatten, sort and filter a session into an ordered listing.
//!
//! The pipeline is a single linear pass:
//!
//! 1. every tab of every window becomes an [`Entry`],
//! 2. entries are sorted by key (ascending, or descending when reversed),
//! 3. the optional range heading is computed over date-filtered entries,
//! 4. each entry is checked against the date bounds and the URL and title
//!    patterns; survivors are emitted until the count budget runs out.
//!
//! All option validation happens in [`Converter::new`], before any input is
//! read.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use crate::error::{Result, TabdumpError};
use crate::model::{Entry, SessionRecord, SortBy};

/// Configuration for one conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Keep tabs last accessed at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Keep tabs last accessed at or before this instant.
    pub end: Option<DateTime<Utc>>,
    /// Sort descending instead of ascending.
    pub reverse: bool,
    /// Keep tabs whose URL matches this pattern.
    pub url_pattern: Option<String>,
    /// Keep tabs whose title matches this pattern.
    pub title_pattern: Option<String>,
    /// Match patterns case-insensitively.
    pub ignore_case: bool,
    /// Emit at most this many entries.
    pub max: Option<usize>,
    /// Attribute that orders the listing.
    pub sort_by: SortBy,
    /// Compute the first/last access range of date-filtered tabs.
    pub print_range: bool,
    /// Keep only the last tab (in document order) for each sort key.
    pub collapse_duplicates: bool,
}

impl ConvertOptions {
    /// Builder: lower date bound.
    #[must_use]
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder: upper date bound.
    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder: descending order.
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Builder: URL pattern.
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self
    }

    /// Builder: title pattern.
    #[must_use]
    pub fn with_title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.title_pattern = Some(pattern.into());
        self
    }

    /// Builder: maximum entries.
    #[must_use]
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Builder: sort attribute.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Builder: range heading.
    #[must_use]
    pub fn with_print_range(mut self, print_range: bool) -> Self {
        self.print_range = print_range;
        self
    }

    /// Builder: last-write-wins on duplicate sort keys.
    #[must_use]
    pub fn with_collapse_duplicates(mut self, collapse: bool) -> Self {
        self.collapse_duplicates = collapse;
        self
    }
}

/// Interpret the command-line form of the count limit.
///
/// `-1` means unlimited; `0` and anything below `-1` are rejected.
pub fn max_from_arg(max: i64) -> Result<Option<usize>> {
    match max {
        -1 => Ok(None),
        n if n >= 1 => usize::try_from(n)
            .map(Some)
            .map_err(|_| TabdumpError::invalid_argument("max", format!("{n} is too large"))),
        n => Err(TabdumpError::invalid_argument(
            "max",
            format!("maximum is nonsensical: {n} (use -1 for unlimited or a positive count)"),
        )),
    }
}

/// First and last access times among the date-filtered tabs, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRange {
    /// Earliest last-accessed value.
    pub first: i64,
    /// Latest last-accessed value.
    pub last: i64,
}

/// Counters describing what the filters removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// Tabs in the session.
    pub tabs: usize,
    /// Tabs dropped because another tab shared their sort key.
    pub collapsed: usize,
    /// Tabs outside the date bounds.
    pub outside_range: usize,
    /// Tabs whose URL did not match.
    pub url_rejected: usize,
    /// Tabs whose title did not match.
    pub title_rejected: usize,
    /// Whether the count budget stopped emission early.
    pub truncated: bool,
}

/// The ordered, filtered result of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Entries to render, in output order.
    pub entries: Vec<Entry>,
    /// Range heading, when requested and at least one tab is in range.
    pub range: Option<AccessRange>,
    /// Filter counters.
    pub stats: ListingStats,
}

impl Listing {
    /// Every tab in document order, with no filtering or sorting.
    #[must_use]
    pub fn unfiltered(record: &SessionRecord) -> Self {
        let entries: Vec<Entry> = record
            .tabs()
            .map(|(window_id, tab_id, tab)| {
                Entry::from_tab(window_id, tab_id, tab, SortBy::LastAccessed)
            })
            .collect();
        Self {
            stats: ListingStats {
                tabs: entries.len(),
                ..ListingStats::default()
            },
            entries,
            range: None,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the listing is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A validated conversion configuration with compiled patterns.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    url_regex: Option<Regex>,
    title_regex: Option<Regex>,
}

impl Converter {
    /// Validate options and compile the patterns.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        if let (Some(start), Some(end)) = (options.start, options.end) {
            if end < start {
                return Err(TabdumpError::config(format!(
                    "range is nonsensical: end {} is before start {}",
                    end.to_rfc3339(),
                    start.to_rfc3339()
                )));
            }
        }

        if options.max == Some(0) {
            return Err(TabdumpError::invalid_argument("max", "maximum is nonsensical: 0"));
        }

        let url_regex = compile("url-regex", options.url_pattern.as_deref(), options.ignore_case)?;
        let title_regex =
            compile("title-regex", options.title_pattern.as_deref(), options.ignore_case)?;

        Ok(Self {
            options,
            url_regex,
            title_regex,
        })
    }

    /// The validated options.
    #[must_use]
    pub const fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Flatten every window's tabs into entries, in document order.
    #[must_use]
    pub fn flatten(&self, record: &SessionRecord) -> Vec<Entry> {
        let sort_by = self.options.sort_by;
        let entries = record
            .tabs()
            .map(|(window_id, tab_id, tab)| Entry::from_tab(window_id, tab_id, tab, sort_by));

        if self.options.collapse_duplicates {
            let mut by_key: IndexMap<i64, Entry> = IndexMap::new();
            for entry in entries {
                by_key.insert(entry.key, entry);
            }
            by_key.into_values().collect()
        } else {
            entries.collect()
        }
    }

    /// Sort entries by key; ties break by window then tab identifier.
    pub fn sort(&self, entries: &mut [Entry]) {
        if self.options.reverse {
            entries.sort_by(|a, b| b.key.cmp(&a.key).then_with(|| a.cmp_key_then_id(b)));
        } else {
            entries.sort_by(Entry::cmp_key_then_id);
        }
    }

    /// Whether an entry falls within the (inclusive) date bounds.
    ///
    /// Comparison is at whole-second granularity.
    #[must_use]
    pub fn in_date_range(&self, entry: &Entry) -> bool {
        let secs = entry.last_accessed_secs();
        self.options.start.map_or(true, |start| secs >= start.timestamp())
            && self.options.end.map_or(true, |end| secs <= end.timestamp())
    }

    /// First and last access among the date-filtered entries.
    #[must_use]
    pub fn access_range<'a>(&self, entries: impl IntoIterator<Item = &'a Entry>) -> Option<AccessRange> {
        entries
            .into_iter()
            .filter(|e| self.in_date_range(e))
            .fold(None, |range, e| {
                Some(match range {
                    None => AccessRange {
                        first: e.last_accessed,
                        last: e.last_accessed,
                    },
                    Some(r) => AccessRange {
                        first: r.first.min(e.last_accessed),
                        last: r.last.max(e.last_accessed),
                    },
                })
            })
    }

    /// Run the full pipeline over a session record.
    pub fn convert(&self, record: &SessionRecord) -> Listing {
        let mut stats = ListingStats {
            tabs: record.tab_count(),
            ..ListingStats::default()
        };

        let mut entries = self.flatten(record);
        stats.collapsed = stats.tabs - entries.len();
        self.sort(&mut entries);
        debug!(entries = entries.len(), collapsed = stats.collapsed, "flattened and sorted");

        let range = if self.options.print_range {
            self.access_range(&entries)
        } else {
            None
        };

        let mut remaining = self.options.max;
        let mut emitted = Vec::with_capacity(remaining.unwrap_or(entries.len()).min(entries.len()));

        for entry in entries {
            if !self.in_date_range(&entry) {
                stats.outside_range += 1;
                continue;
            }
            if let Some(re) = &self.url_regex {
                if !re.is_match(&entry.url) {
                    stats.url_rejected += 1;
                    continue;
                }
            }
            if let Some(re) = &self.title_regex {
                if !re.is_match(&entry.title) {
                    stats.title_rejected += 1;
                    continue;
                }
            }

            if let Some(n) = remaining.as_mut() {
                if *n == 0 {
                    stats.truncated = true;
                    break;
                }
                *n -= 1;
            }
            emitted.push(entry);
        }

        info!(
            tabs = stats.tabs,
            emitted = emitted.len(),
            outside_range = stats.outside_range,
            url_rejected = stats.url_rejected,
            title_rejected = stats.title_rejected,
            truncated = stats.truncated,
            "conversion complete"
        );

        Listing {
            entries: emitted,
            range,
            stats,
        }
    }
}

fn compile(name: &str, pattern: Option<&str>, ignore_case: bool) -> Result<Option<Regex>> {
    match pattern {
        None | Some("") => Ok(None),
        Some(pattern) => RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map(Some)
            .map_err(|e| TabdumpError::invalid_argument(name, e.to_string())),
    }
}
