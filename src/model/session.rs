//! Session document types: records, windows, tabs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient, lenient_string, null_as_default, UnknownFields};
use crate::error::{Result, TabdumpError};

/// The top-level session dump: a sequence of session records.
///
/// Only the first record is converted; later records are kept for
/// inspection but never flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionDump {
    /// Session records in document order.
    pub records: Vec<SessionRecord>,
}

impl SessionDump {
    /// The record the converter operates on.
    pub fn primary(&self) -> Result<&SessionRecord> {
        self.records
            .first()
            .ok_or_else(|| TabdumpError::decode("session dump is an empty array"))
    }

    /// Number of records in the dump.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dump has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One saved session: its windows plus bookkeeping metadata.
///
/// Only `windows` is required. Metadata fields of an unexpected JSON type
/// decode as their default instead of failing the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Windows keyed by window identifier, in document order.
    pub windows: IndexMap<String, Window>,
    /// Window count as recorded by the writer.
    #[serde(default, deserialize_with = "lenient")]
    pub windows_number: Option<u64>,
    /// Per-window geometry and state.
    #[serde(default, deserialize_with = "lenient")]
    pub windows_info: IndexMap<String, WindowInfo>,
    /// Tab count as recorded by the writer.
    #[serde(default, deserialize_with = "lenient")]
    pub tabs_number: Option<u64>,
    /// User-visible session name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Save date (ms since epoch).
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<i64>,
    /// Last edit time (ms since epoch).
    #[serde(default, deserialize_with = "lenient")]
    pub last_edited_time: Option<i64>,
    /// Free-form tags.
    #[serde(default, deserialize_with = "lenient")]
    pub tag: Vec<Value>,
    /// Browser session start (ms since epoch).
    #[serde(default, deserialize_with = "lenient")]
    pub session_start_time: Option<i64>,
    /// Session identifier, numeric identifiers kept in decimal.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

impl SessionRecord {
    /// Total number of tabs across all windows.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.windows.values().map(|w| w.tabs.len()).sum()
    }

    /// Iterate over every tab as `(window id, tab id, tab)` in document order.
    pub fn tabs(&self) -> impl Iterator<Item = (&str, &str, &Tab)> {
        self.windows.iter().flat_map(|(window_id, window)| {
            window
                .tabs
                .iter()
                .map(move |(tab_id, tab)| (window_id.as_str(), tab_id.as_str(), tab))
        })
    }
}

/// A browser window: tabs keyed by tab identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Window {
    /// Tabs in document order.
    pub tabs: IndexMap<String, Tab>,
}

/// A single browser tab record.
///
/// `lastAccessed`, `index`, `url` and `title` drive the conversion and are
/// strictly typed; everything else is carried through leniently.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tab {
    #[serde(deserialize_with = "lenient")]
    pub id: i64,
    /// Position within its window.
    pub index: i64,
    #[serde(deserialize_with = "lenient")]
    pub window_id: i64,
    #[serde(deserialize_with = "lenient")]
    pub highlighted: bool,
    #[serde(deserialize_with = "lenient")]
    pub active: bool,
    #[serde(deserialize_with = "lenient")]
    pub attention: bool,
    #[serde(deserialize_with = "lenient")]
    pub pinned: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient")]
    pub hidden: bool,
    #[serde(deserialize_with = "lenient")]
    pub discarded: bool,
    #[serde(deserialize_with = "lenient")]
    pub incognito: bool,
    #[serde(deserialize_with = "lenient")]
    pub width: i64,
    #[serde(deserialize_with = "lenient")]
    pub height: i64,
    /// Last access time in milliseconds since the Unix epoch.
    pub last_accessed: i64,
    #[serde(deserialize_with = "lenient")]
    pub audible: bool,
    #[serde(deserialize_with = "lenient")]
    pub muted_info: MutedInfo,
    #[serde(deserialize_with = "lenient")]
    pub is_article: bool,
    #[serde(deserialize_with = "lenient")]
    pub is_in_reader_mode: bool,
    #[serde(deserialize_with = "lenient")]
    pub sharing_state: SharingState,
    #[serde(deserialize_with = "lenient")]
    pub successor_tab_id: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub cookie_store_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fav_icon_url: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// Audio mute state of a tab.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutedInfo {
    #[serde(deserialize_with = "lenient")]
    pub muted: bool,
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// Device sharing state of a tab.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingState {
    #[serde(deserialize_with = "lenient")]
    pub camera: bool,
    #[serde(deserialize_with = "lenient")]
    pub microphone: bool,
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// Window geometry and state recorded alongside the tabs.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowInfo {
    #[serde(deserialize_with = "lenient")]
    pub id: i64,
    #[serde(deserialize_with = "lenient")]
    pub focused: bool,
    #[serde(deserialize_with = "lenient")]
    pub top: i64,
    #[serde(deserialize_with = "lenient")]
    pub left: i64,
    #[serde(deserialize_with = "lenient")]
    pub width: i64,
    #[serde(deserialize_with = "lenient")]
    pub height: i64,
    #[serde(deserialize_with = "lenient")]
    pub incognito: bool,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient")]
    pub always_on_top: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(flatten)]
    pub extra: UnknownFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {
        "windows": {
          "7": {
            "12": {"id": 12, "index": 0, "windowId": 7, "lastAccessed": 1509550000000,
                   "url": "https://example.org/", "title": "Example", "pinned": true,
                   "mutedInfo": {"muted": false, "reason": "user"}, "openerTabId": 3},
            "13": {"id": 13, "index": 1, "windowId": 7, "lastAccessed": 1509550100000,
                   "url": "about:blank", "title": null}
          }
        },
        "windowsNumber": 1,
        "windowsInfo": {"7": {"id": 7, "focused": true, "type": "normal", "state": "maximized"}},
        "tabsNumber": 2,
        "name": "Morning",
        "date": 1509551000000,
        "tag": ["work"],
        "id": "abc"
      }
    ]"#;

    #[test]
    fn test_decode_sample_session() {
        let dump: SessionDump = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(dump.len(), 1);

        let record = dump.primary().unwrap();
        assert_eq!(record.name, "Morning");
        assert_eq!(record.tabs_number, Some(2));
        assert_eq!(record.tab_count(), 2);
        assert_eq!(record.windows_info["7"].kind, "normal");

        let tab = &record.windows["7"].tabs["12"];
        assert_eq!(tab.last_accessed, 1509550000000);
        assert!(tab.pinned);
        assert_eq!(tab.extra.get("openerTabId"), Some(&Value::from(3)));
        assert_eq!(tab.muted_info.extra.get("reason"), Some(&Value::from("user")));
    }

    #[test]
    fn test_null_title_becomes_empty() {
        let dump: SessionDump = serde_json::from_str(SAMPLE).unwrap();
        let tab = &dump.records[0].windows["7"].tabs["13"];
        assert_eq!(tab.title, "");
    }

    #[test]
    fn test_tabs_iterates_in_document_order() {
        let dump: SessionDump = serde_json::from_str(SAMPLE).unwrap();
        let ids: Vec<_> = dump.records[0]
            .tabs()
            .map(|(w, t, _)| format!("{w}/{t}"))
            .collect();
        assert_eq!(ids, vec!["7/12", "7/13"]);
    }

    #[test]
    fn test_empty_array_has_no_primary() {
        let dump: SessionDump = serde_json::from_str("[]").unwrap();
        assert!(dump.is_empty());
        assert!(dump.primary().is_err());
    }

    #[test]
    fn test_missing_windows_is_rejected() {
        let result: std::result::Result<SessionDump, _> =
            serde_json::from_str(r#"[{"name": "no windows"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_object_instead_of_array_is_rejected() {
        let result: std::result::Result<SessionDump, _> =
            serde_json::from_str(r#"{"windows": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mistyped_metadata_does_not_abort_decode() {
        let dump: SessionDump = serde_json::from_str(
            r#"[{
                "windows": {"1": {"2": {"lastAccessed": 1000, "url": "u", "title": "t",
                                        "status": 5, "id": "two", "mutedInfo": true}}},
                "windowsInfo": {"1": {"type": 0, "focused": "yes"}},
                "tabsNumber": "one",
                "id": 1509624060000
            }]"#,
        )
        .unwrap();

        let record = dump.primary().unwrap();
        assert_eq!(record.id, "1509624060000");
        assert_eq!(record.tabs_number, None);
        assert_eq!(record.windows_info["1"].kind, "0");
        assert!(!record.windows_info["1"].focused);

        let tab = &record.windows["1"].tabs["2"];
        assert_eq!(tab.status, "5");
        assert_eq!(tab.id, 0);
        assert!(!tab.muted_info.muted);
        assert_eq!(tab.last_accessed, 1000);
    }

    #[test]
    fn test_mistyped_conversion_fields_are_rejected() {
        let result: std::result::Result<SessionDump, _> = serde_json::from_str(
            r#"[{"windows": {"1": {"2": {"lastAccessed": "yesterday"}}}}]"#,
        );
        assert!(result.is_err());
    }
}
