//! Integration tests for tabdump.
//!
//! These tests run the full decode, convert and export pipeline over a
//! fixture session with two windows of three tabs each.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tabdump::convert::{ConvertOptions, Converter, Listing};
use tabdump::export::{export_to_file, ExportFormat, ExportOptions};
use tabdump::model::{SessionDump, SortBy};
use tabdump::parser::SessionParser;

/// Get the path to a fixture file.
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Parse a fixture file.
fn parse_fixture(name: &str) -> SessionDump {
    SessionParser::new()
        .parse_file(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

/// Convert the two-window fixture with the given options.
fn convert(options: ConvertOptions) -> Listing {
    let dump = parse_fixture("two_windows.json");
    Converter::new(options)
        .unwrap()
        .convert(dump.primary().unwrap())
}

fn titles(listing: &Listing) -> Vec<&str> {
    listing.entries.iter().map(|e| e.title.as_str()).collect()
}

fn instant(s: &str) -> DateTime<Utc> {
    tabdump::datetime::parse_instant(s).unwrap()
}

fn utc_options() -> ExportOptions {
    ExportOptions::default().with_utc(true).with_time_format("%F %T")
}

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_fixture() {
        let dump = parse_fixture("two_windows.json");
        let record = dump.primary().unwrap();

        assert_eq!(dump.len(), 1);
        assert_eq!(record.windows.len(), 2);
        assert_eq!(record.tab_count(), 6);
        assert_eq!(record.name, "Autosave");
        assert_eq!(record.windows_info["1"].kind, "normal");
    }

    #[test]
    fn test_document_order_preserved() {
        let dump = parse_fixture("two_windows.json");
        let ids: Vec<_> = dump
            .primary()
            .unwrap()
            .tabs()
            .map(|(window, tab, _)| format!("{window}/{tab}"))
            .collect();
        assert_eq!(ids, ["1/1", "1/2", "1/3", "2/4", "2/5", "2/6"]);
    }

    #[test]
    fn test_tab_fields() {
        let dump = parse_fixture("two_windows.json");
        let record = dump.primary().unwrap();
        let tab = &record.windows["1"].tabs["1"];

        assert!(tab.pinned);
        assert_eq!(tab.cookie_store_id, "firefox-default");
        assert_eq!(tab.successor_tab_id, -1);

        // null favicon decodes as empty
        assert_eq!(record.windows["1"].tabs["2"].fav_icon_url, "");
    }
}

mod conversion {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_six_entries_ascending() {
        let listing = convert(ConvertOptions::default());

        assert_eq!(
            titles(&listing),
            [
                "Example <Domain> & \"Friends\"",
                "Docs.rs",
                "crates.io: Rust Package Registry",
                "Rust Blog",
                "GitHub - rust-lang/rust",
                "Hacker News",
            ]
        );
        assert!(listing
            .entries
            .windows(2)
            .all(|w| w[0].last_accessed < w[1].last_accessed));
        assert!(listing.range.is_none());
        assert!(!listing.stats.truncated);
    }

    #[test]
    fn test_reverse_is_non_increasing() {
        let listing = convert(ConvertOptions::default().with_reverse(true));

        assert_eq!(listing.len(), 6);
        assert_eq!(listing.entries[0].title, "Hacker News");
        assert!(listing.entries.windows(2).all(|w| w[0].key >= w[1].key));
    }

    #[test]
    fn test_max_three_of_six() {
        let listing = convert(ConvertOptions::default().with_max(3));

        assert_eq!(
            titles(&listing),
            ["Example <Domain> & \"Friends\"", "Docs.rs", "crates.io: Rust Package Registry"]
        );
        assert!(listing.stats.truncated);
    }

    #[test]
    fn test_title_filter_does_not_consume_budget() {
        let mut options = ConvertOptions::default()
            .with_title_pattern("rust")
            .with_max(2);
        options.ignore_case = true;
        let listing = convert(options);

        // Example and Docs.rs come first but fail the title filter.
        assert_eq!(titles(&listing), ["crates.io: Rust Package Registry", "Rust Blog"]);
        assert_eq!(listing.stats.title_rejected, 2);
        assert!(listing.stats.truncated);
    }

    #[test]
    fn test_url_filter() {
        let listing = convert(ConvertOptions::default().with_url_pattern(r"^https://[a-z]+\.rs/"));
        assert_eq!(titles(&listing), ["Docs.rs"]);
        assert_eq!(listing.stats.url_rejected, 5);
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let listing = convert(
            ConvertOptions::default()
                .with_start(instant("2017-11-01T00:00:03Z"))
                .with_end(instant("2017-11-01T23:59:59Z"))
                .with_print_range(true),
        );

        assert_eq!(
            titles(&listing),
            ["crates.io: Rust Package Registry", "Rust Blog", "GitHub - rust-lang/rust"]
        );
        assert_eq!(listing.stats.outside_range, 3);

        let range = listing.range.unwrap();
        assert_eq!(range.first, 1_509_494_403_000);
        assert_eq!(range.last, 1_509_494_406_000);
    }

    #[test]
    fn test_range_omitted_when_nothing_in_range() {
        let listing = convert(
            ConvertOptions::default()
                .with_start(instant("2020-01-01T00:00:00Z"))
                .with_print_range(true),
        );
        assert!(listing.is_empty());
        assert!(listing.range.is_none());
    }

    #[test]
    fn test_by_index_keeps_colliding_tabs() {
        let listing = convert(ConvertOptions::default().with_sort_by(SortBy::Index));

        let ids: Vec<_> = listing
            .entries
            .iter()
            .map(|e| (e.index, e.tab_id.as_str()))
            .collect();
        assert_eq!(ids, [(0, "1"), (0, "4"), (1, "2"), (1, "5"), (2, "3"), (2, "6")]);
    }

    #[test]
    fn test_by_index_collapse_keeps_last_written() {
        let listing = convert(
            ConvertOptions::default()
                .with_sort_by(SortBy::Index)
                .with_collapse_duplicates(true),
        );

        assert_eq!(titles(&listing), ["Docs.rs", "GitHub - rust-lang/rust", "Hacker News"]);
        assert_eq!(listing.stats.collapsed, 3);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = Converter::new(
            ConvertOptions::default()
                .with_start(instant("2017-11-02T00:00:00Z"))
                .with_end(instant("2017-11-01T00:00:00Z")),
        );
        assert!(result.is_err());
    }
}

mod export {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_html_escapes_title_not_url() {
        let json = std::fs::read_to_string(fixture_path("two_windows.json")).unwrap();
        let converter = Converter::new(ConvertOptions::default().with_max(1)).unwrap();
        let html = tabdump::render_str(&json, &converter, ExportFormat::Html, &utc_options())
            .unwrap();

        assert!(html.contains(
            "<li>2017-11-01 00:00:01 <a href=\"https://example.com/?a=1&b=2\">Example &lt;Domain&gt; &amp; &quot;Friends&quot;</a></li>"
        ));
        assert_eq!(html.matches("<li>").count(), 1);
    }

    #[test]
    fn test_text_listing() {
        let json = std::fs::read_to_string(fixture_path("two_windows.json")).unwrap();
        let converter = Converter::new(
            ConvertOptions::default()
                .with_reverse(true)
                .with_max(2),
        )
        .unwrap();
        let text = tabdump::render_str(&json, &converter, ExportFormat::Text, &utc_options())
            .unwrap();

        assert_eq!(
            text,
            "2017-11-02 12:00:00\thttps://news.ycombinator.com/\tHacker News\n\
             2017-11-01 00:00:06\thttps://github.com/rust-lang/rust\tGitHub - rust-lang/rust\n"
        );
    }

    #[test]
    fn test_dump_ignores_converter() {
        let json = std::fs::read_to_string(fixture_path("two_windows.json")).unwrap();
        let converter = Converter::new(ConvertOptions::default().with_max(1)).unwrap();
        let dump = tabdump::render_str(&json, &converter, ExportFormat::Dump, &utc_options())
            .unwrap();

        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "1\t1\t1509494405000\thttps://blog.rust-lang.org/\tRust Blog");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tabs.html");
        let listing = convert(ConvertOptions::default());

        export_to_file(&listing, &path, ExportFormat::Html, &utc_options().with_title("Tabs"))
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Tabs</title>"));
        assert_eq!(html.matches("<li>").count(), 6);
    }
}
