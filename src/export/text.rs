//! Plain text export for listings.
//!
//! One tab-separated line per entry: timestamp, URL, title. The optional
//! range heading becomes a leading `#` comment line.

use std::io::Write;

use crate::convert::Listing;
use crate::datetime::RANGE_TIME_FORMAT;
use crate::error::Result;

use super::{sanitize_field, ExportOptions, Exporter};

/// Plain text exporter for listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl TextExporter {
    /// Create a new text exporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Exporter for TextExporter {
    fn export_listing<W: Write>(
        &self,
        listing: &Listing,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        if let Some(range) = &listing.range {
            writeln!(
                writer,
                "# {} - {}",
                options.zone.format_millis(range.first, RANGE_TIME_FORMAT),
                options.zone.format_millis(range.last, RANGE_TIME_FORMAT)
            )?;
        }

        for entry in &listing.entries {
            writeln!(
                writer,
                "{}\t{}\t{}",
                sanitize_field(&options.format_entry_time(entry.last_accessed)),
                sanitize_field(&entry.url),
                sanitize_field(&entry.title)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::AccessRange;
    use crate::model::{Entry, SortBy, Tab};

    fn listing() -> Listing {
        let tab = Tab {
            last_accessed: 1_509_494_400_000,
            url: "https://example.org/".to_string(),
            title: "Two\tcolumns\nhere".to_string(),
            ..Tab::default()
        };
        Listing {
            entries: vec![Entry::from_tab("1", "2", &tab, SortBy::LastAccessed)],
            ..Listing::default()
        }
    }

    fn render(exporter: &TextExporter, listing: &Listing) -> String {
        let options = ExportOptions::default().with_utc(true).with_time_format("%F %T");
        let mut buffer = Vec::new();
        exporter.export_listing(listing, &mut buffer, &options).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_text_lines() {
        assert_eq!(
            render(&TextExporter::new(), &listing()),
            "2017-11-01 00:00:00\thttps://example.org/\tTwo columns here\n"
        );
    }

    #[test]
    fn test_text_range_line() {
        let mut listing = listing();
        listing.range = Some(AccessRange {
            first: 1_509_494_400_000,
            last: 1_509_494_400_000,
        });
        let text = render(&TextExporter::new(), &listing);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# 2017-11-01 00:00:00 +0000 - 2017-11-01 00:00:00 +0000");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_listing_is_empty_output() {
        assert_eq!(render(&TextExporter::new(), &Listing::default()), "");
    }
}
