//! Diagnostic dump of every tab.
//!
//! Writes `window, tab, last accessed (raw ms), url, title` per line with
//! no formatting applied. Pair it with [`Listing::unfiltered`] to see the
//! document exactly as decoded.

use std::io::Write;

use crate::convert::Listing;
use crate::error::Result;

use super::{sanitize_field, ExportOptions, Exporter};

/// Tab-separated passthrough exporter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpExporter;

impl DumpExporter {
    /// Create a new dump exporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Exporter for DumpExporter {
    fn export_listing<W: Write>(
        &self,
        listing: &Listing,
        writer: &mut W,
        _options: &ExportOptions,
    ) -> Result<()> {
        for entry in &listing.entries {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                sanitize_field(&entry.window_id),
                sanitize_field(&entry.tab_id),
                entry.last_accessed,
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
    use crate::parser::SessionParser;

    #[test]
    fn test_dump_preserves_document_order() {
        let dump = SessionParser::new()
            .parse_str(
                r#"[{"windows": {
                    "5": {"9": {"lastAccessed": 300, "url": "c", "title": "C"},
                          "1": {"lastAccessed": 100, "url": "a", "title": "A"}},
                    "2": {"4": {"lastAccessed": 200, "url": "b", "title": "B"}}
                }}]"#,
            )
            .unwrap();
        let listing = Listing::unfiltered(dump.primary().unwrap());

        let mut buffer = Vec::new();
        DumpExporter::new()
            .export_listing(&listing, &mut buffer, &ExportOptions::default())
            .unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "5\t9\t300\tc\tC\n5\t1\t100\ta\tA\n2\t4\t200\tb\tB\n"
        );
    }
}
