//! HTML export for listings.
//!
//! Generates a standalone document: an optional range heading and an
//! ordered list with one link per tab. Titles are escaped; URLs are written
//! verbatim as link targets.

use std::io::Write;

use crate::convert::{AccessRange, Listing};
use crate::datetime::RANGE_TIME_FORMAT;
use crate::error::Result;
use crate::model::Entry;

use super::{ExportOptions, Exporter};

/// HTML exporter for listings.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    /// Emit a small inline stylesheet.
    inline_styles: bool,
}

impl HtmlExporter {
    /// Create a new HTML exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inline_styles: false,
        }
    }

    /// Enable/disable inline styles.
    #[must_use]
    pub fn inline_styles(mut self, enable: bool) -> Self {
        self.inline_styles = enable;
        self
    }

    fn write_document_start<W: Write>(&self, writer: &mut W, title: &str) -> Result<()> {
        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html>")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "<meta charset=\"utf-8\">")?;
        writeln!(writer, "<title>{}</title>", escape_html(title))?;
        if self.inline_styles {
            writeln!(
                writer,
                "<style>body {{ font-family: sans-serif; }} li {{ margin: 0.2em 0; }} .when {{ color: #666; font-family: monospace; }}</style>"
            )?;
        }
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        Ok(())
    }

    fn write_range<W: Write>(
        &self,
        writer: &mut W,
        range: &AccessRange,
        options: &ExportOptions,
    ) -> Result<()> {
        writeln!(
            writer,
            "<h1>{} - {}</h1>",
            escape_html(&options.zone.format_millis(range.first, RANGE_TIME_FORMAT)),
            escape_html(&options.zone.format_millis(range.last, RANGE_TIME_FORMAT))
        )?;
        Ok(())
    }

    fn write_entry<W: Write>(&self, writer: &mut W, entry: &Entry, options: &ExportOptions) -> Result<()> {
        let when = escape_html(&options.format_entry_time(entry.last_accessed));
        if self.inline_styles {
            writeln!(
                writer,
                "<li><span class=\"when\">{}</span> <a href=\"{}\">{}</a></li>",
                when,
                entry.url,
                escape_html(&entry.title)
            )?;
        } else {
            writeln!(
                writer,
                "<li>{} <a href=\"{}\">{}</a></li>",
                when,
                entry.url,
                escape_html(&entry.title)
            )?;
        }
        Ok(())
    }

    fn write_document_end<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;
        Ok(())
    }
}

impl Exporter for HtmlExporter {
    fn export_listing<W: Write>(
        &self,
        listing: &Listing,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        self.write_document_start(writer, &options.title)?;

        if let Some(range) = &listing.range {
            self.write_range(writer, range, options)?;
        }

        writeln!(writer, "<ol>")?;
        for entry in &listing.entries {
            self.write_entry(writer, entry, options)?;
        }
        writeln!(writer, "</ol>")?;

        self.write_document_end(writer)
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
