//! Rendering of listings.
//!
//! Formats:
//! - HTML: a standalone document with an ordered list of links
//! - Text: the same listing as tab-separated lines
//! - Dump: a diagnostic passthrough of every tab, unfiltered
//!
//! File output goes through [`OutputFile`], so a failed export never
//! leaves a partially written regular file behind.

mod dump;
mod html;
mod text;

pub use dump::*;
pub use html::*;
pub use text::*;

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::convert::Listing;
use crate::datetime::{validate_time_format, DisplayZone, DEFAULT_TIME_FORMAT};
use crate::error::{Result, TabdumpError};
use crate::util::OutputFile;

/// Default HTML document title.
pub const DEFAULT_TITLE: &str = "Session Dump";

/// Options shared across formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Document title (HTML only).
    pub title: String,
    /// Time zone for rendered timestamps.
    pub zone: DisplayZone,
    /// strftime pattern for per-entry timestamps.
    pub time_format: String,
    /// Inline stylesheet in HTML output.
    pub styled: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            zone: DisplayZone::Local,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            styled: false,
        }
    }
}

impl ExportOptions {
    /// Builder: document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: render timestamps in UTC.
    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.zone = if utc { DisplayZone::Utc } else { DisplayZone::Local };
        self
    }

    /// Builder: per-entry timestamp pattern.
    ///
    /// The pattern is checked when exporting; see [`export_to_writer`].
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Builder: inline stylesheet in HTML output.
    #[must_use]
    pub fn with_styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Render a millisecond timestamp with the entry pattern.
    #[must_use]
    pub fn format_entry_time(&self, millis: i64) -> String {
        self.zone.format_millis(millis, &self.time_format)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// HTML document.
    #[default]
    Html,
    /// Tab-separated listing.
    Text,
    /// Diagnostic tab-separated passthrough.
    Dump,
}

impl ExportFormat {
    /// Whether this format bypasses filtering and sorting.
    #[must_use]
    pub const fn is_passthrough(&self) -> bool {
        matches!(self, Self::Dump)
    }
}

impl FromStr for ExportFormat {
    type Err = TabdumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "text" | "txt" | "tsv" => Ok(Self::Text),
            "dump" | "debug" => Ok(Self::Dump),
            other => Err(TabdumpError::invalid_argument(
                "format",
                format!("unknown format '{other}' (expected html, text or dump)"),
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "html",
            Self::Text => "text",
            Self::Dump => "dump",
        })
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Render a listing to the writer.
    fn export_listing<W: Write>(
        &self,
        listing: &Listing,
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()>;
}

/// Render a listing in `format` to any writer.
///
/// # Errors
///
/// Returns [`TabdumpError::InvalidArgument`] before writing anything if
/// `options.time_format` is not a supported strftime pattern.
pub fn export_to_writer<W: Write>(
    listing: &Listing,
    writer: &mut W,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    validate_time_format(&options.time_format)?;

    match format {
        ExportFormat::Html => HtmlExporter::new()
            .inline_styles(options.styled)
            .export_listing(listing, writer, options),
        ExportFormat::Text => TextExporter::new().export_listing(listing, writer, options),
        ExportFormat::Dump => DumpExporter::new().export_listing(listing, writer, options),
    }
}

/// Export a listing to a file.
///
/// Regular files are staged in a temporary file and renamed into place;
/// symlinks are followed and special files are written in place.
pub fn export_to_file(
    listing: &Listing,
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();

    // Checked before opening so a special-file target is not truncated.
    validate_time_format(&options.time_format)?;

    let mut out = OutputFile::create(path)?;
    let mut writer = BufWriter::new(out.writer());

    export_to_writer(listing, &mut writer, format, options)?;

    writer.flush().map_err(|e| {
        TabdumpError::io(format!("Failed to flush output file: {}", path.display()), e)
    })?;

    // Release the borrow on out.writer()
    drop(writer);

    out.finish()
}

/// Export a listing to a string.
pub fn export_to_string(
    listing: &Listing,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String> {
    let mut buffer = Vec::new();
    export_to_writer(listing, &mut buffer, format, options)?;
    String::from_utf8(buffer).map_err(TabdumpError::from)
}

/// Replace field separators so a value stays on one tab-separated column.
pub(crate) fn sanitize_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['\t', '\n', '\r']) {
        std::borrow::Cow::Owned(value.replace(['\t', '\n', '\r'], " "))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("dump".parse::<ExportFormat>().unwrap(), ExportFormat::Dump);
        assert!("markdown".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display_round_trips() {
        for format in [ExportFormat::Html, ExportFormat::Text, ExportFormat::Dump] {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_export_options_builders() {
        let opts = ExportOptions::default()
            .with_title("Tabs")
            .with_utc(true)
            .with_time_format("%F");
        assert_eq!(opts.title, "Tabs");
        assert_eq!(opts.zone, DisplayZone::Utc);
        assert_eq!(opts.format_entry_time(1_509_494_400_000), "2017-11-01");
    }

    #[test]
    fn test_sanitize_field() {
        assert_eq!(sanitize_field("plain"), "plain");
        assert_eq!(sanitize_field("a\tb\nc"), "a b c");
    }

    #[test]
    fn test_unsupported_time_format_is_rejected() {
        let listing = Listing {
            entries: vec![crate::model::Entry {
                key: 1_509_494_401_000,
                last_accessed: 1_509_494_401_000,
                index: 0,
                window_id: "1".into(),
                tab_id: "1".into(),
                url: "https://example.com/".into(),
                title: "Example".into(),
            }],
            ..Listing::default()
        };
        let options = ExportOptions::default().with_time_format("%Q");

        for format in [ExportFormat::Html, ExportFormat::Text] {
            let err = export_to_string(&listing, format, &options).unwrap_err();
            assert!(matches!(err, TabdumpError::InvalidArgument { .. }), "{format}: {err}");
        }
    }

    #[test]
    fn test_bad_time_format_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabs.txt");
        let options = ExportOptions::default().with_time_format("%Q");

        assert!(export_to_file(&Listing::default(), &path, ExportFormat::Text, &options).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_export_to_file_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabs.html");

        export_to_file(&Listing::default(), &path, ExportFormat::Html, &ExportOptions::default())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.trim_end().ends_with("</html>"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
