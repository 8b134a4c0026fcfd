//! tabdump: convert browser session dumps into readable tab listings.
//!
//! A session dump is the JSON a browser extension writes when it saves the
//! open windows and tabs. This crate decodes such a dump, flattens every tab
//! into an [`Entry`](model::Entry), sorts and filters the entries, and
//! renders the result as an HTML document or a tab-separated listing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tabdump::convert::{ConvertOptions, Converter};
//! use tabdump::export::{ExportFormat, ExportOptions};
//!
//! fn main() -> tabdump::Result<()> {
//!     let json = std::fs::read_to_string("session.json")?;
//!     let converter = Converter::new(ConvertOptions::default().with_reverse(true))?;
//!     let html = tabdump::render_str(&json, &converter, ExportFormat::Html, &ExportOptions::default())?;
//!     println!("{html}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Session dump structures and flattened entries
//! - [`parser`]: Decoding from files, readers and strings
//! - [`datetime`]: Date bound parsing and timestamp rendering
//! - [`convert`]: Flatten, sort, filter and truncate
//! - [`export`]: HTML, text and diagnostic dump output
//! - [`cli`]: Command-line interface
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`util`]: Atomic file output

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod datetime;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{Result, TabdumpError};
pub use model::{Entry, SessionDump, SessionRecord, Tab};

use convert::{Converter, Listing};
use export::{ExportFormat, ExportOptions};
use parser::SessionParser;

/// Decode a session dump and render its first record in one step.
///
/// The dump format ignores the converter and lists every tab as decoded.
pub fn render_str(
    json: &str,
    converter: &Converter,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String> {
    let dump = SessionParser::new().parse_str(json)?;
    let record = dump.primary()?;
    let listing = if format.is_passthrough() {
        Listing::unfiltered(record)
    } else {
        converter.convert(record)
    };
    export::export_to_string(&listing, format, options)
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::convert::{ConvertOptions, Converter, Listing};
    pub use crate::datetime::{parse_instant, DisplayZone};
    pub use crate::error::{Result, TabdumpError};
    pub use crate::export::{ExportFormat, ExportOptions, Exporter};
    pub use crate::model::{Entry, SessionDump, SessionRecord, SortBy, Tab};
    pub use crate::parser::{InputSource, SessionParser};
}
