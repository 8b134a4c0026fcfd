//! Session dump decoding.
//!
//! The whole document is read into memory and decoded in one step; there
//! is no streaming and no partial result. Any failure is reported as a
//! [`TabdumpError`] and ends the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use tabdump::parser::SessionParser;
//!
//! let dump = SessionParser::new().parse_file("sessions.json")?;
//! println!("{} tabs", dump.primary()?.tab_count());
//! # Ok::<(), tabdump::TabdumpError>(())
//! ```

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::{Result, TabdumpError};
use crate::model::SessionDump;

/// Where the session document is read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Standard input.
    #[default]
    Stdin,
    /// A file on disk.
    Path(PathBuf),
}

impl InputSource {
    /// Interpret a command-line value; `-` means standard input.
    #[must_use]
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path.as_os_str() != "-" => Self::Path(path.to_path_buf()),
            _ => Self::Stdin,
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Decoder for session dump documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionParser;

impl SessionParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Read and decode from `source`.
    pub fn parse_source(&self, source: &InputSource) -> Result<SessionDump> {
        match source {
            InputSource::Stdin => self.parse_reader(io::stdin().lock()),
            InputSource::Path(path) => self.parse_file(path),
        }
    }

    /// Read and decode a file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<SessionDump> {
        let path = path.as_ref();

        let content = fs::read(path).map_err(|e| {
            TabdumpError::from_io_at(path, format!("Failed to read {}", path.display()), e)
        })?;
        debug!(bytes = content.len(), "read session dump");

        self.parse_slice(&content)
    }

    /// Read a reader to the end and decode it.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<SessionDump> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| TabdumpError::io("Failed to read session dump", e))?;
        debug!(bytes = content.len(), "read session dump");

        self.parse_slice(&content)
    }

    /// Decode a document held in memory.
    pub fn parse_str(&self, content: &str) -> Result<SessionDump> {
        self.parse_slice(content.as_bytes())
    }

    /// Decode raw bytes.
    ///
    /// The document must be an array whose first element carries a
    /// `windows` map.
    #[instrument(skip_all, fields(bytes = content.len()))]
    pub fn parse_slice(&self, content: &[u8]) -> Result<SessionDump> {
        let dump: SessionDump = serde_json::from_slice(content)
            .map_err(|e| TabdumpError::decode_with_source(e.to_string(), e))?;

        let record = dump.primary()?;
        if record.windows.is_empty() {
            warn!("session dump contains no windows");
        }
        if dump.len() > 1 {
            debug!(records = dump.len(), "only the first session record is converted");
        }
        debug!(
            windows = record.windows.len(),
            tabs = record.tab_count(),
            name = %record.name,
            "decoded session dump"
        );

        Ok(dump)
    }
}
