//! Output file handling.
//!
//! Regular files are replaced atomically: content goes to a temporary file
//! next to the resolved target, which is renamed over it only after
//! everything has been flushed. A run that fails midway leaves the target
//! untouched. Symlinks are followed so the linked file is the one replaced.
//! Targets that exist but are not regular files (`/dev/null`, `/dev/stdout`,
//! FIFOs) are opened and written in place.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, TabdumpError};

/// A writer for the `--out` target.
///
/// Dropping without calling [`OutputFile::finish`] discards a pending
/// atomic write.
///
/// # Example
///
/// ```rust,no_run
/// use tabdump::util::OutputFile;
/// use std::io::Write;
///
/// let mut out = OutputFile::create("tabs.html").unwrap();
/// writeln!(out.writer(), "<!DOCTYPE html>").unwrap();
/// out.finish().unwrap();
/// ```
#[derive(Debug)]
pub struct OutputFile {
    sink: Sink,
    target_path: PathBuf,
}

#[derive(Debug)]
enum Sink {
    Atomic(NamedTempFile),
    Direct(File),
}

impl OutputFile {
    /// Open an output writer for the given target path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::metadata(path) {
            Ok(meta) if !meta.is_file() => {
                debug!(path = %path.display(), "writing special file in place");
                let file = OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| {
                        TabdumpError::from_io_at(path, format!("Failed to open: {}", path.display()), e)
                    })?;
                Ok(Self {
                    sink: Sink::Direct(file),
                    target_path: path.to_path_buf(),
                })
            }
            Ok(_) => {
                let resolved = fs::canonicalize(path).map_err(|e| {
                    TabdumpError::from_io_at(path, format!("Failed to resolve: {}", path.display()), e)
                })?;
                Self::atomic(resolved)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::atomic(path.to_path_buf()),
            Err(e) => Err(TabdumpError::from_io_at(
                path,
                format!("Failed to stat: {}", path.display()),
                e,
            )),
        }
    }

    fn atomic(target_path: PathBuf) -> Result<Self> {
        // A bare file name has an empty parent; use the working directory.
        let parent = match target_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(TabdumpError::IoError {
                    context: format!("Cannot write to: {}", target_path.display()),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
                })
            }
        };

        if !parent.exists() {
            fs::create_dir_all(&parent).map_err(|e| {
                TabdumpError::from_io_at(
                    &parent,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        // Same directory keeps the final rename on one filesystem.
        let temp_file = NamedTempFile::new_in(&parent).map_err(|e| {
            TabdumpError::from_io_at(
                &parent,
                format!("Failed to create temporary file in: {}", parent.display()),
                e,
            )
        })?;

        Ok(Self {
            sink: Sink::Atomic(temp_file),
            target_path,
        })
    }

    /// The path that receives the output, with symlinks resolved.
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Whether the output is staged in a temporary file.
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(self.sink, Sink::Atomic(_))
    }

    /// The underlying writer.
    pub fn writer(&mut self) -> &mut dyn Write {
        match &mut self.sink {
            Sink::Atomic(temp_file) => temp_file as &mut dyn Write,
            Sink::Direct(file) => file,
        }
    }

    /// Flush, and for regular files rename the staged content into place.
    pub fn finish(mut self) -> Result<()> {
        self.writer().flush().map_err(|e| {
            TabdumpError::io(format!("Failed to flush file: {}", self.target_path.display()), e)
        })?;

        match self.sink {
            Sink::Direct(_) => Ok(()),
            Sink::Atomic(temp_file) => {
                temp_file.persist(&self.target_path).map_err(|e| {
                    TabdumpError::from_io_at(
                        &self.target_path,
                        format!("Failed to atomically write: {}", self.target_path.display()),
                        e.error,
                    )
                })?;
                Ok(())
            }
        }
    }
}
