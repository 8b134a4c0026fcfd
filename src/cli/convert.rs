//! The conversion command.
//!
//! All arguments are validated before the input is opened, so a bad flag
//! never costs a read of a large dump and never leaves an output file.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::{instrument, warn};

use crate::config::Config;
use crate::convert::{max_from_arg, ConvertOptions, Converter, Listing};
use crate::datetime::{parse_instant, validate_time_format};
use crate::error::{Result, TabdumpError};
use crate::export::{export_to_file, export_to_writer, ExportFormat, ExportOptions};
use crate::model::{SessionRecord, SortBy};
use crate::parser::{InputSource, SessionParser};

use super::Cli;

/// Fully resolved settings for one conversion run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the session dump is read from.
    pub input: InputSource,
    /// Output path; `None` writes to stdout.
    pub output: Option<PathBuf>,
    /// Output format.
    pub format: ExportFormat,
    /// Validated filter and sort pipeline.
    pub converter: Converter,
    /// Rendering options.
    pub export: ExportOptions,
    /// Whether any filter flag was given.
    pub filtered: bool,
}

impl Settings {
    /// Merge flags over configuration values and validate the result.
    ///
    /// Flags win over the configuration file. Boolean switches are enabled
    /// by either source.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let format = match cli.format {
            Some(arg) => arg.into(),
            None => config.export_format()?,
        };

        let start = cli.start.as_deref().map(parse_instant).transpose()?;
        let end = cli.end.as_deref().map(parse_instant).transpose()?;
        let max = max_from_arg(cli.max)?;

        let sort_by = if cli.byindex || config.sort.by_index {
            SortBy::Index
        } else {
            SortBy::LastAccessed
        };

        let options = ConvertOptions {
            start,
            end,
            reverse: cli.reverse || config.sort.reverse,
            url_pattern: cli.url_regex.clone(),
            title_pattern: cli.title_regex.clone(),
            ignore_case: cli.ignore_case,
            max,
            sort_by,
            print_range: cli.range,
            collapse_duplicates: cli.collapse_duplicates || config.sort.collapse_duplicates,
        };
        let filtered = options.start.is_some()
            || options.end.is_some()
            || options.url_pattern.is_some()
            || options.title_pattern.is_some()
            || options.max.is_some();
        let converter = Converter::new(options)?;

        let time_format = cli
            .time_format
            .clone()
            .unwrap_or_else(|| config.output.time_format.clone());
        validate_time_format(&time_format)?;

        let export = ExportOptions::default()
            .with_title(cli.title.clone().unwrap_or_else(|| config.output.title.clone()))
            .with_utc(cli.utc || config.output.utc)
            .with_time_format(time_format)
            .with_styled(cli.styled);

        let output = cli
            .output
            .clone()
            .filter(|path| path.as_os_str() != "-");

        Ok(Self {
            input: InputSource::from_arg(cli.input.as_deref()),
            output,
            format,
            converter,
            export,
            filtered,
        })
    }

    /// Build the listing for a decoded record.
    #[must_use]
    pub fn listing(&self, record: &SessionRecord) -> Listing {
        if self.format.is_passthrough() {
            if self.filtered {
                warn!("filters, sorting and --max are ignored by the dump format");
            }
            Listing::unfiltered(record)
        } else {
            self.converter.convert(record)
        }
    }
}

/// Run a conversion with the given flags and configuration.
#[instrument(skip_all)]
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let settings = Settings::resolve(cli, config)?;

    let dump = SessionParser::new().parse_source(&settings.input)?;
    let listing = settings.listing(dump.primary()?);

    match &settings.output {
        Some(path) => {
            export_to_file(&listing, path, settings.format, &settings.export)?;
            if !cli.quiet {
                eprintln!("Wrote {} tabs to {}", listing.len(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            export_to_writer(&listing, &mut writer, settings.format, &settings.export)?;
            writer
                .flush()
                .map_err(|e| TabdumpError::io("Failed to flush stdout", e))?;
        }
    }

    Ok(())
}
