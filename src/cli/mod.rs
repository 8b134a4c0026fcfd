//! Command-line interface for tabdump.
//!
//! A single command: read a session dump, convert it, write the listing.
//! Every option can also be set through a `TABDUMP_*` environment variable,
//! and output/sort defaults can come from the configuration file.

mod convert;

pub use convert::Settings;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, Shell};

use crate::config::Config;
use crate::error::Result;
use crate::export::ExportFormat;

/// Convert a browser session dump into a filtered, sorted tab listing.
#[derive(Debug, Parser)]
#[command(name = "tabdump")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input session dump in JSON (default: stdin).
    #[arg(short = 'i', long = "in", value_name = "PATH", env = "TABDUMP_IN")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(short = 'o', long = "out", value_name = "PATH", env = "TABDUMP_OUT")]
    pub output: Option<PathBuf>,

    /// Print the range of dates represented in the dump.
    #[arg(long, env = "TABDUMP_RANGE")]
    pub range: bool,

    /// Sort most recent first (or highest index first).
    #[arg(short = 'r', long, env = "TABDUMP_REVERSE")]
    pub reverse: bool,

    /// Print only tabs whose URL matches this regex.
    #[arg(long, value_name = "REGEX", env = "TABDUMP_URL_REGEX")]
    pub url_regex: Option<String>,

    /// Print only tabs whose title matches this regex.
    #[arg(long, value_name = "REGEX", env = "TABDUMP_TITLE_REGEX")]
    pub title_regex: Option<String>,

    /// Match the URL and title regexes case-insensitively.
    #[arg(long, env = "TABDUMP_IGNORE_CASE")]
    pub ignore_case: bool,

    /// Maximum number of tabs printed, -1 for unlimited.
    #[arg(short = 'n', long, default_value_t = -1, allow_negative_numbers = true, env = "TABDUMP_MAX")]
    pub max: i64,

    /// HTML title of the output document.
    #[arg(long, env = "TABDUMP_TITLE")]
    pub title: Option<String>,

    /// Sort by tab index instead of by date last accessed.
    #[arg(long, env = "TABDUMP_BYINDEX")]
    pub byindex: bool,

    /// Keep tabs last accessed on this date and after
    /// (2017-11-01[T00[:00[:00]]][Z|-07:00]; local time unless a zone is given).
    #[arg(long, value_name = "WHEN", env = "TABDUMP_START")]
    pub start: Option<String>,

    /// Keep tabs last accessed on this date and before (same format as --start).
    #[arg(long, value_name = "WHEN", env = "TABDUMP_END")]
    pub end: Option<String>,

    /// Output format.
    #[arg(short = 'f', long, env = "TABDUMP_FORMAT")]
    pub format: Option<FormatArg>,

    /// Keep only the last tab for each sort key (legacy behaviour).
    #[arg(long, env = "TABDUMP_COLLAPSE_DUPLICATES")]
    pub collapse_duplicates: bool,

    /// Render timestamps in UTC instead of local time.
    #[arg(long, env = "TABDUMP_UTC")]
    pub utc: bool,

    /// strftime pattern for entry timestamps.
    #[arg(long, value_name = "FORMAT", env = "TABDUMP_TIME_FORMAT")]
    pub time_format: Option<String>,

    /// Add a small inline stylesheet to HTML output.
    #[arg(long, env = "TABDUMP_STYLED")]
    pub styled: bool,

    /// Path to custom configuration file.
    #[arg(long, env = "TABDUMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn", env = "TABDUMP_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact).
    #[arg(long, default_value = "text", env = "TABDUMP_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Suppress the summary line on stderr.
    #[arg(short = 'q', long, env = "TABDUMP_QUIET")]
    pub quiet: bool,

    /// Print shell completions and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<CompletionShell>,
}

/// Output format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// HTML document with an ordered list of links.
    #[default]
    Html,
    /// Tab-separated listing.
    Text,
    /// Every tab, unfiltered, as tab-separated diagnostic lines.
    Dump,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Dump => ExportFormat::Dump,
        }
    }
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "tabdump", &mut io::stdout());
}

/// Initialize tracing/logging based on CLI options.
///
/// Logs always go to stderr; stdout is reserved for the listing.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let layer = match cli.log_format {
        LogFormat::Text => fmt::layer().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(io::stderr)
            .boxed(),
    };

    if let Err(e) = tracing_subscriber::registry().with(layer).with(filter).try_init() {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Load the configuration file.
///
/// An explicit `--config` must exist and parse. Without one, the default
/// location is used only if a file is there.
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Some(shell) = cli.completions {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config(&cli)?;
    convert::run(&cli, &config)
}
