use std::fmt;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};

/// Filename that selects standard input
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program reads traffic event records as JSON, one object per line, and prints traveler advisory renderings for each: a TIM advisory, a CIFS incident report, or both. Events near a state line on a covered corridor are flagged.

Run with --help for the full description and examples.
"#;

const USAGE_LONG: &str = r#"
This program reads traffic event records as JSON, one object per line (NDJSON), and prints traveler advisory renderings for each event. Records must carry at least an "id" field; every other field is optional, and unknown fields are ignored.

Render a feed dump as text:

    timfmt --file events.ndjson

Machine-readable output, one JSON object per input event:

    curl -s https://dot.example.org/events.ndjson \
        | timfmt --json

Events whose coordinates fall within --threshold miles of a state-line crossing on their corridor are flagged. With --group, a per-border summary is printed after the messages:

    timfmt --file events.ndjson --group --threshold 50

Lines that do not parse as an event record are skipped with a warning; they never stop the run.

The renderings are display-oriented approximations, not wire-format TIM frames or schema-valid CIFS documents.
"#;

/// Command-line options
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbose output (repeat for more detail)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress warnings about malformed input
    #[arg(short, long)]
    pub quiet: bool,

    /// Read events from this file ("-" reads stdin)
    ///
    /// One JSON event record per line.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Message families to emit
    #[arg(long, value_enum, default_value_t = Format::Both)]
    pub format: Format,

    /// Emit one JSON object per event instead of text
    #[arg(long)]
    pub json: bool,

    /// Border detection threshold (miles)
    #[arg(long, default_value_t = timcast::DEFAULT_BORDER_THRESHOLD_MILES)]
    pub threshold: f64,

    /// Print a per-border summary of border-proximate events
    #[arg(long)]
    pub group: bool,
}

impl Args {
    /// True if events should be read from standard input
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// Message families timfmt can emit
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// TIM advisory and CIFS incident report
    Both,

    /// TIM advisory only
    Tim,

    /// CIFS incident report only
    Cifs,
}

impl Format {
    /// True if the TIM rendering is requested
    pub fn wants_tim(&self) -> bool {
        matches!(self, Format::Both | Format::Tim)
    }

    /// True if the CIFS rendering is requested
    pub fn wants_cifs(&self) -> bool {
        matches!(self, Format::Both | Format::Cifs)
    }
}

/// Fatal program error paired with its process exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Wrap an error and choose its exit code
    pub fn new(error: anyhow::Error, exit_code: i32) -> CliError {
        CliError { error, exit_code }
    }

    /// Print the error without terminating
    ///
    /// clap's own errors keep their native formatting. Anything else is
    /// rendered through clap's error style so all failures look alike.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print the error, then terminate the process
    pub fn exit(&self) -> ! {
        let _ = self.print();
        std::process::exit(self.exit_code);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let exit_code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), exit_code)
    }
}
