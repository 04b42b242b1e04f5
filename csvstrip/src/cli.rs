// csvstrip/src/cli.rs
//! This file defines the command-line interface (CLI) for the csvstrip application,
//! including all available commands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use csvstrip_core::SinkTrigger;
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "csvstrip",
    version = env!("CARGO_PKG_VERSION"),
    about = "Escape raw control characters in CSV files",
    long_about = "csvstrip rewrites CSV-like files whose fields carry raw quotes, line breaks, tabs and other control bytes into an escaped form that strict loaders accept. One field per record can be diverted out of the output and forwarded to a PostgreSQL table or a JSON-lines file, keyed by line number.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (traces every escape and routing decision)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `csvstrip` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Escapes an input file, optionally diverting one field per record to a sink.
    #[command(about = "Escapes an input file, optionally diverting one field per record to a sink.")]
    Strip(StripCommand),

    /// Reverses the escape table over a previously stripped file.
    #[command(about = "Reverses the escape table over a previously stripped file.")]
    Unescape(UnescapeCommand),
}

/// Arguments for the `strip` command.
#[derive(Parser, Debug)]
pub struct StripCommand {
    /// File to read. It is loaded fully before scanning.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File to write. Overwritten if it exists.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// 1-based field to divert away from the output.
    #[arg(long = "ignore", value_name = "N", env = "CSVSTRIP_IGNORE", value_parser = clap::value_parser!(u64).range(1..), help = "Divert this 1-based field of every record to the sink.")]
    pub ignore: Option<u64>,

    /// PostgreSQL connection string for the database sink.
    #[arg(long = "dsn", value_name = "URL", env = "CSVSTRIP_DSN", hide_env_values = true, conflicts_with = "redacted_out", help = "Forward diverted fields to this PostgreSQL database.")]
    pub dsn: Option<String>,

    /// Update applied per record; `$1` is the field text, `$2` the key.
    #[arg(long = "update-statement", value_name = "SQL", help = "Parameterized update run per record ($1 = text, $2 = key).")]
    pub update_statement: Option<String>,

    /// Write diverted fields as JSON lines to this file.
    #[arg(long = "redacted-out", value_name = "FILE", help = "Write diverted fields as JSON lines to this file.")]
    pub redacted_out: Option<PathBuf>,

    /// Which record terminator hands the diverted field to the sink.
    #[arg(long = "sink-trigger", value_name = "TERMINATOR", value_enum, help = "Forward on the record's carriage return (cr, default) or line feed (lf).")]
    pub sink_trigger: Option<TriggerChoice>,

    /// Added to the line number to form the sink key.
    #[arg(long = "line-key-offset", value_name = "N", allow_hyphen_values = true, help = "Offset added to the line number to form the sink key (default -1).")]
    pub line_key_offset: Option<i64>,

    /// Append the sink key as an extra quoted column.
    #[arg(long = "append-line-number", help = "Append the sink key as an extra quoted column when a record ends in the diverted field.")]
    pub append_line_number: bool,

    /// Path to a YAML configuration file. Flags override its values.
    #[arg(long = "config", value_name = "FILE", help = "Path to a YAML configuration file.")]
    pub config: Option<PathBuf>,

    /// Export run statistics to a JSON file.
    #[arg(long = "stats-json", value_name = "FILE", help = "Export run statistics to a JSON file.")]
    pub stats_json: Option<PathBuf>,

    /// Exit with a non-zero code if any sink update failed.
    #[arg(long = "fail-on-sink-errors", help = "Exit with a non-zero code if any sink update failed.")]
    pub fail_on_sink_errors: bool,
}

/// Arguments for the `unescape` command.
#[derive(Parser, Debug)]
pub struct UnescapeCommand {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Enum for selecting the sink trigger.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum TriggerChoice {
    /// Carriage return of a CRLF terminator.
    Cr,
    /// Line feed.
    Lf,
}

impl From<TriggerChoice> for SinkTrigger {
    fn from(choice: TriggerChoice) -> Self {
        match choice {
            TriggerChoice::Cr => SinkTrigger::CarriageReturn,
            TriggerChoice::Lf => SinkTrigger::LineFeed,
        }
    }
}
