//! Configuration management for `csvstrip-core`.
//!
//! This module defines the settings that steer a transcoding run: which field
//! is redacted, where redacted fields are forwarded, and how each record is
//! keyed when it reaches the sink. Settings can be loaded from a YAML file and
//! overlaid with command-line values.
//!
//! License: MIT OR Apache-2.0

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::errors::StripError;

/// The parameterized update applied once per forwarded record.
/// `$1` receives the redacted text and `$2` the record key.
pub const DEFAULT_UPDATE_STATEMENT: &str = "update fm_task set instructions = ($1) where lineno = $2";

/// Offset added to the 1-based line number to form the sink key.
/// `-1` assumes a single header row precedes the data.
pub const DEFAULT_LINE_KEY_OFFSET: i64 = -1;

/// Which unescaped record terminator hands the redacted buffer to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkTrigger {
    /// Fire on the `\r` of a `\r\n` terminator. Records without `\r` are never forwarded.
    #[default]
    CarriageReturn,
    /// Fire on every unescaped `\n`, before the record state is reset.
    LineFeed,
}

impl fmt::Display for SinkTrigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SinkTrigger::CarriageReturn => write!(f, "carriage-return"),
            SinkTrigger::LineFeed => write!(f, "line-feed"),
        }
    }
}

/// Options consumed by the transcoder itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscodeOptions {
    /// 1-based index of the field diverted away from the output. `None` disables redaction.
    pub ignore_field: Option<usize>,
    pub sink_trigger: SinkTrigger,
    pub line_key_offset: i64,
    /// Append the record key as an extra quoted column when the record ends inside the ignored field.
    pub append_line_number: bool,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            ignore_field: None,
            sink_trigger: SinkTrigger::default(),
            line_key_offset: DEFAULT_LINE_KEY_OFFSET,
            append_line_number: false,
        }
    }
}

impl TranscodeOptions {
    /// Options that only escape, with no field diverted.
    pub fn escape_only() -> Self {
        Self::default()
    }

    /// Options that redact the given 1-based field.
    pub fn redacting(field: usize) -> Self {
        Self {
            ignore_field: Some(field),
            ..Self::default()
        }
    }

    /// Maps a 1-based line number to the key handed to the sink.
    /// Keys that would fall below zero are clamped to 0.
    pub fn sink_key(&self, line_number: u64) -> u64 {
        let line = i64::try_from(line_number).unwrap_or(i64::MAX);
        line.saturating_add(self.line_key_offset).max(0) as u64
    }
}

/// Top-level configuration for a csvstrip run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StripConfig {
    #[serde(flatten)]
    pub transcode: TranscodeOptions,
    /// PostgreSQL connection string for the database sink.
    pub dsn: Option<String>,
    /// Override for [`DEFAULT_UPDATE_STATEMENT`].
    pub update_statement: Option<String>,
}

/// Command-line values that take precedence over a config file.
/// Every field is optional; `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ignore_field: Option<usize>,
    pub dsn: Option<String>,
    pub update_statement: Option<String>,
    pub sink_trigger: Option<SinkTrigger>,
    pub line_key_offset: Option<i64>,
    pub append_line_number: bool,
}

impl StripConfig {
    /// Loads a configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StripError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| StripError::ConfigRead(path.display().to_string(), e))?;
        let config: StripConfig = serde_yml::from_str(&text)
            .map_err(|e| StripError::ConfigParse(path.display().to_string(), e))?;

        config.validate()?;
        debug!("Loaded configuration: {:?}", config.redacted_for_log());
        Ok(config)
    }

    /// Overlays command-line values on top of this configuration.
    pub fn merge_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(field) = cli.ignore_field {
            debug!("Overriding ignored field with CLI value: {}", field);
            self.transcode.ignore_field = Some(field);
        }
        if cli.dsn.is_some() {
            self.dsn = cli.dsn;
        }
        if cli.update_statement.is_some() {
            self.update_statement = cli.update_statement;
        }
        if let Some(trigger) = cli.sink_trigger {
            self.transcode.sink_trigger = trigger;
        }
        if let Some(offset) = cli.line_key_offset {
            self.transcode.line_key_offset = offset;
        }
        self.transcode.append_line_number |= cli.append_line_number;
        self
    }

    pub fn validate(&self) -> Result<(), StripError> {
        match self.transcode.ignore_field {
            Some(0) => Err(StripError::InvalidFieldIndex(0)),
            _ => Ok(()),
        }
    }

    pub fn update_statement(&self) -> &str {
        self.update_statement.as_deref().unwrap_or(DEFAULT_UPDATE_STATEMENT)
    }

    /// A copy safe to print: the DSN may carry a password.
    fn redacted_for_log(&self) -> StripConfig {
        StripConfig {
            dsn: self.dsn.as_ref().map(|_| "[REDACTED]".to_string()),
            ..self.clone()
        }
    }
}
