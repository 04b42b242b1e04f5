// csvstrip-core/src/lib.rs
//! # csvstrip Core Library
//!
//! `csvstrip-core` turns CSV-like bytes carrying raw control characters into
//! an escaped stream that strict downstream parsers can load, in one pass.
//! Optionally one field per record is diverted away from the output and
//! handed to a keyed sink instead.
//!
//! The library does no file handling of its own: it takes a byte buffer and
//! returns a byte buffer, calling an injected [`FieldSink`] along the way.
//!
//! ## Modules
//!
//! * `escape`: The fixed escape table and its inverse, [`unescape`].
//! * `scanner`: The [`Transcoder`] state machine: quote tracking, escaping and field routing.
//! * `sink`: The [`FieldSink`] capability plus in-memory and null sinks.
//! * `sinks`: JSON-lines, async forwarding queue and PostgreSQL backends.
//! * `redacted_field`: The [`RedactedField`] record and PII-safe logging helpers.
//! * `config`: [`StripConfig`] and [`TranscodeOptions`], loadable from YAML.
//! * `headless`: One-shot wrappers for callers that need no sink wiring.
//! * `errors`: The [`StripError`] enum.
//!
//! ## Usage Example
//!
//! ```rust
//! use csvstrip_core::{headless_transcode_collect, TranscodeOptions};
//!
//! let input = b"id,notes\r\n7,\"said \"hi\" twice\"\r\n";
//! let (result, fields) = headless_transcode_collect(input, TranscodeOptions::redacting(2));
//!
//! assert_eq!(result.output, b"id,\r\n7,\"\"\r\n".to_vec());
//! assert_eq!(fields[1].text(), r#"said \"hi\" twice"#);
//! ```
//!
//! ## Error Handling
//!
//! Transcoding itself cannot fail. Configuration and sink setup return
//! [`StripError`]; sink calls return `anyhow::Result` and their failures are
//! counted in [`TranscodeStats`] rather than aborting the scan.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod errors;
pub mod escape;
pub mod headless;
pub mod redacted_field;
pub mod scanner;
pub mod sink;
pub mod sinks;

/// Re-exports the configuration types.
pub use config::{
    CliOverrides,
    SinkTrigger,
    StripConfig,
    TranscodeOptions,
    DEFAULT_LINE_KEY_OFFSET,
    DEFAULT_UPDATE_STATEMENT,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::StripError;

pub use escape::unescape;
pub use headless::{headless_transcode, headless_transcode_collect};
pub use redacted_field::{redact_sensitive, RedactedField};
pub use scanner::{TranscodeStats, Transcoded, Transcoder};
pub use sink::{FieldSink, MemorySink, NullSink};

/// Re-exports the sink backends.
pub use sinks::forwarder::{ChannelSink, ForwardReport, RecordStore, SinkForwarder, DEFAULT_QUEUE_CAPACITY};
pub use sinks::jsonl::JsonLinesSink;
pub use sinks::postgres::PgRecordStore;
