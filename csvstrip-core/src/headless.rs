// csvstrip-core/src/headless.rs
// File: csvstrip-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot transcoding without wiring a sink.

use crate::config::TranscodeOptions;
use crate::redacted_field::RedactedField;
use crate::scanner::{Transcoded, Transcoder};
use crate::sink::{MemorySink, NullSink};

/// Escapes `input`, discarding any redacted fields.
///
/// # Arguments
///
/// * `input` - The raw CSV bytes.
/// * `options` - Which field to redact and how records are keyed.
pub fn headless_transcode(input: &[u8], options: TranscodeOptions) -> Transcoded {
    Transcoder::new(options).transcode(input, &mut NullSink)
}

/// Escapes `input` and returns the redacted fields collected in memory.
pub fn headless_transcode_collect(input: &[u8], options: TranscodeOptions) -> (Transcoded, Vec<RedactedField>) {
    let mut sink = MemorySink::new();
    let transcoded = Transcoder::new(options).transcode(input, &mut sink);
    (transcoded, sink.into_fields())
}
