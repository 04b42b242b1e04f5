// csvstrip-core/src/sinks/jsonl.rs
//! A sink that writes each redacted field as a line of JSON.

use anyhow::{Context, Result};
use std::io::Write;

use crate::redacted_field::RedactedField;
use crate::sink::FieldSink;

/// Writes `{"line_number":N,"content":"..."}` per forwarded field.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().context("Failed to flush redacted field output")?;
        Ok(self.writer)
    }
}

impl<W: Write> FieldSink for JsonLinesSink<W> {
    fn forward(&mut self, field: RedactedField) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &field)
            .with_context(|| format!("Failed to serialize redacted field for line {}", field.line_number))?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}
