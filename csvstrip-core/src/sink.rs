// csvstrip-core/src/sink.rs
//! Defines the `FieldSink` capability injected into a transcoding run.
//!
//! The transcoder hands each terminated record's redacted field to a sink as
//! a [`RedactedField`]. A sink error never stops the scan: the transcoder logs
//! it and counts it in the run statistics.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;

use crate::redacted_field::RedactedField;

/// Receives redacted fields in strictly increasing line order, one call per record.
pub trait FieldSink {
    fn forward(&mut self, field: RedactedField) -> Result<()>;
}

impl<F> FieldSink for F
where
    F: FnMut(RedactedField) -> Result<()>,
{
    fn forward(&mut self, field: RedactedField) -> Result<()> {
        self(field)
    }
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FieldSink for NullSink {
    fn forward(&mut self, _field: RedactedField) -> Result<()> {
        Ok(())
    }
}

/// Collects forwarded fields in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub fields: Vec<RedactedField>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_fields(self) -> Vec<RedactedField> {
        self.fields
    }
}

impl FieldSink for MemorySink {
    fn forward(&mut self, field: RedactedField) -> Result<()> {
        self.fields.push(field);
        Ok(())
    }
}
