// csvstrip-core/src/sinks/mod.rs
//! Concrete `FieldSink` backends.
//!
//! * `jsonl`: appends one JSON object per redacted field to any writer.
//! * `forwarder`: bridges the synchronous scan to an async `RecordStore`
//!   through a bounded channel drained by a single task.
//! * `postgres`: a `RecordStore` that applies a parameterized update per record.
//!
//! # License
//! MIT OR Apache-2.0

pub mod forwarder;
pub mod jsonl;
pub mod postgres;
