// csvstrip-core/src/scanner.rs
//! The single-pass transcoder.
//!
//! A scan walks the input once, left to right. Each byte goes through the
//! quote tracker and escape table first; whatever survives is routed either
//! to the output or, while the scan sits in the ignored field, to a
//! per-record side buffer that is handed to a [`FieldSink`] when the record
//! ends. The only lookahead is a one-byte peek used to decide whether a quote
//! inside a quoted field closes it.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use serde::Serialize;

use crate::config::{SinkTrigger, TranscodeOptions};
use crate::escape::{self, DELIMITER, ESCAPE, QUOTE};
use crate::redacted_field::{log_forwarded_field_debug, RedactedField};
use crate::sink::FieldSink;

/// Position of the scan within the record structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanState {
    pub in_quotes: bool,
    /// 1-based field within the current record.
    pub field: usize,
    /// 1-based record number.
    pub line: u64,
    /// 1-based byte position within the current record, for diagnostics.
    pub column: usize,
    /// Whether the current record has already been handed to the sink.
    forwarded: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            in_quotes: false,
            field: 1,
            line: 1,
            column: 0,
            forwarded: false,
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeStats {
    pub bytes_read: usize,
    pub bytes_written: usize,
    /// Number of two-byte escape sequences emitted, wherever they were routed.
    pub escapes_added: usize,
    /// Bytes diverted into redacted fields.
    pub redacted_bytes: usize,
    /// Records closed by an unescaped `\n`.
    pub records: u64,
    pub sink_calls: u64,
    pub sink_failures: u64,
}

/// The result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub output: Vec<u8>,
    pub stats: TranscodeStats,
}

/// Reusable transcoder; each call to [`Transcoder::transcode`] is an independent scan.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    options: TranscodeOptions,
}

impl Transcoder {
    pub fn new(options: TranscodeOptions) -> Self {
        Self { options }
    }

    /// Escapes `input` and forwards each record's redacted field to `sink`.
    ///
    /// The sink is only called when an ignored field is configured. Sink
    /// errors are logged and counted in [`TranscodeStats::sink_failures`].
    pub fn transcode(&self, input: &[u8], sink: &mut dyn FieldSink) -> Transcoded {
        debug!("Transcoding {} bytes with options {:?}", input.len(), self.options);
        let mut scan = Scan::new(input, &self.options, sink);
        while let Some(b) = scan.next_byte() {
            scan.step(b);
        }
        scan.finish()
    }
}

struct Scan<'a, 's> {
    input: &'a [u8],
    /// Index of the byte being processed; `None` before the first byte.
    pos: Option<usize>,
    options: &'a TranscodeOptions,
    state: ScanState,
    output: Vec<u8>,
    redacted: Vec<u8>,
    /// Output index of the first unescaped `\r` in a run that may still be
    /// followed by the record's `\n`.
    cr_start: Option<usize>,
    stats: TranscodeStats,
    sink: &'s mut dyn FieldSink,
}

impl<'a, 's> Scan<'a, 's> {
    fn new(input: &'a [u8], options: &'a TranscodeOptions, sink: &'s mut dyn FieldSink) -> Self {
        Self {
            input,
            pos: None,
            options,
            state: ScanState::default(),
            output: Vec::with_capacity(input.len()),
            redacted: Vec::new(),
            cr_start: None,
            stats: TranscodeStats {
                bytes_read: input.len(),
                ..TranscodeStats::default()
            },
            sink,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let next = self.pos.map_or(0, |p| p + 1);
        let b = self.input.get(next).copied()?;
        self.pos = Some(next);
        Some(b)
    }

    /// The byte after the current one, or `None` at end of input.
    fn peek(&self) -> Option<u8> {
        let next = self.pos.map_or(0, |p| p + 1);
        self.input.get(next).copied()
    }

    fn step(&mut self, b: u8) {
        self.state.column += 1;
        if b != b'\r' && b != b'\n' {
            self.cr_start = None;
        }

        if let Some(code) = escape::always_escaped(b) {
            self.escape(code);
            return;
        }
        if self.state.in_quotes {
            if let Some(code) = escape::quoted_escape(b) {
                self.escape(code);
                return;
            }
        }

        match b {
            QUOTE => self.quote(),
            b'\r' => self.carriage_return(),
            b'\n' => self.line_feed(),
            DELIMITER => self.delimiter(),
            _ => self.route(b),
        }
    }

    fn quote(&mut self) {
        if !self.state.in_quotes {
            self.output.push(QUOTE);
            self.state.in_quotes = true;
            return;
        }

        match self.peek() {
            None | Some(b'\r') | Some(b'\n') | Some(DELIMITER) => {
                self.output.push(QUOTE);
                self.state.in_quotes = false;
            }
            Some(next) => {
                debug!(
                    "Embedded quote followed by byte {:#04x} at line {}, column {}, field {}",
                    next, self.state.line, self.state.column, self.state.field
                );
                self.escape(QUOTE);
            }
        }
    }

    fn carriage_return(&mut self) {
        if self.options.sink_trigger == SinkTrigger::CarriageReturn {
            self.forward_redacted();
        }
        if self.cr_start.is_none() {
            self.cr_start = Some(self.output.len());
        }
        self.output.push(b'\r');
    }

    fn line_feed(&mut self) {
        if self.options.sink_trigger == SinkTrigger::LineFeed {
            self.forward_redacted();
        }
        self.output.push(b'\n');
        self.stats.records += 1;
        self.state = ScanState {
            line: self.state.line + 1,
            ..ScanState::default()
        };
        self.redacted.clear();
        self.cr_start = None;
        debug!("New line {}", self.state.line);
    }

    fn delimiter(&mut self) {
        self.output.push(DELIMITER);
        self.state.field += 1;
        if self.is_ignored_field() {
            debug!("Entering ignored field {} on line {}", self.state.field, self.state.line);
        }
    }

    fn escape(&mut self, code: u8) {
        debug!(
            "Escaping byte as \\{} at line {}, column {}, field {}",
            code as char, self.state.line, self.state.column, self.state.field
        );
        self.route(ESCAPE);
        self.route(code);
        self.stats.escapes_added += 1;
    }

    fn route(&mut self, b: u8) {
        if self.is_ignored_field() {
            self.redacted.push(b);
            self.stats.redacted_bytes += 1;
        } else {
            self.output.push(b);
        }
    }

    fn is_ignored_field(&self) -> bool {
        self.options.ignore_field == Some(self.state.field)
    }

    fn forward_redacted(&mut self) {
        let Some(ignored) = self.options.ignore_field else {
            return;
        };
        if self.state.forwarded {
            debug!("Line {} already forwarded, skipping", self.state.line);
            return;
        }
        self.state.forwarded = true;

        let key = self.options.sink_key(self.state.line);
        if self.options.append_line_number && self.state.field == ignored {
            debug!("Appending key column {} to line {}", key, self.state.line);
            let column = format!(",\"{}\"", key);
            // The column goes before the whole terminator, `\r` included.
            let at = self.cr_start.unwrap_or(self.output.len());
            self.output.splice(at..at, column.bytes());
        }

        let field = RedactedField::new(key, std::mem::take(&mut self.redacted));
        log_forwarded_field_debug(module_path!(), &field);
        self.stats.sink_calls += 1;
        if let Err(e) = self.sink.forward(field) {
            warn!("Sink rejected redacted field for key {}: {:#}", key, e);
            self.stats.sink_failures += 1;
        }
    }

    fn finish(mut self) -> Transcoded {
        if self.state.in_quotes {
            debug!("Input ended inside a quoted field on line {}; closing it implicitly", self.state.line);
            self.state.in_quotes = false;
        }
        if !self.redacted.is_empty() {
            debug!(
                "Dropping {} redacted bytes from unterminated line {}",
                self.redacted.len(),
                self.state.line
            );
        }
        self.stats.bytes_written = self.output.len();
        debug!(
            "Transcoded {} bytes into {}, adding {} escapes",
            self.stats.bytes_read, self.stats.bytes_written, self.stats.escapes_added
        );
        Transcoded {
            output: self.output,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, NullSink};
    use anyhow::anyhow;

    fn run(input: &[u8], options: TranscodeOptions) -> (Transcoded, Vec<RedactedField>) {
        let mut sink = MemorySink::new();
        let result = Transcoder::new(options).transcode(input, &mut sink);
        (result, sink.into_fields())
    }

    fn escape_only(input: &[u8]) -> Vec<u8> {
        run(input, TranscodeOptions::escape_only()).0.output
    }

    #[test]
    fn test_plain_record_passes_through() {
        assert_eq!(escape_only(b"a,b,c\r\n"), b"a,b,c\r\n".to_vec());
    }

    #[test]
    fn test_always_escaped_bytes() {
        assert_eq!(escape_only(b"a\\b\tc\x0Bd\x0Ce"), br"a\bb\tc\vd\fe".to_vec());
    }

    #[test]
    fn test_delimiters_and_terminators_escaped_inside_quotes() {
        assert_eq!(escape_only(b"\"a,b\r\nc\",d\n"), b"\"a\\,b\\r\\nc\",d\n".to_vec());
    }

    #[test]
    fn test_quote_before_delimiter_closes_field() {
        // The quote after `ab` is embedded; the one before `,` closes.
        assert_eq!(escape_only(b"\"ab\"cd\",x\n"), b"\"ab\\\"cd\",x\n".to_vec());
    }

    #[test]
    fn test_quote_before_plain_byte_is_embedded() {
        // No closing quote: the trailing `\n` stays inside the quoted field.
        assert_eq!(escape_only(b"\"ab\"cd\n"), b"\"ab\\\"cd\\n".to_vec());
    }

    #[test]
    fn test_quote_as_last_byte_closes_field() {
        let (result, _) = run(b"\"abc\"", TranscodeOptions::escape_only());
        assert_eq!(result.output, b"\"abc\"".to_vec());
        assert_eq!(result.stats.escapes_added, 0);
    }

    #[test]
    fn test_unterminated_quote_at_end_of_input() {
        assert_eq!(escape_only(b"\"abc"), b"\"abc".to_vec());
    }

    #[test]
    fn test_field_counting_and_reset() {
        let options = TranscodeOptions::escape_only();
        let mut sink = NullSink;
        let input = b"a,b,c\r\nd";
        let mut scan = Scan::new(input, &options, &mut sink);
        let mut observed = Vec::new();
        while let Some(b) = scan.next_byte() {
            scan.step(b);
            observed.push((b, scan.state.field, scan.state.line));
        }
        assert_eq!(observed[1], (b',', 2, 1));
        assert_eq!(observed[3], (b',', 3, 1));
        assert_eq!(observed[5], (b'\r', 3, 1));
        assert_eq!(observed[6], (b'\n', 1, 2));
        assert_eq!(observed[7], (b'd', 1, 2));
    }

    #[test]
    fn test_quoted_delimiter_does_not_advance_field() {
        let options = TranscodeOptions::escape_only();
        let mut sink = NullSink;
        let mut scan = Scan::new(b"\"a,b\",c", &options, &mut sink);
        while let Some(b) = scan.next_byte() {
            scan.step(b);
        }
        assert_eq!(scan.state.field, 2);
    }

    #[test]
    fn test_redaction_routing() {
        let (result, fields) = run(b"h1,h2,h3\r\nx,SECRET,y\r\n", TranscodeOptions::redacting(2));
        assert_eq!(result.output, b"h1,,h3\r\nx,,y\r\n".to_vec());
        assert_eq!(
            fields,
            vec![
                RedactedField::new(0, b"h2".to_vec()),
                RedactedField::new(1, b"SECRET".to_vec()),
            ]
        );
        assert_eq!(result.stats.sink_calls, 2);
        assert_eq!(result.stats.redacted_bytes, 8);
    }

    #[test]
    fn test_redacted_quoted_field_keeps_quotes_in_output() {
        let (result, fields) = run(b"x,\"SE,C\\RET\",y\r\n", TranscodeOptions::redacting(2));
        assert_eq!(result.output, b"x,\"\",y\r\n".to_vec());
        assert_eq!(fields[0].content, br"SE\,C\bRET".to_vec());
    }

    #[test]
    fn test_no_sink_call_without_carriage_return() {
        let (result, fields) = run(b"x,SECRET,y\n", TranscodeOptions::redacting(2));
        assert_eq!(result.output, b"x,,y\n".to_vec());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_line_feed_trigger_forwards_lf_records() {
        let options = TranscodeOptions {
            sink_trigger: SinkTrigger::LineFeed,
            line_key_offset: 0,
            ..TranscodeOptions::redacting(1)
        };
        let (_, fields) = run(b"a,b\nc,d\n", options);
        assert_eq!(
            fields,
            vec![RedactedField::new(1, b"a".to_vec()), RedactedField::new(2, b"c".to_vec())]
        );
    }

    #[test]
    fn test_one_sink_call_per_record_with_stray_carriage_returns() {
        let (result, fields) = run(b"a,b\r\r\n", TranscodeOptions::redacting(2));
        assert_eq!(fields.len(), 1);
        assert_eq!(result.stats.sink_calls, 1);
    }

    #[test]
    fn test_no_op_mode_never_calls_sink() {
        let mut calls = 0;
        let mut sink = |_: RedactedField| -> anyhow::Result<()> {
            calls += 1;
            Ok(())
        };
        let result = Transcoder::default().transcode(b"x,SECRET,y\r\n", &mut sink);
        assert_eq!(result.output, b"x,SECRET,y\r\n".to_vec());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_sink_failures_are_counted_not_fatal() {
        let mut sink = |_: RedactedField| -> anyhow::Result<()> { Err(anyhow!("db down")) };
        let result = Transcoder::new(TranscodeOptions::redacting(1)).transcode(b"a\r\nb\r\n", &mut sink);
        assert_eq!(result.output, b"\r\n\r\n".to_vec());
        assert_eq!(result.stats.sink_calls, 2);
        assert_eq!(result.stats.sink_failures, 2);
    }

    #[test]
    fn test_append_line_number_when_last_field_is_ignored() {
        let options = TranscodeOptions {
            append_line_number: true,
            ..TranscodeOptions::redacting(2)
        };
        let (result, _) = run(b"h,notes\r\nx,SECRET\r\n", options);
        assert_eq!(result.output, b"h,,\"0\"\r\nx,,\"1\"\r\n".to_vec());
    }

    #[test]
    fn test_append_line_number_with_line_feed_trigger_on_crlf_input() {
        let options = TranscodeOptions {
            append_line_number: true,
            sink_trigger: SinkTrigger::LineFeed,
            ..TranscodeOptions::redacting(2)
        };
        let (result, fields) = run(b"h,notes\r\nx,SECRET\r\n", options);
        assert_eq!(result.output, b"h,,\"0\"\r\nx,,\"1\"\r\n".to_vec());
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_append_line_number_with_line_feed_trigger_on_lf_input() {
        let options = TranscodeOptions {
            append_line_number: true,
            sink_trigger: SinkTrigger::LineFeed,
            ..TranscodeOptions::redacting(2)
        };
        let (result, _) = run(b"h,notes\nx,\"a\rb\"\n", options);
        assert_eq!(result.output, b"h,,\"0\"\nx,\"\",\"1\"\n".to_vec());
    }

    #[test]
    fn test_escapes_in_ignored_field_are_counted() {
        let (result, _) = run(b"a,\tb\r\n", TranscodeOptions::redacting(2));
        assert_eq!(result.stats.escapes_added, 1);
        assert_eq!(result.output, b"a,\r\n".to_vec());
    }

    #[test]
    fn test_stats_byte_counts() {
        let (result, _) = run(b"a\tb\n", TranscodeOptions::escape_only());
        assert_eq!(result.stats.bytes_read, 4);
        assert_eq!(result.stats.bytes_written, 5);
        assert_eq!(result.stats.records, 1);
    }
}
