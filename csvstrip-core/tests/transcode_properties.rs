// csvstrip-core/tests/transcode_properties.rs
//! End-to-end properties of the transcoder, exercised through the public API.

use anyhow::Result;
use csvstrip_core::{
    headless_transcode, headless_transcode_collect, unescape, FieldSink, JsonLinesSink, RedactedField,
    TranscodeOptions, Transcoder,
};

const MESSY: &[u8] = b"id,title,notes,owner\r\n\
1,plain,\"multi\r\nline\",ann\r\n\
2,\"has, comma\",\"tab\there\",bob\r\n\
3,back\\slash,\"she said \"no\" loudly\",cy\r\n\
4,ff\x0cvt\x0b,,dee\r\n";

#[test_log::test]
fn test_same_input_yields_identical_output() {
    let options = TranscodeOptions::redacting(3);
    let first = headless_transcode(MESSY, options.clone());
    let second = headless_transcode(MESSY, options);
    assert_eq!(first, second);
}

#[test_log::test]
fn test_unescape_restores_escape_only_output() {
    let result = headless_transcode(MESSY, TranscodeOptions::escape_only());
    assert_eq!(unescape(&result.output), MESSY.to_vec());
    assert!(!result.output.contains(&b'\t'));
    assert!(!result.output.contains(&0x0c));
    assert!(!result.output.contains(&0x0b));
}

#[test_log::test]
fn test_every_output_line_is_one_record() {
    let result = headless_transcode(MESSY, TranscodeOptions::escape_only());
    let text = String::from_utf8(result.output).unwrap();
    assert_eq!(text.matches("\r\n").count(), 5);
    assert_eq!(result.stats.records, 5);
}

#[test_log::test]
fn test_redacting_notes_column() {
    let (result, fields) = headless_transcode_collect(MESSY, TranscodeOptions::redacting(3));
    let expected: &[u8] = b"id,title,,owner\r\n\
1,plain,\"\",ann\r\n\
2,\"has\\, comma\",\"\",bob\r\n\
3,back\\bslash,\"\",cy\r\n\
4,ff\\fvt\\v,,dee\r\n";
    assert_eq!(result.output, expected.to_vec());

    let texts: Vec<(u64, String)> = fields.iter().map(|f| (f.line_number, f.text())).collect();
    assert_eq!(
        texts,
        vec![
            (0, "notes".to_string()),
            (1, r"multi\r\nline".to_string()),
            (2, r"tab\there".to_string()),
            (3, r#"she said \"no\" loudly"#.to_string()),
            (4, String::new()),
        ]
    );
    assert_eq!(result.stats.sink_calls, 5);
}

#[test_log::test]
fn test_jsonl_sink_receives_each_record_once() -> Result<()> {
    let mut sink = JsonLinesSink::new(Vec::new());
    let result = Transcoder::new(TranscodeOptions::redacting(2)).transcode(b"h,x\r\na,SECRET\r\n", &mut sink);
    assert_eq!(result.output, b"h,\r\na,\r\n".to_vec());

    let written = String::from_utf8(sink.finish()?)?;
    assert_eq!(
        written,
        "{\"line_number\":0,\"content\":\"x\"}\n{\"line_number\":1,\"content\":\"SECRET\"}\n"
    );
    Ok(())
}

#[test_log::test]
fn test_sink_keys_strictly_increase() {
    let mut keys = Vec::new();
    let mut sink = |f: RedactedField| -> Result<()> {
        keys.push(f.line_number);
        Ok(())
    };
    let options = TranscodeOptions { line_key_offset: 0, ..TranscodeOptions::redacting(4) };
    Transcoder::new(options).transcode(MESSY, &mut sink as &mut dyn FieldSink);
    assert_eq!(keys, vec![1, 2, 3, 4, 5]);
}
