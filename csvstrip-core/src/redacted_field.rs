// csvstrip-core/src/redacted_field.rs
//! The record handed to a sink, plus logging helpers that keep redacted
//! content out of debug logs unless explicitly allowed.

use lazy_static::lazy_static;
use log::debug;
use serde::{Serialize, Serializer};

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("CSVSTRIP_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// The content of the ignored field for one record, keyed by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedField {
    pub line_number: u64,
    #[serde(serialize_with = "lossy_utf8")]
    pub content: Vec<u8>,
}

impl RedactedField {
    pub fn new(line_number: u64, content: Vec<u8>) -> Self {
        Self { line_number, content }
    }

    /// The content as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_forwarded_field_debug(module_path: &str, field: &RedactedField) {
    debug!(
        "{} Forwarding redacted field for line {}: '{}'",
        module_path,
        field.line_number,
        get_loggable_content(&field.text())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_serializes_content_as_text() {
        let field = RedactedField::new(3, b"SECRET".to_vec());
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"line_number":3,"content":"SECRET"}"#);
    }

    #[test]
    fn test_text_replaces_invalid_utf8() {
        let field = RedactedField::new(1, vec![b'a', 0xFF]);
        assert_eq!(field.text(), "a\u{FFFD}");
    }
}
