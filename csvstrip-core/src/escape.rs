//! The escape table shared by the transcoder and its inverse.
//!
//! Every escape is two bytes: the escape character `\` followed by a code.
//! The table is fixed; delimiter, quote and escape bytes are not configurable.

pub const DELIMITER: u8 = b',';
pub const QUOTE: u8 = b'"';
pub const ESCAPE: u8 = b'\\';

/// Returns the code for a byte that is escaped no matter the quote context.
pub fn always_escaped(b: u8) -> Option<u8> {
    match b {
        b'\\' => Some(b'b'),
        0x0B => Some(b'v'),
        b'\t' => Some(b't'),
        0x0C => Some(b'f'),
        _ => None,
    }
}

/// Returns the code for a byte that is escaped only inside quotes.
///
/// The quote byte itself is not listed: whether it is escaped depends on
/// lookahead and is decided by the scanner.
pub fn quoted_escape(b: u8) -> Option<u8> {
    match b {
        b'\r' => Some(b'r'),
        b'\n' => Some(b'n'),
        DELIMITER => Some(DELIMITER),
        _ => None,
    }
}

/// Maps an escape code back to the raw byte it stands for.
pub fn decode(code: u8) -> Option<u8> {
    match code {
        b'b' => Some(b'\\'),
        b'v' => Some(0x0B),
        b't' => Some(b'\t'),
        b'f' => Some(0x0C),
        b'r' => Some(b'\r'),
        b'n' => Some(b'\n'),
        DELIMITER => Some(DELIMITER),
        QUOTE => Some(QUOTE),
        _ => None,
    }
}

/// Reverses the escape table over a transcoded buffer.
///
/// Unknown escape codes and a trailing lone `\` are kept as-is.
pub fn unescape(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b != ESCAPE {
            out.push(b);
            continue;
        }
        match bytes.peek().copied().and_then(decode) {
            Some(raw) => {
                out.push(raw);
                bytes.next();
            }
            None => out.push(b),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_decodes_to_its_byte() {
        for raw in [b'\\', 0x0B, b'\t', 0x0C] {
            let code = always_escaped(raw).unwrap();
            assert_eq!(decode(code), Some(raw));
        }
        for raw in [b'\r', b'\n', b','] {
            let code = quoted_escape(raw).unwrap();
            assert_eq!(decode(code), Some(raw));
        }
        assert_eq!(decode(QUOTE), Some(QUOTE));
    }

    #[test]
    fn test_unescape_restores_control_bytes() {
        assert_eq!(unescape(br#"a\tb\bc\"d\,e\r\nf"#), b"a\tb\\c\"d,e\r\nf".to_vec());
    }

    #[test]
    fn test_unescape_keeps_unknown_and_trailing_escape() {
        assert_eq!(unescape(br"\x"), br"\x".to_vec());
        assert_eq!(unescape(br"abc\"), br"abc\".to_vec());
    }

    #[test]
    fn test_plain_bytes_are_not_escaped() {
        assert_eq!(always_escaped(b'a'), None);
        assert_eq!(quoted_escape(b'"'), None);
    }
}
