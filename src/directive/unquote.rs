//! Go string literal decoding
//!
//! Double-quoted literals follow the Go escape rules (`\n`, `\x41`, `\101`,
//! `\u00e9`, `\U0001F600`, ...); `\'` is not allowed. Back-quoted literals are
//! raw, with carriage returns discarded. Octal and hex escapes produce single
//! bytes, so a well-formed literal may decode to bytes that are not UTF-8.

/// Decode a quoted Go string literal, quotes included
///
/// Returns `None` when the literal is not well formed or does not decode to
/// UTF-8.
pub fn unquote(literal: &str) -> Option<String> {
    unquote_bytes(literal).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Decode a quoted Go string literal into raw bytes
///
/// Returns `None` only when the literal is not well formed.
pub fn unquote_bytes(literal: &str) -> Option<Vec<u8>> {
    if literal.len() < 2 {
        return None;
    }
    let bytes = literal.as_bytes();
    let (open, close) = (bytes[0], bytes[bytes.len() - 1]);
    if open != close || !matches!(open, b'"' | b'`') {
        return None;
    }
    let body = &literal[1..literal.len() - 1];
    match open {
        b'`' => {
            if body.contains('`') {
                return None;
            }
            Some(body.replace('\r', "").into_bytes())
        }
        _ => unquote_interpreted(body),
    }
}

fn unquote_interpreted(body: &str) -> Option<Vec<u8>> {
    if !body.contains('\\') {
        if body.contains('"') || body.contains('\n') {
            return None;
        }
        return Some(body.as_bytes().to_vec());
    }

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => decode_escape(&mut chars, &mut out)?,
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Some(out)
}

fn decode_escape(chars: &mut std::str::Chars<'_>, out: &mut Vec<u8>) -> Option<()> {
    let simple = |b: u8, out: &mut Vec<u8>| {
        out.push(b);
        Some(())
    };
    match chars.next()? {
        'a' => simple(0x07, out),
        'b' => simple(0x08, out),
        'f' => simple(0x0c, out),
        'n' => simple(b'\n', out),
        'r' => simple(b'\r', out),
        't' => simple(b'\t', out),
        'v' => simple(0x0b, out),
        '\\' => simple(b'\\', out),
        '"' => simple(b'"', out),
        'x' => {
            let value = take_digits(chars, 2, 16)?;
            simple(u8::try_from(value).ok()?, out)
        }
        'u' => push_rune(take_digits(chars, 4, 16)?, out),
        'U' => push_rune(take_digits(chars, 8, 16)?, out),
        first @ '0'..='7' => {
            let rest = take_digits(chars, 2, 8)?;
            let value = first.to_digit(8)? * 64 + rest;
            simple(u8::try_from(value).ok()?, out)
        }
        _ => None,
    }
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

fn push_rune(value: u32, out: &mut Vec<u8>) -> Option<()> {
    let c = char::from_u32(value)?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_plain() {
        assert_eq!(unquote("\"embed\"").as_deref(), Some("embed"));
        assert_eq!(unquote("`embed`").as_deref(), Some("embed"));
        assert_eq!(unquote("\"\"").as_deref(), Some(""));
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(unquote(r#""\x41\102é""#).as_deref(), Some("ABé"));
        assert_eq!(unquote(r#""\U0001F600""#).as_deref(), Some("😀"));
        assert_eq!(unquote(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(unquote(r#""a\\b""#).as_deref(), Some("a\\b"));
    }

    #[test]
    fn test_unquote_raw_drops_carriage_returns() {
        assert_eq!(unquote("`a\r\nb`").as_deref(), Some("a\nb"));
        assert_eq!(unquote("`a\\nb`").as_deref(), Some("a\\nb"));
    }

    #[test]
    fn test_unquote_rejects_malformed() {
        assert_eq!(unquote("\"abc"), None);
        assert_eq!(unquote("abc"), None);
        assert_eq!(unquote("\""), None);
        assert_eq!(unquote(r#""\q""#), None);
        assert_eq!(unquote(r#""\'""#), None);
        assert_eq!(unquote(r#""\x4""#), None);
        assert_eq!(unquote(r#""\400""#), None);
        assert_eq!(unquote(r#""\uD800""#), None);
        assert_eq!(unquote("\"a\nb\""), None);
    }

    #[test]
    fn test_byte_escapes_may_leave_utf8() {
        assert_eq!(unquote_bytes(r#""a\xffb""#), Some(vec![b'a', 0xff, b'b']));
        assert_eq!(unquote_bytes(r#""\377""#), Some(vec![0xff]));
        assert_eq!(unquote(r#""\xff""#), None);
        assert_eq!(unquote_bytes(r#""\xc3\xa9""#), Some("é".as_bytes().to_vec()));
    }
}
