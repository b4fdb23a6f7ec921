//! Quoting grammar of `//go:embed` arguments
//!
//! Arguments are whitespace-separated. Each one is either unquoted (up to the
//! next whitespace), back-quoted (raw, up to the next back quote) or
//! double-quoted (Go escapes). A quoted argument must be followed by
//! whitespace or the end of the line.

use super::{Directive, unquote};
use crate::error::EmbedError;
use crate::error::directive::malformed;
use crate::error::resolve::invalid_pattern;
use crate::source::Position;

/// Tracks the unparsed rest of the arguments and the position of its first byte
struct Cursor<'a> {
    rest: &'a str,
    pos: Position,
}

impl Cursor<'_> {
    /// Offsets advance by bytes, columns by characters.
    fn advance(&mut self, n: usize) {
        self.pos.offset += n;
        self.pos.column += self.rest[..n].chars().count();
        self.rest = &self.rest[n..];
    }

    fn skip_space(&mut self) {
        let trimmed = self.rest.trim_start();
        self.advance(self.rest.len() - trimmed.len());
    }

    fn error(&self, text: &str) -> EmbedError {
        malformed(self.pos.clone(), text)
    }
}

/// Split directive arguments into patterns
///
/// `start` is the position of the first byte of `args`.
pub fn parse_args(args: &str, start: Position) -> Result<Vec<Directive>, EmbedError> {
    let mut cursor = Cursor { rest: args, pos: start };
    let mut list = Vec::new();

    cursor.skip_space();
    while !cursor.rest.is_empty() {
        let pattern_pos = cursor.pos.clone();
        let pattern = match cursor.rest.as_bytes()[0] {
            b'`' => {
                let Some(end) = cursor.rest[1..].find('`') else {
                    return Err(cursor.error(cursor.rest));
                };
                let pattern = cursor.rest[1..=end].to_string();
                cursor.advance(end + 2);
                pattern
            }
            b'"' => {
                let end = closing_quote(cursor.rest).ok_or_else(|| cursor.error(cursor.rest))?;
                let literal = &cursor.rest[..=end];
                let bytes = unquote::unquote_bytes(literal).ok_or_else(|| cursor.error(literal))?;
                // Well-formed escapes that decode to non-UTF-8 make a bad pattern, not a bad directive
                let pattern = String::from_utf8(bytes).map_err(|e| {
                    let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
                    invalid_pattern(&pattern_pos, lossy, "invalid pattern syntax")
                })?;
                cursor.advance(end + 1);
                pattern
            }
            _ => {
                let end = cursor
                    .rest
                    .find(char::is_whitespace)
                    .unwrap_or(cursor.rest.len());
                let pattern = cursor.rest[..end].to_string();
                cursor.advance(end);
                pattern
            }
        };

        if cursor.rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            return Err(cursor.error(cursor.rest));
        }
        if pattern.chars().any(char::is_control) {
            return Err(malformed(pattern_pos, pattern));
        }

        list.push(Directive {
            pattern,
            position: pattern_pos,
        });
        cursor.skip_space();
    }

    Ok(list)
}

/// Byte index of the quote closing the double-quoted literal at the start of `s`
fn closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Position {
        Position::new("a.go", 100, 7, 12)
    }

    fn patterns(args: &str) -> Vec<String> {
        parse_args(args, start())
            .map(|list| list.into_iter().map(|d| d.pattern).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_unquoted_patterns_keep_glob_characters() {
        assert_eq!(patterns("a.txt  *.html  [ab]?.css"), vec![
            "a.txt", "*.html", "[ab]?.css"
        ]);
    }

    #[test]
    fn test_quoted_pattern_positions() {
        let list = parse_args("\"a b\" c", start()).unwrap_or_default();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].pattern, "a b");
        assert_eq!(list[0].position, Position::new("a.go", 100, 7, 12));
        assert_eq!(list[1].pattern, "c");
        assert_eq!(list[1].position, Position::new("a.go", 106, 7, 18));
    }

    #[test]
    fn test_backquoted_pattern_is_raw() {
        assert_eq!(patterns(r"`dir\x/a b` z"), vec![r"dir\x/a b", "z"]);
    }

    #[test]
    fn test_double_quoted_escapes_decoded() {
        assert_eq!(patterns(r#""space.txt" "q\"uote""#), vec![
            "space.txt",
            "q\"uote"
        ]);
    }

    #[test]
    fn test_columns_count_characters_offsets_count_bytes() {
        let list = parse_args("héllo wörld", start()).unwrap_or_default();
        assert_eq!(list[1].position.offset, 100 + "héllo ".len());
        assert_eq!(list[1].position.column, 12 + 6);
    }

    #[test]
    fn test_leading_and_trailing_space() {
        let list = parse_args("   x \t", start()).unwrap_or_default();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].position.offset, 103);
        assert!(parse_args("  ", start()).is_ok_and(|l| l.is_empty()));
    }

    #[test]
    fn test_malformed_directives() {
        for args in [
            "`unterminated",
            "\"unterminated",
            "\"bad\\q\"",
            "\"a\"b",
            "`a`b",
            "\"ctl\\n\"",
        ] {
            let result = parse_args(args, start());
            assert!(
                matches!(result, Err(EmbedError::MalformedDirective { .. })),
                "expected malformed directive for {args:?}"
            );
        }
    }

    #[test]
    fn test_non_utf8_escape_is_invalid_pattern() {
        let Err(EmbedError::InvalidPattern { pos, pattern, reason }) =
            parse_args("ok \"bad\\xff.txt\"", start())
        else {
            panic!("expected invalid pattern");
        };
        assert_eq!(pattern, "bad\u{fffd}.txt");
        assert_eq!(reason, "invalid pattern syntax");
        assert_eq!(pos.offset, 103);
        assert_eq!(pos.column, 15);
    }

    #[test]
    fn test_malformed_error_points_at_offending_text() {
        let Err(EmbedError::MalformedDirective { pos, text }) = parse_args("ok \"x\"y", start())
        else {
            panic!("expected malformed directive");
        };
        assert_eq!(text, "y");
        assert_eq!(pos.offset, 106);
    }
}
