//! Embed pattern validation and classification
//!
//! A pattern is a slash-separated path relative to the package directory,
//! optionally prefixed with `all:`. Each element is either a literal name or a
//! shell-style glob (`*`, `?`, `[...]`, with `\` escaping the next character)
//! matched against a single directory entry, never across a `/`.

use wax::Glob;

/// Prefix that disables hidden-file exclusion for a pattern
pub const ALL_PREFIX: &str = "all:";

/// Characters wax treats specially outside character classes
const WAX_META: &[char] = &[
    '?', '*', '$', ':', '<', '>', '(', ')', '[', ']', '{', '}', ',', '\\',
];

/// One `/`-separated element of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// Contains an unescaped glob metacharacter
    pub meta: bool,
}

impl Segment<'_> {
    fn new(text: &str) -> Segment<'_> {
        let mut meta = false;
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '*' | '?' | '[' => {
                    meta = true;
                    break;
                }
                _ => {}
            }
        }
        Segment { text, meta }
    }

    /// The name this segment denotes when it has no metacharacters
    pub fn literal(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Whether the segment itself spells out a leading `.` or `_`
    ///
    /// Glob matches of such a segment were asked for by name and are kept
    /// even though they are hidden.
    pub fn names_hidden(&self) -> bool {
        self.text.starts_with('.') || self.text.starts_with('_')
    }

    /// Translate the glob into a wax expression
    pub fn to_wax(&self) -> Result<String, String> {
        let mut out = String::with_capacity(self.text.len() + 4);
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or("trailing backslash")?;
                    push_literal(&mut out, escaped);
                }
                '*' => {
                    // Runs of stars are one wildcard; none of them cross a separator
                    while chars.peek() == Some(&'*') {
                        chars.next();
                    }
                    out.push('*');
                }
                '?' => out.push('?'),
                '[' => translate_class(&mut chars, &mut out)?,
                _ => push_literal(&mut out, c),
            }
        }
        Ok(out)
    }
}

fn push_literal(out: &mut String, c: char) {
    if WAX_META.contains(&c) {
        out.push('\\');
    }
    out.push(c);
}

/// Read one class item, honoring `\` escapes; `-` and `]` must be escaped
fn class_char(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<char, String> {
    match chars.next() {
        None => Err("unterminated character class".to_string()),
        Some('-' | ']') => Err("malformed character class".to_string()),
        Some('\\') => chars
            .next()
            .ok_or_else(|| "unterminated character class".to_string()),
        Some(c) => Ok(c),
    }
}

/// One class item in wax syntax; wax has no escape for `\` inside a class
fn class_item(c: char) -> Result<String, String> {
    match c {
        '\\' => Err("backslash in character class".to_string()),
        '[' | ']' | '-' => Ok(format!("\\{c}")),
        _ => Ok(c.to_string()),
    }
}

/// Translate a `[...]` class (the `[` already consumed) into wax syntax
///
/// Only `^` negates; `!` is an ordinary member. Wax reads a leading `!` as
/// negation, so a non-negated class never starts with one.
fn translate_class(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) -> Result<(), String> {
    let negated = chars.peek() == Some(&'^');
    if negated {
        chars.next();
    }
    let mut items: Vec<(char, char)> = Vec::new();
    loop {
        if chars.peek() == Some(&']') && !items.is_empty() {
            chars.next();
            break;
        }
        let lo = class_char(chars)?;
        let mut hi = lo;
        if chars.peek() == Some(&'-') {
            chars.next();
            hi = class_char(chars)?;
            if hi < lo {
                return Err("inverted character range".to_string());
            }
        }
        items.push((lo, hi));
    }

    if !negated && items[0].0 == '!' {
        match items.iter().position(|&(lo, _)| lo != '!') {
            Some(idx) => items.swap(0, idx),
            None => match items.iter().position(|&(_, hi)| hi != '!') {
                // `!-x` becomes `"-x` plus `!`
                Some(idx) => {
                    items[idx].0 = '"';
                    items.swap(0, idx);
                    items.push(('!', '!'));
                }
                // `[!]` matches a lone `!`, which wax takes literally
                None => {
                    out.push('!');
                    return Ok(());
                }
            },
        }
    }

    out.push('[');
    if negated {
        out.push('!');
    }
    for (lo, hi) in items {
        out.push_str(&class_item(lo)?);
        if hi != lo {
            out.push('-');
            out.push_str(&class_item(hi)?);
        }
    }
    out.push(']');
    Ok(())
}

/// A validated pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPattern<'a> {
    /// The pattern as written, `all:` prefix included
    pub raw: &'a str,
    /// The path part, without the `all:` prefix
    pub glob: &'a str,
    /// Hidden files are included
    pub all: bool,
    segments: Vec<Segment<'a>>,
}

impl<'a> EmbedPattern<'a> {
    /// Validate a pattern, returning the reason it is rejected
    pub fn parse(raw: &'a str) -> Result<Self, String> {
        let (glob, all) = match raw.strip_prefix(ALL_PREFIX) {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        if glob.is_empty() {
            return Err("empty pattern".to_string());
        }
        if glob.starts_with('/') || std::path::Path::new(glob).is_absolute() {
            return Err("absolute path".to_string());
        }

        let mut segments = Vec::new();
        for text in glob.split('/') {
            match text {
                "" => return Err("empty path element".to_string()),
                "." => return Err("'.' path element".to_string()),
                ".." => return Err("parent directory reference".to_string()),
                _ => {}
            }
            let segment = Segment::new(text);
            let expr = segment.to_wax()?;
            if segment.meta {
                Glob::new(&expr).map_err(|e| e.to_string())?;
            }
            if !segment.meta && matches!(segment.literal().as_str(), "." | "..") {
                return Err("parent directory reference".to_string());
            }
            segments.push(segment);
        }

        Ok(Self {
            raw,
            glob,
            all,
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Whether any element is a glob
    pub fn has_meta(&self) -> bool {
        self.segments.iter().any(|s| s.meta)
    }
}
