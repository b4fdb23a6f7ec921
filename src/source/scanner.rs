//! Lightweight Go scanner
//!
//! Extracts comments, imports and declaration anchors from Go source text.
//! It is not a Go parser: it understands just enough of the lexical grammar
//! (strings, raw strings, runes, comments, brackets) to find `import` specs and
//! the declarations that `//go:embed` directives attach to. Malformed input
//! never fails; an unterminated literal simply runs to the end of its line.

use super::{Comment, Decl, DeclKind, ImportSpec, VarSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Literal,
    Punct,
    Newline,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    offset: usize,
}

impl Token<'_> {
    fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    fn is_separator(&self) -> bool {
        self.kind == TokenKind::Newline || self.is_punct(";")
    }
}

/// Output of [`scan`]
#[derive(Debug, Default)]
pub struct Scanned {
    pub imports: Vec<ImportSpec>,
    pub comments: Vec<Comment>,
    pub decls: Vec<Decl>,
}

/// Scan Go source text
pub fn scan(src: &str) -> Scanned {
    let (tokens, comments) = tokenize(src);
    let mut parser = DeclParser {
        tokens,
        i: 0,
        depth: 0,
        imports: Vec::new(),
        decls: Vec::new(),
    };
    parser.run();
    Scanned {
        imports: parser.imports,
        comments,
        decls: parser.decls,
    }
}

fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn push<'a>(tokens: &mut Vec<Token<'a>>, src: &'a str, kind: TokenKind, start: usize, end: usize) {
    tokens.push(Token {
        kind,
        text: &src[start..end],
        offset: start,
    });
}

fn tokenize(src: &str) -> (Vec<Token<'_>>, Vec<Comment>) {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\n' => {
                push(&mut tokens, src, TokenKind::Newline, i, i + 1);
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = src[i..].find('\n').map_or(bytes.len(), |p| i + p);
                comments.push(Comment {
                    offset: i,
                    text: src[i..end].trim_end_matches('\r').to_string(),
                });
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                let text = &src[i..end];
                comments.push(Comment {
                    offset: i,
                    text: text.to_string(),
                });
                // A block comment spanning lines acts as a newline
                if text.contains('\n') {
                    push(&mut tokens, src, TokenKind::Newline, i, i);
                }
                i = end;
            }
            b'"' | b'\'' => {
                let end = quoted_end(bytes, i, b);
                push(&mut tokens, src, TokenKind::Literal, i, end);
                i = end;
            }
            b'`' => {
                let end = src[i + 1..].find('`').map_or(bytes.len(), |p| i + 1 + p + 1);
                push(&mut tokens, src, TokenKind::Literal, i, end);
                i = end;
            }
            b'0'..=b'9' => {
                let len = src[i..]
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(bytes.len() - i);
                push(&mut tokens, src, TokenKind::Literal, i, i + len);
                i += len;
            }
            _ => {
                let c = src[i..].chars().next().unwrap_or('\0');
                if c == '_' || c.is_alphabetic() {
                    let len = src[i..]
                        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                        .unwrap_or(bytes.len() - i);
                    push(&mut tokens, src, TokenKind::Ident, i, i + len);
                    i += len;
                } else {
                    let len = c.len_utf8();
                    push(&mut tokens, src, TokenKind::Punct, i, i + len);
                    i += len;
                }
            }
        }
    }

    (tokens, comments)
}

struct DeclParser<'a> {
    tokens: Vec<Token<'a>>,
    i: usize,
    depth: usize,
    imports: Vec<ImportSpec>,
    decls: Vec<Decl>,
}

impl<'a> DeclParser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.i).copied()
    }

    fn bump(&mut self) {
        self.i += 1;
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(|t| t.is_separator()) {
            self.bump();
        }
    }

    fn run(&mut self) {
        while let Some(tok) = self.peek() {
            self.bump();
            match (tok.kind, tok.text) {
                (TokenKind::Ident, "import") if self.depth == 0 => {
                    self.decls.push(Decl {
                        offset: tok.offset,
                        kind: DeclKind::Other("import".to_string()),
                    });
                    self.import_decl();
                }
                (TokenKind::Ident, "var") => self.var_decl(tok.offset),
                (TokenKind::Ident, keyword @ ("const" | "type" | "func")) => {
                    self.decls.push(Decl {
                        offset: tok.offset,
                        kind: DeclKind::Other(keyword.to_string()),
                    });
                }
                (TokenKind::Punct, "{" | "(" | "[") => self.depth += 1,
                (TokenKind::Punct, "}" | ")" | "]") => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    fn import_decl(&mut self) {
        if !self.peek().is_some_and(|t| t.is_punct("(")) {
            self.import_spec();
            return;
        }
        self.bump();
        loop {
            self.skip_separators();
            match self.peek() {
                None => break,
                Some(t) if t.is_punct(")") => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let before = self.i;
                    self.import_spec();
                    if self.i == before {
                        self.bump();
                    }
                }
            }
        }
    }

    fn import_spec(&mut self) {
        let mut name = None;
        if let Some(t) = self.peek() {
            if t.kind == TokenKind::Ident || t.is_punct(".") {
                name = Some(t.text.to_string());
                self.bump();
            }
        }
        if let Some(t) = self.peek() {
            if t.kind == TokenKind::Literal && (t.text.starts_with('"') || t.text.starts_with('`'))
            {
                self.imports.push(ImportSpec {
                    name,
                    path: t.text.to_string(),
                    offset: t.offset,
                });
                self.bump();
            }
        }
    }

    fn var_decl(&mut self, keyword_offset: usize) {
        match self.peek() {
            Some(t) if t.is_punct("(") => {
                self.decls.push(Decl {
                    offset: keyword_offset,
                    kind: DeclKind::VarGroup,
                });
                self.bump();
                loop {
                    self.skip_separators();
                    match self.peek() {
                        None => break,
                        Some(t) if t.is_punct(")") => {
                            self.bump();
                            break;
                        }
                        Some(t) if t.kind == TokenKind::Ident => self.var_spec(t.offset),
                        Some(_) => self.bump(),
                    }
                }
            }
            Some(t) if t.kind == TokenKind::Ident => self.var_spec(keyword_offset),
            _ => {}
        }
    }

    fn var_spec(&mut self, anchor: usize) {
        let local = self.depth > 0;
        let mut names = Vec::new();
        while let Some(t) = self.peek() {
            if t.kind != TokenKind::Ident {
                break;
            }
            names.push(t.text.to_string());
            self.bump();
            if self.peek().is_some_and(|t| t.is_punct(",")) {
                self.bump();
            } else {
                break;
            }
        }

        let ty = self.take_until_spec_end(true);
        if self.peek().is_some_and(|t| t.is_punct("=")) {
            self.bump();
            self.take_until_spec_end(false);
        }

        self.decls.push(Decl {
            offset: anchor,
            kind: DeclKind::Var(VarSpec {
                names,
                ty: (!ty.is_empty()).then_some(ty),
                local,
            }),
        });
    }

    /// Consume tokens up to the end of the current spec, returning their text
    ///
    /// With `stop_at_assign` the type part ends at `=`.
    fn take_until_spec_end(&mut self, stop_at_assign: bool) -> String {
        let mut text = String::new();
        let mut nesting = 0usize;
        while let Some(t) = self.peek() {
            if nesting == 0
                && (t.is_separator() || t.is_punct(")") || (stop_at_assign && t.is_punct("=")))
            {
                break;
            }
            match (t.kind, t.text) {
                (TokenKind::Punct, "(" | "[" | "{") => nesting += 1,
                (TokenKind::Punct, ")" | "]" | "}") => nesting = nesting.saturating_sub(1),
                (TokenKind::Newline, _) => {
                    self.bump();
                    continue;
                }
                _ => {}
            }
            text.push_str(t.text);
            self.bump();
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"package goembed

import (
	"embed"
	"fmt" // trailing
)

/* block
comment */

//go:embed testdata/data1.txt
var data1 string

var (
	//go:embed testdata/data2.txt
	data2 []byte

	//go:embed testdata
	fs embed.FS

	a, b = 1, func() int { return 2 }()
)

func main() {
	var local = "//not a comment"
	fmt.Println(local, '"')
}
"#;

    fn var_specs(scanned: &Scanned) -> Vec<&VarSpec> {
        scanned
            .decls
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Var(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scan_imports() {
        let scanned = scan(SAMPLE);
        let paths: Vec<_> = scanned.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["\"embed\"", "\"fmt\""]);
        assert!(scanned.imports.iter().all(|i| i.name.is_none()));
    }

    #[test]
    fn test_scan_comments_skip_string_contents() {
        let scanned = scan(SAMPLE);
        let texts: Vec<_> = scanned.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "// trailing",
                "/* block\ncomment */",
                "//go:embed testdata/data1.txt",
                "//go:embed testdata/data2.txt",
                "//go:embed testdata",
            ]
        );
        let first = &scanned.comments[2];
        assert_eq!(&SAMPLE[first.offset..first.offset + 2], "//");
    }

    #[test]
    fn test_scan_var_specs() {
        let scanned = scan(SAMPLE);
        let vars = var_specs(&scanned);
        assert_eq!(vars.len(), 5);
        assert_eq!(vars[0].names, vec!["data1"]);
        assert_eq!(vars[0].ty.as_deref(), Some("string"));
        assert_eq!(vars[1].ty.as_deref(), Some("[]byte"));
        assert_eq!(vars[2].ty.as_deref(), Some("embed.FS"));
        assert_eq!(vars[3].names, vec!["a", "b"]);
        assert_eq!(vars[3].ty, None);
        assert!(!vars[3].local);
        assert_eq!(vars[4].names, vec!["local"]);
        assert!(vars[4].local);
    }

    #[test]
    fn test_scan_decl_anchor_order() {
        let scanned = scan(SAMPLE);
        let offsets: Vec<_> = scanned.decls.iter().map(|d| d.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
        assert!(scanned
            .decls
            .iter()
            .any(|d| d.kind == DeclKind::Other("func".to_string())));
        assert!(scanned.decls.iter().any(|d| d.kind == DeclKind::VarGroup));
    }

    #[test]
    fn test_scan_named_and_unterminated_imports() {
        let scanned = scan("package a\nimport e \"embed\"\nimport _ \"unterminated\n");
        assert_eq!(scanned.imports.len(), 2);
        assert_eq!(scanned.imports[0].name.as_deref(), Some("e"));
        assert_eq!(scanned.imports[1].path, "\"unterminated");
    }
}
