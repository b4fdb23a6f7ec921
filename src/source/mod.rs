//! Syntax model of Go source files
//!
//! The directive parser does not parse Go itself. It consumes a [`SourceFile`]:
//! the imports, line comments and declarations of one file together with a
//! [`LineIndex`] for turning byte offsets into positions. Callers that own a
//! real Go parser can fill the model in directly; [`SourceFile::parse`] builds
//! it from source text with the lightweight [`scanner`].

pub mod scanner;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directive::unquote;
use crate::error::{EmbedError, Result};

/// A location in a source file
///
/// `line` and `column` are 1-based; `offset` is the 0-based byte offset.
/// A position with `line == 0` is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            offset,
            line,
            column,
        }
    }

    /// Position with no source location, used for patterns supplied programmatically
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.file.is_empty(), self.is_valid()) {
            (true, false) => write!(f, "-"),
            (false, false) => write!(f, "{}", self.file),
            (true, true) => write!(f, "{}:{}", self.line, self.column),
            (false, true) => write!(f, "{}:{}:{}", self.file, self.line, self.column),
        }
    }
}

/// Byte offsets of line starts, for offset to line/column conversion
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            src.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line (1-based) containing `offset`
    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// Position of `offset`; the column counts bytes from the line start
    pub fn position(&self, file: &str, offset: usize) -> Position {
        let line = self.line(offset);
        let start = self.line_starts[line - 1];
        Position::new(file, offset, line, offset - start + 1)
    }
}

/// An import spec such as `_ "embed"` or `e "embed"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`_`, `.`, or an identifier) when one is given
    pub name: Option<String>,
    /// The path literal exactly as written, quotes included
    pub path: String,
    pub offset: usize,
}

/// A comment; `text` starts with `//` or `/*` and excludes the trailing newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub offset: usize,
    pub text: String,
}

/// A variable spec from a `var` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    pub names: Vec<String>,
    /// Declared type with whitespace removed, e.g. `[]byte` or `embed.FS`
    pub ty: Option<String>,
    /// True when declared inside a function body
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Var(VarSpec),
    /// `var (` opening a group; its specs follow as separate declarations
    VarGroup,
    /// Any other declaration keyword (`const`, `type`, `func`, `import`)
    Other(String),
}

/// A declaration anchor: the first token of a declaration or of a grouped spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub offset: usize,
    pub kind: DeclKind,
}

/// The parts of a Go file the directive parser needs
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub name: String,
    pub imports: Vec<ImportSpec>,
    pub comments: Vec<Comment>,
    pub decls: Vec<Decl>,
    pub lines: LineIndex,
}

impl SourceFile {
    /// Build the syntax model from Go source text
    pub fn parse(name: impl Into<String>, src: &str) -> Self {
        let name = name.into();
        let scanned = scanner::scan(src);
        tracing::trace!(
            file = %name,
            comments = scanned.comments.len(),
            decls = scanned.decls.len(),
            "scanned go source"
        );
        Self {
            name,
            imports: scanned.imports,
            comments: scanned.comments,
            decls: scanned.decls,
            lines: LineIndex::new(src),
        }
    }

    /// Read and parse a Go file from disk
    pub fn read(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| crate::error::fs::read_failed(path, &e))?;
        Ok(Self::parse(path.display().to_string(), &src))
    }

    pub fn position(&self, offset: usize) -> Position {
        self.lines.position(&self.name, offset)
    }

    /// Local name under which the `embed` package is imported, if it is
    ///
    /// An unnamed import yields `embed`; `_` and `.` imports yield those names.
    pub fn embed_import_name(&self) -> Result<Option<String>> {
        for spec in &self.imports {
            let path = unquote::unquote(&spec.path).ok_or_else(|| EmbedError::InvalidImport {
                pos: self.position(spec.offset),
                literal: spec.path.clone(),
            })?;
            if path == "embed" {
                return Ok(Some(
                    spec.name.clone().unwrap_or_else(|| "embed".to_string()),
                ));
            }
        }
        Ok(None)
    }

    /// Whether the file imports `embed`, which directives require
    pub fn has_embed_import(&self) -> Result<bool> {
        Ok(self.embed_import_name()?.is_some())
    }
}
