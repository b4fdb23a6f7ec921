//! `//go:embed` directive parsing
//!
//! Scans the line comments of each [`SourceFile`] for `//go:embed` directives,
//! checks that the file imports `embed`, and splits each directive into
//! patterns with exact source positions. Results from all files are merged into
//! one [`PatternSet`].
//!
//! A bad directive only aborts itself: its error is collected in the
//! [`ParseReport`] and every other directive is still parsed.

pub mod grammar;
pub mod unquote;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::directive::capability_missing;
use crate::error::{EmbedError, ErrorList};
use crate::source::{Position, SourceFile};

/// Comment prefix introducing a directive
pub const DIRECTIVE_PREFIX: &str = "//go:embed ";

/// Offset of the `go:embed` marker within a directive comment
const MARKER_OFFSET: usize = 2;

/// A single pattern extracted from a directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub pattern: String,
    /// Position of the pattern itself, not of the directive
    pub position: Position,
}

/// The patterns of one directive comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveGroup {
    /// Byte offset of the `//` opening the comment
    pub offset: usize,
    pub directives: Vec<Directive>,
}

/// All patterns of a compilation unit, each with every position it appears at
///
/// Iteration follows the byte-wise order of the pattern strings, so it is the
/// same on every run for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    positions: BTreeMap<String, Vec<Position>>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns supplied without source positions
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        patterns
            .into_iter()
            .map(|p| Directive {
                pattern: p.into(),
                position: Position::unknown(),
            })
            .collect()
    }

    pub fn insert(&mut self, directive: Directive) {
        self.positions
            .entry(directive.pattern)
            .or_default()
            .push(directive.position);
    }

    /// Deduplicated patterns in byte-wise ascending order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    /// Sorted pattern list, as an owned canonical key
    pub fn sorted(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    /// Every position the pattern was written at, in source order
    pub fn positions(&self, pattern: &str) -> &[Position] {
        self.positions.get(pattern).map_or(&[], Vec::as_slice)
    }

    /// Position used to attribute diagnostics for the pattern
    pub fn position(&self, pattern: &str) -> Position {
        self.positions(pattern)
            .first()
            .cloned()
            .unwrap_or_else(Position::unknown)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Position])> {
        self.positions
            .iter()
            .map(|(p, positions)| (p.as_str(), positions.as_slice()))
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.positions.contains_key(pattern)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<Directive> for PatternSet {
    fn from_iter<T: IntoIterator<Item = Directive>>(iter: T) -> Self {
        let mut set = Self::new();
        for directive in iter {
            set.insert(directive);
        }
        set
    }
}

impl Extend<Directive> for PatternSet {
    fn extend<T: IntoIterator<Item = Directive>>(&mut self, iter: T) {
        for directive in iter {
            self.insert(directive);
        }
    }
}

/// Outcome of [`parse_directives`]
#[derive(Debug, Default)]
pub struct ParseReport {
    /// `None` when no file contains a valid directive
    pub patterns: Option<PatternSet>,
    pub errors: Vec<EmbedError>,
}

impl ParseReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with every collected error, or return the patterns
    pub fn into_result(self) -> Result<Option<PatternSet>, ErrorList> {
        if self.errors.is_empty() {
            Ok(self.patterns)
        } else {
            Err(ErrorList::new(self.errors))
        }
    }
}

/// Parse the directives of every file of a compilation unit
pub fn parse_directives(files: &[SourceFile]) -> ParseReport {
    let mut errors = Vec::new();
    let mut set = PatternSet::new();
    let mut directive_count = 0usize;

    for file in files {
        for group in file_directives(file, &mut errors) {
            directive_count += group.directives.len();
            set.extend(group.directives);
        }
    }

    tracing::debug!(
        files = files.len(),
        directives = directive_count,
        patterns = set.len(),
        errors = errors.len(),
        "parsed go:embed directives"
    );

    ParseReport {
        patterns: (!set.is_empty()).then_some(set),
        errors,
    }
}

/// Parse the directive comments of one file
///
/// Comments that fail to parse, or appear in a file without the `embed`
/// import, push an error and are left out of the result.
pub fn file_directives(file: &SourceFile, errors: &mut Vec<EmbedError>) -> Vec<DirectiveGroup> {
    let directive_comments: Vec<_> = file
        .comments
        .iter()
        .filter(|c| c.text.starts_with(DIRECTIVE_PREFIX))
        .collect();
    if directive_comments.is_empty() {
        return Vec::new();
    }

    let has_embed = match file.has_embed_import() {
        Ok(has_embed) => has_embed,
        Err(err) => {
            errors.push(err);
            return Vec::new();
        }
    };

    let mut groups = Vec::new();
    for comment in directive_comments {
        if !has_embed {
            errors.push(capability_missing(
                file.position(comment.offset + MARKER_OFFSET),
            ));
            continue;
        }
        let args_pos = file.position(comment.offset + DIRECTIVE_PREFIX.len());
        match grammar::parse_args(&comment.text[DIRECTIVE_PREFIX.len()..], args_pos) {
            Ok(directives) => groups.push(DirectiveGroup {
                offset: comment.offset,
                directives,
            }),
            Err(err) => errors.push(err),
        }
    }
    groups
}
