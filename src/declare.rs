//! Embedded variable declarations
//!
//! Directives only take effect on the package-level `var` spec that follows
//! them. This module pairs each directive group with that spec and classifies
//! the variable by its declared type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::directive::{self, DirectiveGroup, PatternSet};
use crate::error::directive::{invalid_type, misplaced};
use crate::error::{EmbedError, ErrorList};
use crate::source::{DeclKind, Position, SourceFile};

/// What an embedded variable holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    /// `string`: contents of exactly one file
    String,
    /// `[]byte`: contents of exactly one file
    Bytes,
    /// `embed.FS`: a file tree
    Files,
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmbedKind::String => "string",
            EmbedKind::Bytes => "[]byte",
            EmbedKind::Files => "embed.FS",
        };
        f.write_str(name)
    }
}

/// A variable initialized from embedded files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedVar {
    pub name: String,
    pub kind: EmbedKind,
    /// Position of the declaration the directives attach to
    pub position: Position,
    pub patterns: PatternSet,
}

/// Classify a declared type given the local name of the `embed` import
fn embed_kind(ty: &str, embed_name: &str) -> Option<EmbedKind> {
    match ty {
        "string" => Some(EmbedKind::String),
        "[]byte" | "[]uint8" => Some(EmbedKind::Bytes),
        "FS" if embed_name == "." => Some(EmbedKind::Files),
        _ => ty
            .strip_suffix(".FS")
            .filter(|qualifier| *qualifier == embed_name && embed_name != "_")
            .map(|_| EmbedKind::Files),
    }
}

/// Collect the embedded variables of every file
///
/// Like directive parsing, a bad declaration is reported without hiding the
/// others; the error list is returned when any declaration failed.
pub fn check_embeds(files: &[SourceFile]) -> Result<Vec<EmbedVar>, ErrorList> {
    let mut errors = Vec::new();
    let mut vars = Vec::new();

    for file in files {
        let groups = directive::file_directives(file, &mut errors);
        if groups.is_empty() {
            continue;
        }
        let embed_name = match file.embed_import_name() {
            Ok(Some(name)) => name,
            Ok(None) => continue,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        attach_groups(file, &embed_name, groups, &mut vars, &mut errors);
    }

    tracing::debug!(vars = vars.len(), errors = errors.len(), "checked go:embed variables");

    if errors.is_empty() {
        Ok(vars)
    } else {
        Err(ErrorList::new(errors))
    }
}

fn attach_groups(
    file: &SourceFile,
    embed_name: &str,
    groups: Vec<DirectiveGroup>,
    vars: &mut Vec<EmbedVar>,
    errors: &mut Vec<EmbedError>,
) {
    // Consecutive directive groups before the same declaration merge into one variable
    let mut pending: Option<(usize, PatternSet)> = None;

    for group in groups {
        let directive_pos = file.position(group.offset + 2);
        let Some(decl_index) = file.decls.iter().position(|d| d.offset > group.offset) else {
            if let Some((index, set)) = pending.take() {
                finish_var(file, embed_name, index, set, vars, errors);
            }
            errors.push(misplaced(directive_pos));
            continue;
        };

        match &mut pending {
            Some((index, set)) if *index == decl_index => set.extend(group.directives),
            _ => {
                if let Some((index, set)) = pending.take() {
                    finish_var(file, embed_name, index, set, vars, errors);
                }
                let mut set = PatternSet::new();
                set.extend(group.directives);
                pending = Some((decl_index, set));
            }
        }
    }

    if let Some((index, set)) = pending {
        finish_var(file, embed_name, index, set, vars, errors);
    }
}

fn finish_var(
    file: &SourceFile,
    embed_name: &str,
    decl_index: usize,
    patterns: PatternSet,
    vars: &mut Vec<EmbedVar>,
    errors: &mut Vec<EmbedError>,
) {
    let decl = &file.decls[decl_index];
    let position = file.position(decl.offset);

    let spec = match &decl.kind {
        DeclKind::Var(spec) if !spec.local && spec.names.len() == 1 => spec,
        _ => {
            let first = patterns.iter().flat_map(|(_, p)| p).min().cloned();
            errors.push(misplaced(first.unwrap_or(position)));
            return;
        }
    };

    let ty = spec.ty.as_deref().unwrap_or("");
    let Some(kind) = embed_kind(ty, embed_name) else {
        errors.push(invalid_type(position, if ty.is_empty() { "<none>" } else { ty }));
        return;
    };

    vars.push(EmbedVar {
        name: spec.names[0].clone(),
        kind,
        position,
        patterns,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(src: &str) -> Result<Vec<EmbedVar>, ErrorList> {
        check_embeds(&[SourceFile::parse("embed_test.go", src)])
    }

    #[test]
    fn test_embed_vars_by_kind() {
        let src = r#"package goembed

import (
	"embed"
)

//go:embed testdata/data1.txt
var data1 string

var (
	//go:embed testdata/data2.txt
	data2 []byte

	//go:embed testdata
	//go:embed extra/*.txt
	fs embed.FS
)
"#;
        let vars = check(src).unwrap_or_default();
        let summary: Vec<_> = vars.iter().map(|v| (v.name.as_str(), v.kind)).collect();
        assert_eq!(summary, vec![
            ("data1", EmbedKind::String),
            ("data2", EmbedKind::Bytes),
            ("fs", EmbedKind::Files),
        ]);
        assert_eq!(vars[2].patterns.sorted(), vec!["extra/*.txt", "testdata"]);
        assert_eq!(vars[0].position.line, 8);
    }

    #[test]
    fn test_aliased_embed_import() {
        let src = "package a\nimport static \"embed\"\n//go:embed web\nvar site static.FS\n";
        let vars = check(src).unwrap_or_default();
        assert_eq!(vars[0].kind, EmbedKind::Files);
    }

    #[test]
    fn test_blank_import_cannot_declare_fs() {
        let src = "package a\nimport _ \"embed\"\n//go:embed web\nvar site embed.FS\n";
        let errors = check(src).err().unwrap_or_default();
        assert!(matches!(errors.errors[0], EmbedError::InvalidType { .. }));
    }

    #[test]
    fn test_misplaced_directives() {
        let src = r#"package a
import _ "embed"

//go:embed a.txt
func f() {}

//go:embed b.txt
var x, y string

func g() {
	//go:embed c.txt
	var local string
	_ = local
}

//go:embed d.txt
"#;
        let errors = check(src).err().unwrap_or_default();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| matches!(e, EmbedError::Misplaced { .. })));
        let lines: Vec<_> = errors.iter().filter_map(|e| e.position()).map(|p| p.line).collect();
        assert_eq!(lines, vec![4, 7, 11, 16]);
    }

    #[test]
    fn test_embed_kind_display() {
        assert_eq!(EmbedKind::Bytes.to_string(), "[]byte");
        assert_eq!(embed_kind("e.FS", "e"), Some(EmbedKind::Files));
        assert_eq!(embed_kind("int", "embed"), None);
    }
}
