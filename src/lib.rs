//! goembed - resolve `//go:embed` directives
//!
//! Reproduces what the Go toolchain embeds for a package without running it:
//! the directives of a set of source files are parsed into a [`PatternSet`],
//! the patterns are resolved against the package directory, and the matched
//! files are hashed into a [`Bundle`] laid out like the runtime's own
//! embedded filesystem.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use goembed::{EmbedConfig, SourceFile, parse_directives, resolve_bundle};
//!
//! # fn main() -> miette::Result<()> {
//! let file = SourceFile::read(Path::new("web/assets.go"))?;
//! let report = parse_directives(&[file]);
//! if let Some(patterns) = report.into_result()? {
//!     let bundle = resolve_bundle(Path::new("web"), &patterns, &EmbedConfig::for_runtime("go1.22"))?;
//!     for entry in bundle.entries() {
//!         println!("{} {}", entry.hash, entry.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod cache;
pub mod config;
pub mod declare;
pub mod directive;
pub mod error;
pub mod hash;
pub mod path_utils;
pub mod resolver;
pub mod source;

#[cfg(test)]
mod test_fixtures;

use std::path::Path;
use std::sync::Arc;

pub use bundle::{Bundle, BundleEntry, DirEntry, build};
pub use cache::{BundleCache, CacheKey};
pub use config::EmbedConfig;
pub use declare::{EmbedKind, EmbedVar, check_embeds};
pub use directive::{Directive, ParseReport, PatternSet, parse_directives};
pub use error::{EmbedError, ErrorList, Result};
pub use hash::{ContentHash, HashProfile};
pub use resolver::{LoadOptions, ResolvedFile, Resolver};
pub use source::{Position, SourceFile};

/// Resolve a pattern set and build its bundle
///
/// The hash profile comes from `config`; with caching enabled the bundle is
/// memoized in [`BundleCache::global`] for the rest of the process.
///
/// # Errors
///
/// Fails when the configuration selects no hash profile or when any pattern
/// fails to resolve.
pub fn resolve_bundle(base: &Path, patterns: &PatternSet, config: &EmbedConfig) -> Result<Arc<Bundle>> {
    let profile = config.hash_profile()?;
    let resolver = Resolver::with_options(config.load_options());
    let make = || resolver.load(base, patterns).map(|files| bundle::build(files, profile));

    if config.cache {
        BundleCache::global().get_or_build(CacheKey::new(base, patterns, profile), make)
    } else {
        make().map(Arc::new)
    }
}
