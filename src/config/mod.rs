//! Configuration file handling for goembed
//!
//! This module contains data structures for:
//! - `goembed.yaml` - Hash profile selection, caching and deadlines

pub mod embed;

pub use embed::{CONFIG_FILE, EmbedConfig};
