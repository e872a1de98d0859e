//! Shared types, error model, and configuration for the word-list builder.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`WordlistError`], the unified error type
//! - Domain types ([`SourcePin`], [`BuildProfile`], [`SourceLock`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], [`OutputLayout`], config loading)
//! - Atomic file writes ([`fs`])

pub mod config;
pub mod error;
pub mod fs;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildOverrides, CONFIG_FILE_NAME, GeneratorConfig, OutputLayout,
    config_file_path, load_config, load_config_from, normalize_sha256,
};
pub use error::{Result, WordlistError};
pub use types::{
    BuildProfile, DEFAULT_BRANCH, DEFAULT_COMMIT, DEFAULT_REPO, SourceLock, SourcePin,
    parse_spellings,
};
