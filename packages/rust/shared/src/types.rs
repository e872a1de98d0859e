//! Core domain types for the word-list build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WordlistError};

/// Upstream SCOWL repository.
pub const DEFAULT_REPO: &str = "https://github.com/en-wl/wordlist";

/// Branch the pinned commit was taken from.
pub const DEFAULT_BRANCH: &str = "v2";

/// v2 head the defaults are pinned to (2026-01-17).
pub const DEFAULT_COMMIT: &str = "744c092883db13112f6680892850c1f1b6547b81";

// ---------------------------------------------------------------------------
// SourcePin
// ---------------------------------------------------------------------------

/// The pinned upstream revision the word list is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePin {
    /// Repository URL (GitHub-style, serves `/archive/<commit>.tar.gz`).
    #[serde(default = "default_repo")]
    pub repo: String,
    /// Branch name, recorded for provenance only.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Full or abbreviated commit hash.
    #[serde(default = "default_commit")]
    pub commit: String,
}

impl Default for SourcePin {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            branch: default_branch(),
            commit: default_commit(),
        }
    }
}

fn default_repo() -> String {
    DEFAULT_REPO.into()
}
fn default_branch() -> String {
    DEFAULT_BRANCH.into()
}
fn default_commit() -> String {
    DEFAULT_COMMIT.into()
}

impl SourcePin {
    /// Archive URL for the pinned commit: `<repo>/archive/<commit>.tar.gz`.
    pub fn archive_url(&self) -> Result<Url> {
        let raw = format!(
            "{}/archive/{}.tar.gz",
            self.repo.trim_end_matches('/'),
            self.commit
        );
        Url::parse(&raw)
            .map_err(|e| WordlistError::config(format!("invalid archive URL '{raw}': {e}")))
    }

    /// File name of the cached archive, keyed by commit.
    pub fn archive_file_name(&self) -> String {
        format!("wordlist-{}.tar.gz", self.commit)
    }

    /// Directory name of the extracted tree, keyed by commit.
    pub fn source_dir_name(&self) -> String {
        format!("wordlist-{}", self.commit)
    }
}

// ---------------------------------------------------------------------------
// BuildProfile
// ---------------------------------------------------------------------------

/// Generator settings for a single build. Fully determines the output set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildProfile {
    /// SCOWL size (10..95, larger means more obscure words).
    pub size: u32,
    /// Ordered spelling codes (`A` American, `B` British, ...).
    pub spellings: Vec<String>,
    /// Variant level passed through to the generator.
    pub variant_level: u32,
}

impl Default for BuildProfile {
    fn default() -> Self {
        Self {
            size: 80,
            spellings: parse_spellings("A,B,Z,C,D"),
            variant_level: 5,
        }
    }
}

impl BuildProfile {
    /// Spellings as the single comma-joined argument the generator expects.
    pub fn spellings_arg(&self) -> String {
        self.spellings.join(",")
    }
}

/// Split a comma-separated spellings list, trimming and dropping empty segments.
pub fn parse_spellings(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// SourceLock
// ---------------------------------------------------------------------------

/// Last verified archive identity, stored in `source.lock.json`.
///
/// Only ever written wholesale; a changed pin produces a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLock {
    pub commit: String,
    pub sha256: String,
    pub archive_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl SourceLock {
    /// New record bound to the given pin, stamped now.
    pub fn new(commit: &str, sha256: &str, archive_url: &Url) -> Self {
        Self {
            commit: commit.to_string(),
            sha256: sha256.to_string(),
            archive_url: archive_url.to_string(),
            recorded_at: Some(Utc::now()),
        }
    }

    /// Whether this record was made for the same commit and archive URL.
    pub fn matches(&self, commit: &str, archive_url: &Url) -> bool {
        self.commit == commit && self.archive_url == archive_url.as_str()
    }
}
