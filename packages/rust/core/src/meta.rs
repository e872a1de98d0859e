//! `dict.meta.json`: build provenance and word-list statistics.
//!
//! The document is read-modify-write. Only `source`, `profile` and `stats`
//! are replaced; every other top-level key survives untouched, and
//! `artifacts.dawgFile` is only filled in when missing.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use wordlist_shared::{BuildProfile, Result, SourcePin, WordlistError, fs};

use crate::normalize::NORMALIZATION_METHOD;

/// Default DAWG file name recorded on the first run.
pub const DEFAULT_DAWG_FILE: &str = "dict.dawg";

/// Word class set the profile draws from.
const WORD_CLASSES: &str = "core";

/// `source` section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSection {
    pub repo: String,
    pub branch: String,
    pub commit: String,
    pub archive_url: String,
    pub sha256: String,
}

impl SourceSection {
    pub fn new(pin: &SourcePin, archive_url: &str, sha256: &str) -> Self {
        Self {
            repo: pin.repo.clone(),
            branch: pin.branch.clone(),
            commit: pin.commit.clone(),
            archive_url: archive_url.to_string(),
            sha256: sha256.to_string(),
        }
    }
}

/// `profile` section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    pub size: u32,
    pub spellings: Vec<String>,
    pub variant_level: u32,
    pub classes: String,
    pub normalization: String,
}

impl From<&BuildProfile> for ProfileSection {
    fn from(profile: &BuildProfile) -> Self {
        Self {
            size: profile.size,
            spellings: profile.spellings.clone(),
            variant_level: profile.variant_level,
            classes: WORD_CLASSES.into(),
            normalization: NORMALIZATION_METHOD.into(),
        }
    }
}

/// `stats` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSection {
    pub word_count: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub build_timestamp: DateTime<Utc>,
}

impl StatsSection {
    /// Count and length range of `words`; zero/zero when empty.
    pub fn from_words(words: &[String], build_timestamp: DateTime<Utc>) -> Self {
        let lengths = words.iter().map(String::len);
        Self {
            word_count: words.len(),
            min_length: lengths.clone().min().unwrap_or(0),
            max_length: lengths.max().unwrap_or(0),
            build_timestamp,
        }
    }
}

/// The three sections a build owns.
#[derive(Debug, Clone, Serialize)]
pub struct MetaUpdate {
    pub source: SourceSection,
    pub profile: ProfileSection,
    pub stats: StatsSection,
}

/// Read the document, or an empty one if the file does not exist.
pub fn read_meta(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| WordlistError::io(path, e))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(WordlistError::validation(format!(
            "{} is not a JSON object",
            path.display()
        ))),
        Err(e) => Err(WordlistError::validation(format!(
            "invalid {}: {e}",
            path.display()
        ))),
    }
}

/// Replace the owned sections and default `artifacts.dawgFile`.
pub fn merge_meta(doc: &mut Map<String, Value>, update: &MetaUpdate) -> Result<()> {
    doc.insert("source".into(), section_value(&update.source)?);
    doc.insert("profile".into(), section_value(&update.profile)?);
    doc.insert("stats".into(), section_value(&update.stats)?);

    match doc
        .entry("artifacts")
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(artifacts) => {
            artifacts
                .entry("dawgFile")
                .or_insert_with(|| Value::String(DEFAULT_DAWG_FILE.into()));
        }
        other => warn!(value = %other, "artifacts is not an object, leaving it untouched"),
    }

    Ok(())
}

/// Merge `update` into the document at `path` and write it back.
#[instrument(skip_all, fields(path = %path.display(), words = update.stats.word_count))]
pub fn write_meta(path: &Path, update: &MetaUpdate) -> Result<Map<String, Value>> {
    let mut doc = read_meta(path)?;
    merge_meta(&mut doc, update)?;
    fs::write_json(path, &doc)?;
    Ok(doc)
}

fn section_value<T: Serialize>(section: &T) -> Result<Value> {
    serde_json::to_value(section)
        .map_err(|e| WordlistError::validation(format!("metadata serialization failed: {e}")))
}
