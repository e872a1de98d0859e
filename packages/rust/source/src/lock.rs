//! Trust-on-first-use checksum protocol backed by `source.lock.json`.
//!
//! Two states only: with no expected checksum the first verified archive is
//! recorded and trusted; once a checksum is expected, every run verifies
//! against it or fails.

use std::path::Path;

use tracing::{info, warn};
use url::Url;

use wordlist_shared::{Result, SourceLock, WordlistError, fs};

/// Where an expected checksum came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumOrigin {
    /// Supplied by the operator (`--archive-sha256`).
    Flag,
    /// Read from a lock record for the same commit and URL.
    LockFile,
}

/// Whether the archive identity is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustState {
    /// No expected checksum: hash whatever we get and record it.
    FirstUse,
    /// Expected checksum known: verify or fail.
    Pinned {
        expected: String,
        origin: ChecksumOrigin,
    },
}

impl TrustState {
    /// Decide the state from an explicit checksum and an existing lock record.
    ///
    /// The explicit checksum wins. A lock record only counts when it was made
    /// for the same commit and archive URL and actually carries a checksum.
    pub fn determine(
        explicit: Option<&str>,
        lock: Option<&SourceLock>,
        commit: &str,
        archive_url: &Url,
    ) -> Self {
        if let Some(expected) = explicit {
            return Self::Pinned {
                expected: expected.to_string(),
                origin: ChecksumOrigin::Flag,
            };
        }
        match lock {
            Some(lock) if !lock.sha256.is_empty() && lock.matches(commit, archive_url) => {
                Self::Pinned {
                    expected: lock.sha256.clone(),
                    origin: ChecksumOrigin::LockFile,
                }
            }
            _ => Self::FirstUse,
        }
    }

    /// The checksum the archive must match, if any.
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::FirstUse => None,
            Self::Pinned { expected, .. } => Some(expected),
        }
    }
}

/// Result of settling the trust state against an actual checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// A new lock record was written.
    Recorded(SourceLock),
    /// The archive matched the expected checksum; nothing written.
    Verified,
}

/// Read the lock record. Absent or incomplete records read as `None`.
///
/// A file that is not JSON at all is an error rather than a silent reset.
pub fn read_lock(path: &Path) -> Result<Option<SourceLock>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| WordlistError::io(path, e))?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        WordlistError::validation(format!("invalid lock file {}: {e}", path.display()))
    })?;

    match serde_json::from_value::<SourceLock>(value) {
        Ok(lock) => Ok(Some(lock)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring incomplete lock record");
            Ok(None)
        }
    }
}

/// Overwrite the lock record wholesale.
pub fn write_lock(path: &Path, lock: &SourceLock) -> Result<()> {
    fs::write_json(path, lock)
}

/// Record on first use, verify thereafter.
pub fn settle(
    state: &TrustState,
    archive_path: &Path,
    actual_sha256: &str,
    lock_path: &Path,
    commit: &str,
    archive_url: &Url,
) -> Result<LockOutcome> {
    match state {
        TrustState::FirstUse => {
            let lock = SourceLock::new(commit, actual_sha256, archive_url);
            write_lock(lock_path, &lock)?;
            info!(commit, sha256 = actual_sha256, "recorded new source lock");
            Ok(LockOutcome::Recorded(lock))
        }
        TrustState::Pinned { expected, .. } if expected == actual_sha256 => {
            Ok(LockOutcome::Verified)
        }
        TrustState::Pinned { expected, .. } => Err(WordlistError::Integrity {
            path: archive_path.to_path_buf(),
            expected: expected.clone(),
            actual: actual_sha256.to_string(),
        }),
    }
}
