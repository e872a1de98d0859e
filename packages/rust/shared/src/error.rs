//! Error types for the word-list builder.
//!
//! Library crates use [`WordlistError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` and prints it once at the top level.

use std::path::PathBuf;

/// Top-level error type for every stage of the build.
#[derive(Debug, thiserror::Error)]
pub enum WordlistError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching the source archive.
    #[error("network error: {0}")]
    Network(String),

    /// Archive content does not match the expected checksum.
    #[error(
        "archive SHA256 mismatch for {path:?}:\nexpected={expected}\nactual={actual}\n\
         Delete the archive and retry if the source changed."
    )]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Archive is empty or has an unexpected layout.
    #[error("archive error: {message}")]
    Archive { message: String },

    /// External command exited unsuccessfully or could not be spawned.
    #[error(
        "command failed ({}): {command}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}",
        .code.map_or_else(|| "not started".to_string(), |c| c.to_string())
    )]
    Subprocess {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The word generator produced nothing usable.
    #[error("word-list command returned empty output: {command}")]
    EmptyOutput { command: String },

    /// The normalized word list is not strictly ascending.
    #[error("words.txt invariant failed at index {index}: '{previous}' >= '{current}'")]
    Invariant {
        index: usize,
        previous: String,
        current: String,
    },

    /// No license or copyright file could be found in the source tree.
    #[error("could not find {kind} file in source tree {root:?} (tried: {tried})")]
    MissingNotice {
        kind: &'static str,
        root: PathBuf,
        tried: String,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed lock or metadata document, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WordlistError>;

impl WordlistError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an archive-structure error.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
