//! Pinned SCOWL source handling: download, verify, lock, extract.
//!
//! This crate provides:
//! - [`resolver`]: cached-or-downloaded archive with a streamed SHA-256
//! - [`lock`]: trust-on-first-use checksum record (`source.lock.json`)
//! - [`extract`]: idempotent unpacking into a commit-named directory

pub mod extract;
pub mod lock;
pub mod resolver;

pub use extract::{Extraction, extract_archive, top_level_name};
pub use lock::{ChecksumOrigin, LockOutcome, TrustState, read_lock, settle, write_lock};
pub use resolver::{
    DownloadObserver, NoopObserver, ResolvedArchive, download_archive, http_client,
    resolve_archive, sha256_file,
};
