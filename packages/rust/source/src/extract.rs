//! Unpack a `.tar.gz` archive into a commit-named source directory.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info, instrument};

use wordlist_shared::{Result, WordlistError, fs};

/// Outcome of [`extract_archive`].
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Canonical extracted root (`<src_dir>/<dir_name>`).
    pub root: PathBuf,
    /// False when the directory already existed and nothing was unpacked.
    pub extracted: bool,
}

/// Extract `archive` under `src_dir`, renaming its single top-level folder to `dir_name`.
///
/// Idempotent: an existing `<src_dir>/<dir_name>` is returned untouched.
#[instrument(skip_all, fields(archive = %archive.display(), dir = dir_name))]
pub fn extract_archive(archive: &Path, src_dir: &Path, dir_name: &str) -> Result<Extraction> {
    fs::ensure_dir(src_dir)?;
    let target = src_dir.join(dir_name);
    if target.exists() {
        debug!(path = %target.display(), "source tree already extracted");
        return Ok(Extraction {
            root: target,
            extracted: false,
        });
    }

    let top_level = top_level_name(archive)?;

    let mut tar = open_tar(archive)?;
    tar.unpack(src_dir)
        .map_err(|e| WordlistError::archive(format!("failed to unpack {}: {e}", archive.display())))?;

    let extracted_dir = src_dir.join(&top_level);
    if !extracted_dir.is_dir() {
        return Err(WordlistError::archive(format!(
            "expected extracted path missing: {}",
            extracted_dir.display()
        )));
    }

    if extracted_dir != target {
        std::fs::rename(&extracted_dir, &target).map_err(|e| WordlistError::io(&target, e))?;
    }

    info!(path = %target.display(), top_level = %top_level, "archive extracted");
    Ok(Extraction {
        root: target,
        extracted: true,
    })
}

/// First path component of the first real member of the archive.
///
/// pax headers and GNU long-name records are bookkeeping, not members.
pub fn top_level_name(archive: &Path) -> Result<String> {
    let mut tar = open_tar(archive)?;
    let entries = tar
        .entries()
        .map_err(|e| WordlistError::archive(format!("failed to read {}: {e}", archive.display())))?;

    for entry in entries {
        let entry = entry
            .map_err(|e| WordlistError::archive(format!("corrupt entry in {}: {e}", archive.display())))?;

        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions()
            || kind.is_pax_local_extensions()
            || kind.is_gnu_longname()
            || kind.is_gnu_longlink()
        {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| WordlistError::archive(format!("bad entry path: {e}")))?;
        let first = path.components().find_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        });
        if let Some(name) = first {
            return Ok(name);
        }
    }

    Err(WordlistError::archive("Archive is empty."))
}

fn open_tar(archive: &Path) -> Result<tar::Archive<GzDecoder<File>>> {
    let file = File::open(archive).map_err(|e| WordlistError::io(archive, e))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}
