//! License and copyright notices copied out of the upstream source tree.

use std::path::{Path, PathBuf};

use tracing::info;

use wordlist_shared::{Result, WordlistError, fs};

/// License candidates, first existing match wins.
pub const LICENSE_CANDIDATES: &[&str] = &["LICENSE", "License", "COPYING", "Copyright"];

/// Copyright candidates, first existing match wins.
pub const COPYRIGHT_CANDIDATES: &[&str] = &["Copyright", "COPYRIGHT", "LICENSE", "README.md"];

pub const LICENSE_DEST: &str = "SCOWL-LICENSE.txt";
pub const COPYRIGHT_DEST: &str = "SCOWL-COPYRIGHTS.txt";

/// Where the notices were found and copied to.
#[derive(Debug, Clone)]
pub struct CopiedNotices {
    pub license_source: PathBuf,
    pub copyright_source: PathBuf,
    pub license_dest: PathBuf,
    pub copyright_dest: PathBuf,
}

/// First candidate that exists as a file under `root`.
pub fn find_notice(
    root: &Path,
    candidates: &[&str],
    kind: &'static str,
) -> Result<PathBuf> {
    candidates
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| WordlistError::MissingNotice {
            kind,
            root: root.to_path_buf(),
            tried: candidates.join(", "),
        })
}

/// Copy the license and copyright files into `dest_dir`.
///
/// Both are mandatory; nothing is copied unless both are found.
pub fn copy_notices(source_root: &Path, dest_dir: &Path) -> Result<CopiedNotices> {
    let license_source = find_notice(source_root, LICENSE_CANDIDATES, "license")?;
    let copyright_source = find_notice(source_root, COPYRIGHT_CANDIDATES, "copyright")?;

    fs::ensure_dir(dest_dir)?;
    let license_dest = dest_dir.join(LICENSE_DEST);
    let copyright_dest = dest_dir.join(COPYRIGHT_DEST);

    std::fs::copy(&license_source, &license_dest)
        .map_err(|e| WordlistError::io(&license_dest, e))?;
    std::fs::copy(&copyright_source, &copyright_dest)
        .map_err(|e| WordlistError::io(&copyright_dest, e))?;

    info!(
        license = %license_source.display(),
        copyright = %copyright_source.display(),
        "copied notices"
    );

    Ok(CopiedNotices {
        license_source,
        copyright_source,
        license_dest,
        copyright_dest,
    })
}
