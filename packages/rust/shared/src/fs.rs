//! Small filesystem helpers shared by the pipeline stages.

use std::path::Path;

use crate::error::{Result, WordlistError};

/// Create a directory and all of its parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| WordlistError::io(dir, e))
}

/// Write a file atomically: write to a hidden sibling temp file, then rename.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| WordlistError::validation(format!("{} has no file name", path.display())))?;
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, contents).map_err(|e| WordlistError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| WordlistError::io(path, e))?;

    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Serialize `data` as pretty JSON with a trailing newline and write it atomically.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(data)
        .map_err(|e| WordlistError::validation(format!("JSON serialization failed: {e}")))?;
    json.push('\n');
    write_atomic(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/dir/out.txt");

        write_atomic(&target, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello\n");

        for entry in std::fs::read_dir(target.parent().unwrap()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.starts_with('.'), "temp file left behind: {name}");
        }
    }

    #[test]
    fn write_json_is_pretty_with_trailing_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("doc.json");

        write_json(&target, &serde_json::json!({ "a": 1 })).unwrap();
        let content = std::fs::read_to_string(&target).unwrap();
        assert_eq!(content, "{\n  \"a\": 1\n}\n");
    }
}
