//! End-to-end checks of the `build-words` binary that need no network.

use assert_cmd::Command;
use predicates::prelude::*;

const DEFAULT_COMMIT: &str = "744c092883db13112f6680892850c1f1b6547b81";

fn build_words() -> Command {
    let mut cmd = Command::cargo_bin("build-words").unwrap();
    cmd.env_remove("WORDLIST_ARCHIVE_SHA256").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_profile_and_checksum_flags() {
    build_words()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--size"))
        .stdout(predicate::str::contains("--spellings"))
        .stdout(predicate::str::contains("--variant-level"))
        .stdout(predicate::str::contains("--archive-sha256"));
}

#[test]
fn malformed_checksum_is_rejected_before_any_work() {
    let root = tempfile::tempdir().unwrap();

    build_words()
        .arg("--root")
        .arg(root.path())
        .args(["--archive-sha256", "not-a-digest"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR:"))
        .stderr(predicate::str::contains("64 hex"));

    assert!(!root.path().join("data").exists());
}

#[test]
fn blank_spellings_list_is_rejected() {
    let root = tempfile::tempdir().unwrap();

    build_words()
        .arg("--root")
        .arg(root.path())
        .args(["--spellings", " , "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR:"))
        .stderr(predicate::str::contains("spellings"));
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("nowhere.toml");

    build_words()
        .arg("--root")
        .arg(root.path())
        .arg("--config")
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR: cannot load config"))
        .stderr(predicate::str::contains("nowhere.toml"))
        .stderr(predicate::str::contains("I/O error at"));

    assert!(!root.path().join("data").exists());
}

#[test]
fn invalid_commit_in_config_file_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("wordlist.toml"),
        "[source]\ncommit = \"NOT-HEX\"\n",
    )
    .unwrap();

    build_words()
        .arg("--root")
        .arg(root.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("NOT-HEX"));
}

#[test]
fn cached_archive_with_wrong_checksum_fails_without_extracting() {
    let root = tempfile::tempdir().unwrap();
    let cache = root.path().join("data").join("scowl").join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::write(
        cache.join(format!("wordlist-{DEFAULT_COMMIT}.tar.gz")),
        b"definitely not the pinned archive",
    )
    .unwrap();

    build_words()
        .arg("--root")
        .arg(root.path())
        .args(["--archive-sha256", &"0".repeat(64)])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[1/7] Resolve SCOWLv2 source archive"))
        .stderr(predicate::str::contains("ERROR:"))
        .stderr(predicate::str::contains("mismatch"));

    let scowl = root.path().join("data").join("scowl");
    assert!(!scowl.join("src").exists());
    assert!(!scowl.join("source.lock.json").exists());
    assert!(!root.path().join("words.txt").exists());
    assert!(!root.path().join("dict.meta.json").exists());
}
