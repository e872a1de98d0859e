//! Adapter around the external SCOWL tooling.
//!
//! The tool is a black box: an optional build step produces the word
//! database, then a query prints one raw word per line on stdout.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{info, instrument};

use wordlist_shared::{BuildProfile, GeneratorConfig, Result, WordlistError};

/// Raw generator output.
#[derive(Debug, Clone)]
pub struct GeneratedWords {
    /// Newline-delimited words exactly as the generator printed them.
    pub raw: String,
    /// Whether the database build step ran during this call.
    pub built_db: bool,
}

/// Build the database if needed, then query the word list.
///
/// Blank output is an error: an empty word list is never a valid build.
#[instrument(skip_all, fields(root = %source_root.display(), size = profile.size))]
pub fn generate_words(
    source_root: &Path,
    profile: &BuildProfile,
    generator: &GeneratorConfig,
) -> Result<GeneratedWords> {
    let built_db = ensure_database(source_root, generator)?;
    let raw = query_word_list(source_root, profile, generator)?;

    if raw.trim().is_empty() {
        return Err(WordlistError::EmptyOutput {
            command: render_command(&generator.binary, &query_args(profile, generator)),
        });
    }

    info!(bytes = raw.len(), built_db, "raw word list generated");
    Ok(GeneratedWords { raw, built_db })
}

/// Run the build command when the database file is missing.
///
/// Returns true when the build actually ran.
pub fn ensure_database(source_root: &Path, generator: &GeneratorConfig) -> Result<bool> {
    if source_root.join(&generator.db_file).exists() {
        return Ok(false);
    }

    let (program, args) = generator
        .build_command
        .split_first()
        .ok_or_else(|| WordlistError::config("generator.build_command is empty"))?;

    info!(command = %generator.build_command.join(" "), "building word database");
    run_command(program, args, source_root, false)?;
    Ok(true)
}

/// Invoke the query binary and return its stdout.
pub fn query_word_list(
    source_root: &Path,
    profile: &BuildProfile,
    generator: &GeneratorConfig,
) -> Result<String> {
    // Absolute so it cannot be re-resolved against the child's working directory.
    let program = std::path::absolute(source_root.join(&generator.binary))
        .map_err(|e| WordlistError::io(source_root, e))?;
    let args = query_args(profile, generator);
    let output = run_command(&program.to_string_lossy(), &args, source_root, true)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Query arguments: the profile plus fixed category filters.
///
/// Abbreviations and non-word/special/word-part entries are excluded and
/// accents are stripped.
pub fn query_args(profile: &BuildProfile, generator: &GeneratorConfig) -> Vec<String> {
    vec![
        "--db".into(),
        generator.db_file.clone(),
        "word-list".into(),
        profile.size.to_string(),
        profile.spellings_arg(),
        profile.variant_level.to_string(),
        "--deaccent".into(),
        "--categories=".into(),
        "--tags=".into(),
        "--wo-poses=abbr".into(),
        "--wo-pos-categories=nonword,special,wordpart".into(),
    ]
}

/// Run a command in `cwd`, failing on spawn errors and non-zero exits.
///
/// stderr is always captured; stdout only when `capture_stdout` is set,
/// otherwise it passes through to ours.
pub fn run_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    capture_stdout: bool,
) -> Result<Output> {
    let rendered = render_command(program, args);

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        })
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| WordlistError::Subprocess {
            command: rendered.clone(),
            code: None,
            stdout: String::new(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stdout = if capture_stdout {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            "<not captured>".to_string()
        };
        return Err(WordlistError::Subprocess {
            command: rendered,
            code: output.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_args_encode_profile() {
        let profile = BuildProfile {
            size: 60,
            spellings: vec!["A".into(), "B".into()],
            variant_level: 2,
        };
        let args = query_args(&profile, &GeneratorConfig::default());
        assert_eq!(
            args,
            vec![
                "--db",
                "scowl.db",
                "word-list",
                "60",
                "A,B",
                "2",
                "--deaccent",
                "--categories=",
                "--tags=",
                "--wo-poses=abbr",
                "--wo-pos-categories=nonword,special,wordpart",
            ]
        );
    }

    #[test]
    fn missing_program_is_a_subprocess_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_command("definitely-not-a-real-tool-xyz", &[], tmp.path(), true).unwrap_err();
        match err {
            WordlistError::Subprocess { code, command, .. } => {
                assert!(code.is_none());
                assert_eq!(command, "definitely-not-a-real-tool-xyz");
            }
            other => panic!("expected subprocess error, got {other}"),
        }
    }

    /// Write an executable `sh` script into `dir`.
    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    fn generator() -> GeneratorConfig {
        GeneratorConfig {
            build_command: vec!["sh".into(), "-c".into(), "touch scowl.db".into()],
            ..GeneratorConfig::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn builds_database_once_then_queries() {
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "scowl", "printf 'cat\\ndog\\n'");

        let first = generate_words(tmp.path(), &BuildProfile::default(), &generator()).unwrap();
        assert!(first.built_db);
        assert_eq!(first.raw, "cat\ndog\n");
        assert!(tmp.path().join("scowl.db").exists());

        let second = generate_words(tmp.path(), &BuildProfile::default(), &generator()).unwrap();
        assert!(!second.built_db);
    }

    #[cfg(unix)]
    #[test]
    fn query_receives_profile_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("scowl.db"), "").unwrap();
        write_script(tmp.path(), "scowl", "echo \"$@\"");

        let out = generate_words(tmp.path(), &BuildProfile::default(), &generator()).unwrap();
        assert!(out.raw.starts_with("--db scowl.db word-list 80 A,B,Z,C,D 5 --deaccent"));
    }

    #[cfg(unix)]
    #[test]
    fn blank_output_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("scowl.db"), "").unwrap();
        write_script(tmp.path(), "scowl", "printf '  \\n\\n'");

        let err = generate_words(tmp.path(), &BuildProfile::default(), &generator()).unwrap_err();
        assert!(matches!(err, WordlistError::EmptyOutput { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_query_reports_stderr_and_code() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("scowl.db"), "").unwrap();
        write_script(tmp.path(), "scowl", "echo 'bad size' >&2\nexit 3");

        let err = generate_words(tmp.path(), &BuildProfile::default(), &generator()).unwrap_err();
        match err {
            WordlistError::Subprocess { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("bad size"));
            }
            other => panic!("expected subprocess error, got {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn failing_build_stops_before_query() {
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "scowl", "touch queried");
        let generator = GeneratorConfig {
            build_command: vec!["sh".into(), "-c".into(), "exit 2".into()],
            ..GeneratorConfig::default()
        };

        let err = generate_words(tmp.path(), &BuildProfile::default(), &generator).unwrap_err();
        match err {
            WordlistError::Subprocess { code, stdout, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(stdout, "<not captured>");
            }
            other => panic!("expected subprocess error, got {other}"),
        }
        assert!(!tmp.path().join("queried").exists());
    }
}
