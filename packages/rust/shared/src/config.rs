//! Build configuration.
//!
//! An optional `wordlist.toml` sits at the project root.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WordlistError};
use crate::types::{BuildProfile, SourcePin, parse_spellings};

/// Default configuration file name, looked up under the project root.
pub const CONFIG_FILE_NAME: &str = "wordlist.toml";

static COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,40}$").expect("valid commit regex"));

static SHA256_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("valid sha256 regex"));

// ---------------------------------------------------------------------------
// Config structs (matching wordlist.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pinned upstream revision.
    #[serde(default)]
    pub source: SourcePin,

    /// Default generator profile.
    #[serde(default)]
    pub profile: BuildProfile,

    /// External generator tooling.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// `[generator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Command (argv) that builds the word database inside the source tree.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Query executable, relative to the extracted source root.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Database file produced by the build command, relative to the source root.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            build_command: default_build_command(),
            binary: default_binary(),
            db_file: default_db_file(),
        }
    }
}

fn default_build_command() -> Vec<String> {
    vec!["make".into()]
}
fn default_binary() -> String {
    "scowl".into()
}
fn default_db_file() -> String {
    "scowl.db".into()
}

// ---------------------------------------------------------------------------
// Output layout
// ---------------------------------------------------------------------------

/// Where every artifact of a build lives, anchored at the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn scowl_dir(&self) -> PathBuf {
        self.data_dir().join("scowl")
    }

    /// Downloaded archives, keyed by commit.
    pub fn cache_dir(&self) -> PathBuf {
        self.scowl_dir().join("cache")
    }

    /// Extracted source trees, keyed by commit.
    pub fn src_dir(&self) -> PathBuf {
        self.scowl_dir().join("src")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.scowl_dir().join("source.lock.json")
    }

    pub fn words_raw_path(&self) -> PathBuf {
        self.data_dir().join("words_raw.txt")
    }

    pub fn words_path(&self) -> PathBuf {
        self.root.join("words.txt")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join("dict.meta.json")
    }

    pub fn licenses_dir(&self) -> PathBuf {
        self.root.join("licenses")
    }
}

// ---------------------------------------------------------------------------
// Runtime build config (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Values supplied on the command line. `None` means "use the config file".
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub size: Option<u32>,
    pub spellings: Option<String>,
    pub variant_level: Option<u32>,
    pub archive_sha256: Option<String>,
}

/// Immutable configuration for one build, constructed once at startup.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Pinned upstream revision.
    pub pin: SourcePin,
    /// Generator profile.
    pub profile: BuildProfile,
    /// External tooling.
    pub generator: GeneratorConfig,
    /// Output locations.
    pub layout: OutputLayout,
    /// Checksum supplied explicitly by the operator (lowercase hex).
    pub expected_sha256: Option<String>,
}

impl BuildConfig {
    /// Merge CLI overrides onto a loaded config and validate the result.
    pub fn resolve(
        config: AppConfig,
        root: impl Into<PathBuf>,
        overrides: BuildOverrides,
    ) -> Result<Self> {
        let mut profile = config.profile;
        if let Some(size) = overrides.size {
            profile.size = size;
        }
        if let Some(raw) = overrides.spellings.as_deref() {
            profile.spellings = parse_spellings(raw);
        }
        if let Some(level) = overrides.variant_level {
            profile.variant_level = level;
        }

        let expected_sha256 = match overrides.archive_sha256.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(normalize_sha256(raw)?),
        };

        let built = Self {
            pin: config.source,
            profile,
            generator: config.generator,
            layout: OutputLayout::new(root),
            expected_sha256,
        };
        built.validate()?;
        Ok(built)
    }

    fn validate(&self) -> Result<()> {
        if !COMMIT_RE.is_match(&self.pin.commit) {
            return Err(WordlistError::config(format!(
                "source commit '{}' is not a 7-40 character lowercase hex hash",
                self.pin.commit
            )));
        }
        self.pin.archive_url()?;

        if self.profile.spellings.is_empty() {
            return Err(WordlistError::config("spellings list is empty"));
        }
        if self.generator.build_command.is_empty() {
            return Err(WordlistError::config("generator.build_command is empty"));
        }
        Ok(())
    }
}

/// Lowercase and validate a hex SHA-256 digest.
pub fn normalize_sha256(raw: &str) -> Result<String> {
    let lowered = raw.trim().to_ascii_lowercase();
    if SHA256_RE.is_match(&lowered) {
        Ok(lowered)
    } else {
        Err(WordlistError::config(format!(
            "archive SHA256 '{raw}' is not 64 hex characters"
        )))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the default config file under a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load `<root>/wordlist.toml`. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WordlistError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WordlistError::config(format!("failed to parse {}: {e}", path.display())))
}
