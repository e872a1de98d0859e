//! CLI flag definitions, tracing setup, and progress rendering.

use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use tracing::info;

use wordlist_core::pipeline::{BuildReport, ProgressReporter, TOTAL_STEPS};
use wordlist_shared::{BuildConfig, BuildOverrides, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Fetch SCOWLv2, normalize words to A-Z uppercase, and emit words.txt + dict.meta.json.
#[derive(Parser)]
#[command(name = "build-words", version, long_about = None)]
pub(crate) struct Cli {
    /// SCOWL size [config default: 80].
    #[arg(long)]
    pub size: Option<u32>,

    /// SCOWL spellings list, comma-separated [config default: A,B,Z,C,D].
    #[arg(long)]
    pub spellings: Option<String>,

    /// SCOWL variant level [config default: 5].
    #[arg(long)]
    pub variant_level: Option<u32>,

    /// Expected SHA256 for the archive. If omitted, the lock file is used,
    /// or the first seen checksum is recorded.
    #[arg(long, env = "WORDLIST_ARCHIVE_SHA256")]
    pub archive_sha256: Option<String>,

    /// Project root that receives words.txt, dict.meta.json and data/.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/wordlist.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries progress.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = ["build_words", "wordlist_core", "wordlist_source", "wordlist_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Resolve configuration and run the build.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => std::path::absolute(&root)
            .wrap_err_with(|| format!("cannot resolve root {}", root.display()))?,
        None => std::env::current_dir().wrap_err("cannot determine working directory")?,
    };

    let app_config = match cli.config.as_deref() {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("cannot load config {}", path.display()))?,
        None => load_config(&root)?,
    };

    let overrides = BuildOverrides {
        size: cli.size,
        spellings: cli.spellings,
        variant_level: cli.variant_level,
        archive_sha256: cli.archive_sha256,
    };
    let config = BuildConfig::resolve(app_config, root, overrides)?;

    info!(
        root = %config.layout.root().display(),
        commit = %config.pin.commit,
        size = config.profile.size,
        spellings = %config.profile.spellings_arg(),
        variant_level = config.profile.variant_level,
        "building word list"
    );

    let reporter = CliProgress::new(TOTAL_STEPS);
    wordlist_core::pipeline::build_words(&config, &reporter).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Numbered step lines on stdout plus an indicatif spinner for the active step.
struct CliProgress {
    spinner: ProgressBar,
    total_steps: usize,
    current_step: Cell<usize>,
    step_started: Cell<Instant>,
    process_started: Instant,
}

impl CliProgress {
    fn new(total_steps: usize) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        let now = Instant::now();
        Self {
            spinner,
            total_steps,
            current_step: Cell::new(0),
            step_started: Cell::new(now),
            process_started: now,
        }
    }

    /// Print above the spinner; works whether or not the spinner is visible.
    fn line(&self, text: String) {
        self.spinner.suspend(|| println!("{text}"));
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, title: &str, detail: Option<&str>) {
        let step = self.current_step.get() + 1;
        self.current_step.set(step);
        self.step_started.set(Instant::now());

        self.line(format!("[{step}/{}] {title}", self.total_steps));
        if let Some(detail) = detail {
            self.line(format!("    {detail}"));
        }
        self.spinner.set_message(title.to_string());
    }

    fn info(&self, message: &str) {
        self.line(format!("    {message}"));
    }

    fn step_done(&self, detail: Option<&str>) {
        let elapsed = self.step_started.get().elapsed().as_secs_f64();
        let suffix = detail.map(|d| format!(" ({d})")).unwrap_or_default();
        self.line(format!("    done in {elapsed:.1}s{suffix}"));
    }

    fn download_progress(&self, received: u64, total: Option<u64>) {
        let message = match total {
            Some(total) => format!("Downloading {} / {}", HumanBytes(received), HumanBytes(total)),
            None => format!("Downloading {}", HumanBytes(received)),
        };
        self.spinner.set_message(message);
    }

    fn finish(&self, report: &BuildReport) {
        self.spinner.finish_and_clear();
        println!(
            "Wrote {} ({} words)",
            report.words_path.display(),
            report.word_count
        );
        println!("Wrote {}", report.meta_path.display());
        println!("SCOWL source: {} ({})", report.commit, report.sha256);
        println!(
            "[complete] Dictionary words build finished in {:.1}s",
            self.process_started.elapsed().as_secs_f64()
        );
    }
}
