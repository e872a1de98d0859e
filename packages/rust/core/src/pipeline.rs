//! End-to-end build: resolve → lock → extract → generate → normalize → notices → metadata.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument};

use wordlist_shared::{BuildConfig, Result, fs};
use wordlist_source::{DownloadObserver, LockOutcome, TrustState};

use crate::generator;
use crate::meta::{self, MetaUpdate, ProfileSection, SourceSection, StatsSection};
use crate::normalize;
use crate::notices;

/// Number of numbered steps reported by [`build_words`].
pub const TOTAL_STEPS: usize = 7;

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Final word list.
    pub words_path: PathBuf,
    /// Metadata document.
    pub meta_path: PathBuf,
    /// Number of normalized words written.
    pub word_count: usize,
    /// Commit the list was built from.
    pub commit: String,
    /// Verified archive checksum.
    pub sha256: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when a numbered step starts, with an optional hint line.
    fn step(&self, title: &str, detail: Option<&str>);
    /// Extra information about the current step.
    fn info(&self, message: &str);
    /// Called when the current step finishes.
    fn step_done(&self, detail: Option<&str>);
    /// Byte counts while the archive downloads.
    fn download_progress(&self, received: u64, total: Option<u64>);
    /// Called once after the last step.
    fn finish(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _title: &str, _detail: Option<&str>) {}
    fn info(&self, _message: &str) {}
    fn step_done(&self, _detail: Option<&str>) {}
    fn download_progress(&self, _received: u64, _total: Option<u64>) {}
    fn finish(&self, _report: &BuildReport) {}
}

/// Adapts a `ProgressReporter` to the resolver's `DownloadObserver` interface.
struct PipelineDownloadProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl DownloadObserver for PipelineDownloadProgress<'_> {
    fn bytes_received(&self, received: u64, total: Option<u64>) {
        self.inner.download_progress(received, total);
    }
}

/// Run the full build.
///
/// Stages run strictly in order and any failure aborts the run. Caches
/// (archive, extracted tree, word database) are reused on the next run.
#[instrument(skip_all, fields(commit = %config.pin.commit, size = config.profile.size))]
pub async fn build_words(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    let layout = &config.layout;
    let pin = &config.pin;
    let archive_url = pin.archive_url()?;

    let lock = wordlist_source::read_lock(&layout.lock_path())?;
    let trust = TrustState::determine(
        config.expected_sha256.as_deref(),
        lock.as_ref(),
        &pin.commit,
        &archive_url,
    );

    info!(url = %archive_url, ?trust, "starting word-list build");

    // --- Step 1: Resolve archive ---
    progress.step(
        "Resolve SCOWLv2 source archive",
        Some("This can take 15-90s on first run depending on network speed."),
    );
    let client = wordlist_source::http_client()?;
    let archive_path = layout.cache_dir().join(pin.archive_file_name());
    let observer = PipelineDownloadProgress { inner: progress };
    let archive = wordlist_source::resolve_archive(
        &client,
        &archive_url,
        &archive_path,
        trust.expected(),
        &observer,
    )
    .await?;
    let fetched = format!(
        "{}, {:.1} MiB",
        if archive.downloaded { "downloaded" } else { "cache hit" },
        archive.size_bytes as f64 / (1024.0 * 1024.0)
    );
    progress.step_done(Some(fetched.as_str()));

    // --- Step 2: Record or verify lock ---
    progress.step("Record source lock/checksum", None);
    let outcome = wordlist_source::settle(
        &trust,
        &archive.path,
        &archive.sha256,
        &layout.lock_path(),
        &pin.commit,
        &archive_url,
    )?;
    progress.step_done(Some(match outcome {
        LockOutcome::Recorded(_) => "new source.lock.json written",
        LockOutcome::Verified => "checksum verified",
    }));

    // --- Step 3: Extract ---
    progress.step("Extract SCOWL archive", None);
    let extraction = wordlist_source::extract_archive(
        &archive.path,
        &layout.src_dir(),
        &pin.source_dir_name(),
    )?;
    if !extraction.extracted {
        progress.info("already extracted, reusing source tree");
    }
    let source_root = extraction.root;
    progress.step_done(Some(source_root.display().to_string().as_str()));

    // --- Step 4: Generate ---
    progress.step(
        "Generate raw SCOWL word list",
        Some("If SCOWL DB is missing this can take 30-180s on first run."),
    );
    let generated = generator::generate_words(&source_root, &config.profile, &config.generator)?;
    let db_file = &config.generator.db_file;
    let generated_detail = if generated.built_db {
        format!("built {db_file} + queried")
    } else {
        format!("queried existing {db_file}")
    };
    progress.step_done(Some(generated_detail.as_str()));

    // --- Step 5: Normalize + write ---
    progress.step("Normalize + write words files", None);
    fs::write_atomic(&layout.words_raw_path(), &generated.raw)?;
    let words = normalize::normalize_words(&generated.raw);
    normalize::assert_sorted_unique(&words)?;
    let words_path = layout.words_path();
    fs::write_atomic(&words_path, normalize::render_word_list(&words))?;
    progress.step_done(Some(format!("{} normalized words", words.len()).as_str()));

    // --- Step 6: Notices ---
    progress.step("Copy SCOWL license/copyright notices", None);
    let licenses_dir = layout.licenses_dir();
    notices::copy_notices(&source_root, &licenses_dir)?;
    progress.step_done(Some(licenses_dir.display().to_string().as_str()));

    // --- Step 7: Metadata ---
    progress.step("Write dict metadata", None);
    let meta_path = layout.meta_path();
    let update = MetaUpdate {
        source: SourceSection::new(pin, archive_url.as_str(), &archive.sha256),
        profile: ProfileSection::from(&config.profile),
        stats: StatsSection::from_words(&words, Utc::now()),
    };
    meta::write_meta(&meta_path, &update)?;
    progress.step_done(Some(meta_path.display().to_string().as_str()));

    let report = BuildReport {
        words_path,
        meta_path,
        word_count: words.len(),
        commit: pin.commit.clone(),
        sha256: archive.sha256,
        elapsed: start.elapsed(),
    };

    progress.finish(&report);

    info!(
        words = report.word_count,
        sha256 = %report.sha256,
        elapsed_ms = report.elapsed.as_millis(),
        "word-list build complete"
    );

    Ok(report)
}
