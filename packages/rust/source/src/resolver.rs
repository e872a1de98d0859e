//! Archive resolution: cached-or-downloaded archive plus its verified checksum.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use url::Url;

use wordlist_shared::{Result, WordlistError, fs};

/// User-Agent string for archive downloads.
const USER_AGENT: &str = concat!("wordlist-builder/", env!("CARGO_PKG_VERSION"));

/// Hashing buffer size.
const HASH_CHUNK: usize = 1024 * 1024;

/// Receives byte counts while an archive downloads.
pub trait DownloadObserver {
    fn bytes_received(&self, received: u64, total: Option<u64>);
}

/// Observer that ignores all progress.
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {
    fn bytes_received(&self, _received: u64, _total: Option<u64>) {}
}

/// A local archive whose checksum has been computed (and verified, if expected).
#[derive(Debug, Clone)]
pub struct ResolvedArchive {
    /// Commit-keyed path in the cache directory.
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file.
    pub sha256: String,
    /// Whether this run downloaded it (false on cache hit).
    pub downloaded: bool,
    /// File size on disk.
    pub size_bytes: u64,
}

/// Build the HTTP client used for archive downloads.
///
/// No request timeout: large archives on slow links are expected to take a while.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| WordlistError::Network(format!("client build: {e}")))
}

/// Make sure `archive_path` exists locally and matches `expected_sha256`.
///
/// Downloads only when the cached file is absent. A mismatch is fatal and
/// the cached file is left in place for the operator to inspect or delete.
#[instrument(skip_all, fields(url = %url, path = %archive_path.display()))]
pub async fn resolve_archive(
    client: &Client,
    url: &Url,
    archive_path: &Path,
    expected_sha256: Option<&str>,
    observer: &dyn DownloadObserver,
) -> Result<ResolvedArchive> {
    let downloaded = if archive_path.exists() {
        debug!("archive cache hit");
        false
    } else {
        download_archive(client, url, archive_path, observer).await?;
        true
    };

    let sha256 = sha256_file(archive_path)?;
    if let Some(expected) = expected_sha256 {
        if expected != sha256 {
            return Err(WordlistError::Integrity {
                path: archive_path.to_path_buf(),
                expected: expected.to_string(),
                actual: sha256,
            });
        }
    }

    let size_bytes = std::fs::metadata(archive_path)
        .map_err(|e| WordlistError::io(archive_path, e))?
        .len();

    info!(sha256 = %sha256, downloaded, size_bytes, "archive resolved");

    Ok(ResolvedArchive {
        path: archive_path.to_path_buf(),
        sha256,
        downloaded,
        size_bytes,
    })
}

/// Stream `url` into `destination`.
///
/// Bytes go to `<destination>.part` first and are renamed into place only
/// after the body is complete. Returns the number of bytes written.
pub async fn download_archive(
    client: &Client,
    url: &Url,
    destination: &Path,
    observer: &dyn DownloadObserver,
) -> Result<u64> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    fs::ensure_dir(parent)?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| WordlistError::Network(format!("failed to download archive from {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WordlistError::Network(format!(
            "failed to download archive from {url}: HTTP {status}"
        )));
    }

    let partial = partial_path(destination);
    let received = match stream_to_file(response, &partial, url, observer).await {
        Ok(received) => received,
        Err(err) => {
            // A truncated `.part` must never be picked up later.
            let _ = std::fs::remove_file(&partial);
            return Err(err);
        }
    };
    std::fs::rename(&partial, destination).map_err(|e| WordlistError::io(destination, e))?;

    info!(bytes = received, path = %destination.display(), "archive downloaded");
    Ok(received)
}

async fn stream_to_file(
    mut response: reqwest::Response,
    partial: &Path,
    url: &Url,
    observer: &dyn DownloadObserver,
) -> Result<u64> {
    let total = response.content_length();
    let mut file = std::fs::File::create(partial).map_err(|e| WordlistError::io(partial, e))?;

    let mut received: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| WordlistError::Network(format!("failed to download archive from {url}: {e}")))?
    {
        file.write_all(&chunk)
            .map_err(|e| WordlistError::io(partial, e))?;
        received += chunk.len() as u64;
        observer.bytes_received(received, total);
    }

    file.flush().map_err(|e| WordlistError::io(partial, e))?;
    Ok(received)
}

/// Lowercase hex SHA-256 of a file, hashed in 1 MiB chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| WordlistError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK];

    loop {
        let n = file.read(&mut buf).map_err(|e| WordlistError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    const BODY: &[u8] = b"pretend this is a tarball";

    fn body_sha() -> String {
        format!("{:x}", Sha256::digest(BODY))
    }

    struct CountingObserver(AtomicU64);

    impl DownloadObserver for CountingObserver {
        fn bytes_received(&self, received: u64, _total: Option<u64>) {
            self.0.store(received, Ordering::SeqCst);
        }
    }

    async fn mock_archive_server(status: u16) -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/archive/abc1234.tar.gz"))
            .respond_with(wiremock::ResponseTemplate::new(status).set_body_bytes(BODY))
            .mount(&server)
            .await;
        server
    }

    fn archive_url(server: &wiremock::MockServer) -> Url {
        Url::parse(&format!("{}/archive/abc1234.tar.gz", server.uri())).unwrap()
    }

    #[test]
    fn sha256_of_known_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("f");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/c/wordlist-abc.tar.gz")),
            PathBuf::from("/c/wordlist-abc.tar.gz.part")
        );
    }

    #[tokio::test]
    async fn downloads_when_cache_is_empty() {
        let server = mock_archive_server(200).await;
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("cache/wordlist-abc1234.tar.gz");
        let observer = CountingObserver(AtomicU64::new(0));

        let client = http_client().unwrap();
        let resolved = resolve_archive(&client, &archive_url(&server), &dest, None, &observer)
            .await
            .unwrap();

        assert!(resolved.downloaded);
        assert_eq!(resolved.sha256, body_sha());
        assert_eq!(resolved.size_bytes, BODY.len() as u64);
        assert_eq!(observer.0.load(Ordering::SeqCst), BODY.len() as u64);
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(BODY))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("wordlist-abc1234.tar.gz");
        std::fs::write(&dest, BODY).unwrap();

        let client = http_client().unwrap();
        let resolved = resolve_archive(
            &client,
            &archive_url(&server),
            &dest,
            Some(&body_sha()),
            &NoopObserver,
        )
        .await
        .unwrap();

        assert!(!resolved.downloaded);
        assert_eq!(resolved.sha256, body_sha());
    }

    #[tokio::test]
    async fn wrong_expected_checksum_is_fatal_and_keeps_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("wordlist-abc1234.tar.gz");
        std::fs::write(&dest, BODY).unwrap();
        let wrong = "0".repeat(64);

        let client = http_client().unwrap();
        let url = Url::parse("http://127.0.0.1:9/archive/abc1234.tar.gz").unwrap();
        let err = resolve_archive(&client, &url, &dest, Some(&wrong), &NoopObserver)
            .await
            .unwrap_err();

        match err {
            WordlistError::Integrity {
                expected, actual, ..
            } => {
                assert_eq!(expected, wrong);
                assert_eq!(actual, body_sha());
            }
            other => panic!("expected integrity error, got {other}"),
        }
        assert_eq!(std::fs::read(&dest).unwrap(), BODY);
    }

    /// Serves one response that promises more bytes than it sends, then hangs up.
    async fn truncating_server() -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\nConnection: close\r\n\r\npartial")
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{addr}/archive/abc1234.tar.gz")).unwrap()
    }

    #[tokio::test]
    async fn truncated_transfer_leaves_no_archive_behind() {
        let url = truncating_server().await;
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("cache/wordlist-abc1234.tar.gz");

        let client = http_client().unwrap();
        let err = resolve_archive(&client, &url, &dest, None, &NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, WordlistError::Network(_)));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn http_error_status_is_network_failure() {
        let server = mock_archive_server(404).await;
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("wordlist-abc1234.tar.gz");

        let client = http_client().unwrap();
        let err = resolve_archive(&client, &archive_url(&server), &dest, None, &NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, WordlistError::Network(_)));
        assert!(err.to_string().contains("/archive/abc1234.tar.gz"));
        assert!(!dest.exists());
    }
}
