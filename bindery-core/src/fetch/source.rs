//! Asset sources: where referenced bytes come from

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;

/// Bytes returned by a source
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub data: Vec<u8>,

    /// Declared content type, if any
    pub content_type: Option<String>,
}

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cannot read {path}: {reason}")]
    Local { path: String, reason: String },

    #[error("unsupported url scheme in {0}")]
    UnsupportedScheme(String),
}

/// Abstract source of referenced assets
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch one reference, a single attempt
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchFailure>;
}

/// Default source: `http(s)://` over the network, `file://` and bare paths
/// from disk
pub struct HttpSource {
    client: reqwest::Client,
    base_dir: Option<PathBuf>,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_dir: None,
        }
    }

    /// Resolve relative local paths against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn local_path(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(path).is_relative() => base.join(path),
            _ => PathBuf::from(path),
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<Fetched, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let data = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        Ok(Fetched {
            data: data.to_vec(),
            content_type,
        })
    }

    async fn fetch_local(&self, path: &str) -> Result<Fetched, FetchFailure> {
        let full_path = self.local_path(path);
        let data = tokio::fs::read(&full_path)
            .await
            .map_err(|e| FetchFailure::Local {
                path: full_path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Fetched {
            data,
            content_type: None,
        })
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchFailure> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url).await
        } else if let Some(path) = url.strip_prefix("file://") {
            self.fetch_local(path).await
        } else if url.contains("://") {
            Err(FetchFailure::UnsupportedScheme(url.to_string()))
        } else {
            self.fetch_local(url).await
        }
    }
}

struct MemoryEntry {
    data: Vec<u8>,
    content_type: Option<String>,
    failures: u32,
    delay: Duration,
}

/// In-memory source with scripted failures (for testing)
///
/// Unknown references answer with HTTP 404.
#[derive(Default)]
pub struct MemorySource {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    calls: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for `url`
    pub fn with(self, url: &str, content_type: Option<&str>, data: impl Into<Vec<u8>>) -> Self {
        self.entries.write().unwrap().insert(
            url.to_string(),
            MemoryEntry {
                data: data.into(),
                content_type: content_type.map(str::to_string),
                failures: 0,
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Fail the first `n` attempts for `url`
    pub fn failing_first(self, url: &str, n: u32) -> Self {
        if let Some(entry) = self.entries.write().unwrap().get_mut(url) {
            entry.failures = n;
        }
        self
    }

    /// Delay every answer for `url`
    pub fn delayed(self, url: &str, delay: Duration) -> Self {
        if let Some(entry) = self.entries.write().unwrap().get_mut(url) {
            entry.delay = delay;
        }
        self
    }

    /// Number of attempts made for `url`
    pub fn calls(&self, url: &str) -> u32 {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Highest number of concurrently pending fetches seen
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetSource for MemorySource {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchFailure> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let (delay, outcome) = {
            let entries = self.entries.read().unwrap();
            match entries.get(url) {
                None => (Duration::ZERO, Err(FetchFailure::Status(404))),
                Some(entry) if attempt <= entry.failures => (
                    entry.delay,
                    Err(FetchFailure::Transport(format!("scripted failure {attempt}"))),
                ),
                Some(entry) => (
                    entry.delay,
                    Ok(Fetched {
                        data: entry.data.clone(),
                        content_type: entry.content_type.clone(),
                    }),
                ),
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_scripted_failures() {
        let source = MemorySource::new()
            .with("https://example.com/a.png", Some("image/png"), vec![1, 2, 3])
            .failing_first("https://example.com/a.png", 2);

        assert!(source.fetch("https://example.com/a.png").await.is_err());
        assert!(source.fetch("https://example.com/a.png").await.is_err());
        let fetched = source.fetch("https://example.com/a.png").await.unwrap();

        assert_eq!(fetched.data, vec![1, 2, 3]);
        assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
        assert_eq!(source.calls("https://example.com/a.png"), 3);
    }

    #[tokio::test]
    async fn test_memory_source_unknown_is_404() {
        let source = MemorySource::new();
        assert!(matches!(
            source.fetch("https://example.com/missing.png").await,
            Err(FetchFailure::Status(404))
        ));
    }

    #[tokio::test]
    async fn test_http_source_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("font.ttf"), b"font-bytes").await.unwrap();

        let source = HttpSource::new().with_base_dir(dir.path());
        let relative = source.fetch("font.ttf").await.unwrap();
        assert_eq!(relative.data, b"font-bytes");

        let absolute = format!("file://{}", dir.path().join("font.ttf").display());
        assert_eq!(source.fetch(&absolute).await.unwrap().data, b"font-bytes");
    }

    #[tokio::test]
    async fn test_http_source_rejects_unknown_schemes() {
        let source = HttpSource::new();
        assert!(matches!(
            source.fetch("ftp://example.com/a.png").await,
            Err(FetchFailure::UnsupportedScheme(_))
        ));
        assert!(matches!(
            source.fetch("/definitely/not/here.png").await,
            Err(FetchFailure::Local { .. })
        ));
    }
}
