//! Resource fetcher
//!
//! Every referenced asset is fetched exactly once, with at most `batch_size`
//! requests pending at a time. A finished request immediately frees its slot
//! for the next reference. Each attempt is bounded by the fetch timeout and a
//! failed attempt is retried up to `retry_times` more times.
//!
//! When failures are not tolerated, the first exhausted reference raises an
//! abort flag: references not yet started are skipped, in-flight ones stop
//! before their next retry, and all exhausted references are reported once
//! the window drains.

pub mod media;
mod source;

pub use source::{AssetSource, FetchFailure, Fetched, HttpSource, MemorySource};

use crate::error::DownloadError;
use crate::log::Logger;
use crate::types::{NormOptions, Resource, ResourceMap};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Concurrency, retry and failure settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub retry_times: u32,
    pub batch_size: usize,
    pub retry_delay: Duration,
    pub ignore_failures: bool,
}

impl From<&NormOptions> for FetchPolicy {
    fn from(options: &NormOptions) -> Self {
        Self {
            timeout: options.fetch_timeout,
            retry_times: options.retry_times,
            batch_size: options.batch_size,
            retry_delay: options.retry_delay,
            ignore_failures: options.ignore_failed_downloads,
        }
    }
}

/// Fetches references through an [`AssetSource`]
pub struct Fetcher<'a> {
    source: &'a dyn AssetSource,
    policy: FetchPolicy,
    logger: &'a Logger,
}

impl<'a> Fetcher<'a> {
    pub fn new(source: &'a dyn AssetSource, policy: FetchPolicy, logger: &'a Logger) -> Self {
        Self {
            source,
            policy,
            logger,
        }
    }

    /// Fetch every distinct reference
    ///
    /// With failures tolerated, exhausted references are recorded as failed
    /// resources; otherwise they are returned as an error in discovery order.
    pub async fn fetch_all<I>(&self, references: I) -> Result<ResourceMap, DownloadError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = references
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();

        if unique.is_empty() {
            return Ok(ResourceMap::new());
        }

        self.logger.info(format!(
            "Fetching {} resource(s), {} at a time",
            unique.len(),
            self.policy.batch_size
        ));

        let abort = AtomicBool::new(false);
        let abort = &abort;
        let this = self;

        let mut outcomes: Vec<(usize, Resource, Option<DownloadError>)> =
            stream::iter(unique.into_iter().enumerate())
                .map(move |(order, url)| async move {
                    let (resource, error) = this.fetch_one(url, abort).await;
                    (order, resource, error)
                })
                .buffer_unordered(self.policy.batch_size.max(1))
                .collect()
                .await;

        outcomes.sort_by_key(|(order, ..)| *order);

        let mut resources = ResourceMap::new();
        let mut failures = Vec::new();
        for (_, resource, error) in outcomes {
            if let Some(error) = error {
                failures.push(error);
            }
            resources.insert(resource);
        }

        if !self.policy.ignore_failures {
            if let Some(error) = DownloadError::aggregate(failures) {
                return Err(error);
            }
        }

        Ok(resources)
    }

    /// Fetch one reference with retries
    async fn fetch_one(&self, url: String, abort: &AtomicBool) -> (Resource, Option<DownloadError>) {
        let resource = Resource::pending(&url);
        let attempts = self.policy.retry_times + 1;
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            if abort.load(Ordering::SeqCst) {
                return (resource.fail("cancelled"), None);
            }

            let result = match tokio::time::timeout(self.policy.timeout, self.source.fetch(&url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchFailure::Timeout(self.policy.timeout)),
            };

            match result {
                Ok(fetched) => {
                    let media_type = media::media_type_for(&url, fetched.content_type.as_deref());
                    return (resource.succeed(media_type, fetched.data), None);
                }
                Err(failure) => {
                    last_reason = failure.to_string();
                    if attempt < attempts {
                        self.logger.warn(format!(
                            "Fetching {} failed ({}), retry {}/{}",
                            url, failure, attempt, self.policy.retry_times
                        ));
                        if !self.policy.retry_delay.is_zero() {
                            tokio::time::sleep(self.policy.retry_delay).await;
                        }
                    }
                }
            }
        }

        let error = DownloadError::Exhausted {
            url: url.clone(),
            attempts,
            reason: last_reason.clone(),
        };

        if self.policy.ignore_failures {
            self.logger.warn(format!("Ignoring failed download: {error}"));
            (resource.fail(last_reason), None)
        } else {
            abort.store(true, Ordering::SeqCst);
            (resource.fail(last_reason), Some(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FetchStatus;

    fn policy() -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(5),
            retry_times: 3,
            batch_size: 4,
            retry_delay: Duration::ZERO,
            ignore_failures: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_references_fetched_once() {
        let source = MemorySource::new().with("https://a/x.png", Some("image/png"), vec![1]);
        let logger = Logger::default();
        let fetcher = Fetcher::new(&source, policy(), &logger);

        let refs = vec!["https://a/x.png".to_string(); 5];
        let resources = fetcher.fetch_all(refs).await.unwrap();

        assert_eq!(resources.len(), 1);
        assert_eq!(source.calls("https://a/x.png"), 1);
        assert_eq!(
            resources.get("https://a/x.png").unwrap().media_type.as_deref(),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn test_succeeds_on_final_allowed_attempt() {
        let source = MemorySource::new()
            .with("https://a/x.png", None, vec![1])
            .failing_first("https://a/x.png", 3);
        let logger = Logger::default();
        let fetcher = Fetcher::new(&source, policy(), &logger);

        let resources = fetcher.fetch_all(vec!["https://a/x.png".to_string()]).await.unwrap();

        assert!(resources.succeeded("https://a/x.png").is_some());
        assert_eq!(source.calls("https://a/x.png"), 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_with_reference() {
        let source = MemorySource::new()
            .with("https://a/x.png", None, vec![1])
            .failing_first("https://a/x.png", 4);
        let logger = Logger::default();
        let fetcher = Fetcher::new(&source, policy(), &logger);

        let err = fetcher
            .fetch_all(vec!["https://a/x.png".to_string()])
            .await
            .unwrap_err();

        match err {
            DownloadError::Exhausted { url, attempts, .. } => {
                assert_eq!(url, "https://a/x.png");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ignored_failures_are_recorded() {
        let source = MemorySource::new().with("https://a/ok.png", None, vec![1]);
        let logger = Logger::default();
        let fetcher = Fetcher::new(
            &source,
            FetchPolicy {
                ignore_failures: true,
                ..policy()
            },
            &logger,
        );

        let resources = fetcher
            .fetch_all(vec!["https://a/ok.png".to_string(), "https://a/gone.png".to_string()])
            .await
            .unwrap();

        assert!(resources.succeeded("https://a/ok.png").is_some());
        assert_eq!(
            resources.get("https://a/gone.png").unwrap().status,
            FetchStatus::Failed("HTTP 404".to_string())
        );
        assert_eq!(source.calls("https://a/gone.png"), 4);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let source = MemorySource::new()
            .with("https://a/slow.png", None, vec![1])
            .delayed("https://a/slow.png", Duration::from_secs(10));
        let logger = Logger::default();
        let fetcher = Fetcher::new(
            &source,
            FetchPolicy {
                timeout: Duration::from_millis(20),
                retry_times: 1,
                ..policy()
            },
            &logger,
        );

        let err = fetcher
            .fetch_all(vec!["https://a/slow.png".to_string()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert_eq!(source.calls("https://a/slow.png"), 2);
    }

    #[tokio::test]
    async fn test_window_bounds_in_flight_requests() {
        let mut source = MemorySource::new();
        let mut refs = Vec::new();
        for i in 0..12 {
            let url = format!("https://a/{i}.png");
            source = source
                .with(&url, None, vec![i as u8])
                .delayed(&url, Duration::from_millis(10));
            refs.push(url);
        }
        let logger = Logger::default();
        let fetcher = Fetcher::new(
            &source,
            FetchPolicy {
                batch_size: 3,
                ..policy()
            },
            &logger,
        );

        let resources = fetcher.fetch_all(refs).await.unwrap();

        assert_eq!(resources.len(), 12);
        assert_eq!(source.max_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_slow_reference_does_not_hold_the_window() {
        let mut source = MemorySource::new()
            .with("https://a/slow.png", None, vec![0])
            .delayed("https://a/slow.png", Duration::from_millis(400));
        let mut refs = vec!["https://a/slow.png".to_string()];
        for i in 0..4 {
            let url = format!("https://a/{i}.png");
            source = source
                .with(&url, None, vec![1])
                .delayed(&url, Duration::from_millis(10));
            refs.push(url);
        }
        let logger = Logger::default();
        let fetcher = Fetcher::new(
            &source,
            FetchPolicy {
                batch_size: 2,
                ..policy()
            },
            &logger,
        );

        let (resources, started_while_slow) = tokio::join!(fetcher.fetch_all(refs), async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            (0..4)
                .filter(|i| source.calls(&format!("https://a/{i}.png")) == 1)
                .count()
        });

        // All fast references ran in the second slot while the slow one was pending
        assert_eq!(started_while_slow, 4);
        assert_eq!(resources.unwrap().len(), 5);
        assert_eq!(source.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_stops_pending_references() {
        let mut source = MemorySource::new();
        let mut refs = vec!["https://a/missing.png".to_string()];
        for i in 0..5 {
            let url = format!("https://a/{i}.png");
            source = source
                .with(&url, None, vec![1])
                .delayed(&url, Duration::from_millis(50));
            refs.push(url);
        }
        let logger = Logger::default();
        let fetcher = Fetcher::new(
            &source,
            FetchPolicy {
                batch_size: 1,
                retry_times: 1,
                ..policy()
            },
            &logger,
        );

        let err = fetcher.fetch_all(refs).await.unwrap_err();

        assert_eq!(err.urls(), vec!["https://a/missing.png"]);
        for i in 0..5 {
            assert_eq!(source.calls(&format!("https://a/{i}.png")), 0);
        }
    }
}
