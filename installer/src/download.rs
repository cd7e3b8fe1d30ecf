//! HTTP download primitive for release pages and hub installers.
//!
//! Provides a trait-based abstraction so the resolver and hub provisioner
//! can be exercised against stubs. The production [`HttpDownloader`] retries
//! transient failures before giving up.

use log::warn;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Connect timeout for every request. Transfers themselves are unbounded.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for fetching remote resources.
///
/// # Examples
///
/// ```no_run
/// use unity_setup::download::{Downloader, HttpDownloader};
///
/// let downloader = HttpDownloader::default();
/// let page = downloader.download_text("https://unity3d.com/unity/beta/2023.1.0b1")?;
/// assert!(!page.is_empty());
/// # Ok::<(), unity_setup::download::DownloadError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    /// Download a URL and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails or the resource is missing.
    fn download_text(&self, url: &str) -> Result<String, DownloadError>;

    /// Download a URL into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails or the file cannot be written.
    fn download_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be completed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered with HTTP 404.
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with an unsuccessful status code.
    #[error("unexpected HTTP status {code} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        code: u16,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Returns `true` when another attempt may succeed.
    ///
    /// Transport failures, request timeouts, throttling, and server errors
    /// are retried. Everything else is final.
    ///
    /// # Examples
    ///
    /// ```
    /// use unity_setup::download::DownloadError;
    ///
    /// let throttled = DownloadError::Status { url: "u".to_owned(), code: 429 };
    /// assert!(throttled.is_retryable());
    ///
    /// let missing = DownloadError::NotFound { url: "u".to_owned() };
    /// assert!(!missing.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { code, .. } => *code >= 500 || *code == 408 || *code == 429,
            Self::NotFound { .. } | Self::Io(_) => false,
        }
    }
}

/// Retry schedule for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for the delay between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempts
    /// run out. `sleep` is called between attempts.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`.
    pub fn run<T>(
        &self,
        mut operation: impl FnMut() -> Result<T, DownloadError>,
        sleep: impl Fn(Duration),
    ) -> Result<T, DownloadError> {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    let delay = self.backoff_after(attempt);
                    warn!("{err}; retrying in {} seconds", delay.as_secs());
                    sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader {
    policy: RetryPolicy,
}

impl HttpDownloader {
    /// Create a downloader with a custom retry policy.
    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl Downloader for HttpDownloader {
    fn download_text(&self, url: &str) -> Result<String, DownloadError> {
        self.policy.run(|| fetch_text(url), std::thread::sleep)
    }

    fn download_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.policy
            .run(|| fetch_to_file(url, dest), std::thread::sleep)
    }
}

fn fetch_text(url: &str) -> Result<String, DownloadError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| DownloadError::Http {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}

fn fetch_to_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().into_reader(), &mut file).map_err(|e| {
        DownloadError::Http {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    })?;
    Ok(())
}

/// Shared `ureq` agent.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(code) => DownloadError::Status {
            url: url.to_owned(),
            code: *code,
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
