//! Error types for Bindery Core

use crate::validate::Violation;
use thiserror::Error;

/// Result type alias using BinderyError
pub type Result<T> = std::result::Result<T, BinderyError>;

/// Top-level error type for a generation call
#[derive(Debug, Error)]
pub enum BinderyError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),
}

/// Invalid options or chapters, detected before any network I/O
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{}", format_violations(.0))]
    Invalid(Vec<Violation>),

    #[error("Landmark `{role}` points at chapter {index}, but only {chapters} chapter(s) exist")]
    LandmarkOutOfRange {
        role: String,
        index: usize,
        chapters: usize,
    },

    #[error("Expected version to be 2 or 3, got {0}")]
    InvalidVersion(u8),

    #[error("Filename must not include slashes, got `{0}`")]
    InvalidFilename(String),

    #[error("Filename `{0}` is used more than once")]
    DuplicateFilename(String),

    #[error("Filename `{0}` is reserved for a generated document")]
    ReservedFilename(String),

    #[error("Invalid date `{0}`, expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid template `{name}`: {reason}")]
    InvalidTemplate { name: String, reason: String },
}

/// A remote asset could not be fetched
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to fetch {url} after {attempts} attempt(s): {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("{} downloads failed: {}", .0.len(), format_list(.0))]
    Several(Vec<DownloadError>),
}

impl DownloadError {
    /// Collapse a list of failures into a single error
    pub(crate) fn aggregate(mut failures: Vec<DownloadError>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(DownloadError::Several(failures)),
        }
    }

    /// References named by this error, in order
    pub fn urls(&self) -> Vec<&str> {
        match self {
            DownloadError::Exhausted { url, .. } => vec![url.as_str()],
            DownloadError::Several(inner) => inner.iter().flat_map(|e| e.urls()).collect(),
        }
    }
}

/// Internal invariant violated while writing the archive
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Manifest item `{0}` has no content")]
    MissingContent(String),

    #[error("Archive entry `{0}` written twice")]
    DuplicateEntry(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_violations(violations: &[Violation]) -> String {
    let parts: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    format!("invalid input: {}", parts.join("; "))
}

fn format_list(errors: &[DownloadError]) -> String {
    let parts: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    parts.join("; ")
}
