//! Stateless input validation
//!
//! Structural shape (types, required keys, landmark keywords) is enforced by
//! deserialization. This pass checks the value constraints that types cannot
//! express and reports every violation at once.

use crate::types::{Chapter, Options};
use std::fmt;

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path to the field, e.g. `chapters[2].filename`
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Whether `name` is a bare filename
pub fn is_plain_filename(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\')
}

/// Validate options and chapters, collecting every violation
pub fn validate(options: &Options, chapters: &[Chapter]) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if options.title.trim().is_empty() {
        violations.push(Violation::new("options.title", "must not be empty"));
    }

    if let Some(version) = options.version {
        if version != 2 && version != 3 {
            violations.push(Violation::new(
                "options.version",
                format!("expected version to be 3 or 2, got `{version}`"),
            ));
        }
    }

    if options.fetch_timeout == Some(0) {
        violations.push(Violation::new("options.fetchTimeout", "must be positive"));
    }
    if options.retry_times == Some(0) {
        violations.push(Violation::new("options.retryTimes", "must be positive"));
    }
    if options.batch_size == Some(0) {
        violations.push(Violation::new("options.batchSize", "must be positive"));
    }

    for (i, font) in options.fonts.iter().enumerate() {
        if font.filename.is_empty() {
            violations.push(Violation::new(format!("options.fonts[{i}].filename"), "must not be empty"));
        } else if !is_plain_filename(&font.filename) {
            violations.push(Violation::new(
                format!("options.fonts[{i}].filename"),
                format!("must not include slashes, got `{}`", font.filename),
            ));
        }
        if font.url.is_empty() {
            violations.push(Violation::new(format!("options.fonts[{i}].url"), "must not be empty"));
        }
    }

    for (i, chapter) in chapters.iter().enumerate() {
        if let Some(filename) = &chapter.filename {
            if filename.is_empty() {
                violations.push(Violation::new(format!("chapters[{i}].filename"), "must not be empty"));
            } else if !is_plain_filename(filename) {
                violations.push(Violation::new(
                    format!("chapters[{i}].filename"),
                    format!("must not include slashes, got `{filename}`"),
                ));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
