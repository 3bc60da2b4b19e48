//! Embedded font

use serde::{Deserialize, Serialize};

/// A font to embed under `fonts/`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    /// Archive filename, without directories
    pub filename: String,

    /// Source URL or local path
    pub url: String,

    /// Resolved once the font has been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Font {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            media_type: None,
        }
    }
}
