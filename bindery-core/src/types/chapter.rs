//! Chapter types: the raw input and its normalized form

use super::Authors;
use serde::{Deserialize, Serialize};

/// A single chapter as supplied by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    pub title: Option<String>,
    pub author: Option<Authors>,

    /// Chapter body as an HTML fragment
    pub content: String,

    /// Keep the chapter out of the navigation tree
    pub exclude_from_toc: Option<bool>,

    /// Place the chapter ahead of the TOC document in reading order
    pub before_toc: Option<bool>,

    /// Archive filename, without directories
    pub filename: Option<String>,

    /// Source url, rendered under the title when titles are prepended
    pub url: Option<String>,
}

impl Chapter {
    /// Create a chapter from its HTML content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set the chapter title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the chapter author(s)
    pub fn with_author(mut self, author: impl Into<Authors>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the archive filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Mark the chapter as front matter read before the TOC
    pub fn before_toc(mut self) -> Self {
        self.before_toc = Some(true);
        self
    }

    /// Keep the chapter out of the navigation tree
    pub fn excluded_from_toc(mut self) -> Self {
        self.exclude_from_toc = Some(true);
        self
    }
}

/// A chapter after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormChapter {
    /// Position in the input list
    pub index: usize,

    /// Manifest id, `item_<index>`
    pub id: String,
    pub title: String,
    pub author: Vec<String>,
    pub content: String,
    pub exclude_from_toc: bool,
    pub before_toc: bool,
    pub filename: String,
    pub url: Option<String>,
}
