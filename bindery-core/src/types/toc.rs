//! Table of contents types

/// A single entry in the navigation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Display title, numbered when requested
    pub title: String,

    /// Target document, relative to `OEBPS/`
    pub href: String,

    /// Manifest id of the target document
    pub id: String,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            id: id.into(),
        }
    }
}
