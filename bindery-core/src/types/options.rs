//! Book options: the raw input shape and its normalized form

use super::{Chapter, Font, LandmarkRole, LandmarkTarget, Landmarks};
use crate::log::Verbosity;
use crate::template::Templates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One author or a list of authors, as accepted on input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Authors {
    One(String),
    Many(Vec<String>),
}

impl Authors {
    /// Coerce to a list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Authors::One(name) => vec![name],
            Authors::Many(names) => names,
        }
    }
}

impl From<&str> for Authors {
    fn from(name: &str) -> Self {
        Authors::One(name.to_string())
    }
}

impl From<String> for Authors {
    fn from(name: String) -> Self {
        Authors::One(name)
    }
}

impl From<Vec<String>> for Authors {
    fn from(names: Vec<String>) -> Self {
        Authors::Many(names)
    }
}

/// EPUB version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpubVersion {
    V2,
    #[default]
    V3,
}

impl EpubVersion {
    /// Map the numeric option value
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            2 => Some(EpubVersion::V2),
            3 => Some(EpubVersion::V3),
            _ => None,
        }
    }

    /// Value of the OPF `version` attribute
    pub fn package_version(&self) -> &'static str {
        match self {
            EpubVersion::V2 => "2.0",
            EpubVersion::V3 => "3.0",
        }
    }
}

/// Raw book options, as supplied by the caller
///
/// Everything except `title` is optional; defaults are merged once by the
/// normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub title: String,
    pub author: Option<Authors>,
    pub publisher: Option<String>,
    pub description: Option<String>,

    /// Cover image URL or local path
    pub cover: Option<String>,

    pub toc_title: Option<String>,
    #[serde(rename = "tocInTOC")]
    pub toc_in_toc: Option<bool>,
    #[serde(rename = "numberChaptersInTOC")]
    pub number_chapters_in_toc: Option<bool>,
    pub prepend_chapter_titles: Option<bool>,

    /// Publication date, RFC 3339 or `YYYY-MM-DD`
    pub date: Option<String>,
    pub lang: Option<String>,
    pub css: Option<String>,

    #[serde(rename = "chapterXHTML")]
    pub chapter_xhtml: Option<String>,
    #[serde(rename = "contentOPF")]
    pub content_opf: Option<String>,
    #[serde(rename = "tocNCX")]
    pub toc_ncx: Option<String>,
    #[serde(rename = "tocXHTML")]
    pub toc_xhtml: Option<String>,

    pub fonts: Vec<Font>,

    /// 2 or 3
    pub version: Option<u8>,

    /// Per-attempt timeout in milliseconds
    pub fetch_timeout: Option<u64>,
    pub retry_times: Option<u32>,
    pub batch_size: Option<usize>,
    pub ignore_failed_downloads: Option<bool>,

    /// Delay between fetch attempts in milliseconds
    pub retry_delay: Option<u64>,

    pub verbose: Option<bool>,
    pub landmarks: Option<Landmarks>,

    /// Explicit `dc:identifier`
    pub identifier: Option<String>,

    /// Also emit `toc.ncx` in an EPUB 3 package
    #[serde(rename = "ncxInEpub3")]
    pub ncx_in_epub3: Option<bool>,
}

impl Options {
    /// Create options with the only required field
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the author(s)
    pub fn with_author(mut self, author: impl Into<Authors>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the EPUB version
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the cover reference
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Set the publication date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Map a landmark role
    pub fn with_landmark(mut self, role: LandmarkRole, value: impl Into<super::LandmarkValue>) -> Self {
        self.landmarks
            .get_or_insert_with(Landmarks::new)
            .insert(role, value.into());
        self
    }

    /// Add an embedded font
    pub fn with_font(mut self, font: Font) -> Self {
        self.fonts.push(font);
        self
    }
}

/// A complete book description: options plus chapters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookDescription {
    pub options: Options,
    pub chapters: Vec<Chapter>,
}

/// Fully-defaulted options, produced once by the normalizer
#[derive(Debug, Clone)]
pub struct NormOptions {
    pub title: String,
    pub author: Vec<String>,
    pub publisher: String,
    pub description: String,
    pub cover: Option<String>,
    pub toc_title: String,
    pub toc_in_toc: bool,
    pub number_chapters_in_toc: bool,
    pub prepend_chapter_titles: bool,
    pub date: DateTime<Utc>,
    pub lang: String,
    pub css: String,
    pub templates: Templates,
    pub fonts: Vec<Font>,
    pub version: EpubVersion,
    pub fetch_timeout: Duration,
    pub retry_times: u32,
    pub batch_size: usize,
    pub ignore_failed_downloads: bool,
    pub retry_delay: Duration,
    pub verbosity: Verbosity,
    pub landmarks: BTreeMap<LandmarkRole, LandmarkTarget>,
    pub identifier: String,
    pub ncx_in_epub3: bool,
}

impl NormOptions {
    /// Whether `toc.ncx` is part of the package
    pub fn has_ncx(&self) -> bool {
        self.version == EpubVersion::V2 || self.ncx_in_epub3
    }
}
