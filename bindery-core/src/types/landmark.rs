//! Landmarks: semantic roles mapped to documents

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic document role
///
/// Declaration order is the order landmarks are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LandmarkRole {
    Cover,
    Toc,
    BodyMatter,
    TitlePage,
    FrontMatter,
    BackMatter,
    ListOfIllustrations,
    ListOfTables,
    Preface,
    Bibliography,
    Index,
    Glossary,
    Acknowledgments,
}

impl LandmarkRole {
    /// Option key, as written in the input
    pub fn key(&self) -> &'static str {
        match self {
            LandmarkRole::Cover => "cover",
            LandmarkRole::Toc => "toc",
            LandmarkRole::BodyMatter => "bodyMatter",
            LandmarkRole::TitlePage => "titlePage",
            LandmarkRole::FrontMatter => "frontMatter",
            LandmarkRole::BackMatter => "backMatter",
            LandmarkRole::ListOfIllustrations => "listOfIllustrations",
            LandmarkRole::ListOfTables => "listOfTables",
            LandmarkRole::Preface => "preface",
            LandmarkRole::Bibliography => "bibliography",
            LandmarkRole::Index => "index",
            LandmarkRole::Glossary => "glossary",
            LandmarkRole::Acknowledgments => "acknowledgments",
        }
    }

    /// EPUB 3 structural semantics vocabulary
    pub fn epub_type(&self) -> &'static str {
        match self {
            LandmarkRole::Cover => "cover",
            LandmarkRole::Toc => "toc",
            LandmarkRole::BodyMatter => "bodymatter",
            LandmarkRole::TitlePage => "titlepage",
            LandmarkRole::FrontMatter => "frontmatter",
            LandmarkRole::BackMatter => "backmatter",
            LandmarkRole::ListOfIllustrations => "loi",
            LandmarkRole::ListOfTables => "lot",
            LandmarkRole::Preface => "preface",
            LandmarkRole::Bibliography => "bibliography",
            LandmarkRole::Index => "index",
            LandmarkRole::Glossary => "glossary",
            LandmarkRole::Acknowledgments => "acknowledgments",
        }
    }

    /// EPUB 2 `<guide>` reference type
    pub fn guide_type(&self) -> &'static str {
        match self {
            LandmarkRole::Cover => "cover",
            LandmarkRole::Toc => "toc",
            LandmarkRole::BodyMatter => "text",
            LandmarkRole::TitlePage => "title-page",
            LandmarkRole::FrontMatter => "other.frontmatter",
            LandmarkRole::BackMatter => "other.backmatter",
            LandmarkRole::ListOfIllustrations => "loi",
            LandmarkRole::ListOfTables => "lot",
            LandmarkRole::Preface => "preface",
            LandmarkRole::Bibliography => "bibliography",
            LandmarkRole::Index => "index",
            LandmarkRole::Glossary => "glossary",
            LandmarkRole::Acknowledgments => "acknowledgements",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LandmarkRole::Cover => "Cover",
            LandmarkRole::Toc => "Table of Contents",
            LandmarkRole::BodyMatter => "Begin Reading",
            LandmarkRole::TitlePage => "Title Page",
            LandmarkRole::FrontMatter => "Front Matter",
            LandmarkRole::BackMatter => "Back Matter",
            LandmarkRole::ListOfIllustrations => "List of Illustrations",
            LandmarkRole::ListOfTables => "List of Tables",
            LandmarkRole::Preface => "Preface",
            LandmarkRole::Bibliography => "Bibliography",
            LandmarkRole::Index => "Index",
            LandmarkRole::Glossary => "Glossary",
            LandmarkRole::Acknowledgments => "Acknowledgments",
        }
    }
}

/// Fixed landmark keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKeyword {
    Cover,
    Toc,
    Hidden,
}

/// Landmark value as supplied: a keyword or a zero-based chapter index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandmarkValue {
    Keyword(LandmarkKeyword),
    Chapter(usize),
}

impl From<LandmarkKeyword> for LandmarkValue {
    fn from(keyword: LandmarkKeyword) -> Self {
        LandmarkValue::Keyword(keyword)
    }
}

impl From<usize> for LandmarkValue {
    fn from(index: usize) -> Self {
        LandmarkValue::Chapter(index)
    }
}

/// Raw landmarks map
pub type Landmarks = BTreeMap<LandmarkRole, LandmarkValue>;

/// Landmark value after range checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkTarget {
    Cover,
    Toc,
    Hidden,
    /// Index into the chapter list, known to be in range
    Chapter(usize),
}
