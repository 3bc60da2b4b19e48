//! Normalizer: raw options and chapters to the fully-defaulted model
//!
//! Pure transformation, no I/O. Defaults are merged here once and never
//! re-checked downstream.

use crate::error::ConfigurationError;
use crate::log::Verbosity;
use crate::template::{Templates, DEFAULT_CSS};
use crate::types::{
    Authors, Chapter, EpubVersion, Font, LandmarkKeyword, LandmarkRole, LandmarkTarget, LandmarkValue,
    Landmarks, NormChapter, NormOptions, Options,
};
use crate::validate::{is_plain_filename, validate};
use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use uuid::Uuid;

/// Filenames of generated documents
pub const RESERVED_FILENAMES: &[&str] = &["nav.xhtml", "toc.xhtml", "cover.xhtml"];

fn default_author() -> Vec<String> {
    vec!["anonymous".to_string()]
}
fn default_publisher() -> String {
    "anonymous".to_string()
}
fn default_toc_title() -> String {
    "Table of Contents".to_string()
}
fn default_lang() -> String {
    "en".to_string()
}
fn default_fetch_timeout() -> u64 {
    20_000
}
fn default_retry_times() -> u32 {
    3
}
fn default_batch_size() -> usize {
    100
}
fn default_retry_delay() -> u64 {
    250
}

/// Output of the normalizer
#[derive(Debug, Clone)]
pub struct Normalized {
    pub options: NormOptions,
    pub chapters: Vec<NormChapter>,
}

/// Validate, then merge defaults into options and chapters
pub fn normalize(options: &Options, chapters: &[Chapter]) -> Result<Normalized, ConfigurationError> {
    validate(options, chapters).map_err(ConfigurationError::Invalid)?;

    let version = match options.version {
        None => EpubVersion::default(),
        Some(n) => EpubVersion::from_number(n).ok_or(ConfigurationError::InvalidVersion(n))?,
    };

    let chapters = normalize_chapters(chapters)?;
    check_font_filenames(&options.fonts)?;
    let landmarks = resolve_landmarks(options.landmarks.as_ref(), chapters.len())?;
    let date = parse_date(options.date.as_deref())?;
    let author = options
        .author
        .clone()
        .map(Authors::into_vec)
        .unwrap_or_else(default_author);
    let identifier = options
        .identifier
        .clone()
        .unwrap_or_else(|| derive_identifier(&options.title, &author, &date));

    let options = NormOptions {
        title: options.title.clone(),
        author,
        publisher: options.publisher.clone().unwrap_or_else(default_publisher),
        description: options.description.clone().unwrap_or_default(),
        cover: options.cover.clone(),
        toc_title: options.toc_title.clone().unwrap_or_else(default_toc_title),
        toc_in_toc: options.toc_in_toc.unwrap_or(true),
        number_chapters_in_toc: options.number_chapters_in_toc.unwrap_or(true),
        prepend_chapter_titles: options.prepend_chapter_titles.unwrap_or(true),
        date,
        lang: options.lang.clone().unwrap_or_else(default_lang),
        css: options.css.clone().unwrap_or_else(|| DEFAULT_CSS.to_string()),
        templates: Templates::resolve(version, options)?,
        fonts: options.fonts.clone(),
        version,
        fetch_timeout: Duration::from_millis(options.fetch_timeout.unwrap_or_else(default_fetch_timeout)),
        retry_times: options.retry_times.unwrap_or_else(default_retry_times),
        batch_size: options.batch_size.unwrap_or_else(default_batch_size),
        ignore_failed_downloads: options.ignore_failed_downloads.unwrap_or(false),
        retry_delay: Duration::from_millis(options.retry_delay.unwrap_or_else(default_retry_delay)),
        verbosity: Verbosity::from(options.verbose.unwrap_or(false)),
        landmarks,
        identifier,
        ncx_in_epub3: options.ncx_in_epub3.unwrap_or(false),
    };

    Ok(Normalized { options, chapters })
}

/// Assign ids and filenames
pub fn normalize_chapters(chapters: &[Chapter]) -> Result<Vec<NormChapter>, ConfigurationError> {
    let mut taken = HashSet::new();

    // User filenames claim their names before any are generated
    let mut user_names = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        let name = match &chapter.filename {
            Some(raw) => {
                if !is_plain_filename(raw) {
                    return Err(ConfigurationError::InvalidFilename(raw.clone()));
                }
                let name = with_xhtml_suffix(raw);
                if RESERVED_FILENAMES.contains(&name.as_str()) {
                    return Err(ConfigurationError::ReservedFilename(name));
                }
                if !taken.insert(name.clone()) {
                    return Err(ConfigurationError::DuplicateFilename(name));
                }
                Some(name)
            }
            None => None,
        };
        user_names.push(name);
    }

    let width = chapters.len().saturating_sub(1).to_string().len().max(3);

    let normalized = chapters
        .iter()
        .zip(user_names)
        .enumerate()
        .map(|(index, (chapter, user_name))| {
            let filename = user_name.unwrap_or_else(|| generated_filename(index, width, &mut taken));
            NormChapter {
                index,
                id: format!("item_{index}"),
                title: chapter
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Chapter {}", index + 1)),
                author: chapter.author.clone().map(Authors::into_vec).unwrap_or_default(),
                content: chapter.content.clone(),
                exclude_from_toc: chapter.exclude_from_toc.unwrap_or(false),
                before_toc: chapter.before_toc.unwrap_or(false),
                filename,
                url: chapter.url.clone().filter(|u| !u.is_empty()),
            }
        })
        .collect();

    Ok(normalized)
}

/// Every font lands at `fonts/<filename>`, so names must be distinct
pub fn check_font_filenames(fonts: &[Font]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for font in fonts {
        if !seen.insert(font.filename.as_str()) {
            return Err(ConfigurationError::DuplicateFilename(font.filename.clone()));
        }
    }
    Ok(())
}

fn with_xhtml_suffix(name: &str) -> String {
    if name.ends_with(".xhtml") {
        name.to_string()
    } else {
        format!("{name}.xhtml")
    }
}

/// `chapter_NNN.xhtml`, suffixed until it no longer collides
fn generated_filename(index: usize, width: usize, taken: &mut HashSet<String>) -> String {
    let base = format!("chapter_{index:0width$}");
    let mut candidate = format!("{base}.xhtml");
    let mut n = 1;
    while taken.contains(&candidate) {
        candidate = format!("{base}_{n}.xhtml");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Resolve keywords and range-check chapter indices
///
/// The cover and TOC roles default to their own documents.
pub fn resolve_landmarks(
    landmarks: Option<&Landmarks>,
    chapter_count: usize,
) -> Result<BTreeMap<LandmarkRole, LandmarkTarget>, ConfigurationError> {
    let mut resolved = BTreeMap::new();
    resolved.insert(LandmarkRole::Cover, LandmarkTarget::Cover);
    resolved.insert(LandmarkRole::Toc, LandmarkTarget::Toc);

    for (role, value) in landmarks.into_iter().flatten() {
        let target = match *value {
            LandmarkValue::Keyword(LandmarkKeyword::Cover) => LandmarkTarget::Cover,
            LandmarkValue::Keyword(LandmarkKeyword::Toc) => LandmarkTarget::Toc,
            LandmarkValue::Keyword(LandmarkKeyword::Hidden) => LandmarkTarget::Hidden,
            LandmarkValue::Chapter(index) if index < chapter_count => LandmarkTarget::Chapter(index),
            LandmarkValue::Chapter(index) => {
                return Err(ConfigurationError::LandmarkOutOfRange {
                    role: role.key().to_string(),
                    index,
                    chapters: chapter_count,
                })
            }
        };
        resolved.insert(*role, target);
    }

    Ok(resolved)
}

fn parse_date(date: Option<&str>) -> Result<DateTime<Utc>, ConfigurationError> {
    let Some(raw) = date else {
        return Ok(Utc::now().trunc_subsecs(0));
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc).trunc_subsecs(0));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ConfigurationError::InvalidDate(raw.to_string()))
}

/// Name-based identifier, stable for identical input
fn derive_identifier(title: &str, author: &[String], date: &DateTime<Utc>) -> String {
    let seed = format!("{}\u{1f}{}\u{1f}{}", title, author.join("\u{1e}"), date.to_rfc3339());
    format!("urn:uuid:{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters(n: usize) -> Vec<Chapter> {
        (0..n).map(|i| Chapter::new(format!("<p>{i}</p>"))).collect()
    }

    #[test]
    fn test_defaults_are_merged() {
        let normalized = normalize(&Options::new("Alice"), &chapters(1)).unwrap();
        let options = normalized.options;

        assert_eq!(options.author, vec!["anonymous"]);
        assert_eq!(options.publisher, "anonymous");
        assert_eq!(options.toc_title, "Table of Contents");
        assert_eq!(options.lang, "en");
        assert_eq!(options.version, EpubVersion::V3);
        assert_eq!(options.fetch_timeout, Duration::from_secs(20));
        assert_eq!(options.retry_times, 3);
        assert_eq!(options.batch_size, 100);
        assert!(options.toc_in_toc);
        assert!(options.number_chapters_in_toc);
        assert!(options.prepend_chapter_titles);
        assert!(!options.ignore_failed_downloads);
        assert!(options.identifier.starts_with("urn:uuid:"));
    }

    #[test]
    fn test_author_string_is_coerced_to_list() {
        let options = Options::new("T").with_author("Lewis Carroll");
        let raw = vec![Chapter::new("<p/>").with_author(vec!["A".to_string(), "B".to_string()])];
        let normalized = normalize(&options, &raw).unwrap();

        assert_eq!(normalized.options.author, vec!["Lewis Carroll"]);
        assert_eq!(normalized.chapters[0].author, vec!["A", "B"]);
    }

    #[test]
    fn test_ids_and_filenames_from_position() {
        let normalized = normalize_chapters(&chapters(3)).unwrap();
        let ids: Vec<_> = normalized.iter().map(|c| c.id.as_str()).collect();
        let files: Vec<_> = normalized.iter().map(|c| c.filename.as_str()).collect();
        let titles: Vec<_> = normalized.iter().map(|c| c.title.as_str()).collect();

        assert_eq!(ids, vec!["item_0", "item_1", "item_2"]);
        assert_eq!(files, vec!["chapter_000.xhtml", "chapter_001.xhtml", "chapter_002.xhtml"]);
        assert_eq!(titles, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    }

    #[test]
    fn test_padding_grows_with_chapter_count() {
        let normalized = normalize_chapters(&chapters(1200)).unwrap();
        assert_eq!(normalized[7].filename, "chapter_0007.xhtml");
        assert_eq!(normalized[1199].filename, "chapter_1199.xhtml");
    }

    #[test]
    fn test_generated_name_avoids_user_name() {
        let raw = vec![
            Chapter::new("<p/>"),
            Chapter::new("<p/>").with_filename("chapter_000.xhtml"),
        ];
        let normalized = normalize_chapters(&raw).unwrap();

        assert_eq!(normalized[0].filename, "chapter_000_1.xhtml");
        assert_eq!(normalized[1].filename, "chapter_000.xhtml");
    }

    #[test]
    fn test_user_filename_gets_suffix() {
        let raw = vec![Chapter::new("<p/>").with_filename("preface")];
        assert_eq!(normalize_chapters(&raw).unwrap()[0].filename, "preface.xhtml");
    }

    #[test]
    fn test_filename_errors() {
        let slash = vec![Chapter::new("<p/>").with_filename("a/b.xhtml")];
        assert!(matches!(
            normalize_chapters(&slash),
            Err(ConfigurationError::InvalidFilename(_))
        ));

        let dup = vec![
            Chapter::new("<p/>").with_filename("a"),
            Chapter::new("<p/>").with_filename("a.xhtml"),
        ];
        assert!(matches!(
            normalize_chapters(&dup),
            Err(ConfigurationError::DuplicateFilename(name)) if name == "a.xhtml"
        ));

        let reserved = vec![Chapter::new("<p/>").with_filename("nav")];
        assert!(matches!(
            normalize_chapters(&reserved),
            Err(ConfigurationError::ReservedFilename(_))
        ));
    }

    #[test]
    fn test_duplicate_font_filename() {
        let options = Options::new("Alice")
            .with_font(Font::new("serif.ttf", "https://a/one.ttf"))
            .with_font(Font::new("serif.ttf", "https://a/two.ttf"));
        assert!(matches!(
            normalize(&options, &[Chapter::new("<p/>")]),
            Err(ConfigurationError::DuplicateFilename(name)) if name == "serif.ttf"
        ));

        let distinct = vec![
            Font::new("serif.ttf", "https://a/one.ttf"),
            Font::new("sans.ttf", "https://a/one.ttf"),
        ];
        assert!(check_font_filenames(&distinct).is_ok());
    }

    #[test]
    fn test_landmark_index_in_range() {
        let options = Options::new("Alice")
            .with_landmark(LandmarkRole::BodyMatter, 1usize)
            .with_landmark(LandmarkRole::TitlePage, 0usize)
            .with_landmark(LandmarkRole::Toc, LandmarkKeyword::Hidden);
        let normalized = normalize(&options, &chapters(3)).unwrap();
        let landmarks = normalized.options.landmarks;

        assert_eq!(landmarks[&LandmarkRole::BodyMatter], LandmarkTarget::Chapter(1));
        assert_eq!(landmarks[&LandmarkRole::TitlePage], LandmarkTarget::Chapter(0));
        assert_eq!(landmarks[&LandmarkRole::Toc], LandmarkTarget::Hidden);
        assert_eq!(landmarks[&LandmarkRole::Cover], LandmarkTarget::Cover);
    }

    #[test]
    fn test_landmark_index_out_of_range() {
        let options = Options::new("Alice").with_landmark(LandmarkRole::Index, 3usize);
        let err = normalize(&options, &chapters(3)).unwrap_err();

        match err {
            ConfigurationError::LandmarkOutOfRange { role, index, chapters } => {
                assert_eq!(role, "index");
                assert_eq!(index, 3);
                assert_eq!(chapters, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_version_is_a_configuration_error() {
        let err = normalize(&Options::new("T").with_version(4), &chapters(1)).unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(ref v) if v[0].field == "options.version"));
    }

    #[test]
    fn test_dates() {
        let rfc = parse_date(Some("2020-02-03T04:05:06.789+01:00")).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2020-02-03T03:05:06+00:00");

        let day = parse_date(Some("1865-11-26")).unwrap();
        assert_eq!(day.format("%Y-%m-%d").to_string(), "1865-11-26");

        assert!(matches!(
            parse_date(Some("last tuesday")),
            Err(ConfigurationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let options = Options::new("Alice").with_date("2020-01-01");
        let a = normalize(&options, &chapters(1)).unwrap().options.identifier;
        let b = normalize(&options, &chapters(1)).unwrap().options.identifier;
        assert_eq!(a, b);

        let mut explicit = options.clone();
        explicit.identifier = Some("isbn:123".to_string());
        assert_eq!(normalize(&explicit, &chapters(1)).unwrap().options.identifier, "isbn:123");
    }
}
