//! Content assembler
//!
//! Turns normalized chapters plus fetched resources into finished XHTML
//! documents and the list of binary assets to embed.

pub mod xhtml;

pub use xhtml::{escape_xml, image_sources, is_fetch_candidate, to_xhtml, ImageRewrite};

use crate::log::Logger;
use crate::normalize::Normalized;
use crate::types::{NormChapter, NormOptions, Resource, ResourceMap};
use std::collections::HashSet;

/// A binary file placed in the package
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedAsset {
    pub id: String,

    /// Path relative to the package directory
    pub href: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl EmbeddedAsset {
    fn from_resource(id: impl Into<String>, href: impl Into<String>, resource: &Resource) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: resource
                .media_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            data: resource.data.clone(),
        }
    }
}

/// A chapter with its finished document
#[derive(Debug, Clone)]
pub struct AssembledChapter {
    pub chapter: NormChapter,
    pub xhtml: String,
}

/// Cover page and the image it shows
#[derive(Debug, Clone)]
pub struct CoverPage {
    pub xhtml: String,
    pub image: EmbeddedAsset,
}

/// Everything the encoder needs
#[derive(Debug, Clone)]
pub struct AssembledBook {
    pub options: NormOptions,
    pub chapters: Vec<AssembledChapter>,
    pub cover: Option<CoverPage>,
    pub fonts: Vec<EmbeddedAsset>,

    /// Chapter images in first-reference order
    pub images: Vec<EmbeddedAsset>,
}

/// References to fetch: cover, then fonts, then chapter images in order
pub fn discover_references(options: &NormOptions, chapters: &[NormChapter]) -> Vec<String> {
    let mut references = Vec::new();
    if let Some(cover) = &options.cover {
        references.push(cover.clone());
    }
    references.extend(options.fonts.iter().map(|font| font.url.clone()));
    for chapter in chapters {
        references.extend(
            image_sources(&chapter.content)
                .into_iter()
                .filter(|src| is_fetch_candidate(src)),
        );
    }
    references
}

/// Build chapter documents and collect embedded assets
pub fn assemble(normalized: Normalized, resources: &ResourceMap, logger: &Logger) -> AssembledBook {
    let Normalized {
        mut options,
        chapters,
    } = normalized;

    let cover = assemble_cover(&options, resources, logger);

    let mut fonts = Vec::new();
    for (i, font) in options.fonts.iter_mut().enumerate() {
        match resources.succeeded(&font.url) {
            Some(resource) => {
                let asset = EmbeddedAsset::from_resource(
                    format!("font_{i}"),
                    format!("fonts/{}", font.filename),
                    resource,
                );
                font.media_type = Some(asset.media_type.clone());
                fonts.push(asset);
            }
            None => logger.warn(format!("Font {} not embedded", font.filename)),
        }
    }

    let mut images = Vec::new();
    let mut embedded = HashSet::new();
    let mut assembled = Vec::with_capacity(chapters.len());

    for chapter in chapters {
        let content = to_xhtml(&chapter.content, |src| {
            if !is_fetch_candidate(src) {
                return ImageRewrite::Keep;
            }
            match resources.succeeded(src) {
                Some(resource) => {
                    if embedded.insert(resource.url.clone()) {
                        images.push(EmbeddedAsset::from_resource(
                            format!("image_{}", images.len()),
                            resource.filename.clone(),
                            resource,
                        ));
                    }
                    ImageRewrite::Replace(resource.filename.clone())
                }
                None => ImageRewrite::Drop,
            }
        });

        let mut body = String::new();
        if options.prepend_chapter_titles {
            body.push_str(&chapter_heading(&chapter));
        }
        body.push_str(&content);

        let authors = if chapter.author.is_empty() {
            &options.author
        } else {
            &chapter.author
        };
        let title = escape_xml(&chapter.title);
        let lang = escape_xml(&options.lang);
        let author = escape_xml(&authors.join(", "));
        let xhtml = options.templates.chapter.render(&[
            ("title", title.as_str()),
            ("lang", lang.as_str()),
            ("author", author.as_str()),
            ("body", body.as_str()),
        ]);

        logger.info(format!("Assembled {} ({})", chapter.filename, chapter.title));
        assembled.push(AssembledChapter { chapter, xhtml });
    }

    AssembledBook {
        options,
        chapters: assembled,
        cover,
        fonts,
        images,
    }
}

fn chapter_heading(chapter: &NormChapter) -> String {
    let mut html = format!("<h1>{}</h1>\n", escape_xml(&chapter.title));
    if !chapter.author.is_empty() {
        html.push_str(&format!(
            "<p class=\"epub-author\">{}</p>\n",
            escape_xml(&chapter.author.join(", "))
        ));
    }
    if let Some(url) = &chapter.url {
        let url = escape_xml(url);
        html.push_str(&format!(
            "<p class=\"epub-link\"><a href=\"{url}\">{url}</a></p>\n"
        ));
    }
    html
}

fn assemble_cover(options: &NormOptions, resources: &ResourceMap, logger: &Logger) -> Option<CoverPage> {
    let url = options.cover.as_deref()?;
    let Some(resource) = resources.succeeded(url) else {
        logger.warn(format!("Cover {url} not embedded"));
        return None;
    };

    let href = format!("images/cover.{}", resource.extension());
    let body = format!(
        "<div class=\"cover\"><img class=\"cover-image\" src=\"{}\" alt=\"{}\" /></div>",
        escape_xml(&href),
        escape_xml(&options.title)
    );
    let title = escape_xml(&options.title);
    let lang = escape_xml(&options.lang);
    let author = escape_xml(&options.author.join(", "));
    let xhtml = options.templates.chapter.render(&[
        ("title", title.as_str()),
        ("lang", lang.as_str()),
        ("author", author.as_str()),
        ("body", body.as_str()),
    ]);

    Some(CoverPage {
        xhtml,
        image: EmbeddedAsset::from_resource("image_cover", href, resource),
    })
}
