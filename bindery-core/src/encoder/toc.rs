//! Navigation: TOC tree, landmarks, and the documents rendered from them

use super::manifest::{toc_document, COVER_PAGE_HREF};
use crate::assemble::{escape_xml, AssembledBook};
use crate::types::{EpubVersion, LandmarkRole, LandmarkTarget, Manifest, TocEntry};

/// A resolved landmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub role: LandmarkRole,
    pub href: String,
    pub title: String,
}

/// Navigation structures shared by the NCX, the TOC document and the OPF guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    pub entries: Vec<TocEntry>,
    pub landmarks: Vec<Landmark>,
}

/// Build the TOC tree in spine order, and the landmarks in role order
pub fn build_navigation(book: &AssembledBook, manifest: &Manifest) -> Navigation {
    let options = &book.options;
    let (toc_id, toc_href) = toc_document(options.version);

    let mut entries = Vec::new();
    let mut number = 0;
    for id in &manifest.spine {
        if id == toc_id {
            entries.push(TocEntry::new(&options.toc_title, toc_href, toc_id));
            continue;
        }
        let Some(assembled) = book.chapters.iter().find(|c| &c.chapter.id == id) else {
            continue;
        };
        let chapter = &assembled.chapter;
        if chapter.exclude_from_toc {
            continue;
        }
        number += 1;
        let title = if options.number_chapters_in_toc {
            format!("{}. {}", number, chapter.title)
        } else {
            chapter.title.clone()
        };
        entries.push(TocEntry::new(title, &chapter.filename, &chapter.id));
    }

    let landmarks = options
        .landmarks
        .iter()
        .filter_map(|(role, target)| {
            let href = match target {
                LandmarkTarget::Hidden => return None,
                LandmarkTarget::Cover => {
                    book.cover.as_ref()?;
                    COVER_PAGE_HREF.to_string()
                }
                LandmarkTarget::Toc => toc_href.to_string(),
                LandmarkTarget::Chapter(index) => book.chapters.get(*index)?.chapter.filename.clone(),
            };
            Some(Landmark {
                role: *role,
                href,
                title: role.label().to_string(),
            })
        })
        .collect();

    Navigation { entries, landmarks }
}

/// XHTML table of contents: `nav.xhtml` (3) or `toc.xhtml` (2)
pub fn render_toc_document(book: &AssembledBook, nav: &Navigation) -> String {
    let options = &book.options;

    let toc = nav
        .entries
        .iter()
        .map(|entry| {
            format!(
                "<li class=\"table-of-content\"><a href=\"{}\">{}</a></li>",
                escape_xml(&entry.href),
                escape_xml(&entry.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let landmarks = match options.version {
        EpubVersion::V3 if !nav.landmarks.is_empty() => {
            let items: Vec<String> = nav
                .landmarks
                .iter()
                .map(|landmark| {
                    format!(
                        "<li><a epub:type=\"{}\" href=\"{}\">{}</a></li>",
                        landmark.role.epub_type(),
                        escape_xml(&landmark.href),
                        escape_xml(&landmark.title)
                    )
                })
                .collect();
            format!(
                "<nav id=\"landmarks\" epub:type=\"landmarks\" hidden=\"hidden\">\n<ol>\n{}\n</ol>\n</nav>",
                items.join("\n")
            )
        }
        _ => String::new(),
    };

    let title = escape_xml(&options.title);
    let lang = escape_xml(&options.lang);
    let toc_title = escape_xml(&options.toc_title);
    options.templates.toc.render(&[
        ("title", title.as_str()),
        ("lang", lang.as_str()),
        ("toc_title", toc_title.as_str()),
        ("toc", toc.as_str()),
        ("landmarks", landmarks.as_str()),
    ])
}

/// NCX with a flat `navMap` and sequential `playOrder`
pub fn render_ncx(book: &AssembledBook, nav: &Navigation) -> String {
    let options = &book.options;

    let nav_map = nav
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "    <navPoint id=\"navpoint-{order}\" playOrder=\"{order}\">\n      <navLabel><text>{}</text></navLabel>\n      <content src=\"{}\" />\n    </navPoint>",
                escape_xml(&entry.title),
                escape_xml(&entry.href),
                order = i + 1,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let uid = escape_xml(&options.identifier);
    let title = escape_xml(&options.title);
    let author = escape_xml(&options.author.join(", "));
    options.templates.ncx.render(&[
        ("uid", uid.as_str()),
        ("title", title.as_str()),
        ("author", author.as_str()),
        ("nav_map", nav_map.as_str()),
    ])
}
