//! Manifest and spine builder

use crate::assemble::AssembledBook;
use crate::types::{EpubVersion, Manifest, ManifestItem};

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

pub const NCX_ID: &str = "ncx";
pub const NCX_HREF: &str = "toc.ncx";
pub const STYLE_ID: &str = "style";
pub const STYLE_HREF: &str = "style.css";
pub const COVER_PAGE_ID: &str = "cover";
pub const COVER_PAGE_HREF: &str = "cover.xhtml";

/// Manifest id and href of the XHTML table of contents
pub fn toc_document(version: EpubVersion) -> (&'static str, &'static str) {
    match version {
        EpubVersion::V2 => ("toc", "toc.xhtml"),
        EpubVersion::V3 => ("nav", "nav.xhtml"),
    }
}

/// List every file and derive the reading order
///
/// Items are listed in archive order. The spine holds the cover page, then
/// `beforeToc` chapters, the TOC document when `tocInTOC` is set, and the
/// remaining chapters; all in input order.
pub fn build_manifest(book: &AssembledBook) -> Manifest {
    let options = &book.options;
    let version = options.version;
    let (toc_id, toc_href) = toc_document(version);

    let mut items = Vec::new();

    let ncx = options.has_ncx().then(|| NCX_ID.to_string());
    if ncx.is_some() {
        items.push(ManifestItem::new(NCX_ID, NCX_HREF, NCX_MEDIA_TYPE));
    }

    let toc_item = ManifestItem::new(toc_id, toc_href, XHTML_MEDIA_TYPE);
    items.push(match version {
        EpubVersion::V3 => toc_item.with_properties("nav"),
        EpubVersion::V2 => toc_item,
    });

    if book.cover.is_some() {
        items.push(ManifestItem::new(COVER_PAGE_ID, COVER_PAGE_HREF, XHTML_MEDIA_TYPE));
    }

    for assembled in &book.chapters {
        let chapter = &assembled.chapter;
        items.push(ManifestItem::new(&chapter.id, &chapter.filename, XHTML_MEDIA_TYPE));
    }

    items.push(ManifestItem::new(STYLE_ID, STYLE_HREF, "text/css"));

    if let Some(cover) = &book.cover {
        let image = ManifestItem::new(&cover.image.id, &cover.image.href, &cover.image.media_type);
        items.push(match version {
            EpubVersion::V3 => image.with_properties("cover-image"),
            EpubVersion::V2 => image,
        });
    }

    for asset in book.fonts.iter().chain(&book.images) {
        items.push(ManifestItem::new(&asset.id, &asset.href, &asset.media_type));
    }

    let mut spine = Vec::new();
    if book.cover.is_some() {
        spine.push(COVER_PAGE_ID.to_string());
    }
    let (before, after): (Vec<_>, Vec<_>) =
        book.chapters.iter().partition(|c| c.chapter.before_toc);
    spine.extend(before.iter().map(|c| c.chapter.id.clone()));
    if options.toc_in_toc {
        spine.push(toc_id.to_string());
    }
    spine.extend(after.iter().map(|c| c.chapter.id.clone()));

    for (order, id) in spine.iter().enumerate() {
        if let Some(item) = items.iter_mut().find(|item| &item.id == id) {
            item.spine_order = Some(order);
        }
    }

    Manifest { items, spine, ncx }
}
