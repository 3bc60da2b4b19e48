//! EPUB encoder: manifest, navigation, package document and container

pub mod manifest;
pub mod opf;
pub mod packager;
pub mod toc;

pub use manifest::build_manifest;
pub use packager::Package;
pub use toc::{build_navigation, Landmark, Navigation};

use crate::assemble::AssembledBook;
use crate::error::PackagingError;
use manifest::{toc_document, COVER_PAGE_ID, NCX_ID, STYLE_ID};
use std::collections::HashMap;

/// Serialize an assembled book into EPUB bytes
///
/// Archive order: `mimetype`, `META-INF/container.xml`, `OEBPS/content.opf`,
/// then manifest items in manifest order.
pub fn encode(book: &AssembledBook) -> Result<Vec<u8>, PackagingError> {
    let manifest = build_manifest(book);
    let nav = build_navigation(book, &manifest);

    let opf = opf::render_opf(book, &manifest, &nav);
    let toc_xhtml = toc::render_toc_document(book, &nav);
    let ncx = manifest.ncx.as_ref().map(|_| toc::render_ncx(book, &nav));

    let (toc_id, _) = toc_document(book.options.version);
    let mut contents: HashMap<&str, &[u8]> = HashMap::new();
    contents.insert(toc_id, toc_xhtml.as_bytes());
    contents.insert(STYLE_ID, book.options.css.as_bytes());
    if let Some(ncx) = &ncx {
        contents.insert(NCX_ID, ncx.as_bytes());
    }
    if let Some(cover) = &book.cover {
        contents.insert(COVER_PAGE_ID, cover.xhtml.as_bytes());
        contents.insert(&cover.image.id, &cover.image.data);
    }
    for assembled in &book.chapters {
        contents.insert(&assembled.chapter.id, assembled.xhtml.as_bytes());
    }
    for asset in book.fonts.iter().chain(&book.images) {
        contents.insert(&asset.id, &asset.data);
    }

    let mut package = Package::new();
    package.add("content.opf", opf)?;
    for item in &manifest.items {
        let data = contents
            .get(item.id.as_str())
            .ok_or_else(|| PackagingError::MissingContent(item.id.clone()))?;
        package.add(&item.href, *data)?;
    }

    package.finish()
}
