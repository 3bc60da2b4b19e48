//! Package document (`content.opf`)

use super::toc::Navigation;
use crate::assemble::{escape_xml, AssembledBook};
use crate::types::{EpubVersion, Manifest};

/// Render the OPF from the manifest, spine and landmarks
pub fn render_opf(book: &AssembledBook, manifest: &Manifest, nav: &Navigation) -> String {
    let options = &book.options;
    let version = options.version;

    let metadata = render_metadata(book);

    let manifest_xml = manifest
        .items
        .iter()
        .map(|item| {
            let properties = item
                .properties
                .as_ref()
                .map(|p| format!(" properties=\"{}\"", escape_xml(p)))
                .unwrap_or_default();
            format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{} />",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type),
                properties
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let spine_toc = manifest
        .ncx
        .as_ref()
        .map(|id| format!(" toc=\"{}\"", escape_xml(id)))
        .unwrap_or_default();

    let spine = manifest
        .spine
        .iter()
        .map(|id| format!("    <itemref idref=\"{}\" />", escape_xml(id)))
        .collect::<Vec<_>>()
        .join("\n");

    let guide = match version {
        EpubVersion::V2 if !nav.landmarks.is_empty() => {
            let references: Vec<String> = nav
                .landmarks
                .iter()
                .map(|landmark| {
                    format!(
                        "    <reference type=\"{}\" title=\"{}\" href=\"{}\" />",
                        landmark.role.guide_type(),
                        escape_xml(&landmark.title),
                        escape_xml(&landmark.href)
                    )
                })
                .collect();
            format!("  <guide>\n{}\n  </guide>", references.join("\n"))
        }
        _ => String::new(),
    };

    let lang = escape_xml(&options.lang);
    let uid = escape_xml(&options.identifier);
    options.templates.opf.render(&[
        ("version", version.package_version()),
        ("lang", lang.as_str()),
        ("uid", uid.as_str()),
        ("metadata", metadata.as_str()),
        ("manifest", manifest_xml.as_str()),
        ("spine_toc", spine_toc.as_str()),
        ("spine", spine.as_str()),
        ("guide", guide.as_str()),
    ])
}

fn render_metadata(book: &AssembledBook) -> String {
    let options = &book.options;
    let mut lines = vec![
        format!(
            "    <dc:identifier id=\"BookId\">{}</dc:identifier>",
            escape_xml(&options.identifier)
        ),
        format!("    <dc:title>{}</dc:title>", escape_xml(&options.title)),
        format!("    <dc:language>{}</dc:language>", escape_xml(&options.lang)),
    ];

    for (i, author) in options.author.iter().enumerate() {
        match options.version {
            EpubVersion::V3 => {
                lines.push(format!(
                    "    <dc:creator id=\"creator-{i}\">{}</dc:creator>",
                    escape_xml(author)
                ));
                lines.push(format!(
                    "    <meta refines=\"#creator-{i}\" property=\"role\" scheme=\"marc:relators\">aut</meta>"
                ));
            }
            EpubVersion::V2 => lines.push(format!(
                "    <dc:creator opf:role=\"aut\">{}</dc:creator>",
                escape_xml(author)
            )),
        }
    }

    lines.push(format!(
        "    <dc:publisher>{}</dc:publisher>",
        escape_xml(&options.publisher)
    ));
    if !options.description.is_empty() {
        lines.push(format!(
            "    <dc:description>{}</dc:description>",
            escape_xml(&options.description)
        ));
    }

    let timestamp = options.date.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    lines.push(format!("    <dc:date>{timestamp}</dc:date>"));
    if options.version == EpubVersion::V3 {
        lines.push(format!(
            "    <meta property=\"dcterms:modified\">{timestamp}</meta>"
        ));
    }

    if let Some(cover) = &book.cover {
        lines.push(format!(
            "    <meta name=\"cover\" content=\"{}\" />",
            escape_xml(&cover.image.id)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::encoder::manifest::build_manifest;
    use crate::encoder::toc::build_navigation;
    use crate::log::Logger;
    use crate::normalize::normalize;
    use crate::types::{Chapter, Options, ResourceMap};

    fn opf(options: Options) -> String {
        let normalized = normalize(&options, &[Chapter::new("<p/>")]).unwrap();
        let book = assemble(normalized, &ResourceMap::new(), &Logger::default());
        let manifest = build_manifest(&book);
        let nav = build_navigation(&book, &manifest);
        render_opf(&book, &manifest, &nav)
    }

    #[test]
    fn test_v3_package() {
        let xml = opf(Options::new("Alice's Adventures")
            .with_author(vec!["Lewis Carroll".to_string(), "John Tenniel".to_string()])
            .with_date("1865-11-26"));

        assert!(xml.contains(r#"version="3.0""#));
        assert!(xml.contains("<dc:title>Alice&#x27;s Adventures</dc:title>"));
        assert!(xml.contains(r#"<dc:creator id="creator-1">John Tenniel</dc:creator>"#));
        assert!(xml.contains(r#"<meta property="dcterms:modified">1865-11-26T00:00:00Z</meta>"#));
        assert!(xml.contains(r#"properties="nav""#));
        assert!(xml.contains("<spine>"));
        assert!(!xml.contains("<guide>"));
    }

    #[test]
    fn test_v2_package_declares_ncx_and_guide() {
        let xml = opf(Options::new("T").with_version(2));

        assert!(xml.contains(r#"version="2.0""#));
        assert!(xml.contains(r#"<spine toc="ncx">"#));
        assert!(xml.contains(r#"<dc:creator opf:role="aut">anonymous</dc:creator>"#));
        assert!(xml.contains(r#"<reference type="toc" title="Table of Contents" href="toc.xhtml" />"#));
        assert!(!xml.contains("dcterms:modified"));
    }
}
