//! HTML fragment to well-formed XHTML

use ego_tree::NodeRef;
use scraper::{Html, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// What to do with an `<img>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRewrite {
    /// Leave the element as written
    Keep,
    /// Point `src` at an embedded copy
    Replace(String),
    /// Remove the element
    Drop,
}

/// Whether an image `src` should be fetched and embedded
pub fn is_fetch_candidate(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("file://")
}

/// Every `<img src>` value in document order
pub fn image_sources(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter(|el| el.name() == "img")
        .filter_map(|el| el.attr("src"))
        .map(str::to_string)
        .collect()
}

/// Re-serialize an HTML fragment as XHTML, rewriting images on the way
pub fn to_xhtml<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> ImageRewrite,
{
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        write_node(child, &mut out, &mut rewrite);
    }
    out
}

fn write_node<F>(node: NodeRef<Node>, out: &mut String, rewrite: &mut F)
where
    F: FnMut(&str) -> ImageRewrite,
{
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => {
            let name = el.name();
            let mut src = None;
            if name == "img" {
                if let Some(original) = el.attr("src") {
                    match rewrite(original) {
                        ImageRewrite::Keep => {}
                        ImageRewrite::Replace(path) => src = Some(path),
                        ImageRewrite::Drop => return,
                    }
                }
            }

            out.push('<');
            out.push_str(name);

            let mut attrs: Vec<(&str, &str)> =
                el.attrs().filter(|(attr, _)| is_xml_name(attr)).collect();
            if name == "img" && el.attr("alt").is_none() {
                attrs.push(("alt", ""));
            }
            if el.attr("xmlns").is_none() {
                match name {
                    "svg" => attrs.push(("xmlns", "http://www.w3.org/2000/svg")),
                    "math" => attrs.push(("xmlns", "http://www.w3.org/1998/Math/MathML")),
                    _ => {}
                }
            }

            // Attribute storage order is not guaranteed; sort for stable output
            attrs.sort_by(|a, b| a.0.cmp(b.0));
            for (attr, value) in attrs {
                let value = match (&src, attr) {
                    (Some(path), "src") => path.as_str(),
                    _ => value,
                };
                out.push_str(&format!(" {}=\"{}\"", attr, escape_xml(value)));
            }

            if VOID_ELEMENTS.contains(&name) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in node.children() {
                write_node(child, out, rewrite);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        // Comments, doctypes and processing instructions are dropped
        _ => {}
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
