//! Document templates with `{{name}}` placeholders
//!
//! Every generated document (chapter XHTML, OPF, NCX, TOC page) is rendered
//! from a template. Built-in defaults exist per EPUB version; callers may
//! override any of them. Placeholder values are inserted verbatim, so callers
//! escape them first.

use crate::error::ConfigurationError;
use crate::types::{EpubVersion, Options};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const CHAPTER_VARS: &[&str] = &["title", "lang", "author", "body"];
const OPF_VARS: &[&str] = &[
    "version", "lang", "uid", "metadata", "manifest", "spine_toc", "spine", "guide",
];
const NCX_VARS: &[&str] = &["uid", "title", "author", "nav_map"];
const TOC_VARS: &[&str] = &["title", "lang", "toc_title", "toc", "landmarks"];

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").expect("valid placeholder regex"))
}

/// A compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: &'static str,
    source: String,
}

impl Template {
    /// Check that every placeholder in `source` is one of `allowed`
    pub fn compile(
        name: &'static str,
        source: impl Into<String>,
        allowed: &[&str],
    ) -> Result<Self, ConfigurationError> {
        let source = source.into();
        for caps in placeholder().captures_iter(&source) {
            let var = &caps[1];
            if !allowed.contains(&var) {
                return Err(ConfigurationError::InvalidTemplate {
                    name: name.to_string(),
                    reason: format!(
                        "unknown placeholder `{{{{{}}}}}`, expected one of: {}",
                        var,
                        allowed.join(", ")
                    ),
                });
            }
        }
        Ok(Self { name, source })
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Substitute placeholders; unset ones render empty
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &Captures| {
                vars.iter()
                    .find(|(key, _)| *key == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// The four document templates of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub chapter: Template,
    pub opf: Template,
    pub ncx: Template,
    pub toc: Template,
}

impl Templates {
    /// Defaults for `version`, with any overrides from `options`
    pub fn resolve(version: EpubVersion, options: &Options) -> Result<Self, ConfigurationError> {
        let (chapter, toc) = match version {
            EpubVersion::V2 => (CHAPTER_XHTML_2, TOC_XHTML_2),
            EpubVersion::V3 => (CHAPTER_XHTML_3, NAV_XHTML_3),
        };

        Ok(Self {
            chapter: Template::compile(
                "chapterXHTML",
                options.chapter_xhtml.as_deref().unwrap_or(chapter),
                CHAPTER_VARS,
            )?,
            opf: Template::compile(
                "contentOPF",
                options.content_opf.as_deref().unwrap_or(CONTENT_OPF),
                OPF_VARS,
            )?,
            ncx: Template::compile(
                "tocNCX",
                options.toc_ncx.as_deref().unwrap_or(TOC_NCX),
                NCX_VARS,
            )?,
            toc: Template::compile(
                "tocXHTML",
                options.toc_xhtml.as_deref().unwrap_or(toc),
                TOC_VARS,
            )?,
        })
    }
}

pub const DEFAULT_CSS: &str = r#".epub-author {
  color: #555;
}

.epub-link {
  margin-bottom: 30px;
}

.epub-link a {
  color: #666;
  font-size: 90%;
}

.toc-author {
  font-size: 90%;
  color: #555;
}

.toc-link {
  color: #999;
  font-size: 85%;
  display: block;
}

.cover-image {
  display: block;
  margin: 0 auto;
  max-width: 100%;
  max-height: 100%;
}

hr {
  border: 0;
  border-bottom: 1px solid #dedede;
  margin: 60px 10%;
}
"#;

const CHAPTER_XHTML_3: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{{lang}}" xml:lang="{{lang}}">
<head>
<meta charset="UTF-8" />
<meta name="author" content="{{author}}" />
<title>{{title}}</title>
<link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
{{body}}
</body>
</html>
"#;

const CHAPTER_XHTML_2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{{lang}}">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />
<meta name="author" content="{{author}}" />
<title>{{title}}</title>
<link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
{{body}}
</body>
</html>
"#;

const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="{{version}}" unique-identifier="BookId" xml:lang="{{lang}}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
{{metadata}}
  </metadata>
  <manifest>
{{manifest}}
  </manifest>
  <spine{{spine_toc}}>
{{spine}}
  </spine>
{{guide}}
</package>
"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{{uid}}" />
    <meta name="dtb:generator" content="bindery" />
    <meta name="dtb:depth" content="1" />
    <meta name="dtb:totalPageCount" content="0" />
    <meta name="dtb:maxPageNumber" content="0" />
  </head>
  <docTitle>
    <text>{{title}}</text>
  </docTitle>
  <docAuthor>
    <text>{{author}}</text>
  </docAuthor>
  <navMap>
{{nav_map}}
  </navMap>
</ncx>
"#;

const NAV_XHTML_3: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{{lang}}" xml:lang="{{lang}}">
<head>
<meta charset="UTF-8" />
<title>{{title}}</title>
<link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
<nav id="toc" epub:type="toc">
<h1 class="h1">{{toc_title}}</h1>
<ol>
{{toc}}
</ol>
</nav>
{{landmarks}}
</body>
</html>
"#;

const TOC_XHTML_2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{{lang}}">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />
<title>{{title}}</title>
<link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
<h1 class="h1">{{toc_title}}</h1>
<div id="toc">
<ol>
{{toc}}
</ol>
</div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_and_blanks_missing() {
        let template = Template::compile("t", "<h1>{{ title }}</h1>{{body}}", CHAPTER_VARS).unwrap();
        assert_eq!(template.render(&[("title", "Hi")]), "<h1>Hi</h1>");
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let err = Template::compile("chapterXHTML", "{{bogus}}", CHAPTER_VARS).unwrap_err();
        match err {
            ConfigurationError::InvalidTemplate { name, reason } => {
                assert_eq!(name, "chapterXHTML");
                assert!(reason.contains("{{bogus}}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_follow_version() {
        let options = Options::new("T");
        let v2 = Templates::resolve(EpubVersion::V2, &options).unwrap();
        let v3 = Templates::resolve(EpubVersion::V3, &options).unwrap();

        assert!(v2.chapter.render(&[]).contains("XHTML 1.1"));
        assert!(v3.toc.render(&[]).contains(r#"epub:type="toc""#));
        assert_eq!(v2.opf, v3.opf);
    }

    #[test]
    fn test_override_replaces_default() {
        let mut options = Options::new("T");
        options.chapter_xhtml = Some("<body>{{body}}</body>".to_string());
        let templates = Templates::resolve(EpubVersion::V3, &options).unwrap();

        assert_eq!(templates.chapter.render(&[("body", "<p/>")]), "<body><p/></body>");
        assert_eq!(templates.chapter.name(), "chapterXHTML");
    }
}
