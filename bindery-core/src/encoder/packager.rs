//! OCF container writer

use crate::error::PackagingError;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const MIMETYPE: &str = "application/epub+zip";
pub const PACKAGE_DIR: &str = "OEBPS";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Ordered archive entries
///
/// `mimetype` and `META-INF/container.xml` are always written first; every
/// added entry lives under the package directory.
#[derive(Debug, Default)]
pub struct Package {
    entries: Vec<(String, Vec<u8>)>,
    paths: HashSet<String>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at `href`, relative to the package directory
    pub fn add(&mut self, href: &str, data: impl Into<Vec<u8>>) -> Result<(), PackagingError> {
        let path = format!("{PACKAGE_DIR}/{href}");
        if !self.paths.insert(path.clone()) {
            return Err(PackagingError::DuplicateEntry(path));
        }
        self.entries.push((path, data.into()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the archive
    ///
    /// Every entry carries the DOS epoch timestamp, so identical packages
    /// produce identical bytes.
    pub fn finish(self) -> Result<Vec<u8>, PackagingError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let stored = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());
        let deflated = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        for (path, data) in &self.entries {
            zip.start_file(path.as_str(), deflated)?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
