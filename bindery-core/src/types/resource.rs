//! Fetched assets (images, fonts, cover)

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Outcome of fetching one reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Pending,
    Succeeded,
    /// Retries exhausted; the string is the last failure reason
    Failed(String),
}

/// A single fetched reference
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Source reference, exactly as it appeared in the input
    pub url: String,

    /// Target path inside `OEBPS/` when embedded as a chapter image
    pub filename: String,

    /// MIME type, known once fetched
    pub media_type: Option<String>,

    /// Payload; empty unless succeeded
    pub data: Vec<u8>,

    pub status: FetchStatus,
}

impl Resource {
    /// Create a pending resource for a reference
    pub fn pending(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            filename: image_filename(&url, None),
            url,
            media_type: None,
            data: Vec::new(),
            status: FetchStatus::Pending,
        }
    }

    /// Record a successful fetch
    pub fn succeed(mut self, media_type: String, data: Vec<u8>) -> Self {
        self.filename = image_filename(&self.url, Some(&media_type));
        self.media_type = Some(media_type);
        self.data = data;
        self.status = FetchStatus::Succeeded;
        self
    }

    /// Record a final failure
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        self.status = FetchStatus::Failed(reason.into());
        self
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == FetchStatus::Succeeded
    }

    /// File extension of the target filename
    pub fn extension(&self) -> &str {
        self.filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("bin")
    }
}

/// Deterministic image path: `images/<sha256(url) prefix>.<ext>`
fn image_filename(url: &str, media_type: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let ext = crate::fetch::media::extension_for(url, media_type);
    format!("images/{}.{}", &digest[..16], ext)
}

/// Resources keyed by source reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMap {
    resources: HashMap<String, Resource>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource under its own reference
    pub fn insert(&mut self, resource: Resource) {
        self.resources.insert(resource.url.clone(), resource);
    }

    /// Get a resource by reference
    pub fn get(&self, url: &str) -> Option<&Resource> {
        self.resources.get(url)
    }

    /// Get a resource by reference only if it was fetched
    pub fn succeeded(&self, url: &str) -> Option<&Resource> {
        self.get(url).filter(|r| r.is_succeeded())
    }

    /// Iterate over all resources
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_is_stable_per_url() {
        let a = Resource::pending("https://example.com/a.png").succeed("image/png".into(), vec![1]);
        let b = Resource::pending("https://example.com/a.png").succeed("image/png".into(), vec![2]);
        let c = Resource::pending("https://example.com/c.png").succeed("image/png".into(), vec![1]);

        assert_eq!(a.filename, b.filename);
        assert_ne!(a.filename, c.filename);
        assert!(a.filename.starts_with("images/"));
        assert!(a.filename.ends_with(".png"));
        assert_eq!(a.extension(), "png");
    }

    #[test]
    fn test_extension_follows_media_type() {
        let res = Resource::pending("https://example.com/image?id=4")
            .succeed("image/jpeg".into(), vec![0xff, 0xd8]);
        assert!(res.filename.ends_with(".jpg") || res.filename.ends_with(".jpeg"));
    }

    #[test]
    fn test_map_succeeded_filters_failures() {
        let mut map = ResourceMap::new();
        map.insert(Resource::pending("https://a").succeed("image/png".into(), vec![1]));
        map.insert(Resource::pending("https://b").fail("HTTP 500"));

        assert_eq!(map.len(), 2);
        assert!(map.succeeded("https://a").is_some());
        assert!(map.succeeded("https://b").is_none());
        assert_eq!(
            map.get("https://b").unwrap().status,
            FetchStatus::Failed("HTTP 500".to_string())
        );
    }
}
