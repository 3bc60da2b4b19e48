//! Package manifest and spine

/// One file listed in the OPF manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,

    /// Path relative to `OEBPS/`
    pub href: String,
    pub media_type: String,

    /// EPUB 3 `properties` attribute
    pub properties: Option<String>,

    /// Position in the spine, if the item is part of the reading order
    pub spine_order: Option<usize>,
}

impl ManifestItem {
    pub fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
            spine_order: None,
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }

    pub fn in_spine(&self) -> bool {
        self.spine_order.is_some()
    }
}

/// Manifest items in package order, plus the reading order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub items: Vec<ManifestItem>,

    /// Spine as manifest ids
    pub spine: Vec<String>,

    /// Manifest id of the NCX, when the spine declares one
    pub ncx: Option<String>,
}

impl Manifest {
    /// Look up an item by id
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Spine entries resolved to their items
    pub fn spine_items(&self) -> impl Iterator<Item = &ManifestItem> {
        self.spine.iter().filter_map(|id| self.item(id))
    }
}
