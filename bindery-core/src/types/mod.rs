//! Core types: raw input shapes, the normalized model and pipeline entities

mod chapter;
mod font;
mod landmark;
mod manifest;
mod options;
mod resource;
mod toc;

pub use chapter::{Chapter, NormChapter};
pub use font::Font;
pub use landmark::{LandmarkKeyword, LandmarkRole, LandmarkTarget, LandmarkValue, Landmarks};
pub use manifest::{Manifest, ManifestItem};
pub use options::{Authors, BookDescription, EpubVersion, NormOptions, Options};
pub use resource::{FetchStatus, Resource, ResourceMap};
pub use toc::TocEntry;
