//! Bindery Core Library
//!
//! Builds EPUB 2 and EPUB 3 packages from a book description: options plus
//! a list of HTML chapters. The pipeline runs strictly forward:
//! normalize, fetch referenced assets, assemble XHTML documents, build the
//! manifest, spine and navigation, and write the OCF container.
//!
//! ```no_run
//! use bindery_core::{generate, Chapter, Options};
//!
//! # async fn run() -> bindery_core::Result<()> {
//! let options = Options::new("Alice's Adventures in Wonderland").with_author("Lewis Carroll");
//! let chapters = vec![Chapter::new("<p>Alice was beginning to get very tired...</p>")
//!     .with_title("Down the Rabbit-Hole")];
//! let epub: Vec<u8> = generate(options, chapters).await?;
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod encoder;
pub mod error;
pub mod fetch;
pub mod generator;
pub mod log;
pub mod normalize;
pub mod template;
pub mod types;
pub mod validate;

pub use error::{BinderyError, ConfigurationError, DownloadError, PackagingError, Result};
pub use fetch::{AssetSource, HttpSource, MemorySource};
pub use generator::{generate, EpubGenerator};
pub use log::{LogLevel, Verbosity};
pub use types::{
    Authors, BookDescription, Chapter, EpubVersion, Font, LandmarkKeyword, LandmarkRole,
    LandmarkValue, Options,
};
pub use validate::{validate, Violation};
