//! Generation pipeline
//!
//! Normalize, fetch, assemble, encode. Each call owns all of its state; the
//! generator can be reused and two calls never share anything.

use crate::assemble::{assemble, discover_references};
use crate::encoder::encode;
use crate::error::Result;
use crate::fetch::{AssetSource, FetchPolicy, Fetcher, HttpSource};
use crate::log::{Logger, Verbosity};
use crate::normalize::{normalize, Normalized};
use crate::types::{BookDescription, Chapter, Options};
use std::sync::Arc;

/// Builds one EPUB from options and chapters
#[derive(Clone)]
pub struct EpubGenerator {
    options: Options,
    chapters: Vec<Chapter>,
    source: Arc<dyn AssetSource>,
    verbosity: Option<Verbosity>,
}

impl EpubGenerator {
    pub fn new(options: Options, chapters: Vec<Chapter>) -> Self {
        Self {
            options,
            chapters,
            source: Arc::new(HttpSource::new()),
            verbosity: None,
        }
    }

    pub fn from_description(description: BookDescription) -> Self {
        Self::new(description.options, description.chapters)
    }

    /// Fetch assets through `source` instead of the network
    pub fn with_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.source = source;
        self
    }

    /// Override the `verbose` option
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    /// Validate and normalize without fetching anything
    pub fn check(&self) -> Result<Normalized> {
        let mut normalized = normalize(&self.options, &self.chapters)?;
        if let Some(verbosity) = &self.verbosity {
            normalized.options.verbosity = verbosity.clone();
        }
        Ok(normalized)
    }

    /// Run the whole pipeline and return the archive bytes
    pub async fn generate(&self) -> Result<Vec<u8>> {
        let normalized = self.check()?;
        let logger = Logger::new(normalized.options.verbosity.clone());
        logger.info(format!(
            "Generating EPUB {} \"{}\" with {} chapter(s)",
            normalized.options.version.package_version(),
            normalized.options.title,
            normalized.chapters.len()
        ));

        let references = discover_references(&normalized.options, &normalized.chapters);
        let fetcher = Fetcher::new(
            self.source.as_ref(),
            FetchPolicy::from(&normalized.options),
            &logger,
        );
        let resources = fetcher.fetch_all(references).await?;

        let book = assemble(normalized, &resources, &logger);
        let bytes = encode(&book)?;

        logger.info(format!("Packaged {} byte(s)", bytes.len()));
        Ok(bytes)
    }
}

/// One-call entry point with default settings
pub async fn generate(options: Options, chapters: Vec<Chapter>) -> Result<Vec<u8>> {
    EpubGenerator::new(options, chapters).generate().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BinderyError, ConfigurationError};
    use crate::fetch::MemorySource;
    use crate::log::LogLevel;
    use crate::types::Font;
    use std::io;
    use std::sync::Mutex;

    /// Collects formatted `tracing` output
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn generate_with_retry(verbosity: Verbosity) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let url = "https://a/rabbit.png";
        let source = Arc::new(
            MemorySource::new()
                .with(url, Some("image/png"), vec![1, 2, 3])
                .failing_first(url, 1),
        );
        let mut options = Options::new("T");
        options.retry_delay = Some(0);
        EpubGenerator::new(options, vec![Chapter::new(format!(r#"<img src="{url}">"#))])
            .with_source(source.clone())
            .with_verbosity(verbosity)
            .generate()
            .await
            .unwrap();
        assert_eq!(source.calls(url), 2);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_configuration_error_before_any_fetch() {
        let source = Arc::new(MemorySource::new());
        let options = Options::new("T").with_cover("https://a/cover.png").with_version(5);
        let result = EpubGenerator::new(options, vec![Chapter::new("<p/>")])
            .with_source(source.clone())
            .generate()
            .await;

        assert!(matches!(
            result,
            Err(BinderyError::Configuration(ConfigurationError::Invalid(_)))
        ));
        assert_eq!(source.calls("https://a/cover.png"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_font_filename_fails_before_fetch() {
        let source = Arc::new(
            MemorySource::new()
                .with("https://a/one.ttf", None, b"one".to_vec())
                .with("https://a/two.ttf", None, b"two".to_vec()),
        );
        let options = Options::new("T")
            .with_font(Font::new("f.ttf", "https://a/one.ttf"))
            .with_font(Font::new("f.ttf", "https://a/two.ttf"));
        let result = EpubGenerator::new(options, vec![Chapter::new("<p/>")])
            .with_source(source.clone())
            .generate()
            .await;

        assert!(matches!(
            result,
            Err(BinderyError::Configuration(ConfigurationError::DuplicateFilename(name))) if name == "f.ttf"
        ));
        assert_eq!(source.calls("https://a/one.ttf"), 0);
        assert_eq!(source.calls("https://a/two.ttf"), 0);
    }

    #[tokio::test]
    async fn test_silent_generation_emits_nothing() {
        assert_eq!(generate_with_retry(Verbosity::Silent).await, "");

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let custom = Verbosity::custom(move |_, message| {
            sink.lock().unwrap().push(message.to_string());
        });
        assert_eq!(generate_with_retry(custom).await, "");
        assert!(messages.lock().unwrap().iter().any(|m| m.contains("retry 1/3")));
    }

    #[tokio::test]
    async fn test_default_verbosity_uses_tracing() {
        let output = generate_with_retry(Verbosity::Default).await;
        assert!(output.contains("Generating EPUB 3.0"));
        assert!(output.contains("retry 1/3"));
    }

    #[tokio::test]
    async fn test_custom_verbosity_receives_progress() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let bytes = EpubGenerator::new(Options::new("T"), vec![Chapter::new("<p/>")])
            .with_source(Arc::new(MemorySource::new()))
            .with_verbosity(Verbosity::custom(move |level, message| {
                sink.lock().unwrap().push((level, message.to_string()));
            }))
            .generate()
            .await
            .unwrap();

        assert!(!bytes.is_empty());
        let messages = messages.lock().unwrap();
        assert!(messages.iter().all(|(level, _)| *level == LogLevel::Info));
        assert!(messages[0].1.contains("Generating EPUB 3.0"));
    }
}
