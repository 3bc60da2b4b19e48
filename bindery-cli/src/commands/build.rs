//! Build command implementation

use super::read_description;
use anyhow::{Context, Result};
use bindery_core::{EpubGenerator, HttpSource, LogLevel, Verbosity};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Command-line settings that take precedence over the description
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub version: Option<u8>,
    pub ignore_failed_downloads: bool,
}

/// Build an EPUB from a JSON book description
pub async fn build(input: &str, output: &str, overrides: Overrides, verbose: bool) -> Result<()> {
    let mut description = read_description(input)?;
    if let Some(version) = overrides.version {
        description.options.version = Some(version);
    }
    if overrides.ignore_failed_downloads {
        description.options.ignore_failed_downloads = Some(true);
    }

    // Relative asset paths are resolved next to the description
    let base_dir = Path::new(input)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let source = HttpSource::new().with_base_dir(base_dir);

    let title = description.options.title.clone();

    // Set up spinner with animation
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Building '{}'...", title));

    let verbosity = if verbose || description.options.verbose.unwrap_or(false) {
        Verbosity::Default
    } else {
        let sink = pb.clone();
        Verbosity::custom(move |level, message| match level {
            LogLevel::Info => sink.set_message(message.to_string()),
            LogLevel::Warn => sink.println(format!("warning: {}", message)),
        })
    };

    let result = EpubGenerator::from_description(description)
        .with_source(Arc::new(source))
        .with_verbosity(verbosity)
        .generate()
        .await;

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e).with_context(|| format!("Failed to build {}", input));
        }
    };

    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    tracing::info!("Wrote {} bytes to {}", bytes.len(), output);
    pb.finish_with_message(format!("Built '{}' -> {}", title, output));

    Ok(())
}
