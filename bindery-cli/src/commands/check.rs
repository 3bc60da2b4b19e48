//! Check command implementation

use super::read_description;
use anyhow::{bail, Result};
use bindery_core::{BinderyError, ConfigurationError, EpubGenerator};

/// Validate and normalize a book description
pub fn check(input: &str) -> Result<()> {
    let description = read_description(input)?;

    match EpubGenerator::from_description(description).check() {
        Ok(normalized) => {
            let options = &normalized.options;
            println!("Valid book description");
            println!("  Title: {}", options.title);
            println!("  EPUB version: {}", options.version.package_version());
            println!("  Chapters: {}", normalized.chapters.len());
            for chapter in &normalized.chapters {
                println!("    {} {}", chapter.filename, chapter.title);
            }
            Ok(())
        }
        Err(BinderyError::Configuration(ConfigurationError::Invalid(violations))) => {
            eprintln!("Invalid book description:");
            for violation in &violations {
                eprintln!("  {}", violation);
            }
            bail!("Validation failed for {}", input);
        }
        Err(e) => {
            eprintln!("Invalid book description: {}", e);
            bail!("Validation failed for {}", input);
        }
    }
}
