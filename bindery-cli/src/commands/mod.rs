//! CLI command implementations

mod build;
mod check;

pub use build::{build, Overrides};
pub use check::check;

use anyhow::{Context, Result};
use bindery_core::BookDescription;
use std::fs;

/// Read a JSON book description
fn read_description(input: &str) -> Result<BookDescription> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to open input file: {}", input))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", input))
}
