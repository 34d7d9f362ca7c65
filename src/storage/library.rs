//! Custom template library files
//!
//! A library file is YAML (or JSON with a `.json` extension) holding a list
//! of templates, either at the top level or under a `templates:` key. The
//! file is validated once when loaded; an invalid library is rejected.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::domain::{MilestoneTemplate, TemplateLibrary};

#[derive(Deserialize)]
#[serde(untagged)]
enum LibraryDocument {
    List(Vec<MilestoneTemplate>),
    Wrapped { templates: Vec<MilestoneTemplate> },
}

/// Parses and validates library text
pub fn parse_library(content: &str, json: bool) -> Result<TemplateLibrary> {
    let document: LibraryDocument = if json {
        serde_json::from_str(content).context("Failed to parse template library JSON")?
    } else {
        serde_yaml::from_str(content).context("Failed to parse template library YAML")?
    };

    let templates = match document {
        LibraryDocument::List(templates) => templates,
        LibraryDocument::Wrapped { templates } => templates,
    };

    TemplateLibrary::new(templates).context("Template library failed validation")
}

/// Loads and validates a template library file
pub fn load_library(path: &Path) -> Result<TemplateLibrary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template library: {}", path.display()))?;

    let json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let library = parse_library(&content, json)
        .with_context(|| format!("Invalid template library: {}", path.display()))?;
    debug!("loaded {} templates from {}", library.len(), path.display());
    Ok(library)
}
