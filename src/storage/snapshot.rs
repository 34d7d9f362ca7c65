//! Milestone snapshot files
//!
//! A snapshot is the list of milestones exported by the persistence layer.
//! Supported layouts:
//!
//! | Extension | Layout |
//! |-----------|--------|
//! | `.json` | array of milestones, or `{"milestones": [...]}` |
//! | `.jsonl` | one milestone per line |
//! | `.yaml` / `.yml` | sequence of milestones, or `milestones:` key |
//!
//! The path `-` reads JSON from stdin.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;

use crate::domain::Milestone;

/// On-disk layout of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Jsonl,
    Yaml,
}

impl SnapshotFormat {
    /// Picks the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jsonl") | Some("ndjson") => SnapshotFormat::Jsonl,
            Some("yaml") | Some("yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    List(Vec<Milestone>),
    Wrapped { milestones: Vec<Milestone> },
}

impl SnapshotDocument {
    fn into_milestones(self) -> Vec<Milestone> {
        match self {
            SnapshotDocument::List(milestones) => milestones,
            SnapshotDocument::Wrapped { milestones } => milestones,
        }
    }
}

/// Parses snapshot text in the given format
pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> Result<Vec<Milestone>> {
    match format {
        SnapshotFormat::Json => {
            let document: SnapshotDocument =
                serde_json::from_str(content).context("Failed to parse JSON snapshot")?;
            Ok(document.into_milestones())
        }
        SnapshotFormat::Yaml => {
            let document: SnapshotDocument =
                serde_yaml::from_str(content).context("Failed to parse YAML snapshot")?;
            Ok(document.into_milestones())
        }
        SnapshotFormat::Jsonl => {
            let mut milestones = Vec::new();
            for (line_num, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }

                let milestone: Milestone = serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse milestone at line {}", line_num + 1))?;
                milestones.push(milestone);
            }
            Ok(milestones)
        }
    }
}

/// Reads a snapshot from a file, or JSON from stdin when the path is `-`
pub fn read_snapshot(path: &Path) -> Result<Vec<Milestone>> {
    let (content, format) = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read snapshot from stdin")?;
        (buffer, SnapshotFormat::Json)
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        (content, SnapshotFormat::from_path(path))
    };

    let milestones = parse_snapshot(&content, format)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;
    debug!(
        "read {} milestones from {} ({:?})",
        milestones.len(),
        path.display(),
        format
    );

    let mut seen = HashSet::new();
    for milestone in &milestones {
        if !seen.insert(&milestone.id) {
            warn!(
                "duplicate milestone id '{}' in {}; only the first is analysed",
                milestone.id,
                path.display()
            );
        }
    }
    Ok(milestones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_from_extension() {
        assert_eq!(SnapshotFormat::from_path(Path::new("a.jsonl")), SnapshotFormat::Jsonl);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.YML")), SnapshotFormat::Yaml);
        assert_eq!(SnapshotFormat::from_path(Path::new("a.json")), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_path(Path::new("export")), SnapshotFormat::Json);
    }

    #[test]
    fn parse_json_array_and_wrapper() {
        let list = r#"[{"id": "a", "name": "A"}]"#;
        assert_eq!(parse_snapshot(list, SnapshotFormat::Json).unwrap().len(), 1);

        let wrapped = r#"{"milestones": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}]}"#;
        assert_eq!(parse_snapshot(wrapped, SnapshotFormat::Json).unwrap().len(), 2);
    }

    #[test]
    fn parse_jsonl_skips_blank_lines() {
        let content = "{\"id\": \"a\", \"name\": \"A\"}\n\n{\"id\": \"b\", \"name\": \"B\", \"dependencies\": [\"a\"]}\n";
        let milestones = parse_snapshot(content, SnapshotFormat::Jsonl).unwrap();
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[1].dependencies[0].as_str(), "a");
    }

    #[test]
    fn jsonl_error_names_the_line() {
        let content = "{\"id\": \"a\", \"name\": \"A\"}\nnot json\n";
        let err = parse_snapshot(content, SnapshotFormat::Jsonl).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn parse_yaml() {
        let content = r#"
milestones:
  - id: slab
    name: Slab
    trade: concrete
    planned_start: 2025-01-01
    planned_end: 2025-01-05
  - id: frame
    name: Frame
    dependencies: [slab]
"#;
        let milestones = parse_snapshot(content, SnapshotFormat::Yaml).unwrap();
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].duration_days(), 4);
    }

    #[test]
    fn read_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, r#"[{"id": 1, "name": "One"}]"#).unwrap();

        let milestones = read_snapshot(&path).unwrap();
        assert_eq!(milestones[0].id.as_str(), "1");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_snapshot(&dir.path().join("nope.json")).is_err());
    }
}
