//! # Storage Layer
//!
//! File helpers around the engine. The engine itself never performs I/O;
//! these readers turn files into the plain values it consumes.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Milestone snapshots | JSON, JSONL or YAML | any path, or stdin |
//! | Template libraries | YAML or JSON | any path, or `template_library` in config |
//! | Config | TOML | `.programme/config.toml`, global config dir |
//!
//! ## Key Types
//!
//! - [`read_snapshot`] - Load milestones exported by the persistence layer
//! - [`load_library`] - Load and validate a custom template library
//! - [`Config`] - Project and global configuration

mod snapshot;
mod library;
mod config;

pub use snapshot::{parse_snapshot, read_snapshot, SnapshotFormat};
pub use library::{load_library, parse_library};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
