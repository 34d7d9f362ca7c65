//! # Command-Line Interface
//!
//! `programme` runs one engine operation over a milestone snapshot file.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Analysis | Snapshot checks | `critical-path`, `conflicts`, `analyze`, `annotate` |
//! | Authoring | Dependency hints | `suggest` |
//! | Templates | Draft programmes | `generate`, `templates list`, `templates check` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including engine
//! diagnostics. `RUST_LOG` overrides the log level:
//! ```bash
//! programme --verbose conflicts site.json
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod analyze;
mod templates;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
