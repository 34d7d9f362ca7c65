//! programme - scheduling analysis for construction programmes

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = site_programme::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
