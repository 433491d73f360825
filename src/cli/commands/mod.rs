//! CLI command implementations
//!
//! Each command returns its process exit code: 0 on success, 2 for
//! configuration problems, 5 for fatal runtime errors.

pub mod init;
pub mod run;
pub mod validate;

use std::path::Path;

/// Tell the user how to get started when the default config is missing
pub fn print_missing_config_hint(path: &Path) {
    eprintln!("No config file found at {}", path.display());
    eprintln!();
    eprintln!("To get started, create one with:");
    eprintln!();
    eprintln!("  anonymize init");
    eprintln!();
    eprintln!("Edit {} to fit your environment, then run again.", path.display());
    eprintln!("Or specify a config explicitly:");
    eprintln!();
    eprintln!("  anonymize --config /path/to/your/config.toml");
    eprintln!();
}
