// Anonymize - Deterministic log anonymization
// Copyright (c) 2025 Anonymize Contributors
// Licensed under the MIT License

use anonymize::cli::commands::print_missing_config_hint;
use anonymize::cli::{Cli, Commands};
use anonymize::config::LoggingConfig;
use anonymize::logging::init_logging;
use clap::Parser;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let logging_config = match &cli.log_dir {
        Some(dir) => LoggingConfig {
            local_enabled: true,
            local_path: dir.to_string_lossy().to_string(),
            ..LoggingConfig::default()
        },
        None => LoggingConfig::default(),
    };
    // Keep the guard alive until exit so the file writer flushes
    let logging_guard = match init_logging(&cli.log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Anonymize starting");

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    if let Some(Commands::Init(args)) = &cli.command {
        return args.execute();
    }

    let location = cli.config_location();
    if location.is_default && !location.path.exists() {
        print_missing_config_hint(&location.path);
        return Ok(2);
    }

    match &cli.command {
        Some(Commands::ValidateConfig(args)) => args.execute(&location.path),
        _ => cli.run_args().execute(&location.path),
    }
}
