//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Anonymize using clap.
//! Running without a subcommand behaves like `anonymize run`.

pub mod commands;

use crate::config::default_config_path;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Anonymize - deterministic pseudonymization of log streams
#[derive(Parser, Debug)]
#[command(name = "anonymize")]
#[command(version, about, long_about = None)]
#[command(author = "Anonymize Contributors")]
pub struct Cli {
    /// Path to configuration file (default: ~/.anonymize.toml)
    #[arg(short, long, env = "ANONYMIZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "ANONYMIZE_LOG_LEVEL")]
    pub log_level: String,

    /// Write JSON logs to this directory (daily rotation)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Options for the implicit `run` command
    #[command(flatten)]
    pub run: commands::run::RunArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize lines from stdin (or --input) to stdout (or --output)
    Run(commands::run::RunArgs),

    /// Validate configuration file and build every rule
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Configuration file to use and whether it was chosen implicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Resolved path
    pub path: PathBuf,

    /// True when no `--config` / `ANONYMIZE_CONFIG` was given
    pub is_default: bool,
}

impl Cli {
    /// Resolve the configuration path
    pub fn config_location(&self) -> ConfigLocation {
        match &self.config {
            Some(path) => ConfigLocation {
                path: path.clone(),
                is_default: false,
            },
            None => ConfigLocation {
                path: default_config_path(),
                is_default: true,
            },
        }
    }

    /// Run arguments in effect: the subcommand's when given, else the top-level ones
    pub fn run_args(&self) -> &commands::run::RunArgs {
        match &self.command {
            Some(Commands::Run(args)) => args,
            _ => &self.run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::run::StatsFormat;

    #[test]
    fn test_cli_parse_without_subcommand() {
        let cli = Cli::parse_from(["anonymize"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.run_args().stats);
    }

    #[test]
    fn test_cli_parse_top_level_stats() {
        let cli = Cli::parse_from(["anonymize", "--stats", "--stats-format", "json"]);
        assert!(cli.run_args().stats);
        assert_eq!(cli.run_args().stats_format, StatsFormat::Json);
    }

    #[test]
    fn test_cli_parse_run_subcommand() {
        let cli = Cli::parse_from(["anonymize", "run", "--input", "app.log", "--stats"]);
        assert!(matches!(cli.command, Some(Commands::Run(_))));
        assert_eq!(cli.run_args().input, Some(PathBuf::from("app.log")));
        assert!(cli.run_args().stats);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["anonymize", "--config", "custom.toml", "validate-config"]);
        let location = cli.config_location();
        assert_eq!(location.path, PathBuf::from("custom.toml"));
        assert!(!location.is_default);
        assert!(matches!(cli.command, Some(Commands::ValidateConfig(_))));
    }

    #[test]
    fn test_cli_parse_with_log_options() {
        let cli = Cli::parse_from(["anonymize", "--log-level", "debug", "--log-dir", "/tmp/l"]);
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/l")));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["anonymize", "init", "--force"]);
        match cli.command {
            Some(Commands::Init(args)) => assert!(args.force),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
