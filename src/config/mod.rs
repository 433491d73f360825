//! Configuration management for Anonymize.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Anonymize uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every section
//! - `ANONYMIZE_*` environment overrides
//! - Validation before any rule is built
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use anonymize::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymize.toml")?;
//! println!("{} rules configured", config.rules.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! stats = true
//!
//! [hostname_map]
//! mode = "structured"
//! root_domain = "example.com"
//!
//! [ip]
//! public_base = 111
//! public_step = 11
//!
//! [keys]
//! redact_value = ["password", "api_key"]
//!
//! [[rules]]
//! name = "emails"
//! type = "email_map"
//!
//! [[rules]]
//! name = "secrets"
//! type = "kv_redact"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config_path, load_config, parse_config};
pub use schema::{
    AnonymizeConfig, EmailConfig, EngineConfig, HostnameMapConfig, HostnameMode, IpConfig,
    KeysConfig, LoggingConfig, RuleConfig, StaticPair, StaticReplaceConfig, DEFAULT_KEEP_CIDRS,
    SUPPORTED_VERSION,
};
