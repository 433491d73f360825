// Anonymize - Deterministic log anonymization
// Copyright (c) 2025 Anonymize Contributors
// Licensed under the MIT License

//! # Anonymize - deterministic log anonymization
//!
//! Anonymize rewrites text logs line by line, replacing sensitive tokens
//! with stable pseudonyms so the output can be shared without losing the
//! ability to correlate events.
//!
//! ## Overview
//!
//! - **Emails** become `user@example1.com`, `user2@example1.com`, ...
//! - **Public IPv4 addresses** become `111.111.111.111`, `122.122.122.122`,
//!   ... while private and reserved ranges are kept
//! - **Hostnames** and **URL hosts** become `host1.example1.com` (flat) or
//!   a depth-preserving `host1.sub1.example.com` (structured)
//! - **Secret values** of configured keys are redacted
//! - **User patterns** are mapped to sequential tokens or replaced outright
//!
//! The same original always maps to the same substitute within a run, and
//! a fresh run over the same input produces identical output.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Engine, mapping state, transformers and stats
//! - [`domain`] - Error type and result alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anonymize::anonymization::Engine;
//! use anonymize::config::load_config;
//! use std::io;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("anonymize.toml")?;
//!     let mut engine = Engine::new(&config)?;
//!
//!     engine.process(io::stdin().lock(), io::stdout().lock())?;
//!     engine.close();
//!
//!     for (rule, count) in engine.stats_snapshot() {
//!         eprintln!("{rule}: {count}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`]. Construction problems
//! (unknown rule type, malformed pattern, missing rule field) are reported
//! with the offending rule's name and type:
//!
//! ```rust
//! use anonymize::anonymization::Engine;
//! use anonymize::config::{AnonymizeConfig, RuleConfig};
//!
//! let mut config = AnonymizeConfig::default();
//! config.rules.push(RuleConfig::new("phones", "phone_map"));
//!
//! let err = Engine::new(&config).err().unwrap();
//! assert_eq!(err.to_string(), r#"build rule "phones" (phone_map): unknown rule type: phone_map"#);
//! ```

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
