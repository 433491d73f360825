//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Beyond parsing
//! and validating the file it builds an engine, so a bad pattern or a
//! missing rule field is reported here rather than on the first real run.

use crate::anonymization::Engine;
use crate::config::{load_config, AnonymizeConfig};
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &Path) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path.display(), "Validating configuration");

        println!("🔍 Validating configuration file: {}", config_path.display());
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let mut engine = match Engine::new(&config) {
            Ok(engine) => {
                println!("✅ All rules built successfully");
                engine
            }
            Err(e) => {
                println!("❌ Rule construction failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        print!("{}", Self::summary(&config));
        println!("  Pipeline: {}", engine.transformer_names().join(" -> "));
        println!();
        engine.close();
        Ok(0)
    }

    /// Human-readable configuration summary
    fn summary(config: &AnonymizeConfig) -> String {
        let mut out = String::from("Configuration Summary:\n");
        out.push_str(&format!("  Version: {}\n", config.version));
        out.push_str(&format!("  Stats: {}\n", config.engine.stats));
        out.push_str(&format!(
            "  Static Replacements: {} (ignore_case: {})\n",
            config.static_replace.values.len(),
            config.static_replace.ignore_case
        ));
        out.push_str(&format!(
            "  Hostname Mode: {} (root: {})\n",
            config.hostname_map.mode, config.hostname_map.root_domain
        ));
        out.push_str(&format!(
            "  IP Series: base {}, step {}, {} keep range(s)\n",
            config.ip.public_base,
            config.ip.public_step,
            config.ip.keep_cidrs.len()
        ));
        out.push_str(&format!(
            "  Redacted Keys: {}\n",
            config.keys.redact_value.len()
        ));
        out.push_str(&format!("  Rules: {}\n", config.rules.len()));
        for (i, rule) in config.rules.iter().enumerate() {
            let state = if rule.enabled { "enabled" } else { "disabled" };
            out.push_str(&format!(
                "    {}. {} ({}) {}\n",
                i + 1,
                rule.name,
                rule.rule_type,
                state
            ));
        }
        out
    }
}
