//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::default_config_path;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file (default: ~/.anonymize.toml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        let output = self.output.clone().unwrap_or_else(default_config_path);
        tracing::info!(output = %output.display(), "Initializing configuration file");

        println!("📝 Initializing Anonymize configuration");
        println!();

        if output.exists() && !self.force {
            println!("❌ Configuration file already exists: {}", output.display());
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&output, Self::example_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", output.display());
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to fit your environment", output.display());
                println!("  2. Add the key names you consider secret under [keys]");
                println!("  3. Validate configuration: anonymize validate-config");
                println!("  4. Anonymize a log: anonymize < app.log > app.anon.log");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Example configuration with every section commented
    pub fn example_config() -> &'static str {
        r#"# Anonymize Configuration File
#
# Lines are read from stdin, rewritten and written to stdout. Every
# original value maps to the same substitute for the whole run.
#
# Values may reference environment variables as ${VAR_NAME}.

version = 1

# ============================================================================
# Engine
# ============================================================================
[engine]
# Print per-rule replacement counts to stderr at the end (same as --stats)
stats = false

# ============================================================================
# Literal replacements (run before every rule)
# ============================================================================
[static_replace]
ignore_case = true
values = [
    # { from = "Acme Corp", to = "Example Org" },
]

# ============================================================================
# Hostnames (hostname_map and url_map rules)
# ============================================================================
[hostname_map]
# flat:       host1.example1.com, host2.example2.com, ...
# structured: keeps label depth, e.g. api.eu.corp.com -> host1.sub1.example.com
mode = "flat"
# Hostnames whose first label is one of these followed by digits are
# treated as already anonymized
deny_prefixes = ["host", "example"]
root_domain = "example.com"
preserve_tld = false
first_label_prefix = "host"
other_label_prefix = "sub"

# ============================================================================
# IPv4 addresses (ip_map rule)
# ============================================================================
[ip]
# Public addresses become 111.111.111.111, 122.122.122.122, ...
public_base = 111
public_step = 11
# Keep /NN suffixes on mapped addresses
preserve_cidr = true
# Addresses inside these ranges are left alone (defaults: reserved ranges)
# keep_cidrs = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"]

# ============================================================================
# Email addresses (email_map rule)
# ============================================================================
[email]
user_prefix = "user"
domain_prefix = "example"
domain_start_index = 1
domain_tld = "com"

# ============================================================================
# Sensitive keys (kv_redact rule)
# ============================================================================
[keys]
redact_value = ["password", "passwd", "secret", "token", "api_key", "authorization"]
# Use one literal instead of REDACTED_<key>
# placeholder = "[redacted]"

# ============================================================================
# Rules, applied in order
# ============================================================================
[[rules]]
name = "emails"
type = "email_map"

[[rules]]
name = "urls"
type = "url_map"

[[rules]]
name = "hostnames"
type = "hostname_map"

[[rules]]
name = "ips"
type = "ip_map"

[[rules]]
name = "secrets"
type = "kv_redact"

[[rules]]
name = "tickets"
type = "regex_map"
enabled = false
pattern = '\bTICKET-[0-9]+\b'
replacement_prefix = "TICKET-"

[[rules]]
name = "bearer"
type = "regex_replace"
enabled = false
pattern = 'Bearer [A-Za-z0-9._~+/-]+=*'
replacement = "Bearer [redacted]"
"#
    }
}
