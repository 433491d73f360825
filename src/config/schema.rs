//! Configuration schema types
//!
//! This module defines the configuration structure for Anonymize. Every
//! section is optional in the TOML file and falls back to the defaults
//! below.

use crate::anonymization::transformer::ip::Ipv4Cidr;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The only configuration schema version understood by this build
pub const SUPPORTED_VERSION: u32 = 1;

/// IANA special-purpose IPv4 ranges that are never anonymized unless the
/// user supplies their own `ip.keep_cidrs`.
pub const DEFAULT_KEEP_CIDRS: [&str; 16] = [
    "0.0.0.0/8",          // "This" network (RFC 1122)
    "10.0.0.0/8",         // RFC 1918 private
    "100.64.0.0/10",      // Shared address space / CGNAT (RFC 6598)
    "127.0.0.0/8",        // Loopback (RFC 1122)
    "169.254.0.0/16",     // Link-local (RFC 3927)
    "172.16.0.0/12",      // RFC 1918 private
    "192.0.0.0/24",       // IETF protocol assignments (RFC 6890)
    "192.0.2.0/24",       // TEST-NET-1 (RFC 5737)
    "192.88.99.0/24",     // 6to4 relay anycast (RFC 3068)
    "192.168.0.0/16",     // RFC 1918 private
    "198.18.0.0/15",      // Benchmarking (RFC 2544)
    "198.51.100.0/24",    // TEST-NET-2 (RFC 5737)
    "203.0.113.0/24",     // TEST-NET-3 (RFC 5737)
    "224.0.0.0/4",        // Multicast (RFC 1112)
    "240.0.0.0/4",        // Reserved (RFC 1112)
    "255.255.255.255/32", // Limited broadcast (RFC 919)
];

/// Main Anonymize configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizeConfig {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Engine-level settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Literal replacements applied before any rule
    #[serde(default)]
    pub static_replace: StaticReplaceConfig,

    /// Hostname mapping settings (shared by `hostname_map` and `url_map`)
    #[serde(default)]
    pub hostname_map: HostnameMapConfig,

    /// IPv4 mapping settings
    #[serde(default)]
    pub ip: IpConfig,

    /// Email mapping settings
    #[serde(default)]
    pub email: EmailConfig,

    /// Key/value redaction settings
    #[serde(default)]
    pub keys: KeysConfig,

    /// Ordered rule list
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            engine: EngineConfig::default(),
            static_replace: StaticReplaceConfig::default(),
            hostname_map: HostnameMapConfig::default(),
            ip: IpConfig::default(),
            email: EmailConfig::default(),
            keys: KeysConfig::default(),
            rules: Vec::new(),
        }
    }
}

impl AnonymizeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.version != SUPPORTED_VERSION {
            return Err(format!("unsupported version: {}", self.version));
        }
        self.static_replace.validate()?;
        self.hostname_map.validate()?;
        self.ip.validate()?;
        self.email.validate()?;

        let mut seen = HashSet::with_capacity(self.rules.len());
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate(i)?;
            if !seen.insert(rule.name.as_str()) {
                return Err(format!("rules[{i}].name '{}' is not unique", rule.name));
            }
        }
        Ok(())
    }

    /// Rules that will be turned into transformers, in declared order
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleConfig> {
        self.rules.iter().filter(|r| r.enabled)
    }
}

/// Engine-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Print per-rule replacement counts when the run finishes
    #[serde(default)]
    pub stats: bool,
}

/// Literal (from, to) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPair {
    /// Text to look for
    pub from: String,
    /// Replacement text, inserted literally
    #[serde(default)]
    pub to: String,
}

impl StaticPair {
    /// Convenience constructor
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Static replacement configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticReplaceConfig {
    /// Match every `from` case-insensitively
    #[serde(default)]
    pub ignore_case: bool,

    /// Ordered replacement pairs
    #[serde(default)]
    pub values: Vec<StaticPair>,
}

impl StaticReplaceConfig {
    fn validate(&self) -> Result<(), String> {
        for (i, pair) in self.values.iter().enumerate() {
            if pair.from.trim().is_empty() {
                return Err(format!("static_replace.values[{i}].from is required"));
            }
        }
        Ok(())
    }
}

/// Hostname mapping mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostnameMode {
    /// Every hostname becomes `host<N>.example<N>.com`
    #[default]
    Flat,
    /// Label depth is preserved and labels are mapped individually
    Structured,
}

impl fmt::Display for HostnameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostnameMode::Flat => write!(f, "flat"),
            HostnameMode::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for HostnameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(HostnameMode::Flat),
            "structured" => Ok(HostnameMode::Structured),
            other => Err(format!(
                "Invalid hostname_map.mode '{other}'. Must be one of: flat, structured"
            )),
        }
    }
}

/// Hostname mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostnameMapConfig {
    /// Flat or structured substitutes
    #[serde(default)]
    pub mode: HostnameMode,

    /// Hosts whose first label is `<prefix><digits>` are treated as already mapped
    #[serde(default = "default_deny_prefixes")]
    pub deny_prefixes: Vec<String>,

    /// Root domain that replaces the registrable part in structured mode
    #[serde(default = "default_root_domain")]
    pub root_domain: String,

    /// Keep the real TLD in structured mode
    #[serde(default)]
    pub preserve_tld: bool,

    /// Prefix for first-label substitutes in structured mode
    #[serde(default = "default_first_label_prefix")]
    pub first_label_prefix: String,

    /// Prefix for intermediate-label substitutes in structured mode
    #[serde(default = "default_other_label_prefix")]
    pub other_label_prefix: String,
}

impl Default for HostnameMapConfig {
    fn default() -> Self {
        Self {
            mode: HostnameMode::default(),
            deny_prefixes: default_deny_prefixes(),
            root_domain: default_root_domain(),
            preserve_tld: false,
            first_label_prefix: default_first_label_prefix(),
            other_label_prefix: default_other_label_prefix(),
        }
    }
}

impl HostnameMapConfig {
    fn validate(&self) -> Result<(), String> {
        let root = self.root_domain.trim().trim_matches('.');
        if root.is_empty() {
            return Err("hostname_map.root_domain must not be empty".to_string());
        }
        if root.split('.').any(|label| label.is_empty()) {
            return Err(format!(
                "hostname_map.root_domain '{}' contains an empty label",
                self.root_domain
            ));
        }
        if self.first_label_prefix.trim().is_empty() {
            return Err("hostname_map.first_label_prefix must not be empty".to_string());
        }
        if self.other_label_prefix.trim().is_empty() {
            return Err("hostname_map.other_label_prefix must not be empty".to_string());
        }
        Ok(())
    }
}

/// IPv4 mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpConfig {
    /// First synthetic octet value (1..=255)
    #[serde(default = "default_public_base")]
    pub public_base: u32,

    /// Increment per newly-seen address (0..=255)
    #[serde(default = "default_public_step")]
    pub public_step: u32,

    /// Reattach a valid `/NN` suffix to mapped addresses
    #[serde(default = "default_true")]
    pub preserve_cidr: bool,

    /// Ranges left untouched
    #[serde(default = "default_keep_cidrs")]
    pub keep_cidrs: Vec<String>,
}

impl Default for IpConfig {
    fn default() -> Self {
        Self {
            public_base: default_public_base(),
            public_step: default_public_step(),
            preserve_cidr: true,
            keep_cidrs: default_keep_cidrs(),
        }
    }
}

impl IpConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=255).contains(&self.public_base) {
            return Err(format!(
                "ip.public_base must be 1..255, got {}",
                self.public_base
            ));
        }
        if self.public_step > 255 {
            return Err(format!(
                "ip.public_step must be 0..255, got {}",
                self.public_step
            ));
        }
        for cidr in &self.keep_cidrs {
            cidr.parse::<Ipv4Cidr>()
                .map_err(|e| format!("invalid ip.keep_cidrs entry '{cidr}': {e}"))?;
        }
        Ok(())
    }
}

/// Email mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Local-part substitute prefix
    #[serde(default = "default_user_prefix")]
    pub user_prefix: String,

    /// Domain substitute prefix
    #[serde(default = "default_domain_prefix")]
    pub domain_prefix: String,

    /// Index of the first domain substitute
    #[serde(default = "default_domain_start_index")]
    pub domain_start_index: i64,

    /// TLD of domain substitutes
    #[serde(default = "default_domain_tld")]
    pub domain_tld: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            user_prefix: default_user_prefix(),
            domain_prefix: default_domain_prefix(),
            domain_start_index: default_domain_start_index(),
            domain_tld: default_domain_tld(),
        }
    }
}

impl EmailConfig {
    fn validate(&self) -> Result<(), String> {
        if self.domain_start_index < 0 {
            return Err(format!(
                "email.domain_start_index must be >= 0, got {}",
                self.domain_start_index
            ));
        }
        if self.user_prefix.is_empty() {
            return Err("email.user_prefix must not be empty".to_string());
        }
        if self.domain_tld.is_empty() {
            return Err("email.domain_tld must not be empty".to_string());
        }
        Ok(())
    }
}

/// Key/value redaction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Keys whose values are redacted (matched case-insensitively)
    #[serde(default)]
    pub redact_value: Vec<String>,

    /// Literal used instead of the `REDACTED_<key>` label
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// A single rule definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Unique rule name, used for stats attribution
    pub name: String,

    /// Rule type tag (`email_map`, `ip_map`, ...)
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Disabled rules are skipped at engine construction
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pattern for `regex_map` / `regex_replace`
    #[serde(default)]
    pub pattern: Option<String>,

    /// Capture group to map (0 = whole match)
    #[serde(default)]
    pub group: usize,

    /// Literal replacement for `regex_replace`
    #[serde(default)]
    pub replacement: Option<String>,

    /// Substitute prefix for `regex_map`
    #[serde(default)]
    pub replacement_prefix: Option<String>,
}

impl RuleConfig {
    /// Creates an enabled rule with no type-specific parameters
    pub fn new(name: impl Into<String>, rule_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule_type: rule_type.into(),
            enabled: true,
            pattern: None,
            group: 0,
            replacement: None,
            replacement_prefix: None,
        }
    }

    fn validate(&self, index: usize) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("rules[{index}].name is required"));
        }
        if self.rule_type.trim().is_empty() {
            return Err(format!("rules[{index}].type is required"));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Validates the logging configuration
    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when file logging is enabled".into());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_version() -> u32 {
    SUPPORTED_VERSION
}

fn default_true() -> bool {
    true
}

fn default_deny_prefixes() -> Vec<String> {
    vec!["host".to_string(), "example".to_string()]
}

fn default_root_domain() -> String {
    "example.com".to_string()
}

fn default_first_label_prefix() -> String {
    "host".to_string()
}

fn default_other_label_prefix() -> String {
    "sub".to_string()
}

fn default_public_base() -> u32 {
    111
}

fn default_public_step() -> u32 {
    11
}

fn default_keep_cidrs() -> Vec<String> {
    DEFAULT_KEEP_CIDRS.iter().map(|s| s.to_string()).collect()
}

fn default_user_prefix() -> String {
    "user".to_string()
}

fn default_domain_prefix() -> String {
    "example".to_string()
}

fn default_domain_start_index() -> i64 {
    1
}

fn default_domain_tld() -> String {
    "com".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
