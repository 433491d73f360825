//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables take ENV_MUTEX so they do
//! not interfere with each other.

use anonymize::anonymization::Engine;
use anonymize::config::{load_config, HostnameMode, DEFAULT_KEEP_CIDRS};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("ANONYMIZE_ENGINE_STATS");
    std::env::remove_var("ANONYMIZE_HOSTNAME_MAP_MODE");
    std::env::remove_var("ANONYMIZE_HOSTNAME_MAP_ROOT_DOMAIN");
    std::env::remove_var("ANONYMIZE_IP_PUBLIC_BASE");
    std::env::remove_var("ANONYMIZE_IP_PUBLIC_STEP");
    std::env::remove_var("ANONYMIZE_IP_PRESERVE_CIDR");
    std::env::remove_var("ANONYMIZE_EMAIL_DOMAIN_TLD");
    std::env::remove_var("TEST_ANON_ROOT_DOMAIN");
    std::env::remove_var("TEST_ANON_PLACEHOLDER");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();

    let toml_content = r#"
version = 1

[engine]
stats = true

[static_replace]
ignore_case = true
values = [
    { from = "Acme Corp", to = "Example Org" },
    { from = "acme-prod", to = "org-prod" },
]

[hostname_map]
mode = "structured"
deny_prefixes = ["node"]
root_domain = "example.net"
preserve_tld = true
first_label_prefix = "node"
other_label_prefix = "zone"

[ip]
public_base = 20
public_step = 5
preserve_cidr = false
keep_cidrs = ["10.0.0.0/8"]

[email]
user_prefix = "person"
domain_prefix = "org"
domain_start_index = 0
domain_tld = "test"

[keys]
redact_value = ["password", "token"]
placeholder = "[redacted]"

[[rules]]
name = "emails"
type = "email_map"

[[rules]]
name = "tickets"
type = "regex_map"
enabled = false
pattern = 'TCK-[0-9]+'
group = 0
replacement_prefix = "TCK-"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert!(config.engine.stats);
    assert!(config.static_replace.ignore_case);
    assert_eq!(config.static_replace.values.len(), 2);
    assert_eq!(config.static_replace.values[0].to, "Example Org");

    assert_eq!(config.hostname_map.mode, HostnameMode::Structured);
    assert_eq!(config.hostname_map.deny_prefixes, vec!["node".to_string()]);
    assert_eq!(config.hostname_map.root_domain, "example.net");
    assert!(config.hostname_map.preserve_tld);
    assert_eq!(config.hostname_map.other_label_prefix, "zone");

    assert_eq!(config.ip.public_base, 20);
    assert_eq!(config.ip.public_step, 5);
    assert!(!config.ip.preserve_cidr);
    assert_eq!(config.ip.keep_cidrs, vec!["10.0.0.0/8".to_string()]);

    assert_eq!(config.email.user_prefix, "person");
    assert_eq!(config.email.domain_start_index, 0);

    assert_eq!(config.keys.placeholder.as_deref(), Some("[redacted]"));

    assert_eq!(config.rules.len(), 2);
    assert!(config.rules[0].enabled);
    assert!(!config.rules[1].enabled);
    assert_eq!(config.rules[1].replacement_prefix.as_deref(), Some("TCK-"));
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[[rules]]\nname = \"ips\"\ntype = \"ip_map\"\n");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.version, 1);
    assert!(!config.engine.stats);
    assert_eq!(config.hostname_map.mode, HostnameMode::Flat);
    assert_eq!(config.hostname_map.root_domain, "example.com");
    assert_eq!(config.ip.public_base, 111);
    assert_eq!(config.ip.public_step, 11);
    assert!(config.ip.preserve_cidr);
    assert_eq!(config.ip.keep_cidrs.len(), DEFAULT_KEEP_CIDRS.len());
    assert_eq!(config.email.domain_tld, "com");
    assert!(config.keys.redact_value.is_empty());
    assert!(config.rules[0].enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_ANON_ROOT_DOMAIN", "corp.example");
    std::env::set_var("TEST_ANON_PLACEHOLDER", "***");

    let toml_content = r#"
[hostname_map]
root_domain = "${TEST_ANON_ROOT_DOMAIN}"

[keys]
redact_value = ["password"]
placeholder = "${TEST_ANON_PLACEHOLDER}"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.hostname_map.root_domain, "corp.example");
    assert_eq!(config.keys.placeholder.as_deref(), Some("***"));

    cleanup_env_vars();
}

#[test]
fn test_env_var_substitution_missing_var() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[hostname_map]\nroot_domain = \"${TEST_ANON_ROOT_DOMAIN}\"\n");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_ANON_ROOT_DOMAIN"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();
    std::env::set_var("ANONYMIZE_ENGINE_STATS", "true");
    std::env::set_var("ANONYMIZE_HOSTNAME_MAP_MODE", "structured");
    std::env::set_var("ANONYMIZE_HOSTNAME_MAP_ROOT_DOMAIN", "lab.test");
    std::env::set_var("ANONYMIZE_IP_PUBLIC_BASE", "50");
    std::env::set_var("ANONYMIZE_IP_PUBLIC_STEP", "0");
    std::env::set_var("ANONYMIZE_IP_PRESERVE_CIDR", "false");
    std::env::set_var("ANONYMIZE_EMAIL_DOMAIN_TLD", "org");

    let temp_file = write_config("[ip]\npublic_base = 111\n");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert!(config.engine.stats);
    assert_eq!(config.hostname_map.mode, HostnameMode::Structured);
    assert_eq!(config.hostname_map.root_domain, "lab.test");
    assert_eq!(config.ip.public_base, 50);
    assert_eq!(config.ip.public_step, 0);
    assert!(!config.ip.preserve_cidr);
    assert_eq!(config.email.domain_tld, "org");

    cleanup_env_vars();
}

#[test]
fn test_env_override_invalid_value() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();
    std::env::set_var("ANONYMIZE_IP_PUBLIC_BASE", "lots");

    let temp_file = write_config("");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("ANONYMIZE_IP_PUBLIC_BASE"));

    cleanup_env_vars();
}

#[test]
fn test_env_override_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();
    std::env::set_var("ANONYMIZE_IP_PUBLIC_BASE", "300");

    let temp_file = write_config("");
    assert!(load_config(temp_file.path()).is_err());

    cleanup_env_vars();
}

#[test]
fn test_invalid_configs_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();

    let cases = [
        "version = 2\n",
        "[ip]\npublic_step = 256\n",
        "[ip]\nkeep_cidrs = [\"10.0.0.0\"]\n",
        "[email]\ndomain_start_index = -1\n",
        "[hostname_map]\nmode = \"deep\"\n",
        "[hostname_map]\nroot_domain = \"\"\n",
        "[static_replace]\nvalues = [{ from = \"\", to = \"x\" }]\n",
        "[[rules]]\nname = \"a\"\ntype = \"ip_map\"\n[[rules]]\nname = \"a\"\ntype = \"email_map\"\n",
        "[[rules]]\nname = \"\"\ntype = \"ip_map\"\n",
        "not toml at all = = =\n",
    ];

    for contents in cases {
        let temp_file = write_config(contents);
        assert!(
            load_config(temp_file.path()).is_err(),
            "expected rejection for: {contents}"
        );
    }
}

#[test]
fn test_unknown_rule_type_passes_load_but_fails_build() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[[rules]]\nname = \"phones\"\ntype = \"Email_Map\"\n");
    let config = load_config(temp_file.path()).expect("type tags are checked at build time");

    let err = Engine::new(&config).err().expect("case-sensitive tag");
    assert!(err.is_configuration());
    assert!(err.to_string().contains(r#"build rule "phones" (Email_Map)"#));
}
