//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{AnonymizeConfig, HostnameMode};
use crate::domain::errors::AnonymizeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the user's home directory
pub const DEFAULT_CONFIG_FILE: &str = ".anonymize.toml";

/// Default configuration path: `$HOME/.anonymize.toml`, or
/// `.anonymize.toml` in the working directory when `HOME` is unset.
pub fn default_config_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_CONFIG_FILE),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`AnonymizeConfig`]
/// 4. Applies environment variable overrides (ANONYMIZE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use anonymize::config::loader::load_config;
///
/// let config = load_config("anonymize.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnonymizeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymizeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration text
///
/// Shares every step of [`load_config`] except the file read.
pub fn parse_config(contents: &str) -> Result<AnonymizeConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AnonymizeConfig = toml::from_str(&contents)
        .map_err(|e| AnonymizeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnonymizeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the ANONYMIZE_* prefix
///
/// Variables follow the pattern `ANONYMIZE_<SECTION>_<KEY>`, for example
/// `ANONYMIZE_IP_PUBLIC_BASE`. Unparseable values are configuration errors.
fn apply_env_overrides(config: &mut AnonymizeConfig) -> Result<()> {
    if let Ok(val) = std::env::var("ANONYMIZE_ENGINE_STATS") {
        config.engine.stats = parse_env("ANONYMIZE_ENGINE_STATS", &val)?;
    }

    if let Ok(val) = std::env::var("ANONYMIZE_HOSTNAME_MAP_MODE") {
        config.hostname_map.mode = val.parse::<HostnameMode>().map_err(|e| {
            AnonymizeError::Configuration(format!("Invalid ANONYMIZE_HOSTNAME_MAP_MODE: {e}"))
        })?;
    }
    if let Ok(val) = std::env::var("ANONYMIZE_HOSTNAME_MAP_ROOT_DOMAIN") {
        config.hostname_map.root_domain = val;
    }

    if let Ok(val) = std::env::var("ANONYMIZE_IP_PUBLIC_BASE") {
        config.ip.public_base = parse_env("ANONYMIZE_IP_PUBLIC_BASE", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZE_IP_PUBLIC_STEP") {
        config.ip.public_step = parse_env("ANONYMIZE_IP_PUBLIC_STEP", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZE_IP_PRESERVE_CIDR") {
        config.ip.preserve_cidr = parse_env("ANONYMIZE_IP_PRESERVE_CIDR", &val)?;
    }

    if let Ok(val) = std::env::var("ANONYMIZE_EMAIL_DOMAIN_TLD") {
        config.email.domain_tld = val;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AnonymizeError::Configuration(format!("Invalid {name} value: '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ANONYMIZE_TEST_SUBST_VAR", "corp.internal");
        let input = "root_domain = \"${ANONYMIZE_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "root_domain = \"corp.internal\"\n");
        std::env::remove_var("ANONYMIZE_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ANONYMIZE_TEST_MISSING_VAR");
        let input = "root_domain = \"${ANONYMIZE_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("ANONYMIZE_TEST_COMMENTED_VAR");
        let input = "# root_domain = \"${ANONYMIZE_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-anonymize.toml");
        assert!(matches!(result, Err(AnonymizeError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[engine]
stats = true

[email]
user_prefix = "person"

[keys]
redact_value = ["password", "token"]

[[rules]]
name = "emails"
type = "email_map"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.email.user_prefix, "person");
        assert_eq!(config.keys.redact_value.len(), 2);
        assert_eq!(config.rules[0].rule_type, "email_map");
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let result = parse_config("[ip]\npublic_base = 0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("ip.public_base"));
    }

    #[test]
    fn test_default_config_path_ends_with_file_name() {
        assert!(default_config_path().ends_with(DEFAULT_CONFIG_FILE));
    }
}
