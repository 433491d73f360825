//! Domain error types
//!
//! This module defines the error hierarchy for Anonymize. Errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Anonymize error type
///
/// Construction-time problems (bad configuration, malformed patterns,
/// unknown rule types) and run-time processing failures both surface
/// through this type. Token-level ambiguity is never an error: a
/// transformer that cannot make sense of a token leaves it untouched.
#[derive(Debug, Error)]
pub enum AnonymizeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A user or built-in pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// The rule type tag is not one of the known transformer types
    #[error("unknown rule type: {0}")]
    UnknownRuleType(String),

    /// A rule could not be turned into a transformer
    #[error("build rule \"{name}\" ({rule_type}): {source}")]
    RuleBuild {
        /// Rule name as declared in the configuration
        name: String,
        /// Rule type tag as declared in the configuration
        rule_type: String,
        /// Underlying cause
        #[source]
        source: Box<AnonymizeError>,
    },

    /// Per-line processing errors
    #[error("Processing error: {0}")]
    Processing(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl AnonymizeError {
    /// Wraps a construction error with the rule it came from
    pub fn rule_build(
        name: impl Into<String>,
        rule_type: impl Into<String>,
        source: AnonymizeError,
    ) -> Self {
        AnonymizeError::RuleBuild {
            name: name.into(),
            rule_type: rule_type.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error was raised while reading or checking configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AnonymizeError::Configuration(_)
                | AnonymizeError::Validation(_)
                | AnonymizeError::Pattern(_)
                | AnonymizeError::UnknownRuleType(_)
                | AnonymizeError::RuleBuild { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AnonymizeError {
    fn from(err: std::io::Error) -> Self {
        AnonymizeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnonymizeError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnonymizeError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizeError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for AnonymizeError {
    fn from(err: regex::Error) -> Self {
        AnonymizeError::Pattern(err.to_string())
    }
}
