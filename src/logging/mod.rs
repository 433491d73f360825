//! Logging and observability
//!
//! Human-readable logs go to stderr; `--log-dir` adds a rotating JSON log
//! file. Log statements carry rule names, types, counts and timings only.
//! Original token values are never logged.
//!
//! # Example
//!
//! ```no_run
//! use anonymize::config::LoggingConfig;
//! use anonymize::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(rules = 4, "Engine ready");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the completion of a run
///
/// # Example
///
/// ```no_run
/// use anonymize::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!(1200u64, 37u64, Duration::from_millis(85));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($lines:expr, $replacements:expr, $duration:expr) => {
        tracing::info!(
            lines = $lines,
            replacements = $replacements,
            duration_ms = $duration.as_millis() as u64,
            "Run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use anonymize::log_error_with_context;
/// use anonymize::domain::AnonymizeError;
///
/// let error = AnonymizeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
