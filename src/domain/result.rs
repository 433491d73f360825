//! Result type alias for Anonymize
//!
//! This module provides a convenient Result type alias that uses
//! [`AnonymizeError`] as the error type.

use super::errors::AnonymizeError;

/// Result type alias for Anonymize operations
///
/// # Examples
///
/// ```
/// use anonymize::domain::result::Result;
/// use anonymize::domain::errors::AnonymizeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AnonymizeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AnonymizeError>;
