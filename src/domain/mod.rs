//! Domain types for Anonymize.
//!
//! The domain layer holds the crate-wide error type ([`AnonymizeError`])
//! and the [`Result`] alias used by every fallible operation.
//!
//! ```rust
//! use anonymize::domain::{AnonymizeError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(AnonymizeError::Validation("bad input".into()))
//! }
//! assert!(example().is_err());
//! ```

pub mod errors;
pub mod result;

pub use errors::AnonymizeError;
pub use result::Result;
