//! Line anonymization core
//!
//! Log lines are rewritten so that sensitive tokens (emails, IPv4
//! addresses, hostnames, URL hosts, secret key/value pairs and anything a
//! user pattern describes) become stable pseudonyms. The same original
//! always maps to the same substitute within a run, which keeps the output
//! useful for correlation.
//!
//! # Architecture
//!
//! - **State**: memoization tables and counters shared by all transformers
//! - **Transformers**: one per rule type, applied in pipeline order
//! - **Engine**: builds the pipeline from configuration and drives it
//! - **Stats**: per-rule replacement counters, reported at the end of a run
//!
//! # Usage
//!
//! ```rust,ignore
//! use anonymize::anonymization::Engine;
//!
//! let mut engine = Engine::new(&config)?;
//! let line = engine.apply("GET https://api.corp.com/ from 8.8.8.8")?;
//! engine.close();
//! ```

pub mod engine;
pub mod report;
pub mod state;
pub mod stats;
pub mod transformer;

// Re-export main types
pub use engine::Engine;
pub use report::StatsReport;
pub use state::{Category, MappingState};
pub use stats::Stats;
pub use transformer::{build_transformer, RuleKind, Transformer};
