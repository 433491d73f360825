//! Line anonymization engine
//!
//! The [`Engine`] owns the ordered transformer pipeline, the run's
//! [`MappingState`] and a handle to the [`Stats`] sink. Lines go through
//! every transformer in order: the `[static_replace]` pairs first (when
//! any are configured), then each enabled rule in declaration order, so a
//! later rule always sees the output of the earlier ones. An enabled
//! `static` rule takes over the pairs at its own position, and the implicit
//! leading step is then left out.
//!
//! # Examples
//!
//! ```
//! use anonymize::anonymization::Engine;
//! use anonymize::config::{AnonymizeConfig, RuleConfig};
//!
//! let mut config = AnonymizeConfig::default();
//! config.rules.push(RuleConfig::new("emails", "email_map"));
//!
//! let mut engine = Engine::new(&config)?;
//! assert_eq!(engine.apply("from user@Example.COM")?, "from user@example1.com");
//! engine.close();
//! # Ok::<(), anonymize::domain::AnonymizeError>(())
//! ```

use crate::anonymization::state::MappingState;
use crate::anonymization::stats::Stats;
use crate::anonymization::transformer::{
    build_transformer, RuleContext, RuleKind, StaticReplace, Transformer,
};
use crate::config::AnonymizeConfig;
use crate::domain::{AnonymizeError, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

/// Rule name under which the `[static_replace]` section is counted
pub const STATIC_REPLACE_RULE: &str = "static_replace";

/// Ordered transformer pipeline plus the per-run mapping state
pub struct Engine {
    transformers: Vec<Box<dyn Transformer>>,
    state: MappingState,
    stats: Arc<Stats>,
    stats_enabled: bool,
    lines_processed: u64,
    closed: bool,
}

impl Engine {
    /// Build an engine with its own stats sink
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or any enabled rule
    /// cannot be constructed. No engine is produced in that case.
    pub fn new(config: &AnonymizeConfig) -> Result<Self> {
        Self::with_stats(config, Arc::new(Stats::new()))
    }

    /// Build an engine that reports into a shared stats sink
    pub fn with_stats(config: &AnonymizeConfig, stats: Arc<Stats>) -> Result<Self> {
        config.validate().map_err(AnonymizeError::Configuration)?;

        let mut transformers: Vec<Box<dyn Transformer>> = Vec::new();

        let static_rule_declared = config
            .enabled_rules()
            .any(|rule| rule.rule_type == RuleKind::StaticReplace.as_str());
        if !config.static_replace.values.is_empty() && !static_rule_declared {
            let static_replace = StaticReplace::new(STATIC_REPLACE_RULE, &config.static_replace)
                .map_err(|e| {
                    AnonymizeError::rule_build(
                        STATIC_REPLACE_RULE,
                        RuleKind::StaticReplace.as_str(),
                        e,
                    )
                })?;
            transformers.push(Box::new(static_replace));
        }

        for rule in config.enabled_rules() {
            let transformer = build_transformer(rule, config)?;
            tracing::debug!(rule = %rule.name, rule_type = %rule.rule_type, "Rule built");
            transformers.push(transformer);
        }

        tracing::info!(
            transformers = transformers.len(),
            stats = config.engine.stats,
            "Engine ready"
        );

        Ok(Self {
            transformers,
            state: MappingState::new(),
            stats,
            stats_enabled: config.engine.stats,
            lines_processed: 0,
            closed: false,
        })
    }

    /// Run one line through the pipeline
    ///
    /// # Errors
    ///
    /// Any transformer error aborts the line; the engine also refuses lines
    /// after [`close`](Self::close).
    pub fn apply(&mut self, line: &str) -> Result<String> {
        if self.closed {
            return Err(AnonymizeError::Processing("engine is closed".to_string()));
        }

        let mut ctx = RuleContext::new(&mut self.state, &self.stats);
        let mut out = line.to_string();
        for transformer in &self.transformers {
            out = transformer.apply(&out, &mut ctx)?;
        }

        self.lines_processed += 1;
        Ok(out)
    }

    /// Stream `input` to `output` line by line
    ///
    /// Lines are split on `\n` with a trailing `\r` dropped, and invalid
    /// UTF-8 is replaced lossily. Every output line ends in `\n`. Returns
    /// the number of lines written.
    pub fn process<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<u64> {
        let start = Instant::now();
        let mut buf = Vec::with_capacity(64 * 1024);
        let mut lines = 0u64;

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }

            let line = String::from_utf8_lossy(&buf);
            let out = self.apply(&line)?;
            output.write_all(out.as_bytes())?;
            output.write_all(b"\n")?;
            lines += 1;
        }
        output.flush()?;

        tracing::info!(
            lines,
            duration_ms = start.elapsed().as_millis() as u64,
            "Input processed"
        );
        Ok(lines)
    }

    /// Release the mapping state and the pipeline
    ///
    /// Stored originals are wiped before their memory is returned. Calling
    /// this more than once is harmless.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.state.clear();
        self.transformers.clear();
        self.closed = true;
        tracing::debug!(lines = self.lines_processed, "Engine closed");
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether `[engine] stats` asked for a report
    pub fn stats_enabled(&self) -> bool {
        self.stats_enabled
    }

    /// Point-in-time copy of the per-rule counters
    pub fn stats_snapshot(&self) -> BTreeMap<String, u64> {
        self.stats.snapshot()
    }

    /// Shared handle to the stats sink
    pub fn stats_handle(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Read access to the mapping tables
    pub fn state(&self) -> &MappingState {
        &self.state
    }

    /// Lines run through [`apply`](Self::apply) so far
    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }

    /// Rule names in pipeline order
    pub fn transformer_names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.close();
    }
}
