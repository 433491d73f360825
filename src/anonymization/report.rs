//! Stats reporting
//!
//! Renders the per-rule replacement counters collected during a run, either
//! as plain `rule: count` lines or as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replacement count for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCount {
    /// Rule name
    pub rule: String,

    /// Replacements made by the rule
    pub count: u64,
}

/// End-of-run stats report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsReport {
    /// Per-rule counts, ordered by rule name
    pub rules: Vec<RuleCount>,

    /// Sum over all rules
    pub total_replacements: u64,

    /// Lines read from the input
    pub lines_processed: u64,
}

impl StatsReport {
    /// Build a report from a stats snapshot
    pub fn new(snapshot: &BTreeMap<String, u64>, lines_processed: u64) -> Self {
        let rules: Vec<RuleCount> = snapshot
            .iter()
            .map(|(rule, count)| RuleCount {
                rule: rule.clone(),
                count: *count,
            })
            .collect();
        let total_replacements = rules.iter().map(|r| r.count).sum();

        Self {
            rules,
            total_replacements,
            lines_processed,
        }
    }

    /// Whether no rule replaced anything
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One `rule: count` line per rule
    pub fn format_console(&self) -> String {
        let mut output = String::new();
        for entry in &self.rules {
            output.push_str(&format!("{}: {}\n", entry.rule, entry.count));
        }
        output
    }

    /// Format report as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
