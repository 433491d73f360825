//! Literal string replacement
//!
//! Pairs are applied in declaration order, each one on the output of the
//! previous pair. With `ignore_case` the `from` text is matched
//! case-insensitively; the `to` text is always inserted verbatim.

use super::{RuleContext, RuleKind, Transformer};
use crate::config::StaticReplaceConfig;
use crate::domain::Result;
use regex::{NoExpand, Regex};

enum Matcher {
    Exact(String),
    IgnoreCase(Regex),
}

struct Pair {
    matcher: Matcher,
    to: String,
}

/// Literal replacer
pub struct StaticReplace {
    name: String,
    pairs: Vec<Pair>,
}

impl StaticReplace {
    /// Build from the `[static_replace]` section
    ///
    /// Pairs with an empty `from`, or whose `from` equals `to`, are dropped.
    pub fn new(name: &str, config: &StaticReplaceConfig) -> Result<Self> {
        let mut pairs = Vec::with_capacity(config.values.len());
        for pair in &config.values {
            if pair.from.is_empty() || pair.from == pair.to {
                continue;
            }
            let matcher = if config.ignore_case {
                Matcher::IgnoreCase(Regex::new(&format!("(?i){}", regex::escape(&pair.from)))?)
            } else {
                Matcher::Exact(pair.from.clone())
            };
            pairs.push(Pair {
                matcher,
                to: pair.to.clone(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            pairs,
        })
    }

    /// Number of active pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair survived construction
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Transformer for StaticReplace {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut out = line.to_string();
        let mut replaced = 0u64;

        for pair in &self.pairs {
            match &pair.matcher {
                Matcher::Exact(from) => {
                    let hits = out.matches(from.as_str()).count();
                    if hits > 0 {
                        replaced += hits as u64;
                        out = out.replace(from.as_str(), &pair.to);
                    }
                }
                Matcher::IgnoreCase(re) => {
                    let hits = re.find_iter(&out).count();
                    if hits > 0 {
                        replaced += hits as u64;
                        out = re.replace_all(&out, NoExpand(&pair.to)).into_owned();
                    }
                }
            }
        }

        ctx.stats.inc(&self.name, replaced);
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::StaticReplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::state::MappingState;
    use crate::anonymization::stats::Stats;
    use crate::config::StaticPair;

    fn config(ignore_case: bool, pairs: &[(&str, &str)]) -> StaticReplaceConfig {
        StaticReplaceConfig {
            ignore_case,
            values: pairs.iter().map(|(f, t)| StaticPair::new(*f, *t)).collect(),
        }
    }

    fn run(config: &StaticReplaceConfig, line: &str) -> (String, u64) {
        let t = StaticReplace::new("static_replace", config).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();
        let out = t.apply(line, &mut RuleContext::new(&mut state, &stats)).unwrap();
        (out, stats.get("static_replace"))
    }

    #[test]
    fn test_exact_replacement_counts_occurrences() {
        let cfg = config(false, &[("Acme", "Corp")]);
        assert_eq!(
            run(&cfg, "Acme and acme and Acme"),
            ("Corp and acme and Corp".to_string(), 2)
        );
    }

    #[test]
    fn test_ignore_case() {
        let cfg = config(true, &[("acme", "Corp")]);
        assert_eq!(run(&cfg, "ACME acme Acme"), ("Corp Corp Corp".to_string(), 3));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let cfg = config(true, &[("a.b(c)", "$0x")]);
        assert_eq!(run(&cfg, "A.B(C) aXb(c)"), ("$0x aXb(c)".to_string(), 1));
    }

    #[test]
    fn test_pairs_chain_in_order() {
        let cfg = config(false, &[("alpha", "beta"), ("beta", "gamma")]);
        assert_eq!(run(&cfg, "alpha"), ("gamma".to_string(), 2));
    }

    #[test]
    fn test_degenerate_pairs_dropped() {
        let t = StaticReplace::new("s", &config(false, &[("", "x"), ("same", "same")])).unwrap();
        assert!(t.is_empty());
        let (out, count) = run(&config(false, &[("", "x")]), "abc");
        assert_eq!(out, "abc");
        assert_eq!(count, 0);
    }
}
