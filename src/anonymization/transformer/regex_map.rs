//! User-defined pattern mapped to sequential tokens
//!
//! Every distinct matched text (or the text of a chosen capture group) is
//! given `<replacement_prefix><N>` from a table owned by the rule.

use super::{RuleContext, RuleKind, Transformer};
use crate::anonymization::state::Category;
use crate::config::RuleConfig;
use crate::domain::{AnonymizeError, Result};
use regex::{Captures, Regex};

/// Pattern-to-token mapper
pub struct RegexMap {
    name: String,
    re: Regex,
    group: usize,
    prefix: String,
    category: Category,
}

impl RegexMap {
    /// Build from a `regex_map` rule definition
    ///
    /// # Errors
    ///
    /// Requires `pattern` and a non-empty `replacement_prefix`. `group`
    /// must refer to an existing capture group.
    pub fn new(rule: &RuleConfig) -> Result<Self> {
        let pattern = rule
            .pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AnonymizeError::Validation("regex_map requires pattern".into()))?;
        let prefix = rule
            .replacement_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AnonymizeError::Validation("regex_map requires replacement_prefix".into())
            })?;

        let re = Regex::new(pattern)?;
        let groups = re.captures_len() - 1;
        if rule.group > groups {
            return Err(AnonymizeError::Validation(format!(
                "group {} out of range, pattern has {} capture group(s)",
                rule.group, groups
            )));
        }

        Ok(Self {
            name: rule.name.clone(),
            re,
            group: rule.group,
            prefix: prefix.to_string(),
            category: Category::Rule(rule.name.clone()),
        })
    }
}

impl Transformer for RegexMap {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut replaced = 0u64;
        let state = &mut *ctx.state;

        let out = self.re.replace_all(line, |caps: &Captures<'_>| {
            let Some(whole) = caps.get(0) else {
                return String::new();
            };
            // A group that did not take part in the match falls back to the
            // whole match.
            let target = caps.get(self.group).unwrap_or(whole);
            if target.is_empty() {
                return whole.as_str().to_string();
            }

            let token = state.get_or_create(&self.category, target.as_str(), |n| {
                format!("{}{}", self.prefix, n)
            });
            replaced += 1;

            let head = &line[whole.start()..target.start()];
            let tail = &line[target.end()..whole.end()];
            format!("{head}{token}{tail}")
        });

        ctx.stats.inc(&self.name, replaced);
        Ok(out.into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::RegexMap
    }
}
