//! User-defined pattern replaced by a literal

use super::{RuleContext, RuleKind, Transformer};
use crate::config::RuleConfig;
use crate::domain::{AnonymizeError, Result};
use regex::{NoExpand, Regex};

/// Pattern-to-literal replacer
///
/// `$1`-style references in the replacement are not expanded.
pub struct RegexReplace {
    name: String,
    re: Regex,
    replacement: String,
}

impl RegexReplace {
    /// Build from a `regex_replace` rule definition
    pub fn new(rule: &RuleConfig) -> Result<Self> {
        let pattern = rule
            .pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AnonymizeError::Validation("regex_replace requires pattern".into()))?;
        let replacement = rule
            .replacement
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                AnonymizeError::Validation("regex_replace requires replacement".into())
            })?;

        Ok(Self {
            name: rule.name.clone(),
            re: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }
}

impl Transformer for RegexReplace {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let count = self.re.find_iter(line).count() as u64;
        if count == 0 {
            return Ok(line.to_string());
        }
        ctx.stats.inc(&self.name, count);
        Ok(self
            .re
            .replace_all(line, NoExpand(&self.replacement))
            .into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::RegexReplace
    }
}
