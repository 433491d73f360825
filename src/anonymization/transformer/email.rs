//! Email address mapping
//!
//! `local@domain` becomes `<user_prefix>[N]@<domain_prefix><index>.<tld>`.
//! Local parts and domains are mapped independently, so two addresses on
//! the same domain keep sharing a domain after anonymization.

use super::{RuleContext, RuleKind, Transformer};
use crate::anonymization::state::{Category, MappingState};
use crate::config::EmailConfig;
use crate::domain::Result;
use regex::{Captures, Regex};

const EMAIL_PATTERN: &str = r"\b([A-Za-z0-9._%+\-]+)@([A-Za-z0-9.\-]+\.[A-Za-z]{2,})\b";

/// Email mapper
pub struct EmailMap {
    name: String,
    re: Regex,
    user_prefix: String,
    domain_prefix: String,
    domain_start_index: i64,
    domain_tld: String,
}

impl EmailMap {
    /// Create an email mapper for `name`
    pub fn new(name: &str, config: &EmailConfig) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            re: Regex::new(EMAIL_PATTERN)?,
            user_prefix: config.user_prefix.clone(),
            domain_prefix: config.domain_prefix.clone(),
            domain_start_index: config.domain_start_index,
            domain_tld: config.domain_tld.clone(),
        })
    }

    fn map_local(&self, local: &str, state: &mut MappingState) -> String {
        state.get_or_create(&Category::EmailLocal, local, |n| {
            if n == 1 {
                self.user_prefix.clone()
            } else {
                format!("{}{}", self.user_prefix, n)
            }
        })
    }

    fn map_domain(&self, domain: &str, state: &mut MappingState) -> String {
        let key = domain.trim_end_matches('.').to_ascii_lowercase();
        state.get_or_create(&Category::EmailDomain, &key, |n| {
            let index = self.domain_start_index + (n as i64 - 1);
            format!("{}{}.{}", self.domain_prefix, index, self.domain_tld)
        })
    }
}

impl Transformer for EmailMap {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut replaced = 0u64;
        let state = &mut *ctx.state;

        let out = self.re.replace_all(line, |caps: &Captures<'_>| {
            let local = self.map_local(&caps[1], state);
            let domain = self.map_domain(&caps[2], state);
            replaced += 1;
            format!("{local}@{domain}")
        });

        ctx.stats.inc(&self.name, replaced);
        Ok(out.into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::EmailMap
    }
}
