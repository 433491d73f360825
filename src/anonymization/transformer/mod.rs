//! Rule transformers
//!
//! Every rule type is a concrete [`Transformer`]. The set of rule types is
//! closed: [`RuleKind`] lists them and [`build_transformer`] maps a
//! configured type tag onto its constructor, failing for anything else.

pub mod email;
pub mod hostname;
pub mod ip;
pub mod kv_redact;
pub mod regex_map;
pub mod regex_replace;
pub mod static_replace;
pub mod url;

use crate::anonymization::state::MappingState;
use crate::anonymization::stats::Stats;
use crate::config::{AnonymizeConfig, RuleConfig};
use crate::domain::{AnonymizeError, Result};
use std::fmt;
use std::str::FromStr;

pub use email::EmailMap;
pub use hostname::{HostnameMap, HostnameMapper};
pub use ip::IpMap;
pub use kv_redact::KvRedact;
pub use regex_map::RegexMap;
pub use regex_replace::RegexReplace;
pub use static_replace::StaticReplace;
pub use url::UrlMap;

/// Mutable run context handed to a transformer for one line
pub struct RuleContext<'a> {
    /// Shared mapping tables
    pub state: &'a mut MappingState,
    /// Replacement counters
    pub stats: &'a Stats,
}

impl<'a> RuleContext<'a> {
    /// Bundle the run state for a transformer call
    pub fn new(state: &'a mut MappingState, stats: &'a Stats) -> Self {
        Self { state, stats }
    }
}

/// A single rewrite step of the pipeline
///
/// Implementations are configured once at construction and never change
/// afterwards; all per-run memory lives in the [`MappingState`] reached
/// through the [`RuleContext`].
pub trait Transformer: Send + Sync {
    /// Rewrite `line`, returning the (possibly unchanged) result
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String>;

    /// Rule name used for stats attribution
    fn name(&self) -> &str;

    /// Rule type of this transformer
    fn kind(&self) -> RuleKind;
}

/// The closed set of rule types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Literal replacements (`static`)
    StaticReplace,
    /// Email addresses (`email_map`)
    EmailMap,
    /// IPv4 addresses (`ip_map`)
    IpMap,
    /// Bare hostnames (`hostname_map`)
    HostnameMap,
    /// Hosts inside http(s) URLs (`url_map`)
    UrlMap,
    /// Sensitive key/value pairs (`kv_redact`)
    KvRedact,
    /// User pattern mapped to sequential tokens (`regex_map`)
    RegexMap,
    /// User pattern replaced by a literal (`regex_replace`)
    RegexReplace,
}

impl RuleKind {
    /// All rule types, in documentation order
    pub const ALL: [RuleKind; 8] = [
        RuleKind::StaticReplace,
        RuleKind::EmailMap,
        RuleKind::IpMap,
        RuleKind::HostnameMap,
        RuleKind::UrlMap,
        RuleKind::KvRedact,
        RuleKind::RegexMap,
        RuleKind::RegexReplace,
    ];

    /// Configuration tag of this rule type
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::StaticReplace => "static",
            RuleKind::EmailMap => "email_map",
            RuleKind::IpMap => "ip_map",
            RuleKind::HostnameMap => "hostname_map",
            RuleKind::UrlMap => "url_map",
            RuleKind::KvRedact => "kv_redact",
            RuleKind::RegexMap => "regex_map",
            RuleKind::RegexReplace => "regex_replace",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = AnonymizeError;

    /// Tags are matched case-sensitively
    fn from_str(s: &str) -> Result<Self> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AnonymizeError::UnknownRuleType(s.to_string()))
    }
}

/// Build the transformer for one rule definition
///
/// # Errors
///
/// Fails for unknown type tags, malformed patterns and missing
/// type-specific fields. The cause is wrapped with the rule name and type.
pub fn build_transformer(
    rule: &RuleConfig,
    config: &AnonymizeConfig,
) -> Result<Box<dyn Transformer>> {
    construct(rule, config)
        .map_err(|e| AnonymizeError::rule_build(&rule.name, &rule.rule_type, e))
}

fn construct(rule: &RuleConfig, config: &AnonymizeConfig) -> Result<Box<dyn Transformer>> {
    let name = rule.name.as_str();
    let transformer: Box<dyn Transformer> = match rule.rule_type.parse::<RuleKind>()? {
        RuleKind::StaticReplace => {
            Box::new(StaticReplace::new(name, &config.static_replace)?)
        }
        RuleKind::EmailMap => Box::new(EmailMap::new(name, &config.email)?),
        RuleKind::IpMap => Box::new(IpMap::new(name, &config.ip)?),
        RuleKind::HostnameMap => Box::new(HostnameMap::new(name, &config.hostname_map)?),
        RuleKind::UrlMap => Box::new(UrlMap::new(name, &config.hostname_map)?),
        RuleKind::KvRedact => Box::new(KvRedact::new(name, &config.keys)?),
        RuleKind::RegexMap => Box::new(RegexMap::new(rule)?),
        RuleKind::RegexReplace => Box::new(RegexReplace::new(rule)?),
    };
    Ok(transformer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_round_trips_tags() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_rule_kind_is_case_sensitive() {
        assert!("Email_Map".parse::<RuleKind>().is_err());
        assert!("STATIC".parse::<RuleKind>().is_err());
    }

    #[test]
    fn test_build_unknown_type_fails_with_context() {
        let config = AnonymizeConfig::default();
        let rule = RuleConfig::new("mystery", "phone_map");
        let err = build_transformer(&rule, &config).err().unwrap();
        match err {
            AnonymizeError::RuleBuild {
                name,
                rule_type,
                source,
            } => {
                assert_eq!(name, "mystery");
                assert_eq!(rule_type, "phone_map");
                assert!(matches!(*source, AnonymizeError::UnknownRuleType(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_every_builtin_kind() {
        let config = AnonymizeConfig::default();
        for tag in ["static", "email_map", "ip_map", "hostname_map", "url_map", "kv_redact"] {
            let rule = RuleConfig::new(format!("r-{tag}"), tag);
            let t = build_transformer(&rule, &config).unwrap();
            assert_eq!(t.kind().as_str(), tag);
            assert_eq!(t.name(), format!("r-{tag}"));
        }
    }
}
