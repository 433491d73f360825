//! Hostname mapping
//!
//! Dotted tokens are matched liberally and then filtered hard: a token is
//! only rewritten when it has a letter somewhere, is not IPv4-shaped, ends
//! in a 2–24 letter TLD and does not already look anonymized.
//!
//! Two substitute shapes exist:
//! - flat: `host<N>.example<N>.com` per unique hostname
//! - structured: label depth is preserved; the registrable tail is
//!   replaced by the configured root domain and every remaining label is
//!   mapped on its own, so `api.eu.corp.com` and `db.eu.corp.com` still
//!   share their middle label afterwards.
//!
//! [`HostnameMapper`] holds the shared logic so the URL mapper produces
//! the same substitute for a host as a bare hostname would get.

use super::{RuleContext, RuleKind, Transformer};
use crate::anonymization::state::{Category, MappingState};
use crate::config::{HostnameMapConfig, HostnameMode};
use crate::domain::Result;
use regex::{Captures, Regex};

const HOSTNAME_PATTERN: &str = r"\b([A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+)\b";

/// Acceptance checks and substitute generation for hostnames
#[derive(Debug, Clone)]
pub struct HostnameMapper {
    mode: HostnameMode,
    deny_prefixes: Vec<String>,
    root_labels: Vec<String>,
    preserve_tld: bool,
    first_label_prefix: String,
    other_label_prefix: String,
}

impl HostnameMapper {
    /// Build the mapper from the `[hostname_map]` section
    pub fn new(config: &HostnameMapConfig) -> Self {
        // Our own substitutes always start with the mode's first-label prefix
        let own_prefix = match config.mode {
            HostnameMode::Flat => "host".to_string(),
            HostnameMode::Structured => config.first_label_prefix.clone(),
        };
        let mut deny_prefixes: Vec<String> = Vec::new();
        for prefix in config.deny_prefixes.iter().chain(std::iter::once(&own_prefix)) {
            let prefix = prefix.trim().to_ascii_lowercase();
            if !prefix.is_empty() && !deny_prefixes.contains(&prefix) {
                deny_prefixes.push(prefix);
            }
        }
        let root_labels = config
            .root_domain
            .trim()
            .trim_matches('.')
            .split('.')
            .filter(|l| !l.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        Self {
            mode: config.mode,
            deny_prefixes,
            root_labels,
            preserve_tld: config.preserve_tld,
            first_label_prefix: config.first_label_prefix.clone(),
            other_label_prefix: config.other_label_prefix.clone(),
        }
    }

    /// Whether `token` should be treated as a hostname and rewritten
    pub fn accepts(&self, token: &str) -> bool {
        let host = token.strip_suffix('.').unwrap_or(token);
        contains_alpha(host)
            && !looks_like_ipv4(host)
            && looks_like_fqdn(host)
            && !self.already_mapped(host)
    }

    /// Substitute for `host`, memoized in `state`
    ///
    /// The caller is expected to have checked [`accepts`](Self::accepts).
    /// A trailing root dot is carried over to the substitute.
    pub fn map(&self, host: &str, state: &mut MappingState) -> String {
        let (bare, root_dot) = match host.strip_suffix('.') {
            Some(bare) => (bare, "."),
            None => (host, ""),
        };
        let mapped = match self.mode {
            HostnameMode::Flat => self.map_flat(bare, state),
            HostnameMode::Structured => self.map_structured(bare, state),
        };
        format!("{mapped}{root_dot}")
    }

    fn map_flat(&self, host: &str, state: &mut MappingState) -> String {
        let key = host.to_ascii_lowercase();
        state.get_or_create(&Category::HostFlat, &key, |n| {
            format!("host{n}.example{n}.com")
        })
    }

    fn map_structured(&self, host: &str, state: &mut MappingState) -> String {
        let labels: Vec<&str> = host.split('.').collect();
        let depth = labels.len();
        let tail_len = self.root_labels.len().min(depth.saturating_sub(1));
        let head_len = depth - tail_len;

        let mut out: Vec<String> = Vec::with_capacity(depth);
        for (i, label) in labels[..head_len].iter().enumerate() {
            let key = label.to_ascii_lowercase();
            let mapped = if i == 0 {
                state.get_or_create(&Category::HostFirstLabel, &key, |n| {
                    format!("{}{}", self.first_label_prefix, n)
                })
            } else {
                state.get_or_create(&Category::HostOtherLabel, &key, |n| {
                    format!("{}{}", self.other_label_prefix, n)
                })
            };
            out.push(mapped);
        }

        let root_start = self.root_labels.len() - tail_len;
        out.extend(self.root_labels[root_start..].iter().cloned());

        if self.preserve_tld && tail_len > 0 {
            let tld = labels[depth - 1];
            if tld.bytes().all(|b| b.is_ascii_alphabetic()) {
                if let Some(last) = out.last_mut() {
                    *last = tld.to_ascii_lowercase();
                }
            }
        }

        out.join(".")
    }

    /// First label is `<deny prefix><digits>`, i.e. one of our own substitutes
    fn already_mapped(&self, host: &str) -> bool {
        let first = host.split('.').next().unwrap_or_default().to_ascii_lowercase();
        self.deny_prefixes.iter().any(|prefix| {
            first
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        })
    }
}

fn contains_alpha(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_alphabetic())
}

fn looks_like_ipv4(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || b == b'.') && s.matches('.').count() == 3
}

/// At least two labels and an alphabetic TLD of 2..=24 letters
fn looks_like_fqdn(s: &str) -> bool {
    let mut labels = s.rsplit('.');
    let tld = labels.next().unwrap_or_default();
    if labels.next().is_none() {
        return false;
    }
    (2..=24).contains(&tld.len()) && tld.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Bare hostname mapper
pub struct HostnameMap {
    name: String,
    re: Regex,
    mapper: HostnameMapper,
}

impl HostnameMap {
    /// Create a hostname mapper for `name`
    pub fn new(name: &str, config: &HostnameMapConfig) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            re: Regex::new(HOSTNAME_PATTERN)?,
            mapper: HostnameMapper::new(config),
        })
    }
}

impl Transformer for HostnameMap {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut replaced = 0u64;
        let state = &mut *ctx.state;

        let out = self.re.replace_all(line, |caps: &Captures<'_>| {
            let token = &caps[1];
            if !self.mapper.accepts(token) {
                return token.to_string();
            }
            replaced += 1;
            self.mapper.map(token, state)
        });

        ctx.stats.inc(&self.name, replaced);
        Ok(out.into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::HostnameMap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::stats::Stats;

    fn structured(root: &str, preserve_tld: bool) -> HostnameMapConfig {
        HostnameMapConfig {
            mode: HostnameMode::Structured,
            root_domain: root.to_string(),
            preserve_tld,
            ..HostnameMapConfig::default()
        }
    }

    fn run(t: &HostnameMap, state: &mut MappingState, stats: &Stats, line: &str) -> String {
        t.apply(line, &mut RuleContext::new(state, stats)).unwrap()
    }

    #[test]
    fn test_flat_mapping() {
        let t = HostnameMap::new("hosts", &HostnameMapConfig::default()).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();

        let out = run(&t, &mut state, &stats, "connect db01.corp.com then API.corp.com");
        assert_eq!(out, "connect host1.example1.com then host2.example2.com");
        let again = run(&t, &mut state, &stats, "retry DB01.Corp.com");
        assert_eq!(again, "retry host1.example1.com");
        assert_eq!(stats.get("hosts"), 3);
    }

    #[test]
    fn test_rejects_non_hostnames() {
        let t = HostnameMap::new("hosts", &HostnameMapConfig::default()).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();

        let line = "took 0.000803442s wrote http.log.access.log0 from 10.0.0.1 v1.2";
        assert_eq!(run(&t, &mut state, &stats, line), line);
        assert_eq!(stats.get("hosts"), 0);
    }

    #[test]
    fn test_already_mapped_hosts_are_skipped() {
        let t = HostnameMap::new("hosts", &HostnameMapConfig::default()).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();

        let line = "host12.example12.com and example3.com";
        assert_eq!(run(&t, &mut state, &stats, line), line);
    }

    #[test]
    fn test_deny_prefix_requires_digits() {
        let mapper = HostnameMapper::new(&HostnameMapConfig::default());
        assert!(!mapper.accepts("host7.example7.com"));
        assert!(mapper.accepts("hostile.corp.com"));
        assert!(mapper.accepts("host.corp.com"));
    }

    #[test]
    fn test_own_first_label_prefix_is_always_denied() {
        let config = HostnameMapConfig {
            deny_prefixes: Vec::new(),
            first_label_prefix: "srv".to_string(),
            ..structured("example.com", false)
        };
        let mapper = HostnameMapper::new(&config);
        assert!(!mapper.accepts("srv1.sub1.example.com"));
        assert!(mapper.accepts("host1.corp.com"));

        let flat = HostnameMapper::new(&HostnameMapConfig {
            deny_prefixes: Vec::new(),
            ..HostnameMapConfig::default()
        });
        assert!(!flat.accepts("host3.example3.com"));
    }

    #[test]
    fn test_structured_preserves_depth() {
        let t = HostnameMap::new("hosts", &structured("example.com", false)).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();

        assert_eq!(
            run(&t, &mut state, &stats, "api.internal.corp.com"),
            "host1.sub1.example.com"
        );
        assert_eq!(
            run(&t, &mut state, &stats, "db.internal.corp.com"),
            "host2.sub1.example.com"
        );
        assert_eq!(run(&t, &mut state, &stats, "web.corp.com"), "host3.example.com");
        assert_eq!(run(&t, &mut state, &stats, "corp.io"), "host4.com");
    }

    #[test]
    fn test_structured_reuses_labels_across_positions() {
        let mapper = HostnameMapper::new(&structured("example.com", false));
        let mut state = MappingState::new();

        let a = mapper.map("api.eu.west.corp.net", &mut state);
        let b = mapper.map("api.us.west.corp.net", &mut state);
        assert_eq!(a, "host1.sub1.sub2.example.com");
        assert_eq!(b, "host1.sub3.sub2.example.com");
    }

    #[test]
    fn test_structured_preserve_tld() {
        let mapper = HostnameMapper::new(&structured("example.com", true));
        let mut state = MappingState::new();
        assert_eq!(mapper.map("mail.corp.de", &mut state), "host1.example.de");
    }

    #[test]
    fn test_structured_single_label_root() {
        let mapper = HostnameMapper::new(&structured("internal", false));
        let mut state = MappingState::new();
        assert_eq!(mapper.map("a.b.corp.com", &mut state), "host1.sub1.sub2.internal");
    }

    #[test]
    fn test_trailing_dot_is_kept() {
        let mapper = HostnameMapper::new(&HostnameMapConfig::default());
        let mut state = MappingState::new();
        assert!(mapper.accepts("corp.com."));
        assert_eq!(mapper.map("corp.com.", &mut state), "host1.example1.com.");
        assert_eq!(mapper.map("corp.com", &mut state), "host1.example1.com");
    }
}
