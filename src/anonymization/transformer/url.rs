//! Host rewriting inside http(s) URLs
//!
//! Only the host changes. Scheme, userinfo, port, path, query and fragment
//! are copied through byte for byte, and punctuation trailing the URL in
//! prose (`see https://x.corp.com/a).`) is put back afterwards.

use super::hostname::HostnameMapper;
use super::{RuleContext, RuleKind, Transformer};
use crate::anonymization::state::MappingState;
use crate::config::HostnameMapConfig;
use crate::domain::Result;
use regex::{Captures, Regex};
use url::{Host, Url};

const URL_PATTERN: &str = r#"(?i)\bhttps?://[^\s"'<>]+"#;
const TRAILING_PUNCTUATION: &[char] = &[')', ']', '}', '.', ',', ';'];

/// URL host mapper
pub struct UrlMap {
    name: String,
    re: Regex,
    mapper: HostnameMapper,
}

impl UrlMap {
    /// Create a URL mapper for `name`, sharing the hostname settings
    pub fn new(name: &str, config: &HostnameMapConfig) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            re: Regex::new(URL_PATTERN)?,
            mapper: HostnameMapper::new(config),
        })
    }

    /// Rewrite one trimmed URL, or `None` to leave it as is
    fn rewrite(&self, candidate: &str, state: &mut MappingState) -> Option<String> {
        let parsed = Url::parse(candidate).ok()?;
        match parsed.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => {}
            _ => return None,
        }

        let (start, end) = host_span(candidate)?;
        let raw_host = &candidate[start..end];
        if !self.mapper.accepts(raw_host) {
            return None;
        }

        let mapped = self.mapper.map(raw_host, state);
        Some(format!("{}{}{}", &candidate[..start], mapped, &candidate[end..]))
    }
}

/// Byte range of the host inside `url` as written
fn host_span(url: &str) -> Option<(usize, usize)> {
    let authority_start = url.find("://")? + 3;
    let rest = &url[authority_start..];
    // http(s) parsers treat `\` like `/`
    let authority_len = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_len];

    let host_offset = authority.rfind('@').map_or(0, |at| at + 1);
    let host_and_port = &authority[host_offset..];
    let host_len = host_and_port.find(':').unwrap_or(host_and_port.len());
    if host_len == 0 {
        return None;
    }

    let start = authority_start + host_offset;
    Some((start, start + host_len))
}

impl Transformer for UrlMap {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut replaced = 0u64;
        let state = &mut *ctx.state;

        let out = self.re.replace_all(line, |caps: &Captures<'_>| {
            let token = &caps[0];
            let trimmed = token.trim_end_matches(TRAILING_PUNCTUATION);
            let trailing = &token[trimmed.len()..];

            match self.rewrite(trimmed, state) {
                Some(url) => {
                    replaced += 1;
                    format!("{url}{trailing}")
                }
                None => token.to_string(),
            }
        });

        ctx.stats.inc(&self.name, replaced);
        Ok(out.into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::UrlMap
    }
}
