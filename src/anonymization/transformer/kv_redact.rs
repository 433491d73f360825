//! Key/value redaction
//!
//! Values of sensitive keys are replaced with a label. Two passes run in
//! order: quoted pairs (`"key": "value"`, `'key': 'value'`) first, then the
//! loose `key=value` / `key: value` forms on the output of the first pass.
//! Key spelling, separator whitespace and quote style are kept as written.

use super::{RuleContext, RuleKind, Transformer};
use crate::config::KeysConfig;
use crate::domain::Result;
use regex::{Captures, Regex};
use std::collections::HashSet;

const QUOTED_PATTERN: &str = r#""([A-Za-z0-9_.-]+)"(\s*:\s*)"([^"\n\r]*)"|'([A-Za-z0-9_.-]+)'(\s*:\s*)'([^'\n\r]*)'"#;
const LOOSE_PATTERN: &str = r#"\b([A-Za-z0-9_.-]+)(\s*[:=]\s*)(["']?)([^\s,"'}\]]+)(["']?)"#;

/// Sensitive key/value redactor
pub struct KvRedact {
    name: String,
    quoted: Regex,
    loose: Regex,
    keys: HashSet<String>,
    placeholder: Option<String>,
}

impl KvRedact {
    /// Create a redactor for `name` over the `[keys]` section
    pub fn new(name: &str, config: &KeysConfig) -> Result<Self> {
        let keys = config
            .redact_value
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            name: name.to_string(),
            quoted: Regex::new(QUOTED_PATTERN)?,
            loose: Regex::new(LOOSE_PATTERN)?,
            keys,
            placeholder: config.placeholder.clone().filter(|p| !p.is_empty()),
        })
    }

    fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    /// Replacement text for a value of `key`
    fn label(&self, key: &str) -> String {
        match &self.placeholder {
            Some(placeholder) => placeholder.clone(),
            None => format!("REDACTED_{}", sanitize_key(key)),
        }
    }

    fn redact_quoted(&self, line: &str, replaced: &mut u64) -> String {
        self.quoted
            .replace_all(line, |caps: &Captures<'_>| {
                let (key, sep, value, quote) = match (caps.get(1), caps.get(4)) {
                    (Some(key), _) => (key.as_str(), &caps[2], &caps[3], '"'),
                    (None, Some(key)) => (key.as_str(), &caps[5], &caps[6], '\''),
                    (None, None) => return caps[0].to_string(),
                };
                if !self.is_sensitive(key) {
                    return caps[0].to_string();
                }
                let label = self.label(key);
                if value == label {
                    return caps[0].to_string();
                }
                *replaced += 1;
                format!("{quote}{key}{quote}{sep}{quote}{label}{quote}")
            })
            .into_owned()
    }

    fn redact_loose(&self, line: &str, replaced: &mut u64) -> String {
        let mut out = String::with_capacity(line.len());
        let mut copied = 0;
        let mut pos = 0;

        while let Some(caps) = self.loose.captures_at(line, pos) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(4)) else {
                break;
            };
            pos = whole.end();

            let key = &caps[1];
            if !self.is_sensitive(key) {
                continue;
            }
            // The value class stops at brackets, so compare against the raw text
            let label = self.label(key);
            if line[value.start()..].starts_with(&label) {
                pos = pos.max(value.start() + label.len());
                continue;
            }

            out.push_str(&line[copied..whole.start()]);
            out.push_str(&format!("{key}{}{}{label}{}", &caps[2], &caps[3], &caps[5]));
            copied = whole.end();
            *replaced += 1;
        }

        out.push_str(&line[copied..]);
        out
    }
}

/// Lowercase, with anything outside `[a-z0-9_]` turned into `_`
fn sanitize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect()
}

impl Transformer for KvRedact {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        if self.keys.is_empty() {
            return Ok(line.to_string());
        }

        let mut replaced = 0u64;
        let quoted = self.redact_quoted(line, &mut replaced);
        let out = self.redact_loose(&quoted, &mut replaced);

        ctx.stats.inc(&self.name, replaced);
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::KvRedact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::state::MappingState;
    use crate::anonymization::stats::Stats;
    use test_case::test_case;

    fn keys(names: &[&str], placeholder: Option<&str>) -> KeysConfig {
        KeysConfig {
            redact_value: names.iter().map(|s| s.to_string()).collect(),
            placeholder: placeholder.map(str::to_string),
        }
    }

    fn run(config: &KeysConfig, line: &str) -> (String, u64) {
        let t = KvRedact::new("secrets", config).unwrap();
        let mut state = MappingState::new();
        let stats = Stats::new();
        let out = t.apply(line, &mut RuleContext::new(&mut state, &stats)).unwrap();
        (out, stats.get("secrets"))
    }

    #[test_case(r#"password="s3cr3t""#, r#"password="REDACTED_password""# ; "loose double quoted")]
    #[test_case("password=s3cr3t next", "password=REDACTED_password next" ; "loose bare")]
    #[test_case("Password : s3cr3t", "Password : REDACTED_password" ; "loose colon keeps spacing and case")]
    #[test_case(r#"{"Password": "s3cr3t", "user": "bob"}"#, r#"{"Password": "REDACTED_password", "user": "bob"}"# ; "json pair")]
    #[test_case("{'password':'s3cr3t'}", "{'password':'REDACTED_password'}" ; "single quoted pair")]
    #[test_case("api-key=abc", "api-key=REDACTED_api_key" ; "sanitized label")]
    fn test_redacts(input: &str, expected: &str) {
        let config = keys(&["password", "API-KEY"], None);
        let (out, count) = run(&config, input);
        assert_eq!(out, expected);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_configured_placeholder() {
        let config = keys(&["password"], Some("[redacted]"));
        let (out, count) = run(&config, r#"password="s3cr3t""#);
        assert_eq!(out, r#"password="[redacted]""#);
        assert_eq!(count, 1);
    }

    #[test_case("password=[redacted] ok" ; "bare")]
    #[test_case(r#"password="[redacted]""# ; "quoted")]
    #[test_case("password: [redacted], token=[redacted]" ; "several")]
    fn test_bracketed_placeholder_left_alone(line: &str) {
        let config = keys(&["password", "token"], Some("[redacted]"));
        assert_eq!(run(&config, line), (line.to_string(), 0));
    }

    #[test]
    fn test_redaction_is_idempotent_with_bracketed_placeholder() {
        let config = keys(&["password"], Some("[redacted]"));
        let (once, first) = run(&config, "password=s3cr3t");
        let (twice, second) = run(&config, &once);
        assert_eq!(once, "password=[redacted]");
        assert_eq!(twice, once);
        assert_eq!((first, second), (1, 0));
    }

    #[test]
    fn test_non_sensitive_keys_untouched() {
        let config = keys(&["password"], None);
        let line = r#"user=bob {"level": "info"} passwords=x"#;
        assert_eq!(run(&config, line), (line.to_string(), 0));
    }

    #[test]
    fn test_already_redacted_not_counted() {
        let config = keys(&["token"], None);
        let line = r#"token=REDACTED_token {"token": "REDACTED_token"}"#;
        assert_eq!(run(&config, line), (line.to_string(), 0));
    }

    #[test]
    fn test_multiple_pairs_counted() {
        let config = keys(&["password", "token"], None);
        let (out, count) = run(&config, r#"{"token": "t1"} password=p1 token: t2"#);
        assert_eq!(
            out,
            r#"{"token": "REDACTED_token"} password=REDACTED_password token: REDACTED_token"#
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn test_empty_key_set_is_noop() {
        let config = keys(&[], None);
        let line = "password=hunter2";
        assert_eq!(run(&config, line), (line.to_string(), 0));
    }
}
