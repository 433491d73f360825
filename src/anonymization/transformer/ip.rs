//! IPv4 address mapping
//!
//! Public addresses become "repeated-digit" addresses (`111.111.111.111`,
//! `122.122.122.122`, ...). Addresses inside a keep range are left alone,
//! and an optional `/NN` suffix is carried over unchanged.

use super::{RuleContext, RuleKind, Transformer};
use crate::anonymization::state::{Category, MappingState};
use crate::config::IpConfig;
use crate::domain::{AnonymizeError, Result};
use regex::{Captures, Regex};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

const IPV4_PATTERN: &str = r"\b([0-9]{1,3}(?:\.[0-9]{1,3}){3})(?:/([0-9]{1,2}))?\b";

/// IPv4 network in CIDR notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Create a network from an address and prefix length (0..=32)
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        (prefix_len <= 32).then_some(Self {
            network,
            prefix_len,
        })
    }

    /// Prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `addr` falls inside this network
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = match self.prefix_len {
            0 => 0,
            n => u32::MAX << (32 - u32::from(n)),
        };
        u32::from(addr) & mask == u32::from(self.network) & mask
    }
}

impl FromStr for Ipv4Cidr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| format!("'{s}' is missing a /prefix length"))?;
        let network = parse_ipv4(addr).ok_or_else(|| format!("'{addr}' is not an IPv4 address"))?;
        let prefix_len: u8 = len
            .parse()
            .map_err(|_| format!("'{len}' is not a valid prefix length"))?;
        Ipv4Cidr::new(network, prefix_len)
            .ok_or_else(|| format!("prefix length {prefix_len} exceeds 32"))
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Strict dotted-quad parse: four non-empty decimal octets in 0..=255,
/// no leading zeros.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if part.len() > 1 && part.starts_with('0') {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// IPv4 mapper
pub struct IpMap {
    name: String,
    re: Regex,
    keep: Vec<Ipv4Cidr>,
    public_base: i64,
    public_step: i64,
    preserve_cidr: bool,
}

impl IpMap {
    /// Create an IPv4 mapper for `name`
    pub fn new(name: &str, config: &IpConfig) -> Result<Self> {
        let keep = config
            .keep_cidrs
            .iter()
            .map(|s| {
                s.parse::<Ipv4Cidr>().map_err(|e| {
                    AnonymizeError::Validation(format!("invalid ip.keep_cidrs entry: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            re: Regex::new(IPV4_PATTERN)?,
            keep,
            public_base: i64::from(config.public_base),
            public_step: i64::from(config.public_step),
            preserve_cidr: config.preserve_cidr,
        })
    }

    fn should_keep(&self, addr: Ipv4Addr) -> bool {
        self.keep.iter().any(|range| range.contains(addr))
    }

    fn map_public(&self, addr: &str, state: &mut MappingState) -> String {
        state.get_or_create(&Category::PublicIp, addr, |n| {
            let octet = synthetic_octet(self.public_base, self.public_step, n);
            format!("{octet}.{octet}.{octet}.{octet}")
        })
    }
}

/// `base + (n-1)*step`, kept inside 1..=254
fn synthetic_octet(base: i64, step: i64, n: u64) -> i64 {
    let n = i64::try_from(n).unwrap_or(i64::MAX);
    let mut octet = base.saturating_add((n - 1).saturating_mul(step));
    if octet < 1 {
        octet = 1;
    }
    if octet > 254 {
        octet = 1 + (octet - 1) % 254;
    }
    octet
}

/// Digits glued on with a dot (`1.2.3.4.5`, `v1.2.3.4`) mean the match is
/// part of a longer dotted number, not an address.
fn embedded_in_dotted_number(line: &str, start: usize, end: usize) -> bool {
    let bytes = line.as_bytes();
    let before = start >= 2 && bytes[start - 1] == b'.' && bytes[start - 2].is_ascii_digit();
    let after =
        end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit();
    before || after
}

impl Transformer for IpMap {
    fn apply(&self, line: &str, ctx: &mut RuleContext<'_>) -> Result<String> {
        let mut replaced = 0u64;
        let state = &mut *ctx.state;

        let out = self.re.replace_all(line, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let Some(ip) = caps.get(1) else {
                return whole.to_string();
            };
            let Some(addr) = parse_ipv4(ip.as_str()) else {
                return whole.to_string();
            };
            let end = caps.get(0).map_or(ip.end(), |m| m.end());
            if embedded_in_dotted_number(line, ip.start(), end) {
                return whole.to_string();
            }
            if self.should_keep(addr) {
                return whole.to_string();
            }

            let suffix = match caps.get(2) {
                Some(cidr) if self.preserve_cidr => match cidr.as_str().parse::<u8>() {
                    Ok(len) if len <= 32 => format!("/{}", cidr.as_str()),
                    _ => String::new(),
                },
                _ => String::new(),
            };

            replaced += 1;
            format!("{}{}", self.map_public(ip.as_str(), state), suffix)
        });

        ctx.stats.inc(&self.name, replaced);
        Ok(out.into_owned())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        RuleKind::IpMap
    }
}
