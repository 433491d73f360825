//! Per-run pseudonymization state
//!
//! [`MappingState`] is the arena every transformer reads and writes. It
//! holds one memoization table per [`Category`] together with a monotonic
//! counter. Once a normalized original has been assigned a substitute the
//! association never changes for the rest of the run.
//!
//! The state is not internally synchronized: one [`Engine`] drives it from
//! a single thread. Workers that want parallelism need one engine each.
//!
//! [`Engine`]: crate::anonymization::Engine

use std::collections::HashMap;
use zeroize::Zeroize;

/// Mapping table category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Email local parts
    EmailLocal,
    /// Email domains (lower-cased)
    EmailDomain,
    /// Public IPv4 addresses
    PublicIp,
    /// Whole hostnames in flat mode
    HostFlat,
    /// First labels in structured mode
    HostFirstLabel,
    /// Intermediate labels in structured mode
    HostOtherLabel,
    /// Table owned by a user-defined `regex_map` rule
    Rule(String),
}

/// One memoization table and the counter feeding its generator
#[derive(Debug, Default)]
struct MappingTable {
    entries: HashMap<String, String>,
    counter: u64,
}

impl MappingTable {
    fn get_or_create<F>(&mut self, key: &str, generate: F) -> String
    where
        F: FnOnce(u64) -> String,
    {
        if let Some(existing) = self.entries.get(key) {
            return existing.clone();
        }
        self.counter += 1;
        let substitute = generate(self.counter);
        self.entries.insert(key.to_string(), substitute.clone());
        substitute
    }

    fn clear(&mut self) {
        for (mut original, mut substitute) in self.entries.drain() {
            original.zeroize();
            substitute.zeroize();
        }
        self.entries.shrink_to_fit();
        self.counter = 0;
    }
}

/// Process-scoped mapping tables and counters
#[derive(Debug, Default)]
pub struct MappingState {
    email_local: MappingTable,
    email_domain: MappingTable,
    public_ip: MappingTable,
    host_flat: MappingTable,
    host_first_label: MappingTable,
    host_other_label: MappingTable,
    rules: HashMap<String, MappingTable>,
}

impl MappingState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the substitute for `key` in `category`, generating one if needed
    ///
    /// `key` must already be normalized. When it has not been seen before,
    /// the category counter is incremented and `generate` is called with
    /// the new (1-based) counter value. Generators must be pure functions of
    /// that value.
    ///
    /// # Examples
    ///
    /// ```
    /// use anonymize::anonymization::state::{Category, MappingState};
    ///
    /// let mut state = MappingState::new();
    /// let a = state.get_or_create(&Category::HostFlat, "db.corp.com", |n| format!("host{n}"));
    /// let b = state.get_or_create(&Category::HostFlat, "db.corp.com", |n| format!("other{n}"));
    /// assert_eq!(a, "host1");
    /// assert_eq!(a, b);
    /// ```
    pub fn get_or_create<F>(&mut self, category: &Category, key: &str, generate: F) -> String
    where
        F: FnOnce(u64) -> String,
    {
        self.table_mut(category).get_or_create(key, generate)
    }

    /// Substitute already assigned to `key`, if any
    pub fn lookup(&self, category: &Category, key: &str) -> Option<&str> {
        self.table(category)
            .and_then(|t| t.entries.get(key))
            .map(String::as_str)
    }

    /// Number of unique keys seen in `category`
    pub fn len(&self, category: &Category) -> usize {
        self.table(category).map_or(0, |t| t.entries.len())
    }

    /// Current counter value of `category`
    pub fn counter(&self, category: &Category) -> u64 {
        self.table(category).map_or(0, |t| t.counter)
    }

    /// True when no table holds any entry
    pub fn is_empty(&self) -> bool {
        self.fixed_tables().all(|t| t.entries.is_empty())
            && self.rules.values().all(|t| t.entries.is_empty())
    }

    /// Drop every mapping and reset every counter
    ///
    /// Keys and substitutes are zeroized before their memory is released.
    pub fn clear(&mut self) {
        self.email_local.clear();
        self.email_domain.clear();
        self.public_ip.clear();
        self.host_flat.clear();
        self.host_first_label.clear();
        self.host_other_label.clear();
        for table in self.rules.values_mut() {
            table.clear();
        }
        self.rules.clear();
        self.rules.shrink_to_fit();
    }

    fn table(&self, category: &Category) -> Option<&MappingTable> {
        match category {
            Category::EmailLocal => Some(&self.email_local),
            Category::EmailDomain => Some(&self.email_domain),
            Category::PublicIp => Some(&self.public_ip),
            Category::HostFlat => Some(&self.host_flat),
            Category::HostFirstLabel => Some(&self.host_first_label),
            Category::HostOtherLabel => Some(&self.host_other_label),
            Category::Rule(name) => self.rules.get(name),
        }
    }

    fn table_mut(&mut self, category: &Category) -> &mut MappingTable {
        match category {
            Category::EmailLocal => &mut self.email_local,
            Category::EmailDomain => &mut self.email_domain,
            Category::PublicIp => &mut self.public_ip,
            Category::HostFlat => &mut self.host_flat,
            Category::HostFirstLabel => &mut self.host_first_label,
            Category::HostOtherLabel => &mut self.host_other_label,
            Category::Rule(name) => self.rules.entry(name.clone()).or_default(),
        }
    }

    fn fixed_tables(&self) -> impl Iterator<Item = &MappingTable> {
        [
            &self.email_local,
            &self.email_domain,
            &self.public_ip,
            &self.host_flat,
            &self.host_first_label,
            &self.host_other_label,
        ]
        .into_iter()
    }
}

impl Drop for MappingState {
    fn drop(&mut self) {
        self.clear();
    }
}
