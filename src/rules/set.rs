//! Rule Set Module
//!
//! Immutable, case-insensitive mapping from bucket name to [`CacheRule`].

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::rules::CacheRule;

// == Rule Set ==
/// Bucket rules, keyed by either a literal cache key or a type's cache name.
///
/// Built once during configuration and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules keyed by lowercased bucket name
    rules: HashMap<String, CacheRule>,
}

impl RuleSet {
    // == Constructor ==
    /// Creates an empty rule set, under which every bucket uses defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a rule set, rejecting names that collide case-insensitively.
    pub fn from_rules<I, K>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, CacheRule)>,
        K: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, rule) in rules {
            set.insert(name.as_ref(), rule)?;
        }
        Ok(set)
    }

    // == Insert ==
    fn insert(&mut self, name: &str, rule: CacheRule) -> Result<()> {
        let folded = fold(name);
        if self.rules.contains_key(&folded) {
            return Err(CacheError::InvalidConfig(format!(
                "Duplicate cache bucket '{}' (bucket names are case-insensitive)",
                name
            )));
        }
        self.rules.insert(folded, rule);
        Ok(())
    }

    // == Resolve ==
    /// Returns the rule for `identifier`, or `None` when defaults apply.
    pub fn resolve(&self, identifier: &str) -> Option<&CacheRule> {
        self.rules.get(&fold(identifier))
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}
