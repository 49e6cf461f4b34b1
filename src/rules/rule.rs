//! Cache Rule Module
//!
//! Per-bucket settings: enabled flag, key template and default expiry.

use std::time::Duration;

use crate::error::Result;
use crate::rules::KeyTemplate;

// == Cache Rule ==
/// Caching behavior for one bucket.
///
/// A disabled rule short-circuits every operation, so its template and
/// expiry are never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRule {
    enabled: bool,
    key_template: Option<KeyTemplate>,
    expiry: Option<Duration>,
}

impl CacheRule {
    // == Constructors ==
    /// Creates an enabled rule with no key rewrite and no default expiry.
    pub fn new() -> Self {
        Self {
            enabled: true,
            key_template: None,
            expiry: None,
        }
    }

    /// Creates a rule that bypasses the store entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Sets the key template, validating it immediately.
    pub fn with_key_template(mut self, template: &str) -> Result<Self> {
        self.key_template = Some(KeyTemplate::parse(template)?);
        Ok(self)
    }

    /// Sets the default expiry used when callers pass none.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    // == Accessors ==
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key_template(&self) -> Option<&KeyTemplate> {
        self.key_template.as_ref()
    }

    pub fn expiry(&self) -> Option<Duration> {
        self.expiry
    }
}

impl Default for CacheRule {
    fn default() -> Self {
        Self::new()
    }
}

// == Route ==
/// Where a single operation goes after rule resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The bucket is disabled; the store is not touched.
    Bypass,
    /// Talk to the store at `key`, writing with `ttl` if the operation writes.
    Store { key: String, ttl: Option<Duration> },
}

impl Route {
    // == Resolve ==
    /// Computes the effective key and TTL for one call.
    ///
    /// TTL precedence: `explicit`, then the rule's expiry, then none. A missing
    /// rule keeps the raw key and uses `explicit` as-is.
    pub fn resolve(rule: Option<&CacheRule>, raw_key: &str, explicit: Option<Duration>) -> Self {
        match rule {
            Some(rule) if !rule.is_enabled() => Route::Bypass,
            Some(rule) => Route::Store {
                key: effective_key(raw_key, Some(rule)),
                ttl: explicit.or(rule.expiry()),
            },
            None => Route::Store {
                key: raw_key.to_string(),
                ttl: explicit,
            },
        }
    }
}

// == Effective Key ==
/// Renders the store key for `raw_key` under `rule`.
pub fn effective_key(raw_key: &str, rule: Option<&CacheRule>) -> String {
    match rule.and_then(CacheRule::key_template) {
        Some(template) => template.render(raw_key),
        None => raw_key.to_string(),
    }
}
