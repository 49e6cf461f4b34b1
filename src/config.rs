//! Configuration Module
//!
//! Loads bucket rules and background task settings from environment
//! variables or JSON documents.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};
use crate::rules::{CacheRule, RuleSet};

/// Settings for one cache bucket, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    /// Whether the bucket is cached at all (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Store key template with a single `{0}` placeholder
    #[serde(default, alias = "key_name")]
    pub key_template: Option<String>,
    /// Default expiry in seconds
    #[serde(default)]
    pub expiry_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_template: None,
            expiry_secs: None,
        }
    }
}

impl RuleConfig {
    /// Builds the runtime rule, validating the key template.
    pub fn to_rule(&self) -> Result<CacheRule> {
        let mut rule = CacheRule::new().with_enabled(self.enabled);
        if let Some(template) = &self.key_template {
            rule = rule.with_key_template(template)?;
        }
        if let Some(secs) = self.expiry_secs {
            rule = rule.with_expiry(Duration::from_secs(secs));
        }
        Ok(rule)
    }
}

/// Cache facade configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bucket rules keyed by cache key or type cache name
    #[serde(default, rename = "cache")]
    pub rules: BTreeMap<String, RuleConfig>,
    /// In-memory store cleanup interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

fn default_cleanup_interval() -> u64 {
    1
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_RULES` - JSON object of bucket rules
    /// - `CACHE_RULES_FILE` - Path to a JSON file of bucket rules, read when
    ///   `CACHE_RULES` is unset
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Result<Self> {
        let rules_json = match env::var("CACHE_RULES") {
            Ok(json) => Some(json),
            Err(_) => match env::var("CACHE_RULES_FILE") {
                Ok(path) => Some(fs::read_to_string(&path).map_err(|e| {
                    CacheError::InvalidConfig(format!("Cannot read {}: {}", path, e))
                })?),
                Err(_) => None,
            },
        };

        let rules = match rules_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                CacheError::InvalidConfig(format!("Cannot parse cache rules: {}", e))
            })?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            rules,
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_cleanup_interval),
        })
    }

    /// Parses a JSON document of the form
    /// `{"cache": {"Widget": {"expiry_secs": 60}}, "cleanup_interval": 5}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::InvalidConfig(format!("Cannot parse configuration: {}", e)))
    }

    /// Builds the immutable rule set, validating every key template.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let rules = self
            .rules
            .iter()
            .map(|(name, cfg)| cfg.to_rule().map(|rule| (name.as_str(), rule)))
            .collect::<Result<Vec<_>>>()?;
        RuleSet::from_rules(rules)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}
