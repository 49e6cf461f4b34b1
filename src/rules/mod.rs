//! Rules Module
//!
//! Bucket configuration: which keys and types are cached, under what store
//! key, and for how long.

mod rule;
mod set;
mod template;

pub use rule::{effective_key, CacheRule, Route};
pub use set::RuleSet;
pub use template::KeyTemplate;
