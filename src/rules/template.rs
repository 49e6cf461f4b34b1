//! Key Template Module
//!
//! Parses and renders key templates such as `"widget:{0}"`.

use std::fmt;

use crate::error::{CacheError, Result};

const PLACEHOLDER: &str = "{0}";

// == Key Template ==
/// A validated key template with exactly one `{0}` placeholder.
///
/// `{{` and `}}` render as literal braces. The template is split once at
/// parse time so rendering is a plain concatenation that does not depend on
/// the process locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    /// Original template text, kept for diagnostics
    source: String,
    /// Rendered text before the placeholder
    prefix: String,
    /// Rendered text after the placeholder
    suffix: String,
}

impl KeyTemplate {
    // == Parse ==
    /// Parses a template, rejecting anything other than a single `{0}`.
    pub fn parse(template: &str) -> Result<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut seen_placeholder = false;

        let mut chars = template.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            let out = if seen_placeholder {
                &mut suffix
            } else {
                &mut prefix
            };

            match ch {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    if !template[idx..].starts_with(PLACEHOLDER) {
                        return Err(CacheError::invalid_template(
                            template,
                            format!("unsupported placeholder at byte {}", idx),
                        ));
                    }
                    if seen_placeholder {
                        return Err(CacheError::invalid_template(
                            template,
                            "placeholder {0} appears more than once",
                        ));
                    }
                    seen_placeholder = true;
                    // Skip the remaining "0}".
                    chars.next();
                    chars.next();
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => {
                    return Err(CacheError::invalid_template(
                        template,
                        format!("unmatched '}}' at byte {}", idx),
                    ));
                }
                other => out.push(other),
            }
        }

        if !seen_placeholder {
            return Err(CacheError::invalid_template(
                template,
                "missing placeholder {0}",
            ));
        }

        Ok(Self {
            source: template.to_string(),
            prefix,
            suffix,
        })
    }

    // == Render ==
    /// Substitutes `raw_key` into the placeholder.
    pub fn render(&self, raw_key: &str) -> String {
        let mut key = String::with_capacity(self.prefix.len() + raw_key.len() + self.suffix.len());
        key.push_str(&self.prefix);
        key.push_str(raw_key);
        key.push_str(&self.suffix);
        key
    }

    /// Returns the template text as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
