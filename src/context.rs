//! Dot-path selectors
//!
//! A selector names a field inside a document: `user.level`, `items.0.name`.
//! A dot that belongs to a key is escaped as `\.`, and bracket notation
//! (`user["add.com"]`, `user[add]`, `user['add']`) is rewritten into the
//! escaped dotted form before the path is split.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(.+)?\[\s*['"]?([^'"\s]+)['"]?\s*\](\..+)?$"#).expect("valid bracket regex")
});

/// A parsed dot-path selector, split into its key segments once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    segments: Vec<String>,
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_brackets(raw);
        Selector {
            raw: raw.to_string(),
            segments: split_path(&normalized),
        }
    }

    /// The selector exactly as written in the query
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Select the value this path points at, or `None` when any segment is missing.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        if self.segments.is_empty() {
            return None;
        }

        let mut value = document;
        for key in &self.segments {
            value = match value {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolve `selector` against `document` without keeping the parsed path around.
pub fn resolve<'a>(selector: &str, document: &'a Value) -> Option<&'a Value> {
    Selector::parse(selector).resolve(document)
}

/// Rewrite bracket notation into escaped dot notation.
///
/// `a[b.c].d` becomes `a.b\.c.d`. Brackets are consumed right to left until
/// none are left.
pub fn normalize_brackets(selector: &str) -> String {
    let mut current = selector.to_string();

    while let Some(caps) = BRACKET_RE.captures(&current) {
        let header = caps
            .get(1)
            .map(|m| format!("{}.", m.as_str()))
            .unwrap_or_default();
        let body = caps[2].replace('.', "\\.");
        let footer = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        current = format!("{header}{body}{footer}");
    }

    current
}

/// Split a dotted path into keys, honouring `\.` escapes.
///
/// A trailing empty segment is dropped; empty segments in the middle are kept.
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                chars.next();
                current.push('.');
            }
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
