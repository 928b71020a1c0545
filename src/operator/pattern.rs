//! `$regex` pattern text
//!
//! Patterns are either plain regular expressions (`baboon`) or written in the
//! delimited form `/body/flags` (`/baboon/i`).

use crate::error::PatternError;
use regex::Regex;
use std::sync::LazyLock;

static DELIMITED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(.*)/(\w*)$").expect("valid delimited pattern regex"));

/// Split `/body/flags` into its parts; anything else is a bare body.
pub fn split_pattern(text: &str) -> (&str, &str) {
    match DELIMITED_RE.captures(text) {
        Some(caps) => {
            let body = caps.get(1).map_or("", |m| m.as_str());
            let flags = caps.get(2).map_or("", |m| m.as_str());
            (body, flags)
        }
        None => (text, ""),
    }
}

/// Compile pattern text into a regex.
///
/// Flags `i`, `m` and `s` become inline flags. `g`, `y` and `u` change nothing
/// for a yes/no match and are accepted silently.
pub fn compile_pattern(text: &str) -> Result<Regex, PatternError> {
    let (body, flags) = split_pattern(text);

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' => {
                if !inline.contains(flag) {
                    inline.push(flag);
                }
            }
            'g' | 'y' | 'u' => {}
            other => return Err(PatternError::Flag(other)),
        }
    }

    let source = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{inline}){body}")
    };

    Ok(Regex::new(&source)?)
}
