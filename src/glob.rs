//! Shell-style wildcard matching.
//!
//! Patterns follow `fnmatch` rules: `*` matches any run of characters
//! (including `:` and `/`), `?` matches one character and `[...]` is a
//! character class, negated with a leading `!`. Patterns are compiled to
//! anchored regular expressions and cached process-wide. The cache holds at
//! most [`MAX_CACHED_PATTERNS`] entries and is cleared when it fills up.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Upper bound on compiled patterns kept in the cache.
pub const MAX_CACHED_PATTERNS: usize = 4096;

static GLOB_PATTERNS: Lazy<RwLock<HashMap<String, Option<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Translate a wildcard pattern into an anchored regex source string.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^(?:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                    continue;
                }
                let body = &chars[i..j];
                i = j + 1;
                out.push('[');
                let body = match body.first() {
                    Some('!') => {
                        out.push('^');
                        &body[1..]
                    }
                    _ => body,
                };
                let mut prev = None;
                for &ch in body {
                    if ch == '-' && prev != Some('-') {
                        out.push('-');
                    } else {
                        out.push_str(&regex::escape(&ch.to_string()));
                    }
                    prev = Some(ch);
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push_str(")$");
    out
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(&glob_to_regex(pattern)) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(
                event = "Glob",
                pattern = pattern,
                error = %e,
                "Wildcard pattern did not compile, falling back to literal comparison"
            );
            None
        }
    }
}

/// True if `value` is matched by the wildcard `pattern`.
///
/// Matching is case-sensitive; callers fold case first where needed.
pub fn glob_match(value: &str, pattern: &str) -> bool {
    if pattern == "*" || value == pattern {
        return true;
    }
    if !pattern.contains(['*', '?', '[']) {
        return false;
    }

    if let Ok(cache) = GLOB_PATTERNS.read() {
        if let Some(compiled) = cache.get(pattern) {
            return compiled.as_ref().is_some_and(|re| re.is_match(value));
        }
    }

    let compiled = compile(pattern);
    let matched = compiled.as_ref().is_some_and(|re| re.is_match(value));
    if let Ok(mut cache) = GLOB_PATTERNS.write() {
        if cache.len() >= MAX_CACHED_PATTERNS {
            debug!(event = "Glob", phase = "Evict", patterns = cache.len());
            cache.clear();
        }
        cache.insert(pattern.to_string(), compiled);
    }
    matched
}
