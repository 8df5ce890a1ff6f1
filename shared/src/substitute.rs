//! `:name:` placeholder substitution.
//!
//! Shared between DAO URL assembly and widget template rendering. Values are
//! replaced by literal string replacement with no escaping; template sources
//! are trusted configuration, never user input.

use std::collections::HashMap;

/// Replace every `:name:` token that has a value in `params`. Tokens without
/// a value are left in place for the caller to detect.
pub fn substitute(template: &str, params: &HashMap<String, String>) -> String {
    let mut out = template.to_owned();
    for (name, value) in params {
        out = out.replace(&format!(":{name}:"), value);
    }
    out
}

/// Returns the name of the first remaining `:name:` token, if any.
///
/// A token is a `:`, an identifier (leading alphabetic or `_`, then
/// alphanumeric or `_`), and a closing `:`. Scheme separators and port
/// numbers in URLs do not match this shape.
pub fn first_unresolved(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            if let Some(name) = token_at(s, i) {
                return Some(name);
            }
        }
        i += 1;
    }
    None
}

fn token_at(s: &str, start: usize) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut j = start + 1;
    if j >= bytes.len() || !(bytes[j].is_ascii_alphabetic() || bytes[j] == b'_') {
        return None;
    }
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        j += 1;
    }
    if j < bytes.len() && bytes[j] == b':' {
        Some(&s[start + 1..j])
    } else {
        None
    }
}
