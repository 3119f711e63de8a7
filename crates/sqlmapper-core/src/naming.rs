//! Column-name transliteration and identifier validation.
//!
//! Table names, column names and ORDER BY lists are spliced into SQL text, so
//! every one of them is checked against a fixed pattern before use.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

/// A plain (optionally schema-qualified) SQL identifier.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$";

/// A comma separated list of identifiers.
pub const ORDER_LIST_PATTERN: &str = r"^\s*[A-Za-z_][A-Za-z0-9_.$]*(\s*,\s*[A-Za-z_][A-Za-z0-9_.$]*)*\s*$";

/// Convert a camelCase property name to snake_case.
///
/// An upper-case letter opens a new word when it follows a lower-case letter,
/// or when it is followed by a lower-case letter (so a run of capitals such as
/// `HTTP` in `getHTTPResponse` stays one word).
///
/// ```
/// use sqlmapper_core::naming::camel_to_snake;
///
/// assert_eq!(camel_to_snake("userName"), "user_name");
/// assert_eq!(camel_to_snake("XMLHttpRequest"), "xml_http_request");
/// assert_eq!(camel_to_snake("userID"), "user_id");
/// ```
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && (prev_lower || next_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Compiled patterns, cached for the lifetime of the process.
struct RegexCache {
    cache: RwLock<HashMap<&'static str, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &'static str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern, regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

fn matches(value: &str, pattern: &'static str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Invalid identifier pattern, treating as non-match");
            false
        }
    }
}

/// True if `name` can be spliced into SQL as a table or column name.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    matches(name, IDENTIFIER_PATTERN)
}

/// True if `clause` is a comma separated list of column names.
#[must_use]
pub fn is_valid_order_list(clause: &str) -> bool {
    matches(clause, ORDER_LIST_PATTERN)
}
