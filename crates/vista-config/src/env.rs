//! `{{env.NAME}}` placeholder substitution
//!
//! Only provider connection settings are resolved; queries are left alone so
//! that literal braces in SQL never collide with the placeholder syntax.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

static ENV_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{env\.([A-Za-z_][A-Za-z0-9_]*)\}\}").unwrap());

/// Replace every placeholder in `value` using `lookup`.
///
/// Returns the sorted, de-duplicated names of unresolved variables on failure.
pub fn resolve_with<F>(value: &str, lookup: F) -> Result<String, Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if !ENV_PATTERN.is_match(value) {
        return Ok(value.to_string());
    }

    let mut missing = BTreeSet::new();
    let resolved = ENV_PATTERN.replace_all(value, |caps: &Captures<'_>| {
        let name = &caps[1];
        match lookup(name) {
            Some(found) => found,
            None => {
                missing.insert(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(resolved.into_owned())
    } else {
        Err(missing.into_iter().collect())
    }
}

/// Replace every placeholder in `value` from the process environment
pub fn resolve_env(value: &str) -> Result<String, Vec<String>> {
    resolve_with(value, |name| std::env::var(name).ok())
}
