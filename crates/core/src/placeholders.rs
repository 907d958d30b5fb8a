//! `{{Namespace.field}}` token handling in template bodies.
//!
//! Substitution inserts values as plain text. Tokens that cannot be filled stay in the output
//! exactly as written, so the structural validator reports them as unresolved placeholders.

use crate::variables::{PlaceholderKey, ResolvedVariables};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("Invalid regex pattern for placeholder token")
});

/// Result of [`substitute_placeholders`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Substitution {
    /// The body with every available token replaced.
    pub text: String,
    /// Known keys with no data for this case, in order of first appearance.
    pub unavailable: Vec<String>,
    /// Tokens that are malformed or not in the catalog, in order of first appearance.
    pub unknown: Vec<String>,
}

impl Substitution {
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty() && self.unknown.is_empty()
    }
}

/// Lists the distinct tokens in a body, trimmed, in order of first appearance.
pub fn extract_placeholders(body: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in TOKEN.captures_iter(body) {
        let key = &caps[1];
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_owned());
        }
    }
    keys
}

/// Replaces tokens with resolved values.
pub fn substitute_placeholders(body: &str, variables: &ResolvedVariables) -> Substitution {
    let mut unavailable = Vec::new();
    let mut unknown = Vec::new();

    let text = TOKEN.replace_all(body, |caps: &Captures<'_>| {
        let raw = &caps[1];
        match PlaceholderKey::parse(raw) {
            Ok(key) => match variables.lookup(&key).as_deref() {
                Some(value) => value.to_owned(),
                None => {
                    push_distinct(&mut unavailable, key.to_string());
                    caps[0].to_owned()
                }
            },
            Err(e) => {
                tracing::debug!("leaving placeholder untouched: {}", e);
                push_distinct(&mut unknown, raw.to_owned());
                caps[0].to_owned()
            }
        }
    });

    Substitution {
        text: text.into_owned(),
        unavailable,
        unknown,
    }
}

fn push_distinct(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}
