//! Key-case rewriting between the backend's snake_case field names and the
//! frontend's camelCase ones.
//!
//! # Design
//! Both directions walk a `serde_json::Value` by structural recursion over its
//! three shapes: scalars (including `null`) pass through, arrays are mapped
//! element by element, and objects are rebuilt with every key rewritten and
//! every value transformed in turn.
//!
//! Key rewriting applies two literal regex rules and is not a round trip:
//! - snake → camel: each `_` followed by an ASCII lowercase letter becomes the
//!   uppercase letter. `"a__b"` becomes `"a_B"`.
//! - camel → snake: each ASCII uppercase letter becomes `_` plus the letter,
//!   then the whole key is lowercased. `"userID"` becomes `"user_i_d"` and
//!   `"ID"` becomes `"_i_d"`.
//!
//! When two keys of one object rewrite to the same key, the later one wins.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static SNAKE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([a-z])").expect("Failed to compile regex"));

static UPPERCASE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])").expect("Failed to compile regex"));

/// Rewrite every object key in `value` from snake_case to camelCase.
pub fn keys_to_camel_case(value: Value) -> Value {
    transform_keys(value, field_name_to_camel_case)
}

/// Rewrite every object key in `value` from camelCase to snake_case.
pub fn keys_to_snake_case(value: Value) -> Value {
    transform_keys(value, field_name_to_snake_case)
}

pub fn field_name_to_camel_case(key: &str) -> String {
    SNAKE_SEGMENT
        .replace_all(key, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

pub fn field_name_to_snake_case(key: &str) -> String {
    UPPERCASE_LETTER.replace_all(key, "_${1}").to_lowercase()
}

fn transform_keys(value: Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_keys(item, rename))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (rename(&key), transform_keys(item, rename)))
                .collect(),
        ),
        scalar => scalar,
    }
}
