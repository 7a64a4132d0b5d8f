//! Parameter interpolation into recipe arguments
//!
//! Recipe arguments may reference run parameters as `@name` tokens. A token
//! bound to a string parameter is replaced in place; a token bound to any
//! other JSON value replaces the whole argument. Tokens are matched whole,
//! so `@host` never rewrites part of `@hostname`. Tokens with no matching
//! parameter are left as written.

use recipe_types::{ModuleArgs, Parameters};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("regex for parameter tokens"));

/// Substitute parameters into every argument of a module
pub fn interpolate_args(args: &ModuleArgs, params: &Parameters) -> ModuleArgs {
    args.iter()
        .map(|(key, value)| (key.clone(), interpolate_value(value, params)))
        .collect()
}

/// Substitute parameters into one JSON value, recursing into arrays and
/// objects
pub fn interpolate_value(value: &Value, params: &Parameters) -> Value {
    match value {
        Value::String(text) => interpolate_str(text, params),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, params))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn interpolate_str(text: &str, params: &Parameters) -> Value {
    let whole = TOKEN
        .captures_iter(text)
        .filter_map(|captures| params.get(&captures[1]))
        .find(|param| !param.is_string());
    if let Some(replacement) = whole {
        return replacement.clone();
    }

    let replaced = TOKEN.replace_all(text, |captures: &Captures<'_>| {
        match params.get(&captures[1]) {
            Some(Value::String(replacement)) => replacement.clone(),
            _ => captures[0].to_string(),
        }
    });
    Value::String(replaced.into_owned())
}
