//! `${name}` variable substitution over configuration trees.

use serde_yaml::Value;
use std::collections::BTreeMap;

/// Replaces every `${name}` token in `input` with the matching variable's
/// value. The input is scanned left to right exactly once; replacement
/// text goes straight to the output buffer and is never re-scanned for
/// further tokens, so there is no recursive expansion. Tokens naming an
/// unknown variable are kept literally.
pub fn substitute_str(input: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start + 2..].find('}') else {
            break;
        };
        let token_end = start + 2 + end + 1;
        let name = &rest[start + 2..token_end - 1];
        match variables.get(name) {
            Some(replacement) => {
                out.push_str(&rest[..start]);
                out.push_str(replacement);
            }
            None => out.push_str(&rest[..token_end]),
        }
        rest = &rest[token_end..];
    }

    out.push_str(rest);
    out
}

/// Recursively substitutes variables through an arbitrarily nested value.
///
/// Strings get token replacement, mappings and sequences recurse (keys and
/// element order unchanged), every other scalar is returned as-is. The
/// input is never mutated; a fresh value is produced.
pub fn substitute(value: &Value, variables: &BTreeMap<String, String>) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_str(s, variables)),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, variables)))
                .collect(),
        ),
        Value::Sequence(seq) => {
            Value::Sequence(seq.iter().map(|v| substitute(v, variables)).collect())
        }
        other => other.clone(),
    }
}
