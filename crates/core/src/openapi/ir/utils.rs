//! Common utilities for TypeScript declaration generation.
//!
//! Identifier checks, string quoting, naming-hint handling and the small
//! union helpers shared by the schema compiler, the IR builder and the emitter.

use std::collections::{HashMap, HashSet};

use serde_json::{Number, Value};

use super::types::{TS_NULL, TS_STRING, TS_UNKNOWN};

/// Check if an identifier needs bracket notation (or quoting) for property/key access.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with an ASCII letter, underscore, or dollar sign
/// - Contains characters other than ASCII alphanumerics, underscore, or dollar sign
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// True when `name` can be written bare as a TypeScript identifier.
pub fn is_ident(name: &str) -> bool {
    !needs_bracket_notation(name)
}

/// Escape a string for use inside a double-quoted TypeScript string literal.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

/// Render `s` as a double-quoted string literal.
pub fn quote_string(s: &str) -> String {
    format!("\"{}\"", escape_js_string(s))
}

/// Quote a string if needed for use as a property key.
/// Returns the name quoted with escaped special characters if needed,
/// or the original name if it's a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        quote_string(name)
    } else {
        name.to_string()
    }
}

/// Replace every character that cannot appear in an identifier with `_`.
/// A leading digit is kept but prefixed with `_`.
pub fn sanitize_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            out.push(c);
        } else if c.is_ascii_digit() {
            if i == 0 {
                out.push('_');
            }
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

/// Join two naming-hint segments with `_`, skipping empty sides.
pub fn join_hint(base: &str, part: &str) -> String {
    match (base.is_empty(), part.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => part.to_string(),
        (false, false) => format!("{base}_{part}"),
    }
}

/// Naming-hint segment for a media type, e.g. `Media_application_json`.
pub fn media_type_suffix(media_type: &str) -> String {
    if media_type.is_empty() {
        String::new()
    } else {
        format!("Media_{}", sanitize_ident(media_type))
    }
}

/// Capitalize the first letter of a word and lowercase the rest.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Build a `PascalCase` name from a naming hint such as `User_OneOf1_role`.
///
/// Structural noise (`allOf`, `item`, `media`, `properties`, numbered
/// combinator tokens, ...) is dropped so the name reflects the data path.
pub fn camel_case_from_hint(hint: &str) -> String {
    split_words(hint)
        .into_iter()
        .map(capitalize_first)
        .collect()
}

fn split_words(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !is_noise_token(token))
        .flat_map(split_camel_token)
        .filter(|word| !is_noise_token(word))
        .collect()
}

/// Split at lower->Upper, digit->non-digit and non-digit->digit boundaries.
fn split_camel_token(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..bytes.len() {
        let (prev, cur) = (bytes[i - 1], bytes[i]);
        let boundary = (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
            || (prev.is_ascii_digit() != cur.is_ascii_digit());
        if boundary {
            out.push(&s[start..i]);
            start = i;
        }
    }
    out.push(&s[start..]);
    out
}

fn is_noise_token(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "allof"
            | "anyof"
            | "oneof"
            | "of"
            | "item"
            | "media"
            | "additional"
            | "properties"
            | "response"
            | "requestbody"
    ) {
        return true;
    }
    let numbered = |prefix: &str| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    };
    numbered("allof") || numbered("anyof") || numbered("oneof") || numbered("of")
}

/// Shortest decimal rendering of a JSON number, never in exponent form.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), |f| format!("{f}"))
    }
}

/// Render a scalar JSON value as a TypeScript literal type.
/// Objects and arrays have no literal form and yield `None`.
pub fn literal_to_ts(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(quote_string(s)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(format_number(n)),
        Value::Null => Some(TS_NULL.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Union of literal texts: `unknown` when empty, bare when single.
pub fn literal_union(values: &[String]) -> String {
    match values {
        [] => TS_UNKNOWN.to_string(),
        [single] => single.clone(),
        many => format!("({})", many.join(" | ")),
    }
}

/// Deduplicating union of value types; any `unknown` member absorbs the rest.
pub fn union_types(items: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items.iter().filter(|it| !it.is_empty()) {
        if item == TS_UNKNOWN {
            return TS_UNKNOWN.to_string();
        }
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    literal_union(&out)
}

/// Deduplicating union of key types; a plain `string` key absorbs the rest.
pub fn union_key_types(items: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items.iter().filter(|it| !it.is_empty()) {
        if item == TS_STRING {
            return TS_STRING.to_string();
        }
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    match out.as_slice() {
        [] => TS_STRING.to_string(),
        [single] => single.clone(),
        many => format!("({})", many.join(" | ")),
    }
}

/// Write `key: value;` at `indent`, re-indenting continuation lines of a
/// multi-line value so nested object types line up with their parent.
pub fn write_field(out: &mut String, indent: &str, key: &str, value: &str) {
    let mut lines = value.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        out.push_str(&format!("{indent}{key}: {first};\n"));
        return;
    }
    out.push_str(&format!("{indent}{key}: {first}\n"));
    let last = rest.len() - 1;
    for (i, line) in rest.iter().enumerate() {
        if i == last {
            out.push_str(&format!("{indent}{line};\n"));
        } else {
            out.push_str(&format!("{indent}{line}\n"));
        }
    }
}

/// Keys of a document map in sorted order.
pub fn sorted_keys<K: Ord, V, S>(map: &HashMap<K, V, S>) -> Vec<&K> {
    let mut keys: Vec<&K> = map.keys().collect();
    keys.sort();
    keys
}
