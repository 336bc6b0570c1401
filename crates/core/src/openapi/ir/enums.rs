//! Enum Registry: extracts literal-valued schema nodes into named
//! `const enum` declarations.
//!
//! One registry lives for exactly one document compilation. It owns the set
//! of names already taken (seeded with the reserved top-level declaration
//! names) and the declarations registered so far. A name, once registered,
//! keeps its content for the rest of the run; compiling the same content
//! under the same base name again reuses the existing declaration.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::trace;

use super::types::{
    ENUM_EMPTY_MEMBER, ENUM_NUMBER_PREFIX, ENUM_VALUE_PREFIX, EnumDecl, EnumMember,
    RESERVED_NAMES,
};
use super::utils::{camel_case_from_hint, format_number, is_ident, quote_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    String,
    Number,
}

/// Per-document naming authority for extracted enums.
#[derive(Debug)]
pub struct EnumRegistry {
    enums: BTreeMap<String, EnumDecl>,
    used: HashSet<String>,
}

impl Default for EnumRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumRegistry {
    /// Empty registry with the reserved names already taken.
    pub fn new() -> Self {
        Self {
            enums: BTreeMap::new(),
            used: RESERVED_NAMES.iter().map(|name| (*name).to_string()).collect(),
        }
    }

    /// Register `values` as an enum named after `hint` and return the type
    /// text that refers to it, `(Name | null)` when `nullable`.
    ///
    /// Returns `None` when the values are empty, of mixed kind, or not all
    /// strings or numbers; the caller then renders an inline literal union.
    pub fn emit_enum(&mut self, hint: &str, values: &[Value], nullable: bool) -> Option<String> {
        let members = enum_members(values)?;
        let name = self.register(enum_base_name(hint, values), members);
        Some(if nullable {
            format!("({name} | null)")
        } else {
            name
        })
    }

    fn register(&mut self, base: String, members: Vec<EnumMember>) -> String {
        let mut candidate = base.clone();
        let mut suffix = 2;
        loop {
            let taken = match self.enums.get(&candidate) {
                Some(existing) if existing.members == members => return candidate,
                Some(_) => true,
                None => self.used.contains(&candidate),
            };
            if !taken {
                if candidate != base {
                    trace!(base = %base, name = %candidate, "Enum name taken, using suffixed name.");
                }
                trace!(name = %candidate, members = members.len(), "Registered enum.");
                self.used.insert(candidate.clone());
                self.enums.insert(
                    candidate.clone(),
                    EnumDecl {
                        name: candidate.clone(),
                        members,
                    },
                );
                return candidate;
            }
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
    }

    /// Declaration registered under `name`.
    pub fn get(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.enums.len()
    }

    /// No declaration registered yet.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Registered declarations keyed by name.
    pub fn into_declarations(self) -> BTreeMap<String, EnumDecl> {
        self.enums
    }
}

/// Members for a homogeneous list of string or number literals.
fn enum_members(values: &[Value]) -> Option<Vec<EnumMember>> {
    if values.is_empty() {
        return None;
    }
    let mut kind = None;
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut members = Vec::with_capacity(values.len());
    for value in values {
        let (value_kind, literal, name) = match value {
            Value::String(s) => (LiteralKind::String, quote_string(s), member_name_from_string(s)),
            Value::Number(n) => {
                let text = format_number(n);
                let name = member_name_from_number(&text);
                (LiteralKind::Number, text, name)
            }
            _ => return None,
        };
        match kind {
            None => kind = Some(value_kind),
            Some(k) if k != value_kind => return None,
            Some(_) => {}
        }

        let mut name = if is_ident(&name) {
            name
        } else {
            ENUM_VALUE_PREFIX.to_string()
        };
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            name = format!("{name}_{count}");
        }
        members.push(EnumMember {
            name,
            value: literal,
        });
    }
    Some(members)
}

fn member_name_from_string(s: &str) -> String {
    if s.is_empty() {
        return ENUM_EMPTY_MEMBER.to_string();
    }
    let mut out = String::with_capacity(s.len() + 1);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_alphabetic() {
            out.push(c.to_ascii_uppercase());
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

fn member_name_from_number(text: &str) -> String {
    format!(
        "{ENUM_NUMBER_PREFIX}{}",
        text.replace('-', "NEG_").replace('.', "_")
    )
}

/// Base declaration name: the hint in PascalCase, a value-derived suffix for
/// single-valued enums, then `Enum`.
fn enum_base_name(hint: &str, values: &[Value]) -> String {
    let mut base = camel_case_from_hint(hint);
    if base.is_empty() {
        base.push_str("Enum");
    }
    if let Some(suffix) = enum_value_suffix(values) {
        base.push_str(&suffix);
    }
    if !base.ends_with("Enum") {
        base.push_str("Enum");
    }
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, '_');
    }
    base
}

fn enum_value_suffix(values: &[Value]) -> Option<String> {
    match values {
        [Value::String(s)] => Some(camel_case_from_hint(s)),
        [Value::Number(n)] => Some(format!(
            "{ENUM_VALUE_PREFIX}{}",
            format_number(n).replace('.', "_").replace('-', "Neg")
        )),
        _ => None,
    }
}
