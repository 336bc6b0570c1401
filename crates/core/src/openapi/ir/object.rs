//! Object schema compilation.
//!
//! Declared properties render as an object type literal. Extra-property
//! rules (`patternProperties`, `additionalProperties`), `dependentRequired`
//! constraints and `if`/`then`/`else` conditionals are layered on top as
//! intersections and unions.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::openapi::spec::SchemaNode;

use super::emit::Emit;
use super::schema::SchemaCompiler;
use super::types::{
    Mode, ObjectType, Scope, TS_NEVER, TS_RECORD_NEVER, TS_RECORD_UNKNOWN, TS_STRING, TS_UNKNOWN,
    TsField,
};
use super::utils::{literal_to_ts, literal_union, quote_string, union_key_types, union_types};

/// Compiled `patternProperties` and `additionalProperties` of one object.
#[derive(Debug, Default)]
struct ExtraProps {
    /// Value type of `additionalProperties: true` or a schema.
    additional: Option<String>,
    additional_false: bool,
    pattern_keys: Vec<String>,
    pattern_values: Vec<String>,
}

impl ExtraProps {
    fn render(&self) -> Option<String> {
        let pattern = (!self.pattern_values.is_empty()).then(|| {
            let value = union_types(&self.pattern_values);
            let keys = union_key_types(&self.pattern_keys);
            let ts = if keys == TS_STRING {
                format!("Record<{TS_STRING}, {value}>")
            } else {
                format!("{{ [K in {keys}]?: {value} }}")
            };
            (ts, value)
        });
        match (&self.additional, pattern) {
            (Some(additional), Some((pattern_ts, pattern_value))) => {
                let value = union_types(&[additional.clone(), pattern_value]);
                Some(format!("({pattern_ts} & Record<{TS_STRING}, {value}>)"))
            }
            (Some(additional), None) => Some(format!("Record<{TS_STRING}, {additional}>")),
            (None, Some((pattern_ts, _))) => Some(pattern_ts),
            (None, None) => None,
        }
    }
}

impl SchemaCompiler<'_> {
    /// Compile an object node. `scope` is already one level below the node.
    pub(super) fn compile_object(&mut self, node: SchemaNode<'_>, scope: &Scope) -> String {
        let props = node.properties().filter(|props| !props.is_empty());
        let required: BTreeSet<&str> = node.required().into_iter().collect();
        let constraints = self.dependent_required(node, props, &required, scope);
        let extra = self.extra_props(node, scope);
        let extra_ts = extra.render();

        let Some(props) = props else {
            if !required.is_empty() {
                let base = ObjectType(
                    required
                        .iter()
                        .map(|name| TsField::required(*name, TS_UNKNOWN))
                        .collect(),
                )
                .emit();
                return match extra_ts {
                    Some(extra_ts) => format!("({base} & {extra_ts})"),
                    None => base,
                };
            }
            return match extra_ts {
                Some(extra_ts) => extra_ts,
                None if extra.additional_false => TS_RECORD_NEVER.to_string(),
                None => TS_RECORD_UNKNOWN.to_string(),
            };
        };

        let mut keys: Vec<&String> = props.keys().collect();
        keys.sort();
        let mut fields = Vec::with_capacity(keys.len());
        for key in keys {
            let value = &props[key];
            if !include_property(value, scope.mode) {
                continue;
            }
            let ts = self.compile_value(value, &scope.child(key, 1));
            fields.push(if required.contains(key.as_str()) {
                TsField::required(key.as_str(), ts)
            } else {
                TsField::optional(key.as_str(), ts)
            });
        }

        let mut base = ObjectType(fields).emit();
        if let Some(extra_ts) = extra_ts {
            base = format!("({base} & {extra_ts})");
        }
        if !constraints.is_empty() {
            base = format!("({base} & {})", constraints.join(" & "));
        }

        let conditional = ["if", "then", "else"]
            .iter()
            .any(|keyword| node.get(keyword).is_some());
        if conditional {
            if let Some(ts) = self.compile_conditional(node, props, &base, scope) {
                return ts;
            }
        }
        base
    }

    fn property_ts(
        &mut self,
        props: Option<&Map<String, Value>>,
        name: &str,
        scope: &Scope,
    ) -> String {
        match props.and_then(|props| props.get(name)) {
            Some(value) => self.compile_value(value, &scope.child(name, 1)),
            None => TS_UNKNOWN.to_string(),
        }
    }

    /// One constraint per `dependentRequired` key, sorted by key.
    ///
    /// A key that is always required intersects with its dependents; an
    /// optional key becomes "absent, or present together with every dependent".
    fn dependent_required(
        &mut self,
        node: SchemaNode<'_>,
        props: Option<&Map<String, Value>>,
        required: &BTreeSet<&str>,
        scope: &Scope,
    ) -> Vec<String> {
        let Some(dependencies) = node.dependent_required() else {
            return Vec::new();
        };
        let mut keys: Vec<&String> = dependencies.keys().collect();
        keys.sort();

        let mut out = Vec::new();
        for key in keys {
            let Some(names) = dependencies[key].as_array() else {
                continue;
            };
            let dependents: Vec<TsField> = names
                .iter()
                .filter_map(Value::as_str)
                .map(|name| TsField::required(name, self.property_ts(props, name, scope)))
                .collect();
            if dependents.is_empty() {
                continue;
            }

            let key_ts = self.property_ts(props, key, scope);
            let mut present = vec![TsField::required(key.as_str(), key_ts)];
            present.extend(dependents);
            let present = ObjectType(present).emit();
            if required.contains(key.as_str()) {
                out.push(present);
            } else {
                let absent = ObjectType(vec![TsField::optional(key.as_str(), TS_NEVER)]).emit();
                out.push(format!("({absent} | {present})"));
            }
        }
        out
    }

    fn extra_props(&mut self, node: SchemaNode<'_>, scope: &Scope) -> ExtraProps {
        let mut extra = ExtraProps::default();

        if let Some(patterns) = node.pattern_properties() {
            let mut keys: Vec<&String> = patterns.keys().collect();
            keys.sort();
            for (i, pattern) in keys.into_iter().enumerate() {
                let value = &patterns[pattern];
                if !value.is_object() {
                    continue;
                }
                let hint = format!("Pattern{}", i + 1);
                let ts = self.compile_value(value, &scope.child(&hint, 1));
                extra.pattern_values.push(ts);
                extra.pattern_keys.push(pattern_key_type(pattern));
            }
        }

        match node.additional_properties() {
            Some(Value::Bool(true)) => extra.additional = Some(TS_UNKNOWN.to_string()),
            Some(Value::Bool(false)) => extra.additional_false = true,
            Some(value @ Value::Object(_)) => {
                let ts = self.compile_value(value, &scope.child("AdditionalProperties", 1));
                extra.additional = Some(ts);
            }
            _ => {}
        }
        extra
    }

    /// `if`/`then`/`else` over `base`.
    ///
    /// When `if` pins exactly one property to literal values the result is a
    /// union discriminated on that property; otherwise the branches are
    /// intersected with `base` as an approximation.
    fn compile_conditional(
        &mut self,
        node: SchemaNode<'_>,
        props: &Map<String, Value>,
        base: &str,
        scope: &Scope,
    ) -> Option<String> {
        let if_schema = node.get("if");
        let then_schema = node.get("then");
        let else_schema = node.get("else");

        if let Some((prop, if_values)) = if_schema.and_then(if_property_values) {
            let declared = props.get(&prop).and_then(literal_values).unwrap_or_default();
            let remaining: Vec<String> = declared
                .into_iter()
                .filter(|value| !if_values.contains(value))
                .collect();

            let mut parts = Vec::new();
            if let Some(then_schema) = then_schema {
                let narrowed = narrow(base, &prop, &if_values);
                let then_ts = self.compile_value(then_schema, &scope.child("Then", 1));
                parts.push(format!("({narrowed} & {then_ts})"));
            }
            if else_schema.is_some() || !remaining.is_empty() {
                let mut part = narrow(base, &prop, &remaining);
                if let Some(else_schema) = else_schema {
                    let else_ts = self.compile_value(else_schema, &scope.child("Else", 1));
                    part = format!("({part} & {else_ts})");
                }
                parts.push(part);
            }
            match parts.len() {
                0 => {}
                1 => return parts.pop(),
                _ => return Some(format!("({})", parts.join(" | "))),
            }
        }

        let mut parts = Vec::new();
        if let Some(then_schema) = then_schema {
            parts.push(self.compile_value(then_schema, &scope.child("Then", 1)));
        }
        if let Some(else_schema) = else_schema {
            parts.push(self.compile_value(else_schema, &scope.child("Else", 1)));
        }
        if parts.is_empty() {
            if let Some(if_schema) = if_schema {
                parts.push(self.compile_value(if_schema, &scope.child("If", 1)));
            }
        }
        match parts.as_slice() {
            [] => None,
            [single] => Some(format!("({base} & {single})")),
            many => Some(format!("({base} & ({}))", many.join(" | "))),
        }
    }
}

/// Whether a property survives the projection mode.
fn include_property(value: &Value, mode: Mode) -> bool {
    let Some(node) = SchemaNode::from_value(value) else {
        return true;
    };
    match mode {
        Mode::Default => true,
        Mode::Input => !node.read_only(),
        Mode::Output => !node.write_only(),
    }
}

/// `base` intersected with `{ prop: v1 | v2 }`, or `base` when there are no values.
fn narrow(base: &str, prop: &str, values: &[String]) -> String {
    if values.is_empty() {
        return base.to_string();
    }
    let pinned = ObjectType(vec![TsField::required(prop, literal_union(values))]).emit();
    format!("({base} & {pinned})")
}

/// Literal texts a property schema is restricted to through `const` or `enum`.
fn literal_values(value: &Value) -> Option<Vec<String>> {
    let node = SchemaNode::from_value(value)?;
    if let Some(constant) = node.const_value() {
        return literal_to_ts(constant).map(|ts| vec![ts]);
    }
    let literals: Vec<String> = node.enum_values()?.iter().filter_map(literal_to_ts).collect();
    (!literals.is_empty()).then_some(literals)
}

/// The single property an `if` schema pins, with its literal values.
fn if_property_values(if_schema: &Value) -> Option<(String, Vec<String>)> {
    let props = SchemaNode::from_value(if_schema)?.properties()?;
    if props.len() != 1 {
        return None;
    }
    let (name, value) = props.iter().next()?;
    Some((name.clone(), literal_values(value)?))
}

/// Key type a `patternProperties` regex admits.
///
/// Fully anchored plain text becomes an exact key, an anchored prefix
/// (optionally followed by `.*` or `.+`) a template literal key. Anything
/// using other regex syntax falls back to `string`, quantifier braces and
/// inner anchors included.
pub fn pattern_key_type(pattern: &str) -> String {
    if pattern == "^[0-9]+$" || pattern == "^\\d+$" {
        return "`${number}`".to_string();
    }
    let Some(rest) = pattern.strip_prefix('^') else {
        return TS_STRING.to_string();
    };
    let (rest, anchored) = match rest.strip_suffix('$') {
        Some(inner) => (inner, true),
        None => (rest, false),
    };
    let (text, glob) = match rest.strip_suffix(".*").or_else(|| rest.strip_suffix(".+")) {
        Some(inner) => (inner, true),
        None => (rest, false),
    };
    if text.is_empty() || text.contains(|c: char| "`[](){}|+*?.\\^$".contains(c)) {
        return TS_STRING.to_string();
    }
    if anchored && !glob {
        quote_string(text)
    } else {
        format!("`{text}${{string}}`")
    }
}
