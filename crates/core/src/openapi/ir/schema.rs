//! Schema compilation: one JSON Schema node to one TypeScript type text.
//!
//! Node interpretation, first match wins:
//! - literal extraction (`const`, `enum`) through the [`EnumRegistry`]
//! - combinators (`oneOf`, `anyOf`, `allOf`)
//! - the declared `type`, with untyped structural nodes inferred as object or array
//!
//! Object nodes are handled in `object.rs`.

use serde_json::Value;
use tracing::trace;

use crate::error::Section;
use crate::openapi::spec::{Document, RefOr, Schema, SchemaNode};

use super::enums::EnumRegistry;
use super::resolve::{component_name, component_ref};
use super::types::{MAX_SCHEMA_DEPTH, Mode, Scope, TS_NULL, TS_UNKNOWN};
use super::utils::{literal_to_ts, union_types};

/// Recursive schema compiler bound to one document and its enum registry.
#[derive(Debug)]
pub struct SchemaCompiler<'a> {
    pub(super) doc: &'a Document,
    pub(super) enums: &'a mut EnumRegistry,
}

impl<'a> SchemaCompiler<'a> {
    /// Compiler resolving refs against `doc` and registering enums in `enums`.
    pub fn new(doc: &'a Document, enums: &'a mut EnumRegistry) -> Self {
        Self { doc, enums }
    }

    /// Compile a schema slot that may be inline or a `$ref`.
    pub fn compile(&mut self, schema: &RefOr<Schema>, scope: &Scope) -> String {
        match schema {
            RefOr::Reference(r) => self.compile_reference(&r.path, scope),
            RefOr::Inline(schema) => {
                if scope.exhausted() {
                    trace!(hint = %scope.hint, depth = scope.depth, "Schema depth exhausted.");
                    return TS_UNKNOWN.to_string();
                }
                match schema.node() {
                    Some(node) => match node.reference() {
                        Some(reference) => self.compile_reference(reference, scope),
                        None => self.compile_node(node, scope),
                    },
                    None => TS_UNKNOWN.to_string(),
                }
            }
        }
    }

    /// Compile an optional schema slot; an absent schema is `unknown`.
    pub fn compile_opt(&mut self, schema: Option<&RefOr<Schema>>, scope: &Scope) -> String {
        schema.map_or_else(|| TS_UNKNOWN.to_string(), |s| self.compile(s, scope))
    }

    /// Compile a `$ref` into `#/components/schemas`.
    ///
    /// Default mode keeps the reference lazy. Input and output modes inline
    /// the target so property filtering reaches into referenced schemas.
    pub fn compile_reference(&mut self, reference: &str, scope: &Scope) -> String {
        let Some(name) = component_name(reference, Section::Schemas) else {
            return TS_UNKNOWN.to_string();
        };
        if scope.mode == Mode::Default {
            return component_ref(Section::Schemas, name);
        }
        let doc = self.doc;
        let Some(target) = doc
            .components
            .as_ref()
            .and_then(|components| components.schemas.get(name))
        else {
            return component_ref(Section::Schemas, name);
        };
        if scope.depth + 1 > MAX_SCHEMA_DEPTH {
            trace!(reference, depth = scope.depth, "Schema depth exhausted at reference.");
            return TS_UNKNOWN.to_string();
        }
        self.compile(target, &scope.renamed(name, 1))
    }

    /// Compile a nested schema value (property, item, branch), one level down.
    pub(super) fn compile_value(&mut self, value: &Value, scope: &Scope) -> String {
        if value.is_null() || scope.exhausted() {
            return TS_UNKNOWN.to_string();
        }
        let Some(node) = SchemaNode::from_value(value) else {
            return TS_UNKNOWN.to_string();
        };
        let inner = scope.deeper(1);
        if let Some(reference) = node.reference() {
            return self.compile_reference(reference, &inner);
        }
        if inner.exhausted() {
            trace!(hint = %scope.hint, depth = inner.depth, "Schema depth exhausted.");
            return TS_UNKNOWN.to_string();
        }
        self.compile_node(node, &inner)
    }

    pub(super) fn compile_node(&mut self, node: SchemaNode<'_>, scope: &Scope) -> String {
        if let Some(ts) = self.compile_literal(node, scope) {
            return ts;
        }
        if let Some(ts) = self.compile_combinator(node, scope) {
            return ts;
        }
        self.compile_typed(node, scope)
    }

    fn compile_literal(&mut self, node: SchemaNode<'_>, scope: &Scope) -> Option<String> {
        let nullable = node.nullable();
        if let Some(value) = node.const_value() {
            let single = std::slice::from_ref(value);
            if let Some(ts) = self.enums.emit_enum(&scope.hint, single, nullable) {
                return Some(ts);
            }
            if let Some(ts) = literal_to_ts(value) {
                return Some(apply_nullable(ts, node));
            }
        }
        let values = node.enum_values()?;
        if let Some(ts) = self.enums.emit_enum(&scope.hint, values, nullable) {
            return Some(ts);
        }
        let literals: Option<Vec<String>> = values.iter().map(literal_to_ts).collect();
        Some(match literals {
            Some(parts) => apply_nullable(format!("({})", parts.join(" | ")), node),
            None => apply_nullable(TS_UNKNOWN.to_string(), node),
        })
    }

    fn compile_combinator(&mut self, node: SchemaNode<'_>, scope: &Scope) -> Option<String> {
        let combinators = [
            ("oneOf", "OneOf", " | "),
            ("anyOf", "AnyOf", " | "),
            ("allOf", "AllOf", " & "),
        ];
        for (keyword, prefix, joiner) in combinators {
            let Some(branches) = node.array(keyword) else {
                continue;
            };
            let parts: Vec<String> = branches
                .iter()
                .enumerate()
                .map(|(i, branch)| {
                    let part = format!("{prefix}{}", i + 1);
                    self.compile_value(branch, &scope.child(&part, 1))
                })
                .collect();
            return Some(apply_nullable(format!("({})", parts.join(joiner)), node));
        }
        None
    }

    fn compile_typed(&mut self, node: SchemaNode<'_>, scope: &Scope) -> String {
        match node.types().as_slice() {
            [] => self.compile_untyped(node, scope),
            [single] => {
                let ts = self.compile_type_name(single, node, scope);
                if *single == TS_NULL {
                    ts
                } else {
                    apply_nullable(ts, node)
                }
            }
            many => {
                let parts: Vec<String> = many
                    .iter()
                    .map(|name| self.compile_type_name(name, node, scope))
                    .collect();
                let ts = union_types(&parts);
                if many.contains(&TS_NULL) {
                    ts
                } else {
                    apply_nullable(ts, node)
                }
            }
        }
    }

    /// Type text for one declared type name, before nullable wrapping.
    fn compile_type_name(&mut self, name: &str, node: SchemaNode<'_>, scope: &Scope) -> String {
        match name {
            "string" => "string".to_string(),
            "number" | "integer" => "number".to_string(),
            "boolean" => "boolean".to_string(),
            "null" => TS_NULL.to_string(),
            "array" => self.compile_array(node, scope),
            "object" => self.compile_object(node, &scope.deeper(1)),
            _ => TS_UNKNOWN.to_string(),
        }
    }

    fn compile_untyped(&mut self, node: SchemaNode<'_>, scope: &Scope) -> String {
        let has_properties = node.properties().is_some_and(|props| !props.is_empty());
        let ts = if has_properties
            || !node.required().is_empty()
            || node.pattern_properties().is_some()
            || node.additional_properties().is_some()
        {
            self.compile_object(node, &scope.deeper(1))
        } else if node.items().is_some() {
            self.compile_array(node, scope)
        } else {
            TS_UNKNOWN.to_string()
        };
        apply_nullable(ts, node)
    }

    fn compile_array(&mut self, node: SchemaNode<'_>, scope: &Scope) -> String {
        match node.items() {
            Some(items) => format!("{}[]", self.compile_value(items, &scope.child("Item", 1))),
            None => format!("{TS_UNKNOWN}[]"),
        }
    }
}

/// Union `ts` with `null` when the node is `nullable: true`, unless it already is `null`.
pub fn apply_nullable(ts: String, node: SchemaNode<'_>) -> String {
    if node.nullable() && ts != TS_NULL {
        format!("({ts} | {TS_NULL})")
    } else {
        ts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        Document::from_json(
            r##"{
              "openapi": "3.1.0",
              "components": {
                "schemas": {
                  "Node": {
                    "type": "object",
                    "properties": {
                      "id": { "type": "string", "readOnly": true },
                      "next": { "$ref": "#/components/schemas/Node" }
                    }
                  },
                  "Alias": { "$ref": "#/components/schemas/Node" }
                }
              }
            }"##,
        )
        .unwrap()
    }

    fn compile(doc: &Document, value: Value, mode: Mode, hint: &str) -> (String, EnumRegistry) {
        let mut enums = EnumRegistry::new();
        let schema = RefOr::Inline(Schema(value));
        let ts = SchemaCompiler::new(doc, &mut enums).compile(&schema, &Scope::new(mode, hint));
        (ts, enums)
    }

    fn ts(value: Value) -> String {
        compile(&Document::default(), value, Mode::Default, "").0
    }

    #[test]
    fn test_primitive_types() {
        assert_eq!(ts(json!({"type": "string"})), "string");
        assert_eq!(ts(json!({"type": "integer"})), "number");
        assert_eq!(ts(json!({"type": "number", "nullable": true})), "(number | null)");
        assert_eq!(ts(json!({"type": "boolean"})), "boolean");
        assert_eq!(ts(json!({"type": "file"})), "unknown");
        assert_eq!(ts(json!({})), "unknown");
        assert_eq!(ts(json!(true)), "unknown");
    }

    #[test]
    fn test_nullable_null_is_not_wrapped_twice() {
        assert_eq!(ts(json!({"type": "null", "nullable": true})), "null");
        assert_eq!(ts(json!({"const": null, "nullable": true})), "null");
    }

    #[test]
    fn test_type_arrays() {
        assert_eq!(ts(json!({"type": ["string", "null"]})), "(string | null)");
        assert_eq!(
            ts(json!({"type": ["string", "integer"], "nullable": true})),
            "((string | number) | null)"
        );
        assert_eq!(ts(json!({"type": ["string", "whatever"]})), "unknown");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(ts(json!({"type": "array", "items": {"type": "string"}})), "string[]");
        assert_eq!(ts(json!({"type": "array"})), "unknown[]");
        assert_eq!(ts(json!({"items": {"type": "number"}})), "number[]");
        assert_eq!(
            ts(json!({"type": "array", "items": {"type": "string"}, "nullable": true})),
            "(string[] | null)"
        );
    }

    #[test]
    fn test_single_branch_combinator_stays_parenthesized() {
        assert_eq!(ts(json!({"oneOf": [{"type": "string"}]})), "(string)");
        assert_eq!(
            ts(json!({"anyOf": [{"type": "string"}, {"type": "number"}], "nullable": true})),
            "((string | number) | null)"
        );
        assert_eq!(
            ts(json!({"allOf": [{"$ref": "#/components/schemas/A"}, {"$ref": "#/components/schemas/B"}]})),
            "(Components[\"schemas\"][\"A\"] & Components[\"schemas\"][\"B\"])"
        );
    }

    #[test]
    fn test_combinator_branches_name_enums_by_data_path() {
        let (out, enums) = compile(
            &Document::default(),
            json!({"oneOf": [{"enum": ["a", "b"]}, {"type": "string"}]}),
            Mode::Default,
            "Shape",
        );
        assert_eq!(out, "(ShapeEnum | string)");
        assert!(enums.get("ShapeEnum").is_some());
    }

    #[test]
    fn test_literal_fallbacks() {
        assert_eq!(ts(json!({"const": true})), "true");
        assert_eq!(ts(json!({"enum": ["a", 1]})), "(\"a\" | 1)");
        assert_eq!(ts(json!({"enum": [true], "nullable": true})), "((true) | null)");
        assert_eq!(ts(json!({"enum": [{"a": 1}]})), "unknown");
    }

    #[test]
    fn test_const_registers_single_value_enum() {
        let (out, enums) = compile(
            &Document::default(),
            json!({"const": "circle"}),
            Mode::Default,
            "Shape_kind",
        );
        assert_eq!(out, "ShapeKindCircleEnum");
        assert_eq!(enums.len(), 1);
    }

    #[test]
    fn test_reference_is_lazy_in_default_mode() {
        let doc = doc();
        let schema = RefOr::Reference(crate::openapi::spec::Reference {
            path: "#/components/schemas/Node".to_string(),
        });
        let mut enums = EnumRegistry::new();
        let out =
            SchemaCompiler::new(&doc, &mut enums).compile(&schema, &Scope::new(Mode::Default, ""));
        assert_eq!(out, "Components[\"schemas\"][\"Node\"]");
    }

    #[test]
    fn test_unsupported_schema_reference_is_unknown() {
        assert_eq!(ts(json!({"items": {"$ref": "other.json#/Foo"}})), "unknown[]");
    }

    #[test]
    fn test_projection_inlines_and_terminates_on_cycles() {
        let (out, _) = compile(
            &doc(),
            json!({"$ref": "#/components/schemas/Node"}),
            Mode::Input,
            "",
        );
        assert!(!out.contains("id"), "readOnly property leaked into input: {out}");
        assert!(out.contains("next?:"));
        assert!(out.contains("unknown"), "recursion should bottom out: {out}");
        assert!(!out.contains("Components["), "projection must inline: {out}");
    }

    #[test]
    fn test_output_projection_keeps_read_only() {
        let (out, _) = compile(
            &doc(),
            json!({"$ref": "#/components/schemas/Alias"}),
            Mode::Output,
            "",
        );
        assert!(out.starts_with("{\n  id?: string;\n"), "unexpected output: {out}");
    }

    #[test]
    fn test_projection_keeps_missing_targets_lazy() {
        let (out, _) = compile(
            &doc(),
            json!({"type": "array", "items": {"$ref": "#/components/schemas/Missing"}}),
            Mode::Output,
            "",
        );
        assert_eq!(out, "Components[\"schemas\"][\"Missing\"][]");
    }

    #[test]
    fn test_apply_nullable() {
        let value = json!({"nullable": true});
        let node = SchemaNode::from_value(&value).unwrap();
        assert_eq!(apply_nullable("string".to_string(), node), "(string | null)");
        assert_eq!(apply_nullable("null".to_string(), node), "null");
    }
}
