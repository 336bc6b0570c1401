//! TypeScript declaration emission via the Emit trait.
//!
//! Every IR node that ends up in the output file implements `Emit`. Rendering
//! is purely mechanical: all ordering decisions are made here from sorted
//! maps so the same IR always produces byte-identical text.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::openapi::spec::{SecurityRequirement, Server, ServerVariable};

use super::types::{
    ApiIr, EnumDecl, ObjectType, OperationIr, ParamIr, PathItemIr, TS_EMPTY_OBJECT, TsField,
};
use super::utils::{literal_union, quote_if_needed, quote_string, sorted_keys, write_field};

/// Name recorded in the banner of every generated file.
pub const GENERATOR_NAME: &str = "openapi-tsgen";

/// Trait for emitting TypeScript text from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Object Types
// =============================================================================

impl Emit for ObjectType {
    fn emit(&self) -> String {
        if self.0.is_empty() {
            return TS_EMPTY_OBJECT.to_string();
        }
        let mut fields: Vec<&TsField> = self.0.iter().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::from("{\n");
        for field in fields {
            let key = if field.optional {
                format!("{}?", quote_if_needed(&field.name))
            } else {
                quote_if_needed(&field.name)
            };
            write_field(&mut out, "  ", &key, &field.ts);
        }
        out.push('}');
        out
    }
}

// =============================================================================
// Enums
// =============================================================================

impl Emit for EnumDecl {
    fn emit(&self) -> String {
        let mut out = format!("export const enum {} {{\n", self.name);
        for member in &self.members {
            out.push_str(&format!("  {} = {},\n", member.name, member.value));
        }
        out.push_str("}\n\n");
        out
    }
}

// =============================================================================
// Banner
// =============================================================================

/// Provenance comment at the top of every generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Appended to the generator name as `@version` when present.
    pub generator_version: Option<String>,
    /// Declared OpenAPI version; the line is left out when absent.
    pub openapi_version: Option<String>,
    /// Rendered as RFC 3339 UTC with second precision.
    pub generated_at: DateTime<Utc>,
}

impl Banner {
    /// Banner without version lines.
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generator_version: None,
            openapi_version: None,
            generated_at,
        }
    }

    /// Set the generator version.
    pub fn with_generator_version(mut self, version: impl Into<String>) -> Self {
        self.generator_version = Some(version.into());
        self
    }

    /// Set the OpenAPI version, overriding the document's own.
    pub fn with_openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = Some(version.into());
        self
    }

    /// `openapi-tsgen` or `openapi-tsgen@<version>`.
    pub fn generator(&self) -> String {
        match self.generator_version.as_deref() {
            Some(version) if !version.is_empty() => format!("{GENERATOR_NAME}@{version}"),
            _ => GENERATOR_NAME.to_string(),
        }
    }
}

impl Emit for Banner {
    fn emit(&self) -> String {
        let mut out = String::from("/*\n");
        out.push_str(" * @Warning: THIS FILE IS AUTO-GENERATED - DO NOT EDIT\n");
        out.push_str(" *\n");
        out.push_str(&format!(" * Generator: {}\n", self.generator()));
        if let Some(version) = self.openapi_version.as_deref().filter(|v| !v.is_empty()) {
            out.push_str(&format!(" * OpenAPI version: {version}\n"));
        }
        out.push_str(&format!(
            " * Generated at: {}\n",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out.push_str(" */\n\n");
        out
    }
}

// =============================================================================
// Servers and Security
// =============================================================================

/// `X[]` for a single server, `(X | Y)[]` for several.
pub fn servers_to_ts(servers: &[Server]) -> String {
    list_type(servers.iter().map(server_to_ts).collect())
}

fn server_to_ts(server: &Server) -> String {
    let mut fields = vec![TsField::required("url", quote_string(&server.url))];
    if !server.description.is_empty() {
        fields.push(TsField::required(
            "description",
            quote_string(&server.description),
        ));
    }
    if !server.variables.is_empty() {
        let variables = sorted_keys(&server.variables)
            .into_iter()
            .map(|name| {
                TsField::required(name.as_str(), server_variable_to_ts(&server.variables[name]))
            })
            .collect();
        fields.push(TsField::required("variables", ObjectType(variables).emit()));
    }
    ObjectType(fields).emit()
}

fn server_variable_to_ts(variable: &ServerVariable) -> String {
    let mut fields = vec![TsField::required(
        "default",
        quote_string(variable.default.as_deref().unwrap_or_default()),
    )];
    if !variable.description.is_empty() {
        fields.push(TsField::required(
            "description",
            quote_string(&variable.description),
        ));
    }
    if !variable.values.is_empty() {
        fields.push(TsField::required("enum", quoted_list(&variable.values)));
    }
    ObjectType(fields).emit()
}

/// Alternatives of an operation's security requirements.
pub fn security_requirements_to_ts(requirements: &[SecurityRequirement]) -> String {
    list_type(
        requirements
            .iter()
            .map(security_requirement_to_ts)
            .collect(),
    )
}

fn security_requirement_to_ts(requirement: &SecurityRequirement) -> String {
    if requirement.is_empty() {
        return TS_EMPTY_OBJECT.to_string();
    }
    let fields = sorted_keys(requirement)
        .into_iter()
        .map(|scheme| {
            let scopes = &requirement[scheme];
            let ts = if scopes.is_empty() {
                "string[]".to_string()
            } else {
                quoted_list(scopes)
            };
            TsField::required(scheme.as_str(), ts)
        })
        .collect();
    ObjectType(fields).emit()
}

fn quoted_list(values: &[String]) -> String {
    let literals: Vec<String> = values.iter().map(|v| quote_string(v)).collect();
    format!("{}[]", literal_union(&literals))
}

fn list_type(parts: Vec<String>) -> String {
    match parts.as_slice() {
        [] => "[]".to_string(),
        [single] => format!("{single}[]"),
        many => format!("({})[]", many.join(" | ")),
    }
}

// =============================================================================
// Path Items
// =============================================================================

fn status_code(code: &str) -> Option<u64> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// Numeric codes ascending, then everything else lexicographically.
fn compare_status(a: &str, b: &str) -> Ordering {
    match (status_code(a), status_code(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn status_key(code: &str) -> String {
    if status_code(code).is_some() || code == "default" {
        code.to_string()
    } else {
        quote_string(code)
    }
}

fn write_params(out: &mut String, label: &str, params: &BTreeMap<String, ParamIr>) {
    if params.is_empty() {
        return;
    }
    out.push_str(&format!("      {label}: {{\n"));
    for (name, param) in params {
        let key = if param.required {
            quote_if_needed(name)
        } else {
            format!("{}?", quote_if_needed(name))
        };
        write_field(out, "        ", &key, &param.ts);
    }
    out.push_str("      };\n");
}

fn write_operation(out: &mut String, op: &OperationIr) {
    write_params(out, "params", &op.path_params);
    write_params(out, "query", &op.query_params);
    write_params(out, "headers", &op.header_params);
    write_params(out, "cookies", &op.cookie_params);
    if !op.security.is_empty() {
        write_field(
            out,
            "      ",
            "security",
            &security_requirements_to_ts(&op.security),
        );
    }
    if !op.servers.is_empty() {
        write_field(out, "      ", "servers", &servers_to_ts(&op.servers));
    }
    if let Some(body) = &op.request_body {
        write_field(out, "      ", "requestBody", body);
    }

    out.push_str("      responses: {\n");
    let mut codes: Vec<&String> = op.responses.keys().collect();
    codes.sort_by(|a, b| compare_status(a, b));
    for code in codes {
        write_field(out, "        ", &status_key(code), &op.responses[code]);
    }
    out.push_str("      };\n");
}

fn write_path_items(out: &mut String, label: &str, items: &BTreeMap<String, PathItemIr>) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("export type {label} = {{\n"));
    for (key, item) in items {
        out.push_str(&format!("  {}: {{\n", quote_string(key)));
        for (method, op) in &item.ops {
            out.push_str(&format!("    {method}: {{\n"));
            write_operation(out, op);
            out.push_str("    };\n");
        }
        out.push_str("  };\n");
    }
    out.push_str("};\n\n");
}

// =============================================================================
// Declaration File
// =============================================================================

/// The complete generated file: banner, enums, `Servers`, `Components`,
/// `Routes` and `Webhooks`, each left out when empty.
#[derive(Debug)]
pub struct TypesFile<'a> {
    /// Compiled document.
    pub ir: &'a ApiIr,
    /// Provenance header.
    pub banner: &'a Banner,
}

impl TypesFile<'_> {
    fn write_components(&self, out: &mut String) {
        let sections = self.ir.component_sections();
        if sections.iter().all(|(_, entries)| entries.is_empty()) {
            return;
        }
        out.push_str("export type Components = {\n");
        for (label, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            out.push_str(&format!("  {label}: {{\n"));
            for (name, ts) in entries {
                write_field(out, "    ", &quote_if_needed(name), ts);
            }
            out.push_str("  };\n");
        }
        out.push_str("};\n\n");
    }
}

impl Emit for TypesFile<'_> {
    fn emit(&self) -> String {
        let mut out = self.banner.emit();
        for decl in self.ir.enums.values() {
            out.push_str(&decl.emit());
        }
        if !self.ir.servers.is_empty() {
            out.push_str(&format!(
                "export type Servers = {};\n\n",
                servers_to_ts(&self.ir.servers)
            ));
        }
        self.write_components(&mut out);
        write_path_items(&mut out, "Routes", &self.ir.paths);
        write_path_items(&mut out, "Webhooks", &self.ir.webhooks);
        out
    }
}
