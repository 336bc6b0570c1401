//! IR types for TypeScript declaration generation.
//!
//! - `ApiIr`: the compiled document, one map per declaration section
//! - `OperationIr`: compiled parameters, bodies and responses of one method
//! - `Scope`: depth, projection mode and naming hint of a schema compilation
//! - `ObjectType`/`TsField`, `EnumDecl`: text nodes rendered through `Emit`

use std::collections::BTreeMap;
use std::fmt;

use crate::openapi::spec::{SecurityRequirement, Server};

use super::utils::join_hint;

// ============================================================================
// Type text constants
// ============================================================================

/// Type of a schema nothing can satisfy (`false`, `not: {}`).
pub const TS_NEVER: &str = "never";
/// Type of a schema with no usable constraint.
pub const TS_UNKNOWN: &str = "unknown";
/// `null` literal type.
pub const TS_NULL: &str = "null";
/// `string` keyword type.
pub const TS_STRING: &str = "string";
/// Open object with values of any type.
pub const TS_RECORD_UNKNOWN: &str = "Record<string, unknown>";
/// Object that admits no keys.
pub const TS_RECORD_NEVER: &str = "Record<string, never>";
/// Empty object literal type.
pub const TS_EMPTY_OBJECT: &str = "{}";

/// Schema nesting beyond this depth compiles to `unknown`.
pub const MAX_SCHEMA_DEPTH: usize = 30;

/// Top-level declaration names enums may never take.
pub const RESERVED_NAMES: [&str; 2] = ["Components", "Routes"];

/// Member name used when a literal yields no usable identifier.
pub const ENUM_VALUE_PREFIX: &str = "Value";
/// Prefix of members generated from numeric literals.
pub const ENUM_NUMBER_PREFIX: &str = "VALUE_";
/// Member name of the empty string literal.
pub const ENUM_EMPTY_MEMBER: &str = "Empty";

/// HTTP method of a path item operation.
///
/// Variants are declared in alphabetical order of their lowercase names so
/// the derived `Ord` matches the order methods are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// `delete`
    Delete,
    /// `get`
    Get,
    /// `head`
    Head,
    /// `options`
    Options,
    /// `patch`
    Patch,
    /// `post`
    Post,
    /// `put`
    Put,
    /// `trace`
    Trace,
}

impl HttpMethod {
    /// Order in which a path item's operations are compiled.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Trace,
    ];

    /// Lowercase name, as used for document keys and `Routes` fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Get => "get",
            Self::Head => "head",
            Self::Options => "options",
            Self::Patch => "patch",
            Self::Post => "post",
            Self::Put => "put",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection mode of a schema compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Component schemas: nothing filtered, schema refs stay lazy.
    #[default]
    Default,
    /// Request side: `readOnly` properties dropped, schema refs inlined.
    Input,
    /// Response side: `writeOnly` properties dropped, schema refs inlined.
    Output,
}

/// Context threaded through every schema compilation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Nesting level; see [`MAX_SCHEMA_DEPTH`].
    pub depth: usize,
    /// Which side of the wire the schema is compiled for.
    pub mode: Mode,
    /// Naming hint for enums extracted below this point.
    pub hint: String,
}

impl Scope {
    /// Top-level scope.
    pub fn new(mode: Mode, hint: impl Into<String>) -> Self {
        Self {
            depth: 0,
            mode,
            hint: hint.into(),
        }
    }

    /// Same hint, `step` levels deeper.
    pub fn deeper(&self, step: usize) -> Self {
        Self {
            depth: self.depth + step,
            mode: self.mode,
            hint: self.hint.clone(),
        }
    }

    /// Hint extended by `part`, `step` levels deeper.
    pub fn child(&self, part: &str, step: usize) -> Self {
        Self {
            depth: self.depth + step,
            mode: self.mode,
            hint: join_hint(&self.hint, part),
        }
    }

    /// Hint replaced by `hint`, `step` levels deeper.
    pub fn renamed(&self, hint: &str, step: usize) -> Self {
        Self {
            depth: self.depth + step,
            mode: self.mode,
            hint: hint.to_string(),
        }
    }

    /// Past the depth cap.
    pub fn exhausted(&self) -> bool {
        self.depth > MAX_SCHEMA_DEPTH
    }
}

/// A field of a rendered object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsField {
    /// Raw key; quoted on emission when not an identifier.
    pub name: String,
    /// Type text, possibly multi-line.
    pub ts: String,
    /// Rendered with `?`.
    pub optional: bool,
}

impl TsField {
    /// A `name: ts` field.
    pub fn required(name: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ts: ts.into(),
            optional: false,
        }
    }

    /// A `name?: ts` field.
    pub fn optional(name: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ts: ts.into(),
            optional: true,
        }
    }
}

/// Object type literal; fields render sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectType(pub Vec<TsField>);

/// One `NAME = literal` member of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Member identifier.
    pub name: String,
    /// Literal text, e.g. `"open"` or `2`.
    pub value: String,
}

/// An `export const enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// Unique declaration name.
    pub name: String,
    /// Members in source order.
    pub members: Vec<EnumMember>,
}

/// A compiled parameter: its type text and whether it must be supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamIr {
    /// Type text.
    pub ts: String,
    /// Rendered without `?`.
    pub required: bool,
}

/// Compiled fields of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationIr {
    /// `in: path` parameters, rendered as `params`.
    pub path_params: BTreeMap<String, ParamIr>,
    /// `in: query` parameters.
    pub query_params: BTreeMap<String, ParamIr>,
    /// `in: header` parameters.
    pub header_params: BTreeMap<String, ParamIr>,
    /// `in: cookie` parameters.
    pub cookie_params: BTreeMap<String, ParamIr>,
    /// `None` when the operation declares no request body.
    pub request_body: Option<String>,
    /// Status key to response type; emission orders the keys.
    pub responses: BTreeMap<String, String>,
    /// Effective security requirements after inheritance.
    pub security: Vec<SecurityRequirement>,
    /// Effective servers after inheritance.
    pub servers: Vec<Server>,
}

/// Operations of one path or webhook, keyed by method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathItemIr {
    /// Declared operations; never empty.
    pub ops: BTreeMap<HttpMethod, OperationIr>,
}

/// The compiled document, ready for emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiIr {
    /// Compiled `components.schemas`, default mode.
    pub schemas: BTreeMap<String, String>,
    /// Compiled `components.responses`, output mode.
    pub responses: BTreeMap<String, String>,
    /// Compiled `components.requestBodies`, input mode.
    pub request_bodies: BTreeMap<String, String>,
    /// Compiled `components.parameters`, input mode.
    pub parameters: BTreeMap<String, String>,
    /// Compiled `components.headers`, output mode.
    pub headers: BTreeMap<String, String>,
    /// Literal object types of `components.securitySchemes`.
    pub security_schemes: BTreeMap<String, String>,
    /// Every enum extracted during compilation, by name.
    pub enums: BTreeMap<String, EnumDecl>,
    /// Path template to compiled operations.
    pub paths: BTreeMap<String, PathItemIr>,
    /// Webhook name to compiled operations.
    pub webhooks: BTreeMap<String, PathItemIr>,
    /// Document-level servers, rendered as `Servers`.
    pub servers: Vec<Server>,
}

impl ApiIr {
    /// Component sections in emission order, labelled by their document key.
    pub fn component_sections(&self) -> [(&'static str, &BTreeMap<String, String>); 6] {
        [
            ("schemas", &self.schemas),
            ("responses", &self.responses),
            ("requestBodies", &self.request_bodies),
            ("parameters", &self.parameters),
            ("headers", &self.headers),
            ("securitySchemes", &self.security_schemes),
        ]
    }
}
