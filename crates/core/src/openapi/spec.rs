//! OpenAPI document structs for serde deserialization.
//!
//! Covers the parts of OpenAPI 3.0/3.1 that feed the declaration output:
//! paths, webhooks, components, servers and security. YAML and JSON sources
//! are both decoded into a `serde_json::Value` first and then into
//! [`Document`], so the two formats share one set of `Deserialize` impls.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::CompileError;

use super::ir::HttpMethod;

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// YAML 1.2; also accepts plain JSON.
    #[default]
    Yaml,
    /// Strict JSON.
    Json,
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a scalar of any kind where a string is expected (`version: 1.0`).
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The `openapi` version field.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub openapi: Option<String>,
    /// API metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: Info,
    /// Path template to path item.
    #[serde(default, deserialize_with = "null_as_default")]
    pub paths: HashMap<String, RefOr<PathItem>>,
    /// Webhook name to path item (3.1).
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhooks: HashMap<String, RefOr<PathItem>>,
    /// Reusable objects.
    pub components: Option<Components>,
    /// Document-level servers, inherited by path items without their own.
    #[serde(default, deserialize_with = "null_as_default")]
    pub servers: Vec<Server>,
    /// Document-level security, inherited by operations without their own.
    #[serde(default, deserialize_with = "null_as_default")]
    pub security: Vec<SecurityRequirement>,
}

/// Document metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub title: Option<String>,
    /// API version, not the OpenAPI version.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub version: Option<String>,
}

/// Either a `$ref` pointer or an inline value, never both.
///
/// Any mapping carrying a string `$ref` decodes as `Reference`; sibling keys
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A `$ref` to resolve.
    Reference(Reference),
    /// The value itself.
    Inline(T),
}

/// A `$ref` pointer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    /// The pointer, e.g. `#/components/schemas/Pet`.
    #[serde(rename = "$ref")]
    pub path: String,
}

impl<T> RefOr<T> {
    /// The pointer when this is a reference.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Reference(r) => Some(&r.path),
            Self::Inline(_) => None,
        }
    }
}

/// A server the API is reachable at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Server {
    /// URL, possibly templated with `{variable}` segments.
    #[serde(default)]
    pub url: String,
    /// Free-form description; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Template variables by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: HashMap<String, ServerVariable>,
}

/// A substitution variable of a server URL template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerVariable {
    /// Substituted value when none is supplied.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub default: Option<String>,
    /// Free-form description; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Allowed values under `enum`.
    #[serde(default, rename = "enum", deserialize_with = "null_as_default")]
    pub values: Vec<String>,
}

/// Security scheme name to required scopes.
pub type SecurityRequirement = HashMap<String, Vec<String>>;

/// A path item containing operations for the different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    pub options: Option<Operation>,
    /// `HEAD` operation.
    pub head: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// `TRACE` operation.
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Servers overriding the document's for this path.
    #[serde(default, deserialize_with = "null_as_default")]
    pub servers: Vec<Server>,
}

impl PathItem {
    /// The operation declared for `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation name.
    pub operation_id: Option<String>,
    /// Parameters; these override path-level ones with the same name and location.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request payload.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Status code (or `default`) to response.
    #[serde(default, deserialize_with = "null_as_default")]
    pub responses: HashMap<String, RefOr<Response>>,
    /// Security requirements; empty means inherit the document's.
    #[serde(default, deserialize_with = "null_as_default")]
    pub security: Vec<SecurityRequirement>,
    /// Servers; empty means inherit the path item's or the document's.
    #[serde(default, deserialize_with = "null_as_default")]
    pub servers: Vec<Server>,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    #[serde(default)]
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in", default)]
    pub location: String,
    /// Declared requiredness; path parameters are required regardless.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<RefOr<Schema>>,
    /// Media type to schema, used when `schema` is absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: HashMap<String, MediaType>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Media type to payload schema.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: HashMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<RefOr<Schema>>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Free-form description.
    pub description: Option<String>,
    /// Header name to header definition.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, RefOr<Header>>,
    /// Media type to payload schema.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: HashMap<String, MediaType>,
}

/// A response header definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    /// Whether the header is always sent.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<RefOr<Schema>>,
    /// Media type to schema, used when `schema` is absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: HashMap<String, MediaType>,
}

/// Reusable objects addressable through `#/components/<section>/<name>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// `schemas` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub schemas: HashMap<String, RefOr<Schema>>,
    /// `responses` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub responses: HashMap<String, RefOr<Response>>,
    /// `requestBodies` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_bodies: HashMap<String, RefOr<RequestBody>>,
    /// `parameters` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: HashMap<String, RefOr<Parameter>>,
    /// `headers` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, RefOr<Header>>,
    /// `securitySchemes` section.
    #[serde(default, deserialize_with = "null_as_default")]
    pub security_schemes: HashMap<String, RefOr<SecurityScheme>>,
    /// `pathItems` section (3.1).
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_items: HashMap<String, RefOr<PathItem>>,
}

/// A security scheme definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// `apiKey`, `http`, `oauth2`, `openIdConnect` or a custom type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Free-form description; empty when absent.
    #[serde(default)]
    pub description: String,
    /// Header, query or cookie name of an `apiKey` scheme.
    #[serde(default)]
    pub name: String,
    /// Where an `apiKey` scheme is sent.
    #[serde(rename = "in", default)]
    pub location: String,
    /// HTTP auth scheme, e.g. `bearer`.
    #[serde(default)]
    pub scheme: String,
    /// Bearer token format hint.
    #[serde(default)]
    pub bearer_format: String,
    /// Discovery URL of an `openIdConnect` scheme.
    #[serde(rename = "openIdConnectUrl", default)]
    pub open_id_connect_url: String,
    /// Flows of an `oauth2` scheme.
    pub flows: Option<OAuthFlows>,
}

/// The OAuth2 flows a scheme supports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    /// Implicit grant.
    pub implicit: Option<OAuthFlow>,
    /// Resource owner password grant.
    pub password: Option<OAuthFlow>,
    /// Client credentials grant.
    pub client_credentials: Option<OAuthFlow>,
    /// Authorization code grant.
    pub authorization_code: Option<OAuthFlow>,
}

/// One OAuth2 flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    /// Authorization endpoint; empty when absent.
    #[serde(default)]
    pub authorization_url: String,
    /// Token endpoint; empty when absent.
    #[serde(default)]
    pub token_url: String,
    /// Refresh endpoint; empty when absent.
    #[serde(default)]
    pub refresh_url: String,
    /// Scope name to description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: HashMap<String, String>,
}

/// A JSON Schema node kept in its decoded form.
///
/// Schema keywords are read on demand through [`SchemaNode`] so that nested
/// nodes (properties, items, combinator branches) need no separate model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Schema(pub Value);

impl Schema {
    /// Keyword view of the node, `None` unless it is a mapping.
    pub fn node(&self) -> Option<SchemaNode<'_>> {
        SchemaNode::from_value(&self.0)
    }
}

/// Borrowed keyword accessors over one schema mapping.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> SchemaNode<'a> {
    /// View `value` as a schema mapping; `None` for booleans and scalars.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Self { map })
    }

    /// Raw value under `keyword`.
    pub fn get(self, keyword: &str) -> Option<&'a Value> {
        self.map.get(keyword)
    }

    /// Non-empty `$ref` string.
    pub fn reference(self) -> Option<&'a str> {
        self.map
            .get("$ref")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
    }

    /// Declared type names. A 3.1 type array yields each listed name.
    pub fn types(self) -> Vec<&'a str> {
        match self.map.get("type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `properties` mapping.
    pub fn properties(self) -> Option<&'a Map<String, Value>> {
        self.map.get("properties").and_then(Value::as_object)
    }

    /// Names listed under `required`.
    pub fn required(self) -> Vec<&'a str> {
        self.array("required")
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Non-null `items` schema.
    pub fn items(self) -> Option<&'a Value> {
        self.map.get("items").filter(|v| !v.is_null())
    }

    /// `const` value; `Some(Value::Null)` when present as null.
    pub fn const_value(self) -> Option<&'a Value> {
        self.map.get("const")
    }

    /// Non-empty `enum` list.
    pub fn enum_values(self) -> Option<&'a [Value]> {
        self.array("enum")
    }

    /// True only for a boolean `true` under `keyword`.
    pub fn flag(self, keyword: &str) -> bool {
        self.map.get(keyword).and_then(Value::as_bool).unwrap_or(false)
    }

    /// OpenAPI 3.0 `nullable: true`.
    pub fn nullable(self) -> bool {
        self.flag("nullable")
    }

    /// `readOnly: true`.
    pub fn read_only(self) -> bool {
        self.flag("readOnly")
    }

    /// `writeOnly: true`.
    pub fn write_only(self) -> bool {
        self.flag("writeOnly")
    }

    /// Non-empty array under `keyword`, e.g. `oneOf` or `allOf`.
    pub fn array(self, keyword: &str) -> Option<&'a [Value]> {
        self.map
            .get(keyword)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
    }

    /// Non-empty `patternProperties` mapping.
    pub fn pattern_properties(self) -> Option<&'a Map<String, Value>> {
        self.map
            .get("patternProperties")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
    }

    /// `additionalProperties`, boolean or schema.
    pub fn additional_properties(self) -> Option<&'a Value> {
        self.map.get("additionalProperties")
    }

    /// Non-empty `dependentRequired` mapping.
    pub fn dependent_required(self) -> Option<&'a Map<String, Value>> {
        self.map
            .get("dependentRequired")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
    }
}

impl Document {
    /// Decode a document in the given format.
    pub fn parse(source: &str, format: InputFormat) -> Result<Self, CompileError> {
        match format {
            InputFormat::Yaml => Self::from_yaml(source),
            InputFormat::Json => Self::from_json(source),
        }
    }

    /// Parse a document from a JSON string.
    pub fn from_json(source: &str) -> Result<Self, CompileError> {
        if source.trim().is_empty() {
            return Err(CompileError::NilDocument);
        }
        Self::from_value(serde_json::from_str(source)?)
    }

    /// Parse a document from a YAML string.
    pub fn from_yaml(source: &str) -> Result<Self, CompileError> {
        if source.trim().is_empty() {
            return Err(CompileError::NilDocument);
        }
        let yaml: serde_yaml::Value = serde_yaml::from_str(source)?;
        // Non-string mapping keys (e.g. `200:` status codes) become strings here.
        Self::from_value(serde_json::to_value(yaml)?)
    }

    /// Decode an already parsed node tree.
    pub fn from_value(value: Value) -> Result<Self, CompileError> {
        if value.is_null() {
            return Err(CompileError::NilDocument);
        }
        Ok(serde_json::from_value(value)?)
    }
}
