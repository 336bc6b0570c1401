//! Normalization from an OpenAPI document to the declaration IR.
//!
//! This module handles the document walk:
//! - Component sections, compiled before any operation
//! - Path and webhook operations, in sorted key order
//! - Parameter merging between path items and operations
//! - Security and server inheritance
//!
//! Every schema goes through one [`SchemaCompiler`] sharing one
//! [`EnumRegistry`] for the whole document.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::{CompileError, Section};
use crate::openapi::spec::{
    Document, Header, MediaType, Operation, Parameter, PathItem, RefOr, Response,
};

use super::emit::Emit;
use super::enums::EnumRegistry;
use super::resolve::{component_name, component_ref, resolve};
use super::schema::SchemaCompiler;
use super::security::security_scheme_to_ts;
use super::types::{
    ApiIr, HttpMethod, Mode, ObjectType, OperationIr, ParamIr, PathItemIr, Scope, TS_NEVER,
    TS_UNKNOWN, TsField,
};
use super::utils::{join_hint, literal_union, media_type_suffix, sorted_keys, write_field};

/// Parameters keyed by `(name, location)`.
type ParamMap = BTreeMap<(String, String), ParamIr>;

/// Build the declaration IR for a whole document.
pub fn build_ir(doc: &Document) -> Result<ApiIr, CompileError> {
    debug!(
        openapi = doc.openapi.as_deref().unwrap_or_default(),
        paths = doc.paths.len(),
        webhooks = doc.webhooks.len(),
        schemas = doc.components.as_ref().map_or(0, |c| c.schemas.len()),
        "Building declaration IR."
    );

    let mut builder = IrBuilder {
        doc,
        enums: EnumRegistry::new(),
    };
    let mut ir = ApiIr {
        servers: doc.servers.clone(),
        ..ApiIr::default()
    };

    builder.components(&mut ir)?;
    ir.paths = builder.path_items(&doc.paths, "path")?;
    ir.webhooks = builder.path_items(&doc.webhooks, "webhook")?;
    ir.enums = builder.enums.into_declarations();

    debug!(
        enums = ir.enums.len(),
        paths = ir.paths.len(),
        webhooks = ir.webhooks.len(),
        "Built declaration IR."
    );
    Ok(ir)
}

/// Lazy `Components[...]` lookup for a reference into `section`.
fn lazy_ref<T>(value: &RefOr<T>, section: Section) -> Option<String> {
    value
        .reference()
        .and_then(|reference| component_name(reference, section))
        .map(|name| component_ref(section, name))
}

struct IrBuilder<'a> {
    doc: &'a Document,
    enums: EnumRegistry,
}

impl<'a> IrBuilder<'a> {
    fn schemas(&mut self) -> SchemaCompiler<'_> {
        SchemaCompiler::new(self.doc, &mut self.enums)
    }

    fn components(&mut self, ir: &mut ApiIr) -> Result<(), CompileError> {
        let doc = self.doc;
        let Some(components) = doc.components.as_ref() else {
            return Ok(());
        };

        for name in sorted_keys(&components.schemas) {
            let scope = Scope::new(Mode::Default, name.as_str());
            let ts = self.schemas().compile(&components.schemas[name], &scope);
            ir.schemas.insert(name.clone(), ts);
        }

        for name in sorted_keys(&components.responses) {
            let response = resolve(doc, &components.responses[name])
                .map_err(|e| e.within(format!("components.responses.{name}")))?;
            let ts = self.response_to_ts(response, name, Mode::Output);
            ir.responses.insert(name.clone(), ts);
        }

        for name in sorted_keys(&components.request_bodies) {
            let body = resolve(doc, &components.request_bodies[name])
                .map_err(|e| e.within(format!("components.requestBodies.{name}")))?;
            let ts = self.content_to_ts(&body.content, TS_UNKNOWN, name, Mode::Input);
            ir.request_bodies.insert(name.clone(), ts);
        }

        for name in sorted_keys(&components.parameters) {
            let param = resolve(doc, &components.parameters[name])
                .map_err(|e| e.within(format!("components.parameters.{name}")))?;
            let ts = self.parameter_to_ts(param, name, Mode::Input);
            ir.parameters.insert(name.clone(), ts);
        }

        for name in sorted_keys(&components.headers) {
            let header = resolve(doc, &components.headers[name])
                .map_err(|e| e.within(format!("components.headers.{name}")))?;
            let ts = self.header_to_ts(header, name, Mode::Output);
            ir.headers.insert(name.clone(), ts);
        }

        for name in sorted_keys(&components.security_schemes) {
            let scheme = resolve(doc, &components.security_schemes[name])
                .map_err(|e| e.within(format!("components.securitySchemes.{name}")))?;
            ir.security_schemes
                .insert(name.clone(), security_scheme_to_ts(scheme));
        }
        Ok(())
    }

    /// Compile paths or webhooks. Items without operations are left out.
    fn path_items(
        &mut self,
        items: &HashMap<String, RefOr<PathItem>>,
        label: &str,
    ) -> Result<BTreeMap<String, PathItemIr>, CompileError> {
        let doc = self.doc;
        let mut out = BTreeMap::new();
        for key in sorted_keys(items) {
            let item = resolve(doc, &items[key]).map_err(|e| e.within(format!("{label} {key:?}")))?;
            let compiled = self
                .path_item(item)
                .map_err(|e| e.within(format!("{label} {key:?}")))?;
            if compiled.ops.is_empty() {
                trace!(label, key = %key, "Skipping item without operations.");
                continue;
            }
            out.insert(key.clone(), compiled);
        }
        Ok(out)
    }

    fn path_item(&mut self, item: &PathItem) -> Result<PathItemIr, CompileError> {
        let shared = self.collect_params(&item.parameters)?;
        let mut ops = BTreeMap::new();
        for method in HttpMethod::ALL {
            let Some(op) = item.operation(method) else {
                continue;
            };
            ops.insert(method, self.operation(method, op, item, &shared)?);
        }
        Ok(PathItemIr { ops })
    }

    fn operation(
        &mut self,
        method: HttpMethod,
        op: &Operation,
        item: &PathItem,
        shared: &ParamMap,
    ) -> Result<OperationIr, CompileError> {
        let own = self
            .collect_params(&op.parameters)
            .map_err(|e| e.within(format!("{method} params")))?;
        let mut merged = shared.clone();
        merged.extend(own);

        let mut ir = OperationIr::default();
        for ((name, location), param) in merged {
            let group = match location.as_str() {
                "path" => &mut ir.path_params,
                "query" => &mut ir.query_params,
                "header" => &mut ir.header_params,
                "cookie" => &mut ir.cookie_params,
                _ => {
                    trace!(name = %name, location = %location, "Dropping parameter with unknown location.");
                    continue;
                }
            };
            group.insert(name, param);
        }

        ir.request_body = self
            .request_body(method, op)
            .map_err(|e| e.within(format!("{method} requestBody")))?;
        ir.responses = self
            .responses(method, op)
            .map_err(|e| e.within(format!("{method} responses")))?;

        let doc = self.doc;
        ir.security = if op.security.is_empty() {
            doc.security.clone()
        } else {
            op.security.clone()
        };
        ir.servers = [&op.servers, &item.servers, &doc.servers]
            .into_iter()
            .find(|servers| !servers.is_empty())
            .cloned()
            .unwrap_or_default();
        Ok(ir)
    }

    /// Resolve and compile a parameter list. Path parameters are always required.
    fn collect_params(&mut self, params: &[RefOr<Parameter>]) -> Result<ParamMap, CompileError> {
        let doc = self.doc;
        let mut out = ParamMap::new();
        for param in params {
            let resolved = resolve(doc, param)?;
            let ts = match lazy_ref(param, Section::Parameters) {
                Some(ts) => ts,
                None => self.parameter_to_ts(resolved, &resolved.name, Mode::Input),
            };
            let required = resolved.required || resolved.location == "path";
            out.insert(
                (resolved.name.clone(), resolved.location.clone()),
                ParamIr { ts, required },
            );
        }
        Ok(out)
    }

    fn request_body(
        &mut self,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<Option<String>, CompileError> {
        let Some(body) = op.request_body.as_ref() else {
            return Ok(None);
        };
        let resolved = resolve(self.doc, body)?;
        if let Some(ts) = lazy_ref(body, Section::RequestBodies) {
            return Ok(Some(ts));
        }
        let hint = join_hint(method.as_str(), "RequestBody");
        Ok(Some(self.content_to_ts(
            &resolved.content,
            TS_UNKNOWN,
            &hint,
            Mode::Input,
        )))
    }

    fn responses(
        &mut self,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<BTreeMap<String, String>, CompileError> {
        let doc = self.doc;
        let mut out = BTreeMap::new();
        for code in sorted_keys(&op.responses) {
            let response = &op.responses[code];
            let resolved = resolve(doc, response)?;
            let ts = match lazy_ref(response, Section::Responses) {
                Some(ts) => ts,
                None => {
                    let hint = join_hint(method.as_str(), &format!("Response_{code}"));
                    self.response_to_ts(resolved, &hint, Mode::Output)
                }
            };
            out.insert(code.clone(), ts);
        }
        Ok(out)
    }

    /// Body type, or `{ headers; body }` when the response declares headers.
    fn response_to_ts(&mut self, response: &Response, hint: &str, mode: Mode) -> String {
        let body = self.content_to_ts(&response.content, TS_NEVER, hint, mode);
        if response.headers.is_empty() {
            return body;
        }

        let doc = self.doc;
        let mut headers = Vec::with_capacity(response.headers.len());
        for name in sorted_keys(&response.headers) {
            let header = &response.headers[name];
            let field = match resolve(doc, header) {
                Ok(resolved) => {
                    let ts = match lazy_ref(header, Section::Headers) {
                        Some(ts) => ts,
                        None => self.header_to_ts(resolved, name, Mode::Output),
                    };
                    if resolved.required {
                        TsField::required(name.as_str(), ts)
                    } else {
                        TsField::optional(name.as_str(), ts)
                    }
                }
                Err(err) => {
                    debug!(header = %name, error = %err, "Unresolved response header typed as unknown.");
                    TsField::optional(name.as_str(), TS_UNKNOWN)
                }
            };
            headers.push(field);
        }

        let mut out = String::from("{\n");
        write_field(&mut out, "  ", "headers", &ObjectType(headers).emit());
        write_field(&mut out, "  ", "body", &body);
        out.push('}');
        out
    }

    /// Union of the distinct media type schemas, `empty` when there are none.
    fn content_to_ts(
        &mut self,
        content: &HashMap<String, MediaType>,
        empty: &str,
        hint: &str,
        mode: Mode,
    ) -> String {
        if content.is_empty() {
            return empty.to_string();
        }
        let mut parts: Vec<String> = Vec::with_capacity(content.len());
        for media_type in sorted_keys(content) {
            let scope = Scope::new(mode, join_hint(hint, &media_type_suffix(media_type)));
            let ts = self
                .schemas()
                .compile_opt(content[media_type].schema.as_ref(), &scope);
            if !parts.contains(&ts) {
                parts.push(ts);
            }
        }
        literal_union(&parts)
    }

    fn parameter_to_ts(&mut self, param: &Parameter, hint: &str, mode: Mode) -> String {
        match &param.schema {
            Some(schema) => self.schemas().compile(schema, &Scope::new(mode, hint)),
            None => self.content_to_ts(&param.content, TS_UNKNOWN, hint, mode),
        }
    }

    fn header_to_ts(&mut self, header: &Header, hint: &str, mode: Mode) -> String {
        match &header.schema {
            Some(schema) => self.schemas().compile(schema, &Scope::new(mode, hint)),
            None => self.content_to_ts(&header.content, TS_UNKNOWN, hint, mode),
        }
    }
}
