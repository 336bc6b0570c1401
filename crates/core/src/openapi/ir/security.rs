//! Security scheme declarations as literal object types.

use std::collections::BTreeMap;

use crate::openapi::spec::{OAuthFlow, OAuthFlows, SecurityScheme};

use super::emit::Emit;
use super::types::{ObjectType, TS_EMPTY_OBJECT, TS_RECORD_UNKNOWN, TS_STRING, TsField};
use super::utils::{quote_if_needed, quote_string, write_field};

/// Type text of one security scheme.
pub fn security_scheme_to_ts(scheme: &SecurityScheme) -> String {
    let mut fields: BTreeMap<&str, String> = BTreeMap::new();
    match scheme.kind.as_str() {
        "apiKey" => {
            fields.insert("type", string_literal("apiKey"));
            fields.insert("name", string_literal(&scheme.name));
            fields.insert("in", string_literal(&scheme.location));
        }
        "http" => {
            fields.insert("type", string_literal("http"));
            fields.insert("scheme", string_literal(&scheme.scheme));
            if !scheme.bearer_format.is_empty() {
                fields.insert("bearerFormat", string_literal(&scheme.bearer_format));
            }
        }
        "oauth2" => {
            fields.insert("type", string_literal("oauth2"));
            fields.insert("flows", oauth_flows_to_ts(scheme.flows.as_ref()));
        }
        "openIdConnect" => {
            fields.insert("type", string_literal("openIdConnect"));
            fields.insert(
                "openIdConnectUrl",
                string_literal(&scheme.open_id_connect_url),
            );
        }
        _ => {
            let present = [
                ("type", &scheme.kind),
                ("name", &scheme.name),
                ("in", &scheme.location),
                ("scheme", &scheme.scheme),
                ("bearerFormat", &scheme.bearer_format),
                ("openIdConnectUrl", &scheme.open_id_connect_url),
            ];
            for (key, value) in present {
                if !value.is_empty() {
                    fields.insert(key, string_literal(value));
                }
            }
            if scheme.flows.is_some() {
                fields.insert("flows", oauth_flows_to_ts(scheme.flows.as_ref()));
            }
            if fields.is_empty() {
                return TS_RECORD_UNKNOWN.to_string();
            }
        }
    }

    let mut out = String::from("{\n");
    if !scheme.description.is_empty() {
        out.push_str("  description?: string;\n");
    }
    for (key, value) in &fields {
        write_field(&mut out, "  ", &quote_if_needed(key), value);
    }
    out.push('}');
    out
}

/// Declared values render as literals; an empty field is just `string`.
fn string_literal(value: &str) -> String {
    if value.is_empty() {
        TS_STRING.to_string()
    } else {
        quote_string(value)
    }
}

fn oauth_flows_to_ts(flows: Option<&OAuthFlows>) -> String {
    let Some(flows) = flows else {
        return "unknown".to_string();
    };
    let fields: Vec<TsField> = [
        ("implicit", &flows.implicit),
        ("password", &flows.password),
        ("clientCredentials", &flows.client_credentials),
        ("authorizationCode", &flows.authorization_code),
    ]
    .into_iter()
    .filter_map(|(name, flow)| {
        flow.as_ref()
            .map(|flow| TsField::required(name, oauth_flow_to_ts(flow)))
    })
    .collect();
    if fields.is_empty() {
        return TS_EMPTY_OBJECT.to_string();
    }
    ObjectType(fields).emit()
}

fn oauth_flow_to_ts(flow: &OAuthFlow) -> String {
    let mut fields = Vec::new();
    for (name, url) in [
        ("authorizationUrl", &flow.authorization_url),
        ("tokenUrl", &flow.token_url),
        ("refreshUrl", &flow.refresh_url),
    ] {
        if !url.is_empty() {
            fields.push(TsField::required(name, TS_STRING));
        }
    }
    let scopes = if flow.scopes.is_empty() {
        format!("Record<{TS_STRING}, {TS_STRING}>")
    } else {
        ObjectType(
            flow.scopes
                .keys()
                .map(|scope| TsField::required(scope.as_str(), TS_STRING))
                .collect(),
        )
        .emit()
    };
    fields.push(TsField::required("scopes", scopes));
    ObjectType(fields).emit()
}
