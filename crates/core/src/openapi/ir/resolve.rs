//! Reference resolution into `#/components/<section>/<name>`.
//!
//! Only one level of indirection is followed: a reference whose target is
//! itself a reference is rejected instead of chased.

use std::collections::HashMap;

use crate::error::{CompileError, Section};
use crate::openapi::spec::{
    Components, Document, Header, Parameter, PathItem, RefOr, RequestBody, Response,
    SecurityScheme,
};

use super::utils::quote_string;

/// An object kind that lives in one `components` section.
pub trait Component: Sized {
    /// Section references to this kind must point into.
    const SECTION: Section;

    /// The section's entries.
    fn entries(components: &Components) -> &HashMap<String, RefOr<Self>>;
}

macro_rules! component {
    ($ty:ty, $section:ident, $field:ident) => {
        impl Component for $ty {
            const SECTION: Section = Section::$section;

            fn entries(components: &Components) -> &HashMap<String, RefOr<Self>> {
                &components.$field
            }
        }
    };
}

component!(Response, Responses, responses);
component!(RequestBody, RequestBodies, request_bodies);
component!(Parameter, Parameters, parameters);
component!(Header, Headers, headers);
component!(SecurityScheme, SecuritySchemes, security_schemes);
component!(PathItem, PathItems, path_items);

/// Name of the component a pointer addresses in `section`, if it has the
/// `#/components/<section>/<name>` shape.
pub fn component_name(reference: &str, section: Section) -> Option<&str> {
    reference
        .strip_prefix("#/components/")?
        .strip_prefix(section.key())?
        .strip_prefix('/')
}

/// Lazy lookup into the emitted `Components` type, e.g. `Components["schemas"]["User"]`.
pub fn component_ref(section: Section, name: &str) -> String {
    format!(
        "Components[{}][{}]",
        quote_string(section.key()),
        quote_string(name)
    )
}

/// Resolve an inline value or a single-level reference into its section.
pub fn resolve<'d, T: Component>(
    doc: &'d Document,
    value: &'d RefOr<T>,
) -> Result<&'d T, CompileError> {
    let reference = match value {
        RefOr::Inline(inline) => return Ok(inline),
        RefOr::Reference(r) => r.path.as_str(),
    };
    let section = T::SECTION;
    let (Some(name), Some(components)) =
        (component_name(reference, section), doc.components.as_ref())
    else {
        return Err(CompileError::UnsupportedReference {
            reference: reference.to_string(),
        });
    };
    match T::entries(components).get(name) {
        None => Err(CompileError::MissingComponent {
            section,
            name: name.to_string(),
        }),
        Some(RefOr::Reference(nested)) => Err(CompileError::NestedReference {
            section,
            reference: nested.path.clone(),
        }),
        Some(RefOr::Inline(target)) => Ok(target),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_json(
            r##"{
              "openapi": "3.1.0",
              "paths": {},
              "components": {
                "responses": {
                  "Ok": { "description": "ok" },
                  "Alias": { "$ref": "#/components/responses/Ok" }
                },
                "parameters": {
                  "Limit": { "name": "limit", "in": "query" }
                }
              }
            }"##,
        )
        .unwrap()
    }

    fn reference<T>(path: &str) -> RefOr<T> {
        RefOr::Reference(crate::openapi::spec::Reference {
            path: path.to_string(),
        })
    }

    #[test]
    fn test_component_name() {
        assert_eq!(
            component_name("#/components/schemas/User", Section::Schemas),
            Some("User")
        );
        assert_eq!(
            component_name("#/components/schemas/User", Section::Responses),
            None
        );
        assert_eq!(
            component_name("#/components/schemasUser", Section::Schemas),
            None
        );
        assert_eq!(component_name("other.yml#/User", Section::Schemas), None);
    }

    #[test]
    fn test_component_ref() {
        assert_eq!(
            component_ref(Section::Parameters, "Limit"),
            "Components[\"parameters\"][\"Limit\"]"
        );
    }

    #[test]
    fn test_resolves_single_level_reference() {
        let doc = doc();
        let value: RefOr<Parameter> = reference("#/components/parameters/Limit");
        let param = resolve(&doc, &value).unwrap();
        assert_eq!(param.name, "limit");
    }

    #[test]
    fn test_rejects_nested_reference() {
        let doc = doc();
        let value: RefOr<Response> = reference("#/components/responses/Alias");
        let err = resolve(&doc, &value).unwrap_err();
        assert!(
            matches!(
                &err,
                CompileError::NestedReference { section: Section::Responses, reference }
                    if reference == "#/components/responses/Ok"
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_rejects_missing_component() {
        let doc = doc();
        let value: RefOr<Response> = reference("#/components/responses/Gone");
        let err = resolve(&doc, &value).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingComponent { section: Section::Responses, ref name } if name == "Gone"
        ));
    }

    #[test]
    fn test_rejects_unsupported_pointer() {
        let doc = doc();
        let value: RefOr<Response> = reference("#/components/parameters/Limit");
        assert!(matches!(
            resolve(&doc, &value),
            Err(CompileError::UnsupportedReference { .. })
        ));

        let bare = Document::default();
        let value: RefOr<Header> = reference("#/components/headers/X");
        assert!(matches!(
            resolve(&bare, &value),
            Err(CompileError::UnsupportedReference { .. })
        ));
    }
}
