//! Intermediate representation for OpenAPI to TypeScript declaration generation.
//!
//! This module defines a two-stage pipeline:
//! 1. Normalization: the document is walked once, references are resolved
//!    and every schema is compiled to type text in the right projection
//! 2. Emission: the resulting [`ApiIr`] is rendered to a declaration file
//!    via the `Emit` trait
//!
//! All OpenAPI corner cases are settled during normalization; emission only
//! orders and indents.
//!
//! ## Module Structure
//!
//! - `types`: IR node types and shared constants
//! - `resolve`: single-level `#/components/...` reference resolution
//! - `enums`: per-document enum naming registry
//! - `schema`, `object`: schema node compilation
//! - `security`: security scheme literal types
//! - `normalize`: document -> IR conversion
//! - `emit`: IR -> declaration text (via Emit trait)
//! - `utils`: identifier, quoting and naming helpers

mod emit;
mod enums;
mod normalize;
mod object;
mod resolve;
mod schema;
mod security;
mod types;
pub mod utils;

pub use emit::{
    Banner, Emit, GENERATOR_NAME, TypesFile, security_requirements_to_ts, servers_to_ts,
};
pub use enums::EnumRegistry;
pub use normalize::build_ir;
pub use object::pattern_key_type;
pub use resolve::{Component, component_name, component_ref, resolve};
pub use schema::{SchemaCompiler, apply_nullable};
pub use security::security_scheme_to_ts;
pub use types::{
    ApiIr, EnumDecl, EnumMember, HttpMethod, MAX_SCHEMA_DEPTH, Mode, ObjectType, OperationIr,
    ParamIr, PathItemIr, Scope, TsField,
};
