//! TypeScript declaration emitter for OpenAPI documents.
//!
//! This module is a thin wrapper around the IR-based generation.
//! The pipeline is:
//! 1. Parse: YAML/JSON source -> Document
//! 2. Normalize: Document -> ApiIr (all OpenAPI logic resolved)
//! 3. Emit: ApiIr -> String (via Emit trait)

use crate::error::CompileError;
use crate::openapi::ir::{Banner, Emit, TypesFile, build_ir};
use crate::openapi::spec::{Document, InputFormat};

/// Generate declarations from a YAML or JSON source string.
pub fn generate(source: &str, format: InputFormat, banner: &Banner) -> Result<String, CompileError> {
    let doc = Document::parse(source, format)?;
    generate_document(&doc, banner)
}

/// Generate declarations from an already decoded document.
///
/// The banner's OpenAPI version falls back to the document's `openapi` field.
pub fn generate_document(doc: &Document, banner: &Banner) -> Result<String, CompileError> {
    let ir = build_ir(doc)?;
    let banner = Banner {
        openapi_version: banner
            .openapi_version
            .clone()
            .or_else(|| doc.openapi.clone()),
        ..banner.clone()
    };
    Ok(TypesFile {
        ir: &ir,
        banner: &banner,
    }
    .emit())
}
