//! OpenAPI to TypeScript declaration generator.
//!
//! This module decodes OpenAPI 3.0/3.1 documents and generates a single
//! declaration file with:
//! - `const enum` declarations extracted from literal-valued schemas
//! - A `Components` type mirroring the document's reusable sections
//! - `Routes` and `Webhooks` types describing every operation's
//!   parameters, request body and responses
//! - A `Servers` type for the declared servers

mod emitter;
pub mod ir;
pub mod spec;

pub use emitter::{generate, generate_document};
pub use ir::{Banner, GENERATOR_NAME, build_ir};
pub use spec::{Document, InputFormat};
