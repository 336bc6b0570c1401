//! Compile OpenAPI 3.0/3.1 documents into TypeScript declaration files.
//!
//! The entry points are [`generate`] for in-memory compilation and
//! [`write_schema`] for the read, compile and idempotent write cycle.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

mod error;
pub mod openapi;
mod write;

pub use error::{CompileError, Section, WriteError};
pub use openapi::{
    Banner, Document, GENERATOR_NAME, InputFormat, build_ir, generate, generate_document,
};
pub use write::{WriteOutcome, write_schema};
