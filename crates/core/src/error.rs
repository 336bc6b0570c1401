//! Error types for document decoding, compilation and output writing.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A reusable-by-name section of `components`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `components.schemas`
    Schemas,
    /// `components.responses`
    Responses,
    /// `components.requestBodies`
    RequestBodies,
    /// `components.parameters`
    Parameters,
    /// `components.headers`
    Headers,
    /// `components.securitySchemes`
    SecuritySchemes,
    /// `components.pathItems`
    PathItems,
}

impl Section {
    /// The section's key under `components` in the document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Responses => "responses",
            Self::RequestBodies => "requestBodies",
            Self::Parameters => "parameters",
            Self::Headers => "headers",
            Self::SecuritySchemes => "securitySchemes",
            Self::PathItems => "pathItems",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Failure to turn a document into declarations. Always fatal to the run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source was empty or decoded to `null`.
    #[error("no document supplied")]
    NilDocument,

    /// A `$ref` outside the `#/components/<section>/<name>` shape.
    #[error("unsupported $ref {reference:?}")]
    UnsupportedReference {
        /// The pointer as written.
        reference: String,
    },

    /// A `$ref` naming an entry its section does not declare.
    #[error("missing components.{section} entry {name:?}")]
    MissingComponent {
        /// Section the pointer addresses.
        section: Section,
        /// Entry name after the section key.
        name: String,
    },

    /// A `$ref` whose target is itself a `$ref`.
    #[error("nested {section} $ref {reference:?}")]
    NestedReference {
        /// Section both pointers live in.
        section: Section,
        /// The pointer found at the target.
        reference: String,
    },

    /// The JSON source did not decode.
    #[error("decode JSON document: {0}")]
    DecodeJson(#[from] serde_json::Error),

    /// The YAML source did not decode.
    #[error("decode YAML document: {0}")]
    DecodeYaml(#[from] serde_yaml::Error),

    /// Location in the document an inner error was raised at.
    #[error("{context}: {source}")]
    Context {
        /// Human-readable location, e.g. `path "/a"` or `get params`.
        context: String,
        /// The error raised below that location.
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Wrap the error with the document location it surfaced at.
    pub fn within(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with every location layer peeled off.
    pub fn root(&self) -> &Self {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

/// Failure of the read, compile and write cycle of [`crate::write_schema`].
#[derive(Debug, Error)]
pub enum WriteError {
    /// The schema file, or the output being compared against, could not be read.
    #[error("read schema {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The output file could not be written.
    #[error("write output {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The output's parent directory could not be created.
    #[error("create output dir {}: {source}", path.display())]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The schema did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_context_message_reads_outermost_first() {
        let err = CompileError::NestedReference {
            section: Section::Responses,
            reference: "#/components/responses/B".to_string(),
        }
        .within("get responses")
        .within("path \"/a\"");

        assert_eq!(
            err.to_string(),
            "path \"/a\": get responses: nested responses $ref \"#/components/responses/B\""
        );
        assert!(matches!(
            err.root(),
            CompileError::NestedReference {
                section: Section::Responses,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_component_message() {
        let err = CompileError::MissingComponent {
            section: Section::Parameters,
            name: "Limit".to_string(),
        };
        assert_eq!(err.to_string(), "missing components.parameters entry \"Limit\"");
        assert!(matches!(err.root(), CompileError::MissingComponent { .. }));
    }
}
