//! Idempotent output writing.
//!
//! Regenerating over an unchanged document only differs in the banner, so
//! the existing file is compared with the banner stripped and left alone
//! when nothing else changed.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::WriteError;
use crate::openapi::{Banner, InputFormat, generate};

/// What [`write_schema`] did with the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or replaced.
    Written,
    /// The file already held the same declarations.
    Unchanged,
}

/// Compile `source_path` and write the declarations to `output_path`.
pub fn write_schema(
    source_path: &Path,
    output_path: &Path,
    format: InputFormat,
    banner: &Banner,
) -> Result<WriteOutcome, WriteError> {
    let source = fs::read_to_string(source_path).map_err(|source| WriteError::Read {
        path: source_path.to_path_buf(),
        source,
    })?;
    debug!(
        source = %source_path.display(),
        len = source.len(),
        ?format,
        "Read OpenAPI document."
    );

    let output = normalize_output(&generate(&source, format, banner)?);

    match fs::read_to_string(output_path) {
        Ok(existing) => {
            if strip_banner(&normalize_output(&existing)) == strip_banner(&output) {
                info!(output = %output_path.display(), "Declarations unchanged, skipping write.");
                return Ok(WriteOutcome::Unchanged);
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(WriteError::Read {
                path: output_path.to_path_buf(),
                source,
            });
        }
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output_path, &output).map_err(|source| WriteError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    info!(
        output = %output_path.display(),
        len = output.len(),
        "Wrote declarations."
    );
    Ok(WriteOutcome::Written)
}

/// Trailing blanks removed from every line, exactly one final newline.
fn normalize_output(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect();
    let mut out = lines.join("\n").trim_end_matches('\n').to_string();
    out.push('\n');
    out
}

/// Text after the leading banner comment, or all of it when there is none.
fn strip_banner(text: &str) -> &str {
    if !text.starts_with("/*\n") {
        return text;
    }
    match text.find("*/\n\n") {
        Some(end) => &text[end + 4..],
        None => text,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    const SOURCE: &str = r#"
openapi: 3.1.0
paths:
  /ping:
    get:
      responses:
        "200":
          description: ok
          content:
            text/plain:
              schema:
                type: string
"#;

    fn banner(hour: u32) -> Banner {
        Banner::new(Utc.with_ymd_and_hms(2026, 2, 10, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("a  \nb\t\n\n\n"), "a\nb\n");
        assert_eq!(normalize_output("a"), "a\n");
    }

    #[test]
    fn test_strip_banner() {
        assert_eq!(strip_banner("/*\n * x\n */\n\nbody\n"), "body\n");
        assert_eq!(strip_banner("body\n"), "body\n");
        assert_eq!(strip_banner("/*\n unterminated"), "/*\n unterminated");
    }

    #[test]
    fn test_write_then_skip_unchanged() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("openapi.yml");
        fs::write(&source, SOURCE).unwrap();
        let output = dir.path().join("nested/out/types.ts");

        let first = write_schema(&source, &output, InputFormat::Yaml, &banner(1)).unwrap();
        assert_eq!(first, WriteOutcome::Written);
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("Generated at: 2026-02-10T01:00:00Z"));
        assert!(written.contains("200: string;"));
        assert!(written.ends_with("};\n"));

        // A later timestamp alone does not rewrite the file.
        let second = write_schema(&source, &output, InputFormat::Yaml, &banner(2)).unwrap();
        assert_eq!(second, WriteOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&output).unwrap(), written);
    }

    #[test]
    fn test_rewrites_when_declarations_change() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("openapi.yml");
        let output = dir.path().join("types.ts");
        fs::write(&source, SOURCE).unwrap();
        fs::write(&output, "/*\n * old\n */\n\nexport type Routes = {};\n").unwrap();

        let outcome = write_schema(&source, &output, InputFormat::Yaml, &banner(1)).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert!(fs::read_to_string(&output).unwrap().contains("\"/ping\""));
    }

    #[test]
    fn test_errors_carry_paths() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yml");
        let err = write_schema(&missing, &dir.path().join("out.ts"), InputFormat::Yaml, &banner(1))
            .unwrap_err();
        assert!(matches!(err, WriteError::Read { ref path, .. } if path == &missing));

        let source = dir.path().join("bad.json");
        fs::write(&source, "{ not json").unwrap();
        let err = write_schema(&source, &dir.path().join("out.ts"), InputFormat::Json, &banner(1))
            .unwrap_err();
        assert!(matches!(err, WriteError::Compile(_)));
        assert!(!dir.path().join("out.ts").exists());
    }
}
