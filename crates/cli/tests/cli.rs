//! Exit codes and file effects of the `openapi-tsgen` entry point.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use tempfile::TempDir;

const SCHEMA: &str = r#"
openapi: 3.1.0
paths:
  /health:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                required: [status]
                properties:
                  status:
                    enum: [up, down]
"#;

fn run(args: &[&str]) -> i32 {
    tsgen_cli::run(std::iter::once("openapi-tsgen").chain(args.iter().copied()))
}

#[test]
fn test_generates_declarations() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("api.yml");
    let output = dir.path().join("gen/types.ts");
    fs::write(&schema, SCHEMA).unwrap();

    let code = run(&[schema.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    assert_eq!(code, 0);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("/*\n * @Warning: THIS FILE IS AUTO-GENERATED - DO NOT EDIT\n"));
    assert!(text.contains(&format!(" * Generator: openapi-tsgen@{}\n", env!("CARGO_PKG_VERSION"))));
    assert!(text.contains(" * OpenAPI version: 3.1.0\n"));
    assert!(text.contains("export const enum Get200ApplicationJsonStatusEnum {\n  UP = \"up\","));
    assert!(text.contains("status: Get200ApplicationJsonStatusEnum;"));
    assert!(text.contains("\"/health\": {"));

    // Second run over the same schema leaves the file untouched.
    let before = fs::metadata(&output).unwrap().modified().unwrap();
    assert_eq!(run(&[schema.to_str().unwrap(), "-o", output.to_str().unwrap()]), 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), text);
    assert_eq!(fs::metadata(&output).unwrap().modified().unwrap(), before);
}

#[test]
fn test_json_input_flag() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("api.json");
    let output = dir.path().join("types.ts");
    fs::write(&schema, r#"{"openapi": "3.0.3", "paths": {}}"#).unwrap();

    assert_eq!(
        run(&["-s", schema.to_str().unwrap(), "--input-json", "-o", output.to_str().unwrap()]),
        0
    );
    assert!(fs::read_to_string(&output).unwrap().contains("OpenAPI version: 3.0.3"));
}

#[test]
fn test_no_schema_prints_help() {
    assert_eq!(run(&[]), 0);
}

#[test]
fn test_failures_exit_with_one() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("api.yml");
    fs::write(&schema, SCHEMA).unwrap();

    assert_eq!(run(&[schema.to_str().unwrap(), "-o", ""]), 1);

    let missing = dir.path().join("missing.yml");
    let output = dir.path().join("types.ts");
    assert_eq!(run(&[missing.to_str().unwrap(), "-o", output.to_str().unwrap()]), 1);
    assert!(!output.exists());
}

#[test]
fn test_unknown_flag_is_usage_error() {
    assert_eq!(run(&["--nope"]), 2);
}

#[test]
fn test_help_flag_exits_zero() {
    assert_eq!(run(&["--help"]), 0);
}
