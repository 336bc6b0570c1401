//! End-to-end checks over the paired YAML/JSON fixtures in `tests/fixtures`.
//!
//! Every fixture exists as `<name>.yml`, `<name>.json` and the expected
//! `<name>.ts`. Mismatches print a line diff.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use similar::{ChangeTag, TextDiff};
use tsgen_core::{Banner, CompileError, InputFormat, Section, generate};

const FIXTURES: [&str; 9] = [
    "basic",
    "components-refs",
    "constraints",
    "enums-shared",
    "maps-patterns",
    "params-locations",
    "polymorphism",
    "security",
    "webhooks-servers",
];

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn banner() -> Banner {
    Banner::new(Utc.with_ymd_and_hms(2026, 2, 10, 17, 22, 30).unwrap())
        .with_generator_version("dev")
}

fn render_diff(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}

fn assert_same_text(label: &str, expected: &str, actual: &str) {
    assert!(
        expected == actual,
        "{label}: output differs (-expected +actual)\n{}",
        render_diff(expected, actual)
    );
}

fn compile(source: &str, format: InputFormat) -> String {
    generate(source, format, &banner()).unwrap()
}

#[test]
fn test_fixtures_match_expected_declarations() {
    for name in FIXTURES {
        let expected = fixture(&format!("{name}.ts"));
        let yaml = compile(&fixture(&format!("{name}.yml")), InputFormat::Yaml);
        assert_same_text(&format!("{name}.yml"), &expected, &yaml);
    }
}

#[test]
fn test_yaml_and_json_sources_are_equivalent() {
    for name in FIXTURES {
        let yaml = compile(&fixture(&format!("{name}.yml")), InputFormat::Yaml);
        let json = compile(&fixture(&format!("{name}.json")), InputFormat::Json);
        assert_same_text(&format!("{name} yaml vs json"), &yaml, &json);
    }
}

#[test]
fn test_generation_is_deterministic() {
    for name in FIXTURES {
        let source = fixture(&format!("{name}.json"));
        let first = compile(&source, InputFormat::Json);
        for _ in 0..5 {
            assert_same_text(name, &first, &compile(&source, InputFormat::Json));
        }
    }
}

#[test]
fn test_timestamp_only_changes_banner() {
    let source = fixture("basic.yml");
    let early = generate(&source, InputFormat::Yaml, &banner()).unwrap();
    let later = Banner::new(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    let late = generate(&source, InputFormat::Yaml, &later).unwrap();

    let body = |text: &str| text.split_once(" */\n\n").map(|(_, b)| b.to_string()).unwrap();
    assert_ne!(early, late);
    assert_eq!(body(&early), body(&late));
}

#[test]
fn test_status_codes_are_ordered_numerically_then_default() {
    let source = r##"
openapi: 3.1.0
paths:
  /a:
    get:
      responses:
        "404": { description: missing }
        default: { description: other }
        "200": { description: ok }
        4XX: { description: client }
"##;
    let out = compile(source, InputFormat::Yaml);
    let expected = "      responses: {\n        200: never;\n        404: never;\n        \"4XX\": never;\n        default: never;\n      };\n";
    assert!(out.contains(expected), "unexpected responses block:\n{out}");
}

#[test]
fn test_optional_path_parameter_is_still_required() {
    let source = r##"{
      "openapi": "3.1.0",
      "paths": {
        "/users/{id}": {
          "get": {
            "parameters": [{ "name": "id", "in": "path", "required": false, "schema": { "type": "string" } }],
            "responses": {}
          }
        }
      }
    }"##;
    let out = compile(source, InputFormat::Json);
    assert!(out.contains("      params: {\n        id: string;\n      };\n"), "{out}");
}

#[test]
fn test_nested_component_reference_is_rejected() {
    let source = r##"
openapi: 3.1.0
paths:
  /a:
    get:
      responses:
        "200":
          $ref: "#/components/responses/A"
components:
  responses:
    A:
      $ref: "#/components/responses/B"
    B:
      description: ok
"##;
    let err = generate(source, InputFormat::Yaml, &banner()).unwrap_err();
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
fn test_single_branch_one_of_stays_parenthesized() {
    let source = r##"{
      "openapi": "3.1.0",
      "paths": {},
      "components": { "schemas": { "Only": { "oneOf": [{ "type": "string" }] } } }
    }"##;
    let out = compile(source, InputFormat::Json);
    assert!(out.contains("    Only: (string);\n"), "{out}");
}

#[test]
fn test_enum_names_never_collide() {
    let source = r##"{
      "openapi": "3.1.0",
      "paths": {},
      "components": {
        "schemas": {
          "Pet": {
            "type": "object",
            "properties": {
              "kind": { "enum": ["cat", "dog"] }
            }
          },
          "Pet_kind": { "enum": ["fish", "frog"] },
          "Components": { "enum": ["a", "b"] }
        }
      }
    }"##;
    let out = compile(source, InputFormat::Json);
    assert!(out.contains("export const enum PetKindEnum {\n  CAT = \"cat\",\n  DOG = \"dog\",\n}"));
    assert!(out.contains("export const enum PetKindEnum2 {\n  FISH = \"fish\",\n  FROG = \"frog\",\n}"));
    assert!(out.contains("export const enum ComponentsEnum {"));

    let mut names: Vec<&str> = out
        .lines()
        .filter_map(|line| line.strip_prefix("export const enum "))
        .collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_media_type_duplicates_collapse() {
    let source = r##"{
      "openapi": "3.1.0",
      "paths": {
        "/a": {
          "get": {
            "responses": {
              "200": {
                "description": "ok",
                "content": {
                  "application/json": { "schema": { "type": "string" } },
                  "application/xml": { "schema": { "type": "integer" } },
                  "text/plain": { "schema": { "type": "string" } }
                }
              }
            }
          }
        }
      }
    }"##;
    let out = compile(source, InputFormat::Json);
    assert!(out.contains("        200: (string | number);\n"), "{out}");
}

#[test]
fn test_string_map_scenario() {
    let source = r##"{
      "openapi": "3.1.0",
      "paths": {},
      "components": { "schemas": { "Labels": { "additionalProperties": { "type": "string" } } } }
    }"##;
    let out = compile(source, InputFormat::Json);
    assert!(out.contains("    Labels: Record<string, string>;\n"), "{out}");
}
