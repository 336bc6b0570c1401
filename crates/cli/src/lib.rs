//! Command-line entry point for `openapi-tsgen`.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use std::ffi::OsString;
use std::path::Path;

use chrono::Utc;
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tsgen_core::{Banner, InputFormat, write_schema};

/// Environment variable holding a log level or a full filter spec.
pub const LOG_ENV: &str = "TSGEN_LOG";

/// Crates a plain `TSGEN_LOG` level applies to.
const LOG_TARGETS: [&str; 2] = ["tsgen_cli", "tsgen_core"];

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "openapi-tsgen",
    version,
    about = "Generate TypeScript types from an OpenAPI schema"
)]
pub struct Cli {
    /// Positional schema path.
    #[arg(value_name = "SCHEMA", help = "Path to OpenAPI schema (YAML)")]
    pub schema_arg: Option<String>,

    /// `--schema` path.
    #[arg(
        short = 's',
        long = "schema",
        value_name = "PATH",
        help = "Path to OpenAPI schema (YAML); takes precedence over the positional argument"
    )]
    pub schema: Option<String>,

    /// Destination of the generated declarations.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "type.ts",
        help = "Output file path"
    )]
    pub output: String,

    /// Decode the schema as JSON instead of YAML.
    #[arg(long = "input-json", help = "Treat schema input as JSON")]
    pub input_json: bool,
}

impl Cli {
    /// The `--schema` flag when set, else the positional argument.
    fn schema_path(&self) -> Option<&str> {
        let non_empty = |s: &&str| !s.is_empty();
        self.schema
            .as_deref()
            .filter(non_empty)
            .or_else(|| self.schema_arg.as_deref().filter(non_empty))
    }

    fn format(&self) -> InputFormat {
        if self.input_json {
            InputFormat::Json
        } else {
            InputFormat::Yaml
        }
    }
}

/// Parse `args` (program name first) and run. Returns the process exit code.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => execute(&cli),
        Err(e) => {
            let code = e.exit_code();
            if let Err(io_err) = e.print() {
                debug!(error = %io_err, "Failed to print usage error.");
            }
            code
        }
    }
}

fn execute(cli: &Cli) -> i32 {
    let Some(schema) = cli.schema_path() else {
        let mut cmd = Cli::command();
        if let Err(io_err) = cmd.print_help() {
            debug!(error = %io_err, "Failed to print help.");
        }
        println!();
        return 0;
    };
    if cli.output.is_empty() {
        eprintln!("output path is required");
        return 1;
    }

    let banner = Banner::new(Utc::now()).with_generator_version(env!("CARGO_PKG_VERSION"));
    match write_schema(
        Path::new(schema),
        Path::new(&cli.output),
        cli.format(),
        &banner,
    ) {
        Ok(outcome) => {
            debug!(?outcome, schema, output = %cli.output, "Generation finished.");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Install the stderr fmt subscriber, filtered by [`LOG_ENV`].
pub fn init_tracing() {
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// A plain level applies to this tool's crates; anything else is used as-is.
fn filter_spec(value: Option<&str>) -> String {
    let level_for_all = |level: &str| {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    };
    match value {
        Some(level) if is_plain_level(level) => level_for_all(&level.to_ascii_lowercase()),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => level_for_all("info"),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("openapi-tsgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["api.yml"]);
        assert_eq!(cli.schema_path(), Some("api.yml"));
        assert_eq!(cli.output, "type.ts");
        assert_eq!(cli.format(), InputFormat::Yaml);
    }

    #[test]
    fn test_schema_flag_wins_over_positional() {
        let cli = parse(&["positional.yml", "-s", "flag.yml", "--input-json", "-o", "out/x.ts"]);
        assert_eq!(cli.schema_path(), Some("flag.yml"));
        assert_eq!(cli.output, "out/x.ts");
        assert_eq!(cli.format(), InputFormat::Json);

        let cli = parse(&["positional.yml", "--schema", ""]);
        assert_eq!(cli.schema_path(), Some("positional.yml"));
        assert_eq!(parse(&[]).schema_path(), None);
    }

    #[test]
    fn test_filter_spec() {
        assert_eq!(filter_spec(None), "tsgen_cli=info,tsgen_core=info");
        assert_eq!(filter_spec(Some("DEBUG")), "tsgen_cli=debug,tsgen_core=debug");
        assert_eq!(filter_spec(Some("tsgen_core=trace")), "tsgen_core=trace");
        assert_eq!(filter_spec(Some("  ")), "tsgen_cli=info,tsgen_core=info");
    }
}
