//! `openapi-tsgen` binary.

fn main() {
    tsgen_cli::init_tracing();
    std::process::exit(tsgen_cli::run(std::env::args_os()));
}
