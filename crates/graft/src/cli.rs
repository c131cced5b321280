//! The `graft` command line: reads a shape schema, validates and compiles it,
//! and writes the generated Rust units under an output root.
//!
//! ```text
//! graft <schema.json> <out-root> [--check]
//! ```

use facet::Facet;
use graft::{emit, parse_schema, write_units, GenerateError, Shapes};
use std::io::IsTerminal;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments.
#[derive(Facet, Debug)]
struct Args {
    /// Path to the JSON schema document.
    #[facet(positional)]
    schema: String,

    /// Directory the package path is created under.
    #[facet(positional)]
    out_dir: String,

    /// Validate and compile only; write nothing.
    #[facet(named, short = 'c')]
    #[facet(default)]
    check: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graft=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();

    let args: Args = match facet_args::from_slice(&argv) {
        Ok(args) => args,
        Err(e) => {
            error!("invalid arguments: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), GenerateError> {
    let path = Path::new(&args.schema);
    info!("reading schema from {}", path.display());

    let json = std::fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let shapes = Shapes::compile(parse_schema(&json)?)?;
    let units = emit(&shapes)?;

    if args.check {
        info!("schema is valid ({} unit(s) would be written)", units.len());
        return Ok(());
    }

    write_units(Path::new(&args.out_dir), &shapes.schema().package, &units)?;
    Ok(())
}
