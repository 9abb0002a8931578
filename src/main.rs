//! appindex CLI - Command-line interface
//!
//! Commands:
//!   schema      - Emit the schema index (models + lookups)
//!   routes      - Emit the flattened endpoint list
//!   models      - Emit the compact model summary list
//!   json-schema - Print the JSON Schema of an output type

use appindex::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "schema" => cmd_schema(&args[2..]),
        "routes" => cmd_routes(&args[2..]),
        "models" => cmd_models(&args[2..]),
        "json-schema" => cmd_json_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("appindex {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            print_usage();
            Err(format!("Unknown command: {}", cmd).into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Structured failure envelope on the error stream.
            let envelope = ErrorEnvelope::from_error(&e);
            match serde_json::to_string(&envelope) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", e),
            }
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
appindex - application schema and route indexing

USAGE:
    appindex <COMMAND> [OPTIONS]

COMMANDS:
    schema <snapshot>        Emit the schema index: record types, fields,
                             relations, choices, lookup taxonomy
    routes <snapshot>        Emit every reachable endpoint with its
                             handler's resolved (file, line) position
    models <snapshot>        Emit the compact model summary list
    json-schema [name]       Print JSON schema for an output type
    version                  Print version

OPTIONS:
    --output <file>          Output file (default: stdout)

The snapshot manifest (YAML or JSON) is produced by the host application's
bootstrap step; `appindex json-schema manifest` prints its schema.

EXAMPLES:
    appindex schema .cache/snapshot.yaml
    appindex routes .cache/snapshot.yaml --output routes.json
    appindex models .cache/snapshot.json
"#
    );
}

fn cmd_schema(args: &[String]) -> Result<()> {
    let snapshot = load_snapshot(args, "Usage: appindex schema <snapshot> [--output <file>]")?;
    let document = schema_document(&snapshot);
    let json = serde_json::to_string_pretty(&document)?;
    write_output(&parse_output_arg(args), &json)
}

fn cmd_routes(args: &[String]) -> Result<()> {
    let snapshot = load_snapshot(args, "Usage: appindex routes <snapshot> [--output <file>]")?;
    let endpoints = route_document(&snapshot);
    let json = serde_json::to_string_pretty(&endpoints)?;
    write_output(&parse_output_arg(args), &json)
}

fn cmd_models(args: &[String]) -> Result<()> {
    let snapshot = load_snapshot(args, "Usage: appindex models <snapshot> [--output <file>]")?;
    let summaries = model_summaries(&snapshot);
    let json = serde_json::to_string_pretty(&summaries)?;
    write_output(&parse_output_arg(args), &json)
}

fn cmd_json_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: manifest, schema, routes, models, error");
            Ok(())
        }
        "manifest" => print_schema::<Snapshot>(),
        "schema" => print_schema::<SchemaDocument>(),
        "routes" => print_schema::<Vec<Endpoint>>(),
        "models" => print_schema::<Vec<ModelSummary>>(),
        "error" => print_schema::<ErrorEnvelope>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn load_snapshot(args: &[String], usage: &str) -> Result<Snapshot> {
    let path = args
        .iter()
        .enumerate()
        .find(|(i, arg)| !arg.starts_with('-') && !is_option_value(args, *i))
        .map(|(_, arg)| arg)
        .ok_or(usage)?;

    Snapshot::load(Path::new(path))
}

/// True when the argument at `index` is the value of a preceding
/// `--output` flag.
fn is_option_value(args: &[String], index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|i| args.get(i))
        .is_some_and(|prev| prev == "--output" || prev == "-o")
}

fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if arg == "--output" || arg == "-o" {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
