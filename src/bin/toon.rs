//! Command-line interface for toon
//! This binary inspects TOON files: token streams, parsed trees, and checks.
//!
//! Usage:
//!   toon tokens `<path>`                      - Print the token stream
//!   toon tree `<path>` [--format `<format>`]  - Print the parsed tree
//!   toon check `<path>`                       - Parse and report problems

use clap::{Arg, Command};
use toon::{parse, ObjectNode, ParseResult, Value};

fn main() {
    let matches = Command::new("toon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting TOON files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens").about("Print the token stream").arg(
                Arg::new("path")
                    .help("Path to the TOON file")
                    .required(true)
                    .index(1),
            ),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the parsed tree")
                .arg(
                    Arg::new("path")
                        .help("Path to the TOON file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('text' or 'json')")
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse and report errors and diagnostics")
                .arg(
                    Arg::new("path")
                        .help("Path to the TOON file")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            handle_tokens_command(path);
        }
        Some(("tree", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let format = sub.get_one::<String>("format").unwrap();
            handle_tree_command(path, format);
        }
        Some(("check", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            handle_check_command(path);
        }
        _ => unreachable!(),
    }
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

fn parse_source(source: &str) -> ParseResult {
    parse(source).unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    })
}

/// Handle the tokens command
fn handle_tokens_command(path: &str) {
    let source = read_source(path);
    let result = parse_source(&source);
    for token in &result.tokens {
        println!(
            "{:>5}..{:<5} {:?}",
            token.start,
            token.end(),
            token.kind
        );
    }
}

/// Handle the tree command
fn handle_tree_command(path: &str, format: &str) {
    let source = read_source(path);
    let result = parse_source(&source);
    match format {
        "text" => print_object(&result.root, 0),
        "json" => {
            let json = serde_json::to_string_pretty(&result.root).unwrap_or_else(|e| {
                eprintln!("Serialization error: {}", e);
                std::process::exit(1);
            });
            println!("{}", json);
        }
        other => {
            eprintln!("Unknown format: {}", other);
            std::process::exit(1);
        }
    }
}

fn print_object(object: &ObjectNode, depth: usize) {
    for property in &object.properties {
        let indent = "  ".repeat(depth);
        match &property.value {
            Value::Object(child) => {
                println!("{}{} [{}]", indent, property.key, property.range);
                print_object(child, depth + 1);
            }
            Value::Array(values) => {
                println!(
                    "{}{}: array of {} [{}]",
                    indent,
                    property.key,
                    values.len(),
                    property.range
                );
            }
            Value::Scalar(scalar) => {
                println!("{}{}: {} [{}]", indent, property.key, scalar, property.range);
            }
        }
    }
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let source = read_source(path);
    match parse(&source) {
        Err(e) => {
            eprintln!("{}: {}", path, e);
            std::process::exit(1);
        }
        Ok(result) => {
            for diagnostic in &result.diagnostics {
                // 1-based positions for human output
                println!(
                    "{}:{}:{}: {}",
                    path,
                    diagnostic.line + 1,
                    diagnostic.column + 1,
                    diagnostic.message
                );
            }
            if result.diagnostics.is_empty() {
                println!("{}: ok", path);
            } else {
                std::process::exit(1);
            }
        }
    }
}
