//! Placefill CLI
//!
//! Usage:
//!   placefill [OPTIONS] [FILE]
//!
//! Options:
//!   -f, --vars <FILE>        Variables file (TOML, `[variables]` table)
//!   -v, --var <KEY=VALUE>    Inline variable binding (repeatable)
//!   -t, --table              Treat input as a pipe-delimited table
//!   -d, --dry-run            Static substitution only
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use placefill::{string_processors, Resolver, Value, VariablesFile};

#[derive(Parser)]
#[command(name = "placefill")]
#[command(about = "Resolve ${variable} and #{expression(...)} placeholders in text")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Variables file (TOML with a `[variables]` table)
    #[arg(short = 'f', long)]
    vars: Option<PathBuf>,

    /// Inline variable binding, repeatable: -v key=value
    #[arg(short = 'v', long = "var", value_name = "KEY=VALUE")]
    var: Vec<String>,

    /// Treat input as a pipe-delimited table (header row passes through)
    #[arg(short, long)]
    table: bool,

    /// Resolve static variables only; skip providers and expressions
    #[arg(short, long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let mut resolver = Resolver::new()
        .with_processors(string_processors())
        .with_dry_run(cli.dry_run);

    // Load the variables file
    if let Some(path) = &cli.vars {
        match VariablesFile::from_file(path) {
            Ok(file) => resolver = resolver.with_store(file.into_store()),
            Err(e) => {
                eprintln!("Error loading variables '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    // Inline bindings override the file
    for binding in &cli.var {
        match binding.split_once('=') {
            Some((key, value)) => {
                resolver = resolver.with_variable(key, Value::from(value));
            }
            None => {
                eprintln!("Error: invalid binding '{}', expected KEY=VALUE", binding);
                std::process::exit(1);
            }
        }
    }

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let result = if cli.table {
        resolver.resolve_table(&source)
    } else {
        resolver.resolve_to_string(&source)
    };

    match result {
        Ok(resolved) => {
            println!("{}", resolved);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Placefill - resolve ${{variable}} and #{{expression(...)}} placeholders

USAGE:
    placefill [OPTIONS] [FILE]
    echo '<text>' | placefill

OPTIONS:
    -f, --vars <FILE>      Variables file (TOML, `[variables]` table)
    -v, --var KEY=VALUE    Inline variable binding (repeatable)
    -t, --table            Treat input as a pipe-delimited table
    -d, --dry-run          Static substitution only
    -h, --help             Print help

QUICK START:
    echo 'hello ${{name}}' | placefill -v name=world
    echo '#{{toUpperCase(${{name}})}}' | placefill -v name=world

Variable references look like ${{name}} or ${{name:default}}; expression
invocations like #{{trim( text )}}. Anything that does not resolve is left
in the output unchanged."#
    );
}
