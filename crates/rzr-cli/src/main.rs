use clap::{Parser, Subcommand};
use rzr_parser::{ParserResults, RazorParser};
use std::path::Path;

#[derive(Parser)]
#[command(name = "rzr")]
#[command(about = "rzr: inspect how templates are split into markup and code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the syntax tree of a template
    Parse {
        /// Input template file
        path: String,
    },

    /// Report diagnostics; exits with status 1 when there are any
    Check {
        /// Input template file
        path: String,
    },

    /// Print the chunk tree handed to code emitters
    Chunks {
        /// Input template file
        path: String,
    },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { path } => cmd_parse(&path),
        Command::Check { path } => cmd_check(&path),
        Command::Chunks { path } => cmd_chunks(&path),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse(path: &str) -> ParserResults {
    let source = read_source(path);
    let results = RazorParser::new().parse(&source);
    tracing::debug!(path, errors = results.errors.len(), "parsed");
    results
}

fn cmd_parse(path: &str) {
    let results = parse(path);
    print!("{}", results.document);
    for error in &results.errors {
        eprintln!("{path}: {error}");
    }
}

fn cmd_check(path: &str) {
    let results = parse(path);
    if results.success() {
        eprintln!("OK: {path}");
        return;
    }
    for error in &results.errors {
        eprintln!("{path}: {error}");
    }
    std::process::exit(1);
}

fn cmd_chunks(path: &str) {
    let results = parse(path);
    match rzr_codegen::build_chunk_tree(&results.document) {
        Ok(tree) => print!("{tree}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
