//! relayc — command-line front end for the Relay compiler.
//!
//! Reads a Relay source file, compiles it to Python, and writes the
//! result next to the input (or wherever `output` points). Diagnostics
//! go to stderr, one per line.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use relayc::Compiler;

#[derive(Parser)]
#[command(name = "relayc", version, about = "Compile Relay automation programs to Python")]
struct Args {
    /// Relay source file (.rly)
    input: PathBuf,

    /// Output path; defaults to the input with a .py extension
    output: Option<PathBuf>,

    /// Print the generated code to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Dump the token stream and exit
    #[arg(long)]
    emit_tokens: bool,

    /// Dump the parsed AST and exit
    #[arg(long)]
    emit_ast: bool,
}

fn main() {
    let args = Args::parse();

    let source = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("relayc: cannot read {}: {e}", args.input.display());
            process::exit(1);
        }
    };

    if args.emit_tokens {
        let (tokens, errors) = Compiler::tokenize(&source);
        for t in &tokens {
            println!("line {:>3} | {:?}", t.line, t.kind);
        }
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(if errors.is_empty() { 0 } else { 1 });
    }

    if args.emit_ast {
        match Compiler::parse(&source) {
            Ok(program) => print!("{}", program.pretty()),
            Err(errors) => {
                for e in &errors {
                    eprintln!("{e}");
                }
                process::exit(1);
            }
        }
        return;
    }

    match Compiler::compile(&source) {
        Ok(compiled) => {
            for w in &compiled.warnings {
                eprintln!("warning: {w}");
            }
            if args.stdout {
                print!("{}", compiled.code);
            } else {
                let output = args
                    .output
                    .unwrap_or_else(|| args.input.with_extension("py"));
                if let Err(e) = fs::write(&output, compiled.code) {
                    eprintln!("relayc: cannot write {}: {e}", output.display());
                    process::exit(1);
                }
                println!("wrote {}", output.display());
            }
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            eprintln!(
                "relayc: compilation failed with {} error{}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            );
            process::exit(1);
        }
    }
}
