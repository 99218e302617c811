//! relayc — compiler for the Relay sensor/actuator automation language.
//!
//! Relay programs declare devices (optionally binding an observation
//! variable) and then issue period-terminated commands: attributions,
//! conditionals, and actions. The compiler lowers a program to Python
//! source against a four-function runtime API: `turnOn`, `turnOff`,
//! `alert`, `alertWithValue`.
//!
//! Pipeline: lexer → parser (with panic-mode error recovery) → AST →
//! code generator. Each compile is a one-shot batch operation over the
//! whole input; nothing survives between calls.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use error::{CompileError, ErrorKind};

use lexer::Lexer;
use parser::Parser;
use token::Token;

/// A successful compile: the generated Python text plus any non-fatal
/// lexical diagnostics (illegal characters that the parser could still
/// derive a valid program around).
#[derive(Debug, Clone)]
pub struct Compiled {
    pub code: String,
    pub warnings: Vec<CompileError>,
}

/// The Relay compiler facade.
///
/// All entry points are associated functions building fresh lexer and
/// parser state per call, so concurrent compiles from separate threads
/// never share anything.
pub struct Compiler;

impl Compiler {
    /// Scan source text into a token stream plus lexical diagnostics.
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<CompileError>) {
        Lexer::new(source).tokenize()
    }

    /// Parse source text into a [`Program`].
    ///
    /// Succeeds whenever the token stream derives a valid program,
    /// even past skipped illegal characters; use [`Compiler::compile`]
    /// to also surface those as warnings. On failure the error list
    /// contains every diagnostic found in the input, lexical and
    /// syntactic, ordered by line.
    pub fn parse(source: &str) -> Result<Program, Vec<CompileError>> {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        match Parser::new(tokens).parse() {
            Ok(program) => Ok(program),
            Err(syntax_errors) => Err(merge(lex_errors, syntax_errors)),
        }
    }

    /// Compile source text to Python.
    ///
    /// Illegal characters alone do not fail the compile: when the
    /// remaining tokens still derive a valid program, they are returned
    /// as warnings alongside the generated code. Any syntax error fails
    /// the compile, and no text is emitted.
    pub fn compile(source: &str) -> Result<Compiled, Vec<CompileError>> {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        match Parser::new(tokens).parse() {
            Ok(program) => Ok(Compiled {
                code: codegen::generate(&program),
                warnings: lex_errors,
            }),
            Err(syntax_errors) => Err(merge(lex_errors, syntax_errors)),
        }
    }
}

fn merge(lex: Vec<CompileError>, syntax: Vec<CompileError>) -> Vec<CompileError> {
    let mut errors = lex;
    errors.extend(syntax);
    errors.sort_by_key(|e| e.line);
    errors
}
