//! Error types for the Relay compiler.

use std::fmt;

/// A diagnostic produced during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized character in the source. Non-fatal: the lexer skips
    /// the character and keeps scanning.
    IllegalCharacter,
    /// Unexpected or missing token, or an empty device/command section.
    SyntaxError,
    /// The source contained no tokens at all.
    EmptyInput,
}

impl CompileError {
    pub fn illegal_char(message: impl Into<String>, line: usize) -> Self {
        Self {
            kind: ErrorKind::IllegalCharacter,
            message: message.into(),
            line,
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
            line,
        }
    }

    pub fn empty_input() -> Self {
        Self {
            kind: ErrorKind::EmptyInput,
            message: "empty input: nothing to compile".to_string(),
            line: 0,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {:?}: {}", self.line, self.kind, self.message)
    }
}

impl std::error::Error for CompileError {}
