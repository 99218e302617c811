//! Token types for the Relay lexer.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Device,
    Set,
    If,
    Then,
    Else,
    Send,
    Alert,
    For,
    All,
    TurnOn,
    TurnOff,

    // Combinators joining condition links
    AndAnd, // &&
    OrOr,   // ||

    // Relational operators
    Op(RelOp),

    // Delimiters
    Colon,
    Dot,
    Comma,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,

    // Literals and identifiers
    Int(i64),
    Bool(bool),
    Msg(String),
    Ident(String),

    // Special
    Eof,
}

/// A relational operator in a condition link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq, // ==
    Ne, // !=
    Lt, // <
    Gt, // >
    Le, // <=
    Ge, // >=
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

impl fmt::Display for TokenKind {
    /// Source-form rendering, used in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Device => f.write_str("'device'"),
            TokenKind::Set => f.write_str("'set'"),
            TokenKind::If => f.write_str("'if'"),
            TokenKind::Then => f.write_str("'then'"),
            TokenKind::Else => f.write_str("'else'"),
            TokenKind::Send => f.write_str("'send'"),
            TokenKind::Alert => f.write_str("'alert'"),
            TokenKind::For => f.write_str("'for'"),
            TokenKind::All => f.write_str("'all'"),
            TokenKind::TurnOn => f.write_str("'turnOn'"),
            TokenKind::TurnOff => f.write_str("'turnOff'"),
            TokenKind::AndAnd => f.write_str("'&&'"),
            TokenKind::OrOr => f.write_str("'||'"),
            TokenKind::Op(op) => write!(f, "'{op}'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::Int(n) => write!(f, "number {n}"),
            TokenKind::Bool(b) => write!(f, "'{b}'"),
            TokenKind::Msg(s) => write!(f, "message \"{s}\""),
            TokenKind::Ident(s) => write!(f, "'{s}'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
