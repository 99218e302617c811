//! Lexer for the Relay language.
//!
//! Converts source text into a stream of [`Token`]s. Unrecognized
//! characters are reported and skipped rather than aborting the scan;
//! the parser decides whether the remaining stream still derives a
//! valid program.

use crate::error::CompileError;
use crate::token::{RelOp, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Scan the whole input. Returns the token stream (always terminated
    /// by [`TokenKind::Eof`]) together with any non-fatal diagnostics.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<CompileError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                });
                break;
            }

            let ch = self.peek();

            if ch == '\n' {
                self.advance();
                self.line += 1;
                continue;
            }

            match ch {
                ':' => tokens.push(self.single_char(TokenKind::Colon)),
                '.' => tokens.push(self.single_char(TokenKind::Dot)),
                ',' => tokens.push(self.single_char(TokenKind::Comma)),
                '(' => tokens.push(self.single_char(TokenKind::LParen)),
                ')' => tokens.push(self.single_char(TokenKind::RParen)),
                '{' => tokens.push(self.single_char(TokenKind::LBrace)),
                '}' => tokens.push(self.single_char(TokenKind::RBrace)),
                '=' => tokens.push(self.lex_eq()),
                '<' | '>' => tokens.push(self.lex_comparison()),
                '!' | '&' | '|' => match self.lex_pair(ch) {
                    Ok(t) => tokens.push(t),
                    Err(e) => errors.push(e),
                },
                '"' => match self.lex_message() {
                    Ok(t) => tokens.push(t),
                    Err(e) => errors.push(e),
                },
                '0'..='9' => match self.lex_number() {
                    Ok(t) => tokens.push(t),
                    Err(e) => errors.push(e),
                },
                'a'..='z' | 'A'..='Z' => tokens.push(self.lex_ident_or_keyword()),
                _ => {
                    errors.push(CompileError::illegal_char(
                        format!("illegal character '{ch}'"),
                        self.line,
                    ));
                    self.advance();
                }
            }
        }

        (tokens, errors)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        self.advance();
        Token { kind, line }
    }

    /// `==` is the relational operator, a lone `=` is assignment.
    fn lex_eq(&mut self) -> Token {
        let line = self.line;
        self.advance();
        if !self.is_at_end() && self.peek() == '=' {
            self.advance();
            Token {
                kind: TokenKind::Op(RelOp::Eq),
                line,
            }
        } else {
            Token {
                kind: TokenKind::Eq,
                line,
            }
        }
    }

    fn lex_comparison(&mut self) -> Token {
        let line = self.line;
        let first = self.advance();
        let has_eq = !self.is_at_end() && self.peek() == '=';
        if has_eq {
            self.advance();
        }
        let op = match (first, has_eq) {
            ('<', false) => RelOp::Lt,
            ('<', true) => RelOp::Le,
            ('>', false) => RelOp::Gt,
            (_, true) => RelOp::Ge,
            (_, false) => RelOp::Gt,
        };
        Token {
            kind: TokenKind::Op(op),
            line,
        }
    }

    /// Two-character tokens whose first character is meaningless alone:
    /// `!=`, `&&`, `||`.
    fn lex_pair(&mut self, first: char) -> Result<Token, CompileError> {
        let line = self.line;
        self.advance();
        let kind = match (first, self.peek_or_nul()) {
            ('!', '=') => TokenKind::Op(RelOp::Ne),
            ('&', '&') => TokenKind::AndAnd,
            ('|', '|') => TokenKind::OrOr,
            _ => {
                return Err(CompileError::illegal_char(
                    format!("illegal character '{first}'"),
                    line,
                ));
            }
        };
        self.advance();
        Ok(Token { kind, line })
    }

    fn peek_or_nul(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.peek()
        }
    }

    fn lex_message(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        self.advance(); // consume opening '"'
        let mut s = String::new();
        while !self.is_at_end() && self.peek() != '"' && self.peek() != '\n' {
            s.push(self.advance());
        }
        if self.is_at_end() || self.peek() == '\n' {
            return Err(CompileError::illegal_char(
                "unterminated message literal",
                line,
            ));
        }
        self.advance(); // consume closing '"'
        Ok(Token {
            kind: TokenKind::Msg(s),
            line,
        })
    }

    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let mut s = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance());
        }
        let value: i64 = s
            .parse()
            .map_err(|_| CompileError::illegal_char(format!("integer literal '{s}' out of range"), line))?;
        Ok(Token {
            kind: TokenKind::Int(value),
            line,
        })
    }

    /// Longest identifier match, then reserved-word reclassification.
    /// Both of the language's identifier shapes (letters-only device
    /// names, letter-then-alphanumeric observation names) land in the
    /// same `Ident` kind; the grammar assigns the role.
    fn lex_ident_or_keyword(&mut self) -> Token {
        let line = self.line;
        let mut s = String::new();
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            s.push(self.advance());
        }

        let kind = match s.as_str() {
            "device" => TokenKind::Device,
            "set" => TokenKind::Set,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "send" => TokenKind::Send,
            "alert" => TokenKind::Alert,
            "for" => TokenKind::For,
            "all" => TokenKind::All,
            "turnOn" => TokenKind::TurnOn,
            "turnOff" => TokenKind::TurnOff,
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            _ => TokenKind::Ident(s),
        };

        Token { kind, line }
    }
}
