//! Parser for the Relay language.
//!
//! Recursive descent over the token stream, producing a [`Program`].
//! Syntax errors do not abort the parse: after recording a diagnostic
//! the parser discards tokens until it reaches a statement-starting
//! keyword (the synchronization set) and resumes, so a single parse
//! reports every error in the input.

use crate::ast::*;
use crate::error::CompileError;
use crate::token::{RelOp, Token, TokenKind};

/// A single-use parse session. `parse` consumes the parser, so no
/// cursor or error state can leak into a later compile.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<CompileError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        if self.tokens.iter().all(|t| t.kind == TokenKind::Eof) {
            return Err(vec![CompileError::empty_input()]);
        }

        let mut devices = Vec::new();
        let mut commands = Vec::new();

        while self.check(&TokenKind::Device) {
            let start = self.pos;
            match self.parse_device() {
                Ok(d) => devices.push(d),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                    if self.pos == start {
                        self.advance();
                    }
                }
            }
        }

        while !self.is_at_end() {
            let start = self.pos;
            match self.parse_command() {
                Ok(c) => commands.push(c),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                    if self.pos == start {
                        // The offending token is itself a sync point
                        // (e.g. a 'device' after the first command);
                        // step over it so the parse makes progress.
                        self.advance();
                    }
                }
            }
        }

        if devices.is_empty() {
            let line = self.tokens.first().map_or(1, |t| t.line);
            self.errors.push(CompileError::syntax(
                "a program must declare at least one device",
                line,
            ));
        }
        if commands.is_empty() {
            self.errors.push(CompileError::syntax(
                "a program must contain at least one command",
                self.peek().line,
            ));
        }

        if self.errors.is_empty() {
            Ok(Program { devices, commands })
        } else {
            Err(self.errors)
        }
    }

    /// `device ':' name (',' observation)?` — with or without braces
    /// around the name part.
    fn parse_device(&mut self) -> Result<DeviceDecl, CompileError> {
        let line = self.peek().line;
        self.advance(); // 'device'
        self.expect(&TokenKind::Colon, "':' after 'device'")?;

        let braced = self.check(&TokenKind::LBrace);
        if braced {
            self.advance();
        }

        let name = self.expect_ident("a device name")?;
        let observation = if self.check(&TokenKind::Comma) {
            self.advance();
            Some(self.expect_ident("an observation name")?)
        } else {
            None
        };

        if braced {
            self.expect(&TokenKind::RBrace, "'}' to close the device declaration")?;
        }

        Ok(DeviceDecl {
            name,
            observation,
            line,
        })
    }

    fn parse_command(&mut self) -> Result<Command, CompileError> {
        let line = self.peek().line;
        let head = self.peek().kind.clone();
        let kind = match head {
            TokenKind::Set => CommandKind::Attribution(self.parse_attribution()?),
            TokenKind::If => CommandKind::Conditional(self.parse_conditional()?),
            TokenKind::TurnOn | TokenKind::TurnOff | TokenKind::Send => {
                CommandKind::Action(self.parse_action()?)
            }
            other => {
                return Err(CompileError::syntax(
                    format!("expected a command, found {other}"),
                    line,
                ));
            }
        };
        self.expect_dot()?;
        Ok(Command { kind, line })
    }

    /// `set observation '=' literal`
    fn parse_attribution(&mut self) -> Result<Attribution, CompileError> {
        self.advance(); // 'set'
        let observation = self.expect_ident("an observation name after 'set'")?;
        self.expect(&TokenKind::Eq, "'=' after the observation name")?;
        let value = self.expect_literal()?;
        Ok(Attribution { observation, value })
    }

    /// `if condition then action (else action)?`
    fn parse_conditional(&mut self) -> Result<Conditional, CompileError> {
        self.advance(); // 'if'
        let condition = self.parse_condition()?;
        self.expect(&TokenKind::Then, "'then' after the condition")?;
        let then_action = self.parse_action()?;
        let else_action = if self.check(&TokenKind::Else) {
            self.advance();
            Some(self.parse_action()?)
        } else {
            None
        };
        Ok(Conditional {
            condition,
            then_action,
            else_action,
        })
    }

    /// A chain of comparisons joined by `&&`/`||`. Each link records
    /// the combinator to the next link; the last link records none.
    fn parse_condition(&mut self) -> Result<Condition, CompileError> {
        let mut links = Vec::new();
        loop {
            let name = self.expect_ident("an observation name in the condition")?;
            let op = self.expect_relop()?;
            let value = self.expect_literal()?;
            let combinator = match self.peek().kind {
                TokenKind::AndAnd => Some(Combinator::And),
                TokenKind::OrOr => Some(Combinator::Or),
                _ => None,
            };
            if combinator.is_some() {
                self.advance();
            }
            let done = combinator.is_none();
            links.push(Observation {
                name,
                op,
                value,
                combinator,
            });
            if done {
                break;
            }
        }
        Ok(Condition { links })
    }

    fn parse_action(&mut self) -> Result<Action, CompileError> {
        let line = self.peek().line;
        let head = self.peek().kind.clone();
        match head {
            TokenKind::TurnOn => {
                self.advance();
                let device = self.expect_ident("a device name after 'turnOn'")?;
                Ok(Action::Simple(SimpleAction {
                    toggle: Toggle::On,
                    device,
                }))
            }
            TokenKind::TurnOff => {
                self.advance();
                let device = self.expect_ident("a device name after 'turnOff'")?;
                Ok(Action::Simple(SimpleAction {
                    toggle: Toggle::Off,
                    device,
                }))
            }
            TokenKind::Send => self.parse_alert(),
            other => Err(CompileError::syntax(
                format!("expected an action, found {other}"),
                line,
            )),
        }
    }

    /// `send alert '(' message (',' observation)? ')'` followed by
    /// either a single device name or `for all ':' device-list`.
    fn parse_alert(&mut self) -> Result<Action, CompileError> {
        self.advance(); // 'send'
        self.expect(&TokenKind::Alert, "'alert' after 'send'")?;
        self.expect(&TokenKind::LParen, "'(' after 'alert'")?;
        let message = self.expect_msg()?;
        let observation = if self.check(&TokenKind::Comma) {
            self.advance();
            Some(self.expect_ident("an observation name after the message")?)
        } else {
            None
        };
        self.expect(&TokenKind::RParen, "')' to close the alert arguments")?;

        if self.check(&TokenKind::For) {
            self.advance();
            self.expect(&TokenKind::All, "'all' after 'for'")?;
            self.expect(&TokenKind::Colon, "':' after 'for all'")?;
            let mut devices = vec![self.expect_ident("a device name in the broadcast list")?];
            while self.check(&TokenKind::Comma) {
                self.advance();
                devices.push(self.expect_ident("a device name after ','")?);
            }
            // An observation before 'for all' is accepted but carries
            // no value into the broadcast lowering.
            Ok(Action::Broadcast(BroadcastAlertAction { message, devices }))
        } else {
            let device = self.expect_ident("a device name after the alert")?;
            Ok(Action::Alert(AlertAction {
                message,
                device,
                observation,
            }))
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Line of the most recently consumed token. Used to point a
    /// missing-period diagnostic at the statement it terminates rather
    /// than at whatever token follows.
    fn prev_line(&self) -> usize {
        if self.pos == 0 {
            self.peek().line
        } else {
            self.tokens[self.pos - 1].line
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(CompileError::syntax(
                format!("expected {what}, found {}", t.kind),
                t.line,
            ))
        }
    }

    fn expect_dot(&mut self) -> Result<(), CompileError> {
        if self.check(&TokenKind::Dot) {
            self.advance();
            return Ok(());
        }
        let found = self.peek().kind.clone();
        Err(CompileError::syntax(
            format!("missing '.' at the end of the command, found {found}"),
            self.prev_line(),
        ))
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, CompileError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        let t = self.peek();
        Err(CompileError::syntax(
            format!("expected {what}, found {}", t.kind),
            t.line,
        ))
    }

    fn expect_msg(&mut self) -> Result<String, CompileError> {
        if let TokenKind::Msg(s) = &self.peek().kind {
            let s = s.clone();
            self.advance();
            return Ok(s);
        }
        let t = self.peek();
        Err(CompileError::syntax(
            format!("expected a quoted message, found {}", t.kind),
            t.line,
        ))
    }

    fn expect_relop(&mut self) -> Result<RelOp, CompileError> {
        let op = match self.peek().kind {
            TokenKind::Op(op) => Some(op),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            return Ok(op);
        }
        let t = self.peek();
        Err(CompileError::syntax(
            format!("expected a relational operator, found {}", t.kind),
            t.line,
        ))
    }

    fn expect_literal(&mut self) -> Result<Literal, CompileError> {
        let value = match self.peek().kind {
            TokenKind::Int(n) => Some(Literal::Int(n)),
            TokenKind::Bool(b) => Some(Literal::Bool(b)),
            _ => None,
        };
        if let Some(v) = value {
            self.advance();
            return Ok(v);
        }
        let t = self.peek();
        Err(CompileError::syntax(
            format!("expected a number or boolean literal, found {}", t.kind),
            t.line,
        ))
    }

    /// Discard tokens until one can start a declaration or command.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(
                self.peek().kind,
                TokenKind::Device
                    | TokenKind::Set
                    | TokenKind::If
                    | TokenKind::TurnOn
                    | TokenKind::TurnOff
                    | TokenKind::Send
            ) {
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Program, Vec<CompileError>> {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");
        Parser::new(tokens).parse()
    }

    fn parse_ok(source: &str) -> Program {
        match parse(source) {
            Ok(p) => p,
            Err(errors) => panic!("parse failed: {errors:?}"),
        }
    }

    fn parse_err(source: &str) -> Vec<CompileError> {
        match parse(source) {
            Ok(_) => panic!("expected parse errors"),
            Err(errors) => errors,
        }
    }

    #[test]
    fn parse_device_without_observation() {
        let p = parse_ok("device : sensor1\nset temp = 25.");
        assert_eq!(p.devices.len(), 1);
        assert_eq!(p.devices[0].name, "sensor1");
        assert_eq!(p.devices[0].observation, None);
    }

    #[test]
    fn parse_device_with_observation() {
        let p = parse_ok("device : sensor1, temperature\nset temperature = 20.");
        assert_eq!(p.devices[0].name, "sensor1");
        assert_eq!(p.devices[0].observation, Some("temperature".to_string()));
    }

    #[test]
    fn parse_braced_device_forms() {
        let p = parse_ok("device : { sensor1 }\ndevice : { led1, status }\nset status = true.");
        assert_eq!(p.devices.len(), 2);
        assert_eq!(p.devices[0].name, "sensor1");
        assert_eq!(p.devices[1].observation, Some("status".to_string()));
    }

    #[test]
    fn parse_attribution_int_and_bool() {
        let p = parse_ok("device : s, temp\nset temp = 25.\nset temp = true.");
        assert_eq!(p.commands.len(), 2);
        match &p.commands[0].kind {
            CommandKind::Attribution(a) => {
                assert_eq!(a.observation, "temp");
                assert_eq!(a.value, Literal::Int(25));
            }
            other => panic!("expected attribution, got {other:?}"),
        }
        match &p.commands[1].kind {
            CommandKind::Attribution(a) => assert_eq!(a.value, Literal::Bool(true)),
            other => panic!("expected attribution, got {other:?}"),
        }
    }

    #[test]
    fn parse_conditional_without_else() {
        let p = parse_ok("device : s, temp\ndevice : led1\nif temp > 30 then turnOn led1.");
        match &p.commands[0].kind {
            CommandKind::Conditional(c) => {
                assert_eq!(c.condition.links.len(), 1);
                assert_eq!(c.condition.links[0].op, RelOp::Gt);
                assert!(c.else_action.is_none());
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn parse_conditional_with_else() {
        let p = parse_ok("device : s, temp\ndevice : led1\nif temp > 30 then turnOn led1 else turnOff led1.");
        match &p.commands[0].kind {
            CommandKind::Conditional(c) => match c.else_action.as_ref() {
                Some(Action::Simple(a)) => {
                    assert_eq!(a.toggle, Toggle::Off);
                    assert_eq!(a.device, "led1");
                }
                other => panic!("expected simple else action, got {other:?}"),
            },
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn parse_condition_chain_right_linked() {
        let p = parse_ok("device : s, a\nif a > 1 && a > 2 || a > 3 then turnOn s.");
        match &p.commands[0].kind {
            CommandKind::Conditional(c) => {
                let links = &c.condition.links;
                assert_eq!(links.len(), 3);
                assert_eq!(links[0].combinator, Some(Combinator::And));
                assert_eq!(links[1].combinator, Some(Combinator::Or));
                assert_eq!(links[2].combinator, None);
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn parse_alert_without_observation() {
        let p = parse_ok("device : sensor1\nsend alert (\"hi\") sensor1.");
        match &p.commands[0].kind {
            CommandKind::Action(Action::Alert(a)) => {
                assert_eq!(a.message, "hi");
                assert_eq!(a.device, "sensor1");
                assert_eq!(a.observation, None);
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn parse_alert_with_observation() {
        let p = parse_ok("device : sensor1, temp\nsend alert (\"Temp value\", temp) sensor1.");
        match &p.commands[0].kind {
            CommandKind::Action(Action::Alert(a)) => {
                assert_eq!(a.observation, Some("temp".to_string()));
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn parse_broadcast_alert() {
        let p = parse_ok("device : a\ndevice : b\nsend alert (\"Emergency\") for all : a, b.");
        match &p.commands[0].kind {
            CommandKind::Action(Action::Broadcast(a)) => {
                assert_eq!(a.devices, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected broadcast, got {other:?}"),
        }
    }

    #[test]
    fn parse_broadcast_single_device_stays_broadcast() {
        let p = parse_ok("device : a\nsend alert (\"ping\") for all : a.");
        assert!(matches!(
            &p.commands[0].kind,
            CommandKind::Action(Action::Broadcast(b)) if b.devices.len() == 1
        ));
    }

    #[test]
    fn parse_broadcast_discards_observation() {
        let p = parse_ok("device : a, temp\nsend alert (\"t\", temp) for all : a.");
        assert!(matches!(
            &p.commands[0].kind,
            CommandKind::Action(Action::Broadcast(_))
        ));
    }

    #[test]
    fn missing_dot_reports_statement_line() {
        let errors = parse_err("device : s, temp\nset temp = 25\nset temp = 30.");
        assert!(errors
            .iter()
            .any(|e| e.kind == ErrorKind::SyntaxError && e.line == 2 && e.message.contains("'.'")));
    }

    #[test]
    fn missing_colon_in_device() {
        let errors = parse_err("device sensor1\nset temp = 25.");
        assert!(errors.iter().any(|e| e.message.contains("':'")));
    }

    #[test]
    fn missing_eq_in_attribution() {
        let errors = parse_err("device : s, temp\nset temp 25.");
        assert!(errors.iter().any(|e| e.message.contains("'='")));
    }

    #[test]
    fn recovery_collects_multiple_errors() {
        let errors = parse_err("device : s, temp\nset temp 25.\nset temp = \nturnOn s.");
        assert!(errors.len() >= 2, "expected at least two errors: {errors:?}");
    }

    #[test]
    fn recovery_keeps_later_commands() {
        // First command is broken; the parse still fails, but it must
        // have consumed the rest of the input without cascading forever.
        let errors = parse_err("device : s, temp\nset temp = 25\nif temp > 20 then turnOn s");
        assert!(!errors.is_empty());
    }

    #[test]
    fn empty_input_is_distinct_error() {
        let errors = parse_err("");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::EmptyInput);
    }

    #[test]
    fn missing_device_section() {
        let errors = parse_err("set temp = 25.");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("at least one device")));
    }

    #[test]
    fn missing_command_section() {
        let errors = parse_err("device : sensor1");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("at least one command")));
    }

    #[test]
    fn device_declaration_after_commands_is_error() {
        let errors = parse_err("device : s\nturnOn s.\ndevice : led1\nturnOff s.");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("expected a command")));
    }

    #[test]
    fn command_line_numbers_recorded() {
        let p = parse_ok("device : s, temp\nset temp = 25.\n\nturnOn s.");
        assert_eq!(p.commands[0].line, 2);
        assert_eq!(p.commands[1].line, 4);
    }
}
