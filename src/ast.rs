//! Abstract syntax tree for the Relay language.
//!
//! A strictly owned, immutable tree: the parser builds one [`Program`]
//! per compile and the code generator walks it read-only. `Display`
//! reconstructs source-form statement text, which the generator uses
//! for its echo comments.

use std::fmt;

use crate::token::RelOp;

/// A complete Relay program: at least one device declaration followed
/// by at least one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub devices: Vec<DeviceDecl>,
    pub commands: Vec<Command>,
}

/// A device binding, optionally attaching an observation variable.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDecl {
    pub name: String,
    pub observation: Option<String>,
    pub line: usize,
}

/// One period-terminated source statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Attribution(Attribution),
    Conditional(Conditional),
    Action(Action),
}

/// `set <observation> = <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub observation: String,
    pub value: Literal,
}

/// `if <condition> then <action> [else <action>]`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Condition,
    pub then_action: Action,
    pub else_action: Option<Action>,
}

/// A chain of comparisons with no operator precedence.
///
/// Each link carries the combinator that joins it to the *next* link,
/// so the chain reads as a right-fold: `a && b || c` means
/// `a && (b || c)`. Modeled as a flat non-empty sequence rather than a
/// binary tree so lowering cannot accidentally reassociate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub links: Vec<Observation>,
}

/// One comparison link of a condition chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub op: RelOp,
    pub value: Literal,
    /// Combinator joining this link to the next one; `None` on the
    /// final link.
    pub combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Simple(SimpleAction),
    Alert(AlertAction),
    Broadcast(BroadcastAlertAction),
}

/// `turnOn <device>` / `turnOff <device>`
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleAction {
    pub toggle: Toggle,
    pub device: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

/// `send alert (<message>[, <observation>]) <device>`
#[derive(Debug, Clone, PartialEq)]
pub struct AlertAction {
    pub message: String,
    pub device: String,
    pub observation: Option<String>,
}

/// `send alert (<message>) for all : <device>, ...`
///
/// Lowered to one alert call per device, never a batched call. The
/// device list is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastAlertAction {
    pub message: String,
    pub devices: Vec<String>,
}

/// A typed constant: integer or boolean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

impl Program {
    /// Indented AST dump for debugging (`--emit-ast`).
    pub fn pretty(&self) -> String {
        let mut out = String::from("Program\n  devices:\n");
        for d in &self.devices {
            match &d.observation {
                Some(obs) => out.push_str(&format!("    Device {} (observation: {obs})\n", d.name)),
                None => out.push_str(&format!("    Device {}\n", d.name)),
            }
        }
        out.push_str("  commands:\n");
        for c in &self.commands {
            out.push_str(&format!("    [line {}] {}\n", c.line, c));
        }
        out
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("&&"),
            Combinator::Or => f.write_str("||"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for link in &self.links {
            write!(f, "{} {} {}", link.name, link.op, link.value)?;
            if let Some(comb) = link.combinator {
                write!(f, " {comb} ")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Simple(a) => {
                let verb = match a.toggle {
                    Toggle::On => "turnOn",
                    Toggle::Off => "turnOff",
                };
                write!(f, "{verb} {}", a.device)
            }
            Action::Alert(a) => match &a.observation {
                Some(obs) => write!(f, "send alert (\"{}\", {obs}) {}", a.message, a.device),
                None => write!(f, "send alert (\"{}\") {}", a.message, a.device),
            },
            Action::Broadcast(a) => write!(
                f,
                "send alert (\"{}\") for all : {}",
                a.message,
                a.devices.join(", ")
            ),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Attribution(a) => write!(f, "set {} = {}", a.observation, a.value),
            CommandKind::Conditional(c) => {
                write!(f, "if {} then {}", c.condition, c.then_action)?;
                if let Some(e) = &c.else_action {
                    write!(f, " else {e}")?;
                }
                Ok(())
            }
            CommandKind::Action(a) => write!(f, "{a}"),
        }
    }
}
