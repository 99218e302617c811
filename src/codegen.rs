//! Code generator for the Relay compiler.
//!
//! Lowers a parsed [`Program`] into Python source text targeting the
//! four-function runtime API (`turnOn`, `turnOff`, `alert`,
//! `alertWithValue`). Generation is total over well-formed programs:
//! the same AST always produces byte-identical output, and all state
//! (buffer, indent, declared-name set) lives for a single call.

use crate::ast::*;

const INDENT: &str = "    ";

struct Generator {
    out: String,
    indent: usize,
}

/// Lower a program to Python source text.
pub fn generate(program: &Program) -> String {
    let mut g = Generator {
        out: String::new(),
        indent: 0,
    };
    g.emit_header();
    g.emit_main(program);
    g.emit_trailer();
    g.out
}

impl Generator {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn emit_header(&mut self) {
        self.line("# Generated by relayc. Do not edit: this file is rewritten on every compile.");
        self.line("# Source statements appear as comments above the code they produced.");
        self.blank();
        self.line("from functions import turnOn, turnOff, alert, alertWithValue");
        self.blank();
        self.blank();
    }

    fn emit_main(&mut self, program: &Program) {
        self.line("def main():");
        self.indent += 1;

        // One declaration per bound observation, declaration order,
        // deduplicated by name.
        let mut declared: Vec<&str> = Vec::new();
        for device in &program.devices {
            if let Some(obs) = &device.observation {
                if !declared.contains(&obs.as_str()) {
                    declared.push(obs);
                }
            }
        }
        for name in &declared {
            self.line(&format!("{name} = None  # unset"));
        }
        if !declared.is_empty() {
            self.blank();
        }

        for command in &program.commands {
            self.line(&format!("# {command}"));
            match &command.kind {
                CommandKind::Attribution(a) => {
                    self.line(&format!("{} = {}", a.observation, py_literal(&a.value)));
                }
                CommandKind::Conditional(c) => self.emit_conditional(c),
                CommandKind::Action(a) => self.emit_action(a),
            }
        }

        self.indent -= 1;
        self.blank();
    }

    fn emit_conditional(&mut self, cond: &Conditional) {
        self.line(&format!("if {}:", lower_condition(&cond.condition.links)));
        self.indent += 1;
        self.emit_action(&cond.then_action);
        self.indent -= 1;
        if let Some(else_action) = &cond.else_action {
            self.line("else:");
            self.indent += 1;
            self.emit_action(else_action);
            self.indent -= 1;
        }
    }

    fn emit_action(&mut self, action: &Action) {
        match action {
            Action::Simple(a) => {
                let func = match a.toggle {
                    Toggle::On => "turnOn",
                    Toggle::Off => "turnOff",
                };
                self.line(&format!("{func}(\"{}\")", a.device));
            }
            Action::Alert(a) => match &a.observation {
                Some(obs) => self.line(&format!(
                    "alertWithValue(\"{}\", \"{}\", str({obs}))",
                    a.device, a.message
                )),
                None => self.line(&format!("alert(\"{}\", \"{}\")", a.device, a.message)),
            },
            Action::Broadcast(a) => {
                // One independent call per device, in list order.
                for device in &a.devices {
                    self.line(&format!("alert(\"{device}\", \"{}\")", a.message));
                }
            }
        }
    }

    fn emit_trailer(&mut self) {
        self.blank();
        self.line("if __name__ == \"__main__\":");
        self.indent += 1;
        self.line("main()");
        self.indent -= 1;
    }
}

fn py_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) => n.to_string(),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
    }
}

fn py_combinator(comb: Combinator) -> &'static str {
    match comb {
        Combinator::And => "and",
        Combinator::Or => "or",
    }
}

/// Lower a condition chain to Python boolean text.
///
/// The chain is a right-fold: each link binds to everything after it.
/// Python's `and`/`or` associate the other way, so a tail that still
/// contains a combinator is parenthesized to keep the chain's grouping.
/// A two-link chain therefore stays flat (`a > 1 and b > 2`), while
/// `a > 1 && b > 2 || c > 3` becomes `a > 1 and (b > 2 or c > 3)`.
fn lower_condition(links: &[Observation]) -> String {
    let (first, rest) = match links.split_first() {
        Some(split) => split,
        None => return String::new(),
    };
    let comparison = format!("{} {} {}", first.name, first.op, py_literal(&first.value));
    match first.combinator {
        None => comparison,
        Some(comb) => {
            let tail = lower_condition(rest);
            if rest.len() > 1 {
                format!("{comparison} {} ({tail})", py_combinator(comb))
            } else {
                format!("{comparison} {} {tail}", py_combinator(comb))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(source: &str) -> String {
        let (tokens, errors) = Lexer::new(source).tokenize();
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        let program = match Parser::new(tokens).parse() {
            Ok(p) => p,
            Err(errors) => panic!("parse errors: {errors:?}"),
        };
        generate(&program)
    }

    #[test]
    fn header_imports_runtime_api() {
        let code = compile("device : s, temp\nset temp = 1.");
        assert!(code.contains("from functions import turnOn, turnOff, alert, alertWithValue"));
        assert!(code.contains("def main():"));
    }

    #[test]
    fn trailer_invokes_entry_point() {
        let code = compile("device : s, temp\nset temp = 1.");
        assert!(code.ends_with("if __name__ == \"__main__\":\n    main()\n"));
    }

    #[test]
    fn observation_declarations_in_order_and_deduplicated() {
        let code = compile(
            "device : a, temp\ndevice : b, humidity\ndevice : c, temp\nset temp = 1.",
        );
        let temp_decl = code.find("temp = None  # unset").unwrap();
        let hum_decl = code.find("humidity = None  # unset").unwrap();
        assert!(temp_decl < hum_decl);
        assert_eq!(code.matches("temp = None  # unset").count(), 1);
    }

    #[test]
    fn integer_literal_renders_as_decimal() {
        let code = compile("device : s, temp\nset temp = 25.");
        assert!(code.contains("temp = 25\n"));
    }

    #[test]
    fn boolean_literal_renders_as_python_keyword() {
        let code = compile("device : s, status\nset status = true.\nset status = false.");
        assert!(code.contains("status = True\n"));
        assert!(code.contains("status = False\n"));
        assert!(!code.contains("status = true\n"));
    }

    #[test]
    fn echo_comment_precedes_each_command() {
        let code = compile("device : s, temp\nset temp = 25.\nif temp > 30 then turnOn s.");
        assert!(code.contains("# set temp = 25"));
        assert!(code.contains("# if temp > 30 then turnOn s"));
        let comment = code.find("# set temp = 25").unwrap();
        let stmt = code.find("    temp = 25").unwrap();
        assert!(comment < stmt);
    }

    #[test]
    fn simple_actions_lower_to_runtime_calls() {
        let code = compile("device : led1\nturnOn led1.\nturnOff led1.");
        assert!(code.contains("turnOn(\"led1\")"));
        assert!(code.contains("turnOff(\"led1\")"));
    }

    #[test]
    fn conditional_without_else_has_no_else_branch() {
        let code = compile("device : s, temp\nif temp > 20 then turnOn s.");
        assert!(code.contains("if temp > 20:"));
        assert!(!code.contains("else:"));
    }

    #[test]
    fn conditional_with_else_has_both_branches() {
        let code = compile("device : s, temp\nif temp > 25 then turnOn s else turnOff s.");
        assert!(code.contains("if temp > 25:"));
        assert!(code.contains("    else:"));
        assert!(code.contains("turnOff(\"s\")"));
    }

    #[test]
    fn two_link_chain_lowers_flat() {
        let code = compile("device : s, temp\nif temp > 20 && temp < 30 then turnOn s.");
        assert!(code.contains("if temp > 20 and temp < 30:"));
    }

    #[test]
    fn mixed_chain_keeps_right_fold_grouping() {
        let code =
            compile("device : s, a\nif a > 1 && a > 2 || a > 3 then turnOn s.");
        assert!(code.contains("if a > 1 and (a > 2 or a > 3):"));
    }

    #[test]
    fn alert_without_observation_uses_plain_call() {
        let code = compile("device : sensor1\nsend alert (\"Test message\") sensor1.");
        assert!(code.contains("alert(\"sensor1\", \"Test message\")"));
    }

    #[test]
    fn alert_with_observation_stringifies_value() {
        let code = compile("device : sensor1, temp\nsend alert (\"Temp value\", temp) sensor1.");
        assert!(code.contains("alertWithValue(\"sensor1\", \"Temp value\", str(temp))"));
    }

    #[test]
    fn broadcast_emits_one_call_per_device_in_order() {
        let code = compile(
            "device : a\ndevice : b\ndevice : c\nsend alert (\"Emergency\") for all : a, b, c.",
        );
        let pa = code.find("alert(\"a\", \"Emergency\")").unwrap();
        let pb = code.find("alert(\"b\", \"Emergency\")").unwrap();
        let pc = code.find("alert(\"c\", \"Emergency\")").unwrap();
        assert!(pa < pb && pb < pc);
        assert_eq!(code.matches("\"Emergency\"").count(), 4); // echo comment + 3 calls
    }

    #[test]
    fn broadcast_of_one_device_emits_exactly_one_call() {
        let code = compile("device : a\nsend alert (\"ping\") for all : a.");
        assert_eq!(code.matches("alert(\"a\", \"ping\")").count(), 1);
    }

    #[test]
    fn generation_is_deterministic() {
        let source = "device : s, temp\ndevice : led1\nset temp = 25.\nif temp > 20 then turnOn led1.";
        assert_eq!(compile(source), compile(source));
    }
}
