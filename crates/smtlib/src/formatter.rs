//! SMT-LIB2 text output.
//!
//! `Display` for every AST type. Scripts print one command per line with no
//! trailing newline.

use std::fmt;

use crate::command::Command;
use crate::script::Script;
use crate::sort::Sort;
use crate::term::{Op, Term};

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sort::Bool => "Bool",
            Sort::Int => "Int",
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Bool(b) => write!(f, "{b}"),
            // SMT-LIB numerals are unsigned
            Term::Int(n) if *n < 0 => write!(f, "(- {})", n.unsigned_abs()),
            Term::Int(n) => write!(f, "{n}"),
            Term::Symbol(name) => f.write_str(name),
            Term::App(op, args) => {
                write!(f, "({op}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetLogic(logic) => write!(f, "(set-logic {logic})"),
            Command::SetOption(keyword, value) => write!(f, "(set-option :{keyword} {value})"),
            Command::DeclareConst(name, sort) => write!(f, "(declare-const {name} {sort})"),
            Command::Assert(term) => write!(f, "(assert {term})"),
            Command::CheckSat => f.write_str("(check-sat)"),
            Command::GetModel => f.write_str("(get-model)"),
            Command::Comment(text) => write!(f, ";; {text}"),
            Command::Exit => f.write_str("(exit)"),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands = self.commands().iter();
        if let Some(first) = commands.next() {
            write!(f, "{first}")?;
        }
        for command in commands {
            write!(f, "\n{command}")?;
        }
        Ok(())
    }
}
