use crate::sort::Sort;
use crate::term::Term;

/// A top-level SMT-LIB2 command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetLogic(String),
    /// `(set-option :<keyword> <value>)`
    SetOption(String, String),
    DeclareConst(String, Sort),
    Assert(Term),
    CheckSat,
    GetModel,
    /// Printed as a `;;` line, which solvers skip.
    Comment(String),
    Exit,
}

impl Command {
    /// `(set-option :produce-models true)`
    pub fn produce_models() -> Self {
        Command::SetOption("produce-models".to_string(), "true".to_string())
    }
}
