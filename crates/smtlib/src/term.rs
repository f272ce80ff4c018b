//! Untyped SMT-LIB2 terms.
//!
//! Terms carry no sort information; whoever builds them is responsible for
//! well-sortedness.

/// Function symbols from the Core and Ints theories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Not,
    And,
    Or,
    Xor,
    Implies,
    /// `=`, on either sort. Boolean `=` is the SMT-LIB spelling of iff.
    Eq,
    Add,
    Sub,
    Mul,
    /// Euclidean quotient.
    Div,
    /// Euclidean remainder, never negative.
    Mod,
    /// Unary minus. Prints as `-` like [`Op::Sub`].
    Neg,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Not => "not",
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
            Op::Implies => "=>",
            Op::Eq => "=",
            Op::Add => "+",
            Op::Sub | Op::Neg => "-",
            Op::Mul => "*",
            Op::Div => "div",
            Op::Mod => "mod",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Bool(bool),
    /// Integer numeral. Negative values print as `(- n)`.
    Int(i128),
    /// Reference to a declared constant.
    Symbol(String),
    /// Function application `(op args...)`.
    App(Op, Vec<Term>),
}

impl Term {
    pub fn symbol(name: impl Into<String>) -> Self {
        Term::Symbol(name.into())
    }

    pub fn unary(op: Op, arg: Term) -> Self {
        Term::App(op, vec![arg])
    }

    pub fn binary(op: Op, lhs: Term, rhs: Term) -> Self {
        Term::App(op, vec![lhs, rhs])
    }
}
