//! Translation of typed expressions into SMT-LIB2 terms and scripts.

use typefuzz_smtlib::{Command, Op, Script, Sort as SmtSort, Term};

use crate::expr::{BinaryOp, Expr, ExprKind, Literal, Sort, UnaryOp, Variable};

pub fn to_smt_sort(sort: Sort) -> SmtSort {
    match sort {
        Sort::Integer => SmtSort::Int,
        Sort::Boolean => SmtSort::Bool,
    }
}

/// Encode an expression tree as an untyped SMT-LIB term.
pub fn to_term(expr: &Expr) -> Term {
    match expr.kind() {
        ExprKind::Literal(Literal::Int(n)) => Term::Int(i128::from(*n)),
        ExprKind::Literal(Literal::Bool(b)) => Term::Bool(*b),
        ExprKind::Variable(v) => Term::symbol(v.name()),
        ExprKind::Unary(op, operand) => Term::unary(unary_op(*op), to_term(operand)),
        ExprKind::Binary(op, left, right) => {
            Term::binary(binary_op(*op), to_term(left), to_term(right))
        }
    }
}

fn unary_op(op: UnaryOp) -> Op {
    match op {
        UnaryOp::Neg => Op::Neg,
        UnaryOp::Not => Op::Not,
    }
}

fn binary_op(op: BinaryOp) -> Op {
    match op {
        BinaryOp::Add => Op::Add,
        BinaryOp::Sub => Op::Sub,
        BinaryOp::Mul => Op::Mul,
        BinaryOp::Div => Op::Div,
        BinaryOp::Mod => Op::Mod,
        BinaryOp::Lt => Op::Lt,
        BinaryOp::Le => Op::Le,
        BinaryOp::Gt => Op::Gt,
        BinaryOp::Ge => Op::Ge,
        BinaryOp::And => Op::And,
        BinaryOp::Or => Op::Or,
        BinaryOp::Xor => Op::Xor,
        BinaryOp::Implies => Op::Implies,
        BinaryOp::Eq | BinaryOp::Iff => Op::Eq,
    }
}

pub fn declare(variable: &Variable) -> Command {
    Command::DeclareConst(variable.name().to_string(), to_smt_sort(variable.sort()))
}

pub fn assert(expr: &Expr) -> Command {
    Command::Assert(to_term(expr))
}

/// Whether the tree falls outside linear integer arithmetic.
///
/// A product is linear only when at least one side is a literal; `div` and
/// `mod` are always treated as non-linear.
pub fn is_nonlinear(expr: &Expr) -> bool {
    let mut nonlinear = false;
    expr.walk(&mut |node| {
        if let ExprKind::Binary(op, left, right) = node.kind() {
            nonlinear |= match op {
                BinaryOp::Div | BinaryOp::Mod => true,
                BinaryOp::Mul => !is_literal(left) && !is_literal(right),
                _ => false,
            };
        }
    });
    nonlinear
}

fn is_literal(expr: &Expr) -> bool {
    matches!(expr.kind(), ExprKind::Literal(_))
}

/// The narrowest logic covering a set of assertions.
pub fn logic_for<'a>(assertions: impl IntoIterator<Item = &'a Expr>) -> &'static str {
    if assertions.into_iter().any(is_nonlinear) {
        "QF_NIA"
    } else {
        "QF_LIA"
    }
}

/// Build a complete, self-contained script.
///
/// The result does not end with `(check-sat)`; callers append it together
/// with `(get-model)` as needed.
pub fn script<'a>(
    variables: impl IntoIterator<Item = &'a Variable>,
    assertions: &[Expr],
    produce_models: bool,
) -> Script {
    let mut script = Script::new();
    if produce_models {
        script.push(Command::produce_models());
    }
    script.push(Command::SetLogic(logic_for(assertions).to_string()));
    script.extend(variables.into_iter().map(declare));
    script.extend(assertions.iter().map(assert));
    script
}
