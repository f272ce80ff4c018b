//! Ground evaluation of expressions under a solver model.
//!
//! Integer semantics follow SMT-LIB: unbounded integers (approximated with
//! checked `i128`), and `div`/`mod` with a non-negative remainder. Anything
//! that cannot be decided here (an unassigned variable, `i128` overflow,
//! division by zero, whose result SMT-LIB leaves to the solver) evaluates
//! to `None`.

use std::collections::HashMap;

use typefuzz_solver::Model;

use crate::expr::{BinaryOp, Expr, ExprKind, Literal, Sort, UnaryOp};

/// A ground value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i128),
    Bool(bool),
}

impl Value {
    pub fn sort(&self) -> Sort {
        match self {
            Value::Int(_) => Sort::Integer,
            Value::Bool(_) => Sort::Boolean,
        }
    }
}

/// Variable assignment used during evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    values: HashMap<String, Value>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    /// Read a solver model. Entries whose value is not a plain integer or
    /// Boolean literal are left out.
    pub fn from_model(model: &Model) -> Self {
        let mut assignment = Self::new();
        for (name, text) in model.iter() {
            match parse_value(text) {
                Some(value) => assignment.set(name, value),
                None => tracing::debug!(variable = name, value = text, "skipping unparseable model value"),
            }
        }
        assignment
    }
}

/// Parse an SMT-LIB value: `true`, `false`, `42`, `(- 42)`.
pub fn parse_value(text: &str) -> Option<Value> {
    let text = text.trim();
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let magnitude = inner.trim().strip_prefix('-')?.trim();
        return parse_numeral(magnitude)?.checked_neg().map(Value::Int);
    }
    parse_numeral(text).map(Value::Int)
}

fn parse_numeral(text: &str) -> Option<i128> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Evaluate `expr` under `assignment`, or `None` if undecidable here.
pub fn eval(expr: &Expr, assignment: &Assignment) -> Option<Value> {
    match expr.kind() {
        ExprKind::Literal(Literal::Int(n)) => Some(Value::Int(i128::from(*n))),
        ExprKind::Literal(Literal::Bool(b)) => Some(Value::Bool(*b)),
        ExprKind::Variable(v) => assignment
            .get(v.name())
            .filter(|value| value.sort() == v.sort()),
        ExprKind::Unary(op, operand) => {
            let value = eval(operand, assignment)?;
            match (op, value) {
                (UnaryOp::Neg, Value::Int(n)) => n.checked_neg().map(Value::Int),
                (UnaryOp::Not, Value::Bool(b)) => Some(Value::Bool(!b)),
                _ => None,
            }
        }
        ExprKind::Binary(op, left, right) => {
            let l = eval(left, assignment)?;
            let r = eval(right, assignment)?;
            match (l, r) {
                (Value::Int(a), Value::Int(b)) => eval_int(*op, a, b),
                (Value::Bool(a), Value::Bool(b)) => eval_bool(*op, a, b),
                _ => None,
            }
        }
    }
}

fn eval_int(op: BinaryOp, a: i128, b: i128) -> Option<Value> {
    let int = |n: Option<i128>| n.map(Value::Int);
    match op {
        BinaryOp::Add => int(a.checked_add(b)),
        BinaryOp::Sub => int(a.checked_sub(b)),
        BinaryOp::Mul => int(a.checked_mul(b)),
        BinaryOp::Div => int(a.checked_div_euclid(b)),
        BinaryOp::Mod => int(a.checked_rem_euclid(b)),
        BinaryOp::Lt => Some(Value::Bool(a < b)),
        BinaryOp::Le => Some(Value::Bool(a <= b)),
        BinaryOp::Gt => Some(Value::Bool(a > b)),
        BinaryOp::Ge => Some(Value::Bool(a >= b)),
        BinaryOp::Eq => Some(Value::Bool(a == b)),
        _ => None,
    }
}

fn eval_bool(op: BinaryOp, a: bool, b: bool) -> Option<Value> {
    let value = match op {
        BinaryOp::And => a && b,
        BinaryOp::Or => a || b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Implies => !a || b,
        BinaryOp::Iff => a == b,
        _ => return None,
    };
    Some(Value::Bool(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Variable;

    fn x() -> Expr {
        Expr::var(Variable::new("x0", Sort::Integer))
    }

    fn with_x(value: i128) -> Assignment {
        let mut a = Assignment::new();
        a.set("x0", Value::Int(value));
        a
    }

    #[test]
    fn parse_model_values() {
        assert_eq!(parse_value("17"), Some(Value::Int(17)));
        assert_eq!(parse_value("(- 17)"), Some(Value::Int(-17)));
        assert_eq!(parse_value(" ( -  4 ) "), Some(Value::Int(-4)));
        assert_eq!(parse_value("true"), Some(Value::Bool(true)));
        assert_eq!(parse_value("false"), Some(Value::Bool(false)));
        assert_eq!(
            parse_value("170141183460469231731687303715884105727"),
            Some(Value::Int(i128::MAX))
        );
        assert_eq!(parse_value("-3"), None);
        assert_eq!(parse_value("(/ 1 2)"), None);
        assert_eq!(parse_value("#x0f"), None);
        assert_eq!(parse_value(""), None);
    }

    #[test]
    fn from_model_skips_unparseable_entries() {
        let model = Model::from_iter(vec![
            ("x0", "(- 2)"),
            ("b0", "true"),
            ("f", "(lambda ((y Int)) y)"),
        ]);
        let a = Assignment::from_model(&model);
        assert_eq!(a.get("x0"), Some(Value::Int(-2)));
        assert_eq!(a.get("b0"), Some(Value::Bool(true)));
        assert_eq!(a.get("f"), None);
    }

    #[test]
    fn euclidean_division_and_modulo() {
        let cases = [(7, 2, 3, 1), (-7, 2, -4, 1), (7, -2, -3, 1), (-7, -2, 4, 1)];
        for (a, b, q, r) in cases {
            assert_eq!(eval_int(BinaryOp::Div, a, b), Some(Value::Int(q)), "{a} div {b}");
            assert_eq!(eval_int(BinaryOp::Mod, a, b), Some(Value::Int(r)), "{a} mod {b}");
        }
    }

    #[test]
    fn division_by_zero_is_undecided() {
        let e = Expr::binary(BinaryOp::Div, x(), Expr::int(0)).unwrap();
        assert_eq!(eval(&e, &with_x(5)), None);
        let e = Expr::binary(BinaryOp::Mod, x(), Expr::int(0)).unwrap();
        assert_eq!(eval(&e, &with_x(5)), None);
    }

    #[test]
    fn overflow_is_undecided() {
        let e = Expr::binary(BinaryOp::Mul, x(), x()).unwrap();
        assert_eq!(eval(&e, &with_x(i128::MAX)), None);
        let neg = Expr::unary(UnaryOp::Neg, x()).unwrap();
        assert_eq!(eval(&neg, &with_x(i128::MIN)), None);
    }

    #[test]
    fn sixty_four_bit_boundaries_do_not_wrap() {
        let sum = Expr::binary(BinaryOp::Add, x(), Expr::int(1)).unwrap();
        let gt = Expr::binary(BinaryOp::Gt, sum, x()).unwrap();
        assert_eq!(
            eval(&gt, &with_x(i128::from(i64::MAX))),
            Some(Value::Bool(true))
        );
    }

    #[test]
    fn missing_or_mistyped_variable_is_undecided() {
        let e = Expr::binary(BinaryOp::Lt, x(), Expr::int(0)).unwrap();
        assert_eq!(eval(&e, &Assignment::new()), None);

        let mut wrong = Assignment::new();
        wrong.set("x0", Value::Bool(true));
        assert_eq!(eval(&e, &wrong), None);
    }

    #[test]
    fn boolean_connectives() {
        let b = Expr::var(Variable::new("b0", Sort::Boolean));
        let mut a = Assignment::new();
        a.set("b0", Value::Bool(true));

        let check = |op: BinaryOp, rhs: bool, expected: bool| {
            let e = Expr::binary(op, b.clone(), Expr::bool(rhs)).unwrap();
            assert_eq!(eval(&e, &a), Some(Value::Bool(expected)), "{op} {rhs}");
        };
        check(BinaryOp::And, false, false);
        check(BinaryOp::Or, false, true);
        check(BinaryOp::Xor, true, false);
        check(BinaryOp::Implies, false, false);
        check(BinaryOp::Iff, true, true);
    }
}
