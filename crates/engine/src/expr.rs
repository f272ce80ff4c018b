//! Sort-checked expression trees.
//!
//! Every [`Expr`] carries its sort, fixed when the node is built. The only
//! way to build an operator node is through [`Expr::unary`] and
//! [`Expr::binary`], which reject operands whose sorts do not match the
//! operator's signature, so an ill-typed tree cannot be represented.

use std::fmt;

use serde::Serialize;

use crate::error::SortError;

/// The sort (type) of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sort {
    Integer,
    Boolean,
}

impl Sort {
    pub const ALL: [Sort; 2] = [Sort::Integer, Sort::Boolean];
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Integer => write!(f, "Int"),
            Sort::Boolean => write!(f, "Bool"),
        }
    }
}

/// A constant leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

impl Literal {
    pub fn sort(&self) -> Sort {
        match self {
            Literal::Int(_) => Sort::Integer,
            Literal::Bool(_) => Sort::Boolean,
        }
    }
}

/// A declared constant symbol such as `x0` or `b1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variable {
    name: String,
    sort: Sort,
}

impl Variable {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

/// Single-operand operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Integer negation.
    Neg,
    /// Boolean negation.
    Not,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 2] = [UnaryOp::Neg, UnaryOp::Not];

    /// `(operand, result)` sorts.
    pub fn signature(self) -> (Sort, Sort) {
        match self {
            UnaryOp::Neg => (Sort::Integer, Sort::Integer),
            UnaryOp::Not => (Sort::Boolean, Sort::Boolean),
        }
    }

    pub fn result_sort(self) -> Sort {
        self.signature().1
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Two-operand operators. Both operands always share one sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Int × Int → Int
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Int × Int → Bool
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    // Bool × Bool → Bool
    And,
    Or,
    Xor,
    Implies,
    Iff,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 15] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Eq,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Implies,
        BinaryOp::Iff,
    ];

    /// `(operand, result)` sorts.
    pub fn signature(self) -> (Sort, Sort) {
        use BinaryOp::*;
        match self {
            Add | Sub | Mul | Div | Mod => (Sort::Integer, Sort::Integer),
            Lt | Le | Gt | Ge | Eq => (Sort::Integer, Sort::Boolean),
            And | Or | Xor | Implies | Iff => (Sort::Boolean, Sort::Boolean),
        }
    }

    pub fn operand_sort(self) -> Sort {
        self.signature().0
    }

    pub fn result_sort(self) -> Sort {
        self.signature().1
    }

    /// `div` and `mod`, which are only generated when division is enabled.
    pub fn is_division(self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Mod)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Implies => "=>",
            BinaryOp::Iff => "iff",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A well-sorted expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    sort: Sort,
    kind: ExprKind,
}

/// Node shape. Read-only: build nodes through [`Expr`]'s constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal(Literal),
    Variable(Variable),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn literal(literal: Literal) -> Self {
        Self {
            sort: literal.sort(),
            kind: ExprKind::Literal(literal),
        }
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn var(variable: Variable) -> Self {
        Self {
            sort: variable.sort(),
            kind: ExprKind::Variable(variable),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Result<Self, SortError> {
        let (expected, result) = op.signature();
        if operand.sort != expected {
            return Err(SortError::Unary {
                op,
                expected,
                found: operand.sort,
            });
        }
        Ok(Self {
            sort: result,
            kind: ExprKind::Unary(op, Box::new(operand)),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Result<Self, SortError> {
        let (expected, result) = op.signature();
        if left.sort != expected || right.sort != expected {
            return Err(SortError::Binary {
                op,
                expected,
                left: left.sort,
                right: right.sort,
            });
        }
        Ok(Self {
            sort: result,
            kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
        })
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Length of the longest root-to-leaf path; leaves have height 0.
    pub fn height(&self) -> usize {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => 0,
            ExprKind::Unary(_, operand) => 1 + operand.height(),
            ExprKind::Binary(_, left, right) => 1 + left.height().max(right.height()),
        }
    }

    /// Visit every node in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => {}
            ExprKind::Unary(_, operand) => operand.walk(visit),
            ExprKind::Binary(_, left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
        }
    }

    /// Variables referenced by this tree, in first-occurrence order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut found: Vec<&Variable> = Vec::new();
        self.walk(&mut |node| {
            if let ExprKind::Variable(v) = &node.kind {
                if !found.contains(&v) {
                    found.push(v);
                }
            }
        });
        found
    }
}

/// Renders the SMT-LIB2 term, e.g. `(< x0 (- 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::encode::to_term(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var(Variable::new("x0", Sort::Integer))
    }

    fn b() -> Expr {
        Expr::var(Variable::new("b0", Sort::Boolean))
    }

    #[test]
    fn every_operator_has_a_symbol_and_signature() {
        for op in BinaryOp::ALL {
            assert!(!op.symbol().is_empty());
            let (operand, _) = op.signature();
            assert!(Sort::ALL.contains(&operand));
        }
        assert_eq!(UnaryOp::Neg.signature(), (Sort::Integer, Sort::Integer));
        assert_eq!(UnaryOp::Not.signature(), (Sort::Boolean, Sort::Boolean));
    }

    #[test]
    fn well_sorted_construction() {
        let sum = Expr::binary(BinaryOp::Add, x(), Expr::int(3)).unwrap();
        assert_eq!(sum.sort(), Sort::Integer);

        let cmp = Expr::binary(BinaryOp::Lt, sum, Expr::int(10)).unwrap();
        assert_eq!(cmp.sort(), Sort::Boolean);

        let conj = Expr::binary(BinaryOp::And, cmp, b()).unwrap();
        assert_eq!(conj.sort(), Sort::Boolean);
        assert_eq!(conj.height(), 3);
    }

    #[test]
    fn ill_sorted_binary_is_rejected() {
        let err = Expr::binary(BinaryOp::Add, x(), b()).unwrap_err();
        assert_eq!(
            err,
            SortError::Binary {
                op: BinaryOp::Add,
                expected: Sort::Integer,
                left: Sort::Integer,
                right: Sort::Boolean,
            }
        );
        assert!(Expr::binary(BinaryOp::And, x(), x()).is_err());
        assert!(Expr::binary(BinaryOp::Lt, b(), b()).is_err());
    }

    #[test]
    fn ill_sorted_unary_is_rejected() {
        assert!(Expr::unary(UnaryOp::Not, x()).is_err());
        assert!(Expr::unary(UnaryOp::Neg, b()).is_err());
        assert_eq!(
            Expr::unary(UnaryOp::Neg, x()).unwrap().sort(),
            Sort::Integer
        );
    }

    #[test]
    fn leaves_have_height_zero() {
        assert_eq!(Expr::int(5).height(), 0);
        assert_eq!(Expr::bool(true).height(), 0);
        assert_eq!(x().height(), 0);
    }

    #[test]
    fn variables_are_deduplicated_in_order() {
        let y = Expr::var(Variable::new("x1", Sort::Integer));
        let inner = Expr::binary(BinaryOp::Mul, y, x()).unwrap();
        let e = Expr::binary(BinaryOp::Eq, x(), inner).unwrap();
        let names: Vec<_> = e.variables().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["x0", "x1"]);
    }

    #[test]
    fn display_renders_smtlib() {
        let e = Expr::binary(BinaryOp::Lt, x(), Expr::int(-3)).unwrap();
        assert_eq!(e.to_string(), "(< x0 (- 3))");
        let iff = Expr::binary(BinaryOp::Iff, b(), Expr::bool(false)).unwrap();
        assert_eq!(iff.to_string(), "(= b0 false)");
    }
}
