//! # typefuzz-smtlib
//!
//! A small, untyped SMT-LIB2 abstract syntax covering the Core and Ints
//! theories, plus `Display` implementations that print valid SMT-LIB2 text.
//!
//! The typed expression trees of `typefuzz-engine` are lowered into this
//! representation before they are handed to a solver.

pub mod command;
mod formatter;
pub mod script;
pub mod sort;
pub mod term;

pub use command::Command;
pub use script::Script;
pub use sort::Sort;
pub use term::{Op, Term};
