//! cminus_checker: type checking over a bound AST.
//!
//! The checker consumes the binder (taking ownership of its scope table and
//! diagnostics) and walks the tree in postorder, verifying condition,
//! return, assignment, subscript, call, and operator typing rules. Errors
//! are recovered locally; the walk never aborts.

pub mod checker;

pub use checker::Checker;
