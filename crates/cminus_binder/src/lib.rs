//! cminus_binder: name binding and symbol-table construction.
//!
//! The binder walks the AST in preorder, creating scopes, inserting
//! declarations, and resolving identifier and call references against the
//! visible scope chain. The populated scope table outlives the pass and is
//! read by the type checker and by downstream code generation.

pub mod binder;
pub mod dump;
pub mod scope;
pub mod symbol;

pub use binder::{Binder, ENTRY_POINT};
pub use dump::dump_symbol_table;
pub use scope::{Scope, ScopeTable};
pub use symbol::{SymbolEntry, SymbolTable};
