//! cminus_ast: Abstract Syntax Tree definitions for the C-Minus compiler.
//!
//! This module defines the node arena, node kinds, the resolved-type
//! enumeration, the generic preorder/postorder traversal driver, and a
//! synthetic-node builder used by the binder (built-ins) and by tests.

pub mod builder;
pub mod node;
pub mod types;
pub mod visit;

// Re-export key types
pub use builder::AstBuilder;
pub use node::*;
pub use types::*;
pub use visit::{traverse, Visit};
