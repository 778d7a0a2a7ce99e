//! AST node definitions for the C-Minus compiler.
//!
//! Nodes live in a growable arena (`Ast`) and reference each other by
//! `NodeId`. Statement lists, parameter lists, and argument lists are
//! sibling chains rather than child slots; child slots are fixed-arity per
//! node kind and keep their position even when an earlier slot is empty.

use crate::types::{NodeId, ScopeId};
use std::fmt;

/// A resolved expression/declaration type.
///
/// `Void` doubles as "not yet resolved": every node starts out `Void` and the
/// binder/checker refine it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpType {
    Void,
    Integer,
    IntegerArray,
}

impl fmt::Display for ExpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ExpType::Void => "Void",
            ExpType::Integer => "Integer",
            ExpType::IntegerArray => "IntegerArray",
        })
    }
}

/// A declared type annotation as written in the source (`int` or `void`),
/// decided once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Int,
    Void,
}

/// Binary operator tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Over,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Times => "*",
            BinOp::Over => "/",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
        };
        write!(f, "{}", s)
    }
}

/// The kind of an AST node, spanning the statement and expression families.
///
/// Child-slot layout by kind:
/// - `FunctionDecl`: `{params, body}`
/// - `VarDecl` / `ArrayVarDecl` / `Param` / `ArrayParam`: none
/// - `Compound`: `{local_decls, statements}`
/// - `If`: `{cond, then, else}`
/// - `While`: `{cond, body}`
/// - `Return`: `{expr}`
/// - `Assign`: `{lhs, rhs}`
/// - `Identifier` / `ArrayIdentifier`: `{subscript}`
/// - `Call`: `{args}`
/// - `BinaryOp`: `{left, right}`
/// - `Constant`: none
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // -- Statements --
    FunctionDecl { name: String, ty: TypeSpec },
    VarDecl { name: String, ty: TypeSpec },
    ArrayVarDecl { name: String, ty: TypeSpec, size: i64 },
    Param { name: String, ty: TypeSpec },
    ArrayParam { name: String, ty: TypeSpec },
    Compound,
    If,
    While,
    Return,
    Assign,
    // -- Expressions --
    Identifier { name: String },
    ArrayIdentifier { name: String },
    Call { name: String },
    BinaryOp { op: BinOp },
    Constant { value: i64 },
}

impl NodeKind {
    /// The identifier this node declares or references, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::FunctionDecl { name, .. }
            | NodeKind::VarDecl { name, .. }
            | NodeKind::ArrayVarDecl { name, .. }
            | NodeKind::Param { name, .. }
            | NodeKind::ArrayParam { name, .. }
            | NodeKind::Identifier { name }
            | NodeKind::ArrayIdentifier { name }
            | NodeKind::Call { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDecl { .. }
                | NodeKind::VarDecl { .. }
                | NodeKind::ArrayVarDecl { .. }
                | NodeKind::Param { .. }
                | NodeKind::ArrayParam { .. }
                | NodeKind::Compound
                | NodeKind::If
                | NodeKind::While
                | NodeKind::Return
                | NodeKind::Assign
        )
    }

    pub fn is_expression(&self) -> bool {
        !self.is_statement()
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, NodeKind::Constant { .. })
    }

    /// Whether this kind declares a storage-carrying local: a parameter or a
    /// (scalar or array) variable.
    pub fn is_local_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::VarDecl { .. }
                | NodeKind::ArrayVarDecl { .. }
                | NodeKind::Param { .. }
                | NodeKind::ArrayParam { .. }
        )
    }
}

/// A single AST node.
#[derive(Debug, Clone)]
pub struct Node {
    /// This node's arena handle.
    pub id: NodeId,
    /// What the node is.
    pub kind: NodeKind,
    /// Fixed-arity ordered child slots; role depends on `kind`.
    pub children: Vec<Option<NodeId>>,
    /// Next statement/parameter/argument in the enclosing list.
    pub sibling: Option<NodeId>,
    /// Source line for diagnostics.
    pub line: u32,
    /// Resolved type; `Void` until bound/checked.
    pub ty: ExpType,
    /// Enclosing scope, set by the binder. Non-owning back-reference.
    pub scope: Option<ScopeId>,
}

impl Node {
    /// The child in slot `i`, if present.
    pub fn child(&self, i: usize) -> Option<NodeId> {
        self.children.get(i).copied().flatten()
    }
}

/// The node arena. Both analysis passes borrow it mutably and annotate nodes
/// in place; the parser (or a test builder) owns tree construction.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a node with empty child slots and no sibling.
    pub fn add_node(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let arity = match kind {
            NodeKind::FunctionDecl { .. } => 2,
            NodeKind::VarDecl { .. }
            | NodeKind::ArrayVarDecl { .. }
            | NodeKind::Param { .. }
            | NodeKind::ArrayParam { .. }
            | NodeKind::Constant { .. } => 0,
            NodeKind::Compound => 2,
            NodeKind::If => 3,
            NodeKind::While => 2,
            NodeKind::Return => 1,
            NodeKind::Assign => 2,
            NodeKind::Identifier { .. } | NodeKind::ArrayIdentifier { .. } => 1,
            NodeKind::Call { .. } => 1,
            NodeKind::BinaryOp { .. } => 2,
        };
        self.nodes.push(Node {
            id,
            kind,
            children: vec![None; arity],
            sibling: None,
            line,
            ty: ExpType::Void,
            scope: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Fill child slot `slot` of `parent`.
    pub fn set_child(&mut self, parent: NodeId, slot: usize, child: NodeId) {
        self.nodes[parent.index()].children[slot] = Some(child);
    }

    pub fn set_sibling(&mut self, node: NodeId, sibling: NodeId) {
        self.nodes[node.index()].sibling = Some(sibling);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Walk a sibling chain starting at `head`.
    pub fn siblings(&self, head: Option<NodeId>) -> SiblingIter<'_> {
        SiblingIter { ast: self, next: head }
    }
}

/// Iterator over a sibling chain.
pub struct SiblingIter<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl<'a> Iterator for SiblingIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.ast.node(id);
        self.next = node.sibling;
        Some(node)
    }
}
