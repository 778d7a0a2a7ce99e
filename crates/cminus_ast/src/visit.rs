//! Generic syntax-tree traversal.
//!
//! A single recursive walk shared by the binder and the type checker: for
//! each node the preorder hook runs, then every child slot in order, then the
//! postorder hook, then the node's sibling. Either hook may be left as the
//! default no-op to get a preorder-only or postorder-only traversal.

use crate::node::Ast;
use crate::types::NodeId;

/// Callbacks applied by [`traverse`]. Both default to no-ops.
pub trait Visit {
    fn preorder(&mut self, _ast: &mut Ast, _node: NodeId) {}
    fn postorder(&mut self, _ast: &mut Ast, _node: NodeId) {}
}

/// Apply `v.preorder` in preorder and `v.postorder` in postorder to the tree
/// rooted at `node`, then to each of its siblings in turn.
pub fn traverse<V: Visit>(ast: &mut Ast, node: Option<NodeId>, v: &mut V) {
    let mut cur = node;
    while let Some(id) = cur {
        v.preorder(ast, id);
        let arity = ast.node(id).children.len();
        for slot in 0..arity {
            let child = ast.node(id).child(slot);
            traverse(ast, child, v);
        }
        v.postorder(ast, id);
        cur = ast.node(id).sibling;
    }
}
