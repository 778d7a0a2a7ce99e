//! Synthetic AST node construction.
//!
//! Builds arena nodes kind by kind. The binder uses this to install the
//! built-in `input`/`output` declarations; tests use it to assemble programs
//! without a parser.

use crate::node::{Ast, BinOp, NodeKind, TypeSpec};
use crate::types::NodeId;

/// A thin construction layer over an [`Ast`] arena.
pub struct AstBuilder<'a> {
    ast: &'a mut Ast,
}

impl<'a> AstBuilder<'a> {
    pub fn new(ast: &'a mut Ast) -> Self {
        Self { ast }
    }

    pub fn ast(&mut self) -> &mut Ast {
        self.ast
    }

    /// `ty name(params) body` — `params` is the head of a sibling chain.
    pub fn func(
        &mut self,
        name: &str,
        ty: TypeSpec,
        params: Option<NodeId>,
        body: NodeId,
        line: u32,
    ) -> NodeId {
        let id = self.ast.add_node(
            NodeKind::FunctionDecl { name: name.to_string(), ty },
            line,
        );
        if let Some(p) = params {
            self.ast.set_child(id, 0, p);
        }
        self.ast.set_child(id, 1, body);
        id
    }

    pub fn var(&mut self, name: &str, ty: TypeSpec, line: u32) -> NodeId {
        self.ast
            .add_node(NodeKind::VarDecl { name: name.to_string(), ty }, line)
    }

    pub fn array_var(&mut self, name: &str, ty: TypeSpec, size: i64, line: u32) -> NodeId {
        self.ast.add_node(
            NodeKind::ArrayVarDecl { name: name.to_string(), ty, size },
            line,
        )
    }

    pub fn param(&mut self, name: &str, ty: TypeSpec, line: u32) -> NodeId {
        self.ast
            .add_node(NodeKind::Param { name: name.to_string(), ty }, line)
    }

    pub fn array_param(&mut self, name: &str, ty: TypeSpec, line: u32) -> NodeId {
        self.ast
            .add_node(NodeKind::ArrayParam { name: name.to_string(), ty }, line)
    }

    /// `{ decls stmts }` — both slots are sibling-chain heads.
    pub fn compound(
        &mut self,
        decls: Option<NodeId>,
        stmts: Option<NodeId>,
        line: u32,
    ) -> NodeId {
        let id = self.ast.add_node(NodeKind::Compound, line);
        if let Some(d) = decls {
            self.ast.set_child(id, 0, d);
        }
        if let Some(s) = stmts {
            self.ast.set_child(id, 1, s);
        }
        id
    }

    pub fn if_stmt(
        &mut self,
        cond: Option<NodeId>,
        then: NodeId,
        otherwise: Option<NodeId>,
        line: u32,
    ) -> NodeId {
        let id = self.ast.add_node(NodeKind::If, line);
        if let Some(c) = cond {
            self.ast.set_child(id, 0, c);
        }
        self.ast.set_child(id, 1, then);
        if let Some(e) = otherwise {
            self.ast.set_child(id, 2, e);
        }
        id
    }

    pub fn while_stmt(&mut self, cond: Option<NodeId>, body: NodeId, line: u32) -> NodeId {
        let id = self.ast.add_node(NodeKind::While, line);
        if let Some(c) = cond {
            self.ast.set_child(id, 0, c);
        }
        self.ast.set_child(id, 1, body);
        id
    }

    pub fn ret(&mut self, expr: Option<NodeId>, line: u32) -> NodeId {
        let id = self.ast.add_node(NodeKind::Return, line);
        if let Some(e) = expr {
            self.ast.set_child(id, 0, e);
        }
        id
    }

    pub fn assign(&mut self, lhs: NodeId, rhs: NodeId, line: u32) -> NodeId {
        let id = self.ast.add_node(NodeKind::Assign, line);
        self.ast.set_child(id, 0, lhs);
        self.ast.set_child(id, 1, rhs);
        id
    }

    pub fn ident(&mut self, name: &str, line: u32) -> NodeId {
        self.ast
            .add_node(NodeKind::Identifier { name: name.to_string() }, line)
    }

    /// `name[subscript]`
    pub fn array_ident(&mut self, name: &str, subscript: Option<NodeId>, line: u32) -> NodeId {
        let id = self.ast.add_node(
            NodeKind::ArrayIdentifier { name: name.to_string() },
            line,
        );
        if let Some(s) = subscript {
            self.ast.set_child(id, 0, s);
        }
        id
    }

    /// `name(args)` — `args` is the head of a sibling chain.
    pub fn call(&mut self, name: &str, args: Option<NodeId>, line: u32) -> NodeId {
        let id = self
            .ast
            .add_node(NodeKind::Call { name: name.to_string() }, line);
        if let Some(a) = args {
            self.ast.set_child(id, 0, a);
        }
        id
    }

    pub fn binop(&mut self, op: BinOp, left: NodeId, right: NodeId, line: u32) -> NodeId {
        let id = self.ast.add_node(NodeKind::BinaryOp { op }, line);
        self.ast.set_child(id, 0, left);
        self.ast.set_child(id, 1, right);
        id
    }

    pub fn constant(&mut self, value: i64, line: u32) -> NodeId {
        self.ast.add_node(NodeKind::Constant { value }, line)
    }

    /// Link `nodes` into a sibling chain and return its head.
    pub fn chain(&mut self, nodes: &[NodeId]) -> Option<NodeId> {
        for pair in nodes.windows(2) {
            self.ast.set_sibling(pair[0], pair[1]);
        }
        nodes.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ExpType;

    #[test]
    fn test_build_function_shape() {
        let mut ast = Ast::new();
        let mut b = AstBuilder::new(&mut ast);
        let p = b.param("x", TypeSpec::Int, 1);
        let body = b.compound(None, None, 1);
        let f = b.func("f", TypeSpec::Void, Some(p), body, 1);

        let node = ast.node(f);
        assert_eq!(node.child(0), Some(p));
        assert_eq!(node.child(1), Some(body));
        assert_eq!(node.kind.name(), Some("f"));
    }

    #[test]
    fn test_chain_links_siblings() {
        let mut ast = Ast::new();
        let mut b = AstBuilder::new(&mut ast);
        let x = b.param("x", TypeSpec::Int, 1);
        let y = b.param("y", TypeSpec::Int, 1);
        let z = b.param("z", TypeSpec::Int, 1);
        let head = b.chain(&[x, y, z]);

        assert_eq!(head, Some(x));
        assert_eq!(ast.node(x).sibling, Some(y));
        assert_eq!(ast.node(y).sibling, Some(z));
        assert_eq!(ast.node(z).sibling, None);
    }

    #[test]
    fn test_constant_starts_void() {
        let mut ast = Ast::new();
        let mut b = AstBuilder::new(&mut ast);
        let c = b.constant(42, 5);
        assert_eq!(ast.node(c).ty, ExpType::Void);
        assert_eq!(ast.node(c).line, 5);
    }
}
