//! The type-checking pass.
//!
//! A postorder walk over the bound AST. Node types were provisionally set
//! during binding; this pass re-resolves references against the scope table,
//! applies the decay rules (an untyped literal or an indexed array element
//! counts as Integer where compatibility demands it), and reports type
//! errors. Every rule recovers locally and the walk continues.

use cminus_ast::{traverse, Ast, ExpType, NodeId, NodeKind, Visit};
use cminus_binder::{Binder, ScopeTable};
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// The checker owns the binder's output for the duration of the pass.
pub struct Checker {
    binder: Binder,
    diagnostics: DiagnosticCollection,
}

impl Checker {
    pub fn new(binder: Binder) -> Self {
        Self { binder, diagnostics: DiagnosticCollection::new() }
    }

    /// Check a whole program rooted at `root`. The global scope is pushed
    /// for the duration of the walk so scope bookkeeping mirrors binding.
    pub fn check(&mut self, ast: &mut Ast, root: Option<NodeId>) {
        let global = self.binder.global_scope();
        self.binder.scope_table_mut().push(global);
        traverse(ast, root, self);
        self.binder.scope_table_mut().pop();
    }

    pub fn scope_table(&self) -> &ScopeTable {
        self.binder.scope_table()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Release the scope table and the combined binding-then-checking
    /// diagnostics.
    pub fn into_parts(mut self) -> (ScopeTable, DiagnosticCollection) {
        let mut diagnostics = self.binder.take_diagnostics();
        diagnostics.extend(self.diagnostics);
        (self.binder.into_scope_table(), diagnostics)
    }

    fn scopes(&self) -> &ScopeTable {
        self.binder.scope_table()
    }

    fn error(&mut self, line: u32, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::new(line, message, args));
    }

    fn check_node(&mut self, ast: &mut Ast, id: NodeId) {
        match ast.node(id).kind.clone() {
            NodeKind::If | NodeKind::While => self.check_condition(ast, id),
            NodeKind::Return => self.check_return(ast, id),
            NodeKind::Assign => self.check_assign(ast, id),
            NodeKind::Identifier { name } | NodeKind::ArrayIdentifier { name } => {
                self.check_identifier(ast, id, &name)
            }
            NodeKind::Call { name } => self.check_call(ast, id, &name),
            NodeKind::BinaryOp { .. } => self.check_binary_op(ast, id),
            NodeKind::FunctionDecl { .. }
            | NodeKind::VarDecl { .. }
            | NodeKind::ArrayVarDecl { .. }
            | NodeKind::Param { .. }
            | NodeKind::ArrayParam { .. }
            | NodeKind::Compound
            | NodeKind::Constant { .. } => {}
        }
    }

    fn check_condition(&mut self, ast: &mut Ast, id: NodeId) {
        let line = ast.node(id).line;
        match ast.node(id).child(0) {
            None => self.error(line, &messages::EXPECTED_EXPRESSION, &[]),
            Some(cond) => {
                if ast.node(cond).ty == ExpType::Void {
                    self.error(line, &messages::STATEMENT_REQUIRES_SCALAR_EXPRESSION, &[]);
                }
            }
        }
    }

    /// The enclosing function's return type is found by looking its own
    /// name up from the return statement's scope.
    fn check_return(&mut self, ast: &mut Ast, id: NodeId) {
        let scope = match ast.node(id).scope {
            Some(s) => s,
            None => return,
        };
        let func_name = match self.scopes().scope(scope).name.clone() {
            Some(n) => n,
            None => return,
        };
        let func_ty = match self.scopes().lookup(scope, &func_name).map(|e| e.ty) {
            Some(t) => t,
            None => return,
        };

        let line = ast.node(id).line;
        let expr = ast.node(id).child(0);
        if let Some(e) = expr {
            decay_constant(ast, e);
        }

        match func_ty {
            ExpType::Void => {
                if let Some(e) = expr {
                    if ast.node(e).ty != ExpType::Void {
                        self.error(line, &messages::INVALID_RETURN_TYPE, &[]);
                    }
                }
            }
            ExpType::Integer => match expr {
                None => self.error(line, &messages::INVALID_RETURN_TYPE, &[]),
                Some(e) => {
                    let ty = ast.node(e).ty;
                    // an indexed array element reads as a scalar
                    let indexed_element =
                        ty == ExpType::IntegerArray && ast.node(e).child(0).is_some();
                    if ty != ExpType::Integer && !indexed_element {
                        self.error(line, &messages::INVALID_RETURN_TYPE, &[]);
                    }
                }
            },
            ExpType::IntegerArray => {}
        }
    }

    fn check_assign(&mut self, ast: &mut Ast, id: NodeId) {
        let (lhs, rhs) = match (ast.node(id).child(0), ast.node(id).child(1)) {
            (Some(l), Some(r)) => (l, r),
            _ => return,
        };
        decay_constant(ast, lhs);
        decay_constant(ast, rhs);

        let line = ast.node(id).line;
        let lt = ast.node(lhs).ty;
        let rt = ast.node(rhs).ty;
        if lt == ExpType::Void || rt == ExpType::Void {
            self.error(line, &messages::EXPRESSION_IS_NOT_ASSIGNABLE, &[]);
        } else if lt == ExpType::IntegerArray && ast.node(lhs).child(0).is_none() {
            self.error(line, &messages::TYPE_INCONSISTENCY, &[]);
        } else if rt == ExpType::IntegerArray && ast.node(rhs).child(0).is_none() {
            self.error(line, &messages::TYPE_INCONSISTENCY, &[]);
        }
    }

    fn check_identifier(&mut self, ast: &mut Ast, id: NodeId, name: &str) {
        if let Some(scope) = ast.node(id).scope {
            if let Some(ty) = self.scopes().lookup(scope, name).map(|e| e.ty) {
                ast.node_mut(id).ty = ty;
            }
        }
        let line = ast.node(id).line;
        if let Some(subscript) = ast.node(id).child(0) {
            if ast.node(subscript).ty != ExpType::Integer {
                self.error(line, &messages::ARRAY_SUBSCRIPT_IS_NOT_AN_INTEGER_0, &[name]);
            }
        }
    }

    /// Calls resolve one level up from the call's own scope; the reference
    /// entry the binder recorded in the current scope is deliberately
    /// skipped so a local variable cannot pose as the callee.
    fn check_call(&mut self, ast: &mut Ast, id: NodeId, name: &str) {
        let line = ast.node(id).line;
        let parent = ast
            .node(id)
            .scope
            .and_then(|s| self.scopes().scope(s).parent);
        let callee = parent
            .and_then(|p| self.scopes().lookup(p, name))
            .map(|e| (e.ty, e.decl));
        let (ty, decl) = match callee {
            Some(found) => found,
            None => {
                self.error(line, &messages::IMPLICIT_DECLARATION_OF_FUNCTION_0, &[name]);
                return;
            }
        };
        ast.node_mut(id).ty = ty;

        let mut param = ast.node(decl).child(0);
        let mut arg = ast.node(id).child(0);
        while let Some(a) = arg {
            let p = match param {
                Some(p) => p,
                None => {
                    self.error(line, &messages::INVALID_FUNCTION_CALL, &[]);
                    break;
                }
            };
            let param_ty = ast.node(p).ty;
            let arg_ty = ast.node(a).ty;
            if param_ty != arg_ty {
                let tolerated = matches!(param_ty, ExpType::Integer | ExpType::IntegerArray)
                    && (matches!(arg_ty, ExpType::Integer | ExpType::IntegerArray)
                        || ast.node(a).kind.is_constant());
                if !tolerated {
                    self.error(line, &messages::INVALID_FUNCTION_CALL, &[]);
                }
                break;
            }
            arg = ast.node(a).sibling;
            param = ast.node(p).sibling;
        }
        if arg.is_none() && param.is_some() {
            self.error(line, &messages::INVALID_FUNCTION_CALL, &[]);
        }
    }

    fn check_binary_op(&mut self, ast: &mut Ast, id: NodeId) {
        let (left, right) = match (ast.node(id).child(0), ast.node(id).child(1)) {
            (Some(l), Some(r)) => (l, r),
            _ => return,
        };
        let lt = operand_type(ast, left);
        let rt = operand_type(ast, right);
        let line = ast.node(id).line;
        if lt == ExpType::Void || rt == ExpType::Void || lt != rt {
            self.error(line, &messages::INVALID_EXPRESSION, &[]);
        } else {
            ast.node_mut(id).ty = ExpType::Integer;
        }
    }
}

/// Rewrite an untyped literal constant to Integer in place.
fn decay_constant(ast: &mut Ast, id: NodeId) {
    let node = ast.node(id);
    if node.ty == ExpType::Void && node.kind.is_constant() {
        ast.node_mut(id).ty = ExpType::Integer;
    }
}

/// An operand's type for binary-operator compatibility: an indexed array
/// element or an untyped literal reads as Integer. The node itself is not
/// rewritten.
fn operand_type(ast: &Ast, id: NodeId) -> ExpType {
    let node = ast.node(id);
    match node.ty {
        ExpType::IntegerArray if node.child(0).is_some() => ExpType::Integer,
        ExpType::Void if node.kind.is_constant() => ExpType::Integer,
        ty => ty,
    }
}

impl Visit for Checker {
    fn postorder(&mut self, ast: &mut Ast, node: NodeId) {
        self.check_node(ast, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cminus_ast::{AstBuilder, BinOp, TypeSpec};

    fn check(build: impl FnOnce(&mut AstBuilder<'_>) -> Option<NodeId>) -> DiagnosticCollection {
        let mut ast = Ast::new();
        let root = {
            let mut b = AstBuilder::new(&mut ast);
            build(&mut b)
        };
        let mut binder = Binder::new();
        binder.bind(&mut ast, root);
        let mut checker = Checker::new(binder);
        checker.check(&mut ast, root);
        let (_, diagnostics) = checker.into_parts();
        diagnostics
    }

    #[test]
    fn test_missing_condition_is_reported() {
        let diagnostics = check(|b| {
            let then = b.compound(None, None, 3);
            let stmt = b.if_stmt(None, then, None, 3);
            let body = b.compound(None, Some(stmt), 2);
            Some(b.func("main", TypeSpec::Void, None, body, 2))
        });
        let codes: Vec<u32> = diagnostics.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![2001]);
    }

    #[test]
    fn test_bare_constant_condition_is_not_scalar() {
        // literals stay untyped unless a decay site rewrites them, and
        // conditions are not a decay site
        let diagnostics = check(|b| {
            let one = b.constant(1, 3);
            let then = b.compound(None, None, 3);
            let stmt = b.if_stmt(Some(one), then, None, 3);
            let body = b.compound(None, Some(stmt), 2);
            Some(b.func("main", TypeSpec::Void, None, body, 2))
        });
        let codes: Vec<u32> = diagnostics.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![2002]);
    }

    #[test]
    fn test_comparison_condition_is_scalar() {
        let diagnostics = check(|b| {
            let x = b.var("x", TypeSpec::Int, 2);
            let lhs = b.ident("x", 3);
            let rhs = b.constant(0, 3);
            let cond = b.binop(BinOp::Lt, lhs, rhs, 3);
            let then = b.compound(None, None, 3);
            let stmt = b.while_stmt(Some(cond), then, 3);
            let body = b.compound(Some(x), Some(stmt), 2);
            Some(b.func("main", TypeSpec::Void, None, body, 2))
        });
        assert!(!diagnostics.has_errors());
    }
}
