//! The binding pass.
//!
//! A preorder/postorder walk over the AST that:
//! - creates the scope tree (one merged scope per function for its
//!   parameters and top-level block, nested scopes for inner compounds),
//! - inserts declarations and records reference lines,
//! - resolves identifier and call references through the scope chain,
//! - reports redefinition, void-declaration, and undeclared-use errors.
//!
//! Before the walk, the global scope is pushed and the `input`/`output`
//! built-ins are registered so user code can call them unconditionally.
//! Reference inserts consume a storage slot exactly like declarations; the
//! offset counter advances on every insert call even when the symbol table
//! only appends a line number.

use crate::scope::ScopeTable;
use cminus_ast::{
    traverse, Ast, AstBuilder, ExpType, NodeId, NodeKind, ScopeId, TypeSpec, Visit,
};
use cminus_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use rustc_hash::FxHashSet;

/// The function name whose single implicit `void` parameter is tolerated.
pub const ENTRY_POINT: &str = "main";

/// The binder creates scopes and symbol entries and links references.
pub struct Binder {
    /// The scope arena and active-scope stack.
    scopes: ScopeTable,
    /// The global scope, created up front; outlives every traversal.
    global: ScopeId,
    /// Diagnostics from binding.
    diagnostics: DiagnosticCollection,
    /// Nodes that pushed a scope in preorder; each pops it in postorder.
    pushed: FxHashSet<NodeId>,
}

impl Binder {
    pub fn new() -> Self {
        let mut scopes = ScopeTable::new();
        let global = scopes.create_scope(None, None);
        Self {
            scopes,
            global,
            diagnostics: DiagnosticCollection::new(),
            pushed: FxHashSet::default(),
        }
    }

    /// Bind a whole program rooted at `root`. Pushes the global scope,
    /// installs the built-ins, walks the tree, and pops the global scope.
    pub fn bind(&mut self, ast: &mut Ast, root: Option<NodeId>) {
        self.scopes.push(self.global);
        self.install_builtins(ast);
        traverse(ast, root, self);
        self.scopes.pop();
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn scope_table(&self) -> &ScopeTable {
        &self.scopes
    }

    pub fn scope_table_mut(&mut self) -> &mut ScopeTable {
        &mut self.scopes
    }

    pub fn into_scope_table(self) -> ScopeTable {
        self.scopes
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take diagnostics from the binder.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    fn error(&mut self, line: u32, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::new(line, message, args));
    }

    // ========================================================================
    // Built-ins
    // ========================================================================

    /// Register `int input(void)` and `void output(int arg)` in the global
    /// scope, each with its own (immediately popped) function scope, so user
    /// programs may call them like any declared function.
    fn install_builtins(&mut self, ast: &mut Ast) {
        // input()
        let (input, input_body) = {
            let mut b = AstBuilder::new(ast);
            let body = b.compound(None, None, 0);
            let f = b.func("input", TypeSpec::Int, None, body, 0);
            (f, body)
        };
        ast.node_mut(input).ty = ExpType::Integer;
        ast.node_mut(input).scope = Some(self.global);
        let loc = self.scopes.next_loc(self.global);
        self.scopes
            .insert(self.global, "input", input, ExpType::Integer, 0, loc);
        let scope = self.scopes.create_scope(Some("input".to_string()), Some(input));
        self.scopes.push(scope);
        ast.node_mut(input_body).scope = Some(scope);
        self.scopes.pop();

        // output(arg)
        let (output, output_param, output_body) = {
            let mut b = AstBuilder::new(ast);
            let body = b.compound(None, None, 0);
            let param = b.param("arg", TypeSpec::Int, 0);
            let f = b.func("output", TypeSpec::Void, Some(param), body, 0);
            (f, param, body)
        };
        ast.node_mut(output).ty = ExpType::Void;
        ast.node_mut(output).scope = Some(self.global);
        ast.node_mut(output_param).ty = ExpType::Integer;
        let loc = self.scopes.next_loc(self.global);
        self.scopes
            .insert(self.global, "output", output, ExpType::Void, 0, loc);
        let scope = self.scopes.create_scope(Some("output".to_string()), Some(output));
        self.scopes.push(scope);
        ast.node_mut(output_body).scope = Some(scope);
        ast.node_mut(output_param).scope = Some(scope);
        let loc = self.scopes.next_loc(scope);
        self.scopes
            .insert(scope, "arg", output_param, ExpType::Integer, 0, loc);
        self.scopes.pop();
    }

    // ========================================================================
    // Preorder: declaration insertion and reference resolution
    // ========================================================================

    fn insert_node(&mut self, ast: &mut Ast, id: NodeId) {
        let cur = match self.scopes.current() {
            Some(s) => s,
            None => return,
        };
        ast.node_mut(id).scope = Some(cur);
        let line = ast.node(id).line;
        let kind = ast.node(id).kind.clone();

        match kind {
            NodeKind::FunctionDecl { name, ty } => {
                if self.scopes.lookup(cur, &name).is_some() {
                    self.error(line, &messages::REDEFINITION_OF_FUNCTION_0, &[&name]);
                }
                if cur != self.global {
                    self.error(line, &messages::FUNCTION_DEFINITION_IS_NOT_ALLOWED_HERE, &[]);
                }
                let resolved = match ty {
                    TypeSpec::Int => ExpType::Integer,
                    TypeSpec::Void => ExpType::Void,
                };
                ast.node_mut(id).ty = resolved;
                let loc = self.scopes.next_loc(cur);
                self.scopes.insert(cur, &name, id, resolved, line, loc);

                let fn_scope = self.scopes.create_scope(Some(name), Some(id));
                self.scopes.push(fn_scope);
                self.pushed.insert(id);
                ast.node_mut(id).scope = Some(fn_scope);
            }

            NodeKind::VarDecl { name, ty } | NodeKind::ArrayVarDecl { name, ty, .. } => {
                if ty == TypeSpec::Void {
                    let msg = if matches!(ast.node(id).kind, NodeKind::VarDecl { .. }) {
                        &messages::_0_VARIABLE_TYPE_CANNOT_BE_VOID
                    } else {
                        &messages::_0_ARRAY_TYPE_CANNOT_BE_VOID
                    };
                    self.error(line, msg, &[&name]);
                    return;
                }
                if self.scopes.lookup_local(cur, &name).is_some() {
                    self.error(line, &messages::REDEFINITION_OF_0, &[&name]);
                }
                let resolved = match ast.node(id).kind {
                    NodeKind::ArrayVarDecl { size, .. } if size != 0 => ExpType::IntegerArray,
                    _ => ExpType::Integer,
                };
                ast.node_mut(id).ty = resolved;
                let loc = self.scopes.next_loc(cur);
                self.scopes.insert(cur, &name, id, resolved, line, loc);
            }

            NodeKind::Compound => {
                if !self.scopes.scope(cur).body_scope_established {
                    // first compound under this function: merge into its scope
                    self.scopes.scope_mut(cur).body_scope_established = true;
                } else {
                    let name = self.scopes.scope(cur).name.clone();
                    let nested = self.scopes.create_scope(name, Some(id));
                    self.scopes.push(nested);
                    self.pushed.insert(id);
                    self.scopes.scope_mut(nested).body_scope_established = true;
                    ast.node_mut(id).scope = Some(nested);
                }
            }

            NodeKind::Param { name, ty } | NodeKind::ArrayParam { name, ty } => {
                if ty == TypeSpec::Void {
                    if self.scopes.scope(cur).name.as_deref() == Some(ENTRY_POINT) {
                        // the entry point's implicit `void` parameter
                        return;
                    }
                    self.error(line, &messages::PARAMETER_TYPE_CANNOT_BE_VOID, &[]);
                }
                if self.scopes.lookup_local(cur, &name).is_some() {
                    self.error(line, &messages::REDEFINITION_OF_PARAMETER_0, &[&name]);
                }
                let resolved = match (&ast.node(id).kind, ty) {
                    (_, TypeSpec::Void) => ExpType::Void,
                    (NodeKind::ArrayParam { .. }, TypeSpec::Int) => ExpType::IntegerArray,
                    (_, TypeSpec::Int) => ExpType::Integer,
                };
                ast.node_mut(id).ty = resolved;
                let loc = self.scopes.next_loc(cur);
                self.scopes.insert(cur, &name, id, resolved, line, loc);
            }

            NodeKind::Identifier { name } | NodeKind::ArrayIdentifier { name } => {
                self.bind_reference(ast, id, cur, &name, &messages::UNDECLARED_VARIABLE_0);
            }

            NodeKind::Call { name } => {
                self.bind_reference(ast, id, cur, &name, &messages::UNDECLARED_FUNCTION_0);
            }

            NodeKind::If
            | NodeKind::While
            | NodeKind::Return
            | NodeKind::Assign
            | NodeKind::BinaryOp { .. }
            | NodeKind::Constant { .. } => {}
        }
    }

    /// Resolve an identifier or call reference and record the usage site in
    /// the current scope. The record consumes a storage slot like a
    /// declaration; for an already-known local name only the line list grows.
    fn bind_reference(
        &mut self,
        ast: &mut Ast,
        id: NodeId,
        cur: ScopeId,
        name: &str,
        undeclared: &DiagnosticMessage,
    ) {
        let line = ast.node(id).line;
        match self.scopes.lookup(cur, name).map(|e| e.ty) {
            Some(ty) => ast.node_mut(id).ty = ty,
            None => self.error(line, undeclared, &[name]),
        }
        let ty = ast.node(id).ty;
        let loc = self.scopes.next_loc(cur);
        self.scopes.insert(cur, name, id, ty, line, loc);
    }

    // ========================================================================
    // Postorder: scope pops and provisional type propagation
    // ========================================================================

    fn after_insert_node(&mut self, ast: &mut Ast, id: NodeId) {
        match ast.node(id).kind {
            NodeKind::Compound | NodeKind::FunctionDecl { .. } => {
                if self.pushed.remove(&id) {
                    self.scopes.pop();
                }
            }
            NodeKind::Assign | NodeKind::BinaryOp { .. } => {
                if let Some(first) = ast.node(id).child(0) {
                    let ty = ast.node(first).ty;
                    ast.node_mut(id).ty = ty;
                }
            }
            _ => {}
        }
    }
}

impl Visit for Binder {
    fn preorder(&mut self, ast: &mut Ast, node: NodeId) {
        self.insert_node(ast, node);
    }

    fn postorder(&mut self, ast: &mut Ast, node: NodeId) {
        self.after_insert_node(ast, node);
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}
