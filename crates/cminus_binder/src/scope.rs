//! Scope arena and the active-scope stack.
//!
//! Scopes form a tree rooted at the global scope; each scope holds one
//! symbol table and a storage-offset counter. Lookup only ever walks the
//! parent chain from a scope toward global, never the whole tree. The arena
//! persists after binding (downstream stages keep reading it) while the
//! active-scope stack is transient traversal state.

use crate::symbol::{SymbolEntry, SymbolTable};
use cminus_ast::{ExpType, NodeId, ScopeId};

/// One lexical binding region: the global scope, or a function body together
/// with its parameter list (merged into a single region), or a nested block.
#[derive(Debug)]
pub struct Scope {
    /// The owning function's name; `None` for the global scope.
    pub name: Option<String>,
    /// The owning function's declaration node, if any.
    pub decl: Option<NodeId>,
    /// The symbols declared in this scope.
    pub symbols: SymbolTable,
    /// The enclosing scope (`None` for global).
    pub parent: Option<ScopeId>,
    /// Depth from global (global = 0).
    pub level: u32,
    /// Next free storage slot. Monotonically increasing; consumed on every
    /// insertion, including reference inserts.
    pub next_loc: u32,
    /// One-shot flag: the first compound under a function reuses the
    /// function's own scope instead of opening a nested one.
    pub body_scope_established: bool,
}

/// The scope arena plus the active-scope stack.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self { scopes: Vec::new(), stack: Vec::new() }
    }

    /// Allocate a scope whose parent is the current top of the stack.
    /// Registers it in the arena but does not push it.
    pub fn create_scope(&mut self, name: Option<String>, decl: Option<NodeId>) -> ScopeId {
        let parent = self.current();
        let level = parent.map_or(0, |p| self.scope(p).level + 1);
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            name,
            decl,
            symbols: SymbolTable::new(),
            parent,
            level,
            next_loc: 0,
            body_scope_established: false,
        });
        id
    }

    pub fn push(&mut self, scope: ScopeId) {
        self.stack.push(scope);
    }

    pub fn pop(&mut self) -> Option<ScopeId> {
        self.stack.pop()
    }

    /// Top of the active-scope stack.
    pub fn current(&self) -> Option<ScopeId> {
        self.stack.last().copied()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Return the scope's next free storage slot and advance the counter.
    pub fn next_loc(&mut self, id: ScopeId) -> u32 {
        let scope = self.scope_mut(id);
        let loc = scope.next_loc;
        scope.next_loc += 1;
        loc
    }

    /// Insert `name` into `scope` itself. If the name already exists there,
    /// only append `line` to its reference list (the original offset is
    /// kept); redefinition policy is the binder's concern, not this layer's.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        name: &str,
        decl: NodeId,
        ty: ExpType,
        line: u32,
        loc: u32,
    ) {
        let symbols = &mut self.scope_mut(scope).symbols;
        if let Some(entry) = symbols.get_mut(name) {
            entry.lines.push(line);
        } else {
            symbols.set(SymbolEntry {
                name: name.to_string(),
                decl,
                ty,
                loc,
                lines: vec![line],
            });
        }
    }

    /// Search `scope`, then its ancestors up to and including global.
    /// The nearest match wins, so shadowing works.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = self.scope(id);
            if let Some(entry) = s.symbols.get(name) {
                return Some(entry);
            }
            cur = s.parent;
        }
        None
    }

    /// Search `scope` only, no ancestor walk.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        self.scope(scope).symbols.get(name)
    }

    /// All scopes in creation order, with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, s)| (ScopeId(i as u32), s))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Depth of the active-scope stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}
