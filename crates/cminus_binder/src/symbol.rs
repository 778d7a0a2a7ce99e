//! Symbol entries and per-scope symbol tables.

use cminus_ast::{ExpType, NodeId};
use indexmap::IndexMap;

/// One identifier's declaration-site record within a single scope.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// The identifier.
    pub name: String,
    /// The AST node that declared it (non-owning).
    pub decl: NodeId,
    /// The declared type.
    pub ty: ExpType,
    /// Storage offset within the scope, assigned once at first insertion.
    pub loc: u32,
    /// Lines on which the name appears, in source order. Appended, never
    /// removed.
    pub lines: Vec<u32>,
}

/// A symbol table maps names to entries. Names are unique within one table;
/// iteration follows insertion order so reference-line reporting and the
/// symbol-table dump stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: IndexMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { table: IndexMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.table.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.table.get_mut(name)
    }

    pub fn set(&mut self, entry: SymbolEntry) {
        self.table.insert(entry.name.clone(), entry);
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.table.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, loc: u32) -> SymbolEntry {
        SymbolEntry {
            name: name.to_string(),
            decl: NodeId(0),
            ty: ExpType::Integer,
            loc,
            lines: vec![1],
        }
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut table = SymbolTable::new();
        table.set(entry("zeta", 0));
        table.set(entry("alpha", 1));
        table.set(entry("mid", 2));
        let names: Vec<&str> = table.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_get_mut_appends_lines() {
        let mut table = SymbolTable::new();
        table.set(entry("x", 0));
        if let Some(e) = table.get_mut("x") {
            e.lines.push(4);
        }
        assert_eq!(table.get("x").map(|e| e.lines.clone()), Some(vec![1, 4]));
    }
}
