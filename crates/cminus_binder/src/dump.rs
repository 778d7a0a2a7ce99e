//! Formatted symbol-table report.
//!
//! Three sections: functions with their parameters, global identifiers,
//! and per-scope parameters/locals. Scopes and entries are listed in
//! creation/insertion order, so the report is deterministic.

use crate::scope::{Scope, ScopeTable};
use cminus_ast::{Ast, NodeKind};
use std::fmt::Write;

/// Render the populated scope table as a report string.
pub fn dump_symbol_table(ast: &Ast, scopes: &ScopeTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "< Symbol Table >");
    let _ = writeln!(out);

    let _ = writeln!(out, "< Function Table >");
    let _ = writeln!(
        out,
        "Function Name  Scope Name  Return Type  Parameter Name  Parameter Type"
    );
    let _ = writeln!(
        out,
        "-------------  ----------  -----------  --------------  --------------"
    );
    write_functions(&mut out, ast, scopes);
    let _ = writeln!(out);

    let _ = writeln!(out, "< Function and Global Variables >");
    let _ = writeln!(out, "ID Name        ID Type    Data Type");
    let _ = writeln!(out, "-------------  ---------  -----------");
    write_globals(&mut out, ast, scopes);
    let _ = writeln!(out);

    let _ = writeln!(out, "< Function Parameters and Local Variables >");
    let _ = writeln!(out, "Scope Name       Nested Level   ID Name       Data Type");
    let _ = writeln!(out, "--------------   ------------   -----------   ---------");
    for (_, scope) in scopes.iter() {
        if scope.name.is_none() {
            continue;
        }
        write_scope_locals(&mut out, ast, scope);
    }

    out
}

/// One row per function scope hanging directly off global, followed by one
/// indented row per parameter.
fn write_functions(out: &mut String, ast: &Ast, scopes: &ScopeTable) {
    for (_, scope) in scopes.iter() {
        let parent = match scope.parent {
            Some(p) => p,
            None => continue,
        };
        if scopes.scope(parent).name.is_some() {
            continue;
        }
        let (name, decl) = match (&scope.name, scope.decl) {
            (Some(name), Some(decl)) => (name.as_str(), decl),
            _ => continue,
        };
        let ret = ast.node(decl).ty;
        let _ = write!(out, "{name:<15}global      {ret:<13}");
        let mut param = ast.node(decl).child(0);
        if param.is_none() {
            let _ = writeln!(out, "Void");
            continue;
        }
        let _ = writeln!(out);
        while let Some(p) = param {
            let node = ast.node(p);
            if let Some(pname) = node.kind.name() {
                let _ = writeln!(out, "{:39}{:<16}{}", "", pname, node.ty);
            }
            param = node.sibling;
        }
    }
}

/// Global functions and variables, skipping reference entries for names
/// only mentioned (not declared) at the top level.
fn write_globals(out: &mut String, ast: &Ast, scopes: &ScopeTable) {
    let global = match scopes.iter().find(|(_, s)| s.name.is_none()) {
        Some((id, _)) => id,
        None => return,
    };
    for entry in scopes.scope(global).symbols.iter() {
        let node = ast.node(entry.decl);
        let label = match node.kind {
            NodeKind::FunctionDecl { .. } => "Function",
            NodeKind::VarDecl { .. } | NodeKind::ArrayVarDecl { .. } => "Variable",
            _ => continue,
        };
        let _ = writeln!(out, "{:<15}{label:<11}{}", entry.name, node.ty);
    }
}

fn write_scope_locals(out: &mut String, ast: &Ast, scope: &Scope) {
    let name = scope.name.as_deref().unwrap_or("");
    for entry in scope.symbols.iter() {
        let node = ast.node(entry.decl);
        if !node.kind.is_local_declaration() {
            continue;
        }
        let _ = writeln!(out, "{name:<17}{:<15}{:<14}{}", scope.level, entry.name, node.ty);
    }
}
