//! cminus_sema: semantic-analysis orchestration.
//!
//! Runs the full pipeline over a parsed tree: bind -> check. Returns the
//! populated scope table and the line-ordered diagnostics; downstream
//! stages must not run when analysis reports errors.

use cminus_ast::{Ast, NodeId};
use cminus_binder::{dump_symbol_table, Binder, ScopeTable};
use cminus_checker::Checker;
use cminus_diagnostics::DiagnosticCollection;

/// The result of analyzing one program.
pub struct Analysis {
    /// The populated scope table.
    pub scopes: ScopeTable,
    /// All binding and type diagnostics, sorted by source line.
    pub diagnostics: DiagnosticCollection,
}

impl Analysis {
    /// Whether the analyzed program is well formed. Code generation must
    /// be skipped when this is false.
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Render the symbol-table report for this analysis.
    pub fn symbol_table_report(&self, ast: &Ast) -> String {
        dump_symbol_table(ast, &self.scopes)
    }
}

/// Run binding and type checking over a program rooted at `root`.
pub fn analyze(ast: &mut Ast, root: Option<NodeId>) -> Analysis {
    let mut binder = Binder::new();
    binder.bind(ast, root);

    let mut checker = Checker::new(binder);
    checker.check(ast, root);

    let (scopes, mut diagnostics) = checker.into_parts();
    diagnostics.sort();
    Analysis { scopes, diagnostics }
}
