//! End-to-end semantic analysis over whole programs.

use cminus_ast::{Ast, AstBuilder, BinOp, ExpType, NodeId, NodeKind, TypeSpec};
use cminus_sema::{analyze, Analysis};

fn run(build: impl FnOnce(&mut AstBuilder<'_>) -> Option<NodeId>) -> (Ast, Analysis) {
    let mut ast = Ast::new();
    let root = {
        let mut b = AstBuilder::new(&mut ast);
        build(&mut b)
    };
    let analysis = analyze(&mut ast, root);
    (ast, analysis)
}

fn codes(analysis: &Analysis) -> Vec<u32> {
    analysis.diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

// void main(void) { int x; x = 1; }
#[test]
fn test_declare_and_assign_local() {
    let (_, analysis) = run(|b| {
        let x = b.var("x", TypeSpec::Int, 2);
        let lhs = b.ident("x", 3);
        let rhs = b.constant(1, 3);
        let assign = b.assign(lhs, rhs, 3);
        let body = b.compound(Some(x), Some(assign), 1);
        Some(b.func("main", TypeSpec::Void, None, body, 1))
    });

    assert!(analysis.succeeded());
    assert!(analysis.diagnostics.is_empty());

    let main = analysis
        .scopes
        .iter()
        .find(|(_, s)| s.name.as_deref() == Some("main"))
        .map(|(id, _)| id)
        .unwrap();
    let entry = analysis.scopes.lookup_local(main, "x").unwrap();
    assert_eq!(entry.ty, ExpType::Integer);
    assert_eq!(entry.loc, 0);
}

// int main(void) { int x; int x; }
#[test]
fn test_duplicate_local_reported_once_at_second_line() {
    let (_, analysis) = run(|b| {
        let first = b.var("x", TypeSpec::Int, 2);
        let second = b.var("x", TypeSpec::Int, 3);
        let decls = b.chain(&[first, second]);
        let body = b.compound(decls, None, 1);
        Some(b.func("main", TypeSpec::Int, None, body, 1))
    });

    assert!(!analysis.succeeded());
    assert_eq!(codes(&analysis), vec![1005]);
    assert_eq!(analysis.diagnostics.diagnostics()[0].line, 3);
}

// void main(void) { return 1; }
#[test]
fn test_returning_value_from_void_main() {
    let (_, analysis) = run(|b| {
        let one = b.constant(1, 2);
        let ret = b.ret(Some(one), 2);
        let body = b.compound(None, Some(ret), 1);
        Some(b.func("main", TypeSpec::Void, None, body, 1))
    });

    assert!(!analysis.succeeded());
    assert_eq!(codes(&analysis), vec![2003]);
}

// void f(int a[]) { }  void main(void) { int b[3]; f(b); }
#[test]
fn test_passing_array_to_array_parameter() {
    let (_, analysis) = run(|b| {
        let a = b.array_param("a", TypeSpec::Int, 1);
        let f_body = b.compound(None, None, 1);
        let f = b.func("f", TypeSpec::Void, Some(a), f_body, 1);

        let b_arr = b.array_var("b", TypeSpec::Int, 3, 3);
        let arg = b.ident("b", 4);
        let call = b.call("f", Some(arg), 4);
        let main_body = b.compound(Some(b_arr), Some(call), 2);
        let main = b.func("main", TypeSpec::Void, None, main_body, 2);
        b.chain(&[f, main])
    });

    assert!(analysis.succeeded());
    assert!(analysis.diagnostics.is_empty());
}

// int main(void) { return foo(); }  -- foo never declared
#[test]
fn test_call_to_undeclared_function() {
    let (_, analysis) = run(|b| {
        let call = b.call("foo", None, 2);
        let ret = b.ret(Some(call), 2);
        let body = b.compound(None, Some(ret), 1);
        Some(b.func("main", TypeSpec::Int, None, body, 1))
    });

    assert!(!analysis.succeeded());
    let implicit: Vec<_> = analysis
        .diagnostics
        .diagnostics()
        .iter()
        .filter(|d| d.code == 2007)
        .collect();
    assert_eq!(implicit.len(), 1);
    assert!(implicit[0].message_text.contains("foo"));
    // binding reported the unresolved name, and the untyped call result
    // also fails the integer return
    assert_eq!(codes(&analysis), vec![1009, 2007, 2003]);
}

#[test]
fn test_clean_program_resolves_every_reference() {
    // int sum(int a[], int n) { int i; int s; s = 0; i = 0;
    //   while (i < n) { s = s + a[i]; i = i + 1; } return s; }
    // void main(void) { int data[8]; output(sum(data, 8)); }
    let (ast, analysis) = run(|b| {
        let pa = b.array_param("a", TypeSpec::Int, 1);
        let pn = b.param("n", TypeSpec::Int, 1);
        let params = b.chain(&[pa, pn]);

        let di = b.var("i", TypeSpec::Int, 2);
        let ds = b.var("s", TypeSpec::Int, 2);
        let decls = b.chain(&[di, ds]);

        let s0_l = b.ident("s", 3);
        let s0_r = b.constant(0, 3);
        let s0 = b.assign(s0_l, s0_r, 3);
        let i0_l = b.ident("i", 3);
        let i0_r = b.constant(0, 3);
        let i0 = b.assign(i0_l, i0_r, 3);

        let cond_l = b.ident("i", 4);
        let cond_r = b.ident("n", 4);
        let cond = b.binop(BinOp::Lt, cond_l, cond_r, 4);

        let acc_l = b.ident("s", 5);
        let acc_s = b.ident("s", 5);
        let idx = b.ident("i", 5);
        let elem = b.array_ident("a", Some(idx), 5);
        let sum_expr = b.binop(BinOp::Plus, acc_s, elem, 5);
        let acc = b.assign(acc_l, sum_expr, 5);

        let inc_l = b.ident("i", 6);
        let inc_i = b.ident("i", 6);
        let one = b.constant(1, 6);
        let inc_expr = b.binop(BinOp::Plus, inc_i, one, 6);
        let inc = b.assign(inc_l, inc_expr, 6);

        let loop_stmts = b.chain(&[acc, inc]);
        let loop_body = b.compound(None, loop_stmts, 4);
        let while_stmt = b.while_stmt(Some(cond), loop_body, 4);

        let ret_s = b.ident("s", 7);
        let ret = b.ret(Some(ret_s), 7);

        let stmts = b.chain(&[s0, i0, while_stmt, ret]);
        let sum_body = b.compound(decls, stmts, 1);
        let sum = b.func("sum", TypeSpec::Int, params, sum_body, 1);

        let data = b.array_var("data", TypeSpec::Int, 8, 10);
        let arg_data = b.ident("data", 11);
        let arg_len = b.constant(8, 11);
        let args = b.chain(&[arg_data, arg_len]);
        let call_sum = b.call("sum", args, 11);
        let out = b.call("output", Some(call_sum), 11);
        let main_body = b.compound(Some(data), Some(out), 9);
        let main = b.func("main", TypeSpec::Void, None, main_body, 9);

        b.chain(&[sum, main])
    });

    assert!(analysis.succeeded());
    // every name reference resolved to a concrete type
    for node in ast.iter() {
        match node.kind {
            NodeKind::Identifier { .. } | NodeKind::ArrayIdentifier { .. } => {
                assert_ne!(node.ty, ExpType::Void, "unresolved reference: {:?}", node.kind);
            }
            NodeKind::BinaryOp { .. } => {
                assert_eq!(node.ty, ExpType::Integer);
            }
            _ => {}
        }
    }
}

#[test]
fn test_report_covers_functions_globals_and_locals() {
    let (ast, analysis) = run(|b| {
        let g = b.var("counter", TypeSpec::Int, 1);
        let p = b.param("step", TypeSpec::Int, 2);
        let local = b.var("next", TypeSpec::Int, 3);
        let body = b.compound(Some(local), None, 2);
        let f = b.func("tick", TypeSpec::Void, Some(p), body, 2);
        b.chain(&[g, f])
    });

    let report = analysis.symbol_table_report(&ast);
    assert!(report.contains("tick"));
    assert!(report.contains("counter"));
    assert!(report.contains("step"));
    assert!(report.contains("next"));
    assert!(report.contains("input"));
    assert!(report.contains("output"));
}

#[test]
fn test_report_orders_sections_and_nesting_levels() {
    let (ast, analysis) = run(|b| {
        let g = b.var("total", TypeSpec::Int, 1);
        let x = b.var("x", TypeSpec::Int, 3);
        let body = b.compound(Some(x), None, 2);
        let main = b.func("main", TypeSpec::Void, None, body, 2);
        b.chain(&[g, main])
    });
    assert!(analysis.succeeded());

    let report = analysis.symbol_table_report(&ast);
    let functions = report.find("< Function Table >").unwrap();
    let globals = report.find("< Function and Global Variables >").unwrap();
    let locals = report.find("< Function Parameters and Local Variables >").unwrap();
    assert!(functions < globals);
    assert!(globals < locals);

    // main's scope hangs directly off global, so its local sits at level 1
    let row = report
        .lines()
        .find(|l| l.starts_with("main") && l.contains("x"))
        .expect("local row for main");
    let fields: Vec<&str> = row.split_whitespace().collect();
    assert_eq!(fields, vec!["main", "1", "x", "Integer"]);
}

#[test]
fn test_diagnostics_come_out_sorted_by_line() {
    let (_, analysis) = run(|b| {
        // an undeclared use on line 9 in the first function, a void
        // declaration on line 3 in the second
        let lhs = b.ident("ghost", 9);
        let rhs = b.constant(1, 9);
        let assign = b.assign(lhs, rhs, 9);
        let f_body = b.compound(None, Some(assign), 8);
        let f = b.func("late", TypeSpec::Void, None, f_body, 8);

        let bad = b.var("v", TypeSpec::Void, 3);
        let g_body = b.compound(Some(bad), None, 2);
        let g = b.func("early", TypeSpec::Void, None, g_body, 2);

        b.chain(&[f, g])
    });

    let lines: Vec<u32> = analysis.diagnostics.diagnostics().iter().map(|d| d.line).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
    assert!(!analysis.succeeded());
}
