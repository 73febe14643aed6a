//! Loops and conditionals, lowered and executed.

mod common;

use common::{assert_well_formed, lower_clean, main_function, run_main};
use mana_compiler_ast::build::*;
use mana_compiler_ast::BinaryOp;

#[test]
fn test_while_loop_counts() {
    let module = lower_clean(vec![
        var_decl("i", Some(int(0))),
        var_decl("sum", Some(int(0))),
        while_stmt(
            binary(var("i"), BinaryOp::Less, int(5)),
            block(vec![
                expr_stmt(assign("sum", binary(var("sum"), BinaryOp::Add, var("i")))),
                expr_stmt(assign("i", binary(var("i"), BinaryOp::Add, int(1)))),
            ]),
        ),
        ret(Some(var("sum"))),
    ]);

    let main = main_function(&module);
    assert_well_formed(main);
    let header = main.blocks_named("loop_header").next().unwrap();
    // Entered from the entry block and from the end of the body
    assert_eq!(main.get_basic_block(header).unwrap().preds.len(), 2);
    assert_eq!(run_main(&module).0, 10);
}

#[test]
fn test_while_with_integer_condition() {
    let module = lower_clean(vec![
        var_decl("n", Some(int(3))),
        var_decl("steps", Some(int(0))),
        while_stmt(
            var("n"),
            block(vec![
                expr_stmt(assign("n", binary(var("n"), BinaryOp::Sub, int(1)))),
                expr_stmt(assign("steps", binary(var("steps"), BinaryOp::Add, int(1)))),
            ]),
        ),
        ret(Some(var("steps"))),
    ]);
    assert_eq!(run_main(&module).0, 3);
}

#[test]
fn test_nested_loops() {
    let module = lower_clean(vec![
        var_decl("total", Some(int(0))),
        var_decl("i", Some(int(0))),
        while_stmt(
            binary(var("i"), BinaryOp::Less, int(3)),
            block(vec![
                var_decl("j", Some(int(0))),
                while_stmt(
                    binary(var("j"), BinaryOp::Less, int(4)),
                    block(vec![
                        expr_stmt(assign("total", binary(var("total"), BinaryOp::Add, int(1)))),
                        expr_stmt(assign("j", binary(var("j"), BinaryOp::Add, int(1)))),
                    ]),
                ),
                expr_stmt(assign("i", binary(var("i"), BinaryOp::Add, int(1)))),
            ]),
        ),
        ret(Some(var("total"))),
    ]);
    assert_well_formed(main_function(&module));
    assert_eq!(run_main(&module).0, 12);
}

#[test]
fn test_return_from_inside_loop() {
    let module = lower_clean(vec![
        function(
            "first_multiple",
            &["n"],
            vec![
                var_decl("i", Some(int(1))),
                while_stmt(
                    boolean(true),
                    block(vec![
                        if_stmt(
                            binary(
                                binary(var("i"), BinaryOp::Mod, var("n")),
                                BinaryOp::Eq,
                                int(0),
                            ),
                            ret(Some(var("i"))),
                            None,
                        ),
                        expr_stmt(assign("i", binary(var("i"), BinaryOp::Add, int(7)))),
                    ]),
                ),
            ],
        ),
        ret(Some(call_named("first_multiple", vec![int(5)]))),
    ]);

    let function = module.function_by_name("first_multiple").unwrap();
    assert_well_formed(function);
    // 1, 8, 15
    assert_eq!(run_main(&module).0, 15);
}

#[test]
fn test_if_without_else_falls_through() {
    let module = lower_clean(vec![
        var_decl("x", Some(int(1))),
        if_stmt(
            binary(var("x"), BinaryOp::Greater, int(5)),
            expr_stmt(assign("x", int(100))),
            None,
        ),
        ret(Some(var("x"))),
    ]);
    let main = main_function(&module);
    assert_well_formed(main);
    assert_eq!(main.blocks_named("else").count(), 0);
    assert_eq!(run_main(&module).0, 1);
}

#[test]
fn test_else_if_chain() {
    let classify = |value| {
        lower_clean(vec![
            function(
                "classify",
                &["v"],
                vec![if_stmt(
                    binary(var("v"), BinaryOp::Less, int(0)),
                    ret(Some(int(-1))),
                    Some(if_stmt(
                        binary(var("v"), BinaryOp::Eq, int(0)),
                        ret(Some(int(0))),
                        Some(ret(Some(int(1)))),
                    )),
                )],
            ),
            ret(Some(call_named("classify", vec![int(value)]))),
        ])
    };

    for (value, expected) in [(-4, -1), (0, 0), (9, 1)] {
        let module = classify(value);
        let function = module.function_by_name("classify").unwrap();
        assert_well_formed(function);
        // Every path returns, so neither merge block was attached
        assert_eq!(function.blocks_named("merge").count(), 0);
        assert_eq!(run_main(&module).0, expected);
    }
}

#[test]
fn test_float_condition() {
    let module = lower_clean(vec![
        var_decl("f", Some(float(0.0))),
        var_decl("r", Some(int(0))),
        if_stmt(var("f"), expr_stmt(assign("r", int(1))), None),
        ret(Some(var("r"))),
    ]);
    assert_eq!(run_main(&module).0, 0);
}

#[test]
fn test_statements_after_returning_if_are_skipped() {
    let (module, diagnostics) = common::lower(vec![function(
        "f",
        &["a"],
        vec![
            if_stmt(var("a"), ret(Some(int(1))), Some(ret(Some(int(2))))),
            expr_stmt(assign("a", int(3))),
        ],
    )]);
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().len(), 1);
    assert_well_formed(module.function_by_name("f").unwrap());
}
