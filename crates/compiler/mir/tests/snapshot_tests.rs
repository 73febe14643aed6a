//! Textual dumps of lowered functions.

mod common;

use common::lower_clean;
use mana_compiler_ast::build::*;
use mana_compiler_ast::BinaryOp;
use mana_compiler_mir::PrettyPrint;

#[test]
fn test_logical_and_dump() {
    let module = lower_clean(vec![function(
        "both",
        &["a", "b"],
        vec![ret(Some(binary(var("a"), BinaryOp::And, var("b"))))],
    )]);
    let both = module.function_by_name("both").unwrap();

    insta::assert_snapshot!(both.pretty_print(0), @r"
    fn both(a: int = %0, b: int = %1) -> int {
      block0 (entry):
        $0 = alloca int  // a
        $1 = alloca int  // b
        store $0, %0  // a
        store $1, %1  // b
        %2 = load $0  // a
        %3 = icmp ne %2, 0
        if %3 then jump block1 else jump block2
      block1 (and_rhs):
        %4 = load $1  // b
        %5 = icmp ne %4, 0
        jump block2
      block2 (and_merge):
        %6 = phi bool [block0: false], [block1: %5]
        %7 = zext %6
        return %7
    }
    ");
}

#[test]
fn test_while_dump() {
    let module = lower_clean(vec![
        var_decl("n", Some(float(1.5))),
        while_stmt(
            binary(var("n"), BinaryOp::Less, int(10)),
            expr_stmt(assign("n", binary(var("n"), BinaryOp::Mul, int(2)))),
        ),
    ]);
    let main = module.function_by_name("main").unwrap();

    insta::assert_snapshot!(main.pretty_print(0), @r"
    fn main() -> int {
      block0 (entry):
        $0 = alloca float  // n
        store $0, 1.5  // n
        jump block1
      block1 (loop_header):
        %0 = load $0  // n
        %1 = sitofp 10
        %2 = fcmp olt %0, %1
        if %2 then jump block2 else jump block3
      block2 (loop_body):
        %3 = load $0  // n
        %4 = sitofp 2
        %5 = fmul %3, %4
        store $0, %5  // n
        jump block1
      block3 (loop_exit):
        return 0
    }
    ");
}
