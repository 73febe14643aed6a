use std::io::Write;

use mana_compiler::{compile_file, CompilerError, CompilerOptions};
use mana_compiler_ast::build::*;
use mana_compiler_ast::{BinaryOp, Program};
use tempfile::NamedTempFile;

fn write_program(program: &Program) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let json = serde_json::to_string_pretty(program).expect("Failed to serialize program");
    file.write_all(json.as_bytes())
        .expect("Failed to write program");
    file
}

#[test]
fn test_compile_file_round_trip() {
    let program = Program::new(vec![
        function(
            "square",
            &["n"],
            vec![ret(Some(binary(var("n"), BinaryOp::Mul, var("n"))))],
        ),
        var_decl("x", Some(call_named("square", vec![int(7)]))),
        expr_stmt(call_named("print", vec![string("done")])),
    ]);
    let file = write_program(&program);

    let output = compile_file(file.path(), &CompilerOptions::default()).unwrap();
    let module = output.module;
    assert!(module.lookup_function("square").is_some());
    assert!(module.dump().contains("@str0 = \"done\""));
    assert!(module.validate().is_ok());
}

#[test]
fn test_compile_file_hand_written_json() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "statements": [
                {{ "node": {{ "var_decl": {{
                    "name": "x",
                    "initializer": {{ "node": {{ "literal": {{ "float": 2.5 }} }} }},
                    "is_const": true
                }} }} }}
            ]
        }}"#
    )
    .unwrap();

    let output = compile_file(file.path(), &CompilerOptions::default()).unwrap();
    let main = output.module.function_by_name("main").unwrap();
    assert_eq!(main.slots.len(), 1);
}

#[test]
fn test_compile_file_reports_errors() {
    let file = write_program(&Program::new(vec![
        expr_stmt(at(var("ghost"), 4, 2)),
        expr_stmt(call_named("nothing", vec![])),
    ]));

    match compile_file(file.path(), &CompilerOptions::default()) {
        Err(CompilerError::LoweringErrors(diagnostics)) => {
            assert_eq!(diagnostics.len(), 2);
            assert_eq!(diagnostics[0].message, "Unknown function name: nothing");
            assert_eq!(diagnostics[1].location.line, 4);
        }
        other => panic!("expected lowering errors, got {other:?}"),
    }
}

#[test]
fn test_compile_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let error = compile_file(&missing, &CompilerOptions::default()).unwrap_err();
    assert!(matches!(error, CompilerError::Io { .. }));
    assert!(error.to_string().contains("missing.json"));
}
