use bfc::compiler::{compile, compile_source, CompileOptions, EmitKind};
use bfc::mir::{run_program, MirBuilder};
use bfc::translator::translate;
use bfc::CompileError;
use std::fs;
use std::path::PathBuf;

fn program_path(kind: &str, filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/programs")
        .join(kind)
        .join(filename)
}

fn temp_output(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bfc_test_{}_{}", std::process::id(), name))
}

fn run_file(filename: &str, input: &[u8]) -> Vec<u8> {
    let source = fs::read_to_string(program_path("valid", filename)).unwrap();
    let mut builder = MirBuilder::new();
    translate(&mut builder, source.chars()).unwrap();
    run_program(&builder.into_program(), input).unwrap().output
}

fn compile_file(
    kind: &str,
    filename: &str,
    emit: EmitKind,
    out: &str,
) -> (Result<(), CompileError>, PathBuf) {
    let output = temp_output(out);
    let _ = fs::remove_file(&output);
    let opts = CompileOptions {
        input_path: Some(program_path(kind, filename)),
        output_path: Some(output.clone()),
        emit,
        ..Default::default()
    };
    (compile(&opts), output)
}

// =====================
// Programs
// =====================

#[test]
fn test_hello_world_runs() {
    assert_eq!(run_file("hello_world.bf", b""), b"Hello World!\n");
}

#[test]
fn test_cat_runs() {
    assert_eq!(run_file("cat.bf", b"abc\n"), b"abc\n");
}

#[test]
fn test_add_digits_runs() {
    assert_eq!(run_file("add_digits.bf", b"34"), b"7");
}

// =====================
// Pipeline
// =====================

#[test]
fn test_compile_writes_llvm_ir() {
    let (result, output) = compile_file("valid", "hello_world.bf", EmitKind::LlvmIr, "hello.ll");
    result.unwrap();
    let ir = fs::read_to_string(&output).unwrap();
    assert!(ir.contains("define i32 @main()"));
    assert!(ir.contains("target triple = \"x86_64-pc-linux-gnu\""));
    let _ = fs::remove_file(&output);
}

#[test]
fn test_compile_writes_mir() {
    let (result, output) = compile_file("valid", "cat.bf", EmitKind::Mir, "cat.mir");
    result.unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("call @safe_getchar()"));
    let _ = fs::remove_file(&output);
}

#[test]
fn test_custom_target_triple() {
    let ir = compile_source("+.", EmitKind::LlvmIr, "aarch64-unknown-linux-gnu").unwrap();
    let ir = String::from_utf8(ir).unwrap();
    assert!(ir.contains("target triple = \"aarch64-unknown-linux-gnu\""));
}

#[test]
fn test_backends_agree_on_loops() {
    let source = fs::read_to_string(program_path("valid", "hello_world.bf")).unwrap();
    let last = format!("loop.exit.{}", source.matches('[').count() - 1);
    let past = format!("loop.exit.{}", source.matches('[').count());
    for emit in [EmitKind::LlvmIr, EmitKind::Mir] {
        let out = compile_source(&source, emit, "x86_64-pc-linux-gnu").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&last), "{:?} lacks {}", emit, last);
        assert!(!text.contains(&past), "{:?} has {}", emit, past);
    }
}

// =====================
// Balance errors produce no output
// =====================

#[test]
fn test_stray_close_writes_nothing() {
    let (result, output) = compile_file("invalid", "stray_close.bf", EmitKind::LlvmIr, "stray.ll");
    assert!(matches!(result, Err(CompileError::UnexpectedClose { line: 2, col: 1 })));
    assert!(!output.exists());
}

#[test]
fn test_unclosed_loop_writes_nothing() {
    let (result, output) =
        compile_file("invalid", "unclosed_loop.bf", EmitKind::LlvmIr, "unclosed.ll");
    assert!(matches!(result, Err(CompileError::UnclosedOpen { line: 1, col: 2 })));
    assert!(!output.exists());
}

#[test]
fn test_scenarios_from_source() {
    assert!(matches!(
        compile_source("]", EmitKind::LlvmIr, "x86_64-pc-linux-gnu"),
        Err(CompileError::UnexpectedClose { .. })
    ));
    assert!(matches!(
        compile_source("[", EmitKind::Mir, "x86_64-pc-linux-gnu"),
        Err(CompileError::UnclosedOpen { .. })
    ));
}

#[test]
fn test_missing_input_file() {
    let opts = CompileOptions {
        input_path: Some(program_path("valid", "does_not_exist.bf")),
        output_path: Some(temp_output("missing.ll")),
        ..Default::default()
    };
    assert!(matches!(compile(&opts), Err(CompileError::Io(_))));
}
