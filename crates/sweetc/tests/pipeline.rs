//! End-to-end pipeline scenarios (spec §8 S1-S6).

use std::fs;
use std::path::Path;

use sweetc::CompileError;

fn compile_str(source: &str) -> Result<String, CompileError> {
    sweetc::compile(source, Path::new("."))
}

#[test]
fn s1_minimal_main_returns_a_constant() {
    let asm = compile_str("fn main() -> int { return 42; }").unwrap();
    assert!(asm.contains("global main"));
    assert!(asm.contains("section .text"));
    assert!(asm.contains("main:"));
    assert!(asm.contains("push rbp"));
    assert!(asm.contains("mov rbp, rsp"));
    assert!(asm.contains("mov rax, 42"));
    assert!(asm.contains("mov rsp, rbp"));
    assert!(asm.contains("pop rbp"));
    assert!(asm.contains("ret"));
}

#[test]
fn s2_extern_call_with_string_literal() {
    let asm = compile_str(
        r#"extern puts(u8*) -> int;
fn main() -> int { puts("hi"); return 0; }"#,
    )
    .unwrap();
    assert!(asm.contains("extern puts"));
    assert!(asm.contains("LC1: db 104, 105, 0"));
    assert!(asm.contains("lea rax, [rel LC1]"));
    assert!(asm.contains("mov rdi, rax"));
    assert!(asm.contains("xor rax, rax"));
    assert!(asm.contains("call puts"));
}

#[test]
fn s3_two_integer_parameters() {
    let asm = compile_str("fn add(a: int, b: int) -> int { return a + b; }").unwrap();
    assert!(asm.contains("mov [rbp-8], rdi"));
    assert!(asm.contains("mov [rbp-16], rsi"));
    assert!(asm.contains("mov rax, [rbp-8]"));
    assert!(asm.contains("push rax"));
    assert!(asm.contains("mov rax, [rbp-16]"));
    assert!(asm.contains("mov rbx, rax"));
    assert!(asm.contains("pop rax"));
    assert!(asm.contains("add rax, rbx"));
}

#[test]
fn s4_initialized_top_level_global() {
    let asm = compile_str("var g: int = 7;").unwrap();
    assert!(asm.contains("section .data"));
    assert!(asm.contains("g: dq 7"));
    assert!(asm.contains("global g"));
}

#[test]
fn s5_out_of_range_integer_literal_is_rejected() {
    let err = compile_str("fn f() { var x: u8 = 300; }").unwrap_err();
    assert!(matches!(err, CompileError::Type(_)));
}

#[test]
fn s6_symbol_list_import_prunes_unreferenced_globals() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("a");
    fs::create_dir(&sub).unwrap();
    fs::write(
        sub.join("b.sw"),
        "fn foo() -> int { return 1; }\nvar bar: int = 1;\n",
    )
    .unwrap();

    let asm = sweetc::compile(
        "import a.b : foo;\nfn main() -> int { return foo(); }",
        dir.path(),
    )
    .unwrap();

    assert!(asm.contains("extern foo"));
    assert!(!asm.contains("bar"));
}

#[test]
fn testable_property_repeated_import_splices_symbols_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("base.sw"),
        "fn shared() -> int { return 1; }\n",
    )
    .unwrap();

    let asm = sweetc::compile(
        "import base;\nimport base;\nfn main() -> int { return shared(); }",
        dir.path(),
    )
    .unwrap();

    assert_eq!(asm.matches("extern shared").count(), 1);
}

#[test]
fn testable_property_string_pool_deduplication() {
    let asm = compile_str(
        r#"extern puts(u8*) -> int;
fn main() -> int { puts("hi"); puts("hi"); return 0; }"#,
    )
    .unwrap();
    assert_eq!(asm.matches("LC1:").count(), 1);
    assert_eq!(asm.matches("LC2:").count(), 0);
}

#[test]
fn testable_property_call_site_alignment_for_odd_stack_args() {
    let asm = compile_str(
        r#"extern sink(int, int, int, int, int, int, int) -> int;
fn main() -> int { return sink(1, 2, 3, 4, 5, 6, 7); }"#,
    )
    .unwrap();
    assert!(asm.contains("sub rsp, 8"));
    assert!(asm.contains("call sink"));
    assert!(asm.contains("add rsp, 8"));
}
