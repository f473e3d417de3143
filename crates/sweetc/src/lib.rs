//! Driver crate: wires the five pipeline stages together behind one
//! `compile` entry point (spec §2 "Pipeline").
//!
//! ```text
//! source text -> lex -> parse -> resolve imports -> typecheck -> codegen -> NASM text
//! ```
//!
//! Each stage halts the pipeline on its first error (spec §7); nothing
//! downstream of a failing stage runs.

mod error;

pub use error::CompileError;

use std::path::Path;

/// Compiles one module's source text to NASM x86-64 assembly text.
///
/// `search_root` is the directory dotted `import` paths are resolved
/// against (spec §4.4); it is typically the directory containing the
/// entry module.
pub fn compile(source: &str, search_root: &Path) -> Result<String, CompileError> {
    let tokens = sweetc_lex::lex(source)?;
    let top_level = sweetc_par::parse(tokens)?;
    let imported = sweetc_sem::resolve_imports(top_level, search_root)?;

    let mut checker = sweetc_sem::TypeChecker::new();
    checker.check_program(&imported.top_level)?;

    let asm = sweetc_gen::generate(&imported.top_level)?;
    Ok(asm)
}
