//! Module import resolution (spec §4.4).
//!
//! Grounded in `original_source/core/importer.py`'s `Importer` class:
//! `resolve_imports`/`build_dependency_graph`/`find_dependencies_in_node`/
//! `collect_dependencies`/`resolve_module_path`/`make_extern_node`, ported
//! from the dynamic-dispatch walker there into exhaustive `match`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use sweetc_par::{AccessPart, Expr, ExternDecl, FunctionDef, ImportNode, Stmt, TopLevel};
use sweetc_types::Type;
use sweetc_util::Symbol;

use crate::error::ImportError;

/// Result of splicing every `ImportNode` in a module's top-level list.
pub struct ImportResult {
    /// The top-level list with every `ImportNode` replaced by the
    /// `ExternDecl` stubs it resolved to, in its original position.
    pub top_level: Vec<TopLevel>,
    /// Every imported module's resolved file path, in import order, with
    /// duplicates (repeated or diamond imports) removed. The external
    /// collaborator compiles each of these independently.
    pub imported_modules: Vec<PathBuf>,
}

/// Replaces every `ImportNode` in `top_level` with the `ExternDecl` stubs
/// it resolves to. `search_root` is the directory dotted import paths are
/// resolved against.
pub fn resolve_imports(
    top_level: Vec<TopLevel>,
    search_root: &Path,
) -> Result<ImportResult, ImportError> {
    let mut visited = HashSet::new();
    let mut imported_modules = Vec::new();
    let top_level = resolve_imports_inner(top_level, search_root, &mut visited, &mut imported_modules)?;
    Ok(ImportResult {
        top_level,
        imported_modules,
    })
}

/// Recursive worker sharing one `visited` set and one `imported_modules`
/// list across the whole transitive import graph, not just the entry
/// module — an imported module's own imports are resolved (and folded
/// into `visited`) before its dependency graph is built, matching
/// `importer.py`'s single long-lived `Importer` instance threading
/// `self.visited`/`self.imported_modules` through every recursive
/// `resolve_imports` call.
fn resolve_imports_inner(
    top_level: Vec<TopLevel>,
    search_root: &Path,
    visited: &mut HashSet<PathBuf>,
    imported_modules: &mut Vec<PathBuf>,
) -> Result<Vec<TopLevel>, ImportError> {
    let mut result = Vec::with_capacity(top_level.len());

    for item in top_level {
        let TopLevel::Import(import) = item else {
            result.push(item);
            continue;
        };

        let path = resolve_module_path(&import, search_root);
        if !path.is_file() {
            return Err(ImportError::ModuleNotFound {
                path: path.display().to_string(),
                span: import.span,
            });
        }

        // Cycle / diamond safety: a visited set keyed by absolute file
        // path short-circuits re-imports. A module already seen
        // anywhere in the transitive graph contributes no further stubs
        // here — its stubs were already spliced in at first occurrence.
        if !visited.insert(path.clone()) {
            continue;
        }
        imported_modules.push(path.clone());

        let source = fs::read_to_string(&path).map_err(|e| ImportError::Io {
            reason: format!("reading {}: {e}", path.display()),
            span: import.span,
        })?;
        let tokens = sweetc_lex::lex(&source).map_err(|e| ImportError::Io {
            reason: format!("lexing {}: {e}", path.display()),
            span: import.span,
        })?;
        let module_items = sweetc_par::parse(tokens).map_err(|e| ImportError::Io {
            reason: format!("parsing {}: {e}", path.display()),
            span: import.span,
        })?;
        let module_items = resolve_imports_inner(module_items, search_root, visited, imported_modules)?;

        let wanted = selected_symbols(&import, &module_items);
        for stub_item in module_items
            .iter()
            .filter(|item| item.name().is_some_and(|n| wanted.contains(&n)))
        {
            if let Some(extern_decl) = make_extern_node(stub_item) {
                result.push(TopLevel::Extern(extern_decl));
            }
        }
    }

    Ok(result)
}

/// `a.b.c` maps to `<search_root>/a/b/c.sw`.
fn resolve_module_path(import: &ImportNode, search_root: &Path) -> PathBuf {
    let mut path = search_root.to_path_buf();
    for part in &import.parts {
        path.push(part.as_str());
    }
    path.set_extension("sw");
    path
}

/// Which top-level names of the imported module should get stubs
/// spliced into the importing module.
fn selected_symbols(import: &ImportNode, module_items: &[TopLevel]) -> HashSet<Symbol> {
    match &import.imported_symbols {
        // No explicit symbol list: every top-level named node propagates.
        None => module_items.iter().filter_map(TopLevel::name).collect(),
        // An explicit list: prune to the transitive call closure over
        // the module's internal call graph (spec §4.4 "Pruning").
        Some(roots) => transitive_call_closure(module_items, roots),
    }
}

/// Smallest set containing `roots` and every name transitively called,
/// directly, by a member of the set (spec §4.4, GLOSSARY "Transitive
/// call closure").
fn transitive_call_closure(module_items: &[TopLevel], roots: &[Symbol]) -> HashSet<Symbol> {
    let graph = build_dependency_graph(module_items);

    let mut closure: HashSet<Symbol> = roots.iter().copied().collect();
    let mut frontier: Vec<Symbol> = roots.to_vec();
    while let Some(name) = frontier.pop() {
        let Some(callees) = graph.get(&name) else {
            continue;
        };
        for &callee in callees {
            if closure.insert(callee) {
                frontier.push(callee);
            }
        }
    }
    closure
}

/// `defined-name -> set of identifiers referenced in that definition's
/// body, filtered to call sites` (spec §4.4).
fn build_dependency_graph(module_items: &[TopLevel]) -> HashMap<Symbol, HashSet<Symbol>> {
    let mut graph = HashMap::new();
    for item in module_items {
        match item {
            TopLevel::Function(f) => {
                graph.insert(f.name, find_dependencies_in_body(&f.body));
            }
            TopLevel::Variable(v) => {
                let mut deps = HashSet::new();
                if let Some(value) = &v.value {
                    collect_dependencies(value, &mut deps);
                }
                graph.insert(v.name, deps);
            }
            TopLevel::Extern(_) | TopLevel::Import(_) | TopLevel::Asm(_) => {}
        }
    }
    graph
}

fn find_dependencies_in_body(body: &[Stmt]) -> HashSet<Symbol> {
    let mut deps = HashSet::new();
    for stmt in body {
        match stmt {
            Stmt::Expr(e) => collect_dependencies(e, &mut deps),
            Stmt::VariableDef(v) => {
                if let Some(value) = &v.value {
                    collect_dependencies(value, &mut deps);
                }
            }
            Stmt::Return(r) => {
                if let Some(e) = &r.expr {
                    collect_dependencies(e, &mut deps);
                }
            }
            Stmt::Asm(_) => {}
        }
    }
    deps
}

/// Walks an expression tree collecting every call-site callee name.
fn collect_dependencies(expr: &Expr, deps: &mut HashSet<Symbol>) {
    match expr {
        Expr::Call(call) => {
            deps.insert(call.callee);
            for arg in &call.arguments {
                collect_dependencies(arg, deps);
            }
        }
        Expr::Binary(b) => {
            collect_dependencies(&b.left, deps);
            collect_dependencies(&b.right, deps);
        }
        Expr::Deref(d) => collect_dependencies(&d.inner, deps),
        Expr::Cast(c) => collect_dependencies(&c.expr, deps),
        Expr::Assign(a) => collect_dependencies(&a.value, deps),
        Expr::Array(arr) => {
            for el in &arr.elements {
                collect_dependencies(el, deps);
            }
        }
        Expr::Access(access) => {
            for part in &access.parts {
                if let AccessPart::Index(idx) = part {
                    collect_dependencies(idx, deps);
                }
            }
        }
        Expr::Pointer(p) => {
            if let sweetc_par::PointerTarget::AddressOf(inner) = &p.target {
                collect_dependencies(inner, deps);
            }
        }
        Expr::Number(_) | Expr::Str(_) | Expr::Char(_) | Expr::Bool(_) => {}
    }
}

/// A `FunctionDef` becomes an `ExternDecl` with the same name, variadic
/// flag (true if any parameter is variadic), return type (default
/// `void`), and parameter list. A `VariableDef` becomes an `ExternDecl`
/// marked `is_variable` with its declared type (spec §4.4 "Stub
/// construction").
fn make_extern_node(item: &TopLevel) -> Option<ExternDecl> {
    match item {
        TopLevel::Function(f) => Some(extern_from_function(f)),
        TopLevel::Variable(v) => Some(ExternDecl {
            name: v.name,
            is_variadic: false,
            return_type: Some(v.ty),
            parameters: Vec::new(),
            is_variable: true,
            span: v.span,
        }),
        // An already-extern or asm/import top-level item has no stub of
        // its own to contribute (its declarations, if re-exported,
        // belong to the module that declared them originally).
        TopLevel::Extern(_) | TopLevel::Import(_) | TopLevel::Asm(_) => None,
    }
}

fn extern_from_function(f: &FunctionDef) -> ExternDecl {
    ExternDecl {
        name: f.name,
        is_variadic: f.parameters.iter().any(|p| p.is_variadic),
        return_type: Some(f.return_type.unwrap_or_else(|| Type::named("void"))),
        parameters: f.parameters.iter().map(|p| p.ty).collect(),
        is_variable: false,
        span: f.span,
    }
}
