//! Static type checking (spec §4.3, §4.5).
//!
//! Ported from `original_source/core/typechecker.py`'s `TypeChecker`
//! class, whose dynamic `check_<NodeName>` dispatch becomes an
//! exhaustive `match` over `Expr`/`Stmt`/`TopLevel` here (spec §9
//! "Dynamic dispatch becomes exhaustive match").

use indexmap::IndexMap;

use sweetc_par::{
    AccessPart, Assignment, AssignTarget, BinaryOp, Cast, Dereference, Expr, ExternDecl,
    FunctionCall, FunctionDef, NumberValue, PointerLiteral, PointerTarget, ReturnNode, Stmt,
    TopLevel, VariableAccess, VariableDef,
};
use sweetc_types::Type;
use sweetc_util::{Span, Symbol};

use crate::error::TypeError;

#[derive(Clone)]
struct FunctionSig {
    return_type: Type,
    parameter_types: Vec<Type>,
    is_variadic: bool,
}

/// Walks a module's (already import-resolved) top-level list once, in
/// declaration order, validating every definition, assignment, binary
/// op, call, and return against the compatibility rules of spec §4.3.
pub struct TypeChecker {
    /// `name -> Type` for variables in the current scope. Shared flat
    /// table for globals and locals alike (spec §3): a function entry
    /// saves it by value and a function exit restores it, so parameters
    /// and locals declared inside one function never leak into another,
    /// but they *do* shadow-collide with already-declared globals
    /// (ported faithfully from the original's single `self.symbols`
    /// dict, which is never cleared before parameters are inserted).
    symbols: IndexMap<Symbol, Type>,
    /// Flat function table: externs and definitions share one
    /// namespace, so redeclaring either as the other is a duplicate
    /// definition error.
    functions: IndexMap<Symbol, FunctionSig>,
    current_function: Option<Symbol>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            symbols: IndexMap::new(),
            functions: IndexMap::new(),
            current_function: None,
        }
    }

    pub fn check_program(&mut self, top_level: &[TopLevel]) -> Result<(), TypeError> {
        for item in top_level {
            self.check_top_level(item)?;
        }
        Ok(())
    }

    fn check_top_level(&mut self, item: &TopLevel) -> Result<(), TypeError> {
        match item {
            TopLevel::Function(f) => self.check_function_def(f).map(|_| ()),
            TopLevel::Variable(v) => self.check_variable_def(v).map(|_| ()),
            TopLevel::Extern(e) => self.check_extern_decl(e).map(|_| ()),
            // Already resolved away by the importer in the normal
            // pipeline; a defensive no-op if one slips through.
            TopLevel::Import(_) | TopLevel::Asm(_) => Ok(()),
        }
    }

    fn check_function_def(&mut self, f: &FunctionDef) -> Result<Type, TypeError> {
        if self.functions.contains_key(&f.name) {
            return Err(TypeError::DuplicateDefinition {
                name: f.name.to_string(),
                span: f.span,
            });
        }
        let return_type = f.return_type.unwrap_or_else(|| Type::named("void"));
        self.functions.insert(
            f.name,
            FunctionSig {
                return_type,
                parameter_types: f.parameters.iter().map(|p| p.ty).collect(),
                is_variadic: false,
            },
        );

        self.current_function = Some(f.name);
        let saved_symbols = self.symbols.clone();

        for param in &f.parameters {
            if self.symbols.contains_key(&param.name) {
                return Err(TypeError::DuplicateDefinition {
                    name: param.name.to_string(),
                    span: param.span,
                });
            }
            self.symbols.insert(param.name, param.ty);
        }

        for stmt in &f.body {
            self.check_stmt(stmt)?;
        }

        self.symbols = saved_symbols;
        self.current_function = None;
        Ok(return_type)
    }

    fn check_extern_decl(&mut self, e: &ExternDecl) -> Result<Type, TypeError> {
        let declared_type = e.return_type.unwrap_or_else(|| Type::named("void"));
        if e.is_variable {
            if self.symbols.contains_key(&e.name) {
                return Err(TypeError::DuplicateDefinition {
                    name: e.name.to_string(),
                    span: e.span,
                });
            }
            self.symbols.insert(e.name, declared_type);
        } else {
            if self.functions.contains_key(&e.name) {
                return Err(TypeError::DuplicateDefinition {
                    name: e.name.to_string(),
                    span: e.span,
                });
            }
            self.functions.insert(
                e.name,
                FunctionSig {
                    return_type: declared_type,
                    parameter_types: e.parameters.clone(),
                    is_variadic: e.is_variadic,
                },
            );
        }
        Ok(declared_type)
    }

    /// Shared by top-level `VariableDef`s and local `Stmt::VariableDef`s
    /// — the original's flat `self.symbols` dict makes no distinction
    /// between the two.
    fn check_variable_def(&mut self, def: &VariableDef) -> Result<Type, TypeError> {
        if self.symbols.contains_key(&def.name) {
            return Err(TypeError::DuplicateDefinition {
                name: def.name.to_string(),
                span: def.span,
            });
        }
        if let Some(value) = &def.value {
            let val_type = self.check_expr(value)?;
            if !def.ty.is_compatible_with(&val_type) {
                return Err(TypeError::TypeMismatch {
                    expected: def.ty,
                    found: val_type,
                    span: def.span,
                });
            }
            self.check_integer_range(&def.ty, value)?;
        }
        self.symbols.insert(def.name, def.ty);
        Ok(def.ty)
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<Type, TypeError> {
        match stmt {
            Stmt::Expr(e) => self.check_expr(e),
            Stmt::VariableDef(v) => self.check_variable_def(v),
            Stmt::Return(r) => self.check_return(r),
            Stmt::Asm(_) => Ok(Type::named("void")),
        }
    }

    fn check_return(&mut self, ret: &ReturnNode) -> Result<Type, TypeError> {
        let Some(expr) = &ret.expr else {
            return Ok(Type::named("void"));
        };
        let return_type = self.check_expr(expr)?;
        if let Some(current) = self.current_function {
            let declared = self.functions[&current].return_type;
            if !declared.is_compatible_with(&return_type) {
                return Err(TypeError::TypeMismatch {
                    expected: declared,
                    found: return_type,
                    span: ret.span,
                });
            }
        }
        Ok(return_type)
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, TypeError> {
        match expr {
            Expr::Number(n) => Ok(match n.value {
                NumberValue::Int(_) => Type::named("int"),
                NumberValue::Float(_) => Type::named("f64"),
            }),
            Expr::Str(_) => Ok(Type::named("string")),
            Expr::Char(_) => Ok(Type::named("char")),
            Expr::Bool(_) => Ok(Type::named("bool")),
            Expr::Array(arr) => {
                if arr.elements.is_empty() {
                    return Err(TypeError::EmptyArrayLiteral { span: arr.span });
                }
                let mut element_types = Vec::with_capacity(arr.elements.len());
                for elem in &arr.elements {
                    element_types.push(self.check_expr(elem)?);
                }
                let first = element_types[0];
                for &other in &element_types[1..] {
                    if !first.is_compatible_with(&other) {
                        return Err(TypeError::TypeMismatch {
                            expected: first,
                            found: other,
                            span: arr.span,
                        });
                    }
                }
                // Matches the original exactly: the element type's own
                // pointer level is dropped, the array type is always
                // built from the bare element name.
                Ok(Type::named(first.name.as_str()).array_of(arr.elements.len()))
            }
            Expr::Pointer(p) => self.check_pointer_literal(p),
            Expr::Access(access) => self.check_variable_access(access),
            Expr::Binary(b) => self.check_binary_op(b),
            Expr::Deref(d) => self.check_dereference(d),
            Expr::Cast(c) => self.check_cast(c),
            Expr::Assign(a) => self.check_assignment(a),
            Expr::Call(c) => self.check_function_call(c),
        }
    }

    fn check_pointer_literal(&mut self, p: &PointerLiteral) -> Result<Type, TypeError> {
        match &p.target {
            PointerTarget::Null => Ok(Type::named("void").pointer_to()),
            PointerTarget::AddressOf(inner) => {
                let inner_ty = self.check_expr(inner)?;
                Ok(inner_ty.pointer_to())
            }
        }
    }

    fn check_variable_access(&mut self, access: &VariableAccess) -> Result<Type, TypeError> {
        let name = access.leading_name();
        let var_type = *self
            .symbols
            .get(&name)
            .ok_or_else(|| TypeError::UndefinedVariable {
                name: name.to_string(),
                span: access.span,
            })?;
        if access.parts.len() > 1 {
            return self.check_member_access(var_type, &access.parts[1], access.span);
        }
        Ok(var_type)
    }

    /// Only `.len` on an array is recognized — the type checker accepts
    /// it (returning `usize`) even though codegen later rejects it as
    /// unimplemented (spec §9 design note 3, preserved deliberately).
    /// Only the second access part is ever consulted, matching the
    /// original's `node.parts[1]`; a third part (e.g. `arr.len.foo`)
    /// is silently never reached.
    fn check_member_access(
        &self,
        base_type: Type,
        part: &AccessPart,
        span: Span,
    ) -> Result<Type, TypeError> {
        if let AccessPart::Name(member) = part {
            if member.as_str() == "len" {
                if base_type.can_have_len_property() {
                    return Ok(Type::named("usize"));
                }
                return Err(TypeError::UnknownMember {
                    member: member.to_string(),
                    ty: base_type,
                    span,
                });
            }
            return Err(TypeError::UnknownMember {
                member: member.to_string(),
                ty: base_type,
                span,
            });
        }
        Err(TypeError::UnknownMember {
            member: "[index]".to_string(),
            ty: base_type,
            span,
        })
    }

    fn check_binary_op(&mut self, b: &BinaryOp) -> Result<Type, TypeError> {
        let left_type = self.check_expr(&b.left)?;
        let right_type = self.check_expr(&b.right)?;
        if left_type != right_type {
            return Err(TypeError::TypeMismatch {
                expected: left_type,
                found: right_type,
                span: b.span,
            });
        }
        if !(left_type.is_integer() || left_type.is_string() || left_type.is_array) {
            return Err(TypeError::UnsupportedOperand {
                ty: left_type,
                span: b.span,
            });
        }
        Ok(left_type)
    }

    fn check_dereference(&mut self, d: &Dereference) -> Result<Type, TypeError> {
        let inner_ty = self.check_expr(&d.inner)?;
        dereference_type(inner_ty, d.span)
    }

    fn check_cast(&mut self, c: &Cast) -> Result<Type, TypeError> {
        // Evaluated for side effects / error propagation only — the
        // result is the target type verbatim (spec §4.5).
        self.check_expr(&c.expr)?;
        Ok(c.target_type)
    }

    fn check_assignment(&mut self, a: &Assignment) -> Result<Type, TypeError> {
        let var_type = match &a.target {
            AssignTarget::Name(name) => {
                *self
                    .symbols
                    .get(name)
                    .ok_or_else(|| TypeError::UndefinedVariable {
                        name: name.to_string(),
                        span: a.span,
                    })?
            }
            AssignTarget::Deref(inner) => {
                let inner_ty = self.check_expr(inner)?;
                dereference_type(inner_ty, a.span)?
            }
        };

        let val_type = self.check_expr(&a.value)?;
        if !var_type.is_compatible_with(&val_type) {
            return Err(TypeError::TypeMismatch {
                expected: var_type,
                found: val_type,
                span: a.span,
            });
        }
        self.check_integer_range(&var_type, &a.value)?;
        Ok(var_type)
    }

    fn check_function_call(&mut self, call: &FunctionCall) -> Result<Type, TypeError> {
        let sig = self
            .functions
            .get(&call.callee)
            .cloned()
            .ok_or_else(|| TypeError::UndefinedFunction {
                name: call.callee.to_string(),
                span: call.span,
            })?;

        if sig.is_variadic {
            if call.arguments.len() < sig.parameter_types.len() {
                return Err(TypeError::ArityMismatch {
                    expected: sig.parameter_types.len(),
                    found: call.arguments.len(),
                    span: call.span,
                });
            }
        } else if sig.parameter_types.len() != call.arguments.len() {
            return Err(TypeError::ArityMismatch {
                expected: sig.parameter_types.len(),
                found: call.arguments.len(),
                span: call.span,
            });
        }

        // Fixed prefix must match and be type-compatible; any trailing
        // variadic arguments are left unchecked (spec §4.5).
        for (param_ty, arg) in sig.parameter_types.iter().zip(&call.arguments) {
            let arg_ty = self.check_expr(arg)?;
            if !param_ty.is_compatible_with(&arg_ty) {
                return Err(TypeError::TypeMismatch {
                    expected: *param_ty,
                    found: arg_ty,
                    span: arg.span(),
                });
            }
        }

        Ok(sig.return_type)
    }

    /// Integer/float literal range gating (spec §4.3's "Integer-range
    /// check"). Only activates when `value` is itself a literal the
    /// range is derivable from (`NumberLiteral` or `CharLiteral`) —
    /// ported from `_check_integer_range`, which likewise only inspects
    /// the value node's own class, never a computed expression's value.
    fn check_integer_range(&self, ty: &Type, value: &Expr) -> Result<(), TypeError> {
        if ty.is_float() {
            if ty.name.as_str() == "f32" {
                if let Expr::Number(n) = value {
                    let as_f64 = match n.value {
                        NumberValue::Float(v) => v,
                        NumberValue::Int(v) => v as f64,
                    };
                    if !Type::f32_value_in_range(as_f64) {
                        return Err(TypeError::LiteralOutOfRange {
                            value: as_f64.to_string(),
                            ty: *ty,
                            span: n.span,
                        });
                    }
                }
            }
            return Ok(());
        }

        let Some((min, max)) = ty.integer_bounds() else {
            return Ok(());
        };
        let val: i128 = match value {
            Expr::Number(n) => match n.value {
                NumberValue::Int(v) => v,
                // A fractional literal assigned to an integer type is
                // already rejected by `is_compatible_with` before this
                // check runs; nothing further to gate here.
                NumberValue::Float(_) => return Ok(()),
            },
            Expr::Char(c) => c.value as i128,
            _ => return Ok(()),
        };
        if val < min || val > max {
            return Err(TypeError::LiteralOutOfRange {
                value: val.to_string(),
                ty: *ty,
                span: value.span(),
            });
        }
        Ok(())
    }
}

fn dereference_type(ty: Type, span: Span) -> Result<Type, TypeError> {
    if ty.pointer_level == 0 {
        return Err(TypeError::DerefOfNonPointer { ty, span });
    }
    if ty.pointer_level == 1 && ty.name.as_str() == "void" {
        return Err(TypeError::DerefOfVoidPointer { span });
    }
    Ok(ty.dereferenced())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> Result<(), TypeError> {
        let tokens = sweetc_lex::lex(source).unwrap();
        let top_level = sweetc_par::parse(tokens).unwrap();
        TypeChecker::new().check_program(&top_level)
    }

    #[test]
    fn well_typed_function_passes() {
        assert!(check("fn add(a: int, b: int) -> int { return a + b; }").is_ok());
    }

    #[test]
    fn undefined_variable_is_rejected() {
        let err = check("fn f() -> int { return x; }").unwrap_err();
        assert!(matches!(err, TypeError::UndefinedVariable { .. }));
    }

    #[test]
    fn undefined_function_call_is_rejected() {
        let err = check("fn f() -> int { return g(); }").unwrap_err();
        assert!(matches!(err, TypeError::UndefinedFunction { .. }));
    }

    #[test]
    fn duplicate_function_definition_is_rejected() {
        let err = check("fn f() -> int { return 0; } fn f() -> int { return 1; }").unwrap_err();
        assert!(matches!(err, TypeError::DuplicateDefinition { .. }));
    }

    #[test]
    fn parameter_shadowing_existing_global_is_rejected() {
        // Flat shared table: a parameter colliding with a prior global
        // is a duplicate-definition error, not permitted shadowing.
        let err = check("var g: int = 1; fn f(g: int) -> int { return g; }").unwrap_err();
        assert!(matches!(err, TypeError::DuplicateDefinition { .. }));
    }

    #[test]
    fn binary_op_requires_exact_type_equality() {
        let err = check("fn f() -> int { return 1 + 1.5; }").unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { .. }));
    }

    #[test]
    fn u8_out_of_range_literal_is_rejected() {
        let err = check("var x: u8 = 256;").unwrap_err();
        assert!(matches!(err, TypeError::LiteralOutOfRange { .. }));
    }

    #[test]
    fn u8_in_range_literal_is_accepted() {
        assert!(check("var x: u8 = 255;").is_ok());
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let err = check(
            "fn add(a: int, b: int) -> int { return a + b; } \
             fn f() -> int { return add(1); }",
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::ArityMismatch { .. }));
    }

    #[test]
    fn variadic_call_leaves_trailing_arguments_unchecked() {
        assert!(check(
            "extern printf(u8*, ...) -> int; \
             fn f() -> int { return printf(\"%d %s\", 1, true); }"
        )
        .is_ok());
    }

    #[test]
    fn dereferencing_void_pointer_is_rejected() {
        let err = check("fn f(p: void*) -> int { return *p; }").unwrap_err();
        assert!(matches!(err, TypeError::DerefOfVoidPointer { .. }));
    }

    #[test]
    fn dereferencing_typed_pointer_is_accepted() {
        assert!(check("fn f(p: int*) -> int { return *p; }").is_ok());
    }

    #[test]
    fn cast_result_is_target_type_regardless_of_operand() {
        assert!(check("fn f() -> u8 { return 1000 as u8; }").is_ok());
    }

    #[test]
    fn len_on_array_yields_usize() {
        assert!(check("fn f(a: int[4]) -> usize { return a.len; }").is_ok());
    }

    #[test]
    fn len_on_non_array_is_unknown_member() {
        let err = check("fn f(a: int) -> usize { return a.len; }").unwrap_err();
        assert!(matches!(err, TypeError::UnknownMember { .. }));
    }

    #[test]
    fn empty_array_literal_is_rejected() {
        let err = check("fn f() -> int[] { var a: int[] = []; return 0; }").unwrap_err();
        assert!(matches!(err, TypeError::EmptyArrayLiteral { .. }));
    }
}
