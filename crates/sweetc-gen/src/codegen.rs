//! NASM x86-64 System V code generation (spec §4.6, §6).
//!
//! Every subexpression result lands in `rax` (or whatever target register
//! the caller asks for): there is no register allocator, matching spec §1's
//! "no register allocation" non-goal. Locals and parameters live at fixed
//! `rbp`-relative offsets computed in a single pre-pass before the function
//! prologue is emitted.

use indexmap::IndexMap;
use sweetc_par::ast::{
    AccessPart, Assignment, AsmBlock, AssignTarget, BinOp, BinaryOp, Expr, FunctionCall,
    FunctionDef, NumberValue, ReturnNode, Stmt, TopLevel, VariableAccess, VariableDef,
};
use sweetc_util::Symbol;

use crate::error::CodegenError;

const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

fn align16(n: i64) -> i64 {
    (n + 15) & !15
}

/// Decodes the standard backslash escapes in a string literal's raw lexeme
/// into the byte sequence that lands in `.rodata` (spec §4.6 "Emission
/// decodes standard backslash escapes from the raw lexeme"). An unknown
/// escape falls back to the escaped character verbatim rather than erroring;
/// nothing upstream has validated escape sequences by this point.
fn decode_escapes(raw: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('r') => out.push(b'\r'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some('"') => out.push(b'"'),
            Some('\'') => out.push(b'\''),
            Some(other) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => {}
        }
    }
    out
}

fn expr_kind_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::Number(_) => "number literal",
        Expr::Str(_) => "string literal",
        Expr::Char(_) => "char literal",
        Expr::Bool(_) => "boolean literal",
        Expr::Array(_) => "array literal",
        Expr::Pointer(_) => "pointer literal",
        Expr::Access(_) => "variable access",
        Expr::Binary(_) => "binary operator",
        Expr::Deref(_) => "dereference",
        Expr::Cast(_) => "cast",
        Expr::Assign(_) => "assignment",
        Expr::Call(_) => "function call",
    }
}

/// Lowers a fully type-checked top-level item list to a NASM source string.
pub fn generate(top_level: &[TopLevel]) -> Result<String, CodegenError> {
    let mut gen = CodeGenerator::new();
    gen.generate(top_level)
}

struct CodeGenerator {
    output: Vec<String>,
    string_literals: IndexMap<Symbol, String>,
    string_label_count: u32,
    var_offsets: IndexMap<Symbol, i64>,
    stack_size: i64,
}

impl CodeGenerator {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            string_literals: IndexMap::new(),
            string_label_count: 0,
            var_offsets: IndexMap::new(),
            stack_size: 0,
        }
    }

    fn emit(&mut self, instruction: impl std::fmt::Display) {
        self.output.push(format!("    {instruction}"));
    }

    fn emit_section(&mut self, name: &str) {
        self.output.push(format!("section .{name}"));
    }

    fn emit_label(&mut self, label: impl std::fmt::Display) {
        self.output.push(format!("{label}:"));
    }

    fn get_string_label(&mut self, content: Symbol) -> String {
        if let Some(label) = self.string_literals.get(&content) {
            return label.clone();
        }
        self.string_label_count += 1;
        let label = format!("LC{}", self.string_label_count);
        self.string_literals.insert(content, label.clone());
        label
    }

    fn generate(&mut self, top_level: &[TopLevel]) -> Result<String, CodegenError> {
        let mut global_vars: Vec<&VariableDef> = Vec::new();
        let mut externs: Vec<Symbol> = Vec::new();
        let mut global_symbols: Vec<Symbol> = Vec::new();

        for item in top_level {
            match item {
                TopLevel::Variable(v) => {
                    global_vars.push(v);
                    global_symbols.push(v.name);
                }
                TopLevel::Extern(e) => externs.push(e.name),
                TopLevel::Function(f) => global_symbols.push(f.name),
                TopLevel::Import(_) | TopLevel::Asm(_) => {}
            }
        }

        self.emit("default rel");
        for sym in &global_symbols {
            self.emit(format!("global {sym}"));
        }
        for ext in &externs {
            self.emit(format!("extern {ext}"));
        }

        if !global_vars.is_empty() {
            self.emit_section("data");
            for gvar in &global_vars {
                let Some(value) = &gvar.value else {
                    continue;
                };
                match value {
                    Expr::Number(n) => {
                        let literal = match n.value {
                            NumberValue::Int(v) => v.to_string(),
                            NumberValue::Float(v) => v.to_string(),
                        };
                        self.emit(format!("{}: dq {}", gvar.name, literal));
                    }
                    Expr::Str(s) => {
                        let label = self.get_string_label(s.value);
                        self.emit(format!("{}: dq {}", gvar.name, label));
                    }
                    _ => {
                        self.emit(format!("{}: dq 0", gvar.name));
                    }
                }
            }
            let uninitialized: Vec<&&VariableDef> =
                global_vars.iter().filter(|g| g.value.is_none()).collect();
            if !uninitialized.is_empty() {
                self.emit_section("bss");
                for gvar in uninitialized {
                    self.emit(format!("{}: resq 1", gvar.name));
                }
            }
        }

        self.emit_section("text");
        for item in top_level {
            match item {
                TopLevel::Function(f) => self.codegen_function(f)?,
                TopLevel::Asm(block) => self.codegen_asm_block(block),
                TopLevel::Extern(_) | TopLevel::Variable(_) | TopLevel::Import(_) => {}
            }
        }

        if !self.string_literals.is_empty() {
            let entries: Vec<(Symbol, String)> = self
                .string_literals
                .iter()
                .map(|(content, label)| (*content, label.clone()))
                .collect();
            self.emit_section("rodata");
            for (content, label) in entries {
                let bytes = decode_escapes(content.as_str());
                let body = bytes
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.emit(format!("{label}: db {body}, 0"));
            }
        }

        Ok(self.output.join("\n"))
    }

    fn codegen_asm_block(&mut self, block: &AsmBlock) {
        for instruction in &block.instructions {
            self.emit(instruction);
        }
    }

    fn prologue(&mut self) {
        self.emit("push rbp");
        self.emit("mov rbp, rsp");
        if self.stack_size > 0 {
            let aligned = align16(self.stack_size);
            if aligned != 0 {
                self.emit(format!("sub rsp, {aligned}"));
                self.stack_size = aligned;
            }
        }
    }

    fn epilogue(&mut self) {
        self.emit("mov rsp, rbp");
        self.emit("pop rbp");
        self.emit("ret");
    }

    fn codegen_function(&mut self, f: &FunctionDef) -> Result<(), CodegenError> {
        self.var_offsets = IndexMap::new();
        self.stack_size = 0;

        self.emit_label(f.name);

        let mut offset: i64 = 0;
        for stmt in &f.body {
            if let Stmt::VariableDef(v) = stmt {
                if v.ty.is_array {
                    return Err(CodegenError::ArraysNotSupported { span: v.span });
                }
                offset += 8;
                self.var_offsets.insert(v.name, -offset);
            }
        }
        self.stack_size = offset;

        self.prologue();

        for (i, param) in f.parameters.iter().enumerate() {
            if i >= 6 {
                return Err(CodegenError::TooManyParameters { span: f.span });
            }
            let param_offset = match self.var_offsets.get(&param.name) {
                Some(&existing) => existing,
                None => {
                    offset += 8;
                    let new_offset = -offset;
                    self.var_offsets.insert(param.name, new_offset);
                    self.stack_size = offset;
                    let aligned = align16(self.stack_size);
                    if aligned != self.stack_size {
                        let diff = aligned - self.stack_size;
                        self.emit(format!("sub rsp, {diff}"));
                        self.stack_size = aligned;
                    }
                    new_offset
                }
            };
            self.emit(format!("mov [rbp{param_offset}], {}", ARG_REGS[i]));
        }

        for stmt in &f.body {
            self.codegen_stmt(stmt)?;
        }

        if !f.body.iter().any(|s| matches!(s, Stmt::Return(_))) {
            self.epilogue();
        }

        self.var_offsets.clear();
        self.stack_size = 0;
        Ok(())
    }

    fn codegen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::VariableDef(v) => self.codegen_local_variable_def(v),
            Stmt::Return(r) => self.codegen_return(r),
            Stmt::Asm(a) => {
                self.codegen_asm_block(a);
                Ok(())
            }
            Stmt::Expr(e) => self.codegen_stmt_expr(e),
        }
    }

    fn codegen_local_variable_def(&mut self, v: &VariableDef) -> Result<(), CodegenError> {
        let Some(value) = &v.value else {
            return Ok(());
        };
        self.codegen_expression(value, "rax")?;
        let offset = self.var_offsets[&v.name];
        self.emit(format!("mov [rbp{offset}], rax"));
        Ok(())
    }

    fn codegen_return(&mut self, r: &ReturnNode) -> Result<(), CodegenError> {
        match &r.expr {
            Some(expr) => self.codegen_expression(expr, "rax")?,
            None => self.emit("mov rax, 0"),
        }
        self.epilogue();
        Ok(())
    }

    /// Top-of-`match` for a bare expression statement (a function body
    /// line that is an expression rather than a `let`/`return`/`asm`).
    /// Only `Call`, `Assign` and `Binary` have statement-level lowerings;
    /// everything else falls through to [`Self::codegen_expression`], which
    /// rejects them the same way — this split exists only because
    /// assignment has no sub-expression lowering at all (see below).
    fn codegen_stmt_expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        match expr {
            Expr::Call(call) => self.codegen_function_call(call),
            Expr::Assign(a) => self.codegen_assignment(a),
            Expr::Binary(b) => self.codegen_binary_op(b, "rax"),
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Access(_) => {
                self.codegen_expression(expr, "rax")
            }
            Expr::Char(_) | Expr::Array(_) | Expr::Pointer(_) | Expr::Deref(_) | Expr::Cast(_) => {
                Err(CodegenError::UnsupportedNode {
                    what: format!("bare {} statement", expr_kind_name(expr)),
                    span: expr.span(),
                })
            }
        }
    }

    fn codegen_assignment(&mut self, a: &Assignment) -> Result<(), CodegenError> {
        let name = match &a.target {
            AssignTarget::Name(name) => *name,
            AssignTarget::Deref(_) => {
                return Err(CodegenError::InvalidAssignmentTarget { span: a.span });
            }
        };
        self.codegen_expression(&a.value, "rax")?;
        let offset = *self
            .var_offsets
            .get(&name)
            .ok_or_else(|| CodegenError::UndefinedLocal {
                name: name.to_string(),
                span: a.span,
            })?;
        self.emit(format!("mov [rbp{offset}], rax"));
        Ok(())
    }

    fn codegen_function_call(&mut self, call: &FunctionCall) -> Result<(), CodegenError> {
        let argc = call.arguments.len();
        let stack_args = argc.saturating_sub(6);

        let needs_alignment_pad = stack_args % 2 != 0;
        if needs_alignment_pad {
            self.emit("sub rsp, 8");
        }

        for i in (6..argc).rev() {
            self.codegen_expression(&call.arguments[i], "rax")?;
            self.emit("push rax");
        }

        for (i, reg) in ARG_REGS.iter().enumerate().take(argc.min(6)) {
            self.codegen_expression(&call.arguments[i], "rax")?;
            self.emit(format!("mov {reg}, rax"));
        }

        self.emit("xor rax, rax");
        self.emit(format!("call {}", call.callee));

        if stack_args > 0 {
            self.emit(format!("add rsp, {}", stack_args * 8));
        }
        if needs_alignment_pad {
            self.emit("add rsp, 8");
        }
        Ok(())
    }

    fn codegen_variable_access(
        &mut self,
        access: &VariableAccess,
        target: &str,
    ) -> Result<(), CodegenError> {
        match access.parts.len() {
            1 => {
                let name = access.leading_name();
                match self.var_offsets.get(&name) {
                    Some(&offset) => self.emit(format!("mov {target}, [rbp{offset}]")),
                    None => self.emit(format!("mov {target}, [{name}]")),
                }
                Ok(())
            }
            2 => match &access.parts[1] {
                AccessPart::Index(_) => Err(CodegenError::IndexedAccessNotSupported {
                    span: access.span,
                }),
                AccessPart::Name(member) if member.as_str() == "len" => {
                    Err(CodegenError::MemberAccessNotSupported {
                        what: "`.len`".to_string(),
                        span: access.span,
                    })
                }
                AccessPart::Name(_) => Err(CodegenError::MemberAccessNotSupported {
                    what: "struct member access".to_string(),
                    span: access.span,
                }),
            },
            _ => Err(CodegenError::UnsupportedNode {
                what: "variable access with more than two parts".to_string(),
                span: access.span,
            }),
        }
    }

    fn codegen_binary_op(&mut self, b: &BinaryOp, target: &str) -> Result<(), CodegenError> {
        self.codegen_expression(&b.left, "rax")?;
        self.emit("push rax");
        self.codegen_expression(&b.right, "rax")?;
        self.emit("mov rbx, rax");
        self.emit("pop rax");

        let instructions: &[&str] = match b.op {
            BinOp::Add => &["add rax, rbx"],
            BinOp::Sub => &["sub rax, rbx"],
            BinOp::Mul => &["imul rax, rbx"],
            BinOp::Div => &["cqo", "idiv rbx"],
            BinOp::Mod => &["cqo", "idiv rbx", "mov rax, rdx"],
            BinOp::Eq => &["cmp rax, rbx", "sete al", "movzx rax, al"],
            BinOp::Ne => &["cmp rax, rbx", "setne al", "movzx rax, al"],
            BinOp::Lt => &["cmp rax, rbx", "setl al", "movzx rax, al"],
            BinOp::Gt => &["cmp rax, rbx", "setg al", "movzx rax, al"],
            BinOp::Le => &["cmp rax, rbx", "setle al", "movzx rax, al"],
            BinOp::Ge => &["cmp rax, rbx", "setge al", "movzx rax, al"],
            BinOp::BitOr | BinOp::BitXor | BinOp::BitAnd | BinOp::LogAnd | BinOp::LogOr => {
                return Err(CodegenError::UnsupportedOperator {
                    op: b.op.to_string(),
                    span: b.span,
                });
            }
        };
        for instruction in instructions {
            self.emit(*instruction);
        }
        if target != "rax" {
            self.emit(format!("mov {target}, rax"));
        }
        Ok(())
    }

    fn codegen_expression(&mut self, expr: &Expr, target: &str) -> Result<(), CodegenError> {
        match expr {
            Expr::Number(n) => {
                let literal = match n.value {
                    NumberValue::Int(v) => v.to_string(),
                    NumberValue::Float(v) => v.to_string(),
                };
                self.emit(format!("mov {target}, {literal}"));
                Ok(())
            }
            Expr::Str(s) => {
                let label = self.get_string_label(s.value);
                self.emit(format!("lea {target}, [rel {label}]"));
                Ok(())
            }
            Expr::Bool(b) => {
                self.emit(format!("mov {target}, {}", if b.value { 1 } else { 0 }));
                Ok(())
            }
            Expr::Access(access) => self.codegen_variable_access(access, target),
            Expr::Binary(b) => self.codegen_binary_op(b, target),
            Expr::Call(call) => {
                self.codegen_function_call(call)?;
                if target != "rax" {
                    self.emit(format!("mov {target}, rax"));
                }
                Ok(())
            }
            Expr::Char(_)
            | Expr::Array(_)
            | Expr::Pointer(_)
            | Expr::Deref(_)
            | Expr::Cast(_)
            | Expr::Assign(_) => Err(CodegenError::UnsupportedNode {
                what: expr_kind_name(expr).to_string(),
                span: expr.span(),
            }),
        }
    }
}
