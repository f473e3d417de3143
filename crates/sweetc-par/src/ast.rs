//! AST node definitions (spec §3).
//!
//! Every node carries its own [`Span`] so later stages can point
//! diagnostics back at source text without re-deriving a location.

use sweetc_types::Type;
use sweetc_util::{Span, Symbol};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i128),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct NumberLiteral {
    pub value: NumberValue,
    pub span: Span,
}

/// The raw, pre-escape-decode string body between the quotes.
#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CharLiteral {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PointerTarget {
    /// `null`: the void pointer constant zero.
    Null,
    /// `&expr`: address-of an arbitrary expression.
    AddressOf(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct PointerLiteral {
    pub target: PointerTarget,
    pub span: Span,
}

/// One element of a [`VariableAccess`] chain: `.name` or `[index]`.
#[derive(Debug, Clone)]
pub enum AccessPart {
    Name(Symbol),
    Index(Box<Expr>),
}

/// `a.b[c]` etc. `parts[0]` is always the leading identifier.
#[derive(Debug, Clone)]
pub struct VariableAccess {
    pub parts: Vec<AccessPart>,
    pub span: Span,
}

impl VariableAccess {
    pub fn leading_name(&self) -> Symbol {
        match &self.parts[0] {
            AccessPart::Name(name) => *name,
            AccessPart::Index(_) => unreachable!("first access part is always an identifier"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    BitOr,
    BitXor,
    BitAnd,
    LogAnd,
    LogOr,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::LogAnd => "&&",
            BinOp::LogOr => "||",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Dereference {
    pub inner: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Cast {
    pub expr: Box<Expr>,
    pub target_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name(Symbol),
    Deref(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: AssignTarget,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub callee: Symbol,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(NumberLiteral),
    Str(StringLiteral),
    Char(CharLiteral),
    Bool(BooleanLiteral),
    Array(ArrayLiteral),
    Pointer(PointerLiteral),
    Access(VariableAccess),
    Binary(BinaryOp),
    Deref(Dereference),
    Cast(Cast),
    Assign(Assignment),
    Call(FunctionCall),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(n) => n.span,
            Expr::Str(s) => s.span,
            Expr::Char(c) => c.span,
            Expr::Bool(b) => b.span,
            Expr::Array(a) => a.span,
            Expr::Pointer(p) => p.span,
            Expr::Access(a) => a.span,
            Expr::Binary(b) => b.span,
            Expr::Deref(d) => d.span,
            Expr::Cast(c) => c.span,
            Expr::Assign(a) => a.span,
            Expr::Call(c) => c.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReturnNode {
    pub expr: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDef {
    pub name: Symbol,
    pub ty: Type,
    pub value: Option<Expr>,
    pub public: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AsmBlock {
    pub instructions: Vec<String>,
    pub span: Span,
}

/// A statement inside a function body.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    VariableDef(VariableDef),
    Return(ReturnNode),
    Asm(AsmBlock),
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Symbol,
    pub ty: Type,
    /// Always `false` for a parsed [`FunctionDef`] — the grammar only
    /// allows `...` in an extern's parameter type list, never in a
    /// function definition's named parameter list. Kept on `Parameter`
    /// (rather than on the call site) because the importer's stub
    /// construction rule checks it per-parameter (spec §4.4).
    pub is_variadic: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Symbol,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Vec<Stmt>,
    pub public: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExternDecl {
    pub name: Symbol,
    pub is_variadic: bool,
    pub return_type: Option<Type>,
    pub parameters: Vec<Type>,
    /// True for a variable extern (`extern name: type;`-shaped stub the
    /// importer builds from a [`VariableDef`]); false for a function.
    pub is_variable: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportNode {
    pub parts: Vec<Symbol>,
    pub imported_symbols: Option<Vec<Symbol>>,
    pub span: Span,
}

/// A top-level item (spec §4.2 "Top-level statements").
#[derive(Debug, Clone)]
pub enum TopLevel {
    Function(FunctionDef),
    Variable(VariableDef),
    Extern(ExternDecl),
    Import(ImportNode),
    Asm(AsmBlock),
}

impl TopLevel {
    pub fn name(&self) -> Option<Symbol> {
        match self {
            TopLevel::Function(f) => Some(f.name),
            TopLevel::Variable(v) => Some(v.name),
            TopLevel::Extern(e) => Some(e.name),
            TopLevel::Import(_) | TopLevel::Asm(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TopLevel::Function(f) => f.span,
            TopLevel::Variable(v) => v.span,
            TopLevel::Extern(e) => e.span,
            TopLevel::Import(i) => i.span,
            TopLevel::Asm(a) => a.span,
        }
    }
}
