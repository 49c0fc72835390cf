// Constant-expression syntax tree. The parser/lowering front-end builds a
// `Module` through `ModuleBuilder`; everything downstream only reads it.

pub mod nameres;

#[cfg(feature = "proptest_support")]
pub mod arbitrary;

#[cfg(test)]
mod tests;

use std::{fmt, ops};

use derive_more::{Debug, From};
use la_arena::{Arena, Idx};
use smol_str::SmolStr;

pub use nameres::{
    group_consts, Binding, ConstDependencies, ConstGroup, GroupedConsts, ModuleScopes,
    ResolveResult, ScopeId,
};

pub type ExprId = Idx<Expr>;
pub type ConstId = Idx<ConstDecl>;

/// A named compile-time binding as declared in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    pub name: SmolStr,
    /// The scope the declaration lives in; references inside `value` resolve from here.
    pub scope: ScopeId,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    exprs: Arena<Expr>,
    consts: Arena<ConstDecl>,
    pub scopes: ModuleScopes,
}

impl Module {
    pub fn iter_exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs.iter()
    }

    pub fn consts(&self) -> impl Iterator<Item = (ConstId, &ConstDecl)> {
        self.consts.iter()
    }

    pub fn const_by_name(&self, name: &str) -> Option<ConstId> {
        self.consts
            .iter()
            .find_map(|(id, decl)| (decl.name == name).then_some(id))
    }

    pub fn root_scope(&self) -> ScopeId {
        self.scopes.root()
    }
}

impl ops::Index<ExprId> for Module {
    type Output = Expr;
    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}

impl ops::Index<ConstId> for Module {
    type Output = ConstDecl;
    fn index(&self, index: ConstId) -> &Self::Output {
        &self.consts[index]
    }
}

// ==============================================================================
// Literals and operators
// ==============================================================================

/// A literal exactly as written. Numeric literals keep their source text so
/// that the checker can decide which numeric domains the text is valid in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Decimal or `0x` hexadecimal integer text.
    #[debug("Int({_0})")]
    Int(SmolStr),
    /// Decimal floating point text, optionally ending in an `f`/`d` discriminator.
    #[debug("Float({_0})")]
    Float(SmolStr),
    /// Hexadecimal floating point text (`0x1.8p1`).
    #[debug("HexFloat({_0})")]
    HexFloat(SmolStr),
    #[debug("String({_0:?})")]
    String(SmolStr),
    #[debug("Bool({_0})")]
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseBinOp {
    And,
    Or,
    Xor,
    Shl,
    Shr,
    /// Logical (zero filling) right shift, `>>>`.
    UShr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicBinOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From)]
pub enum BinOp {
    #[debug("{_0:?}")]
    Arith(ArithBinOp),
    #[debug("{_0:?}")]
    Bitwise(BitwiseBinOp),
    #[debug("{_0:?}")]
    Logic(LogicBinOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinOp::Arith(ArithBinOp::Add) => "+",
            BinOp::Arith(ArithBinOp::Sub) => "-",
            BinOp::Arith(ArithBinOp::Mul) => "*",
            BinOp::Arith(ArithBinOp::Div) => "/",
            BinOp::Arith(ArithBinOp::Mod) => "%",
            BinOp::Bitwise(BitwiseBinOp::And) => "&",
            BinOp::Bitwise(BitwiseBinOp::Or) => "|",
            BinOp::Bitwise(BitwiseBinOp::Xor) => "^",
            BinOp::Bitwise(BitwiseBinOp::Shl) => "<<",
            BinOp::Bitwise(BitwiseBinOp::Shr) => ">>",
            BinOp::Bitwise(BitwiseBinOp::UShr) => ">>>",
            BinOp::Logic(LogicBinOp::And) => "&&",
            BinOp::Logic(LogicBinOp::Or) => "||",
        };
        write!(f, "{op}")
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
        };
        write!(f, "{op}")
    }
}

// ==============================================================================
// Expressions
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListItem {
    #[debug("{_0:?}")]
    Expr(ExprId),
    #[debug("...{_0:?}")]
    Spread(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// An identifier or string literal key.
    #[debug("{_0}")]
    Name(SmolStr),
    /// `[expr]`: the key is only known once `expr` is evaluated.
    #[debug("[{_0:?}]")]
    Computed(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordField {
    #[debug("{key:?}: {value:?}")]
    KeyValue { key: RecordKey, value: ExprId },
    /// `{ name }` shorthand; the expr is the `Reference` the field reads.
    #[debug("{_0:?}")]
    VarName(ExprId),
    #[debug("...{_0:?}")]
    Spread(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A hole left by a parse error.
    Missing,
    #[debug("{_0:?}")]
    Literal(Literal),
    /// A (possibly module qualified) name, `alias:name`.
    #[debug("Ref({module:?}, {name})")]
    Reference {
        module: Option<SmolStr>,
        name: SmolStr,
    },
    #[debug("List({_0:?})")]
    List(Box<[ListItem]>),
    #[debug("Record({_0:?})")]
    Record(Box<[RecordField]>),
    #[debug("BinOp({lhs:?} {op:?} {rhs:?})")]
    BinOp { lhs: ExprId, rhs: ExprId, op: BinOp },
    #[debug("UnaryOp({op:?} {expr:?})")]
    UnaryOp { op: UnaryOp, expr: ExprId },
    #[debug("Group({_0:?})")]
    Group(ExprId),
    /// Syntax that is valid in general expressions but never constant
    /// (calls, field access, ...). `syntax` names it for diagnostics.
    #[debug("Unsupported({syntax})")]
    Unsupported { syntax: SmolStr },
}

impl Expr {
    pub fn walk_child_exprs(&self, mut f: impl FnMut(ExprId)) {
        match self {
            Self::Missing | Self::Literal(_) | Self::Reference { .. } | Self::Unsupported { .. } => {}
            Self::List(items) => {
                for item in items.iter() {
                    match item {
                        ListItem::Expr(e) | ListItem::Spread(e) => f(*e),
                    }
                }
            }
            Self::Record(fields) => {
                for field in fields.iter() {
                    match field {
                        RecordField::KeyValue { key, value } => {
                            if let RecordKey::Computed(k) = key {
                                f(*k);
                            }
                            f(*value);
                        }
                        RecordField::VarName(e) | RecordField::Spread(e) => f(*e),
                    }
                }
            }
            Self::BinOp { lhs, rhs, op: _ } => {
                f(*lhs);
                f(*rhs);
            }
            Self::UnaryOp { expr, op: _ } | Self::Group(expr) => f(*expr),
        }
    }
}

// ==============================================================================
// ModuleBuilder: the lowering target
// ==============================================================================

/// Incrementally builds a `Module`. Scopes must be created before the
/// declarations that live in them; expressions can be allocated in any order.
#[derive(Debug)]
pub struct ModuleBuilder {
    exprs: Arena<Expr>,
    consts: Arena<ConstDecl>,
    scopes: ModuleScopes,
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            exprs: Arena::new(),
            consts: Arena::new(),
            scopes: ModuleScopes::new(),
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        self.scopes.root()
    }

    pub fn child_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.alloc_child(parent)
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    pub fn literal(&mut self, lit: Literal) -> ExprId {
        self.alloc(Expr::Literal(lit))
    }

    pub fn int(&mut self, text: &str) -> ExprId {
        self.literal(Literal::Int(text.into()))
    }

    pub fn float(&mut self, text: &str) -> ExprId {
        self.literal(Literal::Float(text.into()))
    }

    pub fn string(&mut self, text: &str) -> ExprId {
        self.literal(Literal::String(text.into()))
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.literal(Literal::Bool(value))
    }

    pub fn reference(&mut self, name: &str) -> ExprId {
        self.alloc(Expr::Reference {
            module: None,
            name: name.into(),
        })
    }

    pub fn qualified(&mut self, module: &str, name: &str) -> ExprId {
        self.alloc(Expr::Reference {
            module: Some(module.into()),
            name: name.into(),
        })
    }

    pub fn list(&mut self, items: impl IntoIterator<Item = ListItem>) -> ExprId {
        self.alloc(Expr::List(items.into_iter().collect()))
    }

    pub fn record(&mut self, fields: impl IntoIterator<Item = RecordField>) -> ExprId {
        self.alloc(Expr::Record(fields.into_iter().collect()))
    }

    pub fn bin_op(&mut self, lhs: ExprId, op: impl Into<BinOp>, rhs: ExprId) -> ExprId {
        self.alloc(Expr::BinOp {
            lhs,
            rhs,
            op: op.into(),
        })
    }

    pub fn unary(&mut self, op: UnaryOp, expr: ExprId) -> ExprId {
        self.alloc(Expr::UnaryOp { op, expr })
    }

    pub fn group(&mut self, inner: ExprId) -> ExprId {
        self.alloc(Expr::Group(inner))
    }

    /// Declare a constant in `scope`. A later declaration with the same name
    /// in the same scope shadows the earlier one for lookups.
    pub fn constant(&mut self, scope: ScopeId, name: &str, value: ExprId) -> ConstId {
        let name: SmolStr = name.into();
        let id = self.consts.alloc(ConstDecl {
            name: name.clone(),
            scope,
            value,
        });
        self.scopes.define(scope, name, Binding::Constant(id));
        id
    }

    pub fn variable(&mut self, scope: ScopeId, name: &str) {
        self.scopes.define(scope, name.into(), Binding::Variable);
    }

    pub fn function(&mut self, scope: ScopeId, name: &str) {
        self.scopes.define(scope, name.into(), Binding::Function);
    }

    pub fn finish(self) -> Module {
        Module {
            exprs: self.exprs,
            consts: self.consts,
            scopes: self.scopes,
        }
    }
}
