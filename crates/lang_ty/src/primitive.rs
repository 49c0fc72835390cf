use std::fmt;

use super::Ty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveTy {
    Int,
    Float,
    Decimal,
    String,
    Boolean,
    Nil,
    /// An `Int` restricted to `0..=255`.
    Byte,
}

impl PrimitiveTy {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveTy::Int | PrimitiveTy::Float | PrimitiveTy::Decimal | PrimitiveTy::Byte
        )
    }

    /// The numeric domain arithmetic happens in. `Byte` computes as `Int`.
    pub fn numeric_kind(&self) -> Option<PrimitiveTy> {
        match self {
            PrimitiveTy::Int | PrimitiveTy::Byte => Some(PrimitiveTy::Int),
            PrimitiveTy::Float => Some(PrimitiveTy::Float),
            PrimitiveTy::Decimal => Some(PrimitiveTy::Decimal),
            _ => None,
        }
    }

    /// Priority used to break ties between equally valid numeric narrowings.
    /// Lower wins.
    pub fn numeric_priority(&self) -> Option<u8> {
        match self {
            PrimitiveTy::Int | PrimitiveTy::Byte => Some(0),
            PrimitiveTy::Float => Some(1),
            PrimitiveTy::Decimal => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveTy::Int => "int",
            PrimitiveTy::Float => "float",
            PrimitiveTy::Decimal => "decimal",
            PrimitiveTy::String => "string",
            PrimitiveTy::Boolean => "boolean",
            PrimitiveTy::Nil => "()",
            PrimitiveTy::Byte => "byte",
        };
        write!(f, "{name}")
    }
}

impl From<PrimitiveTy> for Ty {
    fn from(value: PrimitiveTy) -> Self {
        Ty::Primitive(value)
    }
}
