use std::fmt;

use derive_more::Debug;
use ordered_float::OrderedFloat;
use smol_str::SmolStr;

use crate::{Decimal, PrimitiveTy};

/// A single compile-time value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scalar {
    #[debug("{_0}")]
    Int(i64),
    #[debug("{_0:?}f")]
    Float(OrderedFloat<f64>),
    #[debug("{_0}d")]
    Decimal(Decimal),
    #[debug("{_0:?}")]
    String(SmolStr),
    #[debug("{_0}")]
    Boolean(bool),
    #[debug("()")]
    Nil,
}

impl Scalar {
    /// The primitive a value of this shape naturally belongs to.
    pub fn natural_base(&self) -> PrimitiveTy {
        match self {
            Scalar::Int(_) => PrimitiveTy::Int,
            Scalar::Float(_) => PrimitiveTy::Float,
            Scalar::Decimal(_) => PrimitiveTy::Decimal,
            Scalar::String(_) => PrimitiveTy::String,
            Scalar::Boolean(_) => PrimitiveTy::Boolean,
            Scalar::Nil => PrimitiveTy::Nil,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&SmolStr> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{:?}", v.0),
            Scalar::Decimal(d) => write!(f, "{d}d"),
            Scalar::String(s) => write!(f, "{s:?}"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Nil => write!(f, "()"),
        }
    }
}

/// One value together with the primitive it is typed as. The base is not
/// always the value's natural one: an `Int` value can live under `Byte`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("{value:?}: {base:?}")]
pub struct Singleton {
    pub value: Scalar,
    pub base: PrimitiveTy,
}

impl Singleton {
    pub fn new(value: Scalar) -> Self {
        let base = value.natural_base();
        Self { value, base }
    }

    pub fn int(value: i64) -> Self {
        Self::new(Scalar::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(Scalar::Float(OrderedFloat(value)))
    }

    pub fn decimal(value: Decimal) -> Self {
        Self::new(Scalar::Decimal(value))
    }

    pub fn string(value: impl Into<SmolStr>) -> Self {
        Self::new(Scalar::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(Scalar::Boolean(value))
    }

    pub fn nil() -> Self {
        Self::new(Scalar::Nil)
    }

    /// `value` re-tagged as a byte, if it fits.
    pub fn byte(value: i64) -> Option<Self> {
        (0..=255).contains(&value).then_some(Self {
            value: Scalar::Int(value),
            base: PrimitiveTy::Byte,
        })
    }

    pub fn with_base(&self, base: PrimitiveTy) -> Self {
        Self {
            value: self.value.clone(),
            base,
        }
    }

    /// Same value in the same domain, treating `Byte` and `Int` as one domain.
    pub fn same_value(&self, other: &Singleton) -> bool {
        self.value == other.value && domain(self.base) == domain(other.base)
    }

    /// Whether this value is a member of `target`.
    pub fn fits_primitive(&self, target: PrimitiveTy) -> bool {
        match (self.base, target) {
            (a, b) if a == b => true,
            (PrimitiveTy::Byte, PrimitiveTy::Int) => true,
            (PrimitiveTy::Int, PrimitiveTy::Byte) => self
                .value
                .as_int()
                .is_some_and(|i| (0..=255).contains(&i)),
            _ => false,
        }
    }
}

fn domain(base: PrimitiveTy) -> PrimitiveTy {
    base.numeric_kind().unwrap_or(base)
}

impl fmt::Display for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
