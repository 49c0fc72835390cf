use std::{fmt, ops::Deref, sync::Arc};

use derive_more::Debug;
use smol_str::SmolStr;

use crate::{PrimitiveTy, RecordTy, Singleton};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySize {
    /// `T[n]`
    #[debug("{_0}")]
    Closed(usize),
    /// `T[]`
    #[debug("")]
    Open,
    /// `T[*]`: closed, with the length taken from the initializer.
    #[debug("*")]
    Inferred,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TupleTy {
    pub members: Vec<TyRef>,
    pub rest: Option<TyRef>,
}

impl TupleTy {
    pub fn new(members: Vec<TyRef>) -> Self {
        Self {
            members,
            rest: None,
        }
    }

    /// Type of position `idx`, falling back to the rest type past the end.
    pub fn member(&self, idx: usize) -> Option<&TyRef> {
        self.members.get(idx).or(self.rest.as_ref())
    }
}

// ==============================================================================
// Ty: the type algebra
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    #[debug("{_0:?}")]
    Primitive(PrimitiveTy),

    #[debug("Array({elem:?}[{size:?}])")]
    Array { elem: TyRef, size: ArraySize },

    #[debug("{_0:?}")]
    Tuple(TupleTy),

    #[debug("{_0:?}")]
    Record(RecordTy),

    #[debug("Map({_0:?})")]
    Map(TyRef),

    Table,
    Anydata,
    Json,

    /// Ordered, deduplicated and flat. Build through [`TyRef::union`].
    #[debug("Union({_0:?})")]
    Union(Vec<TyRef>),

    /// An enumerated value space. A single value is a literal singleton.
    #[debug("Finite({_0:?})")]
    Finite(Vec<Singleton>),

    /// A named type alias.
    #[debug("Ref({name} = {referred:?})")]
    Reference { name: SmolStr, referred: TyRef },

    #[debug("Intersection({effective:?})")]
    Intersection { effective: TyRef },

    /// The semantic-error sentinel. Anything typed `Error` has already been
    /// reported and is skipped by later checks.
    Error,
}

impl Ty {
    pub fn singleton(value: Singleton) -> Self {
        Ty::Finite(vec![value])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error)
    }

    pub fn as_singleton(&self) -> Option<&Singleton> {
        match self {
            Ty::Finite(values) if values.len() == 1 => values.first(),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleTy> {
        match self {
            Ty::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordTy> {
        match self {
            Ty::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Members when this is a union, otherwise empty.
    pub fn members(&self) -> &[TyRef] {
        match self {
            Ty::Union(members) => members,
            _ => &[],
        }
    }

    /// Whether `()` is one of this type's values.
    pub fn contains_nil(&self) -> bool {
        match self {
            Ty::Primitive(PrimitiveTy::Nil) | Ty::Anydata | Ty::Json => true,
            Ty::Finite(values) => values.iter().any(|v| v.base == PrimitiveTy::Nil),
            Ty::Union(members) => members.iter().any(|m| m.contains_nil()),
            Ty::Reference { referred: inner, .. } | Ty::Intersection { effective: inner } => {
                inner.contains_nil()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[debug("{_0:?}")]
pub struct TyRef(pub Arc<Ty>);

impl From<Ty> for TyRef {
    fn from(value: Ty) -> Self {
        TyRef(Arc::new(value))
    }
}

impl From<PrimitiveTy> for TyRef {
    fn from(value: PrimitiveTy) -> Self {
        Ty::Primitive(value).into()
    }
}

impl From<Singleton> for TyRef {
    fn from(value: Singleton) -> Self {
        Ty::singleton(value).into()
    }
}

impl Deref for TyRef {
    type Target = Ty;
    fn deref(&self) -> &Ty {
        &self.0
    }
}

impl TyRef {
    pub fn error() -> Self {
        Ty::Error.into()
    }

    /// Strip aliases and intersections down to the type that decides
    /// structure and assignability.
    pub fn effective(&self) -> &TyRef {
        let mut current = self;
        loop {
            match &*current.0 {
                Ty::Reference { referred, .. } => current = referred,
                Ty::Intersection { effective } => current = effective,
                _ => return current,
            }
        }
    }

    pub fn ptr_eq(&self, other: &TyRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// ==============================================================================
// Display
// ==============================================================================
//
// Types print in source syntax. Unions inside array element position are
// parenthesized since `[]` binds tighter than `|`.

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Primitive(p) => write!(f, "{p}"),
            Ty::Array { elem, size } => {
                let needs_parens = matches!(&**elem, Ty::Union(_))
                    || matches!(&**elem, Ty::Finite(vals) if vals.len() > 1);
                if needs_parens {
                    write!(f, "({elem})")?;
                } else {
                    write!(f, "{elem}")?;
                }
                match size {
                    ArraySize::Closed(n) => write!(f, "[{n}]"),
                    ArraySize::Open => write!(f, "[]"),
                    ArraySize::Inferred => write!(f, "[*]"),
                }
            }
            Ty::Tuple(tuple) => {
                write!(f, "[")?;
                for (i, m) in tuple.members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{m}")?;
                }
                if let Some(rest) = &tuple.rest {
                    if !tuple.members.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "{rest}...")?;
                }
                write!(f, "]")
            }
            Ty::Record(record) => write!(f, "{record}"),
            Ty::Map(constraint) => write!(f, "map<{constraint}>"),
            Ty::Table => write!(f, "table"),
            Ty::Anydata => write!(f, "anydata"),
            Ty::Json => write!(f, "json"),
            Ty::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            Ty::Finite(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            Ty::Reference { name, .. } => write!(f, "{name}"),
            Ty::Intersection { effective } => write!(f, "readonly & {effective}"),
            Ty::Error => write!(f, "<error>"),
        }
    }
}

impl fmt::Display for TyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
