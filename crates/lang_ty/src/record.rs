use std::{collections::BTreeMap, fmt};

use derive_more::Debug;
use smol_str::SmolStr;

use crate::TyRef;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldTy {
    pub ty: TyRef,
    pub required: bool,
}

impl FieldTy {
    pub fn required(ty: TyRef) -> Self {
        Self { ty, required: true }
    }

    pub fn optional(ty: TyRef) -> Self {
        Self {
            ty,
            required: false,
        }
    }
}

/// A record shape. `sealed` records admit no fields beyond `fields`; an
/// unsealed record admits extra fields of type `rest`, or of any type when
/// `rest` is `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct RecordTy {
    pub fields: BTreeMap<SmolStr, FieldTy>,
    pub rest: Option<TyRef>,
    pub sealed: bool,
}

impl RecordTy {
    /// A sealed record whose fields are all required. This is the shape every
    /// record constructor evaluates to.
    pub fn sealed(fields: impl IntoIterator<Item = (SmolStr, TyRef)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, ty)| (k, FieldTy::required(ty)))
                .collect(),
            rest: None,
            sealed: true,
        }
    }

    pub fn open(fields: impl IntoIterator<Item = (SmolStr, FieldTy)>, rest: Option<TyRef>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            rest,
            sealed: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldTy> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.fields.keys()
    }

    /// Whether a field not named in `fields` may appear at all.
    pub fn allows_extra_fields(&self) -> bool {
        !self.sealed || self.rest.is_some()
    }
}

impl fmt::Display for RecordTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.sealed { ("{|", "|}") } else { ("{", "}") };
        write!(f, "{open} ")?;
        for (k, v) in &self.fields {
            let opt = if v.required { "" } else { "?" };
            write!(f, "{k}{opt}: {}; ", v.ty)?;
        }
        if let Some(rest) = &self.rest {
            write!(f, "{rest}...; ")?;
        }
        write!(f, "{close}")
    }
}
