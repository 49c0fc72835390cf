// Default values for the members an aggregate constructor leaves out.

use lang_ty::{ArraySize, Decimal, PrimitiveTy, RecordTy, Singleton, TupleTy, Ty, TyRef};

use crate::{diagnostic::ConstErrorKind, validate::NarrowError, ConstChecker};

impl ConstChecker<'_> {
    /// The default value of `ty`, as a type. When some part of `ty` has no
    /// default, that part is reported once.
    pub fn fill_value(&mut self, ty: &TyRef) -> Result<TyRef, NarrowError> {
        default_value(ty).map_err(|without_default| {
            let kind = ConstErrorKind::InvalidListConstructorElementType {
                ty: without_default,
            };
            match self.anchor {
                Some(at) => {
                    self.emit(at, kind);
                    NarrowError::Reported
                }
                None => {
                    log::debug!("{kind}");
                    NarrowError::Mismatch
                }
            }
        })
    }
}

/// `Err` carries the innermost type that has no default.
fn default_value(ty: &TyRef) -> Result<TyRef, TyRef> {
    let filled: TyRef = match &**ty {
        Ty::Primitive(prim) => match prim {
            PrimitiveTy::Boolean => Singleton::boolean(false).into(),
            PrimitiveTy::Int => Singleton::int(0).into(),
            PrimitiveTy::Byte => Singleton::int(0).with_base(PrimitiveTy::Byte).into(),
            PrimitiveTy::Float => Singleton::float(0.0).into(),
            PrimitiveTy::Decimal => Singleton::decimal(Decimal::zero()).into(),
            PrimitiveTy::String => Singleton::string("").into(),
            PrimitiveTy::Nil => Singleton::nil().into(),
        },
        Ty::Array { elem, size } => match size {
            ArraySize::Open => Ty::Tuple(TupleTy::default()).into(),
            ArraySize::Inferred => return Err(ty.clone()),
            ArraySize::Closed(0) => Ty::Tuple(TupleTy::default()).into(),
            ArraySize::Closed(n) => {
                let member = default_value(elem)?;
                Ty::Tuple(TupleTy::new(vec![member; *n])).into()
            }
        },
        Ty::Tuple(tuple) => {
            let members = tuple
                .members
                .iter()
                .map(default_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ty::Tuple(TupleTy::new(members)).into()
        }
        Ty::Record(record) => {
            let fields = record
                .fields
                .iter()
                .filter(|(_, field)| field.required)
                .map(|(name, field)| Ok((name.clone(), default_value(&field.ty)?)))
                .collect::<Result<Vec<(_, _)>, TyRef>>()?;
            Ty::Record(RecordTy::sealed(fields)).into()
        }
        Ty::Map(_) => Ty::Record(RecordTy::sealed([])).into(),
        Ty::Table => Ty::Table.into(),
        Ty::Anydata | Ty::Json => Singleton::nil().into(),
        Ty::Finite(values) => match values.as_slice() {
            [only] => TyRef::from(only.clone()),
            _ if ty.contains_nil() => Singleton::nil().into(),
            _ => return Err(ty.clone()),
        },
        Ty::Union(members) => match members.as_slice() {
            [only] => default_value(only)?,
            _ if ty.contains_nil() => Singleton::nil().into(),
            _ => return Err(ty.clone()),
        },
        Ty::Reference { .. } | Ty::Intersection { .. } => default_value(ty.effective())?,
        Ty::Error => TyRef::error(),
    };
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_ty::{ty, FieldTy};

    #[test]
    fn scalars() {
        assert_eq!(default_value(&ty!(Boolean)), Ok(ty!(boolean = false)));
        assert_eq!(default_value(&ty!(Int)), Ok(ty!(int = 0)));
        assert_eq!(default_value(&ty!(Byte)), Ok(ty!(byte = 0)));
        assert_eq!(default_value(&ty!(Float)), Ok(ty!(float = 0.0)));
        assert_eq!(default_value(&ty!(Decimal)), Ok(ty!(decimal = "0")));
        assert_eq!(default_value(&ty!(String)), Ok(ty!(string = "")));
    }

    #[test]
    fn arrays() {
        assert_eq!(
            default_value(&ty!([Int; 2])),
            Ok(ty!(tuple [(int = 0), (int = 0)]))
        );
        assert_eq!(default_value(&ty!([String])), Ok(ty!(tuple [])));
        assert_eq!(default_value(&ty!([Int; *])), Err(ty!([Int; *])));
    }

    #[test]
    fn records_fill_required_fields_only() {
        let record: TyRef = Ty::Record(RecordTy::open(
            [
                ("a".into(), FieldTy::required(ty!(Int))),
                ("b".into(), FieldTy::optional(ty!(String))),
            ],
            Some(ty!(Int)),
        ))
        .into();
        assert_eq!(default_value(&record), Ok(ty!({ "a": (int = 0) })));
        assert_eq!(default_value(&ty!(map<Int>)), Ok(ty!({})));
    }

    #[test]
    fn nilable_unions_fill_with_nil() {
        assert_eq!(
            default_value(&ty!(Int | String | Nil)),
            Ok(TyRef::from(Singleton::nil()))
        );
        assert_eq!(default_value(&ty!(Int | String)), Err(ty!(Int | String)));
    }

    #[test]
    fn innermost_culprit_is_reported() {
        let nested = ty!(tuple [Int, ([(Int | String); 2])]);
        assert_eq!(default_value(&nested), Err(ty!(Int | String)));
    }
}
