// Narrowing without a declared type: pick one concrete reading of whatever
// the evaluator inferred.

use lang_ty::{PrimitiveTy, RecordTy, Singleton, TupleTy, Ty, TyRef};

/// The type an undeclared constant gets from its inferred type. Unions take
/// their first member (an integer literal's first candidate is `int`), and
/// structured types are rebuilt with their members narrowed.
pub fn narrowed_type(ty: &TyRef) -> TyRef {
    match &**ty {
        Ty::Finite(_) => ty.clone(),
        Ty::Union(members) => match members.first() {
            Some(first) => narrowed_type(first),
            None => TyRef::error(),
        },
        Ty::Record(record) => Ty::Record(RecordTy {
            fields: record
                .fields
                .iter()
                .map(|(k, f)| {
                    let mut field = f.clone();
                    field.ty = narrowed_type(&f.ty);
                    (k.clone(), field)
                })
                .collect(),
            rest: record.rest.as_ref().map(narrowed_type),
            sealed: record.sealed,
        })
        .into(),
        Ty::Tuple(tuple) => Ty::Tuple(TupleTy {
            members: tuple.members.iter().map(narrowed_type).collect(),
            rest: tuple.rest.as_ref().map(narrowed_type),
        })
        .into(),
        Ty::Array { elem, size } => Ty::Array {
            elem: narrowed_type(elem),
            size: *size,
        }
        .into(),
        Ty::Reference { .. } | Ty::Intersection { .. } => narrowed_type(ty.effective()),
        Ty::Primitive(PrimitiveTy::Nil) => Singleton::nil().into(),
        Ty::Error => TyRef::error(),
        Ty::Primitive(_) | Ty::Map(_) | Ty::Table | Ty::Anydata | Ty::Json => {
            log::debug!("no narrowing for {ty}");
            TyRef::error()
        }
    }
}
