use crate::{ArraySize, PrimitiveTy, RecordTy, Singleton, TupleTy, Ty, TyRef};

/// Whether every value of `source` is a value of `target`.
///
/// Aliases and intersections are looked through. Singletons are checked by
/// value, so `300` is not assignable to `byte` while `200` is. The error
/// sentinel is assignable in both directions so that one failure never
/// cascades into more reports.
pub fn is_assignable(source: &TyRef, target: &TyRef) -> bool {
    let source = source.effective();
    let target = target.effective();

    if source.is_error() || target.is_error() || source == target {
        return true;
    }

    match (&**source, &**target) {
        (Ty::Union(members), _) => members.iter().all(|m| is_assignable(m, target)),
        (Ty::Finite(values), _) => values.iter().all(|v| singleton_assignable(v, target)),
        (_, Ty::Union(members)) => members.iter().any(|m| is_assignable(source, m)),

        (_, Ty::Anydata) => true,
        (_, Ty::Json) => is_json_compatible(source),

        (Ty::Primitive(s), Ty::Primitive(t)) => {
            s == t || (*s == PrimitiveTy::Byte && *t == PrimitiveTy::Int)
        }
        (Ty::Primitive(PrimitiveTy::Nil), Ty::Finite(values)) => {
            values.iter().any(|v| v.base == PrimitiveTy::Nil)
        }

        (Ty::Tuple(tuple), Ty::Array { elem, size }) => tuple_to_array(tuple, elem, *size),
        (Ty::Tuple(src), Ty::Tuple(tgt)) => tuple_to_tuple(src, tgt),
        (
            Ty::Array {
                elem: src_elem,
                size: src_size,
            },
            Ty::Array { elem, size },
        ) => {
            let size_ok = match size {
                ArraySize::Open => true,
                ArraySize::Closed(n) => *src_size == ArraySize::Closed(*n),
                ArraySize::Inferred => *src_size != ArraySize::Open,
            };
            size_ok && is_assignable(src_elem, elem)
        }
        (Ty::Array { elem: src_elem, .. }, Ty::Tuple(tgt)) => {
            tgt.members.is_empty()
                && tgt
                    .rest
                    .as_ref()
                    .is_some_and(|rest| is_assignable(src_elem, rest))
        }

        (Ty::Record(src), Ty::Record(tgt)) => record_to_record(src, tgt),
        (Ty::Record(src), Ty::Map(constraint)) => {
            src.fields.values().all(|f| is_assignable(&f.ty, constraint))
                && src.rest.as_ref().map_or(true, |r| is_assignable(r, constraint))
                && (src.sealed || src.rest.is_some())
        }
        (Ty::Map(src), Ty::Map(tgt)) => is_assignable(src, tgt),
        (Ty::Table, Ty::Table) => true,

        _ => false,
    }
}

fn singleton_assignable(value: &Singleton, target: &TyRef) -> bool {
    let target = target.effective();
    match &**target {
        Ty::Error | Ty::Anydata | Ty::Json => true,
        Ty::Primitive(p) => value.fits_primitive(*p),
        Ty::Finite(values) => values.iter().any(|v| v.same_value(value)),
        Ty::Union(members) => members.iter().any(|m| singleton_assignable(value, m)),
        _ => false,
    }
}

fn tuple_to_array(tuple: &TupleTy, elem: &TyRef, size: ArraySize) -> bool {
    let size_ok = match size {
        ArraySize::Closed(n) => tuple.rest.is_none() && tuple.members.len() == n,
        ArraySize::Open => true,
        ArraySize::Inferred => tuple.rest.is_none(),
    };
    size_ok
        && tuple.members.iter().all(|m| is_assignable(m, elem))
        && tuple.rest.as_ref().map_or(true, |r| is_assignable(r, elem))
}

fn tuple_to_tuple(src: &TupleTy, tgt: &TupleTy) -> bool {
    if src.members.len() < tgt.members.len() {
        return false;
    }
    for (idx, member) in src.members.iter().enumerate() {
        match tgt.member(idx) {
            Some(expected) if is_assignable(member, expected) => {}
            _ => return false,
        }
    }
    match (&src.rest, &tgt.rest) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(src_rest), Some(tgt_rest)) => is_assignable(src_rest, tgt_rest),
    }
}

fn record_to_record(src: &RecordTy, tgt: &RecordTy) -> bool {
    for (name, field) in &tgt.fields {
        match src.fields.get(name) {
            Some(src_field) => {
                if field.required && !src_field.required {
                    return false;
                }
                if !is_assignable(&src_field.ty, &field.ty) {
                    return false;
                }
            }
            None if field.required => return false,
            None => {}
        }
    }

    let extra_ok = |ty: &TyRef| match &tgt.rest {
        Some(rest) => is_assignable(ty, rest),
        None => !tgt.sealed,
    };

    src.fields
        .iter()
        .filter(|(name, _)| !tgt.fields.contains_key(*name))
        .all(|(_, f)| extra_ok(&f.ty))
        && src.rest.as_ref().map_or(true, |r| extra_ok(r))
}

fn is_json_compatible(ty: &TyRef) -> bool {
    let ty = ty.effective();
    match &**ty {
        Ty::Primitive(_) | Ty::Finite(_) | Ty::Json | Ty::Error => true,
        Ty::Table | Ty::Anydata => false,
        Ty::Array { elem, .. } | Ty::Map(elem) => is_json_compatible(elem),
        Ty::Tuple(tuple) => {
            tuple.members.iter().all(is_json_compatible)
                && tuple.rest.as_ref().map_or(true, is_json_compatible)
        }
        Ty::Record(record) => {
            record.fields.values().all(|f| is_json_compatible(&f.ty))
                && record.rest.as_ref().map_or(true, is_json_compatible)
        }
        Ty::Union(members) => members.iter().all(is_json_compatible),
        Ty::Reference { referred: inner, .. } | Ty::Intersection { effective: inner } => {
            is_json_compatible(inner)
        }
    }
}
