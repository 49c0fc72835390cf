// ==============================================================================
// Validation against an expected type
// ==============================================================================
//
// Matches an inferred type against the shape a constant is declared with and
// produces the narrowed result. Results are always freshly built: an
// inferred tuple or record is never reused as the validated one.

use lang_ty::{
    is_assignable, ArraySize, PrimitiveTy, RecordTy, Singleton, TupleTy, Ty, TyRef,
};
use smol_str::SmolStr;

use crate::{diagnostic::ConstDiagnostic, narrow::narrowed_type, ConstChecker, ConstErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowError {
    /// The inferred type does not fit. Nothing was reported; the caller
    /// reports the mismatch at the level it understands.
    Mismatch,
    /// A more specific diagnostic was already emitted.
    Reported,
}

type NarrowResult = Result<TyRef, NarrowError>;

impl ConstChecker<'_> {
    pub fn valid_type(&mut self, expected: &TyRef, inferred: &TyRef) -> NarrowResult {
        let inferred = inferred.effective();
        if expected.is_error() || inferred.is_error() {
            return Ok(TyRef::error());
        }

        match &**expected {
            Ty::Reference { .. } | Ty::Intersection { .. } => {
                self.valid_type(expected.effective(), inferred)
            }
            Ty::Array { elem, size } => self.valid_array(elem, *size, inferred),
            Ty::Tuple(tuple) => self.valid_tuple(tuple, inferred),
            Ty::Map(constraint) => self.valid_map(constraint, inferred),
            Ty::Record(record) => self.valid_record(record, inferred),
            Ty::Union(members) => self.valid_union(members, inferred),
            Ty::Finite(values) => valid_finite(values, inferred),
            Ty::Primitive(PrimitiveTy::Nil) => {
                if is_assignable(inferred, expected) {
                    Ok(Singleton::nil().into())
                } else {
                    Err(NarrowError::Mismatch)
                }
            }
            Ty::Primitive(prim) => valid_primitive(*prim, expected, inferred),
            Ty::Anydata => Ok(narrowed_type(inferred)),
            Ty::Json if is_assignable(inferred, expected) => Ok(narrowed_type(inferred)),
            Ty::Json | Ty::Table => Err(NarrowError::Mismatch),
            Ty::Error => Ok(TyRef::error()),
        }
    }

    fn valid_array(&mut self, elem: &TyRef, size: ArraySize, inferred: &TyRef) -> NarrowResult {
        let Some(tuple) = inferred.as_tuple() else {
            return Err(NarrowError::Mismatch);
        };
        let count = tuple.members.len();
        if matches!(size, ArraySize::Closed(n) if n < count) {
            return Err(NarrowError::Mismatch);
        }

        let mut members = tuple
            .members
            .iter()
            .map(|member| self.valid_type(elem, member))
            .collect::<Result<Vec<_>, _>>()?;

        if let ArraySize::Closed(n) = size {
            if n > count {
                let filler = self.fill_value(elem)?;
                members.resize(n, filler);
            }
        }
        Ok(Ty::Tuple(TupleTy::new(members)).into())
    }

    /// Positions present on both sides validate pairwise. Extra inferred
    /// members go to the rest type; missing ones are filled.
    fn valid_tuple(&mut self, expected: &TupleTy, inferred: &TyRef) -> NarrowResult {
        let Some(tuple) = inferred.as_tuple() else {
            return Err(NarrowError::Mismatch);
        };

        let mut members = Vec::with_capacity(tuple.members.len().max(expected.members.len()));
        for (exp, inf) in expected.members.iter().zip(&tuple.members) {
            members.push(self.valid_type(exp, inf)?);
        }

        let shared = members.len();
        if tuple.members.len() > shared {
            let Some(rest) = &expected.rest else {
                return Err(NarrowError::Mismatch);
            };
            for inf in &tuple.members[shared..] {
                members.push(self.valid_type(rest, inf)?);
            }
        } else {
            for exp in &expected.members[shared..] {
                members.push(self.fill_value(exp)?);
            }
        }
        Ok(Ty::Tuple(TupleTy::new(members)).into())
    }

    fn valid_map(&mut self, constraint: &TyRef, inferred: &TyRef) -> NarrowResult {
        let Some(record) = inferred.as_record() else {
            return Err(NarrowError::Mismatch);
        };
        let mut fields = Vec::with_capacity(record.fields.len());
        for (name, field) in &record.fields {
            fields.push((name.clone(), self.valid_type(constraint, &field.ty)?));
        }
        Ok(Ty::Record(RecordTy::sealed(fields)).into())
    }

    /// Every expected field must be present, optional ones included. Fields
    /// only the inferred side has go to the rest type, or are kept as
    /// inferred by an open record without one.
    fn valid_record(&mut self, expected: &RecordTy, inferred: &TyRef) -> NarrowResult {
        let Some(record) = inferred.as_record() else {
            return Err(NarrowError::Mismatch);
        };

        let mut fields: Vec<(SmolStr, TyRef)> = Vec::with_capacity(record.fields.len());
        for (name, field) in &expected.fields {
            let Some(actual) = record.get(name) else {
                return Err(NarrowError::Mismatch);
            };
            fields.push((name.clone(), self.valid_type(&field.ty, &actual.ty)?));
        }

        for (name, actual) in &record.fields {
            if expected.fields.contains_key(name) {
                continue;
            }
            let ty = match (&expected.rest, expected.sealed) {
                (Some(rest), _) => self.valid_type(rest, &actual.ty)?,
                (None, false) => narrowed_type(&actual.ty),
                (None, true) => return Err(NarrowError::Mismatch),
            };
            fields.push((name.clone(), ty));
        }
        Ok(Ty::Record(RecordTy::sealed(fields)).into())
    }

    /// Each member is tried quietly. When several fit, numeric singletons
    /// are preferred int, then float, then decimal; anything else is
    /// ambiguous and falls back to the first fit.
    fn valid_union(&mut self, members: &[TyRef], inferred: &TyRef) -> NarrowResult {
        let mut valid: Vec<TyRef> = Vec::new();
        for member in members {
            self.diagnostics.mute();
            let result = self.valid_type(member, inferred);
            self.diagnostics.unmute();
            if let Ok(ty) = result {
                if !valid.contains(&ty) {
                    valid.push(ty);
                }
            }
        }

        let first = match valid.as_slice() {
            [] => return Err(NarrowError::Mismatch),
            [only] => return Ok(only.clone()),
            [first, ..] => first.clone(),
        };

        let mut selected: Option<(&TyRef, PrimitiveTy)> = None;
        let mut ambiguous = false;
        for ty in &valid {
            match ty.as_singleton().and_then(|s| s.base.numeric_kind()) {
                Some(PrimitiveTy::Int) => return Ok(ty.clone()),
                Some(PrimitiveTy::Float) => selected = Some((ty, PrimitiveTy::Float)),
                Some(PrimitiveTy::Decimal) => match selected {
                    None => selected = Some((ty, PrimitiveTy::Decimal)),
                    Some((_, PrimitiveTy::Decimal)) => ambiguous = true,
                    Some(_) => {}
                },
                _ => ambiguous = true,
            }
        }

        match selected {
            Some((ty, _)) if !ambiguous => Ok(ty.clone()),
            _ => {
                self.report_ambiguous(TyRef::union(valid.iter().cloned()));
                Ok(first)
            }
        }
    }

    fn report_ambiguous(&mut self, candidates: TyRef) {
        let Some(at_expr) = self.anchor else {
            log::debug!("ambiguous narrowing to `{candidates}` outside of a constant");
            return;
        };
        self.diagnostics.emit(ConstDiagnostic {
            at_expr,
            severity: self.config.ambiguous_type_severity,
            kind: ConstErrorKind::AmbiguousType { candidates },
        });
    }
}

/// The expected values some reading of `inferred` matches. Several matches
/// (one literal read as both `1` and `1.0`) are broken by numeric priority.
fn valid_finite(values: &[Singleton], inferred: &TyRef) -> NarrowResult {
    let readings: Vec<Singleton> = match &**inferred {
        Ty::Finite(vals) => vals.clone(),
        Ty::Union(members) => members
            .iter()
            .filter_map(|m| match &**m.effective() {
                Ty::Finite(vals) => Some(vals.clone()),
                _ => None,
            })
            .flatten()
            .collect(),
        _ => return Err(NarrowError::Mismatch),
    };

    let mut matched: Vec<&Singleton> = Vec::new();
    for value in values {
        if readings.iter().any(|r| r.same_value(value)) && !matched.contains(&value) {
            matched.push(value);
        }
    }

    matched
        .iter()
        .min_by_key(|v| v.base.numeric_priority().unwrap_or(u8::MAX))
        .map(|v| TyRef::from((*v).clone()))
        .ok_or(NarrowError::Mismatch)
}

/// The first reading that is a value of `prim`. A byte keeps the value and
/// takes the byte tag.
fn valid_primitive(prim: PrimitiveTy, expected: &TyRef, inferred: &TyRef) -> NarrowResult {
    let retag = |ty: &TyRef| match (prim, ty.as_singleton()) {
        (PrimitiveTy::Byte, Some(s)) => TyRef::from(s.with_base(PrimitiveTy::Byte)),
        _ => ty.clone(),
    };

    match &**inferred {
        Ty::Union(members) => members
            .iter()
            .find(|m| is_assignable(m, expected))
            .map(retag)
            .ok_or(NarrowError::Mismatch),
        _ if is_assignable(inferred, expected) => Ok(retag(inferred)),
        _ => Err(NarrowError::Mismatch),
    }
}
