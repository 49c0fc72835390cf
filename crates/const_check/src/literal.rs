// ==============================================================================
// Literal / finite-type factory
// ==============================================================================
//
// Turns a literal into a singleton, or into a union of singleton candidates
// when the numeric kind depends on context. Candidate order matters for the
// "first candidate" fallbacks later on: integer literals offer int, float,
// decimal; decimal-point literals offer decimal, float.

use lang_ast::Literal;
use lang_ty::{Decimal, PrimitiveTy, Singleton, Ty, TyRef};
use smol_str::SmolStr;
use thiserror::Error;

use crate::config::CheckConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("`{text}` is out of range")]
    OutOfRange { text: SmolStr },
}

/// The type of `lit` with `expected` (if any) as context.
pub fn literal_type(
    lit: &Literal,
    expected: Option<&TyRef>,
    config: &CheckConfig,
) -> Result<TyRef, LiteralError> {
    // an erroneous expectation gives no context
    let expected = expected.filter(|ty| !ty.effective().is_error());
    let out_of_range = |text: &SmolStr| LiteralError::OutOfRange { text: text.clone() };

    let (text, candidates) = match lit {
        Literal::Int(text) => {
            let value = parse_int(text).ok_or_else(|| out_of_range(text))?;
            if expected.is_none() {
                return Ok(Singleton::int(value).into());
            }
            let mut candidates = vec![Singleton::int(value), Singleton::float(value as f64)];
            if !is_hex(text) {
                candidates.push(Singleton::decimal(Decimal::from(value)));
            }
            (text, candidates)
        }
        Literal::Float(text) => {
            if let Some(body) = strip_suffix(text, ['f', 'F']) {
                let value = parse_float(body).ok_or_else(|| out_of_range(text))?;
                return Ok(Singleton::float(value).into());
            }
            if let Some(body) = strip_suffix(text, ['d', 'D']) {
                let value = parse_decimal(body).ok_or_else(|| out_of_range(text))?;
                return Ok(Singleton::decimal(value).into());
            }
            if expected.is_none() {
                let value = parse_float(text).ok_or_else(|| out_of_range(text))?;
                return Ok(Singleton::float(value).into());
            }
            let mut candidates = Vec::with_capacity(2);
            if let Some(value) = parse_decimal(text) {
                candidates.push(Singleton::decimal(value));
            }
            if let Some(value) = parse_float(text) {
                candidates.push(Singleton::float(value));
            }
            (text, candidates)
        }
        Literal::HexFloat(text) => {
            let value = parse_hex_float(text).ok_or_else(|| out_of_range(text))?;
            return Ok(Singleton::float(value).into());
        }
        Literal::String(s) => return Ok(Singleton::string(s.clone()).into()),
        Literal::Bool(b) => return Ok(Singleton::boolean(*b).into()),
        Literal::Nil => return Ok(Singleton::nil().into()),
    };

    let candidates = match expected {
        Some(expected) if config.prune_literal_candidates => prune(candidates, expected),
        _ => candidates,
    };

    if candidates.is_empty() {
        return Err(out_of_range(text));
    }
    Ok(TyRef::union(candidates.into_iter().map(TyRef::from)))
}

/// Drop candidates whose numeric kind the expected type can never hold.
/// When the expected type holds no numeric kind at all nothing is dropped,
/// so the mismatch is reported against the full literal.
fn prune(candidates: Vec<Singleton>, expected: &TyRef) -> Vec<Singleton> {
    let mut kinds = Vec::new();
    reachable_numeric_kinds(expected, &mut kinds);
    if kinds.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| c.base.numeric_kind().is_some_and(|k| kinds.contains(&k)))
        .collect()
}

/// Numeric kinds (`Int`, `Float`, `Decimal`) a value of `ty` or any of its
/// members could be.
pub fn reachable_numeric_kinds(ty: &TyRef, out: &mut Vec<PrimitiveTy>) {
    let mut add = |kind: PrimitiveTy| {
        if !out.contains(&kind) {
            out.push(kind);
        }
    };
    match &**ty.effective() {
        Ty::Primitive(p) => {
            if let Some(kind) = p.numeric_kind() {
                add(kind);
            }
        }
        Ty::Finite(values) => {
            for kind in values.iter().filter_map(|v| v.base.numeric_kind()) {
                add(kind);
            }
        }
        Ty::Anydata | Ty::Json => {
            add(PrimitiveTy::Int);
            add(PrimitiveTy::Float);
            add(PrimitiveTy::Decimal);
        }
        Ty::Union(members) => members.iter().for_each(|m| reachable_numeric_kinds(m, out)),
        Ty::Array { elem, .. } | Ty::Map(elem) => reachable_numeric_kinds(elem, out),
        Ty::Tuple(tuple) => tuple
            .members
            .iter()
            .chain(tuple.rest.as_ref())
            .for_each(|m| reachable_numeric_kinds(m, out)),
        Ty::Record(record) => record
            .fields
            .values()
            .map(|f| &f.ty)
            .chain(record.rest.as_ref())
            .for_each(|m| reachable_numeric_kinds(m, out)),
        Ty::Table | Ty::Error | Ty::Reference { .. } | Ty::Intersection { .. } => {}
    }
}

// ==============================================================================
// Numeric text parsing
// ==============================================================================

fn is_hex(text: &str) -> bool {
    text.starts_with("0x") || text.starts_with("0X")
}

fn strip_suffix<const N: usize>(text: &str, suffixes: [char; N]) -> Option<&str> {
    text.strip_suffix(suffixes)
}

fn parse_int(text: &str) -> Option<i64> {
    if is_hex(text) {
        i64::from_str_radix(&text[2..], 16).ok()
    } else {
        text.parse().ok()
    }
}

/// A finite double. Text that only underflows to zero is rejected, genuine
/// zeros are not.
fn parse_float(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 && !is_zero_text(text) {
        return None;
    }
    Some(value)
}

fn is_zero_text(text: &str) -> bool {
    let mantissa = text.split(['e', 'E']).next().unwrap_or(text);
    mantissa.chars().all(|c| matches!(c, '0' | '.' | '+' | '-'))
}

/// A decimal128 value; text outside its exponent range is rejected.
fn parse_decimal(text: &str) -> Option<Decimal> {
    text.parse().ok()
}

/// `0x<hex>[.<hex>]p[+-]<dec>`
fn parse_hex_float(text: &str) -> Option<f64> {
    let body = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
    let (mantissa, exponent) = body.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value = 0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    let value = value * 2f64.powi(exponent);
    value.is_finite().then_some(value)
}
