// ==============================================================================
// Operator Dispatch Table
// ==============================================================================
//
// Which base types each operator accepts and what base it produces. Folding
// the actual values lives in `arith`; this table only answers "is this
// combination meaningful, and in which domain".

use lang_ast::{ArithBinOp, BinOp, LogicBinOp, UnaryOp};
use lang_ty::PrimitiveTy;

/// How a binary operator types its operands.
pub struct OperatorSpec {
    /// Given concrete lhs/rhs bases, the result base, or None if the
    /// combination is invalid.
    pub full_resolve: fn(PrimitiveTy, PrimitiveTy) -> Option<PrimitiveTy>,
}

pub fn operator_spec(op: BinOp) -> OperatorSpec {
    match op {
        BinOp::Arith(ArithBinOp::Add) => OperatorSpec {
            full_resolve: resolve_add,
        },
        BinOp::Arith(_) => OperatorSpec {
            full_resolve: resolve_numeric_only,
        },
        BinOp::Bitwise(_) => OperatorSpec {
            full_resolve: resolve_int_only,
        },
        BinOp::Logic(LogicBinOp::And | LogicBinOp::Or) => OperatorSpec {
            full_resolve: resolve_boolean_only,
        },
    }
}

pub fn resolve_binary(op: BinOp, lhs: PrimitiveTy, rhs: PrimitiveTy) -> Option<PrimitiveTy> {
    (operator_spec(op).full_resolve)(lhs, rhs)
}

/// Result base of a unary operator applied to `operand`.
pub fn resolve_unary(op: UnaryOp, operand: PrimitiveTy) -> Option<PrimitiveTy> {
    match op {
        UnaryOp::Plus | UnaryOp::Minus => operand.numeric_kind(),
        UnaryOp::BitNot => {
            (operand.numeric_kind() == Some(PrimitiveTy::Int)).then_some(PrimitiveTy::Int)
        }
        UnaryOp::Not => (operand == PrimitiveTy::Boolean).then_some(PrimitiveTy::Boolean),
    }
}

// ==========================================================================
// Resolution functions
// ==========================================================================

/// `+`: numeric addition within one domain, or string concatenation.
fn resolve_add(lhs: PrimitiveTy, rhs: PrimitiveTy) -> Option<PrimitiveTy> {
    if lhs == PrimitiveTy::String && rhs == PrimitiveTy::String {
        return Some(PrimitiveTy::String);
    }
    resolve_numeric_only(lhs, rhs)
}

/// `- * / %`: both operands in the same numeric domain. There is no implicit
/// widening, `1 + 1.0` only works by picking the float reading of `1`.
fn resolve_numeric_only(lhs: PrimitiveTy, rhs: PrimitiveTy) -> Option<PrimitiveTy> {
    let kind = lhs.numeric_kind()?;
    (rhs.numeric_kind() == Some(kind)).then_some(kind)
}

fn resolve_int_only(lhs: PrimitiveTy, rhs: PrimitiveTy) -> Option<PrimitiveTy> {
    let is_int = |p: PrimitiveTy| p.numeric_kind() == Some(PrimitiveTy::Int);
    (is_int(lhs) && is_int(rhs)).then_some(PrimitiveTy::Int)
}

fn resolve_boolean_only(lhs: PrimitiveTy, rhs: PrimitiveTy) -> Option<PrimitiveTy> {
    (lhs == PrimitiveTy::Boolean && rhs == PrimitiveTy::Boolean).then_some(PrimitiveTy::Boolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_ast::BitwiseBinOp;
    use PrimitiveTy::*;

    const BITWISE_OPS: [BitwiseBinOp; 6] = [
        BitwiseBinOp::And,
        BitwiseBinOp::Or,
        BitwiseBinOp::Xor,
        BitwiseBinOp::Shl,
        BitwiseBinOp::Shr,
        BitwiseBinOp::UShr,
    ];

    #[test]
    fn add_accepts_numbers_and_strings() {
        let add = BinOp::Arith(ArithBinOp::Add);
        assert_eq!(resolve_binary(add, Int, Int), Some(Int));
        assert_eq!(resolve_binary(add, Decimal, Decimal), Some(Decimal));
        assert_eq!(resolve_binary(add, String, String), Some(String));
        assert_eq!(resolve_binary(add, Int, Float), None);
        assert_eq!(resolve_binary(add, String, Int), None);
    }

    #[test]
    fn bytes_compute_as_ints() {
        let mul = BinOp::Arith(ArithBinOp::Mul);
        assert_eq!(resolve_binary(mul, Byte, Byte), Some(Int));
        assert_eq!(resolve_binary(mul, Byte, Int), Some(Int));
        for op in BITWISE_OPS {
            assert_eq!(resolve_binary(op.into(), Byte, Int), Some(Int));
            assert_eq!(resolve_binary(op.into(), Float, Float), None);
        }
    }

    #[test]
    fn logic_needs_booleans() {
        let and = BinOp::Logic(LogicBinOp::And);
        assert_eq!(resolve_binary(and, Boolean, Boolean), Some(Boolean));
        assert_eq!(resolve_binary(and, Int, Boolean), None);
    }

    #[test]
    fn unary() {
        assert_eq!(resolve_unary(UnaryOp::Minus, Decimal), Some(Decimal));
        assert_eq!(resolve_unary(UnaryOp::Minus, Byte), Some(Int));
        assert_eq!(resolve_unary(UnaryOp::BitNot, Float), None);
        assert_eq!(resolve_unary(UnaryOp::Not, Boolean), Some(Boolean));
        assert_eq!(resolve_unary(UnaryOp::Not, Int), None);
        assert_eq!(resolve_unary(UnaryOp::Plus, String), None);
    }
}
