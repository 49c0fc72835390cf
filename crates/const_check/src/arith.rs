// Value folding for operators. Every function returns None when the operation
// has no value in the result domain (overflow, division by zero, operands of
// the wrong shape); callers turn that into a fold failure.

use lang_ast::{ArithBinOp, BinOp, BitwiseBinOp, LogicBinOp, UnaryOp};
use lang_ty::{OrderedFloat, PrimitiveTy, Scalar};

pub fn fold_binary(op: BinOp, lhs: &Scalar, rhs: &Scalar, result: PrimitiveTy) -> Option<Scalar> {
    match (op, result) {
        (BinOp::Arith(op), PrimitiveTy::Int) => {
            int_arith(op, lhs.as_int()?, rhs.as_int()?).map(Scalar::Int)
        }
        (BinOp::Arith(op), PrimitiveTy::Float) => {
            let (Scalar::Float(a), Scalar::Float(b)) = (lhs, rhs) else {
                return None;
            };
            Some(Scalar::Float(OrderedFloat(float_arith(op, a.0, b.0))))
        }
        (BinOp::Arith(op), PrimitiveTy::Decimal) => {
            let (Scalar::Decimal(a), Scalar::Decimal(b)) = (lhs, rhs) else {
                return None;
            };
            let value = match op {
                ArithBinOp::Add => a.checked_add(b),
                ArithBinOp::Sub => a.checked_sub(b),
                ArithBinOp::Mul => a.checked_mul(b),
                ArithBinOp::Div => a.checked_div(b),
                ArithBinOp::Mod => a.checked_rem(b),
            }?;
            Some(Scalar::Decimal(value))
        }
        (BinOp::Arith(ArithBinOp::Add), PrimitiveTy::String) => {
            let (a, b) = (lhs.as_str()?, rhs.as_str()?);
            Some(Scalar::String(format!("{a}{b}").into()))
        }
        (BinOp::Bitwise(op), PrimitiveTy::Int) => {
            Some(Scalar::Int(bitwise(op, lhs.as_int()?, rhs.as_int()?)))
        }
        (BinOp::Logic(op), PrimitiveTy::Boolean) => {
            let (a, b) = (lhs.as_bool()?, rhs.as_bool()?);
            Some(Scalar::Boolean(match op {
                LogicBinOp::And => a && b,
                LogicBinOp::Or => a || b,
            }))
        }
        _ => None,
    }
}

fn int_arith(op: ArithBinOp, a: i64, b: i64) -> Option<i64> {
    match op {
        ArithBinOp::Add => a.checked_add(b),
        ArithBinOp::Sub => a.checked_sub(b),
        ArithBinOp::Mul => a.checked_mul(b),
        ArithBinOp::Div => a.checked_div(b),
        ArithBinOp::Mod => a.checked_rem(b),
    }
}

fn float_arith(op: ArithBinOp, a: f64, b: f64) -> f64 {
    match op {
        ArithBinOp::Add => a + b,
        ArithBinOp::Sub => a - b,
        ArithBinOp::Mul => a * b,
        ArithBinOp::Div => a / b,
        ArithBinOp::Mod => a % b,
    }
}

/// Shift counts only use their low six bits.
fn bitwise(op: BitwiseBinOp, a: i64, b: i64) -> i64 {
    let shift = (b & 63) as u32;
    match op {
        BitwiseBinOp::And => a & b,
        BitwiseBinOp::Or => a | b,
        BitwiseBinOp::Xor => a ^ b,
        BitwiseBinOp::Shl => a.wrapping_shl(shift),
        BitwiseBinOp::Shr => a >> shift,
        BitwiseBinOp::UShr => ((a as u64) >> shift) as i64,
    }
}

pub fn fold_unary(op: UnaryOp, operand: &Scalar) -> Option<Scalar> {
    match (op, operand) {
        (UnaryOp::Plus, Scalar::Int(_) | Scalar::Float(_) | Scalar::Decimal(_)) => {
            Some(operand.clone())
        }
        (UnaryOp::Minus, Scalar::Int(i)) => i.checked_neg().map(Scalar::Int),
        (UnaryOp::Minus, Scalar::Float(f)) => Some(Scalar::Float(-*f)),
        (UnaryOp::Minus, Scalar::Decimal(d)) => Some(Scalar::Decimal(-d)),
        (UnaryOp::BitNot, Scalar::Int(i)) => Some(Scalar::Int(!i)),
        (UnaryOp::Not, Scalar::Boolean(b)) => Some(Scalar::Boolean(!b)),
        _ => None,
    }
}
