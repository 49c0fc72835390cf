use std::{collections::BTreeMap, fmt};

use derive_more::Debug;
use lang_ty::{OrderedFloat, PrimitiveTy, Scalar, Ty, TyRef};
use smol_str::SmolStr;

/// The runtime value a resolved constant denotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    #[debug("{_0}")]
    Int(i64),
    #[debug("{_0}b")]
    Byte(u8),
    #[debug("{_0:?}f")]
    Float(OrderedFloat<f64>),
    /// Decimal text, exact to the digit.
    #[debug("{_0}d")]
    Decimal(SmolStr),
    #[debug("{_0:?}")]
    String(SmolStr),
    #[debug("{_0}")]
    Boolean(bool),
    #[debug("()")]
    Nil,
    #[debug("{_0:?}")]
    List(Vec<ConstantValue>),
    #[debug("{_0:?}")]
    Map(BTreeMap<SmolStr, ConstantValue>),
}

/// The value of a constant whose final type is `ty`, or None when the type
/// does not pin down exactly one value.
pub fn constant_value(ty: &TyRef) -> Option<ConstantValue> {
    match &**ty.effective() {
        Ty::Finite(values) => {
            let [value] = values.as_slice() else {
                return None;
            };
            Some(match (&value.value, value.base) {
                (Scalar::Int(i), PrimitiveTy::Byte) => ConstantValue::Byte(u8::try_from(*i).ok()?),
                (Scalar::Int(i), _) => ConstantValue::Int(*i),
                (Scalar::Float(f), _) => ConstantValue::Float(*f),
                (Scalar::Decimal(d), _) => ConstantValue::Decimal(d.to_string().into()),
                (Scalar::String(s), _) => ConstantValue::String(s.clone()),
                (Scalar::Boolean(b), _) => ConstantValue::Boolean(*b),
                (Scalar::Nil, _) => ConstantValue::Nil,
            })
        }
        Ty::Record(record) => record
            .fields
            .iter()
            .map(|(k, f)| Some((k.clone(), constant_value(&f.ty)?)))
            .collect::<Option<_>>()
            .map(ConstantValue::Map),
        Ty::Tuple(tuple) => tuple
            .members
            .iter()
            .map(constant_value)
            .collect::<Option<_>>()
            .map(ConstantValue::List),
        Ty::Primitive(PrimitiveTy::Nil) => Some(ConstantValue::Nil),
        // a filled table has no rows
        Ty::Table => Some(ConstantValue::List(Vec::new())),
        _ => None,
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(i) => write!(f, "{i}"),
            ConstantValue::Byte(b) => write!(f, "{b}"),
            ConstantValue::Float(v) => write!(f, "{:?}", v.0),
            ConstantValue::Decimal(d) => write!(f, "{d}"),
            ConstantValue::String(s) => write!(f, "{s:?}"),
            ConstantValue::Boolean(b) => write!(f, "{b}"),
            ConstantValue::Nil => write!(f, "()"),
            ConstantValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ConstantValue::Map(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {k}: {v}")?;
                }
                write!(f, " }}")
            }
        }
    }
}
