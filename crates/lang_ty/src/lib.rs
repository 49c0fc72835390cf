mod arc_ty;
mod assign;
pub mod decimal;
mod primitive;
mod record;
mod singleton;
mod union;

#[cfg(feature = "proptest_support")]
pub mod arbitrary;

#[cfg(test)]
mod tests;

pub use arc_ty::{ArraySize, TupleTy, Ty, TyRef};
pub use assign::is_assignable;
pub use decimal::{Decimal, DecimalError};
pub use primitive::PrimitiveTy;
pub use record::{FieldTy, RecordTy};
pub use singleton::{Scalar, Singleton};

// Re-exported so `ty!` expansions and downstream crates agree on the types.
pub use ordered_float::OrderedFloat;
pub use smol_str::SmolStr;

/// Type literals for tests and tables. Evaluates to a [`TyRef`].
///
/// ```ignore
/// ty!(Int)                      // int
/// ty!(int = 3)                  // the singleton 3
/// ty!([Int; 3])                 // int[3]
/// ty!([Int])                    // int[]
/// ty!([Int; *])                 // int[*]
/// ty!(tuple [Int, String])      // [int, string]
/// ty!(tuple [Int; String])      // [int, string...]
/// ty!({ "a": Int })             // {| a: int; |}
/// ty!({ "a": Int; Anydata })    // { a: int; anydata...; }
/// ty!({ "a": Int; .. })         // { a: int; }
/// ty!(map<Int>)
/// ty!(Int | String | Nil)
/// ```
#[macro_export]
macro_rules! ty {
    // -- Match on known primitives -----------------------------------------
    (Int) => {
        $crate::TyRef::from($crate::PrimitiveTy::Int)
    };
    (Float) => {
        $crate::TyRef::from($crate::PrimitiveTy::Float)
    };
    (Decimal) => {
        $crate::TyRef::from($crate::PrimitiveTy::Decimal)
    };
    (String) => {
        $crate::TyRef::from($crate::PrimitiveTy::String)
    };
    (Boolean) => {
        $crate::TyRef::from($crate::PrimitiveTy::Boolean)
    };
    (Nil) => {
        $crate::TyRef::from($crate::PrimitiveTy::Nil)
    };
    (Byte) => {
        $crate::TyRef::from($crate::PrimitiveTy::Byte)
    };
    (Anydata) => {
        $crate::TyRef::from($crate::Ty::Anydata)
    };
    (Json) => {
        $crate::TyRef::from($crate::Ty::Json)
    };
    (Table) => {
        $crate::TyRef::from($crate::Ty::Table)
    };
    (Error) => {
        $crate::TyRef::error()
    };

    // -- Singletons ----------------------------------------------------------
    (int = $v:expr) => {
        $crate::TyRef::from($crate::Singleton::int($v))
    };
    (float = $v:expr) => {
        $crate::TyRef::from($crate::Singleton::float($v))
    };
    (decimal = $v:literal) => {
        $crate::TyRef::from($crate::Singleton::decimal(
            <$crate::Decimal as ::std::str::FromStr>::from_str($v).unwrap(),
        ))
    };
    (string = $v:expr) => {
        $crate::TyRef::from($crate::Singleton::string($v))
    };
    (boolean = $v:expr) => {
        $crate::TyRef::from($crate::Singleton::boolean($v))
    };
    (byte = $v:expr) => {
        $crate::TyRef::from($crate::Singleton::byte($v).unwrap())
    };

    // -- Structured ----------------------------------------------------------
    (($($inner:tt)*)) => { $crate::ty!($($inner)*) };

    ([$elem:tt; *]) => {
        $crate::TyRef::from($crate::Ty::Array {
            elem: $crate::ty!($elem),
            size: $crate::ArraySize::Inferred,
        })
    };
    ([$elem:tt; $n:literal]) => {
        $crate::TyRef::from($crate::Ty::Array {
            elem: $crate::ty!($elem),
            size: $crate::ArraySize::Closed($n),
        })
    };
    ([$elem:tt]) => {
        $crate::TyRef::from($crate::Ty::Array {
            elem: $crate::ty!($elem),
            size: $crate::ArraySize::Open,
        })
    };

    (tuple [$($m:tt),* $(,)?]) => {
        $crate::TyRef::from($crate::Ty::Tuple($crate::TupleTy {
            members: vec![$($crate::ty!($m)),*],
            rest: None,
        }))
    };
    (tuple [$($m:tt),* ; $rest:tt]) => {
        $crate::TyRef::from($crate::Ty::Tuple($crate::TupleTy {
            members: vec![$($crate::ty!($m)),*],
            rest: Some($crate::ty!($rest)),
        }))
    };

    (map < $c:tt >) => {
        $crate::TyRef::from($crate::Ty::Map($crate::ty!($c)))
    };

    ({ $($key:literal : $ty:tt),* $(,)? }) => {
        $crate::TyRef::from($crate::Ty::Record($crate::RecordTy::sealed([
            $(($crate::SmolStr::from($key), $crate::ty!($ty)),)*
        ])))
    };
    ({ $($key:literal : $ty:tt),* ; .. }) => {
        $crate::TyRef::from($crate::Ty::Record($crate::RecordTy::open(
            [$(($crate::SmolStr::from($key), $crate::FieldTy::required($crate::ty!($ty))),)*],
            None,
        )))
    };
    ({ $($key:literal : $ty:tt),* ; $rest:tt }) => {
        $crate::TyRef::from($crate::Ty::Record($crate::RecordTy::open(
            [$(($crate::SmolStr::from($key), $crate::FieldTy::required($crate::ty!($ty))),)*],
            Some($crate::ty!($rest)),
        )))
    };

    ($first:tt $(| $rest:tt)+) => {
        $crate::TyRef::union([$crate::ty!($first), $($crate::ty!($rest)),+])
    };
}
