use crate::{
    ArraySize, Decimal, OrderedFloat, PrimitiveTy, RecordTy, Scalar, Singleton, TupleTy, Ty, TyRef,
};
use proptest::{
    prelude::{any, prop, prop_oneof, Arbitrary, BoxedStrategy, Just, Strategy},
    prop_compose,
};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy)]
pub struct RecursiveParams {
    pub depth: u32,
    pub desired_size: u32,
    pub expected_branch_size: u32,
}

impl Default for RecursiveParams {
    fn default() -> Self {
        Self {
            depth: 3,                // levels deep
            desired_size: 32,        // total nodes
            expected_branch_size: 3, // items per collection
        }
    }
}

/// Expected-type shapes: everything a constant can be declared as.
fn arb_ty(args: RecursiveParams) -> impl Strategy<Value = Ty> {
    let leaf = prop_oneof![
        4 => any::<PrimitiveTy>().prop_map(Ty::Primitive),
        1 => any::<Singleton>().prop_map(Ty::singleton),
        1 => Just(Ty::Anydata),
    ];

    leaf.prop_recursive(
        args.depth,
        args.desired_size,
        args.expected_branch_size,
        |inner| {
            let inner = inner.prop_map(TyRef::from);

            prop_oneof![
                (inner.clone(), arb_array_size()).prop_map(|(elem, size)| Ty::Array { elem, size }),
                (prop::collection::vec(inner.clone(), 0..4), prop::option::of(inner.clone()))
                    .prop_map(|(members, rest)| Ty::Tuple(TupleTy { members, rest })),
                prop::collection::btree_map(arb_smol_str_ident(), inner.clone(), 0..4).prop_map(
                    |map| Ty::Record(RecordTy::sealed(map))
                ),
                inner.clone().prop_map(Ty::Map),
                prop::collection::vec(inner, 2..4)
                    .prop_map(|members| (*TyRef::union(members).0).clone()),
            ]
        },
    )
}

fn arb_array_size() -> impl Strategy<Value = ArraySize> {
    prop_oneof![
        (0usize..4).prop_map(ArraySize::Closed),
        Just(ArraySize::Open),
    ]
}

prop_compose! {
    // field names stay short, collisions are fine
    fn arb_smol_str_ident()(string in "[a-z]{1,6}") -> SmolStr {
        string.into()
    }
}

impl Arbitrary for Ty {
    type Parameters = RecursiveParams;
    type Strategy = BoxedStrategy<Ty>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        arb_ty(args).boxed()
    }
}

pub fn arb_prim() -> impl Strategy<Value = PrimitiveTy> {
    prop_oneof![
        Just(PrimitiveTy::Int),
        Just(PrimitiveTy::Float),
        Just(PrimitiveTy::Decimal),
        Just(PrimitiveTy::String),
        Just(PrimitiveTy::Boolean),
        Just(PrimitiveTy::Nil),
        Just(PrimitiveTy::Byte),
    ]
}

impl Arbitrary for PrimitiveTy {
    type Parameters = ();
    type Strategy = BoxedStrategy<PrimitiveTy>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        arb_prim().boxed()
    }
}

pub fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<i64>().prop_map(Scalar::Int),
        (-1.0e6f64..1.0e6).prop_map(|f| Scalar::Float(OrderedFloat(f))),
        (any::<i32>(), 0i64..6).prop_filter_map("decimal range", |(m, scale)| {
            Decimal::new(m.into(), scale).map(Scalar::Decimal)
        }),
        "[a-z]{0,4}".prop_map(|s| Scalar::String(s.into())),
        any::<bool>().prop_map(Scalar::Boolean),
        Just(Scalar::Nil),
    ]
}

impl Arbitrary for Scalar {
    type Parameters = ();
    type Strategy = BoxedStrategy<Scalar>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        arb_scalar().boxed()
    }
}

impl Arbitrary for Singleton {
    type Parameters = ();
    type Strategy = BoxedStrategy<Singleton>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            4 => arb_scalar().prop_map(Singleton::new),
            1 => (0i64..=255).prop_filter_map("byte range", Singleton::byte),
        ]
        .boxed()
    }
}
