use proptest::prelude::{any, prop_oneof, Arbitrary, BoxedStrategy, Just, Strategy};

use crate::{ArithBinOp, BinOp, BitwiseBinOp, LogicBinOp, UnaryOp};

impl Arbitrary for ArithBinOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<ArithBinOp>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(ArithBinOp::Add),
            Just(ArithBinOp::Sub),
            Just(ArithBinOp::Mul),
            Just(ArithBinOp::Div),
            Just(ArithBinOp::Mod),
        ]
        .boxed()
    }
}

impl Arbitrary for BitwiseBinOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<BitwiseBinOp>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(BitwiseBinOp::And),
            Just(BitwiseBinOp::Or),
            Just(BitwiseBinOp::Xor),
            Just(BitwiseBinOp::Shl),
            Just(BitwiseBinOp::Shr),
            Just(BitwiseBinOp::UShr),
        ]
        .boxed()
    }
}

impl Arbitrary for LogicBinOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<LogicBinOp>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![Just(LogicBinOp::And), Just(LogicBinOp::Or)].boxed()
    }
}

impl Arbitrary for BinOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<BinOp>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            any::<ArithBinOp>().prop_map(BinOp::from),
            any::<BitwiseBinOp>().prop_map(BinOp::from),
            any::<LogicBinOp>().prop_map(BinOp::from),
        ]
        .boxed()
    }
}

impl Arbitrary for UnaryOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<UnaryOp>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(UnaryOp::Plus),
            Just(UnaryOp::Minus),
            Just(UnaryOp::BitNot),
            Just(UnaryOp::Not),
        ]
        .boxed()
    }
}
