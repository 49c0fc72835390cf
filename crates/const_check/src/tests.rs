use indoc::indoc;
use lang_ast::{
    ArithBinOp, BitwiseBinOp, ConstId, ExprId, ListItem, Literal, LogicBinOp, Module,
    ModuleBuilder, RecordField, RecordKey, UnaryOp,
};
use lang_ty::{ty, PrimitiveTy, Singleton, Ty, TyRef};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{
    check_module, check_module_with_imports, CheckConfig, CheckResult, ConstChecker,
    ConstErrorKind, ConstantValue, DeclaredTypes, ErrorCode, Frame, ImportedModules,
    ImportedSymbol, OpSignature, Severity,
};

// ==============================================================================
// Helpers
// ==============================================================================

/// A module with the single constant `X`, whose value `build` constructs.
pub fn check_one(
    declared: Option<TyRef>,
    build: impl FnOnce(&mut ModuleBuilder) -> ExprId,
) -> (Module, ConstId, CheckResult) {
    let mut b = ModuleBuilder::new();
    let value = build(&mut b);
    let id = b.constant(b.root_scope(), "X", value);
    let module = b.finish();

    let mut declared_types = DeclaredTypes::default();
    if let Some(ty) = declared {
        declared_types.insert(id, ty);
    }
    let result = check_module(&module, &declared_types);
    (module, id, result)
}

fn codes(result: &CheckResult) -> Vec<ErrorCode> {
    result.diagnostics.iter().map(|d| d.code()).collect()
}

#[track_caller]
pub fn expect_const_ty(
    declared: Option<TyRef>,
    build: impl FnOnce(&mut ModuleBuilder) -> ExprId,
    expected: TyRef,
) {
    let (_, id, result) = check_one(declared, build);
    assert_eq!(result.diagnostics, vec![], "unexpected diagnostics");
    assert_eq!(result.const_type(id), Some(&expected));
}

#[track_caller]
pub fn expect_const_error(
    declared: Option<TyRef>,
    build: impl FnOnce(&mut ModuleBuilder) -> ExprId,
    code: ErrorCode,
) {
    let (_, id, result) = check_one(declared, build);
    assert_eq!(codes(&result), vec![code]);
    assert!(result.const_type(id).is_some_and(|ty| ty.is_error()));
}

fn binary(b: &mut ModuleBuilder, lhs: &str, op: impl Into<lang_ast::BinOp>, rhs: &str) -> ExprId {
    let lhs = b.int(lhs);
    let rhs = b.int(rhs);
    b.bin_op(lhs, op, rhs)
}

fn int_list(b: &mut ModuleBuilder, items: &[&str]) -> ExprId {
    let items: Vec<ListItem> = items.iter().map(|i| ListItem::Expr(b.int(i))).collect();
    b.list(items)
}

fn nil() -> TyRef {
    Singleton::nil().into()
}

macro_rules! declared {
    (_) => {
        None
    };
    ($ty:tt) => {
        Some(ty!($ty))
    };
}

macro_rules! test_case {
    ($name:ident, $declared:tt, $build:expr, $ty:tt) => {
        #[test]
        fn $name() {
            expect_const_ty(declared!($declared), $build, ty!($ty));
        }
    };
}

macro_rules! error_case {
    ($name:ident, $declared:tt, $build:expr, $code:ident) => {
        #[test]
        fn $name() {
            expect_const_error(declared!($declared), $build, ErrorCode::$code);
        }
    };
}

// ==============================================================================
// Literals and numeric narrowing
// ==============================================================================

test_case!(int_literal, _, |b| b.int("42"), (int = 42));
test_case!(hex_int_literal, _, |b| b.int("0xff"), (int = 255));
test_case!(float_literal_without_context, _, |b| b.float("2.5"), (float = 2.5));
test_case!(decimal_discriminator, _, |b| b.float("2.5d"), (decimal = "2.5"));
test_case!(string_literal, _, |b| b.string("hi"), (string = "hi"));

test_case!(
    int_wins_among_numeric_readings,
    (Int | Float | Decimal),
    |b| b.int("1"),
    (int = 1)
);

test_case!(
    float_wins_over_decimal,
    (Float | Decimal),
    |b| b.float("1.0"),
    (float = 1.0)
);

test_case!(int_literal_as_decimal, Decimal, |b| b.int("7"), (decimal = "7"));
test_case!(int_literal_as_float, Float, |b| b.int("7"), (float = 7.0));
test_case!(byte_in_range, Byte, |b| b.int("200"), (byte = 200));

error_case!(byte_out_of_range, Byte, |b| b.int("300"), IncompatibleTypes);
error_case!(
    int_literal_out_of_range,
    _,
    |b| b.int("99999999999999999999"),
    OutOfRange
);
error_case!(string_is_not_int, Int, |b| b.string("1"), IncompatibleTypes);

#[test]
fn nil_literal() {
    expect_const_ty(Some(ty!(Nil)), |b| b.literal(Literal::Nil), nil());
}

#[test]
fn finite_expected_type_picks_the_matching_value() {
    let one_or_two: TyRef = Ty::Finite(vec![Singleton::int(1), Singleton::int(2)]).into();
    expect_const_ty(Some(one_or_two), |b| b.int("2"), ty!(int = 2));
}

// ==============================================================================
// Operators
// ==============================================================================

test_case!(
    addition,
    _,
    |b| binary(b, "40", ArithBinOp::Add, "2"),
    (int = 42)
);

test_case!(
    addition_in_float_context,
    Float,
    |b| binary(b, "1", ArithBinOp::Add, "2"),
    (float = 3.0)
);

test_case!(
    shift_masks_the_count,
    _,
    |b| binary(b, "1", BitwiseBinOp::Shl, "65"),
    (int = 2)
);

test_case!(
    decimal_addition_is_exact,
    _,
    |b| {
        let lhs = b.float("0.1d");
        let rhs = b.float("0.2d");
        b.bin_op(lhs, ArithBinOp::Add, rhs)
    },
    (decimal = "0.3")
);

test_case!(
    decimal_division_keeps_34_digits,
    Decimal,
    |b| {
        let lhs = b.float("1d");
        let rhs = b.float("3d");
        b.bin_op(lhs, ArithBinOp::Div, rhs)
    },
    (decimal = "0.3333333333333333333333333333333333")
);

test_case!(decimal_beyond_28_digits, Decimal, |b| b.float("1e30"), (decimal = "1e30"));
test_case!(
    decimal_with_31_digits,
    Decimal,
    |b| b.float("100000000000000000000000000000.5d"),
    (decimal = "100000000000000000000000000000.5")
);
error_case!(decimal_exponent_overflow, Decimal, |b| b.float("1e6145"), OutOfRange);

test_case!(
    string_concatenation,
    _,
    |b| {
        let lhs = b.string("ab");
        let rhs = b.string("cd");
        b.bin_op(lhs, ArithBinOp::Add, rhs)
    },
    (string = "abcd")
);

test_case!(
    logical_and,
    _,
    |b| {
        let lhs = b.boolean(true);
        let rhs = b.boolean(false);
        b.bin_op(lhs, LogicBinOp::And, rhs)
    },
    (boolean = false)
);

test_case!(
    negation,
    _,
    |b| {
        let five = b.int("5");
        b.unary(UnaryOp::Minus, five)
    },
    (int = -5)
);

test_case!(
    grouping_is_transparent,
    _,
    |b| {
        let sum = binary(b, "1", ArithBinOp::Add, "2");
        let group = b.group(sum);
        let three = b.int("3");
        b.bin_op(group, ArithBinOp::Mul, three)
    },
    (int = 9)
);

error_case!(
    overflow_is_not_wraparound,
    Int,
    |b| binary(b, "9223372036854775807", ArithBinOp::Add, "1"),
    InvalidConstExpression
);

error_case!(
    division_by_zero,
    _,
    |b| binary(b, "1", ArithBinOp::Div, "0"),
    InvalidConstExpression
);

error_case!(
    mixed_operands,
    _,
    |b| {
        let lhs = b.int("1");
        let rhs = b.string("a");
        b.bin_op(lhs, ArithBinOp::Add, rhs)
    },
    InvalidConstExpression
);

error_case!(
    not_on_int,
    _,
    |b| {
        let one = b.int("1");
        b.unary(UnaryOp::Not, one)
    },
    InvalidConstExpression
);

#[test]
fn operand_readings_follow_the_result() {
    let mut operands = (None, None);
    let (_, _, result) = check_one(Some(ty!(Float)), |b| {
        let lhs = b.int("1");
        let rhs = b.int("2");
        operands = (Some(lhs), Some(rhs));
        b.bin_op(lhs, ArithBinOp::Add, rhs)
    });
    let (Some(lhs), Some(rhs)) = operands else {
        unreachable!()
    };
    assert_eq!(result.expr_type(lhs), Some(&ty!(float = 1.0)));
    assert_eq!(result.expr_type(rhs), Some(&ty!(float = 2.0)));
}

#[test]
fn signatures_are_rewritten_to_the_final_types() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let sum = binary(&mut b, "1", ArithBinOp::Add, "2");
    let x = b.constant(root, "X", sum);
    let module = b.finish();

    let declared: DeclaredTypes = [(x, ty!(Decimal | Float))].into_iter().collect();
    let result = check_module(&module, &declared);

    assert_eq!(result.const_type(x), Some(&ty!(float = 3.0)));
    assert_eq!(
        result.op_signatures.get(&sum),
        Some(&OpSignature {
            params: vec![ty!(Float), ty!(Float)],
            ret: ty!(Float),
        })
    );
}

// ==============================================================================
// Lists
// ==============================================================================

test_case!(
    missing_members_are_filled,
    (tuple [Int, Int, Int]),
    |b| int_list(b, &["1"]),
    (tuple [(int = 1), (int = 0), (int = 0)])
);

test_case!(
    closed_array_is_filled,
    ([String; 2]),
    |b| {
        let s = b.string("a");
        b.list([ListItem::Expr(s)])
    },
    (tuple [(string = "a"), (string = "")])
);

test_case!(
    open_array_takes_the_members,
    ([Float]),
    |b| int_list(b, &["1", "2"]),
    (tuple [(float = 1.0), (float = 2.0)])
);

test_case!(
    tuple_rest_takes_the_excess,
    (tuple [Int; String]),
    |b| {
        let one = b.int("1");
        let s = b.string("s");
        let t = b.string("t");
        b.list([ListItem::Expr(one), ListItem::Expr(s), ListItem::Expr(t)])
    },
    (tuple [(int = 1), (string = "s"), (string = "t")])
);

error_case!(
    closed_array_too_small,
    ([Int; 1]),
    |b| int_list(b, &["1", "2"]),
    IncompatibleTypes
);

error_case!(
    fill_without_default,
    ([(Int | String); 2]),
    |b| b.list([]),
    InvalidListConstructorElementType
);

#[test]
fn spread_splices_members() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let t_value = int_list(&mut b, &["1", "2", "3"]);
    b.constant(root, "t", t_value);
    let t = b.reference("t");
    let four = b.int("4");
    let x_value = b.list([ListItem::Spread(t), ListItem::Expr(four)]);
    let x = b.constant(root, "X", x_value);
    let module = b.finish();

    let result = check_module(&module, &DeclaredTypes::default());
    assert_eq!(result.diagnostics, vec![]);
    assert_eq!(
        result.const_type(x),
        Some(&ty!(tuple [(int = 1), (int = 2), (int = 3), (int = 4)]))
    );
    assert_eq!(
        result.values.get(&x).map(ToString::to_string).as_deref(),
        Some("[1, 2, 3, 4]")
    );
}

error_case!(
    spread_of_a_scalar,
    _,
    |b| {
        let one = b.int("1");
        b.list([ListItem::Spread(one)])
    },
    IncompatibleTypes
);

// ==============================================================================
// Records
// ==============================================================================

fn record_ab(b: &mut ModuleBuilder) -> ExprId {
    let one = b.int("1");
    let two = b.int("2");
    b.record([
        RecordField::KeyValue {
            key: RecordKey::Name("a".into()),
            value: one,
        },
        RecordField::KeyValue {
            key: RecordKey::Name("b".into()),
            value: two,
        },
    ])
}

test_case!(
    record_without_declared_type,
    _,
    record_ab,
    { "a": (int = 1), "b": (int = 2) }
);

test_case!(
    record_as_map,
    (map<Float>),
    record_ab,
    { "a": (float = 1.0), "b": (float = 2.0) }
);

test_case!(
    open_record_keeps_extra_fields,
    ({ "a": Int; .. }),
    record_ab,
    { "a": (int = 1), "b": (int = 2) }
);

test_case!(
    record_rest_validates_extra_fields,
    ({ "a": Int; Decimal }),
    record_ab,
    { "a": (int = 1), "b": (decimal = "2") }
);

error_case!(
    sealed_record_rejects_extra_fields,
    ({ "a": Int }),
    record_ab,
    IncompatibleTypes
);

error_case!(
    record_field_missing,
    ({ "a": Int, "c": Int }),
    record_ab,
    IncompatibleTypes
);

error_case!(
    duplicate_key,
    _,
    |b| {
        let one = b.int("1");
        let two = b.int("2");
        b.record([
            RecordField::KeyValue {
                key: RecordKey::Name("a".into()),
                value: one,
            },
            RecordField::KeyValue {
                key: RecordKey::Name("a".into()),
                value: two,
            },
        ])
    },
    DuplicateKey
);

test_case!(
    computed_key_overwrites,
    _,
    |b| {
        let one = b.int("1");
        let key = b.string("a");
        let x = b.string("x");
        b.record([
            RecordField::KeyValue {
                key: RecordKey::Name("a".into()),
                value: one,
            },
            RecordField::KeyValue {
                key: RecordKey::Computed(key),
                value: x,
            },
        ])
    },
    { "a": (string = "x") }
);

error_case!(
    computed_key_must_be_a_string,
    _,
    |b| {
        let key = b.int("1");
        let value = b.int("2");
        b.record([RecordField::KeyValue {
            key: RecordKey::Computed(key),
            value,
        }])
    },
    IncompatibleTypes
);

#[test]
fn var_name_and_spread_fields() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let one = b.int("1");
    b.constant(root, "a", one);
    let base_value = {
        let two = b.int("2");
        b.record([RecordField::KeyValue {
            key: RecordKey::Name("b".into()),
            value: two,
        }])
    };
    b.constant(root, "BASE", base_value);

    let a = b.reference("a");
    let base = b.reference("BASE");
    let x_value = b.record([RecordField::VarName(a), RecordField::Spread(base)]);
    let x = b.constant(root, "X", x_value);
    let module = b.finish();

    let result = check_module(&module, &DeclaredTypes::default());
    assert_eq!(result.diagnostics, vec![]);
    assert_eq!(
        result.const_type(x),
        Some(&ty!({ "a": (int = 1), "b": (int = 2) }))
    );
}

// ==============================================================================
// References
// ==============================================================================

#[test]
fn forward_references_resolve() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let later = b.reference("B");
    let one = b.int("1");
    let a_value = b.bin_op(later, ArithBinOp::Add, one);
    let a = b.constant(root, "A", a_value);
    let two = b.int("2");
    b.constant(root, "B", two);
    let module = b.finish();

    let declared = DeclaredTypes::default();
    let imports = ImportedModules::default();
    let config = CheckConfig::default();
    let mut checker = ConstChecker::new(&module, &declared, &imports, &config);
    assert_eq!(checker.resolve_constant(a), ty!(int = 3));
    let result = checker.finish();
    assert_eq!(result.values.get(&a), Some(&ConstantValue::Int(3)));
    assert_eq!(result.const_types.len(), 2);
}

fn cycle_module() -> (Module, ConstId, ConstId) {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let to_b = b.reference("B");
    let a = b.constant(root, "A", to_b);
    let to_a = b.reference("A");
    let b_id = b.constant(root, "B", to_a);
    (b.finish(), a, b_id)
}

#[test]
fn cycles_are_rejected_as_a_whole() {
    let (module, a, b) = cycle_module();
    let result = check_module(&module, &DeclaredTypes::default());

    assert_eq!(codes(&result), vec![ErrorCode::NotAConstantExpression]);
    assert_eq!(
        result.diagnostics[0].kind,
        ConstErrorKind::ConstantCycle {
            names: vec!["A".into(), "B".into()]
        }
    );
    assert!(result.const_type(a).is_some_and(|ty| ty.is_error()));
    assert!(result.const_type(b).is_some_and(|ty| ty.is_error()));
}

#[test]
fn on_demand_cycle_is_a_self_reference() {
    let (module, a, _) = cycle_module();
    let declared = DeclaredTypes::default();
    let imports = ImportedModules::default();
    let config = CheckConfig::default();
    let mut checker = ConstChecker::new(&module, &declared, &imports, &config);

    assert!(checker.resolve_constant(a).is_error());
    checker.resolve_all();
    let result = checker.finish();
    assert_eq!(
        result.diagnostics[0].kind,
        ConstErrorKind::SelfReference { name: "A".into() }
    );
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn dependents_of_a_cycle_fail_quietly() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let to_self = b.reference("A");
    b.constant(root, "A", to_self);
    let to_a = b.reference("A");
    let c = b.constant(root, "C", to_a);
    let module = b.finish();

    let result = check_module(&module, &DeclaredTypes::default());
    assert_eq!(codes(&result), vec![ErrorCode::NotAConstantExpression]);
    assert!(result.const_type(c).is_some_and(|ty| ty.is_error()));
}

#[test]
fn resolution_depth_is_bounded() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let to_b = b.reference("B");
    let a = b.constant(root, "A", to_b);
    let to_c = b.reference("C");
    b.constant(root, "B", to_c);
    let one = b.int("1");
    b.constant(root, "C", one);
    let module = b.finish();

    let declared = DeclaredTypes::default();
    let imports = ImportedModules::default();
    let config = CheckConfig {
        max_resolution_depth: 1,
        ..CheckConfig::default()
    };
    let mut checker = ConstChecker::new(&module, &declared, &imports, &config);
    assert!(checker.resolve_constant(a).is_error());
    let result = checker.finish();
    assert_eq!(
        result.diagnostics[0].kind,
        ConstErrorKind::ResolutionTooDeep {
            name: "C".into(),
            limit: 1
        }
    );
}

#[test]
fn undefined_symbol_suggests_a_close_name() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let ten = b.int("10");
    b.constant(root, "LIMIT", ten);
    let typo = b.reference("LIMT");
    b.constant(root, "X", typo);
    let module = b.finish();

    let result = check_module(&module, &DeclaredTypes::default());
    assert_eq!(codes(&result), vec![ErrorCode::UndefinedSymbol]);
    assert_eq!(
        result.diagnostics[0].kind.to_string(),
        "undefined symbol `LIMT`"
    );
    let ConstErrorKind::UndefinedSymbol { suggestion, .. } = &result.diagnostics[0].kind else {
        unreachable!()
    };
    assert_eq!(
        suggestion.as_ref().map(ToString::to_string).as_deref(),
        Some("did you mean `LIMIT`?")
    );
}

#[test]
fn variables_are_not_constants() {
    let (_, _, result) = check_one(None, |b| {
        let root = b.root_scope();
        b.variable(root, "v");
        b.reference("v")
    });
    assert_eq!(codes(&result), vec![ErrorCode::NotAConstantExpression]);
}

error_case!(
    unsupported_syntax,
    _,
    |b| b.alloc(lang_ast::Expr::Unsupported {
        syntax: "function call".into()
    }),
    NotAConstantExpression
);

#[test]
fn missing_expressions_are_already_reported() {
    let (_, id, result) = check_one(None, |b| b.alloc(lang_ast::Expr::Missing));
    assert_eq!(result.diagnostics, vec![]);
    assert!(result.const_type(id).is_some_and(|ty| ty.is_error()));
}

#[test]
fn imported_constants() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let names = ["pi", "f", "p", "other"];
    let exprs = [
        b.qualified("math", "PI"),
        b.qualified("math", "f"),
        b.qualified("math", "P"),
        b.qualified("other", "PI"),
    ];
    let ids: Vec<ConstId> = names
        .iter()
        .zip(exprs)
        .map(|(name, expr)| b.constant(root, name, expr))
        .collect();
    let module = b.finish();

    let mut math: FxHashMap<SmolStr, ImportedSymbol> = FxHashMap::default();
    math.insert("PI".into(), ImportedSymbol::Constant(ty!(float = 3.14)));
    math.insert("f".into(), ImportedSymbol::NonConstant);
    let mut imports = ImportedModules::default();
    imports.insert("math".into(), math);

    let result = check_module_with_imports(
        &module,
        &DeclaredTypes::default(),
        &imports,
        &CheckConfig::default(),
    );

    assert_eq!(result.const_type(ids[0]), Some(&ty!(float = 3.14)));
    let code_at = |expr: ExprId| {
        result
            .diagnostics
            .iter()
            .find(|d| d.at_expr == expr)
            .map(|d| d.code())
    };
    assert_eq!(code_at(exprs[1]), Some(ErrorCode::NotAConstantExpression));
    assert_eq!(code_at(exprs[2]), Some(ErrorCode::UndefinedSymbol));
    assert_eq!(code_at(exprs[3]), Some(ErrorCode::UndefinedModule));
}

// ==============================================================================
// Ambiguity and configuration
// ==============================================================================

fn ambiguous_list(config: &CheckConfig) -> CheckResult {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let value = int_list(&mut b, &["1"]);
    let x = b.constant(root, "X", value);
    let module = b.finish();

    let declared: DeclaredTypes = [(x, ty!(Json | [Float]))].into_iter().collect();
    let result =
        check_module_with_imports(&module, &declared, &ImportedModules::default(), config);
    assert_eq!(result.const_type(x), Some(&ty!(tuple [(int = 1)])));
    result
}

#[test]
fn ambiguous_narrowing_takes_the_first_fit() {
    let result = ambiguous_list(&CheckConfig::default());
    assert_eq!(codes(&result), vec![ErrorCode::AmbiguousType]);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
}

#[test]
fn ambiguity_severity_is_configurable() {
    let config = CheckConfig::from_toml_str("ambiguous-type-severity = \"warning\"").unwrap();
    let result = ambiguous_list(&config);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
}

#[test]
fn unpruned_overflow_reads_the_literal_another_way() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let sum = binary(&mut b, "9223372036854775807", ArithBinOp::Add, "1");
    let x = b.constant(root, "X", sum);
    let module = b.finish();

    let declared: DeclaredTypes = [(x, ty!(Int))].into_iter().collect();
    let config = CheckConfig {
        prune_literal_candidates: false,
        ..CheckConfig::default()
    };
    let result =
        check_module_with_imports(&module, &declared, &ImportedModules::default(), &config);
    assert_eq!(codes(&result), vec![ErrorCode::IncompatibleTypes]);
}

// ==============================================================================
// Caching and results
// ==============================================================================

#[test]
fn evaluation_is_idempotent() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let good = binary(&mut b, "1", ArithBinOp::Add, "2");
    b.constant(root, "GOOD", good);
    let bad = binary(&mut b, "1", ArithBinOp::Div, "0");
    b.constant(root, "BAD", bad);
    let module = b.finish();

    let declared = DeclaredTypes::default();
    let imports = ImportedModules::default();
    let config = CheckConfig::default();
    let mut checker = ConstChecker::new(&module, &declared, &imports, &config);
    checker.resolve_all();
    let reported = checker.diagnostics().len();

    let frame = Frame {
        expected: None,
        scope: root,
    };
    let first = (checker.evaluate(good, &frame), checker.evaluate(bad, &frame));
    let second = (checker.evaluate(good, &frame), checker.evaluate(bad, &frame));
    assert_eq!(first, second);
    assert_eq!(first.0, ty!(int = 3));
    assert!(first.1.is_error());
    assert_eq!(checker.diagnostics().len(), reported);
}

#[test]
fn values_render() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let sum = binary(&mut b, "1", ArithBinOp::Add, "2");
    let a = b.constant(root, "A", sum);
    let list = int_list(&mut b, &["1", "2"]);
    let l = b.constant(root, "L", list);
    let rec = record_ab(&mut b);
    let r = b.constant(root, "R", rec);
    let module = b.finish();

    let declared: DeclaredTypes = [(l, ty!([Byte]))].into_iter().collect();
    let result = check_module(&module, &declared);

    let rendered: String = [("A", a), ("L", l), ("R", r)]
        .iter()
        .map(|(name, id)| format!("{name} = {}\n", result.values[id]))
        .collect();
    assert_eq!(
        rendered,
        indoc! {"
            A = 3
            L = [1, 2]
            R = { a: 1, b: 2 }
        "}
    );
    assert_eq!(
        result.values[&l],
        ConstantValue::List(vec![ConstantValue::Byte(1), ConstantValue::Byte(2)])
    );
}

#[test]
fn byte_constants_keep_their_tag_in_operands() {
    let mut b = ModuleBuilder::new();
    let root = b.root_scope();
    let sum = binary(&mut b, "1", ArithBinOp::Add, "2");
    let x = b.constant(root, "X", sum);
    let module = b.finish();

    let declared: DeclaredTypes = [(x, ty!(Byte))].into_iter().collect();
    let result = check_module(&module, &declared);
    assert_eq!(result.const_type(x), Some(&ty!(byte = 3)));
    assert_eq!(result.expr_type(sum), Some(&ty!(byte = 3)));
    assert_eq!(
        result.op_signatures[&sum].ret,
        TyRef::from(PrimitiveTy::Byte)
    );
}
