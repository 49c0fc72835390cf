use crate::{is_assignable, ty, FieldTy, RecordTy, Singleton, Ty, TyRef};

macro_rules! assignable {
    ($name:ident, $src:tt => $tgt:tt) => {
        #[test]
        fn $name() {
            let (src, tgt) = (ty!($src), ty!($tgt));
            assert!(is_assignable(&src, &tgt), "{src} should be assignable to {tgt}");
        }
    };
}

macro_rules! not_assignable {
    ($name:ident, $src:tt => $tgt:tt) => {
        #[test]
        fn $name() {
            let (src, tgt) = (ty!($src), ty!($tgt));
            assert!(!is_assignable(&src, &tgt), "{src} should not be assignable to {tgt}");
        }
    };
}

assignable!(same_primitive, Int => Int);
assignable!(byte_to_int, Byte => Int);
not_assignable!(int_to_byte, Int => Byte);
assignable!(small_int_literal_to_byte, (int = 200) => Byte);
not_assignable!(large_int_literal_to_byte, (int = 300) => Byte);
not_assignable!(negative_int_literal_to_byte, (int = -1) => Byte);
assignable!(literal_to_union_member, (string = "a") => (Int | String));
not_assignable!(float_literal_to_int, (float = 1.0) => Int);
assignable!(literal_to_equal_finite, (int = 3) => ((int = 1) | (int = 3)));
not_assignable!(literal_to_other_finite, (int = 2) => ((int = 1) | (int = 3)));
assignable!(union_all_members, ((int = 1) | (int = 2)) => Int);
not_assignable!(union_one_member_off, ((int = 1) | (string = "x")) => Int);
assignable!(anything_to_anydata, (tuple [Int, String]) => Anydata);
assignable!(json_to_anydata, Json => Anydata);
not_assignable!(table_not_json, Table => Json);
assignable!(nested_to_json, ([(map<Int>)]) => Json);
assignable!(nil_literal_to_nilable, Nil => (Int | Nil));

assignable!(tuple_to_closed_array, (tuple [Int, Int]) => [Int; 2]);
not_assignable!(tuple_to_wrong_closed_array, (tuple [Int, Int]) => [Int; 3]);
assignable!(tuple_to_open_array, (tuple [Byte, Int]) => [Int]);
assignable!(tuple_into_rest, (tuple [Int, String, String]) => (tuple [Int; String]));
not_assignable!(tuple_too_long, (tuple [Int, String]) => (tuple [Int]));
not_assignable!(tuple_too_short, (tuple [Int]) => (tuple [Int, Int]));

assignable!(sealed_record_to_same, { "a": Int } => { "a": Int });
not_assignable!(extra_field_into_sealed, { "a": Int, "b": Int } => { "a": Int });
assignable!(extra_field_into_rest, { "a": Int, "b": Int } => { "a": Int; Int });
not_assignable!(extra_field_wrong_rest, { "a": Int, "b": String } => { "a": Int; Int });
assignable!(extra_field_into_unconstrained, { "a": Int, "b": String } => { "a": Int; .. });
not_assignable!(missing_required_field, { "b": Int } => { "a": Int; .. });
assignable!(sealed_record_to_map, { "a": Int, "b": Byte } => (map<Int>));
not_assignable!(open_record_to_map, { "a": Int; .. } => (map<Int>));

#[test]
fn optional_target_field_may_be_absent() {
    let target: TyRef = Ty::Record(RecordTy::open(
        [("a".into(), FieldTy::optional(ty!(Int)))],
        None,
    ))
    .into();
    assert!(is_assignable(&ty!({}), &target));
}

#[test]
fn error_never_cascades() {
    assert!(is_assignable(&ty!(Error), &ty!(Int)));
    assert!(is_assignable(&ty!(String), &ty!(Error)));
}

#[test]
fn aliases_are_transparent() {
    let alias: TyRef = Ty::Reference {
        name: "Small".into(),
        referred: ty!(Byte),
    }
    .into();
    assert!(is_assignable(&ty!(int = 7), &alias));
    assert!(is_assignable(&alias, &ty!(Int)));
}

#[test]
fn union_flattens_and_dedups() {
    let inner = ty!(Int | String);
    let union = TyRef::union([ty!(Nil), inner, ty!(Int)]);
    assert_eq!(union, TyRef::from(Ty::Union(vec![ty!(Nil), ty!(Int), ty!(String)])));
}

#[test]
fn union_of_one_is_the_member() {
    assert_eq!(TyRef::union([ty!(Int), ty!(Int)]), ty!(Int));
    assert!(TyRef::union([]).is_error());
}

#[test]
fn byte_singleton_only_in_range() {
    assert!(Singleton::byte(255).is_some());
    assert!(Singleton::byte(256).is_none());
    let byte = Singleton::byte(5).unwrap();
    assert!(byte.same_value(&Singleton::int(5)));
}

#[test]
fn display_in_source_syntax() {
    let cases = [
        (ty!([Int; 3]), "int[3]"),
        (ty!([(Int | String)]), "(int|string)[]"),
        (ty!([Byte; *]), "byte[*]"),
        (ty!(tuple [Int, String; Boolean]), "[int, string, boolean...]"),
        (ty!({ "a": Int }), "{| a: int; |}"),
        (ty!({ "a": Int; Anydata }), "{ a: int; anydata...; }"),
        (ty!(map<Decimal>), "map<decimal>"),
        (ty!((int = 1) | (string = "x") | Nil), "1|\"x\"|()"),
        (ty!(decimal = "0.3"), "0.3d"),
        (ty!(float = 2.5), "2.5"),
    ];
    for (ty, expected) in cases {
        assert_eq!(ty.to_string(), expected);
    }
}
