use smol_str::SmolStr;

use crate::{
    group_consts, ArithBinOp, Binding, ConstDependencies, Expr, ListItem, ModuleBuilder,
    RecordField, RecordKey, ResolveResult,
};

#[test]
fn resolve_walks_outwards() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();
    let inner = builder.child_scope(root);

    let one = builder.int("1");
    let a = builder.constant(root, "A", one);
    builder.variable(inner, "x");
    let module = builder.finish();

    assert_eq!(
        module.scopes.resolve(inner, "A"),
        ResolveResult::Binding(Binding::Constant(a))
    );
    assert_eq!(
        module.scopes.resolve(inner, "x"),
        ResolveResult::Binding(Binding::Variable)
    );
    // not visible from the outer scope
    assert_eq!(module.scopes.resolve(root, "x"), ResolveResult::NotFound);
    assert_eq!(module.scopes.resolve(root, "_"), ResolveResult::Wildcard);
}

#[test]
fn inner_definition_shadows_outer() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();
    let inner = builder.child_scope(root);

    let one = builder.int("1");
    builder.constant(root, "A", one);
    builder.function(inner, "A");
    let module = builder.finish();

    assert_eq!(
        module.scopes.resolve(inner, "A"),
        ResolveResult::Binding(Binding::Function)
    );
}

#[test]
fn visible_names_include_all_ancestors() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();
    let inner = builder.child_scope(root);
    let one = builder.int("1");
    builder.constant(root, "LIMIT", one);
    builder.variable(inner, "count");
    let module = builder.finish();

    let mut names: Vec<SmolStr> = module.scopes.visible_names(inner).cloned().collect();
    names.sort();
    assert_eq!(names, vec![SmolStr::from("LIMIT"), SmolStr::from("count")]);
}

#[test]
fn dependencies_follow_nested_references() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();

    let one = builder.int("1");
    let a = builder.constant(root, "A", one);

    // B = [A, ...T, { k: A + 1, [K]: 2 }]
    let a_ref = builder.reference("A");
    let t_ref = builder.reference("T");
    let a_ref2 = builder.reference("A");
    let two = builder.int("2");
    let sum = builder.bin_op(a_ref2, ArithBinOp::Add, two);
    let k_ref = builder.reference("K");
    let two_again = builder.int("2");
    let rec = builder.record([
        RecordField::KeyValue {
            key: RecordKey::Name("k".into()),
            value: sum,
        },
        RecordField::KeyValue {
            key: RecordKey::Computed(k_ref),
            value: two_again,
        },
    ]);
    let list = builder.list([ListItem::Expr(a_ref), ListItem::Spread(t_ref), ListItem::Expr(rec)]);
    let b = builder.constant(root, "B", list);

    let empty = builder.list([]);
    let t = builder.constant(root, "T", empty);
    let key = builder.string("key");
    let k = builder.constant(root, "K", key);
    let module = builder.finish();

    let deps = ConstDependencies::new(&module);
    assert!(deps.depends_on(b, a));
    assert!(deps.depends_on(b, t));
    assert!(deps.depends_on(b, k));
    assert!(!deps.depends_on(a, b));
}

#[test]
fn qualified_references_are_not_local_dependencies() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();
    let other = builder.qualified("lib", "A");
    builder.constant(root, "A", other);
    let module = builder.finish();

    assert!(ConstDependencies::new(&module).edges.is_empty());
}

#[test]
fn groups_come_dependencies_first() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();

    let c_ref = builder.reference("C");
    let a = builder.constant(root, "A", c_ref);
    let one = builder.int("1");
    let c = builder.constant(root, "C", one);
    let module = builder.finish();

    let groups = group_consts(&module);
    let order: Vec<_> = groups.iter().flat_map(|g| g.members.clone()).collect();
    assert_eq!(order, vec![c, a]);
    assert!(groups.iter().all(|g| !g.cyclic));
}

#[test]
fn cycles_form_one_group() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();

    let b_ref = builder.reference("B");
    let a = builder.constant(root, "A", b_ref);
    let a_ref = builder.reference("A");
    let b = builder.constant(root, "B", a_ref);
    let module = builder.finish();

    let groups = group_consts(&module);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![a, b]);
    assert!(groups[0].cyclic);
}

#[test]
fn self_reference_is_cyclic() {
    let mut builder = ModuleBuilder::new();
    let root = builder.root_scope();
    let me = builder.reference("SELF");
    let one = builder.int("1");
    let sum = builder.bin_op(me, ArithBinOp::Add, one);
    builder.constant(root, "SELF", sum);
    let module = builder.finish();

    let groups = group_consts(&module);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].cyclic);
}

#[test]
fn walk_child_exprs_visits_operands() {
    let mut builder = ModuleBuilder::new();
    let lhs = builder.int("1");
    let rhs = builder.int("2");
    let sum = builder.bin_op(lhs, ArithBinOp::Add, rhs);
    let module = builder.finish();

    let mut seen = Vec::new();
    module[sum].walk_child_exprs(|e| seen.push(e));
    assert_eq!(seen, vec![lhs, rhs]);
    assert!(matches!(module[lhs], Expr::Literal(_)));
}
