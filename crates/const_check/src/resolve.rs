// ==============================================================================
// Expression type resolver
// ==============================================================================
//
// Second pass over a constant's value once its final type is known. Every
// node whose type is still a union of readings commits to the reading the
// final type implies, and operator signatures are rewritten to the committed
// operand and result types.

use std::fmt;

use lang_ast::{nameres::var_name_field_name, Expr, ExprId, ListItem, RecordField, RecordKey};
use lang_ty::{is_assignable, PrimitiveTy, Scalar, Ty, TyRef};
use smol_str::SmolStr;

use crate::{narrow::narrowed_type, ConstChecker, OpSignature};

impl ConstChecker<'_> {
    pub fn resolve_expr(&mut self, expr: ExprId, ty: &TyRef) {
        let target = ty.effective().clone();
        if target.is_error() {
            return;
        }

        let module = self.module;
        match &module[expr] {
            Expr::Missing | Expr::Unsupported { .. } => {}
            Expr::Literal(_) | Expr::Reference { .. } => self.commit(expr, &target),
            Expr::List(items) => {
                let Some(tuple) = target.as_tuple() else {
                    invariant_violated(format_args!("list {expr:?} resolved against `{target}`"));
                    return;
                };
                let mut idx = 0;
                for item in items.iter() {
                    match item {
                        ListItem::Expr(member) => {
                            match tuple.member(idx) {
                                Some(member_ty) => self.resolve_expr(*member, member_ty),
                                None => invariant_violated(format_args!(
                                    "list {expr:?} has no member {idx} in `{target}`"
                                )),
                            }
                            idx += 1;
                        }
                        // spliced members were resolved with their own constant
                        ListItem::Spread(operand) => idx += self.spread_len(*operand),
                    }
                }
                self.expr_types.insert(expr, target.clone());
            }
            Expr::Record(fields) => {
                let Some(record) = target.as_record() else {
                    invariant_violated(format_args!("record {expr:?} resolved against `{target}`"));
                    return;
                };
                // computed keys win; what they overwrote keeps its own reading
                let overwritten: Vec<SmolStr> = fields
                    .iter()
                    .filter_map(|field| match field {
                        RecordField::KeyValue {
                            key: RecordKey::Computed(key),
                            ..
                        } => self.computed_key(*key),
                        _ => None,
                    })
                    .collect();

                for field in fields.iter() {
                    let computed = matches!(
                        field,
                        RecordField::KeyValue {
                            key: RecordKey::Computed(_),
                            ..
                        }
                    );
                    let (name, value) = match field {
                        RecordField::KeyValue {
                            key: RecordKey::Name(name),
                            value,
                        } => (Some(name.clone()), *value),
                        RecordField::KeyValue {
                            key: RecordKey::Computed(key),
                            value,
                        } => (self.computed_key(*key), *value),
                        RecordField::VarName(reference) => {
                            (var_name_field_name(module, field).cloned(), *reference)
                        }
                        RecordField::Spread(_) => continue,
                    };
                    if !computed && name.as_ref().is_some_and(|n| overwritten.contains(n)) {
                        if let Some(own) = self.expr_types.get(&value).map(narrowed_type) {
                            self.resolve_expr(value, &own);
                        }
                        continue;
                    }
                    match name.as_ref().and_then(|name| record.get(name)) {
                        Some(field_ty) => self.resolve_expr(value, &field_ty.ty),
                        None => invariant_violated(format_args!(
                            "record {expr:?} has no field {name:?} in `{target}`"
                        )),
                    }
                }
                self.expr_types.insert(expr, target.clone());
            }
            Expr::BinOp { lhs, rhs, .. } => {
                // every operator's operands share the result's domain
                self.resolve_expr(*lhs, &target);
                self.resolve_expr(*rhs, &target);
                self.commit(expr, &target);
                self.rewrite_signature(expr, &[*lhs, *rhs]);
            }
            Expr::UnaryOp { expr: operand, .. } => {
                self.resolve_expr(*operand, &target);
                self.commit(expr, &target);
                self.rewrite_signature(expr, &[*operand]);
            }
            Expr::Group(inner) => {
                self.resolve_expr(*inner, &target);
                self.commit(expr, &target);
            }
        }
    }

    /// Collapse the cached type of `expr` to the reading `target` implies:
    /// the member with the same base first, else the first assignable one.
    fn commit(&mut self, expr: ExprId, target: &TyRef) {
        let Some(current) = self.expr_types.get(&expr).cloned() else {
            return;
        };
        let resolved = match &*current {
            // same value under another tag, e.g. a byte
            Ty::Finite(_) => match (current.as_singleton(), target.as_singleton()) {
                (Some(have), Some(want)) if have.same_value(want) && have.base != want.base => {
                    target.clone()
                }
                _ => return,
            },
            Ty::Union(members) => {
                let by_tag = base_tag(target).and_then(|tag| {
                    members.iter().find(|m| {
                        m.as_singleton()
                            .is_some_and(|s| domain(s.base) == domain(tag))
                    })
                });
                match by_tag.or_else(|| members.iter().find(|m| is_assignable(m, target))) {
                    Some(member) => member.clone(),
                    None => {
                        invariant_violated(format_args!(
                            "no reading of `{current}` fits `{target}` at {expr:?}"
                        ));
                        return;
                    }
                }
            }
            _ => return,
        };
        self.expr_types.insert(expr, resolved);
    }

    fn rewrite_signature(&mut self, expr: ExprId, operands: &[ExprId]) {
        if !self.op_signatures.contains_key(&expr) {
            return;
        }
        let base = |checker: &Self, e: ExprId| {
            checker
                .expr_types
                .get(&e)
                .map_or_else(TyRef::error, base_type)
        };
        let signature = OpSignature {
            params: operands.iter().map(|e| base(self, *e)).collect(),
            ret: base(self, expr),
        };
        self.op_signatures.insert(expr, signature);
    }

    fn spread_len(&self, operand: ExprId) -> usize {
        self.expr_types
            .get(&operand)
            .and_then(|ty| ty.effective().as_tuple())
            .map_or(0, |tuple| tuple.members.len())
    }

    fn computed_key(&self, key: ExprId) -> Option<SmolStr> {
        let ty = self.expr_types.get(&key)?;
        match &ty.effective().as_singleton()?.value {
            Scalar::String(name) => Some(name.clone()),
            _ => None,
        }
    }
}

/// The primitive a target's reading is chosen by.
fn base_tag(target: &TyRef) -> Option<PrimitiveTy> {
    match &**target {
        Ty::Primitive(prim) => Some(*prim),
        Ty::Finite(values) => values.first().map(|v| v.base),
        _ => None,
    }
}

fn domain(prim: PrimitiveTy) -> PrimitiveTy {
    prim.numeric_kind().unwrap_or(prim)
}

/// A singleton's base as a type; anything else as is.
fn base_type(ty: &TyRef) -> TyRef {
    match ty.as_singleton() {
        Some(s) => s.base.into(),
        None => ty.clone(),
    }
}

fn invariant_violated(msg: fmt::Arguments<'_>) {
    log::error!("constant resolver invariant violated: {msg}");
    debug_assert!(false, "constant resolver invariant violated: {msg}");
}
