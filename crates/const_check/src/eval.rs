// ==============================================================================
// Constant expression evaluator
// ==============================================================================

use std::collections::BTreeMap;

use itertools::Itertools;
use lang_ast::{
    nameres::var_name_field_name, BinOp, Binding, ConstId, Expr, ExprId, ListItem, RecordField,
    RecordKey, ResolveResult, UnaryOp,
};
use lang_ty::{PrimitiveTy, RecordTy, Scalar, Singleton, TupleTy, Ty, TyRef};
use smol_str::SmolStr;

use crate::{
    arith::{fold_binary, fold_unary},
    diagnostic::{suggest_similar, ConstErrorKind, DidYouMean},
    literal::{literal_type, LiteralError},
    operators::{resolve_binary, resolve_unary},
    ConstChecker, ConstState, Frame, ImportedSymbol, OpSignature,
};

impl ConstChecker<'_> {
    /// Infer the type of `expr` in `frame`. Never fails: problems are
    /// reported and the expression is typed as the error sentinel. The
    /// first evaluation of a node is cached, later ones return it.
    pub fn evaluate(&mut self, expr: ExprId, frame: &Frame) -> TyRef {
        if let Some(ty) = self.expr_types.get(&expr) {
            return ty.clone();
        }
        let ty = self.evaluate_uncached(expr, frame);
        self.expr_types.insert(expr, ty.clone());
        ty
    }

    fn evaluate_uncached(&mut self, expr: ExprId, frame: &Frame) -> TyRef {
        let module = self.module;
        match &module[expr] {
            Expr::Missing => TyRef::error(),
            Expr::Literal(lit) => match literal_type(lit, frame.expected.as_ref(), self.config) {
                Ok(ty) => ty,
                Err(LiteralError::OutOfRange { text }) => {
                    self.emit(expr, ConstErrorKind::OutOfRange { text });
                    TyRef::error()
                }
            },
            Expr::Reference {
                module: None,
                name,
            } => self.evaluate_local_reference(expr, name, frame),
            Expr::Reference {
                module: Some(alias),
                name,
            } => self.evaluate_imported_reference(expr, alias, name),
            Expr::List(items) => self.evaluate_list(expr, items, frame),
            Expr::Record(fields) => self.evaluate_record(fields, frame),
            Expr::BinOp { lhs, rhs, op } => self.evaluate_binary(expr, *lhs, *rhs, *op, frame),
            Expr::UnaryOp { op, expr: operand } => self.evaluate_unary(expr, *op, *operand, frame),
            Expr::Group(inner) => self.evaluate(*inner, frame),
            Expr::Unsupported { syntax } => {
                self.emit(
                    expr,
                    ConstErrorKind::UnsupportedSyntax {
                        syntax: syntax.clone(),
                    },
                );
                TyRef::error()
            }
        }
    }

    // ==========================================================================
    // References
    // ==========================================================================

    fn evaluate_local_reference(&mut self, expr: ExprId, name: &SmolStr, frame: &Frame) -> TyRef {
        let module = self.module;
        match module.scopes.resolve(frame.scope, name) {
            ResolveResult::Binding(Binding::Constant(id)) => self.reference_constant(expr, id),
            ResolveResult::Binding(Binding::Variable | Binding::Function) => {
                self.emit(expr, ConstErrorKind::NotAConstant { name: name.clone() });
                TyRef::error()
            }
            // `_` matches anything and binds nothing
            ResolveResult::Wildcard => Ty::Anydata.into(),
            ResolveResult::NotFound => {
                let suggestion =
                    suggest_similar(name, module.scopes.visible_names(frame.scope)).map(DidYouMean);
                self.emit(
                    expr,
                    ConstErrorKind::UndefinedSymbol {
                        name: name.clone(),
                        suggestion,
                    },
                );
                TyRef::error()
            }
        }
    }

    /// The type of another constant of this module, resolving it first if
    /// nothing has asked for it yet.
    fn reference_constant(&mut self, expr: ExprId, id: ConstId) -> TyRef {
        match self.states.get(&id) {
            Some(ConstState::Resolved(ty)) => ty.clone(),
            Some(ConstState::Resolving) => {
                let name = self.module[id].name.clone();
                self.emit(expr, ConstErrorKind::SelfReference { name });
                TyRef::error()
            }
            None if self.depth >= self.config.max_resolution_depth => {
                let name = self.module[id].name.clone();
                let limit = self.config.max_resolution_depth;
                self.emit(expr, ConstErrorKind::ResolutionTooDeep { name, limit });
                TyRef::error()
            }
            None => {
                self.depth += 1;
                let ty = self.resolve_constant(id);
                self.depth -= 1;
                ty
            }
        }
    }

    fn evaluate_imported_reference(&mut self, expr: ExprId, alias: &SmolStr, name: &SmolStr) -> TyRef {
        let imports = self.imports;
        let Some(exports) = imports.get(alias) else {
            self.emit(
                expr,
                ConstErrorKind::UndefinedModule {
                    alias: alias.clone(),
                },
            );
            return TyRef::error();
        };
        match exports.get(name) {
            Some(ImportedSymbol::Constant(ty)) => ty.clone(),
            Some(ImportedSymbol::NonConstant) => {
                self.emit(expr, ConstErrorKind::NotAConstant { name: name.clone() });
                TyRef::error()
            }
            None => {
                let suggestion = suggest_similar(name, exports.keys()).map(DidYouMean);
                self.emit(
                    expr,
                    ConstErrorKind::UndefinedSymbol {
                        name: name.clone(),
                        suggestion,
                    },
                );
                TyRef::error()
            }
        }
    }

    // ==========================================================================
    // Constructors
    // ==========================================================================

    /// Members are evaluated in the list's own frame; spread operands have no
    /// expected type since only their members are.
    fn evaluate_list(&mut self, expr: ExprId, items: &[ListItem], frame: &Frame) -> TyRef {
        let mut members = Vec::with_capacity(items.len());
        let mut failed = false;

        for item in items {
            match item {
                ListItem::Expr(member) => {
                    let ty = self.evaluate(*member, frame);
                    failed |= ty.is_error();
                    members.push(ty);
                }
                ListItem::Spread(operand) => {
                    let ty = self.evaluate(*operand, &frame.with_expected(None));
                    if ty.is_error() {
                        failed = true;
                        continue;
                    }
                    match ty.effective().as_tuple() {
                        Some(tuple) if tuple.rest.is_none() => {
                            members.extend(tuple.members.iter().cloned());
                        }
                        _ => {
                            self.emit(
                                *operand,
                                ConstErrorKind::SpreadMismatch {
                                    expected: "tuple",
                                    found: ty,
                                },
                            );
                            failed = true;
                        }
                    }
                }
            }
        }

        if failed {
            log::trace!("list {expr:?} has erroneous members");
            return TyRef::error();
        }
        Ty::Tuple(TupleTy::new(members)).into()
    }

    /// Computed keys go last: they may overwrite a field placed by name, but
    /// two fields placed by name may not collide.
    fn evaluate_record(&mut self, fields: &[RecordField], frame: &Frame) -> TyRef {
        let module = self.module;
        let mut placed: BTreeMap<SmolStr, TyRef> = BTreeMap::new();
        let mut computed = Vec::new();
        let mut failed = false;

        for field in fields {
            match field {
                RecordField::KeyValue {
                    key: RecordKey::Name(name),
                    value,
                } => {
                    let ty = self.evaluate(*value, frame);
                    failed |= !self.place_field(&mut placed, name, ty, *value);
                }
                RecordField::KeyValue {
                    key: RecordKey::Computed(key),
                    value,
                } => computed.push((*key, *value)),
                RecordField::VarName(reference) => {
                    let ty = self.evaluate(*reference, frame);
                    match var_name_field_name(module, field) {
                        Some(name) => failed |= !self.place_field(&mut placed, name, ty, *reference),
                        None => failed = true,
                    }
                }
                RecordField::Spread(operand) => {
                    let ty = self.evaluate(*operand, &frame.with_expected(None));
                    if ty.is_error() {
                        failed = true;
                        continue;
                    }
                    let Some(record) = ty.effective().as_record() else {
                        self.emit(
                            *operand,
                            ConstErrorKind::SpreadMismatch {
                                expected: "record",
                                found: ty.clone(),
                            },
                        );
                        failed = true;
                        continue;
                    };
                    for (name, spread_field) in &record.fields {
                        let ty = spread_field.ty.clone();
                        failed |= !self.place_field(&mut placed, name, ty, *operand);
                    }
                }
            }
        }

        for (key, value) in computed {
            let key_ty = self.evaluate(key, &frame.with_expected(None));
            let value_ty = self.evaluate(value, frame);
            if key_ty.is_error() || value_ty.is_error() {
                failed = true;
                continue;
            }
            match key_ty.effective().as_singleton().map(|s| &s.value) {
                Some(Scalar::String(name)) => {
                    placed.insert(name.clone(), value_ty);
                }
                _ => {
                    self.emit(
                        key,
                        ConstErrorKind::IncompatibleTypes {
                            expected: PrimitiveTy::String.into(),
                            found: key_ty.clone(),
                        },
                    );
                    failed = true;
                }
            }
        }

        if failed {
            return TyRef::error();
        }
        Ty::Record(RecordTy::sealed(placed)).into()
    }

    /// Returns false if the field could not be placed.
    fn place_field(
        &mut self,
        placed: &mut BTreeMap<SmolStr, TyRef>,
        name: &SmolStr,
        ty: TyRef,
        at: ExprId,
    ) -> bool {
        if ty.is_error() {
            return false;
        }
        if placed.contains_key(name) {
            self.emit(at, ConstErrorKind::DuplicateKey { key: name.clone() });
            return false;
        }
        placed.insert(name.clone(), ty);
        true
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    /// Every combination of operand readings is tried. Readings that take
    /// part in no valid combination are pruned from the operands, and each
    /// distinct result base contributes one folded value.
    fn evaluate_binary(
        &mut self,
        expr: ExprId,
        lhs: ExprId,
        rhs: ExprId,
        op: BinOp,
        frame: &Frame,
    ) -> TyRef {
        let lhs_ty = self.evaluate(lhs, frame);
        let rhs_ty = self.evaluate(rhs, frame);
        if lhs_ty.is_error() || rhs_ty.is_error() {
            return TyRef::error();
        }

        let invalid_operands = |lhs_ty: &TyRef, rhs_ty: &TyRef| ConstErrorKind::InvalidOperands {
            op: op.to_string().into(),
            operands: vec![lhs_ty.clone(), rhs_ty.clone()],
        };

        let (Some(lhs_members), Some(rhs_members)) =
            (singleton_members(&lhs_ty), singleton_members(&rhs_ty))
        else {
            self.emit(expr, invalid_operands(&lhs_ty, &rhs_ty));
            return TyRef::error();
        };

        // (lhs index, rhs index, result base) for every valid combination
        let viable: Vec<(usize, usize, PrimitiveTy)> = (0..lhs_members.len())
            .cartesian_product(0..rhs_members.len())
            .filter_map(|(l, r)| {
                resolve_binary(op, lhs_members[l].base, rhs_members[r].base).map(|res| (l, r, res))
            })
            .collect();

        if viable.is_empty() {
            self.emit(expr, invalid_operands(&lhs_ty, &rhs_ty));
            return TyRef::error();
        }

        let lhs_kept = self.prune_operand(lhs, &lhs_members, viable.iter().map(|v| v.0));
        let rhs_kept = self.prune_operand(rhs, &rhs_members, viable.iter().map(|v| v.1));

        let result_bases: Vec<PrimitiveTy> = viable.iter().map(|v| v.2).unique().collect();
        let mut folded = Vec::with_capacity(result_bases.len());
        for base in &result_bases {
            let Some(&(l, r, _)) = viable.iter().find(|v| v.2 == *base) else {
                continue;
            };
            match fold_binary(op, &lhs_members[l].value, &rhs_members[r].value, *base) {
                Some(value) => folded.push(TyRef::from(Singleton::new(value))),
                None => log::trace!("{op} does not fold for {} and {}", lhs_members[l], rhs_members[r]),
            }
        }

        self.op_signatures.insert(
            expr,
            OpSignature {
                params: vec![bases_of(&lhs_kept), bases_of(&rhs_kept)],
                ret: TyRef::union(result_bases.into_iter().map(TyRef::from)),
            },
        );

        if folded.is_empty() {
            self.emit(
                expr,
                ConstErrorKind::FoldFailed {
                    op: op.to_string().into(),
                    operands: vec![lhs_ty, rhs_ty],
                },
            );
            return TyRef::error();
        }
        TyRef::union(folded)
    }

    /// Keep only the operand readings at `used` indices, rewriting the
    /// operand's cached type if anything was dropped.
    fn prune_operand(
        &mut self,
        operand: ExprId,
        members: &[Singleton],
        used: impl Iterator<Item = usize>,
    ) -> Vec<Singleton> {
        let used: Vec<usize> = used.unique().sorted().collect();
        if used.len() == members.len() {
            return members.to_vec();
        }
        let kept: Vec<Singleton> = used.into_iter().map(|i| members[i].clone()).collect();
        let pruned = TyRef::union(kept.iter().cloned().map(TyRef::from));
        log::trace!(
            "pruned operand {operand:?} from {} to {pruned} readings",
            members.len()
        );
        self.expr_types.insert(operand, pruned);
        kept
    }

    fn evaluate_unary(&mut self, expr: ExprId, op: UnaryOp, operand: ExprId, frame: &Frame) -> TyRef {
        let operand_ty = self.evaluate(operand, frame);
        if operand_ty.is_error() {
            return TyRef::error();
        }

        let operands = || vec![operand_ty.clone()];
        let members = singleton_members(&operand_ty).unwrap_or_default();
        let applicable: Vec<(&Singleton, PrimitiveTy)> = members
            .iter()
            .filter_map(|m| resolve_unary(op, m.base).map(|res| (m, res)))
            .collect();

        if applicable.is_empty() {
            self.emit(
                expr,
                ConstErrorKind::InvalidOperands {
                    op: op.to_string().into(),
                    operands: operands(),
                },
            );
            return TyRef::error();
        }

        let folded: Vec<TyRef> = applicable
            .iter()
            .filter_map(|(m, _)| fold_unary(op, &m.value))
            .map(|value| TyRef::from(Singleton::new(value)))
            .collect();

        self.op_signatures.insert(
            expr,
            OpSignature {
                params: vec![bases_of(applicable.iter().map(|(m, _)| *m))],
                ret: TyRef::union(applicable.iter().map(|(_, res)| TyRef::from(*res))),
            },
        );

        if folded.is_empty() {
            self.emit(
                expr,
                ConstErrorKind::FoldFailed {
                    op: op.to_string().into(),
                    operands: operands(),
                },
            );
            return TyRef::error();
        }
        TyRef::union(folded)
    }
}

/// The singleton readings of an operand, or None if some reading is not a
/// single value (a list, a record, a broad imported type).
fn singleton_members(ty: &TyRef) -> Option<Vec<Singleton>> {
    ty.effective()
        .union_members()
        .iter()
        .map(|member| member.effective().as_singleton().cloned())
        .collect()
}

/// Union of the base types of some readings.
fn bases_of<'s>(members: impl IntoIterator<Item = &'s Singleton>) -> TyRef {
    TyRef::union(members.into_iter().map(|m| TyRef::from(m.base)))
}
