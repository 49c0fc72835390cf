// ==============================================================================
// Compile-time constant checking
// ==============================================================================
//
// Resolves every constant of a module to a concrete type and value. A
// constant goes through three steps:
//
//   1. `evaluate` infers a candidate type bottom-up. Numeric literals may
//      stay ambiguous here (`1` is `1|1.0|1d` until context decides).
//   2. `valid_type` matches the candidate against the declared type, or
//      `narrowed_type` picks a reading when nothing is declared.
//   3. `resolve_expr` pushes the final type back down the tree so every
//      sub-expression commits to one reading.

pub mod arith;
pub mod config;
pub mod diagnostic;
mod eval;
mod fill;
pub mod literal;
pub mod narrow;
pub mod operators;
mod resolve;
mod validate;
pub mod value;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod pbt;

use lang_ast::{group_consts, ConstId, ExprId, Module, ScopeId};
use lang_ty::TyRef;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

pub use arith::{fold_binary, fold_unary};
pub use config::CheckConfig;
pub use diagnostic::{ConstDiagnostic, ConstErrorKind, Diagnostics, ErrorCode, Severity};
pub use literal::{literal_type, LiteralError};
pub use narrow::narrowed_type;
pub use validate::NarrowError;
pub use value::{constant_value, ConstantValue};

/// Declared types of the constants that have one.
pub type DeclaredTypes = FxHashMap<ConstId, TyRef>;

/// What another module exports under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedSymbol {
    /// An already resolved constant.
    Constant(TyRef),
    NonConstant,
}

/// Imported modules by alias, each a map of exported names.
pub type ImportedModules = FxHashMap<SmolStr, FxHashMap<SmolStr, ImportedSymbol>>;

/// The context an expression is evaluated in. Frames are values: a nested
/// evaluation gets its own frame and the caller's stays untouched.
#[derive(Debug, Clone)]
pub struct Frame {
    pub expected: Option<TyRef>,
    pub scope: ScopeId,
}

impl Frame {
    pub fn with_expected(&self, expected: Option<TyRef>) -> Frame {
        Frame {
            expected,
            scope: self.scope,
        }
    }
}

/// Parameter and return types an operator node was typed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSignature {
    pub params: Vec<TyRef>,
    pub ret: TyRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConstState {
    Resolving,
    Resolved(TyRef),
}

#[derive(Debug)]
pub struct CheckResult {
    pub const_types: FxHashMap<ConstId, TyRef>,
    pub expr_types: FxHashMap<ExprId, TyRef>,
    pub op_signatures: FxHashMap<ExprId, OpSignature>,
    pub values: FxHashMap<ConstId, ConstantValue>,
    pub diagnostics: Vec<ConstDiagnostic>,
}

impl CheckResult {
    pub fn const_type(&self, id: ConstId) -> Option<&TyRef> {
        self.const_types.get(&id)
    }

    pub fn expr_type(&self, id: ExprId) -> Option<&TyRef> {
        self.expr_types.get(&id)
    }
}

pub fn check_module(module: &Module, declared: &DeclaredTypes) -> CheckResult {
    check_module_with_imports(
        module,
        declared,
        &ImportedModules::default(),
        &CheckConfig::default(),
    )
}

pub fn check_module_with_imports(
    module: &Module,
    declared: &DeclaredTypes,
    imports: &ImportedModules,
    config: &CheckConfig,
) -> CheckResult {
    let mut checker = ConstChecker::new(module, declared, imports, config);
    checker.resolve_all();
    checker.finish()
}

pub struct ConstChecker<'a> {
    module: &'a Module,
    declared: &'a DeclaredTypes,
    imports: &'a ImportedModules,
    config: &'a CheckConfig,

    states: FxHashMap<ConstId, ConstState>,
    expr_types: FxHashMap<ExprId, TyRef>,
    op_signatures: FxHashMap<ExprId, OpSignature>,
    values: FxHashMap<ConstId, ConstantValue>,
    diagnostics: Diagnostics,

    /// Nesting of on-demand resolutions.
    depth: usize,
    /// Where validation and fill reports go: the value of the constant
    /// currently being validated.
    anchor: Option<ExprId>,
}

impl<'a> ConstChecker<'a> {
    pub fn new(
        module: &'a Module,
        declared: &'a DeclaredTypes,
        imports: &'a ImportedModules,
        config: &'a CheckConfig,
    ) -> Self {
        Self {
            module,
            declared,
            imports,
            config,
            states: FxHashMap::default(),
            expr_types: FxHashMap::default(),
            op_signatures: FxHashMap::default(),
            values: FxHashMap::default(),
            diagnostics: Diagnostics::default(),
            depth: 0,
            anchor: None,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn emit(&mut self, at_expr: ExprId, kind: ConstErrorKind) {
        self.diagnostics.emit(ConstDiagnostic::error(at_expr, kind));
    }

    /// Resolve every constant, dependencies first. Cycles are rejected as a
    /// whole before anything in them is evaluated.
    pub fn resolve_all(&mut self) {
        for group in group_consts(self.module) {
            if group.cyclic {
                self.reject_cycle(&group.members);
                continue;
            }
            for id in group.members {
                self.resolve_constant(id);
            }
        }
    }

    fn reject_cycle(&mut self, members: &[ConstId]) {
        // already seen through on-demand resolution
        if members.iter().any(|id| self.states.contains_key(id)) {
            return;
        }
        let names: Vec<SmolStr> = members.iter().map(|id| self.module[*id].name.clone()).collect();
        log::warn!("rejecting constant cycle: {}", names.join(" -> "));

        for id in members {
            self.states.insert(*id, ConstState::Resolved(TyRef::error()));
        }
        if let Some(first) = members.first() {
            let at = self.module[*first].value;
            self.emit(at, ConstErrorKind::ConstantCycle { names });
        }
    }

    /// Resolve one constant (and, on demand, whatever it references) and
    /// return its final type. Resolving twice returns the first result.
    pub fn resolve_constant(&mut self, id: ConstId) -> TyRef {
        match self.states.get(&id) {
            Some(ConstState::Resolved(ty)) => return ty.clone(),
            Some(ConstState::Resolving) => return TyRef::error(),
            None => {}
        }

        let module = self.module;
        let decl = &module[id];
        log::debug!("resolving constant `{}`", decl.name);
        self.states.insert(id, ConstState::Resolving);

        let declared = self.declared.get(&id).cloned();
        let frame = Frame {
            expected: declared.clone(),
            scope: decl.scope,
        };
        let inferred = self.evaluate(decl.value, &frame);
        let ty = self.finalize(decl.value, declared.as_ref(), &inferred);

        if let Some(value) = constant_value(&ty) {
            self.values.insert(id, value);
        } else if !ty.is_error() {
            log::debug!("constant `{}` has type `{ty}` but no single value", decl.name);
        }
        log::debug!("resolved constant `{}`: {ty}", decl.name);
        self.states.insert(id, ConstState::Resolved(ty.clone()));
        ty
    }

    /// Validate or narrow the inferred type, then commit it down the tree.
    fn finalize(&mut self, value: ExprId, declared: Option<&TyRef>, inferred: &TyRef) -> TyRef {
        if inferred.is_error() {
            return TyRef::error();
        }

        let ty = match declared {
            Some(expected) => {
                let outer_anchor = self.anchor.replace(value);
                let result = self.valid_type(expected, inferred);
                self.anchor = outer_anchor;
                match result {
                    Ok(ty) => ty,
                    Err(NarrowError::Mismatch) => {
                        self.emit(
                            value,
                            ConstErrorKind::IncompatibleTypes {
                                expected: expected.clone(),
                                found: inferred.clone(),
                            },
                        );
                        return TyRef::error();
                    }
                    Err(NarrowError::Reported) => return TyRef::error(),
                }
            }
            None => narrowed_type(inferred),
        };

        if !ty.is_error() {
            self.resolve_expr(value, &ty);
        }
        ty
    }

    pub fn finish(self) -> CheckResult {
        let const_types = self
            .states
            .into_iter()
            .filter_map(|(id, state)| match state {
                ConstState::Resolved(ty) => Some((id, ty)),
                ConstState::Resolving => None,
            })
            .collect();

        CheckResult {
            const_types,
            expr_types: self.expr_types,
            op_signatures: self.op_signatures,
            values: self.values,
            diagnostics: self.diagnostics.into_vec(),
        }
    }
}
