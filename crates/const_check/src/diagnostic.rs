// ==============================================================================
// Constant-evaluation diagnostics
// ==============================================================================
//
// Every report is keyed by the expression it is about. `ConstErrorKind` is the
// detailed, display-ready error; `ErrorCode` is the coarse taxonomy callers
// match on.

use std::fmt;

use lang_ast::ExprId;
use lang_ty::TyRef;
use miette::Diagnostic;
use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotAConstantExpression,
    UndefinedSymbol,
    UndefinedModule,
    IncompatibleTypes,
    InvalidConstExpression,
    AmbiguousType,
    OutOfRange,
    DuplicateKey,
    InvalidListConstructorElementType,
}

/// `did you mean ...` attached to unresolved names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidYouMean(pub SmolStr);

impl fmt::Display for DidYouMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did you mean `{}`?", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConstErrorKind {
    #[error("`{name}` is not a constant")]
    #[diagnostic(code(const_eval::not_a_constant))]
    NotAConstant { name: SmolStr },

    #[error("{syntax} is not allowed in a constant expression")]
    #[diagnostic(code(const_eval::unsupported_syntax))]
    UnsupportedSyntax { syntax: SmolStr },

    #[error("`{name}` refers to itself while it is being resolved")]
    #[diagnostic(code(const_eval::self_reference))]
    SelfReference { name: SmolStr },

    #[error("resolving `{name}` nests deeper than {limit} constants")]
    #[diagnostic(code(const_eval::resolution_too_deep))]
    ResolutionTooDeep { name: SmolStr, limit: usize },

    #[error("constants form a cycle: {}", .names.join(" -> "))]
    #[diagnostic(code(const_eval::constant_cycle))]
    ConstantCycle { names: Vec<SmolStr> },

    #[error("undefined symbol `{name}`")]
    #[diagnostic(code(const_eval::undefined_symbol))]
    UndefinedSymbol {
        name: SmolStr,
        #[help]
        suggestion: Option<DidYouMean>,
    },

    #[error("undefined module `{alias}`")]
    #[diagnostic(code(const_eval::undefined_module))]
    UndefinedModule { alias: SmolStr },

    #[error("incompatible types: expected `{expected}`, found `{found}`")]
    #[diagnostic(code(const_eval::incompatible_types))]
    IncompatibleTypes { expected: TyRef, found: TyRef },

    #[error("spread operand must be a {expected}, found `{found}`")]
    #[diagnostic(code(const_eval::spread_mismatch))]
    SpreadMismatch {
        expected: &'static str,
        found: TyRef,
    },

    #[error("operator `{op}` is not defined for {}", operands_list(.operands))]
    #[diagnostic(code(const_eval::invalid_operands))]
    InvalidOperands { op: SmolStr, operands: Vec<TyRef> },

    #[error("`{op}` cannot be evaluated at compile time for {}", operands_list(.operands))]
    #[diagnostic(code(const_eval::fold_failed))]
    FoldFailed { op: SmolStr, operands: Vec<TyRef> },

    #[error("ambiguous type: `{candidates}` could be any of its members")]
    #[diagnostic(code(const_eval::ambiguous_type))]
    AmbiguousType { candidates: TyRef },

    #[error("`{text}` is out of range for every numeric type it could be")]
    #[diagnostic(code(const_eval::out_of_range))]
    OutOfRange { text: SmolStr },

    #[error("duplicate key `{key}`")]
    #[diagnostic(code(const_eval::duplicate_key))]
    DuplicateKey { key: SmolStr },

    #[error("cannot fill missing members of type `{ty}`: it has no default value")]
    #[diagnostic(code(const_eval::invalid_list_constructor_element_type))]
    InvalidListConstructorElementType { ty: TyRef },
}

fn operands_list(operands: &[TyRef]) -> String {
    operands
        .iter()
        .map(|ty| format!("`{ty}`"))
        .collect::<Vec<_>>()
        .join(" and ")
}

impl ConstErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConstErrorKind::NotAConstant { .. }
            | ConstErrorKind::UnsupportedSyntax { .. }
            | ConstErrorKind::SelfReference { .. }
            | ConstErrorKind::ResolutionTooDeep { .. }
            | ConstErrorKind::ConstantCycle { .. } => ErrorCode::NotAConstantExpression,
            ConstErrorKind::UndefinedSymbol { .. } => ErrorCode::UndefinedSymbol,
            ConstErrorKind::UndefinedModule { .. } => ErrorCode::UndefinedModule,
            ConstErrorKind::IncompatibleTypes { .. } | ConstErrorKind::SpreadMismatch { .. } => {
                ErrorCode::IncompatibleTypes
            }
            ConstErrorKind::InvalidOperands { .. } | ConstErrorKind::FoldFailed { .. } => {
                ErrorCode::InvalidConstExpression
            }
            ConstErrorKind::AmbiguousType { .. } => ErrorCode::AmbiguousType,
            ConstErrorKind::OutOfRange { .. } => ErrorCode::OutOfRange,
            ConstErrorKind::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            ConstErrorKind::InvalidListConstructorElementType { .. } => {
                ErrorCode::InvalidListConstructorElementType
            }
        }
    }
}

/// A diagnostic paired with the expression where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDiagnostic {
    pub at_expr: ExprId,
    pub severity: Severity,
    pub kind: ConstErrorKind,
}

impl ConstDiagnostic {
    pub fn error(at_expr: ExprId, kind: ConstErrorKind) -> Self {
        Self {
            at_expr,
            severity: Severity::Error,
            kind,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

impl fmt::Display for ConstDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}", self.kind)
    }
}

// ==============================================================================
// Diagnostics sink
// ==============================================================================

/// Collects reports in emission order. Speculative checks run between
/// `mute()` and `unmute()`; anything emitted meanwhile is dropped. Muting
/// nests.
#[derive(Debug, Default)]
pub struct Diagnostics {
    collected: Vec<ConstDiagnostic>,
    muted: u32,
}

impl Diagnostics {
    pub fn emit(&mut self, diag: ConstDiagnostic) {
        if self.muted > 0 {
            log::trace!("dropping muted diagnostic: {diag}");
            return;
        }
        self.collected.push(diag);
    }

    pub fn mute(&mut self) {
        self.muted += 1;
    }

    pub fn unmute(&mut self) {
        debug_assert!(self.muted > 0, "unmute without matching mute");
        self.muted = self.muted.saturating_sub(1);
    }

    pub fn is_muted(&self) -> bool {
        self.muted > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstDiagnostic> {
        self.collected.iter()
    }

    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }

    pub fn into_vec(self) -> Vec<ConstDiagnostic> {
        self.collected
    }
}

// ==============================================================================
// Edit Distance (Levenshtein)
// ==============================================================================

pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j] + cost)
                .min(prev_row[j + 1] + 1)
                .min(curr_row[j] + 1);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Closest candidate to `needle`, if any is close enough to be a plausible
/// typo: within half the needle's length, at most 3 edits, never an exact match.
pub fn suggest_similar<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a SmolStr>,
) -> Option<SmolStr> {
    let max_dist = needle.chars().count().div_ceil(2).clamp(1, 3);

    candidates
        .into_iter()
        .map(|candidate| (candidate, edit_distance(needle, candidate)))
        .filter(|&(_, dist)| dist != 0 && dist <= max_dist)
        // first of the closest keeps results stable for equal distances
        .fold(None::<(&SmolStr, usize)>, |best, (cand, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((cand, dist)),
        })
        .map(|(name, _)| name.clone())
}
