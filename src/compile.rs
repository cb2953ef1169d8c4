use crate::resolve::resolve;
use crate::types::CompiledExpr;
use crate::{ConditionError, Expr, Fragment, Predicate, SubjectSnapshot};

/// Bind every predicate call in `expr` to a known [`Predicate`].
pub(crate) fn bind(expr: &Expr) -> Result<CompiledExpr, ConditionError> {
    Ok(match expr {
        Expr::Predicate { name, args } => CompiledExpr::Predicate(Predicate::bind(name, args)?),
        Expr::And(a, b) => CompiledExpr::And(Box::new(bind(a)?), Box::new(bind(b)?)),
        Expr::Or(a, b) => CompiledExpr::Or(Box::new(bind(a)?), Box::new(bind(b)?)),
        Expr::Not(inner) => CompiledExpr::Not(Box::new(bind(inner)?)),
    })
}

/// Reduce a bound expression to a fragment, folding user-static predicates
/// into sentinels on the way up.
pub(crate) fn reduce(expr: &CompiledExpr, subject: &SubjectSnapshot) -> Fragment {
    match expr {
        CompiledExpr::Predicate(predicate) => resolve(predicate, subject),
        CompiledExpr::And(a, b) => match reduce(a, subject) {
            Fragment::AlwaysFalse => Fragment::AlwaysFalse,
            left => left.and(reduce(b, subject)),
        },
        CompiledExpr::Or(a, b) => match reduce(a, subject) {
            Fragment::AlwaysTrue => Fragment::AlwaysTrue,
            left => left.or(reduce(b, subject)),
        },
        CompiledExpr::Not(inner) => !reduce(inner, subject),
    }
}

/// Returns `true` if no predicate in `expr` depends on the document.
pub(crate) fn is_user_static(expr: &CompiledExpr) -> bool {
    match expr {
        CompiledExpr::Predicate(p) => p.family() == crate::PredicateFamily::UserStatic,
        CompiledExpr::And(a, b) | CompiledExpr::Or(a, b) => is_user_static(a) && is_user_static(b),
        CompiledExpr::Not(inner) => is_user_static(inner),
    }
}
