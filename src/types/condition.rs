use std::fmt;

use super::expr::{CompiledExpr, Expr, MAX_DEPTH};
use super::fragment::Fragment;
use super::subject::SubjectSnapshot;

/// A parsed and bound rule condition, independent of any subject.
///
/// Parsing and binding happen once; [`resolve()`](Self::resolve) can then be
/// called for any number of subjects.
///
/// # Example
///
/// ```
/// use search_rbac::{Condition, Fragment, SubjectSnapshot};
///
/// let condition = Condition::parse("hasAnyRole('Admin') || isOwner()").unwrap();
/// let admin = SubjectSnapshot::new("u1").with_role("Admin");
/// assert_eq!(condition.resolve(&admin), Fragment::AlwaysTrue);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    source: Option<Expr>,
    bound: Option<CompiledExpr>,
}

impl Condition {
    /// The empty condition, which holds for every subject and document.
    #[must_use]
    pub fn always() -> Self {
        Self {
            source: None,
            bound: None,
        }
    }

    /// Parse and bind a condition string. Blank input is [`Condition::always()`].
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Parse`](crate::RbacError::Parse) for malformed input
    /// and [`RbacError::Condition`](crate::RbacError::Condition) for unknown
    /// predicates or wrong arity.
    pub fn parse(input: &str) -> Result<Self, crate::RbacError> {
        match crate::parse::parse(input)? {
            Some(expr) => Ok(Self::from_expr(expr)?),
            None => Ok(Self::always()),
        }
    }

    /// Bind an already-built expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`](crate::ConditionError) for unknown predicates,
    /// wrong arity, or a tree deeper than [`MAX_DEPTH`].
    pub fn from_expr(expr: Expr) -> Result<Self, crate::ConditionError> {
        if expr.depth() > MAX_DEPTH {
            return Err(crate::ConditionError::TooDeep { limit: MAX_DEPTH });
        }
        let bound = crate::compile::bind(&expr)?;
        Ok(Self {
            source: Some(expr),
            bound: Some(bound),
        })
    }

    /// The parsed expression, `None` for the empty condition.
    #[must_use]
    pub fn expr(&self) -> Option<&Expr> {
        self.source.as_ref()
    }

    /// Returns `true` if the condition can be decided from the subject alone.
    #[must_use]
    pub fn is_user_static(&self) -> bool {
        self.bound
            .as_ref()
            .map_or(true, crate::compile::is_user_static)
    }

    /// Compile this condition for one subject.
    #[must_use]
    pub fn resolve(&self, subject: &SubjectSnapshot) -> Fragment {
        match &self.bound {
            Some(expr) => crate::compile::reduce(expr, subject),
            None => Fragment::AlwaysTrue,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(expr) => write!(f, "{expr}"),
            None => Ok(()),
        }
    }
}
