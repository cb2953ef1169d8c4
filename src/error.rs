use thiserror::Error;

use crate::parse::ParseError;
use crate::ConditionError;

/// Unified error type covering parsing, binding, configuration and I/O.
///
/// Returned by [`RbacConditionEvaluator`](crate::RbacConditionEvaluator) and
/// [`Condition::parse()`](crate::Condition::parse). A failing rule is reported
/// as [`RbacError::Rule`] so the offending policy can be located.
#[derive(Debug, Error)]
pub enum RbacError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error("policy '{policy}', rule '{rule}': {source}")]
    Rule {
        policy: String,
        rule: String,
        #[source]
        source: Box<RbacError>,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RbacError {
    pub(crate) fn in_rule(self, policy: &str, rule: &str) -> Self {
        RbacError::Rule {
            policy: policy.to_owned(),
            rule: rule.to_owned(),
            source: Box::new(self),
        }
    }

    /// The underlying parse or binding error, looking through [`RbacError::Rule`].
    #[must_use]
    pub fn root(&self) -> &RbacError {
        match self {
            RbacError::Rule { source, .. } => source.root(),
            other => other,
        }
    }
}
