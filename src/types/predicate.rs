use std::fmt;

use super::error::ConditionError;

/// Whether a predicate is decided by the requesting subject alone or by the
/// document being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateFamily {
    /// Folds to a constant at compile time.
    UserStatic,
    /// Becomes a query clause evaluated per document.
    DocumentDynamic,
}

/// The closed set of condition predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IsOwner,
    NoOwner,
    HasDomain,
    HasAnyRole(Vec<String>),
    InAnyTeam(Vec<String>),
    MatchAnyTag(Vec<String>),
    MatchAllTags(Vec<String>),
}

impl Predicate {
    pub const NAMES: [&'static str; 7] = [
        "isOwner",
        "noOwner",
        "hasDomain",
        "hasAnyRole",
        "inAnyTeam",
        "matchAnyTag",
        "matchAllTags",
    ];

    /// Bind a call by name, checking its arity.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::UnknownPredicate`] for a name outside the
    /// catalogue and [`ConditionError::InvalidArgument`] when a zero-arity
    /// predicate is given arguments or a list predicate is given none.
    pub fn bind(name: &str, args: &[String]) -> Result<Self, ConditionError> {
        let predicate = match name {
            "isOwner" => Predicate::IsOwner,
            "noOwner" => Predicate::NoOwner,
            "hasDomain" => Predicate::HasDomain,
            "hasAnyRole" => Predicate::HasAnyRole(args.to_vec()),
            "inAnyTeam" => Predicate::InAnyTeam(args.to_vec()),
            "matchAnyTag" => Predicate::MatchAnyTag(args.to_vec()),
            "matchAllTags" => Predicate::MatchAllTags(args.to_vec()),
            other => {
                return Err(ConditionError::UnknownPredicate {
                    name: other.to_owned(),
                })
            }
        };
        let reason = match predicate.arguments() {
            None if !args.is_empty() => format!("expected no arguments, got {}", args.len()),
            Some([]) => "expected at least one argument".to_owned(),
            _ => return Ok(predicate),
        };
        Err(ConditionError::InvalidArgument {
            predicate: name.to_owned(),
            reason,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::IsOwner => "isOwner",
            Predicate::NoOwner => "noOwner",
            Predicate::HasDomain => "hasDomain",
            Predicate::HasAnyRole(_) => "hasAnyRole",
            Predicate::InAnyTeam(_) => "inAnyTeam",
            Predicate::MatchAnyTag(_) => "matchAnyTag",
            Predicate::MatchAllTags(_) => "matchAllTags",
        }
    }

    #[must_use]
    pub fn family(&self) -> PredicateFamily {
        match self {
            Predicate::HasAnyRole(_) | Predicate::InAnyTeam(_) => PredicateFamily::UserStatic,
            Predicate::IsOwner
            | Predicate::NoOwner
            | Predicate::HasDomain
            | Predicate::MatchAnyTag(_)
            | Predicate::MatchAllTags(_) => PredicateFamily::DocumentDynamic,
        }
    }

    /// Literal arguments, or `None` for the zero-arity predicates.
    #[must_use]
    pub fn arguments(&self) -> Option<&[String]> {
        match self {
            Predicate::IsOwner | Predicate::NoOwner | Predicate::HasDomain => None,
            Predicate::HasAnyRole(args)
            | Predicate::InAnyTeam(args)
            | Predicate::MatchAnyTag(args)
            | Predicate::MatchAllTags(args) => Some(args),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.arguments().unwrap_or_default();
        write!(f, "{}(", self.name())?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{arg}'")?;
        }
        write!(f, ")")
    }
}
