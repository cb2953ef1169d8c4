use std::fmt;
use std::ops::Not;

use super::predicate::Predicate;

/// Deepest nesting a condition may have, counting operators, negations and
/// parenthesized groups.
pub const MAX_DEPTH: usize = 64;

/// User-facing condition AST. Predicates are referenced by name with their
/// literal arguments; they are bound to [`Predicate`] variants during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Predicate { name: String, args: Vec<String> },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// Condition with every predicate call bound to a known [`Predicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CompiledExpr {
    Predicate(Predicate),
    And(Box<CompiledExpr>, Box<CompiledExpr>),
    Or(Box<CompiledExpr>, Box<CompiledExpr>),
    Not(Box<CompiledExpr>),
}

fn write_literal(f: &mut fmt::Formatter<'_>, literal: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in literal.chars() {
        match c {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "'")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Predicate { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_literal(f, arg)?;
                }
                write!(f, ")")
            }
            Expr::And(a, b) => write!(f, "({a} && {b})"),
            Expr::Or(a, b) => write!(f, "({a} || {b})"),
            Expr::Not(inner) => write!(f, "!{inner}"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Height of the tree; a lone predicate call is `0`.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Predicate { .. } => {}
                Expr::And(a, b) | Expr::Or(a, b) => {
                    pending.push((a, depth + 1));
                    pending.push((b, depth + 1));
                }
                Expr::Not(inner) => pending.push((inner, depth + 1)),
            }
        }
        deepest
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Build a predicate call expression, e.g. `call("matchAnyTag", &["PII.Sensitive"])`.
#[must_use]
pub fn call(name: &str, args: &[&str]) -> Expr {
    Expr::Predicate {
        name: name.to_owned(),
        args: args.iter().map(|&a| a.to_owned()).collect(),
    }
}
