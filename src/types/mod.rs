mod condition;
mod error;
mod expr;
mod fragment;
mod policy;
mod predicate;
pub(crate) mod query;
mod rule;
mod subject;

pub use condition::Condition;
pub use error::ConditionError;
pub(crate) use expr::CompiledExpr;
pub use expr::{call, Expr, MAX_DEPTH};
pub use fragment::Fragment;
pub use policy::{PolicyContext, SubjectContext};
pub use predicate::{Predicate, PredicateFamily};
pub use query::{fields, BoolQuery, QueryNode};
pub use rule::{CompiledRule, Effect, Operation, ALL_RESOURCES};
pub use subject::{EntityRef, SubjectSnapshot};
