//! Compiles role-based access policies into search engine visibility filters.
//!
//! Rule conditions such as `hasAnyRole('Admin') || isOwner()` are parsed once,
//! partially evaluated against the requesting subject, and folded into a single
//! [`QueryNode`] that a [`backend::QueryRenderer`] turns into the engine's query DSL.

pub mod backend;
mod compile;
mod config;
mod error;
mod evaluate;
pub mod parse;
mod resolve;
mod types;

pub use backend::{ElasticRenderer, QueryRenderer};
pub use config::{DefaultDecision, EvaluatorConfig, IndexNaming, IndexResolver};
pub use error::RbacError;
pub use evaluate::RbacConditionEvaluator;
pub use parse::ParseError;
pub use types::{
    call, fields, BoolQuery, CompiledRule, Condition, ConditionError, EntityRef, Effect, Expr,
    Fragment, Operation, PolicyContext, Predicate, PredicateFamily, QueryNode, SubjectContext,
    SubjectSnapshot, ALL_RESOURCES, MAX_DEPTH,
};
