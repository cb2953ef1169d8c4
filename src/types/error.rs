use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("unknown predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("invalid arguments to '{predicate}': {reason}")]
    InvalidArgument { predicate: String, reason: String },

    #[error("condition nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },
}
