use std::fmt;

/// Document fields referenced by compiled queries.
pub mod fields {
    pub const OWNERS_ID: &str = "owners.id";
    pub const DOMAIN_ID: &str = "domain.id";
    pub const TAG_FQN: &str = "tags.tagFQN";
    pub const INDEX: &str = "_index";
}

/// Engine-neutral boolean search query.
///
/// Built by the constructors below and rendered by a
/// [`QueryRenderer`](crate::backend::QueryRenderer). A `Bool` node is only ever
/// produced through [`BoolQuery::into_node()`], which collapses an empty clause
/// set to [`QueryNode::MatchAll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    Term { field: String, value: String },
    Terms { field: String, values: Vec<String> },
    Exists { field: String },
    Bool(BoolQuery),
    MatchAll,
    MatchNone,
}

/// Clause lists of a `bool` query.
///
/// Every `must` clause has to match, no `must_not` clause may match, and when
/// `should` is non-empty at least one of its clauses has to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolQuery {
    pub must: Vec<QueryNode>,
    pub should: Vec<QueryNode>,
    pub must_not: Vec<QueryNode>,
}

impl BoolQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn must(mut self, clause: QueryNode) -> Self {
        self.must.push(clause);
        self
    }

    #[must_use]
    pub fn should(mut self, clause: QueryNode) -> Self {
        self.should.push(clause);
        self
    }

    #[must_use]
    pub fn must_not(mut self, clause: QueryNode) -> Self {
        self.must_not.push(clause);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Finish the builder. An empty clause set becomes `MatchAll`.
    #[must_use]
    pub fn into_node(self) -> QueryNode {
        if self.is_empty() {
            QueryNode::MatchAll
        } else {
            QueryNode::Bool(self)
        }
    }
}

impl QueryNode {
    #[must_use]
    pub fn term(field: &str, value: impl Into<String>) -> Self {
        QueryNode::Term {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn terms<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryNode::Terms {
            field: field.to_owned(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn exists(field: &str) -> Self {
        QueryNode::Exists {
            field: field.to_owned(),
        }
    }

    #[must_use]
    pub fn must_all(clauses: Vec<QueryNode>) -> Self {
        BoolQuery {
            must: clauses,
            ..BoolQuery::default()
        }
        .into_node()
    }

    #[must_use]
    pub fn should_any(clauses: Vec<QueryNode>) -> Self {
        BoolQuery {
            should: clauses,
            ..BoolQuery::default()
        }
        .into_node()
    }

    #[must_use]
    pub fn must_none(clauses: Vec<QueryNode>) -> Self {
        BoolQuery {
            must_not: clauses,
            ..BoolQuery::default()
        }
        .into_node()
    }

    /// Returns `true` if this node or any node below it is a `Bool` with no clauses.
    #[must_use]
    pub fn contains_empty_bool(&self) -> bool {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if let QueryNode::Bool(b) = node {
                if b.is_empty() {
                    return true;
                }
                pending.extend(b.must.iter().chain(&b.should).chain(&b.must_not));
            }
        }
        false
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Term { field, value } => write!(f, "{field}:{value}"),
            QueryNode::Terms { field, values } => write!(f, "{field}:[{}]", values.join(", ")),
            QueryNode::Exists { field } => write!(f, "exists({field})"),
            QueryNode::Bool(b) => {
                write!(f, "bool(")?;
                let groups = [("must", &b.must), ("should", &b.should), ("must_not", &b.must_not)];
                let mut first = true;
                for (label, clauses) in groups {
                    if clauses.is_empty() {
                        continue;
                    }
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "{label}: [")?;
                    for (i, clause) in clauses.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{clause}")?;
                    }
                    write!(f, "]")?;
                }
                write!(f, ")")
            }
            QueryNode::MatchAll => write!(f, "match_all"),
            QueryNode::MatchNone => write!(f, "match_none"),
        }
    }
}
