use std::ops::Not;

use super::query::{BoolQuery, QueryNode};

/// Intermediate compilation result: a constant truth value or a per-document query.
///
/// Sentinels are kept apart from query nodes so that the combination algebra
/// can fold them away instead of emitting `match_all`/`match_none` clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    AlwaysTrue,
    AlwaysFalse,
    Query(QueryNode),
}

impl From<bool> for Fragment {
    fn from(v: bool) -> Self {
        if v {
            Fragment::AlwaysTrue
        } else {
            Fragment::AlwaysFalse
        }
    }
}

impl From<QueryNode> for Fragment {
    fn from(node: QueryNode) -> Self {
        Fragment::Query(node)
    }
}

impl Fragment {
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Fragment::Query(_))
    }

    /// Conjunction. `AlwaysFalse` absorbs, `AlwaysTrue` is the identity.
    #[must_use]
    pub fn and(self, other: Fragment) -> Fragment {
        Fragment::all([self, other])
    }

    /// Disjunction. `AlwaysTrue` absorbs, `AlwaysFalse` is the identity.
    #[must_use]
    pub fn or(self, other: Fragment) -> Fragment {
        Fragment::any([self, other])
    }

    /// N-ary conjunction; surviving query nodes share a single `must` group.
    pub fn all(fragments: impl IntoIterator<Item = Fragment>) -> Fragment {
        let mut nodes = Vec::new();
        for fragment in fragments {
            match fragment {
                Fragment::AlwaysFalse => return Fragment::AlwaysFalse,
                Fragment::AlwaysTrue => {}
                Fragment::Query(node) => nodes.push(node),
            }
        }
        match nodes.len() {
            0 => Fragment::AlwaysTrue,
            1 => Fragment::Query(nodes.remove(0)),
            _ => Fragment::Query(QueryNode::must_all(nodes)),
        }
    }

    /// N-ary disjunction; surviving query nodes share a single `should` group.
    pub fn any(fragments: impl IntoIterator<Item = Fragment>) -> Fragment {
        let mut nodes = Vec::new();
        for fragment in fragments {
            match fragment {
                Fragment::AlwaysTrue => return Fragment::AlwaysTrue,
                Fragment::AlwaysFalse => {}
                Fragment::Query(node) => nodes.push(node),
            }
        }
        match nodes.len() {
            0 => Fragment::AlwaysFalse,
            1 => Fragment::Query(nodes.remove(0)),
            _ => Fragment::Query(QueryNode::should_any(nodes)),
        }
    }

    /// Materialize as a query: `AlwaysTrue` is `MatchAll`, `AlwaysFalse` is `MatchNone`.
    #[must_use]
    pub fn into_query(self) -> QueryNode {
        match self {
            Fragment::AlwaysTrue => QueryNode::MatchAll,
            Fragment::AlwaysFalse => QueryNode::MatchNone,
            Fragment::Query(node) => node,
        }
    }
}

impl Not for Fragment {
    type Output = Fragment;

    fn not(self) -> Fragment {
        match self {
            Fragment::AlwaysTrue => Fragment::AlwaysFalse,
            Fragment::AlwaysFalse => Fragment::AlwaysTrue,
            Fragment::Query(node) => Fragment::Query(BoolQuery::new().must_not(node).into_node()),
        }
    }
}
