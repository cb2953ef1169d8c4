use serde_json::{json, Map, Value};

use super::QueryRenderer;
use crate::{BoolQuery, QueryNode};

/// Renders queries as Elasticsearch / OpenSearch query DSL.
///
/// A `bool` node that mixes `should` with `must` or `must_not` gets
/// `"minimum_should_match": 1`, since the engines otherwise treat the
/// `should` clauses as optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticRenderer;

impl ElasticRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render `node` as a JSON string.
    #[must_use]
    pub fn to_json_string(&self, node: &QueryNode) -> String {
        self.render(node).to_string()
    }

    fn render_bool(&self, b: &BoolQuery) -> Value {
        let mut clauses = Map::new();
        for (key, nodes) in [("must", &b.must), ("should", &b.should), ("must_not", &b.must_not)] {
            if !nodes.is_empty() {
                let rendered = nodes.iter().map(|n| self.render(n)).collect();
                clauses.insert(key.to_owned(), Value::Array(rendered));
            }
        }
        if !b.should.is_empty() && !(b.must.is_empty() && b.must_not.is_empty()) {
            clauses.insert("minimum_should_match".to_owned(), json!(1));
        }
        json!({ "bool": clauses })
    }
}

impl QueryRenderer for ElasticRenderer {
    type Output = Value;

    fn render(&self, node: &QueryNode) -> Value {
        match node {
            QueryNode::Term { field, value } => json!({ "term": { field: { "value": value } } }),
            QueryNode::Terms { field, values } => json!({ "terms": { field: values } }),
            QueryNode::Exists { field } => json!({ "exists": { "field": field } }),
            QueryNode::Bool(b) => self.render_bool(b),
            QueryNode::MatchAll => json!({ "match_all": {} }),
            QueryNode::MatchNone => json!({ "match_none": {} }),
        }
    }
}
