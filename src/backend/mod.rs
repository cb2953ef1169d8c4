//! Rendering of [`QueryNode`] trees into a search engine's query language.

mod elastic;

pub use elastic::ElasticRenderer;

use crate::QueryNode;

/// Turns an engine-neutral [`QueryNode`] into a backend query.
pub trait QueryRenderer {
    type Output;

    fn render(&self, node: &QueryNode) -> Self::Output;
}
