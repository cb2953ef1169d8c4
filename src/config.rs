use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::RbacError;

/// Outcome when no ALLOW rule grants view access.
///
/// Under `Deny` a policy set holding only DENY rules compiles to `MatchNone`.
/// `Allow` turns it into a deny list: everything is visible except what the DENY
/// rules exclude, so a lone unconditional DENY on `Table` yields
/// `bool { must_not: [terms(_index, [table])] }`, and a set whose only rules
/// are for non-view operations yields `MatchAll`. Metadata services that treat
/// search visibility as open by default want `Allow`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDecision {
    /// Nothing is visible unless an ALLOW rule says so.
    #[default]
    Deny,
    /// Everything not excluded by a DENY rule is visible.
    Allow,
}

/// Maps a resource type name to the search index holding its documents.
pub trait IndexResolver {
    fn index_name(&self, resource: &str) -> String;
}

impl<F> IndexResolver for F
where
    F: Fn(&str) -> String,
{
    fn index_name(&self, resource: &str) -> String {
        self(resource)
    }
}

/// Index naming rules: explicit aliases, lowercase fallback, optional cluster prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndexNaming {
    /// Lowercase resource type name to index name.
    pub aliases: HashMap<String, String>,
    /// Prefix added as `"{cluster_alias}_{index}"` when non-empty.
    pub cluster_alias: Option<String>,
}

impl IndexNaming {
    #[must_use]
    pub fn with_alias(mut self, resource: &str, index: impl Into<String>) -> Self {
        self.aliases.insert(resource.to_lowercase(), index.into());
        self
    }

    #[must_use]
    pub fn with_cluster_alias(mut self, alias: impl Into<String>) -> Self {
        self.cluster_alias = Some(alias.into());
        self
    }
}

impl IndexResolver for IndexNaming {
    fn index_name(&self, resource: &str) -> String {
        let key = resource.to_lowercase();
        let index = self.aliases.get(&key).cloned().unwrap_or(key);
        match self.cluster_alias.as_deref() {
            Some(alias) if !alias.is_empty() => format!("{alias}_{index}"),
            _ => index,
        }
    }
}

/// Evaluator settings. Every field has a default, so `{}` is a valid document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub default_decision: DefaultDecision,
    pub index: IndexNaming,
}

impl EvaluatorConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Config`] if the document is not valid.
    pub fn from_json(input: &str) -> Result<Self, RbacError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RbacError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    #[must_use]
    pub fn with_default_decision(mut self, decision: DefaultDecision) -> Self {
        self.default_decision = decision;
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: IndexNaming) -> Self {
        self.index = index;
        self
    }
}
