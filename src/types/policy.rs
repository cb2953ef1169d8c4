use serde::Deserialize;

use super::rule::CompiledRule;
use super::subject::SubjectSnapshot;

/// A named policy and its rules, already resolved from role/team inheritance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicyContext {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<CompiledRule>,
}

impl PolicyContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, rule: CompiledRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Everything the evaluator needs for one request: who is asking and which
/// policies apply to them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubjectContext {
    pub subject: SubjectSnapshot,
    #[serde(default)]
    pub policies: Vec<PolicyContext>,
}

impl SubjectContext {
    #[must_use]
    pub fn new(subject: SubjectSnapshot) -> Self {
        Self {
            subject,
            policies: Vec::new(),
        }
    }

    #[must_use]
    pub fn policy(mut self, policy: PolicyContext) -> Self {
        self.policies.push(policy);
        self
    }
}
