use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::ConditionError;

/// Resource name that scopes a rule to every resource type.
pub const ALL_RESOURCES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[serde(alias = "ALLOW", alias = "Allow")]
    Allow,
    #[serde(alias = "DENY", alias = "Deny")]
    Deny,
}

/// Metadata operations a rule may grant or deny.
///
/// Only [`Operation::All`], [`Operation::ViewAll`] and [`Operation::ViewBasic`]
/// affect search visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Operation {
    All,
    ViewAll,
    ViewBasic,
    ViewUsage,
    ViewTests,
    ViewQueries,
    ViewDataProfile,
    ViewSampleData,
    Create,
    Delete,
    EditAll,
    EditDescription,
    EditDisplayName,
    EditOwners,
    EditTags,
    EditLineage,
    EditCustomFields,
    EditPolicy,
    EditRole,
    EditTeams,
    EditUsers,
}

impl Operation {
    const VARIANTS: [(Operation, &'static str); 21] = [
        (Operation::All, "All"),
        (Operation::ViewAll, "ViewAll"),
        (Operation::ViewBasic, "ViewBasic"),
        (Operation::ViewUsage, "ViewUsage"),
        (Operation::ViewTests, "ViewTests"),
        (Operation::ViewQueries, "ViewQueries"),
        (Operation::ViewDataProfile, "ViewDataProfile"),
        (Operation::ViewSampleData, "ViewSampleData"),
        (Operation::Create, "Create"),
        (Operation::Delete, "Delete"),
        (Operation::EditAll, "EditAll"),
        (Operation::EditDescription, "EditDescription"),
        (Operation::EditDisplayName, "EditDisplayName"),
        (Operation::EditOwners, "EditOwners"),
        (Operation::EditTags, "EditTags"),
        (Operation::EditLineage, "EditLineage"),
        (Operation::EditCustomFields, "EditCustomFields"),
        (Operation::EditPolicy, "EditPolicy"),
        (Operation::EditRole, "EditRole"),
        (Operation::EditTeams, "EditTeams"),
        (Operation::EditUsers, "EditUsers"),
    ];

    /// Whether this operation controls which documents a search may return.
    /// `All` counts because it implies both view operations.
    #[must_use]
    pub fn grants_view(self) -> bool {
        matches!(self, Operation::All | Operation::ViewAll | Operation::ViewBasic)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(op, _)| *op == self)
            .map_or("Unknown", |(_, name)| *name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(op, _)| *op)
            .ok_or_else(|| ConditionError::UnknownOperation { name: s.to_owned() })
    }
}

/// One policy rule: effect, condition, resource scope and operation scope.
///
/// An empty `condition` is unconditionally true. A `resources` list containing
/// [`ALL_RESOURCES`] (any case) applies the rule to every index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompiledRule {
    pub name: String,
    pub effect: Effect,
    #[serde(default)]
    pub condition: String,
    pub resources: Vec<String>,
    pub operations: Vec<Operation>,
}

impl CompiledRule {
    pub fn new(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            name: name.into(),
            effect,
            condition: String::new(),
            resources: vec![ALL_RESOURCES.to_owned()],
            operations: vec![Operation::ViewAll],
        }
    }

    #[must_use]
    pub fn allow(name: impl Into<String>) -> Self {
        Self::new(name, Effect::Allow)
    }

    #[must_use]
    pub fn deny(name: impl Into<String>) -> Self {
        Self::new(name, Effect::Deny)
    }

    #[must_use]
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    #[must_use]
    pub fn on<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn for_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    #[must_use]
    pub fn grants_view(&self) -> bool {
        self.operations.iter().any(|op| op.grants_view())
    }

    #[must_use]
    pub fn applies_to_all_resources(&self) -> bool {
        self.resources
            .iter()
            .any(|r| r.eq_ignore_ascii_case(ALL_RESOURCES))
    }
}
