use serde::Deserialize;

/// An entity reference carried by the subject: a team or a domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Resolved view of the requesting user at evaluation time.
///
/// Role names and team memberships are expected to be fully resolved
/// (inherited roles included) before the snapshot is built.
///
/// # Example
///
/// ```
/// use search_rbac::SubjectSnapshot;
///
/// let subject = SubjectSnapshot::new("7c0e...")
///     .with_role("DataSteward")
///     .with_team("b12f...", "Analytics")
///     .with_domain("9d4a...", "Finance");
/// assert!(subject.has_any_role(&["Admin".into(), "DataSteward".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubjectSnapshot {
    user_id: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    teams: Vec<EntityRef>,
    #[serde(default)]
    domain: Option<EntityRef>,
}

impl SubjectSnapshot {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
            teams: Vec::new(),
            domain: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, name: impl Into<String>) -> Self {
        self.roles.push(name.into());
        self
    }

    #[must_use]
    pub fn with_team(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.teams.push(EntityRef::new(id, name));
        self
    }

    #[must_use]
    pub fn with_domain(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.domain = Some(EntityRef::new(id, name));
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn teams(&self) -> &[EntityRef] {
        &self.teams
    }

    #[must_use]
    pub fn domain(&self) -> Option<&EntityRef> {
        self.domain.as_ref()
    }

    #[must_use]
    pub fn has_any_role(&self, names: &[String]) -> bool {
        self.roles.iter().any(|role| names.contains(role))
    }

    #[must_use]
    pub fn in_any_team(&self, names: &[String]) -> bool {
        self.teams.iter().any(|team| names.contains(&team.name))
    }

    /// The user id followed by every team id, in membership order.
    pub fn owner_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.user_id.as_str()).chain(self.teams.iter().map(|t| t.id.as_str()))
    }
}
