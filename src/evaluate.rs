use tracing::{debug, trace, warn};

use crate::config::{DefaultDecision, EvaluatorConfig, IndexNaming, IndexResolver};
use crate::types::query::fields;
use crate::{
    BoolQuery, CompiledRule, Condition, Effect, Fragment, PolicyContext, QueryNode, RbacError,
    SubjectContext, SubjectSnapshot,
};

/// Compile one rule into its visibility fragment: condition AND index scope.
pub(crate) fn compile_rule(
    rule: &CompiledRule,
    subject: &SubjectSnapshot,
    indices: &impl IndexResolver,
) -> Result<Fragment, RbacError> {
    let condition = Condition::parse(&rule.condition)?.resolve(subject);
    if rule.applies_to_all_resources() {
        return Ok(condition);
    }
    let scope = QueryNode::terms(
        fields::INDEX,
        rule.resources.iter().map(|r| indices.index_name(r)),
    );
    Ok(Fragment::Query(scope).and(condition))
}

/// Fold every view-relevant rule of every policy into one fragment.
pub(crate) fn combine<'a>(
    policies: impl IntoIterator<Item = &'a PolicyContext>,
    subject: &SubjectSnapshot,
    indices: &impl IndexResolver,
    default_decision: DefaultDecision,
) -> Result<Fragment, RbacError> {
    let mut allows = Vec::new();
    let mut denies = Vec::new();
    let mut deny_everything = false;

    for policy in policies {
        for rule in &policy.rules {
            if !rule.grants_view() {
                debug!(policy = %policy.name, rule = %rule.name, "skipping rule without view operations");
                continue;
            }
            let fragment = compile_rule(rule, subject, indices).map_err(|e| {
                warn!(policy = %policy.name, rule = %rule.name, error = %e, "rule condition rejected");
                e.in_rule(&policy.name, &rule.name)
            })?;
            trace!(policy = %policy.name, rule = %rule.name, effect = ?rule.effect, ?fragment, "compiled rule");
            match (rule.effect, fragment) {
                (Effect::Allow, fragment) => allows.push(fragment),
                (Effect::Deny, Fragment::AlwaysFalse) => {}
                (Effect::Deny, Fragment::AlwaysTrue) => deny_everything = true,
                (Effect::Deny, Fragment::Query(node)) => denies.push(node),
            }
        }
    }

    let allow = if allows.is_empty() {
        match default_decision {
            DefaultDecision::Deny => {
                debug!("no applicable allow rule, denying by default");
                return Ok(Fragment::AlwaysFalse);
            }
            DefaultDecision::Allow => Fragment::AlwaysTrue,
        }
    } else {
        Fragment::any(allows)
    };

    if deny_everything {
        debug!("unconditional deny rule applies");
        return Ok(Fragment::AlwaysFalse);
    }

    let result = match allow {
        Fragment::AlwaysFalse => Fragment::AlwaysFalse,
        allow if denies.is_empty() => allow,
        Fragment::AlwaysTrue => Fragment::Query(QueryNode::must_none(denies)),
        Fragment::Query(node) => Fragment::Query(
            BoolQuery {
                must: vec![node],
                must_not: denies,
                ..BoolQuery::default()
            }
            .into_node(),
        ),
    };
    Ok(result)
}

/// Compiles a subject's policies into a search visibility filter.
///
/// The evaluator holds only configuration and is safe to share between threads.
///
/// # Example
///
/// ```
/// use search_rbac::{
///     CompiledRule, PolicyContext, QueryNode, RbacConditionEvaluator, SubjectContext,
///     SubjectSnapshot,
/// };
///
/// let ctx = SubjectContext::new(SubjectSnapshot::new("u1").with_role("Admin")).policy(
///     PolicyContext::new("AdminPolicy")
///         .rule(CompiledRule::allow("AdminView").when("hasAnyRole('Admin')")),
/// );
/// let query = RbacConditionEvaluator::new().evaluate_conditions(&ctx).unwrap();
/// assert_eq!(query, QueryNode::MatchAll);
/// ```
#[derive(Debug, Clone)]
pub struct RbacConditionEvaluator<R = IndexNaming> {
    default_decision: DefaultDecision,
    indices: R,
}

impl RbacConditionEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(EvaluatorConfig::default())
    }

    #[must_use]
    pub fn from_config(config: EvaluatorConfig) -> Self {
        Self {
            default_decision: config.default_decision,
            indices: config.index,
        }
    }
}

impl Default for RbacConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: IndexResolver> RbacConditionEvaluator<R> {
    /// Use a custom resource-to-index mapping.
    pub fn with_index_resolver(default_decision: DefaultDecision, indices: R) -> Self {
        Self {
            default_decision,
            indices,
        }
    }

    #[must_use]
    pub fn default_decision(&self) -> DefaultDecision {
        self.default_decision
    }

    /// Compile the subject's policies into one query.
    ///
    /// `AlwaysTrue` becomes [`QueryNode::MatchAll`] and `AlwaysFalse` becomes
    /// [`QueryNode::MatchNone`].
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Rule`] naming the first rule whose condition fails
    /// to parse or bind.
    pub fn evaluate_conditions(&self, ctx: &SubjectContext) -> Result<QueryNode, RbacError> {
        self.evaluate_policies(&ctx.subject, &ctx.policies)
    }

    /// Compile an explicit sequence of policies for `subject`.
    ///
    /// # Errors
    ///
    /// See [`evaluate_conditions()`](Self::evaluate_conditions).
    pub fn evaluate_policies<'a>(
        &self,
        subject: &SubjectSnapshot,
        policies: impl IntoIterator<Item = &'a PolicyContext>,
    ) -> Result<QueryNode, RbacError> {
        Ok(self.evaluate_fragment(subject, policies)?.into_query())
    }

    /// Like [`evaluate_policies()`](Self::evaluate_policies) but keeps sentinels
    /// unmaterialized.
    ///
    /// # Errors
    ///
    /// See [`evaluate_conditions()`](Self::evaluate_conditions).
    pub fn evaluate_fragment<'a>(
        &self,
        subject: &SubjectSnapshot,
        policies: impl IntoIterator<Item = &'a PolicyContext>,
    ) -> Result<Fragment, RbacError> {
        let policies: Vec<&PolicyContext> = policies.into_iter().collect();
        let span = tracing::debug_span!(
            "evaluate_conditions",
            user = %subject.user_id(),
            policies = policies.len()
        );
        let _guard = span.enter();
        let fragment = combine(policies, subject, &self.indices, self.default_decision)?;
        debug!(sentinel = fragment.is_sentinel(), "compiled visibility filter");
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConditionError, Operation};

    fn subject() -> SubjectSnapshot {
        SubjectSnapshot::new("u1")
    }

    fn evaluate(policy: PolicyContext, subject: &SubjectSnapshot) -> Fragment {
        RbacConditionEvaluator::new()
            .evaluate_fragment(subject, [&policy])
            .unwrap()
    }

    fn owner_query(id: &str) -> QueryNode {
        QueryNode::should_any(vec![QueryNode::term(fields::OWNERS_ID, id)])
    }

    #[test]
    fn no_policies_deny_by_default() {
        let none: [&PolicyContext; 0] = [];
        let fragment = RbacConditionEvaluator::new()
            .evaluate_fragment(&subject(), none)
            .unwrap();
        assert_eq!(fragment, Fragment::AlwaysFalse);
    }

    #[test]
    fn single_allow_rule_is_unwrapped() {
        let policy = PolicyContext::new("p").rule(CompiledRule::allow("r").when("isOwner()"));
        assert_eq!(
            evaluate(policy, &subject()),
            Fragment::Query(owner_query("u1"))
        );
    }

    #[test]
    fn unconditional_allow_is_match_all() {
        let policy = PolicyContext::new("p").rule(CompiledRule::allow("r"));
        let query = RbacConditionEvaluator::new()
            .evaluate_policies(&subject(), [&policy])
            .unwrap();
        assert_eq!(query, QueryNode::MatchAll);
    }

    #[test]
    fn allow_rules_share_one_should_group() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("owner").when("isOwner()"))
            .rule(CompiledRule::allow("orphan").when("noOwner()"));
        let Fragment::Query(QueryNode::Bool(b)) = evaluate(policy, &subject()) else {
            panic!("expected bool query");
        };
        assert_eq!(b.should.len(), 2);
        assert!(b.must.is_empty() && b.must_not.is_empty());
    }

    #[test]
    fn allow_rules_across_policies_are_combined() {
        let first = PolicyContext::new("a").rule(CompiledRule::allow("r").when("isOwner()"));
        let second = PolicyContext::new("b").rule(CompiledRule::allow("r").when("noOwner()"));
        let fragment = RbacConditionEvaluator::new()
            .evaluate_fragment(&subject(), [&first, &second])
            .unwrap();
        assert!(matches!(fragment, Fragment::Query(QueryNode::Bool(b)) if b.should.len() == 2));
    }

    #[test]
    fn resource_scope_is_anded_first() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("r").when("isOwner()").on(["Table", "Dashboard"]));
        let Fragment::Query(QueryNode::Bool(b)) = evaluate(policy, &subject()) else {
            panic!("expected bool query");
        };
        assert_eq!(
            b.must,
            vec![
                QueryNode::terms("_index", ["table", "dashboard"]),
                owner_query("u1")
            ]
        );
    }

    #[test]
    fn scoped_unconditional_rule_is_bare_terms() {
        let policy = PolicyContext::new("p").rule(CompiledRule::allow("r").on(["Table"]));
        assert_eq!(
            evaluate(policy, &subject()),
            Fragment::Query(QueryNode::terms("_index", ["table"]))
        );
    }

    #[test]
    fn deny_rules_become_must_not() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("all"))
            .rule(CompiledRule::deny("pii").when("matchAnyTag('PII')"));
        let Fragment::Query(QueryNode::Bool(b)) = evaluate(policy, &subject()) else {
            panic!("expected bool query");
        };
        assert!(b.must.is_empty());
        assert_eq!(
            b.must_not,
            vec![QueryNode::should_any(vec![QueryNode::term(fields::TAG_FQN, "PII")])]
        );
    }

    #[test]
    fn allow_and_deny_are_combined() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("owner").when("isOwner()"))
            .rule(CompiledRule::deny("orphans").when("noOwner()"));
        let Fragment::Query(QueryNode::Bool(b)) = evaluate(policy, &subject()) else {
            panic!("expected bool query");
        };
        assert_eq!(b.must, vec![owner_query("u1")]);
        assert_eq!(b.must_not.len(), 1);
    }

    #[test]
    fn vacuous_deny_is_dropped() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("owner").when("isOwner()"))
            .rule(CompiledRule::deny("never").when("hasAnyRole('Nobody')"));
        assert_eq!(
            evaluate(policy, &subject()),
            Fragment::Query(owner_query("u1"))
        );
    }

    #[test]
    fn unconditional_deny_hides_everything() {
        let policy = PolicyContext::new("p")
            .rule(CompiledRule::allow("all"))
            .rule(CompiledRule::deny("block"));
        assert_eq!(evaluate(policy, &subject()), Fragment::AlwaysFalse);
    }

    #[test]
    fn deny_only_policies_deny_by_default() {
        let policy = PolicyContext::new("p").rule(CompiledRule::deny("r").on(["Table"]));
        assert_eq!(evaluate(policy, &subject()), Fragment::AlwaysFalse);
    }

    #[test]
    fn default_decision_comes_from_config() {
        assert_eq!(
            RbacConditionEvaluator::new().default_decision(),
            DefaultDecision::Deny
        );
        let evaluator = RbacConditionEvaluator::from_config(
            EvaluatorConfig::default().with_default_decision(DefaultDecision::Allow),
        );
        assert_eq!(evaluator.default_decision(), DefaultDecision::Allow);
    }

    #[test]
    fn deep_condition_is_a_rule_error() {
        let deep = format!("{}isOwner()", "!".repeat(10_000));
        let policy = PolicyContext::new("p").rule(CompiledRule::allow("deep").when(deep));
        let err = RbacConditionEvaluator::new()
            .evaluate_fragment(&subject(), [&policy])
            .unwrap_err();
        assert!(matches!(err, RbacError::Rule { ref rule, .. } if rule == "deep"));
        assert!(matches!(err.root(), RbacError::Parse(_)));
    }

    #[test]
    fn deny_only_policies_exclude_under_default_allow() {
        let policy = PolicyContext::new("p").rule(
            CompiledRule::deny("r")
                .on(["Table"])
                .for_operations([Operation::All]),
        );
        let evaluator = RbacConditionEvaluator::from_config(
            EvaluatorConfig::default().with_default_decision(DefaultDecision::Allow),
        );
        let query = evaluator.evaluate_policies(&subject(), [&policy]).unwrap();
        assert_eq!(
            query,
            QueryNode::must_none(vec![QueryNode::terms("_index", ["table"])])
        );
    }

    #[test]
    fn non_view_rules_are_ignored() {
        let with_edit = PolicyContext::new("p")
            .rule(CompiledRule::allow("owner").when("noOwner()"))
            .rule(
                CompiledRule::allow("edit")
                    .when("isOwner()")
                    .for_operations([Operation::EditDescription]),
            );
        let without = PolicyContext::new("p").rule(CompiledRule::allow("owner").when("noOwner()"));
        assert_eq!(evaluate(with_edit, &subject()), evaluate(without, &subject()));
    }

    #[test]
    fn ignored_rules_are_not_parsed() {
        let policy = PolicyContext::new("p").rule(
            CompiledRule::allow("edit")
                .when("not a condition ((")
                .for_operations([Operation::EditAll]),
        );
        assert_eq!(evaluate(policy, &subject()), Fragment::AlwaysFalse);
    }

    #[test]
    fn broken_condition_names_its_rule() {
        let policy = PolicyContext::new("OrgPolicy")
            .rule(CompiledRule::allow("fine").when("isOwner()"))
            .rule(CompiledRule::allow("broken").when("isOwner() && isAdmin()"));
        let err = RbacConditionEvaluator::new()
            .evaluate_fragment(&subject(), [&policy])
            .unwrap_err();
        match &err {
            RbacError::Rule { policy, rule, .. } => {
                assert_eq!(policy, "OrgPolicy");
                assert_eq!(rule, "broken");
            }
            other => panic!("expected Rule error, got {other:?}"),
        }
        assert!(matches!(
            err.root(),
            RbacError::Condition(ConditionError::UnknownPredicate { .. })
        ));
    }

    #[test]
    fn syntax_error_fails_evaluation() {
        let policy = PolicyContext::new("p").rule(CompiledRule::deny("r").when("isOwner("));
        let err = RbacConditionEvaluator::new()
            .evaluate_fragment(&subject(), [&policy])
            .unwrap_err();
        assert!(matches!(err.root(), RbacError::Parse(_)));
    }

    #[test]
    fn custom_index_resolver() {
        let evaluator = RbacConditionEvaluator::with_index_resolver(
            DefaultDecision::Deny,
            |resource: &str| format!("{}_search_index", resource.to_lowercase()),
        );
        let policy = PolicyContext::new("p").rule(CompiledRule::allow("r").on(["Table"]));
        assert_eq!(
            evaluator.evaluate_policies(&subject(), [&policy]).unwrap(),
            QueryNode::terms("_index", ["table_search_index"])
        );
    }
}
