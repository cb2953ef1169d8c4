use crate::types::query::fields;
use crate::{Fragment, Predicate, QueryNode, SubjectSnapshot};

/// Resolve one bound predicate against the requesting subject.
///
/// User-static predicates always come back as sentinels; document-dynamic
/// ones always come back as query nodes.
pub(crate) fn resolve(predicate: &Predicate, subject: &SubjectSnapshot) -> Fragment {
    match predicate {
        Predicate::HasAnyRole(roles) => Fragment::from(subject.has_any_role(roles)),
        Predicate::InAnyTeam(teams) => Fragment::from(subject.in_any_team(teams)),
        Predicate::IsOwner => Fragment::Query(QueryNode::should_any(
            subject
                .owner_ids()
                .map(|id| QueryNode::term(fields::OWNERS_ID, id))
                .collect(),
        )),
        Predicate::NoOwner => Fragment::Query(QueryNode::must_none(vec![QueryNode::exists(
            fields::OWNERS_ID,
        )])),
        Predicate::HasDomain => Fragment::Query(match subject.domain() {
            Some(domain) => QueryNode::term(fields::DOMAIN_ID, domain.id.as_str()),
            // A subject without a domain only sees documents without one.
            None => QueryNode::must_none(vec![QueryNode::exists(fields::DOMAIN_ID)]),
        }),
        Predicate::MatchAnyTag(tags) => Fragment::Query(QueryNode::should_any(tag_terms(tags))),
        Predicate::MatchAllTags(tags) => Fragment::Query(QueryNode::must_all(tag_terms(tags))),
    }
}

fn tag_terms(tags: &[String]) -> Vec<QueryNode> {
    tags.iter()
        .map(|tag| QueryNode::term(fields::TAG_FQN, tag.as_str()))
        .collect()
}
