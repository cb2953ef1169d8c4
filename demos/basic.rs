use search_rbac::{
    CompiledRule, ElasticRenderer, Operation, PolicyContext, QueryRenderer,
    RbacConditionEvaluator, SubjectContext, SubjectSnapshot,
};

fn main() {
    // Who is searching
    let subject = SubjectSnapshot::new("u-42")
        .with_role("DataConsumer")
        .with_team("t-7", "Analytics");

    // What their policies say
    let ctx = SubjectContext::new(subject)
        .policy(
            PolicyContext::new("DataConsumerPolicy")
                .rule(
                    CompiledRule::allow("view-owned-or-public")
                        .when("isOwner() || matchAnyTag('Tier.Public')")
                        .for_operations([Operation::ViewAll]),
                )
                .rule(
                    CompiledRule::allow("consumer-tables")
                        .when("hasAnyRole('DataConsumer')")
                        .on(["Table"]),
                ),
        )
        .policy(
            PolicyContext::new("PiiPolicy")
                .rule(CompiledRule::deny("hide-pii").when("matchAnyTag('PII.Sensitive')")),
        );

    let query = RbacConditionEvaluator::new()
        .evaluate_conditions(&ctx)
        .expect("failed to compile policies");

    println!("{query}");
    let body = ElasticRenderer::new().render(&query);
    println!(
        "{}",
        serde_json::to_string_pretty(&body).expect("failed to format query")
    );
}
