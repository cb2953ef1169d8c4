use winnow::combinator::{alt, cut_err, fail, opt, separated, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{Expr, MAX_DEPTH};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = alt(('\'', '"')).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any)
            .context(StrContext::Label("string literal"))
            .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
            .parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any)
                    .context(StrContext::Label("escape sequence"))
                    .parse_next(input)?;
                match esc {
                    '\'' | '"' | '\\' => s.push(esc),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn arguments(input: &mut &str) -> ModalResult<Vec<String>> {
    ws.parse_next(input)?;
    separated(0.., terminated(string_literal, ws), (',', ws)).parse_next(input)
}

// -- Expressions (precedence: || < && < ! < primary) ------------------------

fn predicate_call(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    ws.parse_next(input)?;
    cut_err('(')
        .context(StrContext::Expected(StrContextValue::CharLiteral('(')))
        .parse_next(input)?;
    let args = cut_err(arguments)
        .context(StrContext::Expected(StrContextValue::Description(
            "string literal arguments",
        )))
        .parse_next(input)?;
    cut_err(')')
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    Ok(Expr::Predicate {
        name: name.to_owned(),
        args,
    })
}

// Every expression parser returns the node together with its height, and takes
// the number of enclosing groups and negations. Both are bounded by MAX_DEPTH.
type Node = (Expr, usize);

fn too_deep<O>(input: &mut &str) -> ModalResult<O> {
    cut_err(fail::<_, O, _>)
        .context(StrContext::Label("nesting depth"))
        .parse_next(input)
}

fn join(
    input: &mut &str,
    lhs: Node,
    rhs: Node,
    op: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> ModalResult<Node> {
    let height = lhs.1.max(rhs.1) + 1;
    if height > MAX_DEPTH {
        return too_deep(input);
    }
    Ok((op(Box::new(lhs.0), Box::new(rhs.0)), height))
}

fn group(input: &mut &str, depth: usize) -> ModalResult<Node> {
    '('.parse_next(input)?;
    if depth >= MAX_DEPTH {
        return too_deep(input);
    }
    cut_err(terminated(
        |i: &mut &str| expr(i, depth + 1),
        (
            ws,
            ')'.context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
        ),
    ))
    .parse_next(input)
}

fn primary(input: &mut &str, depth: usize) -> ModalResult<Node> {
    ws.parse_next(input)?;
    if input.starts_with('(') {
        return group(input, depth);
    }
    predicate_call
        .map(|node| (node, 0))
        .context(StrContext::Expected(StrContextValue::Description(
            "predicate call or '('",
        )))
        .parse_next(input)
}

fn unary(input: &mut &str, depth: usize) -> ModalResult<Node> {
    ws.parse_next(input)?;
    if opt('!').parse_next(input)?.is_none() {
        return primary(input, depth);
    }
    if depth >= MAX_DEPTH {
        return too_deep(input);
    }
    let (inner, height) = cut_err(|i: &mut &str| unary(i, depth + 1)).parse_next(input)?;
    if height >= MAX_DEPTH {
        return too_deep(input);
    }
    Ok((Expr::Not(Box::new(inner)), height + 1))
}

fn and_expr(input: &mut &str, depth: usize) -> ModalResult<Node> {
    let mut acc = unary(input, depth)?;
    while opt((ws, "&&")).parse_next(input)?.is_some() {
        let rhs = cut_err(|i: &mut &str| unary(i, depth)).parse_next(input)?;
        acc = join(input, acc, rhs, Expr::And)?;
    }
    Ok(acc)
}

fn or_expr(input: &mut &str, depth: usize) -> ModalResult<Node> {
    let mut acc = and_expr(input, depth)?;
    while opt((ws, "||")).parse_next(input)?.is_some() {
        let rhs = cut_err(|i: &mut &str| and_expr(i, depth)).parse_next(input)?;
        acc = join(input, acc, rhs, Expr::Or)?;
    }
    Ok(acc)
}

fn expr(input: &mut &str, depth: usize) -> ModalResult<Node> {
    ws.parse_next(input)?;
    or_expr(input, depth)
}

// -- Top-level parser -------------------------------------------------------

/// A whole condition string. Blank input yields `None`.
pub fn condition(input: &mut &str) -> ModalResult<Option<Expr>> {
    ws.parse_next(input)?;
    if input.is_empty() {
        return Ok(None);
    }
    let (parsed, _) = expr(input, 0)?;
    ws.parse_next(input)?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;
    use crate::{call, Expr, MAX_DEPTH};

    fn parsed(input: &str) -> Expr {
        parse(input).unwrap().expect("non-empty condition")
    }

    #[test]
    fn parse_zero_arity_call() {
        assert_eq!(parsed("isOwner()"), call("isOwner", &[]));
    }

    #[test]
    fn parse_call_with_arguments() {
        assert_eq!(
            parsed("matchAnyTag('PII.Sensitive', 'PersonalData.Personal')"),
            call("matchAnyTag", &["PII.Sensitive", "PersonalData.Personal"])
        );
    }

    #[test]
    fn parse_double_quoted_literal() {
        assert_eq!(
            parsed(r#"hasAnyRole("Admin")"#),
            call("hasAnyRole", &["Admin"])
        );
    }

    #[test]
    fn parse_escaped_quote() {
        assert_eq!(
            parsed(r"matchAnyTag('it\'s', 'a\\b')"),
            call("matchAnyTag", &["it's", "a\\b"])
        );
    }

    #[test]
    fn parse_blank_is_none() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   \n\t").unwrap(), None);
    }

    #[test]
    fn parse_and_expression() {
        assert!(matches!(parsed("isOwner() && noOwner()"), Expr::And(_, _)));
    }

    #[test]
    fn parse_or_expression() {
        assert!(matches!(parsed("isOwner() || noOwner()"), Expr::Or(_, _)));
    }

    #[test]
    fn parse_not_expression() {
        assert_eq!(parsed("!isOwner()"), !call("isOwner", &[]));
        assert_eq!(parsed("!!isOwner()"), !!call("isOwner", &[]));
    }

    #[test]
    fn parse_not_binds_tighter_than_and() {
        assert_eq!(
            parsed("!isOwner() && noOwner()"),
            (!call("isOwner", &[])).and(call("noOwner", &[]))
        );
    }

    #[test]
    fn parse_precedence_and_before_or() {
        let cond = parsed("isOwner() || noOwner() && hasDomain()");
        match cond {
            Expr::Or(left, right) => {
                assert_eq!(*left, call("isOwner", &[]));
                assert!(matches!(*right, Expr::And(_, _)));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn parse_left_associative() {
        let a = || call("isOwner", &[]);
        let b = || call("noOwner", &[]);
        let c = || call("hasDomain", &[]);
        assert_eq!(parsed("isOwner() && noOwner() && hasDomain()"), a().and(b()).and(c()));
        assert_eq!(parsed("isOwner() || noOwner() || hasDomain()"), a().or(b()).or(c()));
    }

    #[test]
    fn parse_parenthesized_grouping() {
        let cond = parsed("(isOwner() || noOwner()) && hasDomain()");
        match cond {
            Expr::And(left, right) => {
                assert!(matches!(*left, Expr::Or(_, _)));
                assert_eq!(*right, call("hasDomain", &[]));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn parse_whitespace_is_insignificant() {
        assert_eq!(
            parsed("  matchAllTags ( 'a' ,'b' )&&!( isOwner( ) )  "),
            call("matchAllTags", &["a", "b"]).and(!call("isOwner", &[]))
        );
    }

    #[test]
    fn reject_unmatched_open_paren() {
        assert!(parse("(isOwner() && noOwner()").is_err());
    }

    #[test]
    fn reject_unmatched_close_paren() {
        assert!(parse("isOwner())").is_err());
    }

    #[test]
    fn reject_unterminated_literal() {
        assert!(parse("matchAnyTag('PII").is_err());
    }

    #[test]
    fn reject_unknown_tokens() {
        assert!(parse("isOwner() & noOwner()").is_err());
        assert!(parse("isOwner() and noOwner()").is_err());
        assert!(parse("matchAnyTag(PII)").is_err());
        assert!(parse("isOwner").is_err());
        assert!(parse("matchAnyTag(42)").is_err());
    }

    #[test]
    fn reject_dangling_operator() {
        assert!(parse("isOwner() &&").is_err());
        assert!(parse("|| isOwner()").is_err());
        assert!(parse("!").is_err());
    }

    #[test]
    fn error_reports_offset() {
        let err = parse("isOwner() # noOwner()").unwrap_err();
        assert_eq!(err.offset(), 10);
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let negations = format!("{}isOwner()", "!".repeat(MAX_DEPTH));
        assert_eq!(parsed(&negations).depth(), MAX_DEPTH);

        let groups = format!("{}isOwner(){}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parsed(&groups), call("isOwner", &[]));

        let chain = vec!["isOwner()"; MAX_DEPTH + 1].join(" && ");
        assert_eq!(parsed(&chain).depth(), MAX_DEPTH);
    }

    #[test]
    fn reject_nesting_past_the_limit() {
        let negations = format!("{}isOwner()", "!".repeat(MAX_DEPTH + 1));
        let err = parse(&negations).unwrap_err();
        assert!(err.message().contains("nesting depth"), "{err}");

        let groups = format!(
            "{}isOwner(){}",
            "(".repeat(MAX_DEPTH + 1),
            ")".repeat(MAX_DEPTH + 1)
        );
        let err = parse(&groups).unwrap_err();
        assert!(err.message().starts_with("invalid nesting depth"), "{err}");
        assert!(!err.message().contains('\n'));

        let chain = vec!["noOwner()"; MAX_DEPTH + 2].join(" || ");
        assert!(parse(&chain).is_err());
    }

    #[test]
    fn reject_huge_nesting_without_overflow() {
        assert!(parse(&"(".repeat(10_000)).is_err());
        assert!(parse(&format!("{}isOwner()", "!".repeat(10_000))).is_err());
        let wrapped = format!("{}isOwner(){}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&wrapped).is_err());
        assert!(parse(&vec!["isOwner()"; 10_000].join(" && ")).is_err());
    }
}
