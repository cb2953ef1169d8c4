mod error;
mod grammar;

pub use error::ParseError;

use crate::Expr;

/// Parse a condition string into an [`Expr`].
///
/// Blank input returns `Ok(None)`: a rule without a condition always applies.
///
/// # Errors
///
/// Returns [`ParseError`] on unmatched parentheses, unknown tokens, or an
/// unterminated string literal.
pub fn parse(input: &str) -> Result<Option<Expr>, ParseError> {
    use winnow::Parser;
    grammar::condition.parse(input).map_err(|e| {
        let offset = e.offset();
        let detail = e.inner().to_string().replace('\n', "; ");
        let message = if detail.is_empty() {
            match input.get(offset..).and_then(|rest| rest.chars().next()) {
                Some(c) => format!("unexpected '{c}'"),
                None => "unexpected end of input".to_owned(),
            }
        } else {
            detail
        };
        ParseError::new(message, offset)
    })
}
