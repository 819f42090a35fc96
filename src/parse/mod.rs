mod error;
mod lexer;
mod postfix;

pub use error::ParseError;
pub use lexer::{tokenize, tokenize_with, Lexer, Token, Tokens};
pub use postfix::to_postfix;

use crate::config::Lexing;

/// Tokenize a rule string and convert it to postfix order.
///
/// Returns the infix tokens alongside the postfix sequence so callers can
/// keep the former for display.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is empty, has unbalanced
/// parentheses, or (under [`Lexing::Strict`]) contains stray characters.
pub fn parse(source: &str, lexing: Lexing) -> Result<(Vec<Token<'_>>, Vec<Token<'_>>), ParseError> {
    let tokens = tokenize_with(source, lexing)?;
    let postfix = to_postfix(tokens.iter().copied())?;
    Ok((tokens, postfix))
}
