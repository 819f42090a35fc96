use thiserror::Error;

/// Lexical and syntax errors found before any node is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parse error: rule string contains no tokens")]
    EmptyInput,

    #[error("parse error: mismatched parentheses: extra closing parenthesis")]
    ExtraClosingParen,

    #[error("parse error: mismatched parentheses: unmatched opening parenthesis")]
    UnmatchedOpeningParen,

    #[error("parse error: unexpected character '{found}' at byte {position}")]
    UnexpectedInput { position: usize, found: char },
}
