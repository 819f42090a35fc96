use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, EvalError, StoreError};

/// Unified error type returned by [`RuleEngine`](crate::RuleEngine).
#[derive(Debug, Error)]
pub enum RuleitError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}

/// Parse failures travel inside [`CompileError::Parse`], the same way the
/// engine reports them.
impl From<ParseError> for RuleitError {
    fn from(err: ParseError) -> Self {
        RuleitError::Compile(err.into())
    }
}

/// Coarse classification of a [`RuleitError`], for callers that map
/// failures onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty input, unbalanced parentheses, or a malformed expression.
    Syntax,
    /// Bad combination arguments, a taken name, or input nested too deep.
    Validation,
    /// A value that had to be numeric was not.
    Coercion,
    /// Division or modulo by zero.
    Arithmetic,
    Unsupported,
    NotFound,
    /// Corrupt graph or snapshot.
    Internal,
}

impl RuleitError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleitError::Compile(err) => match err {
                CompileError::Parse(_)
                | CompileError::InsufficientOperands { .. }
                | CompileError::MalformedExpression { .. } => ErrorKind::Syntax,
                CompileError::TooFewRules { .. }
                | CompileError::OperatorCount { .. }
                | CompileError::InvalidConnective { .. } => ErrorKind::Validation,
            },
            RuleitError::Eval(err) => match err {
                EvalError::NotNumeric { .. } => ErrorKind::Coercion,
                EvalError::DivisionByZero | EvalError::ModuloByZero => ErrorKind::Arithmetic,
                EvalError::UnsupportedOperator { .. } => ErrorKind::Unsupported,
                EvalError::DepthExceeded { .. } => ErrorKind::Validation,
                EvalError::MissingNode { .. } => ErrorKind::Internal,
            },
            RuleitError::Store(err) => match err {
                StoreError::RuleNotFound(_) => ErrorKind::NotFound,
                StoreError::DuplicateName { .. } => ErrorKind::Validation,
            },
            #[cfg(feature = "binary-cache")]
            RuleitError::Serialize(_) | RuleitError::Deserialize(_) => ErrorKind::Internal,
        }
    }
}
